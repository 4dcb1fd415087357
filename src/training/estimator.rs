//! Estimator configuration and the serializable fitted-model enum

use super::decision_tree::RegressionTree;
use super::linear_models::LinearRegression;
use super::models::Regressor;
use super::random_forest::RandomForestRegressor;
use crate::error::{MonitorError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Which regression algorithm to fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimatorConfig {
    Linear,
    Ridge {
        alpha: f64,
    },
    DecisionTree {
        max_depth: Option<usize>,
        min_samples_leaf: usize,
    },
    RandomForest {
        n_estimators: usize,
        max_depth: Option<usize>,
        min_samples_leaf: usize,
        seed: u64,
    },
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        EstimatorConfig::RandomForest {
            n_estimators: 3,
            max_depth: None,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

impl EstimatorConfig {
    pub fn ridge() -> Self {
        EstimatorConfig::Ridge { alpha: 1.0 }
    }

    /// Forest with the given tree count and seed, other settings default
    pub fn random_forest(n_estimators: usize, seed: u64) -> Self {
        EstimatorConfig::RandomForest {
            n_estimators,
            max_depth: None,
            min_samples_leaf: 1,
            seed,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            EstimatorConfig::Ridge { alpha } if !(alpha.is_finite() && *alpha >= 0.0) => {
                Err(MonitorError::InvalidParameter {
                    name: "alpha".to_string(),
                    value: alpha.to_string(),
                    reason: "must be finite and non-negative".to_string(),
                })
            }
            EstimatorConfig::RandomForest { n_estimators: 0, .. } => {
                Err(MonitorError::InvalidParameter {
                    name: "n_estimators".to_string(),
                    value: "0".to_string(),
                    reason: "must be at least 1".to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Fresh, unfitted estimator
    pub fn build(&self) -> TrainedEstimator {
        match self {
            EstimatorConfig::Linear => TrainedEstimator::Linear(LinearRegression::new()),
            EstimatorConfig::Ridge { alpha } => {
                TrainedEstimator::Linear(LinearRegression::ridge(*alpha))
            }
            EstimatorConfig::DecisionTree {
                max_depth,
                min_samples_leaf,
            } => TrainedEstimator::DecisionTree(
                RegressionTree::new()
                    .with_max_depth(*max_depth)
                    .with_min_samples_leaf(*min_samples_leaf),
            ),
            EstimatorConfig::RandomForest {
                n_estimators,
                max_depth,
                min_samples_leaf,
                seed,
            } => TrainedEstimator::RandomForest(
                RandomForestRegressor::new(*n_estimators)
                    .with_max_depth(*max_depth)
                    .with_min_samples_leaf(*min_samples_leaf)
                    .with_random_state(*seed),
            ),
        }
    }
}

/// Enum to hold fitted model variants so they can be persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedEstimator {
    Linear(LinearRegression),
    DecisionTree(RegressionTree),
    RandomForest(RandomForestRegressor),
}

impl TrainedEstimator {
    fn inner(&self) -> &dyn Regressor {
        match self {
            TrainedEstimator::Linear(m) => m,
            TrainedEstimator::DecisionTree(m) => m,
            TrainedEstimator::RandomForest(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Regressor {
        match self {
            TrainedEstimator::Linear(m) => m,
            TrainedEstimator::DecisionTree(m) => m,
            TrainedEstimator::RandomForest(m) => m,
        }
    }
}

impl Regressor for TrainedEstimator {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.inner_mut().fit(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.inner().predict(x)
    }

    fn is_fitted(&self) -> bool {
        self.inner().is_fitted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_default_is_three_tree_forest() {
        let config = EstimatorConfig::default();
        assert_eq!(config, EstimatorConfig::random_forest(3, 42));
        assert_eq!(config.build().name(), "random_forest");
    }

    #[test]
    fn test_config_serde_tagged() {
        let json = serde_json::to_string(&EstimatorConfig::ridge()).unwrap();
        assert!(json.contains("\"kind\":\"ridge\""));
        let back: EstimatorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, EstimatorConfig::ridge());
    }

    #[test]
    fn test_validate() {
        assert!(EstimatorConfig::Ridge { alpha: -1.0 }.validate().is_err());
        assert!(EstimatorConfig::random_forest(0, 1).validate().is_err());
        assert!(EstimatorConfig::Linear.validate().is_ok());
    }

    #[test]
    fn test_fitted_estimator_roundtrips_json() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![2.0, 4.0, 6.0];
        let mut model = EstimatorConfig::Linear.build();
        model.fit(&x, &y).unwrap();

        let json = serde_json::to_string(&model).unwrap();
        let loaded: TrainedEstimator = serde_json::from_str(&json).unwrap();
        let pred = loaded.predict(&array![[4.0]]).unwrap();
        assert!((pred[0] - 8.0).abs() < 1e-9);
    }
}
