//! Offline holdout training, best-model selection and the model artifact

use super::estimator::{EstimatorConfig, TrainedEstimator};
use super::models::{RegressionMetrics, Regressor};
use crate::error::{MonitorError, Result};
use crate::schema::ColumnSchema;
use crate::utils::{columns_to_array2, has_column, Timer};
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// A fitted estimator bound to the exact feature columns it was trained on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model_name: String,
    pub schema: ColumnSchema,
    /// Model input columns, in matrix column order
    pub feature_columns: Vec<String>,
    pub estimator: TrainedEstimator,
    /// Holdout metrics
    pub metrics: RegressionMetrics,
    pub created_at: DateTime<Utc>,
}

impl ModelArtifact {
    /// Save the artifact as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), model = %self.model_name, "saved model artifact");
        Ok(())
    }

    /// Load an artifact from a file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let artifact: Self = serde_json::from_str(&json)?;
        if !artifact.estimator.is_fitted() {
            return Err(MonitorError::ModelNotFitted);
        }
        Ok(artifact)
    }
}

/// Holdout score of one candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateScore {
    pub model_name: String,
    pub config: EstimatorConfig,
    pub metrics: RegressionMetrics,
    pub training_secs: f64,
}

/// Result of a selection run: the winner plus every candidate's score
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    pub artifact: ModelArtifact,
    pub leaderboard: Vec<CandidateScore>,
}

/// Fits each candidate on a seeded train split and keeps the best R²
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSelector {
    pub candidates: Vec<EstimatorConfig>,
    pub test_size: f64,
    pub seed: u64,
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self {
            candidates: vec![
                EstimatorConfig::random_forest(3, 42),
                EstimatorConfig::Linear,
                EstimatorConfig::ridge(),
            ],
            test_size: 0.2,
            seed: 42,
        }
    }
}

impl ModelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidates(mut self, candidates: Vec<EstimatorConfig>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Shuffled `(train, test)` row indices; the test side gets
    /// `ceil(n * test_size)` rows
    pub fn holdout_indices(&self, n_rows: usize) -> Result<(Vec<usize>, Vec<usize>)> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(MonitorError::InvalidParameter {
                name: "test_size".to_string(),
                value: self.test_size.to_string(),
                reason: "must be strictly between 0 and 1".to_string(),
            });
        }
        let n_test = ((n_rows as f64) * self.test_size).ceil() as usize;
        if n_rows < 2 || n_test >= n_rows {
            return Err(MonitorError::insufficient_data(
                "model selection",
                "training",
                format!("{} rows cannot be split into train and test", n_rows),
            ));
        }

        let mut indices: Vec<usize> = (0..n_rows).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);
        let train = indices.split_off(n_test);
        Ok((train, indices))
    }

    /// Train every candidate on the cleaned frame and return the best by R²
    pub fn select(&self, cleaned: &DataFrame, schema: &ColumnSchema) -> Result<SelectionOutcome> {
        if self.candidates.is_empty() {
            return Err(MonitorError::ConfigError(
                "no candidate estimators configured".to_string(),
            ));
        }
        let feature_columns = schema.feature_columns();
        let missing: Vec<&String> = feature_columns
            .iter()
            .chain(std::iter::once(&schema.target))
            .filter(|c| !has_column(cleaned, c))
            .collect();
        if !missing.is_empty() {
            return Err(MonitorError::schema_mismatch(
                "model selection",
                format!("cleaned data is missing columns {:?}", missing),
            ));
        }

        let x = columns_to_array2(cleaned, &feature_columns)?;
        let y: Array1<f64> = columns_to_array2(cleaned, &[schema.target.clone()])?
            .column(0)
            .to_owned();

        let (train_idx, test_idx) = self.holdout_indices(x.nrows())?;
        let (x_train, y_train) = take_rows(&x, &y, &train_idx);
        let (x_test, y_test) = take_rows(&x, &y, &test_idx);
        info!(
            train = train_idx.len(),
            test = test_idx.len(),
            features = feature_columns.len(),
            "split data into training and testing sets"
        );

        let mut leaderboard = Vec::with_capacity(self.candidates.len());
        let mut best: Option<(TrainedEstimator, RegressionMetrics)> = None;

        for config in &self.candidates {
            config.validate()?;
            let timer = Timer::start("candidate");
            let mut estimator = config.build();
            estimator.fit(&x_train, &y_train)?;
            let training_secs = timer.elapsed_secs();

            let predictions = estimator.predict(&x_test)?;
            let metrics = RegressionMetrics::compute_arrays(&y_test, &predictions)?;
            info!(
                model = estimator.name(),
                mae = metrics.mae,
                mse = metrics.mse,
                r2 = metrics.r2,
                secs = training_secs,
                "evaluated candidate"
            );

            leaderboard.push(CandidateScore {
                model_name: estimator.name().to_string(),
                config: config.clone(),
                metrics: metrics.clone(),
                training_secs,
            });

            let better = best.as_ref().map_or(true, |(_, b)| metrics.r2 > b.r2);
            if better {
                best = Some((estimator, metrics));
            }
        }

        let (estimator, metrics) = best.ok_or_else(|| {
            MonitorError::ComputationError("no candidate could be evaluated".to_string())
        })?;
        info!(model = estimator.name(), r2 = metrics.r2, "selected best model");

        Ok(SelectionOutcome {
            artifact: ModelArtifact {
                model_name: estimator.name().to_string(),
                schema: schema.clone(),
                feature_columns,
                estimator,
                metrics,
                created_at: Utc::now(),
            },
            leaderboard,
        })
    }
}

fn take_rows(x: &Array2<f64>, y: &Array1<f64>, rows: &[usize]) -> (Array2<f64>, Array1<f64>) {
    (x.select(Axis(0), rows), y.select(Axis(0), rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_frame(n: usize) -> DataFrame {
        let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let z: Vec<f64> = (0..n).map(|i| ((i * 7) % 5) as f64).collect();
        let y: Vec<f64> = x.iter().zip(z.iter()).map(|(a, b)| 3.0 * a - b + 1.0).collect();
        df!("x" => &x, "z" => &z, "y" => &y).unwrap()
    }

    fn schema() -> ColumnSchema {
        ColumnSchema::numeric("y", "prediction", vec!["x".to_string(), "z".to_string()])
    }

    #[test]
    fn test_holdout_is_seeded_and_disjoint() {
        let selector = ModelSelector::default();
        let (train_a, test_a) = selector.holdout_indices(10).unwrap();
        let (train_b, test_b) = selector.holdout_indices(10).unwrap();

        assert_eq!(test_a.len(), 2);
        assert_eq!(train_a.len(), 8);
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
        assert!(test_a.iter().all(|i| !train_a.contains(i)));
    }

    #[test]
    fn test_selects_linear_for_linear_data() {
        let outcome = ModelSelector::default()
            .select(&linear_frame(50), &schema())
            .unwrap();

        assert_eq!(outcome.leaderboard.len(), 3);
        assert_eq!(outcome.artifact.model_name, "linear_regression");
        assert!(outcome.artifact.metrics.r2 > 0.999);
        assert_eq!(outcome.artifact.feature_columns, vec!["x", "z"]);
    }

    #[test]
    fn test_artifact_save_load() {
        let outcome = ModelSelector::default()
            .with_candidates(vec![EstimatorConfig::Linear])
            .select(&linear_frame(20), &schema())
            .unwrap();

        let path = std::env::temp_dir().join("flight_delay_monitor_artifact_test.json");
        outcome.artifact.save(&path).unwrap();
        let loaded = ModelArtifact::load(&path).unwrap();
        assert_eq!(loaded.feature_columns, outcome.artifact.feature_columns);
        assert_eq!(loaded.schema, outcome.artifact.schema);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_too_few_rows() {
        assert!(ModelSelector::default().holdout_indices(1).is_err());
    }
}
