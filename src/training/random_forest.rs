//! Random Forest regressor

use super::decision_tree::RegressionTree;
use super::models::{check_feature_count, check_training_shapes, Regressor};
use crate::error::{MonitorError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Strategy for max features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Square root of n_features
    Sqrt,
    /// Fraction of n_features
    Fraction(f64),
    /// All features
    All,
}

/// Bagged ensemble of regression trees.
///
/// Tree `i` draws its bootstrap sample and feature subsets from a ChaCha
/// stream seeded with `random_state + i`, so a fixed seed gives identical
/// forests whatever the thread count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    /// Individual trees
    trees: Vec<RegressionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split
    pub max_features: MaxFeatures,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random state
    pub random_state: u64,
    /// Number of features
    n_features: usize,
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(3)
    }
}

impl RandomForestRegressor {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            bootstrap: true,
            random_state: 42,
            n_features: 0,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Set max features strategy
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn compute_max_features(&self, n_features: usize) -> Option<usize> {
        match self.max_features {
            MaxFeatures::Sqrt => Some(((n_features as f64).sqrt().ceil() as usize).max(1)),
            MaxFeatures::Fraction(f) => {
                Some(((n_features as f64 * f).ceil() as usize).clamp(1, n_features.max(1)))
            }
            MaxFeatures::All => None,
        }
    }
}

impl Regressor for RandomForestRegressor {
    fn name(&self) -> &'static str {
        "random_forest"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_training_shapes(x, y)?;
        if self.n_estimators == 0 {
            return Err(MonitorError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "forest needs at least one tree".to_string(),
            });
        }

        let n_samples = x.nrows();
        self.n_features = x.ncols();
        let max_features = self.compute_max_features(self.n_features);

        // Build trees in parallel
        let trees: Vec<RegressionTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| -> Result<RegressionTree> {
                let seed = self.random_state.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let mut tree = RegressionTree::new()
                    .with_max_depth(self.max_depth)
                    .with_min_samples_leaf(self.min_samples_leaf)
                    .with_max_features(max_features)
                    .with_random_state(rng.gen());

                if self.bootstrap {
                    let sample_indices: Vec<usize> =
                        (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                    let x_boot = x.select(Axis(0), &sample_indices);
                    let y_boot = y.select(Axis(0), &sample_indices);
                    tree.fit(&x_boot, &y_boot)?;
                } else {
                    tree.fit(x, y)?;
                }
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        self.trees = trees;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(MonitorError::ModelNotFitted);
        }
        check_feature_count(x, self.n_features)?;

        let per_tree = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<_>>>()?;

        let mut sum = Array1::<f64>::zeros(x.nrows());
        for pred in &per_tree {
            sum += pred;
        }
        Ok(sum / self.trees.len() as f64)
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}
