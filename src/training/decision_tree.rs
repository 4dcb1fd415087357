//! Regression tree implementation

use super::models::{check_feature_count, check_training_shapes, Regressor};
use crate::error::{MonitorError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with prediction value
    Leaf { value: f64, n_samples: usize },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

impl TreeNode {
    fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if row[*feature_idx] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Best split found for one feature
#[derive(Debug, Clone, Copy)]
struct Candidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

/// CART regression tree using variance reduction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    /// Tree root
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features sampled at each split; all when `None`
    pub max_features: Option<usize>,
    /// Seed for feature sampling
    pub random_state: u64,
    /// Number of features
    n_features: usize,
}

impl Default for RegressionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RegressionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            random_state: 42,
            n_features: 0,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let value = indices.iter().map(|&i| y[i]).sum::<f64>() / n_samples.max(1) as f64;

        let is_pure = indices.iter().all(|&i| (y[i] - value).abs() < 1e-12);
        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || is_pure;
        if should_stop {
            return TreeNode::Leaf { value, n_samples };
        }

        let features = self.sample_features(x.ncols(), rng);
        let Some(best) = self.find_best_split(x, y, indices, &features) else {
            return TreeNode::Leaf { value, n_samples };
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, best.feature_idx]] <= best.threshold);

        let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1, rng));
        let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1, rng));

        TreeNode::Split {
            feature_idx: best.feature_idx,
            threshold: best.threshold,
            left,
            right,
            n_samples,
        }
    }

    fn sample_features(&self, n_features: usize, rng: &mut ChaCha8Rng) -> Vec<usize> {
        let mut features: Vec<usize> = (0..n_features).collect();
        match self.max_features {
            Some(k) if k < n_features => {
                features.shuffle(rng);
                features.truncate(k.max(1));
                features.sort_unstable();
                features
            }
            _ => features,
        }
    }

    /// Sort-and-sweep over each candidate feature, keeping the split with the
    /// largest reduction in summed squared error
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        features: &[usize],
    ) -> Option<Candidate> {
        let n = indices.len();
        let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
        let parent_sse = total_sq - total_sum * total_sum / n as f64;
        let min_leaf = self.min_samples_leaf;

        let feature_results: Vec<Option<Candidate>> = features
            .par_iter()
            .map(|&feature_idx| {
                let mut pairs: Vec<(f64, f64)> =
                    indices.iter().map(|&i| (x[[i, feature_idx]], y[i])).collect();
                pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

                let mut best: Option<Candidate> = None;
                let mut left_sum = 0.0;
                let mut left_sq = 0.0;

                for split in 1..n {
                    let (xv, yv) = pairs[split - 1];
                    left_sum += yv;
                    left_sq += yv * yv;

                    let next = pairs[split].0;
                    if next <= xv || split < min_leaf || n - split < min_leaf {
                        continue;
                    }

                    let left_n = split as f64;
                    let right_n = (n - split) as f64;
                    let right_sum = total_sum - left_sum;
                    let right_sq = total_sq - left_sq;
                    let sse = (left_sq - left_sum * left_sum / left_n)
                        + (right_sq - right_sum * right_sum / right_n);
                    let gain = parent_sse - sse;

                    if gain > 1e-12 && best.map_or(true, |b| gain > b.gain) {
                        best = Some(Candidate {
                            feature_idx,
                            threshold: (xv + next) / 2.0,
                            gain,
                        });
                    }
                }
                best
            })
            .collect();

        // First feature wins ties so results do not depend on scheduling
        feature_results.into_iter().flatten().fold(None, |acc, c| match acc {
            Some(a) if a.gain >= c.gain => Some(a),
            _ => Some(c),
        })
    }
}

impl Regressor for RegressionTree {
    fn name(&self) -> &'static str {
        "decision_tree"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_training_shapes(x, y)?;
        if x.iter().any(|v| !v.is_finite()) || y.iter().any(|v| !v.is_finite()) {
            return Err(MonitorError::DataError(
                "training data contains non-finite values".to_string(),
            ));
        }

        self.n_features = x.ncols();
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
        let indices: Vec<usize> = (0..x.nrows()).collect();
        self.root = Some(self.build_tree(x, y, &indices, 0, &mut rng));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(MonitorError::ModelNotFitted)?;
        check_feature_count(x, self.n_features)?;
        Ok(x.rows().into_iter().map(|row| root.predict_row(row)).collect())
    }

    fn is_fitted(&self) -> bool {
        self.root.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_tree_fits_step_function() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = array![0.0, 0.0, 0.0, 5.0, 5.0, 5.0];

        let mut tree = RegressionTree::new();
        tree.fit(&x, &y).unwrap();
        let pred = tree.predict(&array![[2.5], [11.5]]).unwrap();

        assert!((pred[0] - 0.0).abs() < 1e-12);
        assert!((pred[1] - 5.0).abs() < 1e-12);
        assert_eq!(tree.root().unwrap().depth(), 1);
    }

    #[test]
    fn test_single_row_is_leaf() {
        let mut tree = RegressionTree::new();
        tree.fit(&array![[1.0, 2.0]], &array![7.0]).unwrap();
        assert_eq!(tree.predict(&array![[9.0, 9.0]]).unwrap()[0], 7.0);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
        let y = x.column(0).mapv(|v| v * v);
        let mut tree = RegressionTree::new().with_max_depth(Some(2));
        tree.fit(&x, &y).unwrap();
        assert!(tree.root().unwrap().depth() <= 2);
    }

    #[test]
    fn test_feature_count_mismatch() {
        let mut tree = RegressionTree::new();
        tree.fit(&array![[1.0], [2.0]], &array![1.0, 2.0]).unwrap();
        assert!(tree.predict(&array![[1.0, 2.0]]).is_err());
    }
}
