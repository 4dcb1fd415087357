//! Model training module
//!
//! Provides the regression estimators used to predict arrival delay:
//! - Ordinary least squares and ridge regression
//! - Regression trees and seeded random forests
//!
//! plus the per-run [`Trainer`] used by monitoring and the offline
//! [`ModelSelector`] that produces a persisted [`ModelArtifact`].

mod estimator;
mod models;
mod selection;
mod trainer;
pub mod decision_tree;
pub mod linear_models;
pub mod random_forest;

pub use decision_tree::{RegressionTree, TreeNode};
pub use estimator::{EstimatorConfig, TrainedEstimator};
pub use linear_models::LinearRegression;
pub use models::{MetricDelta, RegressionMetrics, Regressor};
pub use random_forest::{MaxFeatures, RandomForestRegressor};
pub use selection::{CandidateScore, ModelArtifact, ModelSelector, SelectionOutcome};
pub use trainer::{ScoredWindows, Trainer};
