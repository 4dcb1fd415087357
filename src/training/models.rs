//! Regressor trait and regression metrics

use crate::error::{MonitorError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Metrics for a regression fit.
///
/// Errors are `prediction - target`, so a positive mean error means the model
/// over-estimates the delay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Number of scored rows
    pub count: usize,
    /// Mean signed error
    pub mean_error: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// R-squared
    pub r2: f64,
    /// Largest absolute error
    pub max_abs_error: f64,
    /// Population standard deviation of the error
    pub error_std: f64,
    /// Mean absolute percentage error over rows with a non-zero target
    pub mape: Option<f64>,
}

impl RegressionMetrics {
    /// Compute regression metrics.
    ///
    /// A constant target has no variance to explain: R² is 1.0 for an exact
    /// fit and 0.0 otherwise.
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(MonitorError::ShapeError {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err(MonitorError::ComputationError(
                "cannot compute metrics on zero rows".to_string(),
            ));
        }

        let n = y_true.len() as f64;
        let errors: Vec<f64> = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| p - t)
            .collect();

        let mean_error = errors.iter().sum::<f64>() / n;
        let mse = errors.iter().map(|e| e * e).sum::<f64>() / n;
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
        let max_abs_error = errors.iter().fold(0.0f64, |acc, e| acc.max(e.abs()));
        let error_std = (errors
            .iter()
            .map(|e| (e - mean_error).powi(2))
            .sum::<f64>()
            / n)
            .sqrt();

        // R²
        let y_mean = y_true.iter().sum::<f64>() / n;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
        let ss_res: f64 = errors.iter().map(|e| e.powi(2)).sum();
        let r2 = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };

        let pct: Vec<f64> = y_true
            .iter()
            .zip(errors.iter())
            .filter(|(t, _)| **t != 0.0)
            .map(|(t, e)| (e / t).abs())
            .collect();
        let mape = if pct.is_empty() {
            None
        } else {
            Some(100.0 * pct.iter().sum::<f64>() / pct.len() as f64)
        };

        Ok(Self {
            count: y_true.len(),
            mean_error,
            mae,
            mse,
            rmse: mse.sqrt(),
            r2,
            max_abs_error,
            error_std,
            mape,
        })
    }

    pub fn compute_arrays(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        Self::compute(&y_true.to_vec(), &y_pred.to_vec())
    }

    /// `current - reference` for every metric both sides define
    pub fn delta(reference: &Self, current: &Self) -> MetricDelta {
        MetricDelta {
            mean_error: current.mean_error - reference.mean_error,
            mae: current.mae - reference.mae,
            mse: current.mse - reference.mse,
            rmse: current.rmse - reference.rmse,
            r2: current.r2 - reference.r2,
            max_abs_error: current.max_abs_error - reference.max_abs_error,
            error_std: current.error_std - reference.error_std,
            mape: match (reference.mape, current.mape) {
                (Some(r), Some(c)) => Some(c - r),
                _ => None,
            },
        }
    }
}

/// Per-metric difference between two windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    pub mean_error: f64,
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    pub r2: f64,
    pub max_abs_error: f64,
    pub error_std: f64,
    pub mape: Option<f64>,
}

/// Trait for regression estimators
pub trait Regressor: Send + Sync {
    /// Short identifier used in logs and artifacts
    fn name(&self) -> &'static str;

    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Make predictions
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    fn is_fitted(&self) -> bool;
}

/// Shape checks shared by every `fit`
pub(crate) fn check_training_shapes(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(MonitorError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    if x.nrows() == 0 {
        return Err(MonitorError::insufficient_data(
            "fit",
            "reference",
            "no training rows",
        ));
    }
    Ok(())
}

/// Width check shared by every `predict`
pub(crate) fn check_feature_count(x: &Array2<f64>, n_features: usize) -> Result<()> {
    if x.ncols() != n_features {
        return Err(MonitorError::ShapeError {
            expected: format!("{} features", n_features),
            actual: format!("{} features", x.ncols()),
        });
    }
    Ok(())
}
