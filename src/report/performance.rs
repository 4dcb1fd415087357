//! Model performance comparison

use super::ReportKind;
use crate::error::{MonitorError, Result};
use crate::schema::ColumnSchema;
use crate::training::{MetricDelta, RegressionMetrics};
use crate::utils::column_f64;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Error metrics for each window and `current - reference`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub target: String,
    pub prediction: String,
    pub reference: RegressionMetrics,
    pub current: RegressionMetrics,
    pub delta: MetricDelta,
}

impl PerformanceReport {
    pub fn compute(
        reference: &DataFrame,
        current: &DataFrame,
        schema: &ColumnSchema,
    ) -> Result<Self> {
        let reference_metrics = window_metrics(reference, schema, "reference")?;
        let current_metrics = window_metrics(current, schema, "current")?;
        let delta = RegressionMetrics::delta(&reference_metrics, &current_metrics);

        Ok(Self {
            target: schema.target.clone(),
            prediction: schema.prediction.clone(),
            reference: reference_metrics,
            current: current_metrics,
            delta,
        })
    }

    pub fn metrics(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        for (window, m) in [("reference", &self.reference), ("current", &self.current)] {
            out.insert(format!("{}.count", window), m.count as f64);
            out.insert(format!("{}.mean_error", window), m.mean_error);
            out.insert(format!("{}.mae", window), m.mae);
            out.insert(format!("{}.mse", window), m.mse);
            out.insert(format!("{}.rmse", window), m.rmse);
            out.insert(format!("{}.r2", window), m.r2);
            out.insert(format!("{}.max_abs_error", window), m.max_abs_error);
            out.insert(format!("{}.error_std", window), m.error_std);
            if let Some(mape) = m.mape {
                out.insert(format!("{}.mape", window), mape);
            }
        }
        out.insert("delta.mae".to_string(), self.delta.mae);
        out.insert("delta.mse".to_string(), self.delta.mse);
        out.insert("delta.rmse".to_string(), self.delta.rmse);
        out.insert("delta.r2".to_string(), self.delta.r2);
        out.insert("delta.mean_error".to_string(), self.delta.mean_error);
        out
    }
}

/// Metrics over rows where both target and prediction are present
fn window_metrics(
    df: &DataFrame,
    schema: &ColumnSchema,
    window: &str,
) -> Result<RegressionMetrics> {
    let report = ReportKind::Performance.to_string();
    let column = |name: &str| {
        column_f64(df, name).map_err(|_| {
            MonitorError::report(
                report.as_str(),
                Some(name),
                format!("column missing from {} window", window),
            )
        })
    };
    let target = column(&schema.target)?;
    let prediction = column(&schema.prediction)?;

    let (y_true, y_pred): (Vec<f64>, Vec<f64>) = target
        .into_iter()
        .zip(prediction)
        .filter_map(|(t, p)| Some((t?, p?)))
        .unzip();

    if y_true.is_empty() {
        return Err(MonitorError::report(
            report.as_str(),
            None,
            format!("{} window has no scored rows", window),
        ));
    }
    RegressionMetrics::compute(&y_true, &y_pred)
        .map_err(|e| MonitorError::report(report.as_str(), None, e.to_string()))
}
