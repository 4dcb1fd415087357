//! Target and prediction distribution drift

use super::data_drift::ColumnDrift;
use super::ReportKind;
use crate::drift::DriftConfig;
use crate::error::Result;
use crate::schema::ColumnSchema;
use crate::utils::{column_f64, mean, population_std};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Drift of the target and of the prediction between windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDriftReport {
    pub target: ColumnDrift,
    pub prediction: ColumnDrift,
    /// Pearson correlation of target and prediction in each window
    pub reference_correlation: Option<f64>,
    pub current_correlation: Option<f64>,
}

impl TargetDriftReport {
    pub fn compute(
        reference: &DataFrame,
        current: &DataFrame,
        schema: &ColumnSchema,
        config: &DriftConfig,
    ) -> Result<Self> {
        let kind = ReportKind::TargetDrift;
        let target = ColumnDrift::compute(reference, current, &schema.target, config, kind)?;
        let prediction =
            ColumnDrift::compute(reference, current, &schema.prediction, config, kind)?;

        Ok(Self {
            target,
            prediction,
            reference_correlation: correlation(reference, schema)?,
            current_correlation: correlation(current, schema)?,
        })
    }

    pub fn drift_detected(&self) -> bool {
        self.target.drift_detected || self.prediction.drift_detected
    }

    pub fn metrics(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        self.target.insert_metrics(&mut out);
        self.prediction.insert_metrics(&mut out);
        if let Some(r) = self.reference_correlation {
            out.insert("reference.correlation".to_string(), r);
        }
        if let Some(c) = self.current_correlation {
            out.insert("current.correlation".to_string(), c);
        }
        out
    }
}

/// Pearson correlation; `None` when either side is constant
fn correlation(df: &DataFrame, schema: &ColumnSchema) -> Result<Option<f64>> {
    // both columns were already checked by the drift computation
    let target = column_f64(df, &schema.target)?;
    let prediction = column_f64(df, &schema.prediction)?;
    let (t, p): (Vec<f64>, Vec<f64>) = target
        .into_iter()
        .zip(prediction)
        .filter_map(|(a, b)| Some((a?, b?)))
        .unzip();

    let (Some(mt), Some(mp), Some(st), Some(sp)) =
        (mean(&t), mean(&p), population_std(&t), population_std(&p))
    else {
        return Ok(None);
    };
    if st < 1e-12 || sp < 1e-12 {
        return Ok(None);
    }
    let cov = t
        .iter()
        .zip(p.iter())
        .map(|(a, b)| (a - mt) * (b - mp))
        .sum::<f64>()
        / t.len() as f64;
    Ok(Some(cov / (st * sp)))
}
