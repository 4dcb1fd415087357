//! Per-feature distribution drift

use super::{window_values, ReportKind};
use crate::drift::DriftConfig;
use crate::error::{MonitorError, Result};
use crate::schema::ColumnSchema;
use crate::utils::mean;
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Drift verdict for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDrift {
    pub column: String,
    pub stat_test: String,
    pub statistic: f64,
    pub p_value: Option<f64>,
    pub threshold: f64,
    pub drift_detected: bool,
    pub reference_count: usize,
    pub current_count: usize,
    pub reference_mean: f64,
    pub current_mean: f64,
}

impl ColumnDrift {
    /// Run the configured test on one column of both windows
    pub fn compute(
        reference: &DataFrame,
        current: &DataFrame,
        column: &str,
        config: &DriftConfig,
        report: ReportKind,
    ) -> Result<Self> {
        let ref_values = window_values(reference, column, report, "reference")?;
        let cur_values = window_values(current, column, report, "current")?;

        let detector = config.detector_for(ref_values.len());
        let result = detector
            .detect(&ref_values, &cur_values)
            .map_err(|e| MonitorError::report(report.to_string(), Some(column), e.to_string()))?;

        Ok(Self {
            column: column.to_string(),
            stat_test: result.method,
            statistic: result.score,
            p_value: result.p_value,
            threshold: result.threshold,
            drift_detected: result.drift_detected,
            reference_count: ref_values.len(),
            current_count: cur_values.len(),
            reference_mean: mean(&ref_values).unwrap_or(0.0),
            current_mean: mean(&cur_values).unwrap_or(0.0),
        })
    }

    pub(crate) fn insert_metrics(&self, out: &mut BTreeMap<String, f64>) {
        let key = |name: &str| format!("{}.{}", self.column, name);
        out.insert(key("statistic"), self.statistic);
        out.insert(key("drift_detected"), if self.drift_detected { 1.0 } else { 0.0 });
        out.insert(key("reference_mean"), self.reference_mean);
        out.insert(key("current_mean"), self.current_mean);
        if let Some(p) = self.p_value {
            out.insert(key("p_value"), p);
        }
    }
}

/// One verdict per numerical feature plus the dataset-level flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataDriftReport {
    pub columns: Vec<ColumnDrift>,
    pub number_of_columns: usize,
    pub number_of_drifted_columns: usize,
    pub share_of_drifted_columns: f64,
    pub drift_share: f64,
    pub dataset_drift: bool,
}

impl DataDriftReport {
    pub fn compute(
        reference: &DataFrame,
        current: &DataFrame,
        schema: &ColumnSchema,
        config: &DriftConfig,
    ) -> Result<Self> {
        if schema.numerical_features.is_empty() {
            return Err(MonitorError::report(
                ReportKind::DataDrift.to_string(),
                None,
                "schema has no numerical features",
            ));
        }

        let columns = schema
            .numerical_features
            .par_iter()
            .map(|column| {
                ColumnDrift::compute(reference, current, column, config, ReportKind::DataDrift)
            })
            .collect::<Result<Vec<_>>>()?;

        let number_of_columns = columns.len();
        let number_of_drifted_columns = columns.iter().filter(|c| c.drift_detected).count();

        Ok(Self {
            number_of_columns,
            number_of_drifted_columns,
            share_of_drifted_columns: number_of_drifted_columns as f64 / number_of_columns as f64,
            drift_share: config.drift_share,
            dataset_drift: config.dataset_drift(number_of_drifted_columns, number_of_columns),
            columns,
        })
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDrift> {
        self.columns.iter().find(|c| c.column == name)
    }

    pub fn metrics(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        out.insert("number_of_columns".to_string(), self.number_of_columns as f64);
        out.insert(
            "number_of_drifted_columns".to_string(),
            self.number_of_drifted_columns as f64,
        );
        out.insert(
            "share_of_drifted_columns".to_string(),
            self.share_of_drifted_columns,
        );
        out.insert(
            "dataset_drift".to_string(),
            if self.dataset_drift { 1.0 } else { 0.0 },
        );
        for column in &self.columns {
            column.insert_metrics(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn windows() -> (DataFrame, DataFrame) {
        let base: Vec<f64> = (0..40).map(|i| (i % 10) as f64).collect();
        let moved: Vec<f64> = base.iter().map(|v| v + 100.0).collect();
        let reference = df!("a" => &base, "b" => &base, "c" => &base).unwrap();
        let current = df!("a" => &moved, "b" => &moved, "c" => &base).unwrap();
        (reference, current)
    }

    fn schema() -> ColumnSchema {
        ColumnSchema::numeric(
            "y",
            "prediction",
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
        )
    }

    #[test]
    fn test_dataset_drift_when_majority_drifts() {
        let (reference, current) = windows();
        let report =
            DataDriftReport::compute(&reference, &current, &schema(), &DriftConfig::default())
                .unwrap();

        assert_eq!(report.number_of_columns, 3);
        assert_eq!(report.number_of_drifted_columns, 2);
        assert!(report.dataset_drift);
        assert!(!report.column("c").unwrap().drift_detected);
        assert_eq!(report.column("a").unwrap().stat_test, "ks");
    }

    #[test]
    fn test_missing_column_names_it() {
        let (reference, current) = windows();
        let current = current.drop("b").unwrap();
        let err = DataDriftReport::compute(&reference, &current, &schema(), &DriftConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("'b'"));
    }
}
