//! Reference/current comparison reports
//!
//! Four independent report kinds are computed from a pair of scored windows
//! and the run's [`ColumnSchema`]:
//! - [`PerformanceReport`]: error metrics per window and their delta
//! - [`TargetDriftReport`]: drift of the target and prediction columns
//! - [`DataDriftReport`]: drift of every numerical feature plus a dataset verdict
//! - [`DataQualityReport`]: descriptive statistics and warnings per window
//!
//! Reports are plain structured values. Rendering lives in [`render`].

mod data_drift;
mod data_quality;
mod performance;
mod target_drift;
pub mod render;

pub use data_drift::{ColumnDrift, DataDriftReport};
pub use data_quality::{ColumnQuality, DataQualityReport, QualityWarning, WindowQuality};
pub use performance::PerformanceReport;
pub use render::{HtmlRenderer, ReportRenderer, TextRenderer};
pub use target_drift::TargetDriftReport;

use crate::drift::DriftConfig;
use crate::error::{MonitorError, Result};
use crate::schema::ColumnSchema;
use crate::utils::{column_f64, Timer};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, warn};

/// Report kinds, in presentation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Performance,
    TargetDrift,
    DataDrift,
    DataQuality,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::Performance,
        ReportKind::TargetDrift,
        ReportKind::DataDrift,
        ReportKind::DataQuality,
    ];

    /// Whether the report reads the prediction column
    pub fn needs_predictions(&self) -> bool {
        matches!(self, ReportKind::Performance | ReportKind::TargetDrift)
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Performance => "Model Performance Report",
            ReportKind::TargetDrift => "Target Drift Report",
            ReportKind::DataDrift => "Data Drift Report",
            ReportKind::DataQuality => "Data Quality Report",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportKind::Performance => "Performance",
            ReportKind::TargetDrift => "TargetDrift",
            ReportKind::DataDrift => "DataDrift",
            ReportKind::DataQuality => "DataQuality",
        };
        f.write_str(name)
    }
}

/// Which report kinds a run should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSelection {
    pub include_performance: bool,
    pub include_target_drift: bool,
    pub include_data_drift: bool,
    pub include_data_quality: bool,
}

impl Default for ReportSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl ReportSelection {
    pub fn all() -> Self {
        Self {
            include_performance: true,
            include_target_drift: true,
            include_data_drift: true,
            include_data_quality: true,
        }
    }

    pub fn none() -> Self {
        Self {
            include_performance: false,
            include_target_drift: false,
            include_data_drift: false,
            include_data_quality: false,
        }
    }

    pub fn only(kind: ReportKind) -> Self {
        Self::none().with(kind)
    }

    pub fn with(mut self, kind: ReportKind) -> Self {
        match kind {
            ReportKind::Performance => self.include_performance = true,
            ReportKind::TargetDrift => self.include_target_drift = true,
            ReportKind::DataDrift => self.include_data_drift = true,
            ReportKind::DataQuality => self.include_data_quality = true,
        }
        self
    }

    pub fn includes(&self, kind: ReportKind) -> bool {
        match kind {
            ReportKind::Performance => self.include_performance,
            ReportKind::TargetDrift => self.include_target_drift,
            ReportKind::DataDrift => self.include_data_drift,
            ReportKind::DataQuality => self.include_data_quality,
        }
    }

    pub fn kinds(&self) -> Vec<ReportKind> {
        ReportKind::ALL
            .into_iter()
            .filter(|k| self.includes(*k))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds().is_empty()
    }
}

/// One computed report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "report", rename_all = "snake_case")]
pub enum Report {
    Performance(PerformanceReport),
    TargetDrift(TargetDriftReport),
    DataDrift(DataDriftReport),
    DataQuality(DataQualityReport),
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::Performance(_) => ReportKind::Performance,
            Report::TargetDrift(_) => ReportKind::TargetDrift,
            Report::DataDrift(_) => ReportKind::DataDrift,
            Report::DataQuality(_) => ReportKind::DataQuality,
        }
    }

    /// Flat numeric view, keyed by dotted metric path
    pub fn metrics(&self) -> BTreeMap<String, f64> {
        match self {
            Report::Performance(r) => r.metrics(),
            Report::TargetDrift(r) => r.metrics(),
            Report::DataDrift(r) => r.metrics(),
            Report::DataQuality(r) => r.metrics(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A report kind that could not be computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportFailure {
    pub kind: ReportKind,
    pub error: String,
}

/// All reports of one run plus the kinds that failed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSet {
    pub generated_at: DateTime<Utc>,
    pub reports: Vec<Report>,
    pub failures: Vec<ReportFailure>,
}

impl ReportSet {
    pub fn get(&self, kind: ReportKind) -> Option<&Report> {
        self.reports.iter().find(|r| r.kind() == kind)
    }

    pub fn failure(&self, kind: ReportKind) -> Option<&ReportFailure> {
        self.failures.iter().find(|f| f.kind == kind)
    }

    pub fn performance(&self) -> Option<&PerformanceReport> {
        match self.get(ReportKind::Performance) {
            Some(Report::Performance(r)) => Some(r),
            _ => None,
        }
    }

    pub fn target_drift(&self) -> Option<&TargetDriftReport> {
        match self.get(ReportKind::TargetDrift) {
            Some(Report::TargetDrift(r)) => Some(r),
            _ => None,
        }
    }

    pub fn data_drift(&self) -> Option<&DataDriftReport> {
        match self.get(ReportKind::DataDrift) {
            Some(Report::DataDrift(r)) => Some(r),
            _ => None,
        }
    }

    pub fn data_quality(&self) -> Option<&DataQualityReport> {
        match self.get(ReportKind::DataQuality) {
            Some(Report::DataQuality(r)) => Some(r),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Computes reports from scored windows. Holds only configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportEngine {
    drift: DriftConfig,
}

impl ReportEngine {
    pub fn new(drift: DriftConfig) -> Self {
        Self { drift }
    }

    pub fn drift_config(&self) -> &DriftConfig {
        &self.drift
    }

    /// Compute one report kind. Inputs are only read.
    pub fn compute(
        &self,
        kind: ReportKind,
        reference: &DataFrame,
        current: &DataFrame,
        schema: &ColumnSchema,
    ) -> Result<Report> {
        let timer = Timer::start(kind.to_string());
        let report = match kind {
            ReportKind::Performance => {
                Report::Performance(PerformanceReport::compute(reference, current, schema)?)
            }
            ReportKind::TargetDrift => Report::TargetDrift(TargetDriftReport::compute(
                reference,
                current,
                schema,
                &self.drift,
            )?),
            ReportKind::DataDrift => Report::DataDrift(DataDriftReport::compute(
                reference,
                current,
                schema,
                &self.drift,
            )?),
            ReportKind::DataQuality => {
                Report::DataQuality(DataQualityReport::compute(reference, current, schema)?)
            }
        };
        info!(report = %kind, secs = timer.elapsed_secs(), "report computed");
        Ok(report)
    }

    /// Compute the selected kinds in parallel; a failing kind does not stop
    /// the others
    pub fn compute_selected(
        &self,
        selection: &ReportSelection,
        reference: &DataFrame,
        current: &DataFrame,
        schema: &ColumnSchema,
    ) -> ReportSet {
        let outcomes: Vec<(ReportKind, Result<Report>)> = selection
            .kinds()
            .into_par_iter()
            .map(|kind| (kind, self.compute(kind, reference, current, schema)))
            .collect();

        let mut reports = Vec::new();
        let mut failures = Vec::new();
        for (kind, outcome) in outcomes {
            match outcome {
                Ok(report) => reports.push(report),
                Err(err) => {
                    warn!(report = %kind, error = %err, "report failed");
                    failures.push(ReportFailure {
                        kind,
                        error: err.to_string(),
                    });
                }
            }
        }

        ReportSet {
            generated_at: Utc::now(),
            reports,
            failures,
        }
    }
}

/// Non-missing values of a column in one window, with report-scoped errors
pub(crate) fn window_values(
    df: &DataFrame,
    column: &str,
    report: ReportKind,
    window: &str,
) -> Result<Vec<f64>> {
    let values: Vec<f64> = column_f64(df, column)
        .map_err(|_| {
            MonitorError::report(
                report.to_string(),
                Some(column),
                format!("column missing from {} window", window),
            )
        })?
        .into_iter()
        .flatten()
        .collect();
    if values.is_empty() {
        return Err(MonitorError::report(
            report.to_string(),
            Some(column),
            format!("{} window has no values", window),
        ));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_kinds_in_order() {
        let selection =
            ReportSelection::only(ReportKind::DataQuality).with(ReportKind::Performance);
        assert_eq!(
            selection.kinds(),
            vec![ReportKind::Performance, ReportKind::DataQuality]
        );
        assert!(ReportSelection::none().is_empty());
        assert_eq!(ReportSelection::default().kinds().len(), 4);
    }

    #[test]
    fn test_window_values_errors_name_column() {
        let df = df!("a" => &[None::<f64>, None]).unwrap();
        let err = window_values(&df, "a", ReportKind::DataDrift, "current").unwrap_err();
        assert!(err.to_string().contains("'a'"));
        assert!(err.to_string().contains("current"));

        let err = window_values(&df, "b", ReportKind::DataDrift, "reference").unwrap_err();
        assert!(matches!(err, MonitorError::ReportComputation { .. }));
    }
}
