//! Run configuration for the monitoring pipeline

use crate::drift::DriftConfig;
use crate::error::{MonitorError, Result};
use crate::ingest::{DataSource, DEFAULT_FETCH_TIMEOUT_SECS};
use crate::preprocessing::PreprocessingConfig;
use crate::report::ReportSelection;
use crate::training::EstimatorConfig;
use crate::window::DateRange;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default location of the monitoring batch
pub const DEFAULT_SOURCE: &str = "data/Monitoring_data.csv";

/// Everything one monitoring run needs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Local path or http(s) URL of the raw batch
    pub source: String,
    pub fetch_timeout_secs: u64,
    pub date_range: DateRange,
    pub reports: ReportSelection,
    pub preprocessing: PreprocessingConfig,
    pub estimator: EstimatorConfig,
    pub drift: DriftConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            date_range: DateRange::default(),
            reports: ReportSelection::all(),
            preprocessing: PreprocessingConfig::default(),
            estimator: EstimatorConfig::default(),
            drift: DriftConfig::default(),
        }
    }
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file; absent fields keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| {
            MonitorError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|e| {
            MonitorError::ConfigError(format!("invalid config {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    /// Apply `FLIGHT_MONITOR_SOURCE` and `FLIGHT_MONITOR_FETCH_TIMEOUT_SECS`
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(source) = std::env::var("FLIGHT_MONITOR_SOURCE") {
            self.source = source;
        }
        if let Some(secs) = std::env::var("FLIGHT_MONITOR_FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.fetch_timeout_secs = secs;
        }
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.fetch_timeout_secs = secs;
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    pub fn with_reports(mut self, reports: ReportSelection) -> Self {
        self.reports = reports;
        self
    }

    pub fn with_preprocessing(mut self, preprocessing: PreprocessingConfig) -> Self {
        self.preprocessing = preprocessing;
        self
    }

    pub fn with_estimator(mut self, estimator: EstimatorConfig) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_drift(mut self, drift: DriftConfig) -> Self {
        self.drift = drift;
        self
    }

    pub fn data_source(&self) -> DataSource {
        DataSource::parse(&self.source)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Range checks only; an inverted date range is allowed and yields an
    /// empty current window
    pub fn validate(&self) -> Result<()> {
        if self.source.trim().is_empty() {
            return Err(MonitorError::ConfigError("source must not be empty".to_string()));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(MonitorError::InvalidParameter {
                name: "fetch_timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.preprocessing.handle_outliers && !(self.preprocessing.outlier_threshold > 0.0) {
            return Err(MonitorError::InvalidParameter {
                name: "outlier_threshold".to_string(),
                value: self.preprocessing.outlier_threshold.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        self.date_range.validate()?;
        self.estimator.validate()?;
        self.drift.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportKind;

    #[test]
    fn test_defaults_are_valid() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fetch_timeout(), Duration::from_secs(120));
        assert_eq!(config.reports.kinds().len(), 4);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "source": "https://example.org/batch.csv",
            "date_range": {"start_month": 2, "end_month": 4, "start_day": 1, "end_day": 10}
        }"#;
        let config: MonitorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.date_range, DateRange::new(2, 4, 1, 10));
        assert_eq!(config.fetch_timeout_secs, DEFAULT_FETCH_TIMEOUT_SECS);
        assert!(matches!(config.data_source(), DataSource::Remote(_)));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join("flight_monitor_config_test.json");
        let config = MonitorConfig::default()
            .with_reports(ReportSelection::only(ReportKind::DataDrift))
            .with_date_range(DateRange::new(3, 3, 1, 31));
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        let loaded = MonitorConfig::from_file(&path).unwrap();
        assert_eq!(loaded.reports, ReportSelection::only(ReportKind::DataDrift));
        assert_eq!(loaded.date_range.start_month, 3);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let config = MonitorConfig::default().with_date_range(DateRange::new(0, 4, 1, 10));
        assert!(config.validate().is_err());

        let inverted = MonitorConfig::default().with_date_range(DateRange::new(5, 2, 1, 10));
        assert!(inverted.validate().is_ok());

        assert!(MonitorConfig::default().with_fetch_timeout_secs(0).validate().is_err());
    }
}
