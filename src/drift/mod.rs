//! Drift detection module
//!
//! Two-sample tests used to compare a reference window against a current
//! window, column by column.

mod data_drift;

pub use data_drift::{
    JensenShannonDivergence, KolmogorovSmirnovTest, PopulationStabilityIndex, WassersteinDistance,
    KS_ALPHA_MAX, KS_ALPHA_MIN,
};

use crate::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};

/// Drift detection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftResult {
    /// Test that produced this result
    pub method: String,
    /// Whether drift was detected
    pub drift_detected: bool,
    /// Drift score/statistic
    pub score: f64,
    /// P-value (if applicable)
    pub p_value: Option<f64>,
    /// Threshold used for detection
    pub threshold: f64,
    /// Drift severity (0=none, 1=warning, 2=critical)
    pub severity: u8,
    /// Additional information
    pub message: String,
}

impl DriftResult {
    /// Create a result indicating no drift
    pub fn no_drift(method: &str, score: f64, threshold: f64) -> Self {
        Self {
            method: method.to_string(),
            drift_detected: false,
            score,
            p_value: None,
            threshold,
            severity: 0,
            message: "No drift detected".to_string(),
        }
    }

    /// Create a result indicating drift
    pub fn drift(method: &str, score: f64, threshold: f64, severity: u8, message: &str) -> Self {
        Self {
            method: method.to_string(),
            drift_detected: true,
            score,
            p_value: None,
            threshold,
            severity,
            message: message.to_string(),
        }
    }

    pub fn with_p_value(mut self, p_value: f64) -> Self {
        self.p_value = Some(p_value);
        self
    }
}

/// Trait for drift detectors
pub trait DriftDetector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Detect drift between reference and current samples
    fn detect(&self, reference: &[f64], current: &[f64]) -> Result<DriftResult>;

    /// Get the threshold used for detection
    fn threshold(&self) -> f64;
}

pub(crate) fn check_samples(reference: &[f64], current: &[f64]) -> Result<()> {
    if reference.is_empty() || current.is_empty() {
        return Err(MonitorError::ComputationError(format!(
            "empty sample (reference: {}, current: {})",
            reference.len(),
            current.len()
        )));
    }
    if reference.iter().chain(current.iter()).any(|v| !v.is_finite()) {
        return Err(MonitorError::ComputationError(
            "samples contain non-finite values".to_string(),
        ));
    }
    Ok(())
}

/// Which two-sample test the reports run per column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatTest {
    /// KS for small reference samples, normed Wasserstein otherwise
    #[default]
    Auto,
    KolmogorovSmirnov,
    Wasserstein,
    Psi,
    JensenShannon,
}

/// Thresholds for every drift test plus the dataset-level rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftConfig {
    pub stat_test: StatTest,
    /// KS significance level
    pub ks_alpha: f64,
    /// Normed Wasserstein distance at or above which a column drifts
    pub wasserstein_threshold: f64,
    pub psi_threshold: f64,
    pub js_threshold: f64,
    /// `Auto` uses KS up to this many reference values
    pub auto_ks_max_rows: usize,
    /// Dataset drift when the drifted share of columns exceeds this
    pub drift_share: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            stat_test: StatTest::Auto,
            ks_alpha: 0.05,
            wasserstein_threshold: 0.1,
            psi_threshold: 0.1,
            js_threshold: 0.1,
            auto_ks_max_rows: 1000,
            drift_share: 0.5,
        }
    }
}

impl DriftConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stat_test(mut self, stat_test: StatTest) -> Self {
        self.stat_test = stat_test;
        self
    }

    pub fn with_drift_share(mut self, share: f64) -> Self {
        self.drift_share = share;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let checks = [
            (
                "ks_alpha",
                self.ks_alpha,
                (KS_ALPHA_MIN..=KS_ALPHA_MAX).contains(&self.ks_alpha),
            ),
            (
                "wasserstein_threshold",
                self.wasserstein_threshold,
                self.wasserstein_threshold > 0.0,
            ),
            ("psi_threshold", self.psi_threshold, self.psi_threshold > 0.0),
            (
                "js_threshold",
                self.js_threshold,
                self.js_threshold > 0.0 && self.js_threshold <= 1.0,
            ),
            (
                "drift_share",
                self.drift_share,
                (0.0..=1.0).contains(&self.drift_share),
            ),
        ];
        for (name, value, ok) in checks {
            if !ok {
                return Err(MonitorError::InvalidParameter {
                    name: name.to_string(),
                    value: value.to_string(),
                    reason: "out of range".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Detector for a column whose reference sample has `reference_len` values
    pub fn detector_for(&self, reference_len: usize) -> Box<dyn DriftDetector> {
        let test = match self.stat_test {
            StatTest::Auto if reference_len <= self.auto_ks_max_rows => {
                StatTest::KolmogorovSmirnov
            }
            StatTest::Auto => StatTest::Wasserstein,
            other => other,
        };
        match test {
            StatTest::KolmogorovSmirnov | StatTest::Auto => {
                Box::new(KolmogorovSmirnovTest::new(self.ks_alpha))
            }
            StatTest::Wasserstein => Box::new(WassersteinDistance::new(self.wasserstein_threshold)),
            StatTest::Psi => {
                Box::new(PopulationStabilityIndex::default().with_threshold(self.psi_threshold))
            }
            StatTest::JensenShannon => Box::new(JensenShannonDivergence::new(self.js_threshold)),
        }
    }

    /// Dataset-level verdict: strictly more than `drift_share` of columns drifted
    pub fn dataset_drift(&self, drifted: usize, total: usize) -> bool {
        total > 0 && (drifted as f64 / total as f64) > self.drift_share
    }
}
