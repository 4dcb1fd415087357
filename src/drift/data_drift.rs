//! Data drift detection methods

use super::{check_samples, DriftDetector, DriftResult};
use crate::error::Result;
use crate::utils::{population_std, quantiles, to_chunked};
use polars::prelude::ChunkAgg;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Accepted KS significance levels
pub const KS_ALPHA_MIN: f64 = 0.001;
pub const KS_ALPHA_MAX: f64 = 0.5;

/// Floor for the Wasserstein normaliser so constant references stay finite
const MIN_WASSERSTEIN_NORM: f64 = 0.001;

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    out
}

/// Asymptotic Kolmogorov distribution tail: P(D > d) for `lambda = sqrt(en) * d`
fn ks_p_value(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    let mut p = 0.0;
    for k in 1..=100 {
        let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
        let term = sign * (-2.0 * f64::from(k).powi(2) * lambda.powi(2)).exp();
        p += term;
        if term.abs() < 1e-10 {
            break;
        }
    }
    (2.0 * p).clamp(0.0, 1.0)
}

/// Two-sample KS statistic over sorted inputs
fn ks_statistic(a: &[f64], b: &[f64]) -> f64 {
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let (mut i, mut j) = (0usize, 0usize);
    let mut d = 0.0f64;
    while i < a.len() && j < b.len() {
        let x = a[i].min(b[j]);
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        d = d.max((i as f64 / n1 - j as f64 / n2).abs());
    }
    d
}

/// Kolmogorov-Smirnov test for distribution comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KolmogorovSmirnovTest {
    /// Significance level (alpha)
    alpha: f64,
}

impl KolmogorovSmirnovTest {
    /// Create new KS test
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(KS_ALPHA_MIN, KS_ALPHA_MAX),
        }
    }
}

impl Default for KolmogorovSmirnovTest {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl DriftDetector for KolmogorovSmirnovTest {
    fn name(&self) -> &'static str {
        "ks"
    }

    fn detect(&self, reference: &[f64], current: &[f64]) -> Result<DriftResult> {
        check_samples(reference, current)?;

        let ref_sorted = sorted(reference);
        let cur_sorted = sorted(current);
        let statistic = ks_statistic(&ref_sorted, &cur_sorted);

        let (n1, n2) = (reference.len() as f64, current.len() as f64);
        let en = (n1 * n2 / (n1 + n2)).sqrt();
        let p_value = ks_p_value(en * statistic);

        let result = if p_value < self.alpha {
            let severity = if p_value < self.alpha / 10.0 { 2 } else { 1 };
            DriftResult::drift(
                self.name(),
                statistic,
                self.alpha,
                severity,
                &format!("KS p-value ({:.4}) below alpha ({:.4})", p_value, self.alpha),
            )
        } else {
            DriftResult::no_drift(self.name(), statistic, self.alpha)
        };
        Ok(result.with_p_value(p_value))
    }

    fn threshold(&self) -> f64 {
        self.alpha
    }
}

/// Earth mover's distance between the two samples, divided by the reference
/// standard deviation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WassersteinDistance {
    threshold: f64,
}

impl WassersteinDistance {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.max(0.0),
        }
    }

    /// Unnormalised first Wasserstein distance: integral of |F_ref - F_cur|
    pub fn distance(reference: &[f64], current: &[f64]) -> f64 {
        let a = sorted(reference);
        let b = sorted(current);
        let mut all: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
        all.sort_by(|x, y| x.total_cmp(y));

        let (n1, n2) = (a.len() as f64, b.len() as f64);
        let (mut i, mut j) = (0usize, 0usize);
        let mut total = 0.0;
        for w in all.windows(2) {
            while i < a.len() && a[i] <= w[0] {
                i += 1;
            }
            while j < b.len() && b[j] <= w[0] {
                j += 1;
            }
            total += (i as f64 / n1 - j as f64 / n2).abs() * (w[1] - w[0]);
        }
        total
    }
}

impl Default for WassersteinDistance {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl DriftDetector for WassersteinDistance {
    fn name(&self) -> &'static str {
        "wasserstein"
    }

    fn detect(&self, reference: &[f64], current: &[f64]) -> Result<DriftResult> {
        check_samples(reference, current)?;

        let norm = population_std(reference)
            .unwrap_or(0.0)
            .max(MIN_WASSERSTEIN_NORM);
        let score = Self::distance(reference, current) / norm;

        if score >= self.threshold {
            let severity = if score >= self.threshold * 2.0 { 2 } else { 1 };
            Ok(DriftResult::drift(
                self.name(),
                score,
                self.threshold,
                severity,
                &format!(
                    "normed Wasserstein distance ({:.4}) reaches threshold ({:.4})",
                    score, self.threshold
                ),
            ))
        } else {
            Ok(DriftResult::no_drift(self.name(), score, self.threshold))
        }
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Population Stability Index (PSI)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationStabilityIndex {
    /// Number of bins
    n_bins: usize,
    /// Drift threshold
    threshold: f64,
}

impl PopulationStabilityIndex {
    /// Create new PSI calculator
    pub fn new(n_bins: usize) -> Self {
        Self {
            n_bins: n_bins.max(2),
            threshold: 0.1,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.max(0.0);
        self
    }

    /// Quantile bin edges from reference data
    fn compute_bin_edges(&self, reference: &[f64]) -> Result<Vec<f64>> {
        let probs: Vec<f64> = (1..self.n_bins)
            .map(|i| i as f64 / self.n_bins as f64)
            .collect();
        let mut edges = Vec::with_capacity(self.n_bins + 1);
        edges.push(f64::NEG_INFINITY);
        edges.extend(quantiles(&to_chunked(reference), &probs)?);
        edges.push(f64::INFINITY);
        Ok(edges)
    }

    /// Bin proportions, floored to avoid division by zero
    fn bin_data(&self, data: &[f64], edges: &[f64]) -> Vec<f64> {
        let n = data.len() as f64;
        let mut counts = vec![0usize; self.n_bins];
        for &value in data {
            if let Some(i) = (0..self.n_bins).find(|&i| value > edges[i] && value <= edges[i + 1]) {
                counts[i] += 1;
            }
        }
        counts.iter().map(|&c| (c as f64 / n).max(0.0001)).collect()
    }
}

impl Default for PopulationStabilityIndex {
    fn default() -> Self {
        Self::new(10)
    }
}

impl DriftDetector for PopulationStabilityIndex {
    fn name(&self) -> &'static str {
        "psi"
    }

    fn detect(&self, reference: &[f64], current: &[f64]) -> Result<DriftResult> {
        check_samples(reference, current)?;

        let edges = self.compute_bin_edges(reference)?;
        let ref_props = self.bin_data(reference, &edges);
        let cur_props = self.bin_data(current, &edges);

        let psi: f64 = ref_props
            .iter()
            .zip(cur_props.iter())
            .map(|(&p_ref, &p_cur)| (p_cur - p_ref) * (p_cur / p_ref).ln())
            .sum();

        if psi >= self.threshold {
            let severity = if psi >= 2.0 * self.threshold { 2 } else { 1 };
            Ok(DriftResult::drift(
                self.name(),
                psi,
                self.threshold,
                severity,
                &format!("PSI ({:.4}) reaches threshold ({:.4})", psi, self.threshold),
            ))
        } else {
            Ok(DriftResult::no_drift(self.name(), psi, self.threshold))
        }
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Jensen-Shannon Divergence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JensenShannonDivergence {
    /// Number of bins for histogram
    n_bins: usize,
    /// Threshold for drift detection
    threshold: f64,
}

impl JensenShannonDivergence {
    /// Create new JS divergence calculator
    pub fn new(threshold: f64) -> Self {
        Self {
            n_bins: 20,
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// Set number of bins
    pub fn with_bins(mut self, n: usize) -> Self {
        self.n_bins = n.max(5);
        self
    }

    fn histogram(&self, data: &[f64], min_val: f64, max_val: f64) -> Vec<f64> {
        let bin_width = (max_val - min_val) / self.n_bins as f64;
        let mut counts = vec![0usize; self.n_bins];
        let n = data.len() as f64;

        for &value in data {
            let bin = (((value - min_val) / bin_width).floor() as usize).min(self.n_bins - 1);
            counts[bin] += 1;
        }

        let epsilon = 1e-10;
        counts.iter().map(|&c| (c as f64 / n) + epsilon).collect()
    }

    fn kl_divergence(p: &[f64], q: &[f64]) -> f64 {
        p.iter()
            .zip(q.iter())
            .map(|(&pi, &qi)| if pi > 0.0 { pi * (pi / qi).ln() } else { 0.0 })
            .sum()
    }
}

impl Default for JensenShannonDivergence {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl DriftDetector for JensenShannonDivergence {
    fn name(&self) -> &'static str {
        "jensen_shannon"
    }

    fn detect(&self, reference: &[f64], current: &[f64]) -> Result<DriftResult> {
        check_samples(reference, current)?;

        let (ref_ca, cur_ca) = (to_chunked(reference), to_chunked(current));
        let min_val = ref_ca.min().unwrap_or(0.0).min(cur_ca.min().unwrap_or(0.0));
        let max_val = ref_ca.max().unwrap_or(0.0).max(cur_ca.max().unwrap_or(0.0));

        if (max_val - min_val).abs() < 1e-10 {
            return Ok(DriftResult::no_drift(self.name(), 0.0, self.threshold));
        }

        let p = self.histogram(reference, min_val, max_val);
        let q = self.histogram(current, min_val, max_val);
        let m: Vec<f64> = p.iter().zip(q.iter()).map(|(&pi, &qi)| (pi + qi) / 2.0).collect();

        // JS is bounded [0, ln 2], normalised to [0, 1]
        let js = (Self::kl_divergence(&p, &m) + Self::kl_divergence(&q, &m)) / 2.0;
        let js_normalized = js / 2.0_f64.ln();

        if js_normalized > self.threshold {
            let severity = if js_normalized > self.threshold * 2.0 { 2 } else { 1 };
            Ok(DriftResult::drift(
                self.name(),
                js_normalized,
                self.threshold,
                severity,
                &format!(
                    "JS divergence ({:.4}) exceeds threshold ({:.4})",
                    js_normalized, self.threshold
                ),
            ))
        } else {
            Ok(DriftResult::no_drift(self.name(), js_normalized, self.threshold))
        }
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shifted(n: usize, shift: f64) -> Vec<f64> {
        (0..n).map(|i| (i % 50) as f64 + shift).collect()
    }

    #[test]
    fn test_ks_no_drift_on_same_distribution() {
        let result = KolmogorovSmirnovTest::default()
            .detect(&shifted(200, 0.0), &shifted(100, 0.0))
            .unwrap();
        assert!(!result.drift_detected);
        assert!(result.p_value.unwrap() > 0.9);
    }

    #[test]
    fn test_ks_detects_shift() {
        let result = KolmogorovSmirnovTest::default()
            .detect(&shifted(200, 0.0), &shifted(200, 30.0))
            .unwrap();
        assert!(result.drift_detected);
        assert!(result.p_value.unwrap() < 0.05);
        assert!((result.score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_ks_constant_reference_vs_nonzero_current() {
        let result = KolmogorovSmirnovTest::default()
            .detect(&[0.0; 6], &[5.0, 7.0, 9.0, 11.0, 13.0, 15.0])
            .unwrap();
        assert_eq!(result.score, 1.0);
        assert!(result.drift_detected);
    }

    #[test]
    fn test_wasserstein_distance_of_shift() {
        // shifting every value by 2 moves all mass by 2
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [3.0, 4.0, 5.0, 6.0];
        assert!((WassersteinDistance::distance(&a, &b) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_wasserstein_normed_threshold() {
        let detector = WassersteinDistance::default();
        let same = detector.detect(&shifted(2000, 0.0), &shifted(2000, 0.0)).unwrap();
        assert!(!same.drift_detected);
        assert_eq!(same.score, 0.0);

        let moved = detector.detect(&shifted(2000, 0.0), &shifted(2000, 5.0)).unwrap();
        assert!(moved.drift_detected);
    }

    #[test]
    fn test_psi_and_js_detect_shift() {
        let reference = shifted(500, 0.0);
        let current = shifted(500, 40.0);
        assert!(PopulationStabilityIndex::default()
            .detect(&reference, &current)
            .unwrap()
            .drift_detected);
        assert!(JensenShannonDivergence::default()
            .detect(&reference, &current)
            .unwrap()
            .drift_detected);
    }

    #[test]
    fn test_psi_quantile_bins_on_same_sample() {
        let psi = PopulationStabilityIndex::default();
        let reference = shifted(300, 0.0);
        let edges = psi.compute_bin_edges(&reference).unwrap();
        assert_eq!(edges.len(), 11);
        assert!(edges.windows(2).all(|w| w[0] <= w[1]));

        let result = psi.detect(&reference, &reference).unwrap();
        assert!(!result.drift_detected);
        assert!(result.score.abs() < 1e-12);
    }

    #[test]
    fn test_empty_sample_is_error() {
        assert!(KolmogorovSmirnovTest::default().detect(&[], &[1.0]).is_err());
    }
}
