//! Z-score outlier rejection

use crate::error::Result;
use crate::utils::{filter_rows, float_chunked};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Standard deviations below this are treated as a constant column
const MIN_STD: f64 = 1e-12;

/// Summary of a rejection run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    /// Rows dropped because a scored column had no value
    pub incomplete_rows: usize,
    /// Rows dropped for |z| above the threshold
    pub rejected_rows: usize,
    /// Passes that removed at least one row
    pub passes: usize,
}

/// Z-scores of a column against its own mean and population std.
///
/// A constant column scores zero everywhere, as do missing cells.
pub fn zscores(ca: &Float64Chunked) -> Vec<f64> {
    match (ca.mean(), ca.std(0)) {
        (Some(m), Some(s)) if s > MIN_STD => ca
            .into_iter()
            .map(|v| v.map_or(0.0, |v| (v - m) / s))
            .collect(),
        _ => vec![0.0; ca.len()],
    }
}

/// Drops rows whose z-score exceeds the threshold in any scored column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZScoreFilter {
    threshold: f64,
    until_stable: bool,
}

impl ZScoreFilter {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            until_stable: true,
        }
    }

    /// Stop after the first pass instead of iterating to a fixed point
    pub fn single_pass(mut self) -> Self {
        self.until_stable = false;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Inlier mask over the given columns, computed on this batch
    pub fn inlier_mask(&self, df: &DataFrame, columns: &[String]) -> Result<Vec<bool>> {
        let mut keep = vec![true; df.height()];
        for col_name in columns {
            let ca = float_chunked(df, col_name)?;
            for (row, z) in zscores(&ca).into_iter().enumerate() {
                if z.abs() > self.threshold {
                    keep[row] = false;
                }
            }
        }
        Ok(keep)
    }

    /// Remove incomplete rows, then outliers.
    ///
    /// When iterating, the result has no row with |z| above the threshold
    /// relative to the returned batch itself.
    pub fn apply(&self, df: &DataFrame, columns: &[String]) -> Result<(DataFrame, OutlierSummary)> {
        let mut summary = OutlierSummary::default();

        let mut complete = vec![true; df.height()];
        for col_name in columns {
            let ca = float_chunked(df, col_name)?;
            if ca.null_count() == 0 {
                continue;
            }
            for (row, v) in ca.into_iter().enumerate() {
                if v.is_none() {
                    complete[row] = false;
                }
            }
        }
        summary.incomplete_rows = complete.iter().filter(|k| !**k).count();
        let mut current = if summary.incomplete_rows > 0 {
            filter_rows(df, &complete)?
        } else {
            df.clone()
        };

        loop {
            let keep = self.inlier_mask(&current, columns)?;
            let removed = keep.iter().filter(|k| !**k).count();
            if removed == 0 {
                break;
            }
            current = filter_rows(&current, &keep)?;
            summary.rejected_rows += removed;
            summary.passes += 1;
            debug!(pass = summary.passes, removed, remaining = current.height(), "outlier pass");
            if !self.until_stable {
                break;
            }
        }

        Ok((current, summary))
    }
}

impl Default for ZScoreFilter {
    fn default() -> Self {
        Self::new(3.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_spike() -> DataFrame {
        let mut x: Vec<f64> = (0..30).map(|i| (i % 5) as f64).collect();
        x.push(500.0);
        let y: Vec<f64> = vec![1.0; 31];
        df!("x" => &x, "y" => &y).unwrap()
    }

    #[test]
    fn test_zscores_constant_column() {
        let ca = Float64Chunked::from_slice("x".into(), &[4.0, 4.0, 4.0]);
        assert_eq!(zscores(&ca), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_zscores_use_population_std() {
        let ca = Float64Chunked::from_slice("x".into(), &[1.0, 3.0]);
        assert_eq!(zscores(&ca), vec![-1.0, 1.0]);
    }

    #[test]
    fn test_rejects_spike() {
        let cols = vec!["x".to_string(), "y".to_string()];
        let (out, summary) = ZScoreFilter::new(3.0).apply(&with_spike(), &cols).unwrap();
        assert_eq!(out.height(), 30);
        assert_eq!(summary.rejected_rows, 1);
    }

    #[test]
    fn test_rejection_is_idempotent() {
        let cols = vec!["x".to_string(), "y".to_string()];
        let filter = ZScoreFilter::new(3.0);
        let (once, _) = filter.apply(&with_spike(), &cols).unwrap();
        let (twice, summary) = filter.apply(&once, &cols).unwrap();
        assert_eq!(once.height(), twice.height());
        assert_eq!(summary.rejected_rows, 0);
    }

    #[test]
    fn test_incomplete_rows_dropped() {
        let df = df!("x" => &[Some(1.0), None, Some(2.0)]).unwrap();
        let (out, summary) = ZScoreFilter::default()
            .apply(&df, &["x".to_string()])
            .unwrap();
        assert_eq!(out.height(), 2);
        assert_eq!(summary.incomplete_rows, 1);
    }
}
