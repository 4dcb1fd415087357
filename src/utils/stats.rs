//! Descriptive statistics through polars aggregates

use crate::error::{MonitorError, Result};
use polars::prelude::*;

/// Unnamed float column over a slice
pub fn to_chunked(values: &[f64]) -> Float64Chunked {
    Float64Chunked::from_slice(PlSmallStr::EMPTY, values)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    to_chunked(values).mean()
}

/// Standard deviation with ddof = 0
pub fn population_std(values: &[f64]) -> Option<f64> {
    to_chunked(values).std(0)
}

/// Median; the average of the two middle values for even lengths
pub fn median(values: &[f64]) -> Option<f64> {
    to_chunked(values).median()
}

/// Linear-interpolated quantiles of a column, nulls ignored
pub fn quantiles(ca: &Float64Chunked, probs: &[f64]) -> Result<Vec<f64>> {
    let series = ca.clone().into_series();
    probs
        .iter()
        .map(|&q| {
            let scalar = series.quantile_reduce(q, QuantileMethod::Linear)?;
            scalar.value().extract::<f64>().ok_or_else(|| {
                MonitorError::ComputationError(format!("no {} quantile of an empty column", q))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_population_std() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std(&v).unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(population_std(&[3.0, 3.0, 3.0]), Some(0.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_quantiles_interpolate() {
        let ca = to_chunked(&[5.0, 1.0, 4.0, 2.0, 3.0]);
        assert_eq!(quantiles(&ca, &[0.25, 0.5, 1.0]).unwrap(), vec![2.0, 3.0, 5.0]);
        assert!(quantiles(&to_chunked(&[]), &[0.5]).is_err());
    }
}
