//! Missing value imputation strategies

use crate::error::Result;
use crate::utils::float_chunked;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Strategy for imputing missing values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with a constant value
    Constant(f64),
    /// Replace with the median of the batch the imputer was fitted on
    Median,
}

/// What one imputed column received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputedColumn {
    pub column: String,
    pub strategy: ImputeStrategy,
    pub fill_value: f64,
    pub filled_cells: usize,
}

/// Imputer for handling missing values.
///
/// Median fill values come from whatever batch `fit` sees, so two batches
/// with identical missing cells can receive different fill values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: BTreeMap<String, f64>,
    is_fitted: bool,
}

impl Imputer {
    /// Create a new imputer with the specified strategy
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: BTreeMap::new(),
            is_fitted: false,
        }
    }

    /// Fit the imputer to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let ca = float_chunked(df, col_name)?;
            let fill_value = self.compute_fill_value(col_name, &ca);
            self.fill_values.insert(col_name.to_string(), fill_value);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data by imputing missing values
    pub fn transform(&self, df: &DataFrame) -> Result<(DataFrame, Vec<ImputedColumn>)> {
        if !self.is_fitted {
            return Err(crate::error::MonitorError::ModelNotFitted);
        }

        let mut result = df.clone();
        let mut imputed = Vec::with_capacity(self.fill_values.len());

        for (col_name, &fill_value) in &self.fill_values {
            let ca = float_chunked(df, col_name)?;
            let filled_cells = ca.null_count();
            result.with_column(ca.fill_null_with_values(fill_value)?.into_series())?;

            imputed.push(ImputedColumn {
                column: col_name.clone(),
                strategy: self.strategy.clone(),
                fill_value,
                filled_cells,
            });
        }

        Ok((result, imputed))
    }

    /// Fit and transform in one step
    pub fn fit_transform(
        &mut self,
        df: &DataFrame,
        columns: &[&str],
    ) -> Result<(DataFrame, Vec<ImputedColumn>)> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    pub fn fill_values(&self) -> &BTreeMap<String, f64> {
        &self.fill_values
    }

    fn compute_fill_value(&self, col_name: &str, ca: &Float64Chunked) -> f64 {
        match &self.strategy {
            ImputeStrategy::Constant(val) => *val,
            ImputeStrategy::Median => {
                ca.median().unwrap_or_else(|| {
                    warn!(column = col_name, "column has no values, imputing 0.0");
                    0.0
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::column_values;

    #[test]
    fn test_imputer_requires_fit() {
        let imputer = Imputer::new(ImputeStrategy::Median);
        let df = df!("a" => &[1.0]).unwrap();
        assert!(imputer.transform(&df).is_err());
    }

    #[test]
    fn test_constant_imputation() {
        let df = df!("delay" => &[Some(5.0), None, None]).unwrap();
        let mut imputer = Imputer::new(ImputeStrategy::Constant(0.0));
        let (out, summary) = imputer.fit_transform(&df, &["delay"]).unwrap();

        assert_eq!(column_values(&out, "delay").unwrap(), vec![5.0, 0.0, 0.0]);
        assert_eq!(summary[0].filled_cells, 2);
    }

    #[test]
    fn test_median_is_batch_relative() {
        let batch_a = df!("t" => &[Some(1.0), Some(3.0), None]).unwrap();
        let batch_b = df!("t" => &[Some(10.0), Some(30.0), None]).unwrap();

        let (a, _) = Imputer::new(ImputeStrategy::Median)
            .fit_transform(&batch_a, &["t"])
            .unwrap();
        let (b, _) = Imputer::new(ImputeStrategy::Median)
            .fit_transform(&batch_b, &["t"])
            .unwrap();

        assert_eq!(column_values(&a, "t").unwrap()[2], 2.0);
        assert_eq!(column_values(&b, "t").unwrap()[2], 20.0);
    }

    #[test]
    fn test_all_missing_median_falls_back_to_zero() {
        let df = df!("t" => &[None::<f64>, None]).unwrap();
        let (out, summary) = Imputer::new(ImputeStrategy::Median)
            .fit_transform(&df, &["t"])
            .unwrap();
        assert_eq!(column_values(&out, "t").unwrap(), vec![0.0, 0.0]);
        assert_eq!(summary[0].fill_value, 0.0);
    }

    #[test]
    fn test_impute_strategy_serialize() {
        let json = serde_json::to_string(&ImputeStrategy::Constant(0.0)).unwrap();
        assert!(json.contains("Constant"));
    }
}
