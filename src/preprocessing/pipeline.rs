//! Flight batch cleaning pipeline

use super::{
    config::PreprocessingConfig,
    encoder::OneHotEncoder,
    imputer::{ImputeStrategy, ImputedColumn, Imputer},
    outlier::{OutlierSummary, ZScoreFilter},
};
use crate::error::{MonitorError, Result};
use crate::schema::{
    CategoricalVocabulary, ColumnSchema, CATEGORICAL_COLUMNS, DELAY_CAUSE_COLUMNS,
    DROPPED_COLUMNS, MEDIAN_IMPUTED_COLUMNS,
};
use crate::utils::Timer;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Bookkeeping for one `clean` call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_in: usize,
    pub rows_out: usize,
    pub columns_dropped: Vec<String>,
    pub imputed: Vec<ImputedColumn>,
    pub unmatched_categories: usize,
    pub outliers: OutlierSummary,
    pub elapsed_secs: f64,
}

/// A cleaned batch together with the schema it was encoded against
#[derive(Debug, Clone)]
pub struct CleanedDataset {
    pub frame: DataFrame,
    pub schema: ColumnSchema,
    pub report: CleaningReport,
}

impl CleanedDataset {
    pub fn height(&self) -> usize {
        self.frame.height()
    }
}

/// Cleans raw flight batches into model-ready numeric frames.
///
/// Steps run in a fixed order: drop leaky columns, impute, encode
/// categoricals, reject outliers. The preprocessor keeps no state between
/// calls; every statistic comes from the batch being cleaned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlightPreprocessor {
    config: PreprocessingConfig,
}

impl FlightPreprocessor {
    /// Create a new preprocessor with default configuration
    pub fn new() -> Self {
        Self::with_config(PreprocessingConfig::default())
    }

    /// Create a new preprocessor with custom configuration
    pub fn with_config(config: PreprocessingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    /// Clean and preprocess a raw batch
    pub fn clean(&self, raw: &DataFrame) -> Result<CleanedDataset> {
        let timer = Timer::start("clean");
        let mut report = CleaningReport {
            rows_in: raw.height(),
            ..Default::default()
        };
        info!(rows = raw.height(), cols = raw.width(), "cleaning data");

        let (df, dropped) = self.remove_features(raw)?;
        report.columns_dropped = dropped;

        let df = Self::cast_numeric_to_f64(&df)?;

        let (df, imputed) = self.impute_missing_values(&df)?;
        report.imputed = imputed;

        let (df, vocabulary, unmatched) = self.encode_categorical_features(&df)?;
        report.unmatched_categories = unmatched;
        if unmatched > 0 {
            warn!(cells = unmatched, "categorical codes missing or outside vocabulary");
        }

        let schema = ColumnSchema::flights(vocabulary);
        schema.validate()?;

        let (df, outliers) = self.remove_outliers(&df, &schema)?;
        report.outliers = outliers;
        report.rows_out = df.height();
        report.elapsed_secs = timer.elapsed_secs();

        info!(
            rows = df.height(),
            cols = df.width(),
            rejected = report.outliers.rejected_rows,
            "shape after data cleaning"
        );

        Ok(CleanedDataset {
            frame: df,
            schema,
            report,
        })
    }

    /// Remove identifier and leakage columns; absent ones are skipped
    pub fn remove_features(&self, df: &DataFrame) -> Result<(DataFrame, Vec<String>)> {
        let mut result = df.clone();
        let mut dropped = Vec::new();
        for name in DROPPED_COLUMNS {
            if result.column(name).is_ok() {
                result = result.drop(name)?;
                dropped.push(name.to_string());
            }
        }
        debug!(?dropped, "removed unnecessary columns");
        Ok((result, dropped))
    }

    /// Zero-fill delay causes, then median-fill from this batch
    pub fn impute_missing_values(&self, df: &DataFrame) -> Result<(DataFrame, Vec<ImputedColumn>)> {
        let (df, mut imputed) =
            Imputer::new(ImputeStrategy::Constant(0.0)).fit_transform(df, &DELAY_CAUSE_COLUMNS)?;
        let (df, median_imputed) =
            Imputer::new(ImputeStrategy::Median).fit_transform(&df, &MEDIAN_IMPUTED_COLUMNS)?;
        imputed.extend(median_imputed);

        for column in imputed.iter().filter(|c| c.filled_cells > 0) {
            debug!(
                column = %column.column,
                filled = column.filled_cells,
                value = column.fill_value,
                "imputed missing values"
            );
        }
        Ok((df, imputed))
    }

    /// One-hot encode carrier/origin/destination
    pub fn encode_categorical_features(
        &self,
        df: &DataFrame,
    ) -> Result<(DataFrame, CategoricalVocabulary, usize)> {
        let encoder = match &self.config.vocabulary {
            Some(vocabulary) => OneHotEncoder::with_vocabulary(vocabulary.clone()),
            None => OneHotEncoder::new(),
        };
        encoder.fit_transform(df, &CATEGORICAL_COLUMNS)
    }

    /// Reject rows by z-score over the numerical feature columns
    pub fn remove_outliers(
        &self,
        df: &DataFrame,
        schema: &ColumnSchema,
    ) -> Result<(DataFrame, OutlierSummary)> {
        if !self.config.handle_outliers {
            return Ok((df.clone(), OutlierSummary::default()));
        }
        let mut filter = ZScoreFilter::new(self.config.outlier_threshold);
        if !self.config.reject_until_stable {
            filter = filter.single_pass();
        }
        filter.apply(df, &schema.numerical_features)
    }

    /// Cast all numeric columns to Float64 for consistent processing
    fn cast_numeric_to_f64(df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();
        for col in df.get_columns() {
            let dtype = col.dtype();
            if dtype.is_primitive_numeric() && dtype != &DataType::Float64 {
                let casted = col
                    .cast(&DataType::Float64)
                    .map_err(|e| MonitorError::DataError(e.to_string()))?;
                result.with_column(casted)?;
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::column_names;

    #[test]
    fn test_remove_features_skips_absent_columns() {
        let df = df!(
            "Year" => &[2008i64],
            "TailNum" => &["N1"],
            "Month" => &[1i64],
        )
        .unwrap();
        let (out, dropped) = FlightPreprocessor::new().remove_features(&df).unwrap();
        assert_eq!(column_names(&out), vec!["Month".to_string()]);
        assert_eq!(dropped, vec!["Year".to_string(), "TailNum".to_string()]);
    }

    #[test]
    fn test_cast_numeric_to_f64() {
        let df = df!("a" => &[1i64, 2], "b" => &["x", "y"]).unwrap();
        let out = FlightPreprocessor::cast_numeric_to_f64(&df).unwrap();
        assert_eq!(out.column("a").unwrap().dtype(), &DataType::Float64);
        assert_eq!(out.column("b").unwrap().dtype(), &DataType::String);
    }
}
