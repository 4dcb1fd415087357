//! Per-run fit on the reference window and scoring of both windows

use super::estimator::{EstimatorConfig, TrainedEstimator};
use super::models::Regressor;
use crate::error::{MonitorError, Result};
use crate::schema::ColumnSchema;
use crate::utils::{columns_to_array2, f64_column, has_column, Timer};
use ndarray::Array1;
use polars::prelude::*;
use tracing::info;

/// Both windows after scoring, each with a prediction column
#[derive(Debug, Clone)]
pub struct ScoredWindows {
    pub reference: DataFrame,
    pub current: DataFrame,
    pub estimator: TrainedEstimator,
    pub training_secs: f64,
}

/// Fits a fresh estimator per call; nothing is kept between calls
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: EstimatorConfig,
}

impl Trainer {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Fit on `reference[numerical_features] -> reference[target]` and write
    /// predictions into copies of both windows.
    pub fn fit_and_score(
        &self,
        reference: &DataFrame,
        current: &DataFrame,
        schema: &ColumnSchema,
    ) -> Result<ScoredWindows> {
        if reference.height() == 0 {
            return Err(MonitorError::insufficient_data(
                "training",
                "reference",
                "reference window has no rows",
            ));
        }
        for (window, df) in [("reference", reference), ("current", current)] {
            check_columns(df, &schema.numerical_features, window)?;
        }
        if !has_column(reference, &schema.target) {
            return Err(MonitorError::schema_mismatch(
                "training",
                format!("reference window has no target column '{}'", schema.target),
            ));
        }

        let timer = Timer::start("fit");
        let x = columns_to_array2(reference, &schema.numerical_features)?;
        let y: Array1<f64> = columns_to_array2(reference, &[schema.target.clone()])?
            .column(0)
            .to_owned();

        let mut estimator = self.config.build();
        estimator.fit(&x, &y)?;
        let training_secs = timer.elapsed_secs();
        info!(
            model = estimator.name(),
            rows = x.nrows(),
            features = x.ncols(),
            secs = training_secs,
            "model training completed"
        );

        let reference = score(&estimator, reference, schema)?;
        let current = score(&estimator, current, schema)?;

        Ok(ScoredWindows {
            reference,
            current,
            estimator,
            training_secs,
        })
    }
}

fn check_columns(df: &DataFrame, columns: &[String], window: &str) -> Result<()> {
    let missing: Vec<&str> = columns
        .iter()
        .filter(|c| !has_column(df, c))
        .map(String::as_str)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(MonitorError::schema_mismatch(
            "training",
            format!("{} window is missing feature columns {:?}", window, missing),
        ))
    }
}

/// New frame equal to `df` plus the prediction column
fn score(estimator: &TrainedEstimator, df: &DataFrame, schema: &ColumnSchema) -> Result<DataFrame> {
    let x = columns_to_array2(df, &schema.numerical_features)?;
    let predictions = estimator.predict(&x)?;
    let mut scored = df.clone();
    scored.with_column(f64_column(&schema.prediction, predictions.to_vec()))?;
    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::column_values;

    fn schema() -> ColumnSchema {
        ColumnSchema::numeric("y", "prediction", vec!["x".to_string()])
    }

    #[test]
    fn test_fit_and_score_adds_prediction() {
        let reference = df!("x" => &[1.0, 2.0, 3.0], "y" => &[2.0, 4.0, 6.0]).unwrap();
        let current = df!("x" => &[4.0, 5.0], "y" => &[8.0, 10.0]).unwrap();

        let scored = Trainer::new(EstimatorConfig::Linear)
            .fit_and_score(&reference, &current, &schema())
            .unwrap();

        let pred = column_values(&scored.current, "prediction").unwrap();
        assert!((pred[0] - 8.0).abs() < 1e-9);
        assert!((pred[1] - 10.0).abs() < 1e-9);
        // inputs untouched
        assert!(current.column("prediction").is_err());
    }

    #[test]
    fn test_empty_reference_is_insufficient() {
        let reference = df!("x" => Vec::<f64>::new(), "y" => Vec::<f64>::new()).unwrap();
        let current = df!("x" => &[1.0], "y" => &[1.0]).unwrap();
        let err = Trainer::default()
            .fit_and_score(&reference, &current, &schema())
            .unwrap_err();
        assert!(matches!(err, MonitorError::InsufficientData { .. }));
    }

    #[test]
    fn test_missing_feature_is_schema_mismatch() {
        let reference = df!("x" => &[1.0], "y" => &[1.0]).unwrap();
        let current = df!("z" => &[1.0], "y" => &[1.0]).unwrap();
        let err = Trainer::default()
            .fit_and_score(&reference, &current, &schema())
            .unwrap_err();
        assert!(matches!(err, MonitorError::SchemaMismatch { .. }));
    }
}
