//! Prediction against a loaded model artifact

use super::FeatureRecord;
use crate::error::{MonitorError, Result};
use crate::training::{ModelArtifact, Regressor};
use ndarray::Array2;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

const STAGE: &str = "prediction";

/// Read-only prediction service over one trained model
#[derive(Debug, Clone)]
pub struct PredictionService {
    artifact: ModelArtifact,
    /// Indicator column -> categorical family
    indicator_families: BTreeMap<String, String>,
}

impl PredictionService {
    pub fn new(artifact: ModelArtifact) -> Result<Self> {
        if !artifact.estimator.is_fitted() {
            return Err(MonitorError::ModelNotFitted);
        }
        let indicator_families = artifact.schema.vocabulary.indicator_families();
        Ok(Self {
            artifact,
            indicator_families,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let artifact = ModelArtifact::load(path)?;
        info!(
            path = %path.display(),
            model = %artifact.model_name,
            features = artifact.feature_columns.len(),
            "loaded model"
        );
        Self::new(artifact)
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.artifact.feature_columns
    }

    /// Predicted arrival delay in minutes
    pub fn predict(&self, record: &FeatureRecord) -> Result<f64> {
        self.validate(record)?;

        let row: Vec<f64> = self
            .artifact
            .feature_columns
            .iter()
            .map(|c| record.get(c).unwrap_or(0.0))
            .collect();
        let x = Array2::from_shape_vec((1, row.len()), row)?;
        let prediction = self.artifact.estimator.predict(&x)?;
        let delay = prediction.first().copied().ok_or_else(|| {
            MonitorError::ComputationError("model returned no prediction".to_string())
        })?;
        debug!(delay, "predicted delay");
        Ok(delay)
    }

    /// Reject records that do not match the trained column set exactly
    fn validate(&self, record: &FeatureRecord) -> Result<()> {
        let expected = &self.artifact.feature_columns;

        let missing: Vec<&str> = expected
            .iter()
            .filter(|c| record.get(c).is_none())
            .map(String::as_str)
            .collect();
        let unexpected: Vec<&str> = record
            .columns()
            .filter(|c| !expected.iter().any(|e| e.as_str() == *c))
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(MonitorError::schema_mismatch(
                STAGE,
                format!(
                    "record columns differ from model features (missing {:?}, unexpected {:?})",
                    missing, unexpected
                ),
            ));
        }

        let mut active: BTreeMap<&str, &str> = BTreeMap::new();
        for column in expected {
            let value = record.get(column).unwrap_or(0.0);
            if !value.is_finite() {
                return Err(MonitorError::schema_mismatch(
                    STAGE,
                    format!("column '{}' has non-finite value {}", column, value),
                ));
            }
            let Some(family) = self.indicator_families.get(column) else {
                continue;
            };
            if value != 0.0 && value != 1.0 {
                return Err(MonitorError::schema_mismatch(
                    STAGE,
                    format!("indicator '{}' must be 0 or 1, got {}", column, value),
                ));
            }
            if value == 1.0 {
                if let Some(other) = active.insert(family.as_str(), column.as_str()) {
                    return Err(MonitorError::schema_mismatch(
                        STAGE,
                        format!(
                            "family '{}' has more than one active indicator ('{}', '{}')",
                            family, other, column
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}
