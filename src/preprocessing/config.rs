//! Preprocessing configuration

use crate::schema::CategoricalVocabulary;
use serde::{Deserialize, Serialize};

/// Configuration for cleaning raw flight batches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Whether to reject statistical outliers
    pub handle_outliers: bool,

    /// Outlier threshold (absolute z-score)
    pub outlier_threshold: f64,

    /// Repeat rejection until a pass removes nothing
    pub reject_until_stable: bool,

    /// Fixed categorical vocabulary; fitted from the batch when absent
    #[serde(default)]
    pub vocabulary: Option<CategoricalVocabulary>,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            handle_outliers: true,
            outlier_threshold: 3.0,
            reject_until_stable: true,
            vocabulary: None,
        }
    }
}

impl PreprocessingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the z-score threshold
    pub fn with_outlier_threshold(mut self, threshold: f64) -> Self {
        self.handle_outliers = true;
        self.outlier_threshold = threshold;
        self
    }

    /// Builder method to run exactly one rejection pass
    pub fn with_single_pass_rejection(mut self) -> Self {
        self.reject_until_stable = false;
        self
    }

    /// Builder method to disable outlier rejection
    pub fn without_outlier_rejection(mut self) -> Self {
        self.handle_outliers = false;
        self
    }

    /// Builder method to encode against a fixed vocabulary
    pub fn with_vocabulary(mut self, vocabulary: CategoricalVocabulary) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }
}
