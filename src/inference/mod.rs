//! Single-record delay prediction
//!
//! Provides:
//! - [`FlightInput`]: the raw fields of one flight as a user would enter them
//! - [`RecordEncoder`]: turns a `FlightInput` into a [`FeatureRecord`] keyed by
//!   the model's feature columns
//! - [`PredictionService`]: validates a record against the trained schema and
//!   returns the predicted arrival delay in minutes
//!
//! The service performs no encoding of its own. Records that do not match the
//! trained column set are rejected rather than zero-filled.

mod encoder;
mod service;

pub use encoder::{ClockTime, FlightInput, RecordEncoder};
pub use service::PredictionService;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One encoded record: feature column name -> value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    values: BTreeMap<String, f64>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, value: f64) {
        self.values.insert(column.into(), value);
    }

    pub fn with(mut self, column: impl Into<String>, value: f64) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }

    pub fn remove(&mut self, column: &str) -> Option<f64> {
        self.values.remove(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, f64)> for FeatureRecord {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
