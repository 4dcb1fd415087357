//! Utility functions shared by the pipeline stages

pub mod frame;
pub mod stats;

pub use frame::{
    column_f64, column_names, column_values, columns_to_array2, f64_column, filter_rows,
    float_chunked, has_column,
};
pub use stats::{mean, median, population_std, quantiles, to_chunked};

use std::time::Instant;

/// Simple stage timer used for log lines
#[derive(Debug)]
pub struct Timer {
    name: String,
    start: Instant,
}

impl Timer {
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}
