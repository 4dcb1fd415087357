//! Data preprocessing module
//!
//! Turns a raw flight batch into model-ready numeric form:
//! - Leaky and identifier column removal
//! - Missing value imputation (zero fill and batch median)
//! - One-hot encoding of carrier, origin and destination
//! - Z-score outlier rejection

mod config;
mod encoder;
mod imputer;
mod pipeline;
pub mod outlier;

pub use config::PreprocessingConfig;
pub use encoder::OneHotEncoder;
pub use imputer::{ImputeStrategy, ImputedColumn, Imputer};
pub use outlier::{zscores, OutlierSummary, ZScoreFilter};
pub use pipeline::{CleanedDataset, CleaningReport, FlightPreprocessor};
