//! Flight Delay Monitor - arrival-delay prediction with drift monitoring
//!
//! This crate provides:
//! - Cleaning of raw flight batches (imputation, one-hot encoding, outlier rejection)
//! - Reference/current partitioning by month and day-of-month
//! - Per-run model fitting and scoring of both windows
//! - Performance, target drift, data drift and data quality reports
//! - Offline model selection and single-record prediction
//! - CLI interface
//!
//! # Modules
//!
//! ## Pipeline stages
//! - [`ingest`] - Local and remote batch loading
//! - [`preprocessing`] - Cleaning of raw batches
//! - [`window`] - Reference/current partitioning
//! - [`training`] - Estimators, per-run trainer, model selection
//! - [`report`] - Report engine and renderers
//! - [`pipeline`] - End-to-end monitoring run
//!
//! ## Supporting modules
//! - [`schema`] - Column schema shared by every stage
//! - [`drift`] - Two-sample drift tests
//! - [`inference`] - Prediction service
//! - [`config`] - Run configuration
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;
pub mod schema;

// Pipeline stages
pub mod ingest;
pub mod preprocessing;
pub mod window;
pub mod training;
pub mod drift;
pub mod report;
pub mod pipeline;

// Prediction
pub mod inference;

// Utilities
pub mod config;
pub mod utils;

// Services
pub mod cli;

pub use error::{MonitorError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{MonitorError, Result};

    // Schema and configuration
    pub use crate::config::MonitorConfig;
    pub use crate::schema::{CategoricalVocabulary, CategoryLevels, ColumnSchema};

    // Stages
    pub use crate::ingest::DataSource;
    pub use crate::preprocessing::{
        CleanedDataset, CleaningReport, FlightPreprocessor, PreprocessingConfig,
    };
    pub use crate::window::{partition, DateRange};
    pub use crate::training::{
        EstimatorConfig, ModelArtifact, ModelSelector, RegressionMetrics, Regressor, ScoredWindows,
        Trainer,
    };

    // Drift and reports
    pub use crate::drift::{DriftConfig, DriftDetector, DriftResult, StatTest};
    pub use crate::report::{
        Report, ReportEngine, ReportKind, ReportRenderer, ReportSelection, ReportSet,
    };
    pub use crate::pipeline::{MonitoringPipeline, MonitoringRun};

    // Prediction
    pub use crate::inference::{FeatureRecord, FlightInput, PredictionService, RecordEncoder};
}
