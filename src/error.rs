//! Error types for the flight delay monitor

use thiserror::Error;

/// Result type alias for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Main error type for the monitoring pipeline and prediction service
#[derive(Error, Debug)]
pub enum MonitorError {
    /// The raw dataset could not be fetched or parsed
    #[error("Data fetch error [{source_name}]: {message}")]
    DataFetch {
        source_name: String,
        message: String,
    },

    /// A window holds too little data for the requested stage
    #[error("Insufficient data in {window} window during {stage}: {message}")]
    InsufficientData {
        stage: String,
        window: String,
        message: String,
    },

    /// Feature columns do not match the schema the model was trained on
    #[error("Schema mismatch during {stage}: {message}")]
    SchemaMismatch {
        stage: String,
        message: String,
    },

    /// A single report kind could not be computed
    #[error("{report} report failed{}: {message}", .column.as_ref().map(|c| format!(" on column '{}'", c)).unwrap_or_default())]
    ReportComputation {
        report: String,
        column: Option<String>,
        message: String,
    },

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Computation error: {0}")]
    ComputationError(String),
}

impl MonitorError {
    pub fn data_fetch(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        MonitorError::DataFetch {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn insufficient_data(
        stage: impl Into<String>,
        window: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        MonitorError::InsufficientData {
            stage: stage.into(),
            window: window.into(),
            message: message.into(),
        }
    }

    pub fn schema_mismatch(stage: impl Into<String>, message: impl Into<String>) -> Self {
        MonitorError::SchemaMismatch {
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn report(
        report: impl Into<String>,
        column: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        MonitorError::ReportComputation {
            report: report.into(),
            column: column.map(str::to_string),
            message: message.into(),
        }
    }
}

impl From<polars::error::PolarsError> for MonitorError {
    fn from(err: polars::error::PolarsError) -> Self {
        MonitorError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        MonitorError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for MonitorError {
    fn from(err: ndarray::ShapeError) -> Self {
        MonitorError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for MonitorError {
    fn from(err: reqwest::Error) -> Self {
        let source_name = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "remote".to_string());
        MonitorError::DataFetch {
            source_name,
            message: err.to_string(),
        }
    }
}
