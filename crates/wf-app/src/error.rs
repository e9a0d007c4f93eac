//! Error types for the wf-app service layer.

use std::path::PathBuf;

/// Wraps errors from the backend crates so the CLI sees one type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Config validation failed: {0}")]
    Validation(String),

    #[error("Failed to read input file: {path}")]
    InputRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed input CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Run cancelled")]
    Cancelled,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for wf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<wf_fit::FitError> for AppError {
    fn from(err: wf_fit::FitError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<wf_lookup::LookupError> for AppError {
    fn from(err: wf_lookup::LookupError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<wf_data::DataError> for AppError {
    fn from(err: wf_data::DataError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<wf_results::ResultsError> for AppError {
    fn from(err: wf_results::ResultsError) -> Self {
        match err {
            wf_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}
