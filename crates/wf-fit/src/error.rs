//! Fitting errors.

use thiserror::Error;
use wf_core::WfError;

pub type FitResult<T> = Result<T, FitError>;

/// Configuration problems. These abort a run before any well is fitted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: &'static str },
}

/// Recoverable per-well estimation failure.
///
/// A failing well is reported and skipped; the rest of the batch continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimationError {
    #[error("Well {well}: missing data ({what})")]
    MissingData { well: String, what: String },

    #[error("Well {well}: insufficient data ({count} samples, need {required})")]
    InsufficientData {
        well: String,
        count: usize,
        required: usize,
    },

    #[error("Well {well}: no reservoir pressure candidate produced a finite error")]
    DegenerateFit { well: String },

    #[error("Well {well}: estimation cancelled")]
    Cancelled { well: String },
}

impl EstimationError {
    pub fn well(&self) -> &str {
        match self {
            Self::MissingData { well, .. }
            | Self::InsufficientData { well, .. }
            | Self::DegenerateFit { well }
            | Self::Cancelled { well } => well,
        }
    }

    /// Short machine-friendly category name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingData { .. } => "missing_data",
            Self::InsufficientData { .. } => "insufficient_data",
            Self::DegenerateFit { .. } => "degenerate_fit",
            Self::Cancelled { .. } => "cancelled",
        }
    }
}

impl From<FitError> for WfError {
    fn from(err: FitError) -> Self {
        match err {
            FitError::InvalidConfig { what } => WfError::InvalidArg { what },
        }
    }
}

impl From<EstimationError> for WfError {
    fn from(err: EstimationError) -> Self {
        let what = err.kind().to_string();
        WfError::MissingData {
            well: err.well().to_string(),
            what,
        }
    }
}
