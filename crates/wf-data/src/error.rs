//! Ingestion errors.

use wf_core::WfError;
use thiserror::Error;

pub type DataResult<T> = Result<T, DataError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Negative {what} for well {well}: {value}")]
    Negative {
        well: String,
        what: &'static str,
        value: f64,
    },

    #[error("Non-finite {what} for well {well}")]
    NonFinite { well: String, what: &'static str },

    #[error("Unknown SCADA signal tag: {0}")]
    UnknownSignal(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: String, end: String },
}

impl From<DataError> for WfError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::Negative { well, what, .. } => WfError::MissingData {
                well,
                what: format!("negative {what}"),
            },
            DataError::NonFinite { well, what } => WfError::MissingData {
                well,
                what: format!("non-finite {what}"),
            },
            DataError::UnknownSignal(_) => WfError::InvalidArg {
                what: "unknown SCADA signal tag",
            },
            DataError::InvalidDateRange { .. } => WfError::InvalidArg {
                what: "date range start after end",
            },
        }
    }
}
