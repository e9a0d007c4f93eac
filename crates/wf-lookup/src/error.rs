//! Lookup table errors.

use thiserror::Error;
use wf_core::WfError;

pub type LookupResult<T> = Result<T, LookupError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("Invalid pressure sweep: {what}")]
    InvalidSweep { what: &'static str },
}

impl From<LookupError> for WfError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::InvalidSweep { what } => WfError::InvalidArg { what },
        }
    }
}
