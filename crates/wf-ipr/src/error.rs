//! IPR model errors.

use thiserror::Error;
use wf_core::WfError;

pub type IprResult<T> = Result<T, IprError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IprError {
    /// Reference pressure at or above reservoir pressure leaves q_max undefined.
    #[error(
        "Degenerate reference: pressure {pressure_ref} psi is not below reservoir pressure {reservoir_pressure} psi"
    )]
    DegenerateReference {
        pressure_ref: f64,
        reservoir_pressure: f64,
    },

    #[error("Non-physical value for {what}: {value}")]
    NonPhysical { what: &'static str, value: f64 },

    #[error("No calibration sample for well {well}")]
    NoCalibrationSample { well: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

impl From<IprError> for WfError {
    fn from(err: IprError) -> Self {
        match err {
            IprError::DegenerateReference { .. } => WfError::Invariant {
                what: "IPR reference pressure must be below reservoir pressure",
            },
            IprError::NonPhysical { what, value } if value.is_finite() => {
                WfError::OutOfRange { what, value }
            }
            IprError::NonPhysical { what, value } => WfError::NonFinite { what, value },
            IprError::NoCalibrationSample { well } => WfError::MissingData {
                well,
                what: "calibration sample".to_string(),
            },
            IprError::InvalidArg { what } => WfError::InvalidArg { what },
        }
    }
}
