//! wf-ipr: inflow performance relationship models.
//!
//! Provides the Vogel inflow model and the calibrated per-well IPR curves built
//! from it:
//! - [`InflowModel`] predicts rate at any bottomhole pressure from one
//!   reference operating point and a reservoir pressure
//! - [`IprCurve`] is one calibration hypothesis for one well
//! - [`Calibration`] names the rule that picks the reference sample
//!
//! # Example
//!
//! ```
//! use wf_ipr::InflowModel;
//!
//! let model = InflowModel::new(400.0, 1200.0, 2400.0).unwrap();
//! assert!((model.rate_at(1200.0) - 400.0).abs() < 1e-9);
//! assert_eq!(model.rate_at(2400.0), 0.0);
//! assert!((model.rate_at(0.0) - model.max_rate()).abs() < 1e-9);
//! ```

pub mod curve;
pub mod error;
pub mod vogel;

pub use curve::{Calibration, IprCurve, IprPoint};
pub use error::{IprError, IprResult};
pub use vogel::{InflowModel, vogel_fraction};
