//! wf-lookup: decision tables from fitted wells.
//!
//! Turns aggregated pressure coefficients and IPR curves into lookup rows of
//! power fluid pressure → bottomhole pressure → liquid rate → oil rate, and
//! sums oil rate across wells into one fieldwide curve per IPR hypothesis.

pub mod bhp;
pub mod error;
pub mod hypothesis;
pub mod interpolate;
pub mod oil;
pub mod sweep;

pub use bhp::{BhpLookupRow, build_bhp_lookup};
pub use error::{LookupError, LookupResult};
pub use hypothesis::PerHypothesis;
pub use interpolate::{LiquidRateTable, LookupRow, assign_liquid_rates, interpolate_rate};
pub use oil::{
    FieldwideCurve, FieldwidePoint, OilRateResolver, WatercutAveraging, WellTestAverages,
    well_test_averages,
};
pub use sweep::PressureSweep;
