//! wf-fit: per-well fitting.
//!
//! - [`estimator`]: grid search for reservoir pressure against the Vogel model,
//!   run per well in parallel with per-well results collected into a report
//! - [`daily_fit`]: least-squares bottomhole vs power fluid pressure lines per day
//! - [`aggregate`]: collapse daily lines into one coefficient per well

pub mod aggregate;
pub mod daily_fit;
pub mod error;
pub mod estimator;

pub use aggregate::{AggregatedCoefficient, AggregationConfig, CoefficientAggregator};
pub use daily_fit::{CoefficientRecord, DailyFitConfig, LinearFit, daily_coefficients, fit_linear};
pub use error::{EstimationError, FitError, FitResult};
pub use estimator::{
    BatchReport, GridSearchConfig, ReservoirPressureEstimator, SampleProductivity, WellFit,
    cumulative_abs_error,
};
