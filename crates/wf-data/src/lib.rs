//! wf-data: typed ingestion boundary for well data.
//!
//! SCADA readings arrive as long `(well, timestamp, signal, value)` rows and
//! well tests as sparse, manually recorded events. This crate pivots the former,
//! cleans the latter and joins both on time into a [`WellDataset`] whose samples
//! are ready for fitting. Schema checks happen here so the fitting crates never
//! see a sample without bottomhole pressure or rate.

pub mod clean;
pub mod dataset;
pub mod error;
pub mod merge;
pub mod scada;

pub use clean::parse_numeric;
pub use dataset::{DateRange, WellDataset, WellSample, ZeroReadingPolicy};
pub use error::{DataError, DataResult};
pub use merge::{MergeOptions, MergeOutcome, SkipReason, SkippedTest, merge_tests};
pub use scada::{ScadaRow, Signal, SignalReadings, WellSeries, pivot_scada, to_naive_utc};
pub use well_test::WellTest;
