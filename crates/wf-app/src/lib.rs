//! Application service layer for wellflow.
//!
//! Owns the pipeline configuration, input loading and orchestration of the
//! fitting crates, and is the only layer allowed to abort a whole run. The CLI
//! is a thin wrapper over this crate.

pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod progress;
pub mod run_service;

pub use config::PipelineConfig;
pub use error::{AppError, AppResult};
pub use io::{ScadaLoad, WellTestLoad, load_scada, load_well_tests, read_scada, read_well_tests};
pub use pipeline::{PipelineInputs, PipelineReport, run_pipeline};
pub use progress::{PipelineProgressEvent, PipelineStage};
pub use run_service::{RunRequest, RunResponse, ensure_run, ensure_run_with_progress, list_runs, load_run};
pub use wf_ipr::Calibration;
pub use wf_results::{FieldwideRow, RunManifest, RunSummary};
