//! Run execution and caching service.

use crate::config::PipelineConfig;
use crate::error::{AppError, AppResult};
use crate::io::{read_scada, read_well_tests};
use crate::pipeline::{PipelineInputs, PipelineReport, emit, run_stages};
use crate::progress::{PipelineProgressEvent, PipelineStage};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::time::Instant;
use wf_results::{
    CoefficientRow, FailureRow, FieldwideRow, FitRow, InputDigest, IprCurveRow, LookupCsvRow,
    RawCoefficientRow, RunManifest, RunStore, RunSummary, RunTables, compute_run_id, digest_bytes,
};

pub const PIPELINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub config: &'a PipelineConfig,
    pub scada_path: &'a Path,
    pub well_tests_path: &'a Path,
    /// Root of the run store
    pub output_dir: &'a Path,
    pub use_cache: bool,
    pub cancel: Option<&'a AtomicBool>,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub run_dir: PathBuf,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
}

fn read_input(path: &Path) -> AppResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| AppError::InputRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Execute or load a run based on request.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

/// Execute or load a run and stream progress events.
///
/// The run id hashes the configuration and both input files, so a repeated
/// request with unchanged inputs is served from the store.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(PipelineProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    request.config.validate()?;

    emit(
        &mut progress_cb,
        PipelineStage::LoadingInputs,
        started,
        Some("Reading input files".to_string()),
    );
    let scada_bytes = read_input(request.scada_path)?;
    let tests_bytes = read_input(request.well_tests_path)?;
    let inputs = vec![
        InputDigest {
            name: "scada".to_string(),
            sha256: digest_bytes(&scada_bytes),
        },
        InputDigest {
            name: "well_tests".to_string(),
            sha256: digest_bytes(&tests_bytes),
        },
    ];

    emit(
        &mut progress_cb,
        PipelineStage::CheckingCache,
        started,
        Some("Checking run cache".to_string()),
    );
    let run_id = compute_run_id(request.config, &inputs, PIPELINE_VERSION);
    let store = RunStore::new(request.output_dir.to_path_buf())?;

    if request.use_cache && store.has_run(&run_id) {
        emit(
            &mut progress_cb,
            PipelineStage::LoadingCachedResult,
            started,
            Some("Loading cached run".to_string()),
        );
        let manifest = store.load_manifest(&run_id)?;
        emit(&mut progress_cb, PipelineStage::Completed, started, None);
        return Ok(RunResponse {
            run_dir: store.run_dir(&run_id),
            run_id,
            manifest,
            loaded_from_cache: true,
        });
    }

    let scada = read_scada(scada_bytes.as_slice())?;
    let well_tests = read_well_tests(tests_bytes.as_slice())?;
    if scada.rejected > 0 || well_tests.rejected > 0 {
        tracing::warn!(
            scada_rejected = scada.rejected,
            tests_rejected = well_tests.rejected,
            "unusable input rows dropped"
        );
    }
    let pipeline_inputs = PipelineInputs {
        scada: scada.rows,
        well_tests: well_tests.tests,
    };

    let report = run_stages(
        request.config,
        &pipeline_inputs,
        request.cancel,
        &mut progress_cb,
    )?;

    emit(
        &mut progress_cb,
        PipelineStage::SavingResults,
        started,
        Some("Writing run directory".to_string()),
    );
    let manifest = RunManifest {
        run_id: run_id.clone(),
        timestamp: RunManifest::timestamp_now(),
        pipeline_version: PIPELINE_VERSION.to_string(),
        inputs,
        config: serde_json::to_value(request.config)?,
        summary: summarize(&report),
    };
    let run_dir = store.save_run(&manifest, &tables(&report))?;
    tracing::info!(run_id = %run_id, dir = %run_dir.display(), "run saved");

    emit(&mut progress_cb, PipelineStage::Completed, started, None);
    Ok(RunResponse {
        run_id,
        run_dir,
        manifest,
        loaded_from_cache: false,
    })
}

pub fn summarize(report: &PipelineReport) -> RunSummary {
    RunSummary {
        wells_total: report.wells.len(),
        wells_fitted: report.batch.fit_count(),
        wells_failed: report.batch.failure_count(),
        tests_skipped: report.skipped_tests.len(),
        coefficient_records: report.coefficient_records.len(),
        wells_with_coefficient: report.coefficients.iter().filter(|c| !c.insufficient).count(),
        lookup_rows: report.lookup.len(),
    }
}

pub fn tables(report: &PipelineReport) -> RunTables {
    RunTables {
        fits: report.batch.fits().map(FitRow::from).collect(),
        failures: report.batch.failures().map(FailureRow::from).collect(),
        ipr_curves: report.ipr_curves.iter().map(IprCurveRow::from).collect(),
        coefficients_raw: report
            .coefficient_records
            .iter()
            .map(RawCoefficientRow::from)
            .collect(),
        coefficients: report.coefficients.iter().map(CoefficientRow::from).collect(),
        lookup: report.lookup.iter().map(LookupCsvRow::from).collect(),
        fieldwide: report
            .fieldwide
            .iter()
            .flat_map(FieldwideRow::from_curve)
            .collect(),
    }
}

pub fn list_runs(output_dir: &Path) -> AppResult<Vec<RunManifest>> {
    let store = RunStore::new(output_dir.to_path_buf())?;
    Ok(store.list_runs()?)
}

pub fn load_run(output_dir: &Path, run_id: &str) -> AppResult<(RunManifest, Vec<FieldwideRow>)> {
    let store = RunStore::new(output_dir.to_path_buf())?;
    let manifest = store.load_manifest(run_id)?;
    let fieldwide = store.load_fieldwide(run_id)?;
    Ok((manifest, fieldwide))
}
