//! End-to-end pipeline: SCADA rows and well tests in, fieldwide curves out.

use crate::config::PipelineConfig;
use crate::error::{AppError, AppResult};
use crate::progress::{PipelineProgressEvent, PipelineStage};
use chrono::NaiveDateTime;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use wf_core::WellId;
use wf_data::{ScadaRow, SkippedTest, WellSeries, WellTest, merge_tests, pivot_scada};
use wf_fit::{
    AggregatedCoefficient, BatchReport, CoefficientAggregator, CoefficientRecord,
    ReservoirPressureEstimator, daily_coefficients,
};
use wf_ipr::{Calibration, IprCurve};
use wf_lookup::{
    FieldwideCurve, LiquidRateTable, LookupRow, OilRateResolver, assign_liquid_rates,
    build_bhp_lookup,
};

/// Cleaned inputs for one run.
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    pub scada: Vec<ScadaRow>,
    pub well_tests: Vec<WellTest>,
}

/// Everything a run produces, in memory.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Wells considered after filtering, ascending
    pub wells: Vec<WellId>,
    pub skipped_tests: Vec<SkippedTest>,
    pub batch: BatchReport,
    pub ipr_curves: Vec<IprCurve>,
    pub coefficient_records: Vec<CoefficientRecord>,
    pub coefficients: Vec<AggregatedCoefficient>,
    pub lookup: Vec<LookupRow>,
    pub fieldwide: Vec<FieldwideCurve>,
}

pub(crate) fn emit(
    progress_cb: &mut Option<&mut dyn FnMut(PipelineProgressEvent)>,
    stage: PipelineStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(PipelineProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

fn check_cancel(cancel: Option<&AtomicBool>) -> AppResult<()> {
    if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
        return Err(AppError::Cancelled);
    }
    Ok(())
}

/// Run every stage on already loaded inputs.
///
/// Per-well problems never fail the run: they show up as batch failures,
/// skipped tests or sentinel coefficients. The run fails only on invalid
/// configuration or cancellation.
pub fn run_pipeline(
    config: &PipelineConfig,
    inputs: &PipelineInputs,
    cancel: Option<&AtomicBool>,
    mut progress_cb: Option<&mut dyn FnMut(PipelineProgressEvent)>,
) -> AppResult<PipelineReport> {
    run_stages(config, inputs, cancel, &mut progress_cb)
}

/// Stage runner shared with the run service, which keeps emitting on the
/// same callback after the pipeline returns.
pub(crate) fn run_stages(
    config: &PipelineConfig,
    inputs: &PipelineInputs,
    cancel: Option<&AtomicBool>,
    progress_cb: &mut Option<&mut dyn FnMut(PipelineProgressEvent)>,
) -> AppResult<PipelineReport> {
    let started = Instant::now();
    config.validate()?;
    let estimator = ReservoirPressureEstimator::new(config.grid)?;
    let aggregator = CoefficientAggregator::new(config.aggregation)?;

    let filter = config.well_filter();
    let keep = |well: &WellId| filter.is_empty() || filter.contains(well);
    let in_range = |ts: NaiveDateTime| config.date_range.is_none_or(|r| r.contains(ts));

    emit(progress_cb, PipelineStage::MergingTests, started, None);
    let series: BTreeMap<WellId, WellSeries> = pivot_scada(
        inputs
            .scada
            .iter()
            .filter(|r| keep(&r.well_id) && in_range(r.timestamp))
            .cloned(),
    );
    let tests: Vec<WellTest> = inputs
        .well_tests
        .iter()
        .filter(|t| keep(&t.well_id))
        .cloned()
        .collect();
    let merged = merge_tests(&series, &tests, &config.merge_options());
    let dataset = merged.dataset;

    let wells: Vec<WellId> = series
        .keys()
        .chain(dataset.well_ids())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    tracing::info!(
        wells = wells.len(),
        samples = dataset.sample_count(),
        skipped_tests = merged.skipped.len(),
        "inputs merged"
    );
    check_cancel(cancel)?;

    emit(
        progress_cb,
        PipelineStage::EstimatingReservoirPressure,
        started,
        Some(format!("{} wells", dataset.well_count())),
    );
    let batch = estimator.estimate_batch(&dataset, cancel);
    check_cancel(cancel)?;
    tracing::info!(
        fitted = batch.fit_count(),
        failed = batch.failure_count(),
        "reservoir pressure estimated"
    );

    emit(progress_cb, PipelineStage::BuildingIprCurves, started, None);
    let mut ipr_curves = Vec::new();
    let mut rate_table = LiquidRateTable::new();
    for fit in batch.fits() {
        let samples = dataset.samples(fit.well_id.as_str());
        for calibration in Calibration::ALL {
            let curve = IprCurve::calibrate(&fit.well_id, calibration, fit.reservoir_pressure, samples)
                .and_then(|curve| {
                    let points = curve.sample_points(config.ipr_sample_step_psi)?;
                    Ok((curve, points))
                });
            match curve {
                Ok((curve, points)) => {
                    rate_table.insert(fit.well_id.clone(), calibration, points);
                    ipr_curves.push(curve);
                }
                Err(err) => {
                    tracing::warn!(well = %fit.well_id, %calibration, "no IPR curve: {err}");
                }
            }
        }
    }
    check_cancel(cancel)?;

    emit(progress_cb, PipelineStage::FittingCoefficients, started, None);
    let coefficient_records: Vec<CoefficientRecord> = series
        .par_iter()
        .map(|(_, s)| daily_coefficients(s, &config.daily_fit, config.zero_readings))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();
    check_cancel(cancel)?;

    emit(progress_cb, PipelineStage::AggregatingCoefficients, started, None);
    let coefficients = aggregator.aggregate_all(&wells, &coefficient_records);
    tracing::info!(
        records = coefficient_records.len(),
        usable = coefficients.iter().filter(|c| !c.insufficient).count(),
        "pressure coefficients aggregated"
    );

    emit(progress_cb, PipelineStage::BuildingLookup, started, None);
    let bhp_rows = build_bhp_lookup(&coefficients, &config.pressure_sweep);
    let rows = assign_liquid_rates(&bhp_rows, &rate_table);

    emit(progress_cb, PipelineStage::ResolvingOilRate, started, None);
    let tests_in_range: Vec<WellTest> = tests
        .into_iter()
        .filter(|t| in_range(t.test_date))
        .collect();
    let (lookup, fieldwide) =
        OilRateResolver::new(config.watercut_averaging).resolve(rows, &tests_in_range);
    tracing::info!(rows = lookup.len(), "lookup table built");

    Ok(PipelineReport {
        wells,
        skipped_tests: merged.skipped,
        batch,
        ipr_curves,
        coefficient_records,
        coefficients,
        lookup,
        fieldwide,
    })
}
