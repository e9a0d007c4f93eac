//! Stored result records.
//!
//! Tables are written as CSV, so every row type here is flat: per-hypothesis
//! values are spread over one column per calibration.

use serde::{Deserialize, Serialize};
use wf_fit::{AggregatedCoefficient, CoefficientRecord, EstimationError, WellFit};
use wf_ipr::IprCurve;
use wf_lookup::{FieldwideCurve, LookupRow};

pub type RunId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDigest {
    pub name: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub wells_total: usize,
    pub wells_fitted: usize,
    pub wells_failed: usize,
    pub tests_skipped: usize,
    pub coefficient_records: usize,
    pub wells_with_coefficient: usize,
    pub lookup_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    /// RFC 3339
    pub timestamp: String,
    pub pipeline_version: String,
    pub inputs: Vec<InputDigest>,
    /// Configuration the run used, as JSON
    pub config: serde_json::Value,
    pub summary: RunSummary,
}

impl RunManifest {
    pub fn timestamp_now() -> String {
        chrono::Utc::now().to_rfc3339()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitRow {
    pub well_id: String,
    pub reservoir_pressure: f64,
    pub cumulative_error: f64,
    pub candidates_evaluated: usize,
    pub samples: usize,
    pub max_observed_bhp: f64,
    pub mean_productivity_index: Option<f64>,
}

impl From<&WellFit> for FitRow {
    fn from(fit: &WellFit) -> Self {
        Self {
            well_id: fit.well_id.to_string(),
            reservoir_pressure: fit.reservoir_pressure,
            cumulative_error: fit.cumulative_error,
            candidates_evaluated: fit.candidates_evaluated,
            samples: fit.samples.len(),
            max_observed_bhp: fit.max_observed_bhp(),
            mean_productivity_index: fit.mean_productivity_index(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRow {
    pub well_id: String,
    pub kind: String,
    pub message: String,
}

impl From<&EstimationError> for FailureRow {
    fn from(err: &EstimationError) -> Self {
        Self {
            well_id: err.well().to_string(),
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IprCurveRow {
    pub well_id: String,
    pub calibration: String,
    pub reservoir_pressure: f64,
    pub reference_pressure: f64,
    pub reference_rate: f64,
    pub q_max: f64,
}

impl From<&IprCurve> for IprCurveRow {
    fn from(curve: &IprCurve) -> Self {
        Self {
            well_id: curve.well_id.to_string(),
            calibration: curve.calibration.as_str().to_string(),
            reservoir_pressure: curve.reservoir_pressure,
            reference_pressure: curve.reference_pressure,
            reference_rate: curve.reference_rate,
            q_max: curve.q_max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCoefficientRow {
    pub well_id: String,
    /// `YYYY-MM-DD`, empty for whole-series fits
    pub date: Option<String>,
    pub slope: f64,
    pub intercept: f64,
}

impl From<&CoefficientRecord> for RawCoefficientRow {
    fn from(r: &CoefficientRecord) -> Self {
        Self {
            well_id: r.well_id.to_string(),
            date: r.date.map(|d| d.format("%Y-%m-%d").to_string()),
            slope: r.slope,
            intercept: r.intercept,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientRow {
    pub well_id: String,
    pub slope: f64,
    pub intercept: f64,
    pub median_slope: Option<f64>,
    pub median_intercept: Option<f64>,
    pub valid_records: usize,
    pub insufficient: bool,
}

impl From<&AggregatedCoefficient> for CoefficientRow {
    fn from(c: &AggregatedCoefficient) -> Self {
        Self {
            well_id: c.well_id.to_string(),
            slope: c.mean_slope,
            intercept: c.mean_intercept,
            median_slope: c.median_slope,
            median_intercept: c.median_intercept,
            valid_records: c.valid_records,
            insufficient: c.insufficient,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupCsvRow {
    pub well_id: String,
    pub sweep_index: usize,
    pub power_fluid_pressure: f64,
    pub predicted_bhp: f64,
    pub liquid_rate_newest: Option<f64>,
    pub liquid_rate_lowest_bhp: Option<f64>,
    pub liquid_rate_median_bhp: Option<f64>,
    pub watercut: Option<f64>,
    pub oil_rate_newest: Option<f64>,
    pub oil_rate_lowest_bhp: Option<f64>,
    pub oil_rate_median_bhp: Option<f64>,
}

impl From<&LookupRow> for LookupCsvRow {
    fn from(r: &LookupRow) -> Self {
        Self {
            well_id: r.well_id.to_string(),
            sweep_index: r.sweep_index,
            power_fluid_pressure: r.power_fluid_pressure,
            predicted_bhp: r.predicted_bhp,
            liquid_rate_newest: r.liquid_rate.newest,
            liquid_rate_lowest_bhp: r.liquid_rate.lowest_bhp,
            liquid_rate_median_bhp: r.liquid_rate.median_bhp,
            watercut: r.watercut,
            oil_rate_newest: r.oil_rate.newest,
            oil_rate_lowest_bhp: r.oil_rate.lowest_bhp,
            oil_rate_median_bhp: r.oil_rate.median_bhp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldwideRow {
    pub calibration: String,
    pub sweep_index: usize,
    pub power_fluid_pressure: f64,
    pub total_oil_rate: f64,
    pub wells_contributing: usize,
}

impl FieldwideRow {
    pub fn from_curve(curve: &FieldwideCurve) -> Vec<Self> {
        curve
            .points
            .iter()
            .map(|p| Self {
                calibration: curve.calibration.as_str().to_string(),
                sweep_index: p.sweep_index,
                power_fluid_pressure: p.power_fluid_pressure,
                total_oil_rate: p.total_oil_rate,
                wells_contributing: p.wells_contributing,
            })
            .collect()
    }
}

/// Every table of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunTables {
    pub fits: Vec<FitRow>,
    pub failures: Vec<FailureRow>,
    pub ipr_curves: Vec<IprCurveRow>,
    pub coefficients_raw: Vec<RawCoefficientRow>,
    pub coefficients: Vec<CoefficientRow>,
    pub lookup: Vec<LookupCsvRow>,
    pub fieldwide: Vec<FieldwideRow>,
}
