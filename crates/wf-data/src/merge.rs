//! Time merge of well tests with SCADA readings.

use crate::dataset::{DateRange, WellDataset, WellSample, ZeroReadingPolicy};
use crate::scada::WellSeries;
use crate::well_test::WellTest;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fmt;
use wf_core::WellId;

/// Merge configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeOptions {
    /// Maximum distance between a test and the SCADA reading it joins to.
    /// Zero means exact timestamp match.
    pub tolerance: chrono::Duration,
    pub zero_readings: ZeroReadingPolicy,
    pub date_range: Option<DateRange>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            tolerance: chrono::Duration::zero(),
            zero_readings: ZeroReadingPolicy::default(),
            date_range: None,
        }
    }
}

/// Why a well test did not become a sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    OutsideDateRange,
    NoScadaSeries,
    NoMatchingReading,
    MissingBhp,
    MissingRate,
    ZeroReading,
    Invalid(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutsideDateRange => write!(f, "outside date range"),
            Self::NoScadaSeries => write!(f, "no SCADA series for well"),
            Self::NoMatchingReading => write!(f, "no SCADA reading at test time"),
            Self::MissingBhp => write!(f, "missing bottomhole pressure"),
            Self::MissingRate => write!(f, "missing total fluid rate"),
            Self::ZeroReading => write!(f, "zero reading treated as fault"),
            Self::Invalid(msg) => write!(f, "invalid sample: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTest {
    pub well_id: WellId,
    pub test_date: NaiveDateTime,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub dataset: WellDataset,
    pub skipped: Vec<SkippedTest>,
}

/// Inner-join well tests onto SCADA readings.
///
/// Tests keep their input order within each well. Tests lacking a rate, or
/// whose matched reading lacks bottomhole pressure, are reported as skipped and
/// never imputed.
pub fn merge_tests(
    series: &BTreeMap<WellId, WellSeries>,
    tests: &[WellTest],
    options: &MergeOptions,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for test in tests {
        match merge_one(series, test, options) {
            Ok(sample) => outcome.dataset.push(sample),
            Err(reason) => outcome.skipped.push(SkippedTest {
                well_id: test.well_id.clone(),
                test_date: test.test_date,
                reason,
            }),
        }
    }

    if !outcome.skipped.is_empty() {
        tracing::debug!(
            merged = outcome.dataset.sample_count(),
            skipped = outcome.skipped.len(),
            "well test merge finished with skipped tests"
        );
    }
    outcome
}

fn merge_one(
    series: &BTreeMap<WellId, WellSeries>,
    test: &WellTest,
    options: &MergeOptions,
) -> Result<WellSample, SkipReason> {
    if let Some(range) = &options.date_range {
        if !range.contains(test.test_date) {
            return Err(SkipReason::OutsideDateRange);
        }
    }

    let well_series = series
        .get(&test.well_id)
        .ok_or(SkipReason::NoScadaSeries)?;
    let (_, readings) = well_series
        .nearest(test.test_date, options.tolerance)
        .ok_or(SkipReason::NoMatchingReading)?;

    let bhp = readings.bhp.ok_or(SkipReason::MissingBhp)?;
    let rate = test.total_fluid_rate.ok_or(SkipReason::MissingRate)?;

    if !options.zero_readings.accepts(bhp, rate) {
        return Err(SkipReason::ZeroReading);
    }

    let mut sample = WellSample::new(test.well_id.clone(), test.test_date, bhp, rate)
        .map_err(|e| SkipReason::Invalid(e.to_string()))?;
    sample.header_pressure = readings.header_pressure;
    sample.wellhead_pressure = readings.wellhead_pressure;
    sample.power_fluid_pressure = readings.power_fluid_pressure;
    sample.power_fluid_rate = readings.power_fluid_rate;
    Ok(sample)
}
