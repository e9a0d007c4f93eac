//! Merged per-well samples ready for fitting.

use crate::error::{DataError, DataResult};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use wf_core::{Real, WellId};

/// How zero bottomhole-pressure or rate readings are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroReadingPolicy {
    /// Zero is a telemetry fault; the reading is dropped.
    #[default]
    Fault,
    /// Zero is a genuine shut-in observation and is kept.
    ShutIn,
}

impl ZeroReadingPolicy {
    /// Whether a (bhp, rate) observation passes the policy.
    pub fn accepts(self, bhp: Real, rate: Real) -> bool {
        match self {
            Self::Fault => bhp != 0.0 && rate != 0.0,
            Self::ShutIn => true,
        }
    }

    /// Whether a single pressure reading passes the policy.
    pub fn accepts_pressure(self, pressure: Real) -> bool {
        match self {
            Self::Fault => pressure != 0.0,
            Self::ShutIn => true,
        }
    }
}

/// Inclusive calendar date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DataResult<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> DataResult<()> {
        if self.start > self.end {
            return Err(DataError::InvalidDateRange {
                start: self.start.to_string(),
                end: self.end.to_string(),
            });
        }
        Ok(())
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        let day = ts.date();
        day >= self.start && day <= self.end
    }
}

/// One time-stamped observation for one well.
#[derive(Debug, Clone, PartialEq)]
pub struct WellSample {
    pub well_id: WellId,
    pub timestamp: NaiveDateTime,
    /// psi, never negative
    pub bottomhole_pressure: Real,
    /// bbl/day
    pub total_fluid_rate: Real,
    pub header_pressure: Option<Real>,
    pub wellhead_pressure: Option<Real>,
    pub power_fluid_pressure: Option<Real>,
    pub power_fluid_rate: Option<Real>,
}

impl WellSample {
    /// Create a sample carrying only the fitted fields.
    pub fn new(
        well_id: WellId,
        timestamp: NaiveDateTime,
        bottomhole_pressure: Real,
        total_fluid_rate: Real,
    ) -> DataResult<Self> {
        if !bottomhole_pressure.is_finite() {
            return Err(DataError::NonFinite {
                well: well_id.to_string(),
                what: "bottomhole pressure",
            });
        }
        if !total_fluid_rate.is_finite() {
            return Err(DataError::NonFinite {
                well: well_id.to_string(),
                what: "total fluid rate",
            });
        }
        if bottomhole_pressure < 0.0 {
            return Err(DataError::Negative {
                well: well_id.to_string(),
                what: "bottomhole pressure",
                value: bottomhole_pressure,
            });
        }
        if total_fluid_rate < 0.0 {
            return Err(DataError::Negative {
                well: well_id.to_string(),
                what: "total fluid rate",
                value: total_fluid_rate,
            });
        }
        Ok(Self {
            well_id,
            timestamp,
            bottomhole_pressure,
            total_fluid_rate,
            header_pressure: None,
            wellhead_pressure: None,
            power_fluid_pressure: None,
            power_fluid_rate: None,
        })
    }
}

/// Typed mapping from well to its merged samples.
///
/// Samples keep insertion order within a well; the estimator calibrates on the
/// first one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WellDataset {
    wells: BTreeMap<WellId, Vec<WellSample>>,
}

impl WellDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: WellSample) {
        self.wells
            .entry(sample.well_id.clone())
            .or_default()
            .push(sample);
    }

    pub fn samples(&self, well: &str) -> &[WellSample] {
        self.wells.get(well).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn well_ids(&self) -> impl Iterator<Item = &WellId> {
        self.wells.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WellId, &[WellSample])> {
        self.wells.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn well_count(&self) -> usize {
        self.wells.len()
    }

    pub fn sample_count(&self) -> usize {
        self.wells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    /// Keep only the listed wells. An empty set keeps everything.
    pub fn retain_wells(&mut self, keep: &BTreeSet<WellId>) {
        if keep.is_empty() {
            return;
        }
        self.wells.retain(|id, _| keep.contains(id));
    }
}

impl FromIterator<WellSample> for WellDataset {
    fn from_iter<I: IntoIterator<Item = WellSample>>(iter: I) -> Self {
        let mut dataset = Self::new();
        for sample in iter {
            dataset.push(sample);
        }
        dataset
    }
}
