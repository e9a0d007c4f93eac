//! SCADA time series rows and the per-well pivot.

use crate::error::DataError;
use chrono::{DateTime, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use wf_core::{Real, WellId};

/// Measured signal carried by a SCADA tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Downhole gauge pressure (psi)
    Bhp,
    /// Surface gathering header pressure (psi)
    HeaderPressure,
    /// Wellhead pressure (psi)
    WellheadPressure,
    /// Jet pump power fluid pressure (psi)
    PowerFluidPressure,
    /// Jet pump power fluid rate (bbl/day)
    PowerFluidRate,
}

impl Signal {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bhp => "bhp",
            Self::HeaderPressure => "header_pressure",
            Self::WellheadPressure => "wellhead_pressure",
            Self::PowerFluidPressure => "power_fluid_pressure",
            Self::PowerFluidRate => "power_fluid_rate",
        }
    }
}

impl FromStr for Signal {
    type Err = DataError;

    /// Accepts the snake_case names as well as the historian column labels
    /// (`BHP`, `HeaderP`, `WHP`, `PF_Pres`, `PF_Rate`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        match key.as_str() {
            "bhp" => Ok(Self::Bhp),
            "header_pressure" | "headerp" => Ok(Self::HeaderPressure),
            "wellhead_pressure" | "whp" => Ok(Self::WellheadPressure),
            "power_fluid_pressure" | "pf_pres" => Ok(Self::PowerFluidPressure),
            "power_fluid_rate" | "pf_rate" => Ok(Self::PowerFluidRate),
            _ => Err(DataError::UnknownSignal(s.to_string())),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One long-format historian row.
#[derive(Debug, Clone, PartialEq)]
pub struct ScadaRow {
    pub well_id: WellId,
    /// Naive UTC timestamp
    pub timestamp: NaiveDateTime,
    pub signal: Signal,
    pub value: Real,
}

/// Normalize a zoned timestamp to the naive-UTC convention used for merging.
pub fn to_naive_utc<Tz: TimeZone>(ts: &DateTime<Tz>) -> NaiveDateTime {
    ts.naive_utc()
}

/// All signals observed for one well at one timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalReadings {
    pub bhp: Option<Real>,
    pub header_pressure: Option<Real>,
    pub wellhead_pressure: Option<Real>,
    pub power_fluid_pressure: Option<Real>,
    pub power_fluid_rate: Option<Real>,
}

impl SignalReadings {
    pub fn get(&self, signal: Signal) -> Option<Real> {
        match signal {
            Signal::Bhp => self.bhp,
            Signal::HeaderPressure => self.header_pressure,
            Signal::WellheadPressure => self.wellhead_pressure,
            Signal::PowerFluidPressure => self.power_fluid_pressure,
            Signal::PowerFluidRate => self.power_fluid_rate,
        }
    }

    pub fn set(&mut self, signal: Signal, value: Real) {
        let slot = match signal {
            Signal::Bhp => &mut self.bhp,
            Signal::HeaderPressure => &mut self.header_pressure,
            Signal::WellheadPressure => &mut self.wellhead_pressure,
            Signal::PowerFluidPressure => &mut self.power_fluid_pressure,
            Signal::PowerFluidRate => &mut self.power_fluid_rate,
        };
        *slot = Some(value);
    }
}

/// Time-indexed readings for a single well.
#[derive(Debug, Clone, PartialEq)]
pub struct WellSeries {
    pub well_id: WellId,
    pub readings: BTreeMap<NaiveDateTime, SignalReadings>,
}

impl WellSeries {
    pub fn new(well_id: WellId) -> Self {
        Self {
            well_id,
            readings: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn has_signal(&self, signal: Signal) -> bool {
        self.readings.values().any(|r| r.get(signal).is_some())
    }

    /// Reading at `ts`, or the closest one within `tolerance` of it.
    ///
    /// Equidistant neighbours resolve to the earlier reading.
    pub fn nearest(
        &self,
        ts: NaiveDateTime,
        tolerance: chrono::Duration,
    ) -> Option<(NaiveDateTime, &SignalReadings)> {
        if let Some(r) = self.readings.get(&ts) {
            return Some((ts, r));
        }
        if tolerance <= chrono::Duration::zero() {
            return None;
        }
        let before = self.readings.range(..ts).next_back();
        let after = self.readings.range(ts..).next();
        let candidates = [before, after];
        candidates
            .into_iter()
            .flatten()
            .filter(|(t, _)| (**t - ts).abs() <= tolerance)
            .min_by_key(|(t, _)| (**t - ts).abs())
            .map(|(t, r)| (*t, r))
    }
}

/// Pivot long historian rows into per-well wide series.
///
/// Non-finite values are dropped. When the same (well, timestamp, signal)
/// appears twice the later row wins.
pub fn pivot_scada(rows: impl IntoIterator<Item = ScadaRow>) -> BTreeMap<WellId, WellSeries> {
    let mut wells: BTreeMap<WellId, WellSeries> = BTreeMap::new();
    let mut dropped = 0usize;

    for row in rows {
        if !row.value.is_finite() {
            dropped += 1;
            continue;
        }
        let series = wells
            .entry(row.well_id.clone())
            .or_insert_with(|| WellSeries::new(row.well_id.clone()));
        series
            .readings
            .entry(row.timestamp)
            .or_default()
            .set(row.signal, row.value);
    }

    if dropped > 0 {
        tracing::debug!(dropped, "dropped non-finite SCADA values");
    }
    wells
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn row(well: &str, t: NaiveDateTime, signal: Signal, value: Real) -> ScadaRow {
        ScadaRow {
            well_id: WellId::from(well),
            timestamp: t,
            signal,
            value,
        }
    }

    #[test]
    fn signal_accepts_historian_labels() {
        assert_eq!("BHP".parse::<Signal>().unwrap(), Signal::Bhp);
        assert_eq!("HeaderP".parse::<Signal>().unwrap(), Signal::HeaderPressure);
        assert_eq!("WHP".parse::<Signal>().unwrap(), Signal::WellheadPressure);
        assert_eq!("PF_Pres".parse::<Signal>().unwrap(), Signal::PowerFluidPressure);
        assert_eq!("pf_rate".parse::<Signal>().unwrap(), Signal::PowerFluidRate);
        assert!("Choke".parse::<Signal>().is_err());
    }

    #[test]
    fn pivot_groups_by_well_and_time() {
        let rows = vec![
            row("A", ts(0, 0), Signal::Bhp, 1200.0),
            row("A", ts(0, 0), Signal::PowerFluidPressure, 2900.0),
            row("A", ts(0, 5), Signal::Bhp, 1210.0),
            row("B", ts(0, 0), Signal::Bhp, 900.0),
            row("B", ts(0, 5), Signal::Bhp, Real::NAN),
        ];
        let wells = pivot_scada(rows);

        assert_eq!(wells.len(), 2);
        let a = &wells["A"];
        assert_eq!(a.len(), 2);
        assert_eq!(a.readings[&ts(0, 0)].bhp, Some(1200.0));
        assert_eq!(a.readings[&ts(0, 0)].power_fluid_pressure, Some(2900.0));
        assert!(a.has_signal(Signal::PowerFluidPressure));
        assert_eq!(wells["B"].len(), 1);
        assert!(!wells["B"].has_signal(Signal::WellheadPressure));
    }

    #[test]
    fn nearest_respects_tolerance() {
        let wells = pivot_scada(vec![
            row("A", ts(0, 0), Signal::Bhp, 1.0),
            row("A", ts(0, 10), Signal::Bhp, 2.0),
        ]);
        let a = &wells["A"];

        assert!(a.nearest(ts(0, 3), chrono::Duration::zero()).is_none());
        let (t, r) = a.nearest(ts(0, 3), chrono::Duration::minutes(5)).unwrap();
        assert_eq!(t, ts(0, 0));
        assert_eq!(r.bhp, Some(1.0));
        let (t, _) = a.nearest(ts(0, 8), chrono::Duration::minutes(5)).unwrap();
        assert_eq!(t, ts(0, 10));
        // tie goes to the earlier reading
        let (t, _) = a.nearest(ts(0, 5), chrono::Duration::minutes(5)).unwrap();
        assert_eq!(t, ts(0, 0));
        assert!(a.nearest(ts(1, 0), chrono::Duration::minutes(5)).is_none());
    }

    #[test]
    fn zoned_timestamps_normalize_to_utc() {
        let alaska = FixedOffset::west_opt(8 * 3600).unwrap();
        let local = alaska.with_ymd_and_hms(2024, 5, 1, 4, 0, 0).unwrap();
        assert_eq!(to_naive_utc(&local), ts(12, 0));
    }
}
