//! Oil rate from liquid rate and watercut, summed into fieldwide curves.

use crate::interpolate::LookupRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wf_core::{Real, WellId, interquartile_mean, mean};
use wf_data::WellTest;
use wf_ipr::Calibration;

/// How per-well test values are averaged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatercutAveraging {
    #[default]
    Mean,
    /// Mean of the values between the first and third quartile
    InterquartileMean,
}

impl WatercutAveraging {
    fn average(self, values: &[Real]) -> Option<Real> {
        match self {
            Self::Mean => mean(values),
            Self::InterquartileMean => interquartile_mean(values),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WellTestAverages {
    /// Percent
    pub watercut: Real,
    /// bbl/day
    pub oil_volume: Real,
    pub tests_used: usize,
}

/// Average watercut and oil volume over one well's tests.
///
/// Tests missing either value, or with watercut outside 0..=100, are dropped.
/// Returns `None` when no test remains.
pub fn well_test_averages(tests: &[&WellTest], averaging: WatercutAveraging) -> Option<WellTestAverages> {
    let (watercuts, oil_volumes): (Vec<Real>, Vec<Real>) = tests
        .iter()
        .filter_map(|t| t.watercut.zip(t.oil_volume))
        .filter(|(wc, oil)| wc.is_finite() && (0.0..=100.0).contains(wc) && oil.is_finite())
        .unzip();

    Some(WellTestAverages {
        watercut: averaging.average(&watercuts)?,
        oil_volume: averaging.average(&oil_volumes)?,
        tests_used: watercuts.len(),
    })
}

/// Fieldwide total at one sweep pressure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldwidePoint {
    pub sweep_index: usize,
    pub power_fluid_pressure: Real,
    /// bbl/day
    pub total_oil_rate: Real,
    pub wells_contributing: usize,
}

/// Summed oil rate against power fluid pressure under one hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldwideCurve {
    pub calibration: Calibration,
    pub points: Vec<FieldwidePoint>,
}

/// Applies watercut to lookup rows and sums oil rate across wells.
#[derive(Debug, Clone, Copy, Default)]
pub struct OilRateResolver {
    averaging: WatercutAveraging,
}

impl OilRateResolver {
    pub fn new(averaging: WatercutAveraging) -> Self {
        Self { averaging }
    }

    /// Per-well test averages, keyed by well.
    pub fn averages(&self, tests: &[WellTest]) -> BTreeMap<WellId, WellTestAverages> {
        let mut by_well: BTreeMap<&WellId, Vec<&WellTest>> = BTreeMap::new();
        for t in tests {
            by_well.entry(&t.well_id).or_default().push(t);
        }
        by_well
            .into_iter()
            .filter_map(|(well, tests)| {
                let avg = well_test_averages(&tests, self.averaging);
                if avg.is_none() {
                    tracing::warn!(well = %well, "no well test with watercut and oil volume");
                }
                avg.map(|a| (well.clone(), a))
            })
            .collect()
    }

    /// Fill watercut and oil rate on each row, then build one fieldwide curve
    /// per hypothesis.
    ///
    /// Rows whose well has no usable tests keep `None` oil rates and do not
    /// contribute to the totals. Every sweep index present in `rows` appears in
    /// each curve, in ascending order.
    pub fn resolve(
        &self,
        rows: Vec<LookupRow>,
        tests: &[WellTest],
    ) -> (Vec<LookupRow>, Vec<FieldwideCurve>) {
        let averages = self.averages(tests);

        let rows: Vec<LookupRow> = rows
            .into_iter()
            .map(|mut row| {
                let watercut = averages.get(&row.well_id).map(|a| a.watercut);
                row.watercut = watercut;
                row.oil_rate = row.liquid_rate.map(|_, liquid| {
                    let wc = watercut?;
                    liquid.map(|q| q * (1.0 - wc / 100.0))
                });
                row
            })
            .collect();

        let curves = Calibration::ALL
            .into_iter()
            .map(|calibration| fieldwide_curve(&rows, calibration))
            .collect();
        (rows, curves)
    }
}

fn fieldwide_curve(rows: &[LookupRow], calibration: Calibration) -> FieldwideCurve {
    let mut totals: BTreeMap<usize, FieldwidePoint> = BTreeMap::new();
    for row in rows {
        let point = totals.entry(row.sweep_index).or_insert(FieldwidePoint {
            sweep_index: row.sweep_index,
            power_fluid_pressure: row.power_fluid_pressure,
            total_oil_rate: 0.0,
            wells_contributing: 0,
        });
        if let Some(oil) = *row.oil_rate.get(calibration) {
            point.total_oil_rate += oil;
            point.wells_contributing += 1;
        }
    }
    FieldwideCurve {
        calibration,
        points: totals.into_values().collect(),
    }
}
