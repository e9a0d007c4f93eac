//! Liquid rate at a predicted bottomhole pressure, read off sampled IPR curves.

use crate::bhp::BhpLookupRow;
use crate::hypothesis::PerHypothesis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wf_core::{Real, WellId};
use wf_ipr::{Calibration, IprPoint};

/// Linear interpolation of rate at `bhp` over sampled curve points.
///
/// Points need not be sorted. Non-finite points are ignored. Returns `None`
/// when `bhp` lies outside the sampled pressure range or no usable points
/// remain; there is no extrapolation.
pub fn interpolate_rate(bhp: Real, points: &[IprPoint]) -> Option<Real> {
    if !bhp.is_finite() {
        return None;
    }
    let mut pts: Vec<IprPoint> = points
        .iter()
        .copied()
        .filter(|p| p.bhp.is_finite() && p.rate.is_finite())
        .collect();
    pts.sort_by(|a, b| a.bhp.total_cmp(&b.bhp));

    let first = pts.first()?;
    let last = pts.last()?;
    if bhp < first.bhp || bhp > last.bhp {
        return None;
    }

    let upper = pts.partition_point(|p| p.bhp < bhp);
    let hi = pts.get(upper)?;
    if hi.bhp == bhp || upper == 0 {
        return Some(hi.rate);
    }
    let lo = &pts[upper - 1];
    let span = hi.bhp - lo.bhp;
    if span <= 0.0 {
        return Some(lo.rate);
    }
    let t = (bhp - lo.bhp) / span;
    Some(lo.rate + t * (hi.rate - lo.rate))
}

/// Sampled IPR points keyed by well and calibration.
#[derive(Debug, Clone, Default)]
pub struct LiquidRateTable {
    curves: BTreeMap<(WellId, Calibration), Vec<IprPoint>>,
}

impl LiquidRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, well_id: WellId, calibration: Calibration, points: Vec<IprPoint>) {
        self.curves.insert((well_id, calibration), points);
    }

    pub fn points(&self, well_id: &WellId, calibration: Calibration) -> Option<&[IprPoint]> {
        self.curves
            .get(&(well_id.clone(), calibration))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// `None` when the well has no curve for `calibration` or `bhp` is outside
    /// the curve.
    pub fn interpolate_liquid_rate(
        &self,
        well_id: &WellId,
        calibration: Calibration,
        bhp: Real,
    ) -> Option<Real> {
        interpolate_rate(bhp, self.points(well_id, calibration)?)
    }
}

/// One well at one sweep pressure, with rates under every hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupRow {
    pub well_id: WellId,
    pub sweep_index: usize,
    pub power_fluid_pressure: Real,
    pub predicted_bhp: Real,
    pub liquid_rate: PerHypothesis<Option<Real>>,
    /// Percent, from well-test averages
    pub watercut: Option<Real>,
    pub oil_rate: PerHypothesis<Option<Real>>,
}

/// Attach liquid rates to every BHP lookup row. Oil columns are left empty.
pub fn assign_liquid_rates(rows: &[BhpLookupRow], table: &LiquidRateTable) -> Vec<LookupRow> {
    rows.iter()
        .map(|row| {
            let liquid_rate = PerHypothesis::from_fn(|c| {
                table.interpolate_liquid_rate(&row.well_id, c, row.predicted_bhp)
            });
            LookupRow {
                well_id: row.well_id.clone(),
                sweep_index: row.sweep_index,
                power_fluid_pressure: row.power_fluid_pressure,
                predicted_bhp: row.predicted_bhp,
                liquid_rate,
                watercut: None,
                oil_rate: PerHypothesis::default(),
            }
        })
        .collect()
}
