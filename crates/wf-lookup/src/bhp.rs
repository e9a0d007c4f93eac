//! Power fluid pressure → bottomhole pressure table.

use crate::sweep::PressureSweep;
use serde::{Deserialize, Serialize};
use wf_core::{Real, WellId};
use wf_fit::AggregatedCoefficient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BhpLookupRow {
    pub well_id: WellId,
    /// Position in the sweep; rows of different wells with the same index share
    /// a power fluid pressure.
    pub sweep_index: usize,
    pub power_fluid_pressure: Real,
    pub predicted_bhp: Real,
}

/// Expand each well's coefficient over the sweep.
///
/// Wells carrying the insufficient-data sentinel are left out. The output is a
/// pure function of its inputs: rows follow coefficient order, then sweep order.
pub fn build_bhp_lookup(
    coefficients: &[AggregatedCoefficient],
    sweep: &PressureSweep,
) -> Vec<BhpLookupRow> {
    let pressures = sweep.points();
    let mut rows = Vec::with_capacity(coefficients.len() * pressures.len());

    for coeff in coefficients {
        if coeff.insufficient {
            tracing::warn!(well = %coeff.well_id, "no usable pressure coefficient, excluded from lookup");
            continue;
        }
        for (sweep_index, &pf) in pressures.iter().enumerate() {
            let Some(predicted_bhp) = coeff.predict(pf) else {
                continue;
            };
            rows.push(BhpLookupRow {
                well_id: coeff.well_id.clone(),
                sweep_index,
                power_fluid_pressure: pf,
                predicted_bhp,
            });
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coeff(well: &str, slope: Real, intercept: Real, insufficient: bool) -> AggregatedCoefficient {
        AggregatedCoefficient {
            well_id: WellId::from(well),
            mean_slope: slope,
            mean_intercept: intercept,
            median_slope: Some(slope),
            median_intercept: Some(intercept),
            valid_records: if insufficient { 1 } else { 5 },
            insufficient,
        }
    }

    #[test]
    fn applies_linear_coefficient() {
        let rows = build_bhp_lookup(&[coeff("A", -0.5, 2300.0, false)], &PressureSweep::default());
        assert_eq!(rows.len(), 31);
        assert_eq!(rows[0].power_fluid_pressure, 1800.0);
        assert_eq!(rows[0].predicted_bhp, 1400.0);
        assert_eq!(rows[30].sweep_index, 30);
        assert_eq!(rows[30].predicted_bhp, 650.0);
    }

    #[test]
    fn sentinel_wells_are_excluded() {
        let coeffs = [coeff("A", 1.0e6, 0.0, true), coeff("B", -0.2, 1500.0, false)];
        let rows = build_bhp_lookup(&coeffs, &PressureSweep::default());
        assert!(rows.iter().all(|r| r.well_id.as_str() == "B"));
    }
}
