//! Daily linear fits of bottomhole pressure against power fluid pressure.

use chrono::NaiveDate;
use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wf_core::{Real, WellId};
use wf_data::{WellSeries, ZeroReadingPolicy};

/// Reading filters for the daily fits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyFitConfig {
    /// Readings at or below this power fluid rate (bbl/day) are not pumping
    pub min_power_fluid_rate: Real,
    /// Readings at or below this power fluid pressure (psi) are not pumping
    pub min_power_fluid_pressure: Real,
    /// Minimum readings in a day for a fit
    pub min_points: usize,
}

impl Default for DailyFitConfig {
    fn default() -> Self {
        Self {
            min_power_fluid_rate: 500.0,
            min_power_fluid_pressure: 1500.0,
            min_points: 2,
        }
    }
}

/// Slope and intercept of `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: Real,
    pub intercept: Real,
}

/// One fitted line for one well, optionally for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientRecord {
    pub well_id: WellId,
    pub date: Option<NaiveDate>,
    pub slope: Real,
    pub intercept: Real,
}

/// Ordinary least squares line through `(x, y)`.
///
/// Solves the 2x2 normal equations on centred `x`. Returns `None` for fewer
/// than two points, mismatched lengths, zero spread in `x` or a non-finite
/// solution.
pub fn fit_linear(x: &[Real], y: &[Real]) -> Option<LinearFit> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let n = x.len() as Real;
    let x_mean = x.iter().sum::<Real>() / n;

    let mut ata = Matrix2::<Real>::zeros();
    let mut atb = Vector2::<Real>::zeros();
    for (&xi, &yi) in x.iter().zip(y) {
        let xc = xi - x_mean;
        ata += Matrix2::new(xc * xc, xc, xc, 1.0);
        atb += Vector2::new(xc * yi, yi);
    }
    if ata[(0, 0)] <= 0.0 {
        return None;
    }

    let solution = ata.lu().solve(&atb)?;
    let slope = solution[0];
    let intercept = solution[1] - slope * x_mean;
    if !(slope.is_finite() && intercept.is_finite()) {
        return None;
    }
    Some(LinearFit { slope, intercept })
}

/// Fit `bhp = slope * power_fluid_pressure + intercept` per calendar day.
///
/// Only pumping readings count: both power fluid signals must exceed their
/// floors and bottomhole pressure must pass the zero-reading policy. Days with
/// too few readings or no spread in power fluid pressure produce no record.
pub fn daily_coefficients(
    series: &WellSeries,
    config: &DailyFitConfig,
    zero_readings: ZeroReadingPolicy,
) -> Vec<CoefficientRecord> {
    let mut by_day: BTreeMap<NaiveDate, (Vec<Real>, Vec<Real>)> = BTreeMap::new();

    for (ts, r) in &series.readings {
        let (Some(bhp), Some(pf_pres), Some(pf_rate)) =
            (r.bhp, r.power_fluid_pressure, r.power_fluid_rate)
        else {
            continue;
        };
        if !zero_readings.accepts_pressure(bhp)
            || pf_rate <= config.min_power_fluid_rate
            || pf_pres <= config.min_power_fluid_pressure
        {
            continue;
        }
        let (xs, ys) = by_day.entry(ts.date()).or_default();
        xs.push(pf_pres);
        ys.push(bhp);
    }

    by_day
        .into_iter()
        .filter(|(_, (xs, _))| xs.len() >= config.min_points.max(2))
        .filter_map(|(date, (xs, ys))| {
            fit_linear(&xs, &ys).map(|fit| CoefficientRecord {
                well_id: series.well_id.clone(),
                date: Some(date),
                slope: fit.slope,
                intercept: fit.intercept,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use wf_data::{ScadaRow, Signal, pivot_scada};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn reading(ts: NaiveDateTime, bhp: Real, pf_pres: Real, pf_rate: Real) -> Vec<ScadaRow> {
        let well = WellId::from("MPB-28");
        [
            (Signal::Bhp, bhp),
            (Signal::PowerFluidPressure, pf_pres),
            (Signal::PowerFluidRate, pf_rate),
        ]
        .into_iter()
        .map(|(signal, value)| ScadaRow {
            well_id: well.clone(),
            timestamp: ts,
            signal,
            value,
        })
        .collect()
    }

    #[test]
    fn fit_linear_exact_line() {
        let x = [2000.0, 2500.0, 3000.0];
        let y: Vec<Real> = x.iter().map(|v| -0.4 * v + 2200.0).collect();
        let fit = fit_linear(&x, &y).unwrap();
        assert!((fit.slope + 0.4).abs() < 1e-9);
        assert!((fit.intercept - 2200.0).abs() < 1e-6);
    }

    #[test]
    fn fit_linear_rejects_degenerate_input() {
        assert!(fit_linear(&[1.0], &[2.0]).is_none());
        assert!(fit_linear(&[1.0, 2.0], &[2.0]).is_none());
        assert!(fit_linear(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn daily_fit_groups_by_day_and_filters() {
        let mut rows = Vec::new();
        // day 1: clean line slope -0.5
        rows.extend(reading(at(1, 0), 1300.0, 2000.0, 3000.0));
        rows.extend(reading(at(1, 6), 1050.0, 2500.0, 3000.0));
        rows.extend(reading(at(1, 12), 800.0, 3000.0, 3000.0));
        // not pumping, ignored
        rows.extend(reading(at(1, 18), 100.0, 3100.0, 100.0));
        // day 2: single pumping reading, no fit
        rows.extend(reading(at(2, 0), 1200.0, 2100.0, 3000.0));
        rows.extend(reading(at(2, 6), 1200.0, 1400.0, 3000.0));
        // day 3: zero bhp treated as fault
        rows.extend(reading(at(3, 0), 0.0, 2000.0, 3000.0));
        rows.extend(reading(at(3, 6), 1000.0, 2500.0, 3000.0));

        let wells = pivot_scada(rows);
        let records = daily_coefficients(
            &wells["MPB-28"],
            &DailyFitConfig::default(),
            ZeroReadingPolicy::Fault,
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert!((records[0].slope + 0.5).abs() < 1e-9);
        assert!((records[0].intercept - 2300.0).abs() < 1e-6);
    }

    #[test]
    fn shut_in_policy_keeps_zero_bhp_in_daily_fit() {
        let mut rows = Vec::new();
        rows.extend(reading(at(3, 0), 0.0, 2000.0, 3000.0));
        rows.extend(reading(at(3, 6), 1000.0, 2500.0, 3000.0));
        let wells = pivot_scada(rows);
        let records = daily_coefficients(
            &wells["MPB-28"],
            &DailyFitConfig::default(),
            ZeroReadingPolicy::ShutIn,
        );
        assert_eq!(records.len(), 1);
        assert!((records[0].slope - 2.0).abs() < 1e-9);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn exact_line_is_recovered(
            slope in -2.0_f64..2.0,
            intercept in -1000.0_f64..5000.0,
            n in 2usize..20,
        ) {
            let x: Vec<Real> = (0..n).map(|i| 1500.0 + 100.0 * i as Real).collect();
            let y: Vec<Real> = x.iter().map(|v| slope * v + intercept).collect();

            let fit = fit_linear(&x, &y).unwrap();

            prop_assert!((fit.slope - slope).abs() < 1e-9);
            prop_assert!((fit.intercept - intercept).abs() < 1e-6);
        }
    }
}
