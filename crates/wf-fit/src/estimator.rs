//! Reservoir pressure grid search.

use crate::error::{EstimationError, FitError, FitResult};
use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use wf_core::{Real, WellId, mean};
use wf_data::{WellDataset, WellSample};
use wf_ipr::InflowModel;

/// Samples needed for a meaningful fit: one to calibrate, one to score.
pub const MIN_SAMPLES: usize = 2;

/// Candidate grid for the reservoir pressure search (psi).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSearchConfig {
    /// Offset above the highest observed bottomhole pressure where the grid starts
    pub margin_psi: Real,
    /// Exclusive upper bound of the grid
    pub upper_psi: Real,
    /// Grid spacing
    pub step_psi: Real,
}

impl Default for GridSearchConfig {
    fn default() -> Self {
        Self {
            margin_psi: 100.0,
            upper_psi: 5000.0,
            step_psi: 10.0,
        }
    }
}

impl GridSearchConfig {
    pub fn validate(&self) -> FitResult<()> {
        if !(self.margin_psi.is_finite() && self.margin_psi > 0.0) {
            return Err(FitError::InvalidConfig {
                what: "grid margin must be positive",
            });
        }
        if !(self.step_psi.is_finite() && self.step_psi > 0.0) {
            return Err(FitError::InvalidConfig {
                what: "grid step must be positive",
            });
        }
        if !(self.upper_psi.is_finite() && self.upper_psi > 0.0) {
            return Err(FitError::InvalidConfig {
                what: "grid upper bound must be positive",
            });
        }
        Ok(())
    }

    /// Ascending candidates from `floor(max_bhp + margin)` up to, but not
    /// including, the upper bound. Every candidate is strictly above `max_bhp`.
    pub fn candidates(&self, max_bhp: Real) -> Vec<Real> {
        let start = (max_bhp + self.margin_psi).floor();
        let mut out = Vec::new();
        let mut i = 0usize;
        loop {
            let candidate = start + i as Real * self.step_psi;
            if candidate >= self.upper_psi {
                break;
            }
            if candidate > max_bhp {
                out.push(candidate);
            }
            i += 1;
        }
        out
    }
}

/// Productivity index of one sample under the fitted reservoir pressure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleProductivity {
    pub timestamp: NaiveDateTime,
    pub bottomhole_pressure: Real,
    pub total_fluid_rate: Real,
    /// bbl/day/psi
    pub productivity_index: Real,
}

/// Fitted reservoir pressure for one well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellFit {
    pub well_id: WellId,
    /// psi
    pub reservoir_pressure: Real,
    /// Cumulative absolute rate error at the winning candidate (bbl/day)
    pub cumulative_error: Real,
    pub candidates_evaluated: usize,
    pub samples: Vec<SampleProductivity>,
}

impl WellFit {
    pub fn mean_productivity_index(&self) -> Option<Real> {
        let pis: Vec<Real> = self.samples.iter().map(|s| s.productivity_index).collect();
        mean(&pis)
    }

    pub fn max_observed_bhp(&self) -> Real {
        self.samples
            .iter()
            .map(|s| s.bottomhole_pressure)
            .fold(Real::NEG_INFINITY, Real::max)
    }
}

/// Sum of absolute rate errors against a Vogel curve calibrated on the first
/// sample, scored over the remaining samples.
///
/// Returns `None` when the curve cannot be calibrated at `reservoir_pressure`.
pub fn cumulative_abs_error(samples: &[WellSample], reservoir_pressure: Real) -> Option<Real> {
    let (first, rest) = samples.split_first()?;
    let model = InflowModel::new(
        first.total_fluid_rate,
        first.bottomhole_pressure,
        reservoir_pressure,
    )
    .ok()?;
    let error: Real = rest
        .iter()
        .map(|s| (model.rate_at(s.bottomhole_pressure) - s.total_fluid_rate).abs())
        .sum();
    Some(error)
}

/// Per-well results of a batch estimation, in well-id order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub results: Vec<(WellId, Result<WellFit, EstimationError>)>,
}

impl BatchReport {
    pub fn fits(&self) -> impl Iterator<Item = &WellFit> {
        self.results.iter().filter_map(|(_, r)| r.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &EstimationError> {
        self.results.iter().filter_map(|(_, r)| r.as_ref().err())
    }

    pub fn fit_for(&self, well: &str) -> Option<&WellFit> {
        self.fits().find(|f| f.well_id.as_str() == well)
    }

    pub fn fit_count(&self) -> usize {
        self.fits().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }
}

/// Fits reservoir pressure per well by bounded grid search.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReservoirPressureEstimator {
    config: GridSearchConfig,
}

impl ReservoirPressureEstimator {
    pub fn new(config: GridSearchConfig) -> FitResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GridSearchConfig {
        &self.config
    }

    /// Fit one well.
    ///
    /// Candidates are scanned in ascending order and the first strict minimum
    /// wins. Candidates whose error is not finite are ignored.
    pub fn estimate(&self, well_id: &WellId, samples: &[WellSample]) -> Result<WellFit, EstimationError> {
        if samples.is_empty() {
            return Err(EstimationError::MissingData {
                well: well_id.to_string(),
                what: "no valid bottomhole pressure samples".to_string(),
            });
        }
        if samples.len() < MIN_SAMPLES {
            return Err(EstimationError::InsufficientData {
                well: well_id.to_string(),
                count: samples.len(),
                required: MIN_SAMPLES,
            });
        }

        let max_bhp = samples
            .iter()
            .map(|s| s.bottomhole_pressure)
            .fold(Real::NEG_INFINITY, Real::max);
        let candidates = self.config.candidates(max_bhp);

        let mut best: Option<(Real, Real)> = None;
        for &pr in &candidates {
            let Some(error) = cumulative_abs_error(samples, pr) else {
                continue;
            };
            if !error.is_finite() {
                continue;
            }
            match best {
                Some((_, best_error)) if error >= best_error => {}
                _ => best = Some((pr, error)),
            }
        }

        let (reservoir_pressure, cumulative_error) =
            best.ok_or_else(|| EstimationError::DegenerateFit {
                well: well_id.to_string(),
            })?;

        tracing::debug!(
            well = %well_id,
            reservoir_pressure,
            cumulative_error,
            candidates = candidates.len(),
            "reservoir pressure fitted"
        );

        let samples = samples
            .iter()
            .map(|s| SampleProductivity {
                timestamp: s.timestamp,
                bottomhole_pressure: s.bottomhole_pressure,
                total_fluid_rate: s.total_fluid_rate,
                productivity_index: s.total_fluid_rate
                    / (reservoir_pressure - s.bottomhole_pressure),
            })
            .collect();

        Ok(WellFit {
            well_id: well_id.clone(),
            reservoir_pressure,
            cumulative_error,
            candidates_evaluated: candidates.len(),
            samples,
        })
    }

    /// Fit every well of a dataset on the rayon pool.
    ///
    /// Wells are independent. Failures are logged and kept in the report. When
    /// `cancel` is set, wells not yet started report `Cancelled`.
    pub fn estimate_batch(&self, dataset: &WellDataset, cancel: Option<&AtomicBool>) -> BatchReport {
        let wells: Vec<(&WellId, &[WellSample])> = dataset.iter().collect();

        let results: Vec<(WellId, Result<WellFit, EstimationError>)> = wells
            .par_iter()
            .map(|(well_id, samples)| {
                let cancelled = cancel.is_some_and(|flag| flag.load(Ordering::Relaxed));
                let result = if cancelled {
                    Err(EstimationError::Cancelled {
                        well: well_id.to_string(),
                    })
                } else {
                    self.estimate(well_id, samples)
                };
                ((*well_id).clone(), result)
            })
            .collect();

        for err in results.iter().filter_map(|(_, r)| r.as_ref().err()) {
            tracing::warn!(well = err.well(), kind = err.kind(), "skipping well: {err}");
        }

        BatchReport { results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub(super) fn samples(points: &[(Real, Real)]) -> Vec<WellSample> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(bhp, rate))| {
                let ts = NaiveDate::from_ymd_opt(2024, 4, 1 + i as u32)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap();
                WellSample::new("MPB-28".into(), ts, bhp, rate).unwrap()
            })
            .collect()
    }

    #[test]
    fn candidates_start_above_max_bhp() {
        let grid = GridSearchConfig::default();
        let c = grid.candidates(1800.4);
        assert_eq!(c[0], 1900.0);
        assert_eq!(c[1], 1910.0);
        assert_eq!(*c.last().unwrap(), 4990.0);
        assert!(grid.candidates(4950.0).is_empty());
    }

    #[test]
    fn invalid_grid_is_rejected() {
        let bad = GridSearchConfig {
            step_psi: 0.0,
            ..GridSearchConfig::default()
        };
        assert!(ReservoirPressureEstimator::new(bad).is_err());
        let bad = GridSearchConfig {
            margin_psi: -5.0,
            ..GridSearchConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn recovers_synthetic_reservoir_pressure() {
        let truth = InflowModel::new(500.0, 1000.0, 2500.0).unwrap();
        let points: Vec<(Real, Real)> = [1000.0, 1200.0, 1500.0, 1800.0, 2000.0]
            .iter()
            .map(|&p| (p, truth.rate_at(p)))
            .collect();
        let estimator = ReservoirPressureEstimator::default();
        let fit = estimator
            .estimate(&WellId::from("MPB-28"), &samples(&points))
            .unwrap();
        assert_eq!(fit.reservoir_pressure, 2500.0);
        assert!(fit.cumulative_error < 1e-6);
    }

    #[test]
    fn productivity_index_per_sample() {
        let estimator = ReservoirPressureEstimator::default();
        let fit = estimator
            .estimate(
                &WellId::from("MPB-28"),
                &samples(&[(1000.0, 500.0), (1200.0, 400.0)]),
            )
            .unwrap();
        let s = &fit.samples[0];
        let expected = 500.0 / (fit.reservoir_pressure - 1000.0);
        assert!((s.productivity_index - expected).abs() < 1e-12);
        assert!(fit.mean_productivity_index().unwrap() > 0.0);
    }

    #[test]
    fn single_sample_is_insufficient() {
        let estimator = ReservoirPressureEstimator::default();
        let err = estimator
            .estimate(&WellId::from("MPB-28"), &samples(&[(1000.0, 500.0)]))
            .unwrap_err();
        assert!(matches!(err, EstimationError::InsufficientData { count: 1, .. }));
    }

    #[test]
    fn empty_well_is_missing_data() {
        let estimator = ReservoirPressureEstimator::default();
        let err = estimator.estimate(&WellId::from("MPB-28"), &[]).unwrap_err();
        assert!(matches!(err, EstimationError::MissingData { .. }));
    }

    #[test]
    fn empty_grid_is_degenerate() {
        let estimator = ReservoirPressureEstimator::default();
        let err = estimator
            .estimate(
                &WellId::from("MPB-28"),
                &samples(&[(4950.0, 10.0), (4920.0, 20.0)]),
            )
            .unwrap_err();
        assert!(matches!(err, EstimationError::DegenerateFit { .. }));
    }

    #[test]
    fn batch_respects_cancellation() {
        let dataset: WellDataset = samples(&[(1000.0, 500.0), (1200.0, 400.0)])
            .into_iter()
            .collect();
        let estimator = ReservoirPressureEstimator::default();
        let flag = AtomicBool::new(true);
        let report = estimator.estimate_batch(&dataset, Some(&flag));
        assert_eq!(report.fit_count(), 0);
        assert!(matches!(
            report.failures().next(),
            Some(EstimationError::Cancelled { .. })
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn fitted_pressure_lies_above_every_sample(
            points in prop::collection::vec((0.0_f64..4000.0, 1.0_f64..2000.0), 2..8),
        ) {
            let samples = super::tests::samples(&points);
            let max_bhp = points.iter().map(|p| p.0).fold(Real::NEG_INFINITY, Real::max);

            let fit = ReservoirPressureEstimator::default()
                .estimate(&WellId::from("MPB-28"), &samples)
                .unwrap();

            prop_assert!(fit.reservoir_pressure > max_bhp);
            prop_assert!(fit.cumulative_error >= 0.0);
            prop_assert!(fit.samples.iter().all(|s| s.productivity_index > 0.0));
        }
    }
}
