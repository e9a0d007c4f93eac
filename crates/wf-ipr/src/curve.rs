//! Calibrated per-well IPR curves.

use crate::error::{IprError, IprResult};
use crate::vogel::InflowModel;
use serde::{Deserialize, Serialize};
use std::fmt;
use wf_core::{Real, WellId};
use wf_data::WellSample;

/// Rule that picks a well's calibration sample.
///
/// The three rules are competing hypotheses about the same well and are all
/// carried downstream side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Calibration {
    /// Most recent test. May be stale relative to current conditions.
    Newest,
    /// Test at the lowest bottomhole pressure, nearest to q_max.
    LowestBhp,
    /// Test at the median bottomhole pressure.
    MedianBhp,
}

impl Calibration {
    pub const ALL: [Calibration; 3] = [
        Calibration::Newest,
        Calibration::LowestBhp,
        Calibration::MedianBhp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::LowestBhp => "lowest_bhp",
            Self::MedianBhp => "median_bhp",
        }
    }

    /// Inverse of [`Calibration::as_str`].
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == label)
    }

    /// Pick the calibration sample from a well's samples.
    ///
    /// Ties on date go to the later sample in input order, ties on pressure to
    /// the earlier one. For an even count the median rule takes the lower
    /// middle sample.
    pub fn select(self, samples: &[WellSample]) -> Option<&WellSample> {
        match self {
            Self::Newest => samples.iter().max_by_key(|s| s.timestamp),
            Self::LowestBhp => samples
                .iter()
                .min_by(|a, b| a.bottomhole_pressure.total_cmp(&b.bottomhole_pressure)),
            Self::MedianBhp => {
                if samples.is_empty() {
                    return None;
                }
                let mut sorted: Vec<&WellSample> = samples.iter().collect();
                sorted.sort_by(|a, b| a.bottomhole_pressure.total_cmp(&b.bottomhole_pressure));
                Some(sorted[(sorted.len() - 1) / 2])
            }
        }
    }
}

impl fmt::Display for Calibration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sampled point on an IPR curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IprPoint {
    /// psi
    pub bhp: Real,
    /// bbl/day
    pub rate: Real,
}

/// Vogel curve for one well under one calibration hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IprCurve {
    pub well_id: WellId,
    pub calibration: Calibration,
    pub reservoir_pressure: Real,
    pub reference_rate: Real,
    pub reference_pressure: Real,
    pub q_max: Real,
}

impl IprCurve {
    /// Build the curve for `calibration` from a well's samples and its fitted
    /// reservoir pressure.
    pub fn calibrate(
        well_id: &WellId,
        calibration: Calibration,
        reservoir_pressure: Real,
        samples: &[WellSample],
    ) -> IprResult<Self> {
        let reference = calibration
            .select(samples)
            .ok_or_else(|| IprError::NoCalibrationSample {
                well: well_id.to_string(),
            })?;
        let model = InflowModel::new(
            reference.total_fluid_rate,
            reference.bottomhole_pressure,
            reservoir_pressure,
        )?;

        Ok(Self {
            well_id: well_id.clone(),
            calibration,
            reservoir_pressure,
            reference_rate: reference.total_fluid_rate,
            reference_pressure: reference.bottomhole_pressure,
            q_max: model.max_rate(),
        })
    }

    pub fn model(&self) -> IprResult<InflowModel> {
        InflowModel::new(
            self.reference_rate,
            self.reference_pressure,
            self.reservoir_pressure,
        )
    }

    /// Evaluate the curve from zero up to reservoir pressure in `step_psi`
    /// increments. Bottomhole pressure is ascending and the last point is
    /// always exactly at reservoir pressure.
    pub fn sample_points(&self, step_psi: Real) -> IprResult<Vec<IprPoint>> {
        if !(step_psi.is_finite() && step_psi > 0.0) {
            return Err(IprError::InvalidArg {
                what: "IPR sample step must be positive",
            });
        }
        let model = self.model()?;
        let pr = self.reservoir_pressure;
        let n = (pr / step_psi).ceil() as usize;

        let mut points = Vec::with_capacity(n + 1);
        for i in 0..n {
            let bhp = i as Real * step_psi;
            points.push(IprPoint {
                bhp,
                rate: model.rate_at(bhp),
            });
        }
        points.push(IprPoint { bhp: pr, rate: 0.0 });
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample(day: u32, bhp: Real, rate: Real) -> WellSample {
        let ts = NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        WellSample::new("MPB-28".into(), ts, bhp, rate).unwrap()
    }

    fn samples() -> Vec<WellSample> {
        vec![
            sample(3, 1400.0, 300.0),
            sample(9, 1200.0, 400.0),
            sample(1, 1000.0, 500.0),
            sample(5, 1600.0, 150.0),
        ]
    }

    #[test]
    fn labels_parse_back() {
        for calibration in Calibration::ALL {
            assert_eq!(Calibration::from_label(calibration.as_str()), Some(calibration));
        }
        assert_eq!(Calibration::from_label("oldest"), None);
        assert_eq!(Calibration::from_label("Newest"), None);
    }

    #[test]
    fn selection_rules() {
        let s = samples();
        assert_eq!(Calibration::Newest.select(&s).unwrap().bottomhole_pressure, 1200.0);
        assert_eq!(Calibration::LowestBhp.select(&s).unwrap().bottomhole_pressure, 1000.0);
        // sorted: 1000, 1200, 1400, 1600 -> lower middle
        assert_eq!(Calibration::MedianBhp.select(&s).unwrap().bottomhole_pressure, 1200.0);
        assert!(Calibration::MedianBhp.select(&[]).is_none());
    }

    #[test]
    fn calibrate_uses_selected_sample() {
        let well = WellId::from("MPB-28");
        let curve = IprCurve::calibrate(&well, Calibration::LowestBhp, 2000.0, &samples()).unwrap();
        assert_eq!(curve.reference_pressure, 1000.0);
        assert_eq!(curve.reference_rate, 500.0);
        // x = 0.5 -> fraction 0.7
        assert!((curve.q_max - 500.0 / 0.7).abs() < 1e-9);
    }

    #[test]
    fn calibrate_without_samples_fails() {
        let well = WellId::from("MPB-28");
        let err = IprCurve::calibrate(&well, Calibration::Newest, 2000.0, &[]).unwrap_err();
        assert!(matches!(err, IprError::NoCalibrationSample { .. }));
    }

    #[test]
    fn sample_points_cover_domain() {
        let well = WellId::from("MPB-28");
        let curve = IprCurve::calibrate(&well, Calibration::Newest, 2010.0, &samples()).unwrap();
        let points = curve.sample_points(25.0).unwrap();

        assert_eq!(points.first().unwrap().bhp, 0.0);
        assert!((points[0].rate - curve.q_max).abs() < 1e-9);
        let last = points.last().unwrap();
        assert_eq!(last.bhp, 2010.0);
        assert_eq!(last.rate, 0.0);
        assert!(points.windows(2).all(|w| w[0].bhp < w[1].bhp));
        assert!(points.windows(2).all(|w| w[0].rate >= w[1].rate));
        assert!(curve.sample_points(0.0).is_err());
    }
}
