//! Vogel inflow performance relationship.

use crate::error::{IprError, IprResult};
use wf_core::Real;

/// Dimensionless Vogel rate fraction `q / q_max` at pressure ratio `x = p / pr`.
///
/// ```text
/// q / q_max = 1 - 0.2 x - 0.8 x^2
/// ```
#[inline]
pub fn vogel_fraction(x: Real) -> Real {
    1.0 - 0.2 * x - 0.8 * x * x
}

/// Vogel inflow model calibrated from one reference operating point.
///
/// ## Model
///
/// The reference point `(rate_ref, pressure_ref)` and the reservoir pressure
/// `pr` fix the absolute open flow:
///
/// ```text
/// q_max = rate_ref / (1 - 0.2 (p_ref / pr) - 0.8 (p_ref / pr)^2)
/// ```
///
/// The curve is only defined on `0 <= p <= pr`; pressures outside are clamped
/// so predicted rates are never negative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InflowModel {
    rate_ref: Real,
    pressure_ref: Real,
    reservoir_pressure: Real,
    q_max: Real,
}

impl InflowModel {
    /// Calibrate a model.
    ///
    /// # Errors
    /// Non-finite or negative inputs, a non-positive reservoir pressure, and a
    /// reference pressure at or above reservoir pressure are rejected.
    pub fn new(rate_ref: Real, pressure_ref: Real, reservoir_pressure: Real) -> IprResult<Self> {
        check_physical(rate_ref, "reference rate")?;
        check_physical(pressure_ref, "reference pressure")?;
        check_physical(reservoir_pressure, "reservoir pressure")?;
        if reservoir_pressure <= 0.0 {
            return Err(IprError::NonPhysical {
                what: "reservoir pressure",
                value: reservoir_pressure,
            });
        }
        if pressure_ref >= reservoir_pressure {
            return Err(IprError::DegenerateReference {
                pressure_ref,
                reservoir_pressure,
            });
        }

        let q_max = rate_ref / vogel_fraction(pressure_ref / reservoir_pressure);

        Ok(Self {
            rate_ref,
            pressure_ref,
            reservoir_pressure,
            q_max,
        })
    }

    /// Predicted total fluid rate (bbl/day) at bottomhole pressure `pressure` (psi).
    pub fn rate_at(&self, pressure: Real) -> Real {
        if pressure >= self.reservoir_pressure {
            return 0.0;
        }
        let x = pressure.max(0.0) / self.reservoir_pressure;
        (self.q_max * vogel_fraction(x)).max(0.0)
    }

    /// Absolute open flow: rate at zero bottomhole pressure.
    pub fn max_rate(&self) -> Real {
        self.q_max
    }

    pub fn reservoir_pressure(&self) -> Real {
        self.reservoir_pressure
    }

    pub fn reference(&self) -> (Real, Real) {
        (self.rate_ref, self.pressure_ref)
    }
}

fn check_physical(value: Real, what: &'static str) -> IprResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(IprError::NonPhysical { what, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_core::{Tolerances, nearly_equal};

    const TOL: Tolerances = Tolerances {
        abs: 1e-9,
        rel: 1e-9,
    };

    #[test]
    fn calibration_point_round_trips() {
        let model = InflowModel::new(400.0, 1200.0, 2400.0).unwrap();
        assert!(nearly_equal(model.rate_at(1200.0), 400.0, TOL));
    }

    #[test]
    fn endpoints() {
        let model = InflowModel::new(400.0, 1200.0, 2400.0).unwrap();
        // x = 0.5 -> fraction 0.7
        assert!(nearly_equal(model.max_rate(), 400.0 / 0.7, TOL));
        assert_eq!(model.rate_at(2400.0), 0.0);
        assert!(nearly_equal(model.rate_at(0.0), model.max_rate(), TOL));
    }

    #[test]
    fn clamps_outside_domain() {
        let model = InflowModel::new(400.0, 1200.0, 2400.0).unwrap();
        assert_eq!(model.rate_at(3000.0), 0.0);
        assert!(nearly_equal(model.rate_at(-50.0), model.max_rate(), TOL));
    }

    #[test]
    fn rejects_reference_above_reservoir_pressure() {
        let err = InflowModel::new(400.0, 2400.0, 2400.0).unwrap_err();
        assert!(matches!(err, IprError::DegenerateReference { .. }));
        assert!(InflowModel::new(400.0, 2500.0, 2400.0).is_err());
    }

    #[test]
    fn rejects_non_physical_inputs() {
        assert!(InflowModel::new(Real::NAN, 1000.0, 2000.0).is_err());
        assert!(InflowModel::new(-1.0, 1000.0, 2000.0).is_err());
        assert!(InflowModel::new(100.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn vogel_fraction_endpoints() {
        assert_eq!(vogel_fraction(0.0), 1.0);
        assert!(vogel_fraction(1.0).abs() < 1e-15);
    }
}
