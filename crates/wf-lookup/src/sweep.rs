//! Discretized operating pressure range.

use crate::error::{LookupError, LookupResult};
use serde::{Deserialize, Serialize};
use wf_core::Real;

/// Power fluid pressures swept by the lookup table (psi), end inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureSweep {
    pub start_psi: Real,
    pub end_psi: Real,
    pub step_psi: Real,
}

impl Default for PressureSweep {
    fn default() -> Self {
        Self {
            start_psi: 1800.0,
            end_psi: 3300.0,
            step_psi: 50.0,
        }
    }
}

impl PressureSweep {
    pub fn validate(&self) -> LookupResult<()> {
        if !(self.start_psi.is_finite() && self.end_psi.is_finite()) {
            return Err(LookupError::InvalidSweep {
                what: "bounds must be finite",
            });
        }
        if self.start_psi > self.end_psi {
            return Err(LookupError::InvalidSweep {
                what: "start must not exceed end",
            });
        }
        if !(self.step_psi.is_finite() && self.step_psi > 0.0) {
            return Err(LookupError::InvalidSweep {
                what: "step must be positive",
            });
        }
        Ok(())
    }

    /// Swept pressures, ascending. An end that is not a whole number of steps
    /// from the start is not included.
    pub fn points(&self) -> Vec<Real> {
        if self.validate().is_err() {
            return Vec::new();
        }
        let count = ((self.end_psi - self.start_psi) / self.step_psi + 1e-9).floor() as usize + 1;
        (0..count)
            .map(|i| self.start_psi + i as Real * self.step_psi)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sweep_is_inclusive() {
        let points = PressureSweep::default().points();
        assert_eq!(points.len(), 31);
        assert_eq!(points[0], 1800.0);
        assert_eq!(*points.last().unwrap(), 3300.0);
    }

    #[test]
    fn partial_last_step_is_dropped() {
        let sweep = PressureSweep {
            start_psi: 0.0,
            end_psi: 120.0,
            step_psi: 50.0,
        };
        assert_eq!(sweep.points(), vec![0.0, 50.0, 100.0]);
    }

    #[test]
    fn invalid_sweeps() {
        let reversed = PressureSweep {
            start_psi: 3000.0,
            end_psi: 2000.0,
            step_psi: 50.0,
        };
        assert!(reversed.validate().is_err());
        assert!(reversed.points().is_empty());
        let flat = PressureSweep {
            step_psi: 0.0,
            ..PressureSweep::default()
        };
        assert!(flat.validate().is_err());
    }
}
