//! One value per IPR calibration hypothesis.

use serde::{Deserialize, Serialize};
use wf_ipr::Calibration;

/// Parallel values for the three calibration hypotheses.
///
/// The hypotheses are kept side by side rather than collapsed because each
/// carries a different bias.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerHypothesis<T> {
    pub newest: T,
    pub lowest_bhp: T,
    pub median_bhp: T,
}

impl<T> PerHypothesis<T> {
    pub fn from_fn(mut f: impl FnMut(Calibration) -> T) -> Self {
        Self {
            newest: f(Calibration::Newest),
            lowest_bhp: f(Calibration::LowestBhp),
            median_bhp: f(Calibration::MedianBhp),
        }
    }

    pub fn get(&self, calibration: Calibration) -> &T {
        match calibration {
            Calibration::Newest => &self.newest,
            Calibration::LowestBhp => &self.lowest_bhp,
            Calibration::MedianBhp => &self.median_bhp,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Calibration, &T) -> U) -> PerHypothesis<U> {
        PerHypothesis::from_fn(|c| f(c, self.get(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_fn_and_get_agree() {
        let h = PerHypothesis::from_fn(|c| c.as_str().len());
        for c in Calibration::ALL {
            assert_eq!(*h.get(c), c.as_str().len());
        }
    }

    #[test]
    fn map_passes_calibration() {
        let h = PerHypothesis {
            newest: 1.0,
            lowest_bhp: 2.0,
            median_bhp: 3.0,
        };
        let doubled = h.map(|_, v| v * 2.0);
        assert_eq!(doubled.median_bhp, 6.0);
        let tagged = h.map(|c, _| c);
        assert_eq!(tagged.lowest_bhp, Calibration::LowestBhp);
    }
}
