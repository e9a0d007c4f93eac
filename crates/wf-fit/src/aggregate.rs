//! Collapse many daily coefficient records into one per well.

use crate::daily_fit::CoefficientRecord;
use crate::error::{FitError, FitResult};
use serde::{Deserialize, Serialize};
use wf_core::{Real, WellId, mean, median};

/// Filtering and fallback policy for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Records with slope at or above this value are discarded. A near-unit
    /// slope means the secondary signal is tracking slugging in the primary.
    pub slope_ceiling: Real,
    /// Valid records needed before the mean is trusted
    pub min_records: usize,
    /// Slope reported when there are too few valid records
    pub sentinel_slope: Real,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            slope_ceiling: 0.9,
            min_records: 4,
            sentinel_slope: 1.0e6,
        }
    }
}

impl AggregationConfig {
    pub fn validate(&self) -> FitResult<()> {
        if !self.slope_ceiling.is_finite() {
            return Err(FitError::InvalidConfig {
                what: "slope ceiling must be finite",
            });
        }
        if self.min_records == 0 {
            return Err(FitError::InvalidConfig {
                what: "aggregation needs at least one record",
            });
        }
        if !(self.sentinel_slope.is_finite() && self.sentinel_slope >= self.slope_ceiling) {
            return Err(FitError::InvalidConfig {
                what: "sentinel slope must lie above the slope ceiling",
            });
        }
        Ok(())
    }
}

/// Representative coefficient for one well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedCoefficient {
    pub well_id: WellId,
    /// Production slope: mean of valid records, or the sentinel
    pub mean_slope: Real,
    /// Production intercept: mean of valid records, or zero with the sentinel
    pub mean_intercept: Real,
    /// Diagnostic only
    pub median_slope: Option<Real>,
    /// Diagnostic only
    pub median_intercept: Option<Real>,
    pub valid_records: usize,
    /// Set when the sentinel was emitted
    pub insufficient: bool,
}

impl AggregatedCoefficient {
    /// Predicted bottomhole pressure at a power fluid pressure, `None` for
    /// sentinel coefficients.
    pub fn predict(&self, x: Real) -> Option<Real> {
        if self.insufficient {
            None
        } else {
            Some(self.mean_slope * x + self.mean_intercept)
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CoefficientAggregator {
    config: AggregationConfig,
}

impl CoefficientAggregator {
    pub fn new(config: AggregationConfig) -> FitResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Aggregate the records belonging to `well_id`; other wells' records are
    /// ignored.
    pub fn aggregate(&self, records: &[CoefficientRecord], well_id: &WellId) -> AggregatedCoefficient {
        let valid: Vec<&CoefficientRecord> = records
            .iter()
            .filter(|r| &r.well_id == well_id)
            .filter(|r| r.slope.is_finite() && r.intercept.is_finite())
            .filter(|r| r.slope < self.config.slope_ceiling)
            .collect();

        let slopes: Vec<Real> = valid.iter().map(|r| r.slope).collect();
        let intercepts: Vec<Real> = valid.iter().map(|r| r.intercept).collect();
        let median_slope = median(&slopes);
        let median_intercept = median(&intercepts);

        let means = if valid.len() >= self.config.min_records {
            mean(&slopes).zip(mean(&intercepts))
        } else {
            None
        };

        match means {
            Some((mean_slope, mean_intercept)) => AggregatedCoefficient {
                well_id: well_id.clone(),
                mean_slope,
                mean_intercept,
                median_slope,
                median_intercept,
                valid_records: valid.len(),
                insufficient: false,
            },
            None => {
                tracing::warn!(
                    well = %well_id,
                    valid = valid.len(),
                    required = self.config.min_records,
                    "insufficient coefficient records, emitting sentinel"
                );
                AggregatedCoefficient {
                    well_id: well_id.clone(),
                    mean_slope: self.config.sentinel_slope,
                    mean_intercept: 0.0,
                    median_slope,
                    median_intercept,
                    valid_records: valid.len(),
                    insufficient: true,
                }
            }
        }
    }

    /// Aggregate every listed well, in the given order.
    pub fn aggregate_all<'a>(
        &self,
        wells: impl IntoIterator<Item = &'a WellId>,
        records: &[CoefficientRecord],
    ) -> Vec<AggregatedCoefficient> {
        wells
            .into_iter()
            .map(|well| self.aggregate(records, well))
            .collect()
    }
}
