//! Pipeline configuration file.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use wf_core::{Real, WellId};
use wf_data::{DateRange, MergeOptions, ZeroReadingPolicy};
use wf_fit::{AggregationConfig, DailyFitConfig, GridSearchConfig};
use wf_lookup::{PressureSweep, WatercutAveraging};

/// Everything a run needs besides its input files. Missing keys take their
/// defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Wells to process; empty means every well found in the inputs
    pub well_ids: BTreeSet<String>,
    pub date_range: Option<DateRange>,
    pub grid: GridSearchConfig,
    pub aggregation: AggregationConfig,
    pub daily_fit: DailyFitConfig,
    pub pressure_sweep: PressureSweep,
    /// Spacing of sampled IPR points (psi)
    pub ipr_sample_step_psi: Real,
    pub zero_readings: ZeroReadingPolicy,
    /// 0 joins well tests on exact timestamps only
    pub merge_tolerance_minutes: u32,
    pub watercut_averaging: WatercutAveraging,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            well_ids: BTreeSet::new(),
            date_range: None,
            grid: GridSearchConfig::default(),
            aggregation: AggregationConfig::default(),
            daily_fit: DailyFitConfig::default(),
            pressure_sweep: PressureSweep::default(),
            ipr_sample_step_psi: 25.0,
            zero_readings: ZeroReadingPolicy::default(),
            merge_tolerance_minutes: 0,
            watercut_averaging: WatercutAveraging::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_yaml(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> AppResult<()> {
        self.grid.validate()?;
        self.aggregation.validate()?;
        self.pressure_sweep.validate()?;
        if let Some(range) = &self.date_range {
            range.validate()?;
        }

        if !(self.ipr_sample_step_psi.is_finite() && self.ipr_sample_step_psi > 0.0) {
            return Err(AppError::Validation(
                "ipr_sample_step_psi must be positive".to_string(),
            ));
        }
        let daily = &self.daily_fit;
        if !(daily.min_power_fluid_rate.is_finite() && daily.min_power_fluid_pressure.is_finite()) {
            return Err(AppError::Validation(
                "daily_fit floors must be finite".to_string(),
            ));
        }
        if daily.min_points < 2 {
            return Err(AppError::Validation(
                "daily_fit.min_points must be at least 2".to_string(),
            ));
        }
        if let Some(blank) = self.well_ids.iter().find(|id| id.trim().is_empty()) {
            return Err(AppError::Validation(format!(
                "well_ids contains a blank entry: {blank:?}"
            )));
        }
        Ok(())
    }

    /// Normalized well filter; empty keeps every well.
    pub fn well_filter(&self) -> BTreeSet<WellId> {
        self.well_ids.iter().map(|id| WellId::normalized(id)).collect()
    }

    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            tolerance: chrono::Duration::minutes(i64::from(self.merge_tolerance_minutes)),
            zero_readings: self.zero_readings,
            date_range: self.date_range,
        }
    }
}
