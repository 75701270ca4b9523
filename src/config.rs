//! Metrics configuration and the stock pipelines built from it

use crate::data::GroupKey;
use crate::error::{PvForecastError, Result};
use crate::pipeline::{
    AbsoluteError, Denormalize, Elementwise, GroupBy, IgnoreNight, Mean, Pipeline,
    PipelineRegistry, Step, Subtract, ToPositional,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const MAE_IGNORING_NIGHT: &str = "MAE, ignoring night";
pub const MAE_PER_MONTH: &str = "MAE per month";
pub const MAE_PER_HOUR_OF_DAY: &str = "MAE per hour of day, ignoring night";
pub const RMSE: &str = "RMSE";

/// Site and scaling settings for the stock metrics pipelines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Site latitude in degrees (north positive)
    pub latitude: f64,
    /// Site longitude in degrees (east positive)
    pub longitude: f64,
    /// Sun elevation below which a timestamp counts as night
    pub night_threshold_degrees: f64,
    /// Installed capacity to denormalize by; yield fractions are used as-is if unset
    pub capacity: Option<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            latitude: 54.0,
            longitude: -2.0,
            night_threshold_degrees: -5.0,
            capacity: None,
        }
    }
}

impl MetricsConfig {
    /// Parse and validate a JSON config; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MetricsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(PvForecastError::ConfigError(format!(
                "latitude {} outside [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(PvForecastError::ConfigError(format!(
                "longitude {} outside [-180, 180]",
                self.longitude
            )));
        }
        if !(-90.0..=90.0).contains(&self.night_threshold_degrees) {
            return Err(PvForecastError::ConfigError(format!(
                "night threshold {} outside [-90, 90]",
                self.night_threshold_degrees
            )));
        }
        Ok(())
    }

    pub fn ignore_night(&self) -> IgnoreNight {
        IgnoreNight::new(self.latitude, self.longitude, self.night_threshold_degrees)
    }
}

/// Start a pipeline with denormalization when a capacity is configured
fn base(config: &MetricsConfig) -> Pipeline {
    match config.capacity {
        Some(capacity) => Pipeline::new().then(Denormalize::new(capacity)),
        None => Pipeline::new(),
    }
}

/// The stock metrics pipelines for one site
pub fn standard_pipelines(config: &MetricsConfig) -> Result<PipelineRegistry> {
    config.validate()?;
    let ignore_night: Arc<dyn Step> = Arc::new(config.ignore_night());

    let mae_ignoring_night = base(config)
        .then_shared(Arc::clone(&ignore_night))
        .then(ToPositional)
        .then(Subtract)
        .then(Elementwise::abs())
        .then(Mean);

    let mae_per_month = base(config)
        .then(AbsoluteError)
        .then(GroupBy::new(GroupKey::Month))
        .then(Mean);

    let mae_per_hour_of_day = base(config)
        .then_shared(ignore_night)
        .then(AbsoluteError)
        .then(GroupBy::new(GroupKey::HourOfDay))
        .then(Mean);

    let rmse = base(config)
        .then(ToPositional)
        .then(Subtract)
        .then(Elementwise::square())
        .then(Mean)
        .then(Elementwise::sqrt());

    Ok(PipelineRegistry::new()
        .with(MAE_IGNORING_NIGHT, mae_ignoring_night)
        .with(MAE_PER_MONTH, mae_per_month)
        .with(MAE_PER_HOUR_OF_DAY, mae_per_hour_of_day)
        .with(RMSE, rmse))
}
