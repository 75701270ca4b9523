//! Night masking by solar elevation

use super::state::{NamedArgs, PipelineState, ACTUAL, PREDICTIONS};
use super::step::Step;
use crate::error::Result;
use crate::types::Timestamp;
use chrono::{Datelike, Timelike};
use std::f64::consts::PI;

const DEG: f64 = PI / 180.0;

/// Approximate solar elevation angle in degrees
///
/// Declination and equation of time follow Spencer (1971). Accurate to
/// roughly half a degree, enough to tell day from night.
pub fn solar_elevation(timestamp: Timestamp, latitude: f64, longitude: f64) -> f64 {
    let day_of_year = timestamp.ordinal() as f64;
    let utc_hours = timestamp.hour() as f64
        + timestamp.minute() as f64 / 60.0
        + timestamp.second() as f64 / 3600.0;

    // Fractional year (radians)
    let b = 2.0 * PI * (day_of_year - 1.0) / 365.0;

    let declination = 0.006918 - 0.399912 * b.cos() + 0.070257 * b.sin()
        - 0.006758 * (2.0 * b).cos()
        + 0.000907 * (2.0 * b).sin()
        - 0.002697 * (3.0 * b).cos()
        + 0.00148 * (3.0 * b).sin();

    // minutes
    let equation_of_time = 229.18
        * (0.000075 + 0.001868 * b.cos()
            - 0.032077 * b.sin()
            - 0.014615 * (2.0 * b).cos()
            - 0.04089 * (2.0 * b).sin());

    let solar_time = utc_hours + longitude / 15.0 + equation_of_time / 60.0;
    let hour_angle = 15.0 * (solar_time - 12.0) * DEG;

    let lat = latitude * DEG;
    let sin_elevation =
        lat.sin() * declination.sin() + lat.cos() * declination.cos() * hour_angle.cos();
    sin_elevation.clamp(-1.0, 1.0).asin() / DEG
}

/// Drop every timestamp at which the sun is below `threshold_degrees`
/// from both `predictions` and `actual`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IgnoreNight {
    latitude: f64,
    longitude: f64,
    threshold_degrees: f64,
}

impl IgnoreNight {
    pub fn new(latitude: f64, longitude: f64, threshold_degrees: f64) -> Self {
        Self {
            latitude,
            longitude,
            threshold_degrees,
        }
    }

    pub fn is_night(&self, timestamp: Timestamp) -> bool {
        solar_elevation(timestamp, self.latitude, self.longitude) < self.threshold_degrees
    }
}

impl Step for IgnoreNight {
    fn name(&self) -> &str {
        "ignore_night"
    }

    fn call_named(&self, mut args: NamedArgs) -> Result<PipelineState> {
        let predictions = args.take_series(self.name(), PREDICTIONS)?;
        let actual = args.take_series(self.name(), ACTUAL)?;
        args.ensure_consumed(self.name())?;

        let predictions = predictions.filter(|t, _| !self.is_night(t));
        let actual = actual.filter(|t, _| !self.is_night(t));
        log::debug!(
            "Kept {} daytime predictions and {} daytime actuals",
            predictions.len(),
            actual.len()
        );

        Ok(NamedArgs::predictions_and_actual(predictions, actual).into())
    }
}
