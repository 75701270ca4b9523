//! Fourier encoding of time-of-day and day-of-year
//!
//! Every timestamp becomes six cyclical features: sin/cos of the daily phase,
//! sin/cos of the annual phase, and sin/cos of four times the annual phase.
//!
//! The year is always 365 days long, leap years included.

use crate::data::{FeatureTable, Frequency, FrequencyConverter};
use crate::error::{PvForecastError, Result};
use crate::types::Timestamp;
use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use num_traits::{Float, FloatConst};
use serde::{Deserialize, Serialize};

pub const SECONDS_PER_HOUR: f64 = 60.0 * 60.0;
pub const MINUTES_PER_HOUR: f64 = 60.0;
pub const HOURS_PER_DAY: f64 = 24.0;
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Output column names, in output order
pub const COLUMNS: [&str; 6] = [
    "day_sin",
    "day_cos",
    "year_sin",
    "year_cos",
    "year_x4_sin",
    "year_x4_cos",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Encoded features for a single timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FourierFeatures {
    pub day_sin: f64,
    pub day_cos: f64,
    pub year_sin: f64,
    pub year_cos: f64,
    pub year_x4_sin: f64,
    pub year_x4_cos: f64,
}

impl FourierFeatures {
    /// Values in [`COLUMNS`] order
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.day_sin,
            self.day_cos,
            self.year_sin,
            self.year_cos,
            self.year_x4_sin,
            self.year_x4_cos,
        ]
    }
}

/// Convert a number in the range [0, 1] to radians in [0, 2π]
///
/// No validation: values outside [0, 1] map linearly outside [0, 2π].
pub fn fraction_to_radians<T: Float + FloatConst>(fraction: T) -> T {
    fraction * (T::one() + T::one()) * T::PI()
}

/// Element-wise [`fraction_to_radians`]
pub fn fractions_to_radians<T: Float + FloatConst>(fractions: &[T]) -> Vec<T> {
    fractions.iter().map(|&f| fraction_to_radians(f)).collect()
}

/// Fraction of the day elapsed at `timestamp`, in [0, 1)
pub fn hour_of_day_fraction(timestamp: Timestamp) -> f64 {
    let hour_of_day = timestamp.hour() as f64
        + timestamp.minute() as f64 / MINUTES_PER_HOUR
        + timestamp.second() as f64 / SECONDS_PER_HOUR;
    hour_of_day / HOURS_PER_DAY
}

/// Encode a single timestamp
pub fn encode_one(timestamp: Timestamp) -> FourierFeatures {
    let day_fraction = hour_of_day_fraction(timestamp);
    let day_radians = fraction_to_radians(day_fraction);

    // 1-based ordinal plus the elapsed part of the day
    let day_of_year = timestamp.ordinal() as f64 + day_fraction;
    let year_radians = fraction_to_radians(day_of_year / DAYS_PER_YEAR);

    FourierFeatures {
        day_sin: day_radians.sin(),
        day_cos: day_radians.cos(),
        year_sin: year_radians.sin(),
        year_cos: year_radians.cos(),
        year_x4_sin: (year_radians * 4.0).sin(),
        year_x4_cos: (year_radians * 4.0).cos(),
    }
}

/// Encode a non-empty sequence of timestamps into a six-column table
///
/// The table index is the input sequence, unchanged and in order.
pub fn encode(timestamps: &[Timestamp]) -> Result<FeatureTable> {
    if timestamps.is_empty() {
        return Err(PvForecastError::InvalidInput(
            "cannot encode an empty timestamp sequence".to_string(),
        ));
    }
    log::debug!("Fourier-encoding {} timestamps", timestamps.len());

    let mut columns: [Vec<f64>; 6] = Default::default();
    for column in columns.iter_mut() {
        column.reserve(timestamps.len());
    }
    for &timestamp in timestamps {
        for (column, value) in columns.iter_mut().zip(encode_one(timestamp).to_array()) {
            column.push(value);
        }
    }

    COLUMNS
        .iter()
        .zip(columns)
        .try_fold(FeatureTable::new(timestamps.to_vec()), |table, (name, values)| {
            table.with_column(*name, values)
        })
}

/// Encode every timestamp from `start` to `end` inclusive at `freq`
///
/// The resulting table carries `freq`.
pub fn encode_range(start: Timestamp, end: Timestamp, freq: Frequency) -> Result<FeatureTable> {
    let timestamps = FrequencyConverter::date_range(start, end, freq);
    Ok(encode(&timestamps)?.with_frequency(Some(freq)))
}

/// Parse and encode timestamp strings
///
/// Accepts RFC 3339 (any offset, converted to UTC) or naive
/// `YYYY-MM-DD[T ]HH:MM[:SS]` taken as UTC.
pub fn encode_strs(timestamps: &[&str]) -> Result<FeatureTable> {
    let parsed = timestamps
        .iter()
        .enumerate()
        .map(|(i, s)| {
            parse_timestamp(s).ok_or_else(|| {
                PvForecastError::InvalidInput(format!("invalid timestamp at position {}: '{}'", i, s))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    encode(&parsed)
}

fn parse_timestamp(s: &str) -> Option<Timestamp> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}
