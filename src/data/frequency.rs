//! Sampling frequency types and conversion utilities

use crate::error::{PvForecastError, Result};
use crate::types::Timestamp;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;

/// Fixed sampling period of a regular time series
///
/// Parsed from and displayed as pandas-style aliases: `"15s"`, `"30min"`,
/// `"1h"`, `"1d"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Frequency {
    seconds: i64,
}

impl Frequency {
    pub const SECOND: Frequency = Frequency { seconds: 1 };
    pub const MINUTE: Frequency = Frequency { seconds: SECONDS_PER_MINUTE };
    pub const HALF_HOUR: Frequency = Frequency { seconds: 30 * SECONDS_PER_MINUTE };
    pub const HOURLY: Frequency = Frequency { seconds: SECONDS_PER_HOUR };
    pub const DAILY: Frequency = Frequency { seconds: SECONDS_PER_DAY };

    /// Create a frequency from a period in seconds
    ///
    /// The period must be positive and representable as a [`Duration`].
    pub fn from_seconds(seconds: i64) -> Result<Self> {
        if seconds <= 0 {
            return Err(PvForecastError::InvalidFrequency(format!(
                "period must be positive, got {}s",
                seconds
            )));
        }
        if Duration::try_seconds(seconds).is_none() {
            return Err(PvForecastError::InvalidFrequency(format!(
                "period of {}s is out of range",
                seconds
            )));
        }
        Ok(Self { seconds })
    }

    pub fn minutes(n: i64) -> Result<Self> {
        Self::from_count(n, SECONDS_PER_MINUTE)
    }

    pub fn hours(n: i64) -> Result<Self> {
        Self::from_count(n, SECONDS_PER_HOUR)
    }

    pub fn days(n: i64) -> Result<Self> {
        Self::from_count(n, SECONDS_PER_DAY)
    }

    fn from_count(count: i64, unit_seconds: i64) -> Result<Self> {
        let seconds = count.checked_mul(unit_seconds).ok_or_else(|| {
            PvForecastError::InvalidFrequency(format!(
                "period of {} x {}s is out of range",
                count, unit_seconds
            ))
        })?;
        Self::from_seconds(seconds)
    }

    /// Create a frequency from a chrono duration (whole seconds only)
    pub fn from_duration(duration: Duration) -> Result<Self> {
        if Duration::try_seconds(duration.num_seconds()) != Some(duration) {
            return Err(PvForecastError::InvalidFrequency(format!(
                "sub-second periods are not supported: {}",
                duration
            )));
        }
        Self::from_seconds(duration.num_seconds())
    }

    /// Get the duration represented by this frequency
    pub fn duration(&self) -> Duration {
        Duration::seconds(self.seconds)
    }

    pub fn as_seconds(&self) -> i64 {
        self.seconds
    }

    /// Infer the frequency of an index whose timestamps are evenly spaced
    ///
    /// Returns `None` for fewer than two timestamps, uneven spacing, or
    /// repeated timestamps.
    pub fn infer(index: &[Timestamp]) -> Option<Frequency> {
        if index.len() < 2 {
            return None;
        }
        let step = index[1].signed_duration_since(index[0]);
        let freq = Frequency::from_duration(step).ok()?;
        if freq.conforms(index) {
            Some(freq)
        } else {
            None
        }
    }

    /// Check that consecutive timestamps are exactly one period apart
    pub fn conforms(&self, index: &[Timestamp]) -> bool {
        let step = self.duration();
        index
            .windows(2)
            .all(|w| w[1].signed_duration_since(w[0]) == step)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.seconds;
        if s % SECONDS_PER_DAY == 0 {
            write!(f, "{}d", s / SECONDS_PER_DAY)
        } else if s % SECONDS_PER_HOUR == 0 {
            write!(f, "{}h", s / SECONDS_PER_HOUR)
        } else if s % SECONDS_PER_MINUTE == 0 {
            write!(f, "{}min", s / SECONDS_PER_MINUTE)
        } else {
            write!(f, "{}s", s)
        }
    }
}

impl FromStr for Frequency {
    type Err = PvForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (count, unit) = s.split_at(split);
        let count: i64 = if count.is_empty() {
            1
        } else {
            count
                .parse()
                .map_err(|_| PvForecastError::InvalidFrequency(s.clone()))?
        };

        let unit_seconds = match unit {
            "s" | "sec" | "second" | "seconds" => 1,
            "t" | "min" | "minute" | "minutes" => SECONDS_PER_MINUTE,
            "h" | "hour" | "hours" | "hourly" => SECONDS_PER_HOUR,
            "d" | "day" | "days" | "daily" => SECONDS_PER_DAY,
            _ => return Err(PvForecastError::InvalidFrequency(s.clone())),
        };

        Frequency::from_count(count, unit_seconds)
    }
}

impl TryFrom<String> for Frequency {
    type Error = PvForecastError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Frequency> for String {
    fn from(freq: Frequency) -> Self {
        freq.to_string()
    }
}

/// Range generation for a [`Frequency`]
pub struct FrequencyConverter;

impl FrequencyConverter {
    /// Generate timestamps at given frequency from `start` to `end` inclusive
    ///
    /// Stops early if the next timestamp would leave chrono's date range.
    pub fn date_range(start: Timestamp, end: Timestamp, frequency: Frequency) -> Vec<Timestamp> {
        let step = frequency.duration();
        let mut timestamps = Vec::new();
        let mut current = Some(start);

        while let Some(t) = current.filter(|t| *t <= end) {
            timestamps.push(t);
            current = t.checked_add_signed(step);
        }

        timestamps
    }
}
