//! Timestamp-indexed numeric series

use crate::data::frequency::Frequency;
use crate::error::{PvForecastError, Result};
use crate::types::{Timestamp, TIMESTAMP_FORMAT};
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution};
use std::io;

/// An ordered mapping from timestamp to `f64`
///
/// The index is non-decreasing. `freq` is only set when the series was built
/// from a regular range or a frequency was attached explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SeriesRecord")]
pub struct TimeSeries {
    index: Vec<Timestamp>,
    values: Vec<f64>,
    freq: Option<Frequency>,
}

#[derive(Deserialize)]
struct SeriesRecord {
    index: Vec<Timestamp>,
    values: Vec<f64>,
    #[serde(default)]
    freq: Option<Frequency>,
}

impl TryFrom<SeriesRecord> for TimeSeries {
    type Error = PvForecastError;

    fn try_from(record: SeriesRecord) -> Result<Self> {
        let series = TimeSeries::new(record.index, record.values)?;
        match record.freq {
            Some(freq) => series.with_frequency(freq),
            None => Ok(series),
        }
    }
}

impl TimeSeries {
    /// Create a series without a frequency
    pub fn new(index: Vec<Timestamp>, values: Vec<f64>) -> Result<Self> {
        if index.len() != values.len() {
            return Err(PvForecastError::LengthMismatch {
                left: index.len(),
                right: values.len(),
            });
        }
        if let Some(pos) = index.windows(2).position(|w| w[1] < w[0]) {
            return Err(PvForecastError::InvalidInput(format!(
                "series index is not sorted at position {}: {} > {}",
                pos + 1,
                index[pos],
                index[pos + 1]
            )));
        }
        Ok(Self {
            index,
            values,
            freq: None,
        })
    }

    /// Create a regular series starting at `start`, one value per period
    pub fn from_range(start: Timestamp, freq: Frequency, values: Vec<f64>) -> Self {
        let index = (0..values.len())
            .map(|i| start + freq.duration() * i as i32)
            .collect();
        Self {
            index,
            values,
            freq: Some(freq),
        }
    }

    /// Build from `(timestamp, value)` pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Timestamp, f64)>,
    {
        let (index, values) = pairs.into_iter().unzip();
        Self::new(index, values)
    }

    /// Attach a frequency, checking the index is spaced exactly one period apart
    pub fn with_frequency(mut self, freq: Frequency) -> Result<Self> {
        if !freq.conforms(&self.index) {
            return Err(PvForecastError::InvalidFrequency(format!(
                "index does not conform to frequency {}",
                freq
            )));
        }
        self.freq = Some(freq);
        Ok(self)
    }

    /// Attach the frequency inferred from the index, if it is regular
    pub fn with_inferred_frequency(mut self) -> Self {
        self.freq = Frequency::infer(&self.index);
        self
    }

    pub fn index(&self) -> &[Timestamp] {
        &self.index
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn frequency(&self) -> Option<Frequency> {
        self.freq
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Timestamp, f64)> + '_ {
        self.index.iter().copied().zip(self.values.iter().copied())
    }

    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.index.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.index.last().copied()
    }

    /// Value at exactly `timestamp` (the first one, if repeated)
    pub fn get(&self, timestamp: Timestamp) -> Option<f64> {
        let pos = self.index.partition_point(|t| *t < timestamp);
        match self.index.get(pos) {
            Some(t) if *t == timestamp => Some(self.values[pos]),
            _ => None,
        }
    }

    /// Last value at or before `timestamp`
    pub fn asof(&self, timestamp: Timestamp) -> Option<f64> {
        let pos = self.index.partition_point(|t| *t <= timestamp);
        if pos == 0 {
            None
        } else {
            Some(self.values[pos - 1])
        }
    }

    /// Apply `f` to every value, keeping index and frequency
    pub fn map<F>(&self, f: F) -> TimeSeries
    where
        F: Fn(f64) -> f64,
    {
        Self {
            index: self.index.clone(),
            values: self.values.iter().map(|&v| f(v)).collect(),
            freq: self.freq,
        }
    }

    /// Like [`TimeSeries::map`], with the timestamp passed alongside the value
    pub fn map_indexed<F>(&self, f: F) -> TimeSeries
    where
        F: Fn(Timestamp, f64) -> f64,
    {
        Self {
            index: self.index.clone(),
            values: self.iter().map(|(t, v)| f(t, v)).collect(),
            freq: self.freq,
        }
    }

    /// Combine two series that share the same index
    pub fn zip_with<F>(&self, other: &TimeSeries, f: F) -> Result<TimeSeries>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.len() != other.len() {
            return Err(PvForecastError::LengthMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        if self.index != other.index {
            return Err(PvForecastError::IndexMismatch(
                "series must share the same timestamps".to_string(),
            ));
        }
        Ok(Self {
            index: self.index.clone(),
            values: self
                .values
                .iter()
                .zip(&other.values)
                .map(|(&a, &b)| f(a, b))
                .collect(),
            freq: self.freq,
        })
    }

    /// Keep entries for which `keep` returns true
    ///
    /// The result has no frequency: a filtered index is generally irregular.
    pub fn filter<F>(&self, keep: F) -> TimeSeries
    where
        F: Fn(Timestamp, f64) -> bool,
    {
        let (index, values) = self.iter().filter(|&(t, v)| keep(t, v)).unzip();
        Self {
            index,
            values,
            freq: None,
        }
    }

    /// Forward-fill this series onto `index`
    ///
    /// Each target timestamp takes the last value at or before it. Targets
    /// before the first or after the last timestamp of this series have no
    /// knot on both sides and become NaN. The result carries `freq`.
    pub fn reindex_ffill(&self, index: &[Timestamp], freq: Option<Frequency>) -> TimeSeries {
        let last = self.last_timestamp();
        let values = index
            .iter()
            .map(|&t| match last {
                Some(last) if t <= last => self.asof(t).unwrap_or(f64::NAN),
                _ => f64::NAN,
            })
            .collect();

        Self {
            index: index.to_vec(),
            values,
            freq,
        }
    }

    /// Mean of the non-NaN values (NaN if there are none)
    pub fn mean(&self) -> f64 {
        let valid: Vec<f64> = self.values.iter().copied().filter(|v| !v.is_nan()).collect();
        if valid.is_empty() {
            return f64::NAN;
        }
        Data::new(valid).mean().unwrap_or(f64::NAN)
    }

    /// Write as CSV: an unnamed index column and one value column
    pub fn write_csv<W: io::Write>(&self, writer: W, name: &str, precision: usize) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(["", name])?;
        for (t, v) in self.iter() {
            writer.write_record([
                t.format(TIMESTAMP_FORMAT).to_string(),
                format!("{:.*}", precision, v),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn ts(h: u32, m: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2022, 6, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_input() {
        assert!(matches!(
            TimeSeries::new(vec![ts(0, 0)], vec![1.0, 2.0]),
            Err(PvForecastError::LengthMismatch { left: 1, right: 2 })
        ));
        assert!(matches!(
            TimeSeries::new(vec![ts(1, 0), ts(0, 0)], vec![1.0, 2.0]),
            Err(PvForecastError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_new_has_no_frequency() {
        let series = TimeSeries::new(vec![ts(0, 0), ts(0, 30)], vec![1.0, 2.0]).unwrap();
        assert_eq!(series.frequency(), None);
        assert_eq!(
            series.with_inferred_frequency().frequency(),
            Some(Frequency::HALF_HOUR)
        );
    }

    #[test]
    fn test_from_range() {
        let series = TimeSeries::from_range(ts(0, 0), Frequency::HALF_HOUR, vec![1.0, 2.0, 3.0]);
        assert_eq!(series.index(), &[ts(0, 0), ts(0, 30), ts(1, 0)]);
        assert_eq!(series.frequency(), Some(Frequency::HALF_HOUR));
    }

    #[test]
    fn test_with_frequency_validates() {
        let series = TimeSeries::new(vec![ts(0, 0), ts(0, 30), ts(2, 0)], vec![1.0; 3]).unwrap();
        assert!(series.with_frequency(Frequency::HALF_HOUR).is_err());
    }

    #[test]
    fn test_get_and_asof() {
        let series = TimeSeries::from_range(ts(0, 0), Frequency::HOURLY, vec![1.0, 2.0, 3.0]);
        assert_eq!(series.get(ts(1, 0)), Some(2.0));
        assert_eq!(series.get(ts(1, 30)), None);
        assert_eq!(series.asof(ts(1, 30)), Some(2.0));
        assert_eq!(series.asof(ts(5, 0)), Some(3.0));
        assert_eq!(series.asof(ts(0, 0) - Duration::minutes(1)), None);
    }

    #[test]
    fn test_zip_with_requires_same_index() {
        let a = TimeSeries::from_range(ts(0, 0), Frequency::HOURLY, vec![1.0, 2.0]);
        let b = TimeSeries::from_range(ts(0, 0), Frequency::HOURLY, vec![0.5, 0.5]);
        let c = TimeSeries::from_range(ts(1, 0), Frequency::HOURLY, vec![0.5, 0.5]);

        assert_eq!(a.zip_with(&b, |x, y| x - y).unwrap().values(), &[0.5, 1.5]);
        assert!(matches!(
            a.zip_with(&c, |x, y| x - y),
            Err(PvForecastError::IndexMismatch(_))
        ));
    }

    #[test]
    fn test_filter_drops_frequency() {
        let series = TimeSeries::from_range(ts(0, 0), Frequency::HOURLY, vec![1.0, 2.0, 3.0]);
        let filtered = series.filter(|_, v| v != 2.0);
        assert_eq!(filtered.values(), &[1.0, 3.0]);
        assert_eq!(filtered.frequency(), None);
    }

    #[test]
    fn test_reindex_ffill_onto_uneven_grid() {
        let start = ts(0, 0);
        let daily = TimeSeries::from_range(start, Frequency::DAILY, vec![100.0, 200.0, 300.0]);
        let seven_hourly = TimeSeries::from_range(start, Frequency::hours(7).unwrap(), vec![1.0; 6]);

        let filled = daily.reindex_ffill(seven_hourly.index(), seven_hourly.frequency());
        assert_eq!(filled.index(), seven_hourly.index());
        assert_eq!(filled.values(), &[100.0, 100.0, 100.0, 100.0, 200.0, 200.0]);
        assert_eq!(filled.frequency(), Some(Frequency::hours(7).unwrap()));
    }

    #[test]
    fn test_reindex_ffill_outside_knots_is_nan() {
        let hourly = TimeSeries::from_range(ts(1, 0), Frequency::HOURLY, vec![10.0, 20.0]);
        let targets = [ts(0, 30), ts(1, 0), ts(1, 45), ts(2, 0), ts(2, 30)];
        let filled = hourly.reindex_ffill(&targets, None);

        assert!(filled.values()[0].is_nan());
        assert_eq!(&filled.values()[1..4], &[10.0, 10.0, 20.0]);
        assert!(filled.values()[4].is_nan());
    }

    #[test]
    fn test_mean_skips_nan() {
        let series = TimeSeries::from_range(ts(0, 0), Frequency::HOURLY, vec![1.0, f64::NAN, 3.0]);
        assert_eq!(series.mean(), 2.0);
        assert!(series.filter(|_, _| false).mean().is_nan());
    }

    #[test]
    fn test_write_csv() {
        let series = TimeSeries::from_range(ts(0, 0), Frequency::HOURLY, vec![0.5, 0.25]);
        let mut buf = Vec::new();
        series.write_csv(&mut buf, "actual", 3).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            ",actual\n2022-06-01 00:00:00,0.500\n2022-06-01 01:00:00,0.250\n"
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{"index":["2022-06-01T00:00:00Z","2022-06-01T01:00:00Z"],"values":[1.0,2.0],"freq":"1h"}"#;
        let series: TimeSeries = serde_json::from_str(json).unwrap();
        assert_eq!(series.frequency(), Some(Frequency::HOURLY));

        let bad = r#"{"index":["2022-06-01T00:00:00Z"],"values":[1.0,2.0]}"#;
        assert!(serde_json::from_str::<TimeSeries>(bad).is_err());

        let huge = r#"{"index":["2022-06-01T00:00:00Z"],"values":[1.0],"freq":"10000000000000000s"}"#;
        assert!(serde_json::from_str::<TimeSeries>(huge).is_err());
    }
}
