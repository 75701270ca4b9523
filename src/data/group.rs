//! Calendar grouping of time series

use crate::data::series::TimeSeries;
use crate::error::Result;
use crate::types::Timestamp;
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How timestamps are bucketed into groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    /// Calendar month, keyed on the first instant of the month
    Month,
    /// Clock hour, keyed on the start of the hour
    Hour,
    /// Hour of day across all dates, keyed on 1970-01-01 at that hour
    HourOfDay,
}

impl GroupKey {
    /// Group label for a timestamp
    pub fn key(&self, timestamp: Timestamp) -> Timestamp {
        let (date, hour) = match self {
            GroupKey::Month => (
                NaiveDate::from_ymd_opt(timestamp.year(), timestamp.month(), 1),
                0,
            ),
            GroupKey::Hour => (Some(timestamp.date_naive()), timestamp.hour()),
            GroupKey::HourOfDay => (NaiveDate::from_ymd_opt(1970, 1, 1), timestamp.hour()),
        };
        date.and_then(|d| d.and_hms_opt(hour, 0, 0))
            .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
            .unwrap_or(timestamp)
    }
}

/// A series split into labelled groups, ordered by label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grouped {
    key: GroupKey,
    groups: Vec<(Timestamp, TimeSeries)>,
}

impl Grouped {
    /// Split `series` by `key`; members of each group keep their original order
    pub fn from_series(series: &TimeSeries, key: GroupKey) -> Result<Self> {
        let mut buckets: BTreeMap<Timestamp, Vec<(Timestamp, f64)>> = BTreeMap::new();
        for (t, v) in series.iter() {
            buckets.entry(key.key(t)).or_default().push((t, v));
        }

        let groups = buckets
            .into_iter()
            .map(|(label, members)| Ok((label, TimeSeries::from_pairs(members)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { key, groups })
    }

    pub fn group_key(&self) -> GroupKey {
        self.key
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn labels(&self) -> Vec<Timestamp> {
        self.groups.iter().map(|(label, _)| *label).collect()
    }

    pub fn get(&self, label: Timestamp) -> Option<&TimeSeries> {
        self.groups
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, series)| series)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Timestamp, &TimeSeries)> {
        self.groups.iter().map(|(label, series)| (label, series))
    }

    /// Reduce every group to one value, giving a series indexed by label
    pub fn aggregate<F>(&self, f: F) -> Result<TimeSeries>
    where
        F: Fn(&TimeSeries) -> f64,
    {
        TimeSeries::from_pairs(self.groups.iter().map(|(label, series)| (*label, f(series))))
    }
}
