//! Scale yield fractions back to power using installed capacity

use super::state::{NamedArgs, PipelineState, ACTUAL, PREDICTIONS};
use super::step::Step;
use crate::data::TimeSeries;
use crate::error::{PvForecastError, Result};

/// Installed PV capacity: one constant or a capacity series
#[derive(Debug, Clone, PartialEq)]
pub enum Capacity {
    Constant(f64),
    Series(TimeSeries),
}

impl From<f64> for Capacity {
    fn from(c: f64) -> Self {
        Capacity::Constant(c)
    }
}

impl From<TimeSeries> for Capacity {
    fn from(s: TimeSeries) -> Self {
        Capacity::Series(s)
    }
}

/// Check whether a capacity series can be used as is or needs forward filling
///
/// Series with equal frequencies (including both undefined) are aligned by
/// timestamp as they are. Otherwise both frequencies must be known and the
/// capacity is forward-filled onto the target timestamps.
fn needs_forward_fill(capacity: &TimeSeries, actual: &TimeSeries) -> Result<bool> {
    match (capacity.frequency(), actual.frequency()) {
        (from, to) if from == to => Ok(false),
        (Some(from), Some(to)) => {
            log::debug!("Resampling capacity from {} to {}", from, to);
            Ok(true)
        }
        (from, to) => Err(PvForecastError::Resample(format!(
            "cannot resample capacity with frequency {} to {}",
            describe(from),
            describe(to)
        ))),
    }
}

fn describe(freq: Option<crate::data::Frequency>) -> String {
    freq.map(|f| f.to_string())
        .unwrap_or_else(|| "undefined".to_string())
}

/// Multiply `series` by the capacity at the same timestamp
///
/// Timestamps without a capacity value become NaN.
fn scale(
    series: &TimeSeries,
    capacity: &TimeSeries,
    forward_fill: bool,
    label: &str,
) -> TimeSeries {
    let filled;
    let capacity = if forward_fill {
        filled = capacity.reindex_ffill(series.index(), series.frequency());
        &filled
    } else {
        capacity
    };

    let missing = series
        .iter()
        .filter(|&(t, _)| capacity.get(t).map_or(true, f64::is_nan))
        .count();
    if missing > 0 {
        log::warn!(
            "{} of {} {} timestamps have no capacity value",
            missing,
            series.len(),
            label
        );
    }
    series.map_indexed(|t, v| capacity.get(t).map_or(f64::NAN, |c| v * c))
}

/// Multiply `predictions` and `actual` by `capacity`
///
/// Returns the bag `{predictions, actual}` with the scaled series. Output
/// series keep their input index.
pub fn denormalize(
    predictions: &TimeSeries,
    actual: &TimeSeries,
    capacity: &Capacity,
) -> Result<NamedArgs> {
    let (predictions, actual) = match capacity {
        Capacity::Constant(c) => (predictions.map(|v| v * c), actual.map(|v| v * c)),
        Capacity::Series(series) => {
            let forward_fill = needs_forward_fill(series, actual)?;
            (
                scale(predictions, series, forward_fill, PREDICTIONS),
                scale(actual, series, forward_fill, ACTUAL),
            )
        }
    };
    Ok(NamedArgs::predictions_and_actual(predictions, actual))
}

/// [`denormalize`] as a pipeline step bound to one capacity
#[derive(Debug, Clone)]
pub struct Denormalize {
    capacity: Capacity,
}

impl Denormalize {
    pub fn new(capacity: impl Into<Capacity>) -> Self {
        Self {
            capacity: capacity.into(),
        }
    }

    pub fn capacity(&self) -> &Capacity {
        &self.capacity
    }
}

impl Step for Denormalize {
    fn name(&self) -> &str {
        "denormalize"
    }

    fn call_named(&self, mut args: NamedArgs) -> Result<PipelineState> {
        let predictions = args.take_series(self.name(), PREDICTIONS)?;
        let actual = args.take_series(self.name(), ACTUAL)?;
        args.ensure_consumed(self.name())?;
        Ok(denormalize(&predictions, &actual, &self.capacity)?.into())
    }
}
