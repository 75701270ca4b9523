//! Reusable metric steps: error arithmetic, grouping and aggregation

use super::state::{NamedArgs, PipelineState, Value, ACTUAL, PREDICTIONS};
use super::step::Step;
use crate::data::{GroupKey, Grouped};
use crate::error::{PvForecastError, Result};

/// Turn the bag `{predictions, actual}` into the pair `(predictions, actual)`
#[derive(Debug, Clone, Copy, Default)]
pub struct ToPositional;

impl Step for ToPositional {
    fn name(&self) -> &str {
        "to_positional"
    }

    fn call_named(&self, mut args: NamedArgs) -> Result<PipelineState> {
        let predictions = args.take(self.name(), PREDICTIONS)?;
        let actual = args.take(self.name(), ACTUAL)?;
        args.ensure_consumed(self.name())?;
        Ok(PipelineState::Positional(vec![predictions, actual]))
    }
}

/// `a - b` for a positional pair of numbers and/or series
#[derive(Debug, Clone, Copy, Default)]
pub struct Subtract;

impl Step for Subtract {
    fn name(&self) -> &str {
        "subtract"
    }

    fn call_positional(&self, args: Vec<Value>) -> Result<PipelineState> {
        let [a, b]: [Value; 2] = args.try_into().map_err(|args: Vec<Value>| {
            PvForecastError::argument_mismatch(
                self.name(),
                "2 positional arguments",
                format!("{} positional arguments", args.len()),
            )
        })?;

        let difference = match (a, b) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a - b),
            (Value::Series(a), Value::Series(b)) => Value::Series(a.zip_with(&b, |x, y| x - y)?),
            (Value::Series(a), Value::Number(b)) => Value::Series(a.map(|x| x - b)),
            (Value::Number(a), Value::Series(b)) => Value::Series(b.map(|y| a - y)),
            (a, b) => {
                return Err(PvForecastError::argument_mismatch(
                    self.name(),
                    "numbers or series",
                    format!("({}, {})", a.kind(), b.kind()),
                ))
            }
        };
        Ok(difference.into())
    }
}

/// Applies a scalar function to a number or to every value of a series
#[derive(Debug, Clone, Copy)]
pub struct Elementwise {
    name: &'static str,
    f: fn(f64) -> f64,
}

impl Elementwise {
    pub fn new(name: &'static str, f: fn(f64) -> f64) -> Self {
        Self { name, f }
    }

    pub fn abs() -> Self {
        Self::new("abs", f64::abs)
    }

    pub fn square() -> Self {
        Self::new("square", |x| x * x)
    }

    pub fn sqrt() -> Self {
        Self::new("sqrt", f64::sqrt)
    }
}

impl Step for Elementwise {
    fn name(&self) -> &str {
        self.name
    }

    fn call_value(&self, value: Value) -> Result<PipelineState> {
        match value {
            Value::Number(n) => Ok((self.f)(n).into()),
            Value::Series(s) => Ok(s.map(self.f).into()),
            other => Err(PvForecastError::argument_mismatch(
                self.name,
                "number or series",
                other.kind(),
            )),
        }
    }
}

/// Mean of a series (NaN skipped), or per-group means of a grouped series
#[derive(Debug, Clone, Copy, Default)]
pub struct Mean;

impl Step for Mean {
    fn name(&self) -> &str {
        "mean"
    }

    fn call_value(&self, value: Value) -> Result<PipelineState> {
        match value {
            Value::Number(n) => Ok(n.into()),
            Value::Series(s) => Ok(s.mean().into()),
            Value::Grouped(g) => Ok(g.aggregate(|s| s.mean())?.into()),
            other => Err(PvForecastError::argument_mismatch(
                self.name(),
                "number, series or grouped series",
                other.kind(),
            )),
        }
    }
}

/// `|predictions - actual|` from the named bag
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteError;

impl Step for AbsoluteError {
    fn name(&self) -> &str {
        "absolute_error"
    }

    fn call_named(&self, mut args: NamedArgs) -> Result<PipelineState> {
        let predictions = args.take_series(self.name(), PREDICTIONS)?;
        let actual = args.take_series(self.name(), ACTUAL)?;
        args.ensure_consumed(self.name())?;
        Ok(predictions.zip_with(&actual, |p, a| (p - a).abs())?.into())
    }
}

/// Split a series into calendar groups
#[derive(Debug, Clone, Copy)]
pub struct GroupBy {
    key: GroupKey,
}

impl GroupBy {
    pub fn new(key: GroupKey) -> Self {
        Self { key }
    }
}

impl Step for GroupBy {
    fn name(&self) -> &str {
        "group_by"
    }

    fn call_value(&self, value: Value) -> Result<PipelineState> {
        let series = value.into_series(self.name())?;
        Ok(Value::Grouped(Grouped::from_series(&series, self.key)?).into())
    }
}
