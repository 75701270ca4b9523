//! Values threaded through a metrics pipeline

use crate::data::{FeatureTable, Grouped, TimeSeries};
use crate::error::{PvForecastError, Result};

/// Binding name of the forecast series in the initial argument bag
pub const PREDICTIONS: &str = "predictions";
/// Binding name of the observed series in the initial argument bag
pub const ACTUAL: &str = "actual";

/// A single pipeline value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Series(TimeSeries),
    Table(FeatureTable),
    Grouped(Grouped),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Series(_) => "series",
            Value::Table(_) => "table",
            Value::Grouped(_) => "grouped series",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&TimeSeries> {
        match self {
            Value::Series(s) => Some(s),
            _ => None,
        }
    }

    /// Unwrap a series, or report which step wanted one
    pub fn into_series(self, step: &str) -> Result<TimeSeries> {
        match self {
            Value::Series(s) => Ok(s),
            other => Err(PvForecastError::argument_mismatch(step, "series", other.kind())),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<TimeSeries> for Value {
    fn from(s: TimeSeries) -> Self {
        Value::Series(s)
    }
}

impl From<FeatureTable> for Value {
    fn from(t: FeatureTable) -> Self {
        Value::Table(t)
    }
}

impl From<Grouped> for Value {
    fn from(g: Grouped) -> Self {
        Value::Grouped(g)
    }
}

/// An ordered bag of named values (keyword arguments)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamedArgs {
    args: Vec<(String, Value)>,
}

impl NamedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bag every pipeline run starts from
    pub fn predictions_and_actual(predictions: TimeSeries, actual: TimeSeries) -> Self {
        Self::new()
            .with(PREDICTIONS, predictions)
            .with(ACTUAL, actual)
    }

    /// Bind `name`, replacing any existing binding
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.args.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.args.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.args.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let pos = self.args.iter().position(|(n, _)| n == name)?;
        Some(self.args.remove(pos).1)
    }

    /// Remove a required binding; a missing one is an argument error of `step`
    pub fn take(&mut self, step: &str, name: &str) -> Result<Value> {
        self.remove(name).ok_or_else(|| {
            PvForecastError::argument_mismatch(
                step,
                format!("argument '{}'", name),
                format!("named arguments [{}]", self.names().join(", ")),
            )
        })
    }

    /// Remove a required series binding
    pub fn take_series(&mut self, step: &str, name: &str) -> Result<TimeSeries> {
        self.take(step, name)?.into_series(step)
    }

    /// Fail if any binding is left over after a step took what it needs
    pub fn ensure_consumed(&self, step: &str) -> Result<()> {
        if self.args.is_empty() {
            return Ok(());
        }
        Err(PvForecastError::argument_mismatch(
            step,
            "no further arguments",
            format!("unexpected arguments [{}]", self.names().join(", ")),
        ))
    }

    pub fn names(&self) -> Vec<&str> {
        self.args.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.args.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// The accumulator of a pipeline run
///
/// Its variant decides how the next step is called:
/// - `NamedArgs`: [`Step::call_named`](super::Step::call_named) with the bag
/// - `Positional`: [`Step::call_positional`](super::Step::call_positional) with the values in order
/// - `Value`: [`Step::call_value`](super::Step::call_value) with the single value
///
/// A step's return variant is therefore its contract with the step after it.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    NamedArgs(NamedArgs),
    Positional(Vec<Value>),
    Value(Value),
}

impl PipelineState {
    /// Human-readable description of the calling convention this state selects
    pub fn shape(&self) -> String {
        match self {
            PipelineState::NamedArgs(args) => {
                format!("named arguments [{}]", args.names().join(", "))
            }
            PipelineState::Positional(values) => format!("{} positional arguments", values.len()),
            PipelineState::Value(value) => format!("single {}", value.kind()),
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            PipelineState::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            PipelineState::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        self.as_value().and_then(Value::as_number)
    }

    pub fn as_series(&self) -> Option<&TimeSeries> {
        self.as_value().and_then(Value::as_series)
    }

    pub fn as_named(&self) -> Option<&NamedArgs> {
        match self {
            PipelineState::NamedArgs(args) => Some(args),
            _ => None,
        }
    }
}

impl From<Value> for PipelineState {
    fn from(v: Value) -> Self {
        PipelineState::Value(v)
    }
}

impl From<NamedArgs> for PipelineState {
    fn from(args: NamedArgs) -> Self {
        PipelineState::NamedArgs(args)
    }
}

impl From<Vec<Value>> for PipelineState {
    fn from(values: Vec<Value>) -> Self {
        PipelineState::Positional(values)
    }
}

impl From<f64> for PipelineState {
    fn from(n: f64) -> Self {
        PipelineState::Value(Value::Number(n))
    }
}

impl From<TimeSeries> for PipelineState {
    fn from(s: TimeSeries) -> Self {
        PipelineState::Value(Value::Series(s))
    }
}
