//! The step abstraction and closure adapters

use super::state::{NamedArgs, PipelineState, Value};
use crate::error::{PvForecastError, Result};

const UNSUPPORTED: &str = "a supported calling convention";

/// One stage of a metrics pipeline
///
/// A step accepts the calling conventions it overrides. The defaults reject
/// the call with [`PvForecastError::ArgumentMismatch`], which the runner
/// passes back to the caller untouched.
pub trait Step: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Called when the previous state is a bag of named arguments
    fn call_named(&self, args: NamedArgs) -> Result<PipelineState> {
        let found = PipelineState::NamedArgs(args).shape();
        Err(PvForecastError::argument_mismatch(self.name(), UNSUPPORTED, found))
    }

    /// Called when the previous state is a positional tuple
    fn call_positional(&self, args: Vec<Value>) -> Result<PipelineState> {
        let found = PipelineState::Positional(args).shape();
        Err(PvForecastError::argument_mismatch(self.name(), UNSUPPORTED, found))
    }

    /// Called when the previous state is a single value
    fn call_value(&self, value: Value) -> Result<PipelineState> {
        let found = PipelineState::Value(value).shape();
        Err(PvForecastError::argument_mismatch(self.name(), UNSUPPORTED, found))
    }
}

/// Step backed by a closure over named arguments
pub struct NamedFn<F> {
    name: String,
    f: F,
}

impl<F> Step for NamedFn<F>
where
    F: Fn(NamedArgs) -> Result<PipelineState> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn call_named(&self, args: NamedArgs) -> Result<PipelineState> {
        (self.f)(args)
    }
}

/// Step backed by a closure over positional arguments
pub struct PositionalFn<F> {
    name: String,
    f: F,
}

impl<F> Step for PositionalFn<F>
where
    F: Fn(Vec<Value>) -> Result<PipelineState> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn call_positional(&self, args: Vec<Value>) -> Result<PipelineState> {
        (self.f)(args)
    }
}

/// Step backed by a closure over a single value
pub struct ValueFn<F> {
    name: String,
    f: F,
}

impl<F> Step for ValueFn<F>
where
    F: Fn(Value) -> Result<PipelineState> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn call_value(&self, value: Value) -> Result<PipelineState> {
        (self.f)(value)
    }
}

/// Wrap a closure taking named arguments
pub fn named<F>(name: impl Into<String>, f: F) -> NamedFn<F>
where
    F: Fn(NamedArgs) -> Result<PipelineState> + Send + Sync,
{
    NamedFn {
        name: name.into(),
        f,
    }
}

/// Wrap a closure taking positional arguments
pub fn positional<F>(name: impl Into<String>, f: F) -> PositionalFn<F>
where
    F: Fn(Vec<Value>) -> Result<PipelineState> + Send + Sync,
{
    PositionalFn {
        name: name.into(),
        f,
    }
}

/// Wrap a closure taking a single value
pub fn value<F>(name: impl Into<String>, f: F) -> ValueFn<F>
where
    F: Fn(Value) -> Result<PipelineState> + Send + Sync,
{
    ValueFn {
        name: name.into(),
        f,
    }
}
