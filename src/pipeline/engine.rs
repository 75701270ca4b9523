//! Pipeline execution engine for forecast metrics

use super::state::{NamedArgs, PipelineState};
use super::step::Step;
use crate::data::TimeSeries;
use crate::error::Result;
use hashbrown::HashMap;
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;

/// An ordered sequence of steps
///
/// Cloning is cheap; steps are shared.
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<Arc<dyn Step>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step
    pub fn then<S: Step + 'static>(mut self, step: S) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    /// Append an already shared step
    pub fn then_shared(mut self, step: Arc<dyn Step>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(&self) -> &[Arc<dyn Step>] {
        &self.steps
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.step_names())
            .finish()
    }
}

/// Named pipelines, kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct PipelineRegistry {
    entries: Vec<(String, Pipeline)>,
    positions: HashMap<String, usize>,
}

impl PipelineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pipeline, replacing any pipeline with the same name
    pub fn insert(&mut self, name: impl Into<String>, pipeline: Pipeline) {
        let name = name.into();
        match self.positions.get(&name) {
            Some(&pos) => self.entries[pos].1 = pipeline,
            None => {
                self.positions.insert(name.clone(), self.entries.len());
                self.entries.push((name, pipeline));
            }
        }
    }

    pub fn with(mut self, name: impl Into<String>, pipeline: Pipeline) -> Self {
        self.insert(name, pipeline);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Pipeline> {
        self.positions.get(name).map(|&pos| &self.entries[pos].1)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Pipeline)> {
        self.entries.iter().map(|(n, p)| (n.as_str(), p))
    }
}

/// Final state of every pipeline of a registry, in registry order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineResults {
    entries: Vec<(String, PipelineState)>,
}

impl PipelineResults {
    pub fn get(&self, name: &str) -> Option<&PipelineState> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PipelineState)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn into_map(self) -> HashMap<String, PipelineState> {
        self.entries.into_iter().collect()
    }
}

impl FromIterator<(String, PipelineState)> for PipelineResults {
    fn from_iter<I: IntoIterator<Item = (String, PipelineState)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Invoke `step` with the calling convention selected by `state`
pub fn dispatch(step: &dyn Step, state: PipelineState) -> Result<PipelineState> {
    log::debug!("Step '{}' called with {}", step.name(), state.shape());
    match state {
        PipelineState::NamedArgs(args) => step.call_named(args),
        PipelineState::Positional(args) => step.call_positional(args),
        PipelineState::Value(value) => step.call_value(value),
    }
}

/// Run one pipeline as a left fold over its steps
///
/// The fold starts from the bag `{predictions, actual}`. Step errors are
/// returned as-is.
pub fn run_one(
    pipeline: &Pipeline,
    predictions: &TimeSeries,
    actual: &TimeSeries,
) -> Result<PipelineState> {
    let initial = PipelineState::NamedArgs(NamedArgs::predictions_and_actual(
        predictions.clone(),
        actual.clone(),
    ));

    pipeline
        .steps
        .iter()
        .try_fold(initial, |state, step| dispatch(step.as_ref(), state))
}

/// Run every pipeline in the registry against the same inputs
///
/// The first failing pipeline aborts the batch and its error is returned.
pub fn run_all(
    registry: &PipelineRegistry,
    predictions: &TimeSeries,
    actual: &TimeSeries,
) -> Result<PipelineResults> {
    log::info!("Running {} metrics pipelines", registry.len());

    registry
        .iter()
        .map(|(name, pipeline)| {
            log::debug!("Running pipeline '{}'", name);
            Ok((name.to_string(), run_one(pipeline, predictions, actual)?))
        })
        .collect()
}

/// Parallel [`run_all`]
///
/// Results are identical to the sequential run. On failure the error of the
/// first failing pipeline in registry order is returned.
pub fn run_all_parallel(
    registry: &PipelineRegistry,
    predictions: &TimeSeries,
    actual: &TimeSeries,
) -> Result<PipelineResults> {
    log::info!("Running {} metrics pipelines in parallel", registry.len());

    let outcomes: Vec<Result<(String, PipelineState)>> = registry
        .entries
        .par_iter()
        .map(|(name, pipeline)| Ok((name.clone(), run_one(pipeline, predictions, actual)?)))
        .collect();

    outcomes.into_iter().collect()
}

/// Run every pipeline, keeping each pipeline's outcome separately
pub fn run_all_isolated(
    registry: &PipelineRegistry,
    predictions: &TimeSeries,
    actual: &TimeSeries,
) -> Vec<(String, Result<PipelineState>)> {
    registry
        .iter()
        .map(|(name, pipeline)| {
            let outcome = run_one(pipeline, predictions, actual);
            if let Err(e) = &outcome {
                log::warn!("Pipeline '{}' failed: {}", name, e);
            }
            (name.to_string(), outcome)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Frequency;
    use crate::error::PvForecastError;
    use crate::pipeline::state::{Value, ACTUAL, PREDICTIONS};
    use crate::pipeline::step;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    fn series(values: Vec<f64>) -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2022, 5, 1, 10, 0, 0).unwrap();
        TimeSeries::from_range(start, Frequency::HALF_HOUR, values)
    }

    #[test]
    fn test_empty_pipeline_returns_initial_bag() {
        let p = series(vec![0.1, 0.2]);
        let a = series(vec![0.3, 0.4]);
        let result = run_one(&Pipeline::new(), &p, &a).unwrap();

        let bag = result.as_named().unwrap();
        assert_eq!(bag.names(), vec![PREDICTIONS, ACTUAL]);
        assert_eq!(bag.get(PREDICTIONS), Some(&Value::Series(p)));
        assert_eq!(bag.get(ACTUAL), Some(&Value::Series(a)));
    }

    #[test]
    fn test_dispatch_follows_state_shape() {
        let calls = Arc::new(Mutex::new(Vec::new()));

        let f_calls = Arc::clone(&calls);
        let f = step::named("f", move |mut args| {
            f_calls.lock().unwrap().push("named");
            let p = args.take_series("f", PREDICTIONS)?;
            let a = args.take_series("f", ACTUAL)?;
            args.ensure_consumed("f")?;
            Ok(PipelineState::Positional(vec![p.into(), a.into()]))
        });

        let g_calls = Arc::clone(&calls);
        let g = step::positional("g", move |args| {
            g_calls.lock().unwrap().push("positional");
            assert_eq!(args.len(), 2);
            let total: f64 = args
                .iter()
                .filter_map(Value::as_series)
                .map(|s| s.values().iter().sum::<f64>())
                .sum();
            Ok(PipelineState::from(total))
        });

        let h_calls = Arc::clone(&calls);
        let h = step::value("h", move |v| {
            h_calls.lock().unwrap().push("value");
            Ok(PipelineState::from(v.as_number().unwrap_or(f64::NAN) * 10.0))
        });

        let pipeline = Pipeline::new().then(f).then(g).then(h);
        let result = run_one(&pipeline, &series(vec![1.0, 2.0]), &series(vec![3.0, 4.0])).unwrap();

        assert_eq!(result.as_number(), Some(100.0));
        assert_eq!(*calls.lock().unwrap(), vec!["named", "positional", "value"]);
    }

    #[test]
    fn test_shape_mismatch_propagates_unchanged() {
        let scalar = step::named("scalar", |_| Ok(PipelineState::from(1.0)));
        let wants_pair = step::positional("wants_pair", |_| Ok(PipelineState::from(0.0)));
        let pipeline = Pipeline::new().then(scalar).then(wants_pair);

        let err = run_one(&pipeline, &series(vec![1.0]), &series(vec![1.0])).unwrap_err();
        match err {
            PvForecastError::ArgumentMismatch { step, found, .. } => {
                assert_eq!(step, "wants_pair");
                assert_eq!(found, "single number");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_step_error_propagates_unchanged() {
        let failing = step::named("failing", |_| {
            Err(PvForecastError::InvalidInput("boom".to_string()))
        });
        let pipeline = Pipeline::new().then(failing);
        let err = run_one(&pipeline, &series(vec![1.0]), &series(vec![1.0])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: boom");
    }

    fn constant(value: f64) -> Pipeline {
        Pipeline::new().then(step::named("constant", move |_| Ok(PipelineState::from(value))))
    }

    #[test]
    fn test_run_all_keys_and_order() {
        let registry = PipelineRegistry::new()
            .with("b", constant(2.0))
            .with("a", constant(1.0))
            .with("c", constant(3.0));
        let p = series(vec![0.0]);

        let results = run_all(&registry, &p, &p).unwrap();
        assert_eq!(results.names(), vec!["b", "a", "c"]);
        assert_eq!(results.get("a").and_then(PipelineState::as_number), Some(1.0));

        let parallel = run_all_parallel(&registry, &p, &p).unwrap();
        assert_eq!(parallel, results);

        let map = results.into_map();
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_registry_replaces_same_name() {
        let registry = PipelineRegistry::new()
            .with("x", constant(1.0))
            .with("x", constant(2.0).then(step::value("noop", |v| Ok(v.into()))));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("x").unwrap().step_names(), vec!["constant", "noop"]);
    }

    #[test]
    fn test_run_all_aborts_batch() {
        let failing = Pipeline::new().then(step::named("failing", |_| {
            Err(PvForecastError::InvalidInput("first".to_string()))
        }));
        let also_failing = Pipeline::new().then(step::named("also_failing", |_| {
            Err(PvForecastError::InvalidInput("second".to_string()))
        }));
        let registry = PipelineRegistry::new()
            .with("ok", constant(1.0))
            .with("bad", failing)
            .with("worse", also_failing);
        let p = series(vec![0.0]);

        assert_eq!(run_all(&registry, &p, &p).unwrap_err().to_string(), "Invalid input: first");
        assert_eq!(
            run_all_parallel(&registry, &p, &p).unwrap_err().to_string(),
            "Invalid input: first"
        );

        let isolated = run_all_isolated(&registry, &p, &p);
        assert_eq!(isolated.len(), 3);
        assert!(isolated[0].1.is_ok());
        assert!(isolated[1].1.is_err());
    }
}
