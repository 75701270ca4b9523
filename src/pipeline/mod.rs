//! Metrics pipelines
//!
//! A pipeline is an ordered list of [`Step`]s folded over a
//! [`PipelineState`]. The fold starts from the named bag
//! `{predictions, actual}`; after that each step's return variant picks the
//! calling convention of the next step:
//!
//! ```text
//! NamedArgs  -> Step::call_named
//! Positional -> Step::call_positional
//! Value      -> Step::call_value
//! ```
//!
//! ```rust
//! use pv_forecast::pipeline::{run_one, Elementwise, Mean, Pipeline, Subtract, ToPositional};
//! # use pv_forecast::data::{Frequency, TimeSeries};
//! # use chrono::{TimeZone, Utc};
//! # let start = Utc.with_ymd_and_hms(2022, 6, 1, 12, 0, 0).unwrap();
//! # let predictions = TimeSeries::from_range(start, Frequency::HALF_HOUR, vec![0.5, 0.7]);
//! # let actual = TimeSeries::from_range(start, Frequency::HALF_HOUR, vec![0.4, 0.9]);
//! let mae = Pipeline::new()
//!     .then(ToPositional) // bag -> (predictions, actual)
//!     .then(Subtract) // pair -> series
//!     .then(Elementwise::abs()) // series -> series
//!     .then(Mean); // series -> number
//!
//! let result = run_one(&mae, &predictions, &actual).unwrap();
//! assert!((result.as_number().unwrap() - 0.15).abs() < 1e-12);
//! ```

pub mod denormalize;
pub mod engine;
pub mod night;
pub mod state;
pub mod step;
pub mod steps;

pub use denormalize::{denormalize, Capacity, Denormalize};
pub use engine::{
    dispatch, run_all, run_all_isolated, run_all_parallel, run_one, Pipeline, PipelineRegistry,
    PipelineResults,
};
pub use night::{solar_elevation, IgnoreNight};
pub use state::{NamedArgs, PipelineState, Value, ACTUAL, PREDICTIONS};
pub use step::Step;
pub use steps::{AbsoluteError, Elementwise, GroupBy, Mean, Subtract, ToPositional};
