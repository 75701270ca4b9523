//! # pv_forecast
//!
//! Feature engineering and forecast evaluation for photovoltaic power
//! forecasts.
//!
//! - [`fourier`] turns timestamps into six cyclical time-of-day and
//!   time-of-year features for model input.
//! - [`pipeline`] runs named chains of metric steps over prediction and
//!   actual yield series, including [`pipeline::denormalize`] to scale yield
//!   fractions by installed capacity.
//!
//! ## Example
//!
//! ```rust
//! use pv_forecast::prelude::*;
//! use chrono::{TimeZone, Utc};
//!
//! let start = Utc.with_ymd_and_hms(2022, 6, 1, 10, 0, 0).unwrap();
//! let predictions = TimeSeries::from_range(start, Frequency::HALF_HOUR, vec![0.4, 0.6, 0.5]);
//! let actual = TimeSeries::from_range(start, Frequency::HALF_HOUR, vec![0.5, 0.6, 0.3]);
//!
//! let features = fourier::encode(predictions.index()).unwrap();
//! assert_eq!(features.n_cols(), 6);
//!
//! let registry = standard_pipelines(&MetricsConfig::default()).unwrap();
//! let results = run_all(&registry, &predictions, &actual).unwrap();
//! assert_eq!(results.len(), registry.len());
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod fourier;
pub mod pipeline;
pub mod types;

pub mod prelude {
    //! Commonly used types and functions
    pub use crate::config::{standard_pipelines, MetricsConfig};
    pub use crate::data::{FeatureTable, Frequency, GroupKey, TimeSeries};
    pub use crate::error::{PvForecastError, Result};
    pub use crate::fourier;
    pub use crate::pipeline::{
        denormalize, run_all, run_one, Capacity, NamedArgs, Pipeline, PipelineRegistry,
        PipelineState, Step, Value,
    };
    pub use crate::types::Timestamp;
}
