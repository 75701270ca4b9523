//! Time series containers: series, tables, grouping and sampling frequency

pub mod frequency;
pub mod group;
pub mod series;
pub mod table;

pub use frequency::{Frequency, FrequencyConverter};
pub use group::{GroupKey, Grouped};
pub use series::TimeSeries;
pub use table::{Column, FeatureTable};
