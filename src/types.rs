//! Core types

use chrono::{DateTime, Utc};

/// Timestamp type used throughout the library (always UTC)
pub type Timestamp = DateTime<Utc>;

/// Format used for timestamps in CSV output
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
