//! Error creation and message formatting
//!
//! Each error is produced through the public API where possible so the
//! message reflects what a caller actually sees.

use chrono::{TimeZone, Utc};
use pv_forecast::config::MetricsConfig;
use pv_forecast::data::{Frequency, TimeSeries};
use pv_forecast::error::PvForecastError;
use pv_forecast::fourier;
use pv_forecast::pipeline::{
    denormalize, run_one, Capacity, Mean, Pipeline, Subtract, ToPositional,
};

fn series(freq: Frequency, values: Vec<f64>) -> TimeSeries {
    let start = Utc.with_ymd_and_hms(2022, 3, 1, 0, 0, 0).unwrap();
    TimeSeries::from_range(start, freq, values)
}

#[cfg(test)]
mod pipeline_errors {
    use super::*;

    // ========== Calling convention ==========

    #[test]
    fn test_unsupported_convention_names_step_and_shape() {
        let p = series(Frequency::HOURLY, vec![0.1, 0.2]);
        let err = run_one(&Pipeline::new().then(Subtract), &p, &p).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("Step 'subtract'"));
        assert!(msg.contains("named arguments [predictions, actual]"));
    }

    #[test]
    fn test_wrong_arity() {
        let p = series(Frequency::HOURLY, vec![0.1]);
        let pipeline = Pipeline::new().then(ToPositional).then(Mean);
        let err = run_one(&pipeline, &p, &p).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Step 'mean' expected a supported calling convention, got 2 positional arguments"
        );
    }

    #[test]
    fn test_argument_mismatch_helper() {
        let err = PvForecastError::argument_mismatch("clip", "series", "number");
        assert_eq!(err.to_string(), "Step 'clip' expected series, got number");
    }

    // ========== Series alignment ==========

    #[test]
    fn test_subtract_misaligned_series() {
        let p = series(Frequency::HOURLY, vec![0.1, 0.2]);
        let a = series(Frequency::HALF_HOUR, vec![0.1, 0.2]);
        let pipeline = Pipeline::new().then(ToPositional).then(Subtract);
        let err = run_one(&pipeline, &p, &a).unwrap_err();

        assert!(matches!(err, PvForecastError::IndexMismatch(_)));
        assert!(err.to_string().starts_with("Index mismatch"));
    }

    #[test]
    fn test_length_mismatch_message() {
        let index = vec![Utc.with_ymd_and_hms(2022, 3, 1, 0, 0, 0).unwrap()];
        let err = TimeSeries::new(index, vec![1.0, 2.0]).unwrap_err();
        assert_eq!(err.to_string(), "Length mismatch: 1 vs 2");
    }
}

#[cfg(test)]
mod resample_errors {
    use super::*;

    #[test]
    fn test_undefined_capacity_frequency() {
        let p = series(Frequency::HOURLY, vec![0.5; 3]);
        let start = Utc.with_ymd_and_hms(2022, 3, 1, 0, 0, 0).unwrap();
        let capacity = TimeSeries::new(vec![start], vec![10.0]).unwrap();

        let err = denormalize(&p, &p, &Capacity::Series(capacity)).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Resample error"));
        assert!(msg.contains("undefined"));
        assert!(msg.contains("1h"));
    }

    #[test]
    fn test_bad_frequency_strings() {
        for bad in ["", "0h", "fortnight", "h30", "999999999999999999d", "10000000000000000s"] {
            let err = bad.parse::<Frequency>().unwrap_err();
            assert!(
                matches!(err, PvForecastError::InvalidFrequency(_)),
                "{:?} gave {}",
                bad,
                err
            );
        }
    }
}

#[cfg(test)]
mod deserialize_errors {
    use super::*;
    use pv_forecast::data::FeatureTable;

    #[test]
    fn test_series_with_out_of_range_frequency() {
        let json = r#"{"index":["2022-03-01T00:00:00Z"],"values":[1.0],"freq":"10000000000000000s"}"#;
        let err = serde_json::from_str::<TimeSeries>(json).unwrap_err();
        assert!(err.to_string().contains("Invalid frequency"));
    }

    #[test]
    fn test_table_with_short_column() {
        let json = r#"{"index":["2022-03-01T00:00:00Z","2022-03-01T01:00:00Z"],"columns":[{"name":"day_sin","values":[0.0]}]}"#;
        let err = serde_json::from_str::<FeatureTable>(json).unwrap_err();
        assert!(err.to_string().contains("Length mismatch: 2 vs 1"));
    }
}

#[cfg(test)]
mod input_errors {
    use super::*;

    #[test]
    fn test_encode_empty() {
        let err = fourier::encode(&[]).unwrap_err();
        assert!(err.to_string().starts_with("Invalid input"));
    }

    #[test]
    fn test_encode_unparseable_timestamp_reports_position() {
        let err = fourier::encode_strs(&["2020-01-01 00:00:00", "yesterday"]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("position 1"));
        assert!(msg.contains("yesterday"));
    }

    #[test]
    fn test_config_errors() {
        let err = MetricsConfig::from_json_str(r#"{"longitude": 200.0}"#).unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
        assert!(err.to_string().contains("longitude 200"));

        let err = MetricsConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, PvForecastError::SerdeError(_)));
    }
}
