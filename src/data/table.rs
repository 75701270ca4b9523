//! Timestamp-indexed table of named numeric columns

use crate::data::frequency::Frequency;
use crate::data::series::TimeSeries;
use crate::error::{PvForecastError, Result};
use crate::types::{Timestamp, TIMESTAMP_FORMAT};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// A named column of a [`FeatureTable`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// An ordered timestamp index with ordered, equal-length named columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableRecord")]
pub struct FeatureTable {
    index: Vec<Timestamp>,
    columns: Vec<Column>,
    freq: Option<Frequency>,
}

#[derive(Deserialize)]
struct TableRecord {
    index: Vec<Timestamp>,
    columns: Vec<Column>,
    #[serde(default)]
    freq: Option<Frequency>,
}

impl TryFrom<TableRecord> for FeatureTable {
    type Error = PvForecastError;

    fn try_from(record: TableRecord) -> Result<Self> {
        if let Some(freq) = record.freq {
            if !freq.conforms(&record.index) {
                return Err(PvForecastError::InvalidFrequency(format!(
                    "index does not conform to frequency {}",
                    freq
                )));
            }
        }
        let table = record
            .columns
            .into_iter()
            .try_fold(FeatureTable::new(record.index), |table, column| {
                table.with_column(column.name, column.values)
            })?;
        Ok(table.with_frequency(record.freq))
    }
}

impl FeatureTable {
    /// Create a table with an index and no columns
    pub fn new(index: Vec<Timestamp>) -> Self {
        Self {
            index,
            columns: Vec::new(),
            freq: None,
        }
    }

    /// Append a column; the name must be new and the length must match the index
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if values.len() != self.index.len() {
            return Err(PvForecastError::LengthMismatch {
                left: self.index.len(),
                right: values.len(),
            });
        }
        if self.columns.iter().any(|c| c.name == name) {
            return Err(PvForecastError::InvalidInput(format!(
                "duplicate column '{}'",
                name
            )));
        }
        self.columns.push(Column { name, values });
        Ok(self)
    }

    pub(crate) fn with_frequency(mut self, freq: Option<Frequency>) -> Self {
        self.freq = freq;
        self
    }

    pub fn index(&self) -> &[Timestamp] {
        &self.index
    }

    pub fn frequency(&self) -> Option<Frequency> {
        self.freq
    }

    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Values of row `i` in column order
    pub fn row(&self, i: usize) -> Option<Vec<f64>> {
        if i >= self.n_rows() {
            return None;
        }
        Some(self.columns.iter().map(|c| c.values[i]).collect())
    }

    /// Extract one column as a series sharing the table's index
    pub fn to_series(&self, name: &str) -> Option<TimeSeries> {
        let values = self.column(name)?.to_vec();
        let series = TimeSeries::new(self.index.clone(), values).ok()?;
        match self.freq {
            Some(freq) => series.with_frequency(freq).ok(),
            None => Some(series),
        }
    }

    /// Write as CSV: an unnamed index column followed by every column,
    /// values printed with `precision` decimals
    pub fn write_csv<W: io::Write>(&self, writer: W, precision: usize) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);

        let mut header = vec![String::new()];
        header.extend(self.columns.iter().map(|c| c.name.clone()));
        writer.write_record(&header)?;

        for (i, t) in self.index.iter().enumerate() {
            let mut record = Vec::with_capacity(self.columns.len() + 1);
            record.push(t.format(TIMESTAMP_FORMAT).to_string());
            record.extend(
                self.columns
                    .iter()
                    .map(|c| format!("{:.*}", precision, c.values[i])),
            );
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Write as CSV to a file
    pub fn write_csv_path(&self, path: &Path, precision: usize) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv(io::BufWriter::new(file), precision)
    }
}
