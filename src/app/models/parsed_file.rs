//! Parsed observation file contract
//!
//! A [`ParsedFile`] is what a format-specific reader hands over: column
//! definitions, a row-major data matrix, file-level metadata and one time
//! stamp per row. Text parsing itself happens outside this crate.

use crate::constants::column_attr;
use crate::error::{ObsError, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Definition of one data column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Position of the column in the data matrix
    pub index: usize,

    /// Component name (e.g. "aerosol_light_scattering_coefficient")
    pub name: String,

    /// Column attributes such as matrix, statistics, wavelength or unit
    pub attributes: BTreeMap<String, String>,
}

impl ColumnDef {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn matrix(&self) -> Option<&str> {
        self.attr(column_attr::MATRIX)
    }

    pub fn statistics(&self) -> Option<&str> {
        self.attr(column_attr::STATISTICS)
    }

    pub fn unit(&self) -> Option<&str> {
        self.attr(column_attr::UNIT)
    }

    pub fn has_wavelength(&self) -> bool {
        self.attributes.contains_key(column_attr::WAVELENGTH)
    }

    /// Wavelength in nm, if the column declares a parsable one
    pub fn wavelength_nm(&self) -> Option<f64> {
        self.attr(column_attr::WAVELENGTH)
            .and_then(parse_wavelength_nm)
    }
}

fn wavelength_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([-+]?\d+(?:\.\d*)?(?:[eE][-+]?\d+)?)\s*(nm|um|µm)?\s*$").ok()
    })
    .as_ref()
}

/// Parse a wavelength attribute such as "550 nm", "0.55 um" or "550" into nm
pub fn parse_wavelength_nm(raw: &str) -> Option<f64> {
    let caps = wavelength_regex()?.captures(raw)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    match caps.get(2).map(|m| m.as_str()) {
        Some("um") | Some("µm") => Some(value * 1000.0),
        _ => Some(value),
    }
}

fn leading_number_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([-+]?\d+(?:\.\d*)?(?:[eE][-+]?\d+)?)").ok())
        .as_ref()
}

/// Parse the leading number of a metadata value such as "300 m" or "58.38"
pub fn parse_leading_number(raw: &str) -> Option<f64> {
    leading_number_regex()?
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// One observation file as produced by a format-specific reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedFile {
    /// Source filename, kept for provenance and error reporting
    pub filename: String,

    /// Matrix applying to columns that do not declare their own
    pub default_matrix: Option<String>,

    /// Column definitions in matrix order
    pub columns: Vec<ColumnDef>,

    /// Data matrix: one row per time stamp, one entry per column
    pub data: Vec<Vec<f64>>,

    /// File-level metadata (station identity, instrument, defaults, ...)
    pub meta: BTreeMap<String, String>,

    /// Time stamp of each data row
    pub times: Vec<DateTime<Utc>>,
}

impl ParsedFile {
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    pub fn num_rows(&self) -> usize {
        self.data.len()
    }

    /// Check that matrix, column list and time vector agree in shape
    pub fn validate(&self) -> Result<()> {
        if self.data.len() != self.times.len() {
            return Err(ObsError::file_format(
                &self.filename,
                format!(
                    "data matrix has {} rows but {} time stamps",
                    self.data.len(),
                    self.times.len()
                ),
            ));
        }
        for (position, column) in self.columns.iter().enumerate() {
            if column.index != position {
                return Err(ObsError::file_format(
                    &self.filename,
                    format!(
                        "column '{}' at position {} declares index {}",
                        column.name, position, column.index
                    ),
                ));
            }
        }
        if let Some((row, values)) = self
            .data
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != self.columns.len())
        {
            return Err(ObsError::file_format(
                &self.filename,
                format!(
                    "row {} has {} values but {} columns are defined",
                    row,
                    values.len(),
                    self.columns.len()
                ),
            ));
        }
        Ok(())
    }

    /// Values of one column across all rows
    pub fn column_values(&self, col: usize) -> Vec<f64> {
        self.data
            .iter()
            .map(|row| row.get(col).copied().unwrap_or(f64::NAN))
            .collect()
    }

    /// Number of missing samples in one column
    pub fn nan_count(&self, col: usize) -> usize {
        self.data
            .iter()
            .filter(|row| row.get(col).is_none_or(|v| v.is_nan()))
            .count()
    }

    /// Matrix of a column: its own attribute, else the file default
    pub fn effective_matrix(&self, col: &ColumnDef) -> Option<String> {
        col.matrix()
            .map(str::to_string)
            .or_else(|| self.default_matrix.clone())
            .or_else(|| self.meta(column_attr::MATRIX).map(str::to_string))
    }

    /// Statistic of a column: its own attribute, else the file metadata
    pub fn effective_statistics(&self, col: &ColumnDef) -> Option<String> {
        col.statistics()
            .or_else(|| self.meta(column_attr::STATISTICS))
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wavelength_units() {
        assert_eq!(parse_wavelength_nm("550 nm"), Some(550.0));
        assert_eq!(parse_wavelength_nm("550.0nm"), Some(550.0));
        assert_eq!(parse_wavelength_nm("0.55 um"), Some(550.0));
        assert_eq!(parse_wavelength_nm("550"), Some(550.0));
        assert_eq!(parse_wavelength_nm("green"), None);
    }

    #[test]
    fn test_parse_leading_number() {
        assert_eq!(parse_leading_number("300 m"), Some(300.0));
        assert_eq!(parse_leading_number("-12.5"), Some(-12.5));
        assert_eq!(parse_leading_number("m 300"), None);
    }

    #[test]
    fn test_validate_detects_ragged_rows() {
        let file = ParsedFile {
            filename: "ragged.nas".to_string(),
            default_matrix: None,
            columns: vec![ColumnDef::new(0, "a"), ColumnDef::new(1, "b")],
            data: vec![vec![1.0, 2.0], vec![3.0]],
            meta: BTreeMap::new(),
            times: vec![Utc::now(), Utc::now()],
        };
        assert!(matches!(
            file.validate(),
            Err(ObsError::FileFormat { .. })
        ));
    }
}
