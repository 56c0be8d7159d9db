//! Tests for batch reading
//!
//! An in-memory [`FileReader`] stands in for a format-specific parser.


use crate::app::models::{ColumnDef, ParsedFile, VariableColumnSpec, VariableRegistry};
use crate::error::{ObsError, Result};
use crate::processor::FileReader;
use chrono::{Duration, TimeZone, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const OZONE: &str = "ozone";

/// Parsed files keyed by path; unknown paths are format errors
#[derive(Debug, Default)]
pub struct MemoryReader {
    pub files: BTreeMap<PathBuf, ParsedFile>,
}

impl MemoryReader {
    pub fn with_file(mut self, path: &str, file: ParsedFile) -> Self {
        self.files.insert(PathBuf::from(path), file);
        self
    }
}

impl FileReader for MemoryReader {
    fn read_file(&self, path: &Path) -> Result<ParsedFile> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ObsError::file_format(path.display().to_string(), "unreadable file"))
    }
}

/// Create an ozone file for one station with `hours` hourly samples
pub fn ozone_file(station: &str, filename: &str, hours: usize) -> ParsedFile {
    let start = Utc.with_ymd_and_hms(2021, 7, 1, 0, 0, 0).unwrap();
    let meta = [
        ("station_name", station),
        ("station_latitude", "51.53"),
        ("station_longitude", "12.93"),
        ("station_altitude", "87 m"),
        ("unit", "ug/m3"),
        ("resolution_code", "1h"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    ParsedFile {
        filename: filename.to_string(),
        default_matrix: Some("air".to_string()),
        columns: vec![ColumnDef::new(0, OZONE)],
        data: (0..hours).map(|i| vec![40.0 + i as f64]).collect(),
        meta,
        times: (0..hours)
            .map(|i| start + Duration::hours(i as i64))
            .collect(),
    }
}

pub fn ozone_registry() -> VariableRegistry {
    VariableRegistry::from_specs(vec![
        VariableColumnSpec::new("conco3", &[OZONE]),
        VariableColumnSpec::new("concno2", &["nitrogen_dioxide"]),
    ])
    .unwrap()
}
