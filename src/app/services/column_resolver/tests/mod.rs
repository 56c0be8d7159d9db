//! Tests for column resolution
//!
//! Fixtures build small parsed files with hand-written column definitions.

pub mod resolver_tests;

use crate::app::models::{ColumnDef, ParsedFile};
use chrono::{Duration, TimeZone, Utc};
use std::collections::BTreeMap;

pub const SCATTERING: &str = "aerosol_light_scattering_coefficient";

/// Create a parsed file with one daily row per entry of `data`
pub fn create_test_file(columns: Vec<ColumnDef>, data: Vec<Vec<f64>>) -> ParsedFile {
    let start = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
    let times = (0..data.len())
        .map(|i| start + Duration::days(i as i64))
        .collect();
    ParsedFile {
        filename: "test.nas".to_string(),
        default_matrix: Some("pm10".to_string()),
        columns,
        data,
        meta: BTreeMap::new(),
        times,
    }
}

/// Create a scattering column at the given wavelength attribute
pub fn scattering_column(index: usize, wavelength: &str) -> ColumnDef {
    ColumnDef::new(index, SCATTERING)
        .with_attr("wavelength", wavelength)
        .with_attr("statistics", "arithmetic mean")
}

/// Rows of constant values, one column per entry of `columns`
pub fn constant_rows(columns: &[f64], rows: usize) -> Vec<Vec<f64>> {
    (0..rows).map(|_| columns.to_vec()).collect()
}
