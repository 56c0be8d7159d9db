//! Tests for station record extraction


use crate::app::models::{ColumnDef, ParsedFile, VariableColumnSpec, VariableRegistry};
use crate::app::services::column_resolver::ColumnResolver;
use crate::app::services::station_extractor::StationExtractor;
use crate::config::ResolverConfig;
use chrono::{Duration, TimeZone, Utc};
use std::collections::BTreeMap;

pub const SCATTERING: &str = "aerosol_light_scattering_coefficient";
pub const ABSORPTION: &str = "aerosol_absorption_coefficient";

/// File metadata of a complete station header
pub fn station_meta(name: &str) -> BTreeMap<String, String> {
    [
        ("station_name", name),
        ("station_latitude", "58.38853"),
        ("station_longitude", "8.252"),
        ("station_altitude", "219.0 m"),
        ("instrument_name", "TSI_3563_BIR_dry"),
        ("data_originator", "Doe, Jane"),
        ("unit", "1/Mm"),
        ("resolution_code", "1h"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Create a file with a scattering and an absorption column
pub fn create_station_file(name: &str, data: Vec<Vec<f64>>) -> ParsedFile {
    let start = Utc.with_ymd_and_hms(2019, 6, 1, 0, 0, 0).unwrap();
    ParsedFile {
        filename: format!("{}.nas", name.to_lowercase().replace(' ', "_")),
        default_matrix: Some("pm10".to_string()),
        columns: vec![
            ColumnDef::new(0, SCATTERING)
                .with_attr("wavelength", "550 nm")
                .with_attr("statistics", "arithmetic mean"),
            ColumnDef::new(1, ABSORPTION)
                .with_attr("wavelength", "520 nm")
                .with_attr("unit", "1/Mm")
                .with_attr("matrix", "pm1"),
        ],
        times: (0..data.len())
            .map(|i| start + Duration::hours(i as i64))
            .collect(),
        data,
        meta: station_meta(name),
    }
}

/// Registry with the two optical variables used in the fixtures
pub fn create_registry() -> VariableRegistry {
    VariableRegistry::from_specs(vec![
        VariableColumnSpec::new("scatc550aer", &[SCATTERING]).with_wavelength(550.0),
        VariableColumnSpec::new("absc550aer", &[ABSORPTION]).with_wavelength(550.0),
        VariableColumnSpec::new("conco3", &["ozone"]),
    ])
    .unwrap()
}

pub fn create_extractor() -> StationExtractor {
    StationExtractor::new(ColumnResolver::new(ResolverConfig::default()), "EBASMC")
}
