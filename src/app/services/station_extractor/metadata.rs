//! Station identity and provenance from file metadata

use crate::app::models::parsed_file::parse_leading_number;
use crate::app::models::{MetaValue, ParsedFile, Provenance, StationIdentity, TsType};
use crate::constants::{file_meta, station_alias};
use crate::error::{ObsError, Result};
use tracing::{debug, info};

/// File metadata keys with a fixed slot in the station record
const KNOWN_FILE_KEYS: &[&str] = &[
    file_meta::STATION_NAME,
    file_meta::STATION_LATITUDE,
    file_meta::STATION_LONGITUDE,
    file_meta::STATION_ALTITUDE,
    file_meta::MEASUREMENT_HEIGHT,
    file_meta::INSTRUMENT_NAME,
    file_meta::INSTRUMENT_TYPE,
    file_meta::MATRIX,
    file_meta::STATISTICS,
    file_meta::UNIT,
    file_meta::RESOLUTION_CODE,
    file_meta::DATA_ORIGINATOR,
    file_meta::REVISION_DATE,
];

fn required_number(file: &ParsedFile, key: &str) -> Result<f64> {
    let raw = file
        .meta(key)
        .ok_or_else(|| ObsError::file_format(&file.filename, format!("missing metadata {}", key)))?;
    parse_leading_number(raw).ok_or_else(|| {
        ObsError::file_format(
            &file.filename,
            format!("metadata {} is not numeric: '{}'", key, raw),
        )
    })
}

/// Station identity with the alias table applied to the name.
///
/// Also returns the original name when an alias replaced it. The identity
/// altitude already includes the measurement height.
pub fn station_identity_from_file(file: &ParsedFile) -> Result<(StationIdentity, Option<String>)> {
    let raw_name = file
        .meta(file_meta::STATION_NAME)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ObsError::file_format(&file.filename, "missing station name"))?;

    let latitude = required_number(file, file_meta::STATION_LATITUDE)?;
    let longitude = required_number(file, file_meta::STATION_LONGITUDE)?;
    let station_altitude = required_number(file, file_meta::STATION_ALTITUDE)?;
    let measurement_height = match file.meta(file_meta::MEASUREMENT_HEIGHT) {
        Some(raw) => Some(parse_leading_number(raw).ok_or_else(|| {
            ObsError::file_format(
                &file.filename,
                format!("measurement height is not numeric: '{}'", raw),
            )
        })?),
        None => None,
    };

    let (station_name, original) = match station_alias(raw_name) {
        Some(alias) => {
            debug!("Station name {} mapped to {}", raw_name, alias);
            (alias.to_string(), Some(raw_name.to_string()))
        }
        None => (raw_name.to_string(), None),
    };

    let identity = StationIdentity {
        station_name,
        latitude,
        longitude,
        altitude: station_altitude + measurement_height.unwrap_or(0.0),
        measurement_height,
    };
    Ok((identity, original))
}

/// Provenance of a file; unknown resolution codes leave `ts_type` unset
pub fn provenance_from_file(
    file: &ParsedFile,
    dataset_name: &str,
    station_name_orig: Option<String>,
) -> Provenance {
    let text = |key: &str| file.meta(key).map(str::to_string);

    let ts_type = file.meta(file_meta::RESOLUTION_CODE).and_then(|code| {
        let ts_type = TsType::from_resolution_code(code);
        if ts_type.is_none() {
            info!(
                "Unknown resolution code '{}' in {}, ts_type left undefined",
                code, file.filename
            );
        }
        ts_type
    });

    let attributes = file
        .meta
        .iter()
        .filter(|(key, _)| !KNOWN_FILE_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), MetaValue::Text(value.clone())))
        .collect();

    Provenance {
        dataset_name: dataset_name.to_string(),
        originator: text(file_meta::DATA_ORIGINATOR),
        instrument_name: text(file_meta::INSTRUMENT_NAME),
        instrument_type: text(file_meta::INSTRUMENT_TYPE),
        revision_date: text(file_meta::REVISION_DATE),
        filename: Some(file.filename.clone()),
        station_name_orig,
        ts_type,
        attributes,
    }
}
