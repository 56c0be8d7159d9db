//! Application constants for the observation processor
//!
//! This module contains default preferences, static lookup tables and the
//! fixed row layout of the station store.

// =============================================================================
// Column Resolution Defaults
// =============================================================================

/// Preferred order of data statistics when a file holds several columns for
/// one variable and the variable specification does not define its own order
pub const PREFER_STATISTICS: &[&str] = &["arithmetic mean", "median"];

/// Statistics that are never accepted as a data column
pub const IGNORE_STATISTICS: &[&str] = &["percentile:15.87", "percentile:84.13"];

/// Wavelength tolerance in nm, e.g. 50 accepts [500, 600] for a 550 nm variable
pub const WAVELENGTH_TOL_NM: f64 = 50.0;

// =============================================================================
// Station Naming
// =============================================================================

/// Historical duplicate site names collapsed onto one merge key
pub const STATION_NAME_ALIASES: &[(&str, &str)] = &[("Birkenes", "Birkenes II")];

/// Resolve a station name through the alias table
pub fn station_alias(name: &str) -> Option<&'static str> {
    STATION_NAME_ALIASES
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
}

// =============================================================================
// Temporal Resolution Codes
// =============================================================================

/// Resolution codes understood by the extractor and their ts_type labels
pub const RESOLUTION_CODES: &[(&str, &str)] = &[("1h", "hourly"), ("1d", "daily"), ("1mo", "monthly")];

// =============================================================================
// File Metadata Keys
// =============================================================================

/// Metadata keys of a parsed file
pub mod file_meta {
    pub const STATION_NAME: &str = "station_name";
    pub const STATION_LATITUDE: &str = "station_latitude";
    pub const STATION_LONGITUDE: &str = "station_longitude";
    pub const STATION_ALTITUDE: &str = "station_altitude";
    pub const MEASUREMENT_HEIGHT: &str = "measurement_height";
    pub const INSTRUMENT_NAME: &str = "instrument_name";
    pub const INSTRUMENT_TYPE: &str = "instrument_type";
    pub const MATRIX: &str = "matrix";
    pub const STATISTICS: &str = "statistics";
    pub const UNIT: &str = "unit";
    pub const RESOLUTION_CODE: &str = "resolution_code";
    pub const DATA_ORIGINATOR: &str = "data_originator";
    pub const REVISION_DATE: &str = "revision_date";
}

/// Column attribute keys of a column definition
pub mod column_attr {
    pub const MATRIX: &str = "matrix";
    pub const STATISTICS: &str = "statistics";
    pub const WAVELENGTH: &str = "wavelength";
    pub const UNIT: &str = "unit";
}

/// Keys of the flattened station metadata map
pub mod station_meta {
    pub const STATION_NAME: &str = "station_name";
    pub const STATION_NAME_ORIG: &str = "station_name_orig";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const ALTITUDE: &str = "altitude";
    pub const MEASUREMENT_HEIGHT: &str = "measurement_height";
    pub const PI: &str = "PI";
    pub const INSTRUMENT_NAME: &str = "instrument_name";
    pub const INSTRUMENT_TYPE: &str = "instrument_type";
    pub const REVISION_DATE: &str = "revision_date";
    pub const FILENAME: &str = "filename";
    pub const DATASET_NAME: &str = "dataset_name";
    pub const TS_TYPE: &str = "ts_type";

    /// Keys compared with a numeric tolerance instead of exact equality
    pub const NUMERIC_KEYS: &[&str] = &[LATITUDE, LONGITUDE, ALTITUDE];

    /// Keys that make up the station identity
    pub const IDENTITY_KEYS: &[&str] = &[STATION_NAME, LATITUDE, LONGITUDE, ALTITUDE];
}

/// Metadata keys ignored when collapsing store metadata on finalize
pub const DEFAULT_VOLATILE_META_KEYS: &[&str] = &["filename", "PI", "revision_date"];

/// Metadata keys ignored when checking merge inputs for conflicts
pub const DEFAULT_MERGE_IGNORE_KEYS: &[&str] =
    &["filename", "PI", "revision_date", "station_name_orig"];

/// Dataset name recorded for ingested files
pub const DEFAULT_DATASET_NAME: &str = "EBASMC";

// =============================================================================
// Station Store Layout
// =============================================================================

/// Fixed row layout of the station store table
pub mod store_layout {
    pub const META_KEY_INDEX: usize = 0;
    pub const TIME_INDEX: usize = 1;
    pub const LAT_INDEX: usize = 2;
    pub const LON_INDEX: usize = 3;
    pub const ALT_INDEX: usize = 4;
    pub const VAR_INDEX: usize = 5;
    pub const DATA_INDEX: usize = 6;

    /// Number of numeric fields per row
    pub const ROW_WIDTH: usize = 7;

    /// Column names used when exporting the table
    pub const COLUMN_NAMES: [&str; ROW_WIDTH] =
        ["meta_key", "time", "latitude", "longitude", "altitude", "var_idx", "value"];
}

/// Default number of rows added per store growth step
pub const DEFAULT_STORE_CHUNK_SIZE: usize = 100_000;

// =============================================================================
// Merge Defaults
// =============================================================================

/// Relative tolerance for station coordinate comparison
pub const DEFAULT_IDENTITY_RTOL: f64 = 1e-2;

/// Absolute tolerance paired with the relative one (numpy isclose default)
pub const IDENTITY_ATOL: f64 = 1e-8;

/// Default canonical vertical grid: lower bound, upper bound and step in m
pub const DEFAULT_VERT_GRID_LOWER_M: f64 = 0.0;
pub const DEFAULT_VERT_GRID_UPPER_M: f64 = 15_000.0;
pub const DEFAULT_VERT_GRID_STEP_M: f64 = 250.0;
