//! Data models for station observation processing
//!
//! This module contains the core data structures passed between the column
//! resolver, station extractor, station store and merge engine: the parsed
//! file contract, variable specifications, and the station record with its
//! identity, provenance and per-variable series.

pub mod meta;
pub mod parsed_file;
pub mod time;
pub mod variables;

pub use meta::{MetaMap, MetaValue};
pub use parsed_file::{ColumnDef, ParsedFile};
pub use time::{TimeSeries, TsType};
pub use variables::{VariableColumnSpec, VariableRegistry};

use crate::constants::station_meta;
use crate::error::{ObsError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Station Identity
// =============================================================================

/// The (name, latitude, longitude, altitude) tuple identifying one site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationIdentity {
    /// Station name after alias resolution (the merge key)
    pub station_name: String,

    /// Latitude in decimal degrees
    pub latitude: f64,

    /// Longitude in decimal degrees
    pub longitude: f64,

    /// Altitude of the measurement above sea level in m, inlet height included
    pub altitude: f64,

    /// Height of the inlet above the station, in m
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_height: Option<f64>,
}

impl StationIdentity {
    pub fn new(station_name: impl Into<String>, latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            station_name: station_name.into(),
            latitude,
            longitude,
            altitude,
            measurement_height: None,
        }
    }

    /// Verify that `other` describes the same physical site
    pub fn check_same_site(&self, other: &StationIdentity, rtol: f64) -> Result<()> {
        if self.station_name != other.station_name {
            return Err(ObsError::identity(format!(
                "station name '{}' differs from '{}'",
                other.station_name, self.station_name
            )));
        }
        let coords = [
            (station_meta::LATITUDE, self.latitude, other.latitude),
            (station_meta::LONGITUDE, self.longitude, other.longitude),
            (station_meta::ALTITUDE, self.altitude, other.altitude),
        ];
        for (field, mine, theirs) in coords {
            if !meta::is_close(theirs, mine, rtol) {
                return Err(ObsError::identity(format!(
                    "{} of station '{}' differs: {} vs {}",
                    field, self.station_name, theirs, mine
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Provenance
// =============================================================================

/// Where a station record came from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub dataset_name: String,

    /// Data originator (principal investigator)
    pub originator: Option<String>,

    pub instrument_name: Option<String>,
    pub instrument_type: Option<String>,
    pub revision_date: Option<String>,

    /// Source filename
    pub filename: Option<String>,

    /// Station name before alias resolution, if an alias applied
    pub station_name_orig: Option<String>,

    pub ts_type: Option<TsType>,

    /// Further file attributes without a fixed slot
    pub attributes: BTreeMap<String, MetaValue>,
}

// =============================================================================
// Per-variable Information and Series
// =============================================================================

/// Column information attached to one variable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VarInfo {
    pub unit: Option<String>,
    pub matrix: Option<String>,
    pub statistics: Option<String>,
    pub wavelength_nm: Option<f64>,
}

/// Shape of a variable's data, as tracked by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesKind {
    Flat,
    Profile,
    Grid,
}

/// Values of one variable within a station record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Series {
    /// One value per record time stamp
    Flat {
        values: Vec<f64>,
        errors: Option<Vec<f64>>,
    },
    /// One vertical profile at the record's single time stamp
    Profile {
        altitudes: Vec<f64>,
        values: Vec<f64>,
        errors: Option<Vec<f64>>,
    },
    /// Profiles on a fixed vertical grid, indexed `[level][time]`
    Grid {
        altitudes: Vec<f64>,
        values: Vec<Vec<f64>>,
        errors: Option<Vec<Vec<f64>>>,
    },
}

impl Series {
    pub fn flat(values: Vec<f64>) -> Self {
        Series::Flat {
            values,
            errors: None,
        }
    }

    pub fn profile(altitudes: Vec<f64>, values: Vec<f64>) -> Self {
        Series::Profile {
            altitudes,
            values,
            errors: None,
        }
    }

    pub fn kind(&self) -> SeriesKind {
        match self {
            Series::Flat { .. } => SeriesKind::Flat,
            Series::Profile { .. } => SeriesKind::Profile,
            Series::Grid { .. } => SeriesKind::Grid,
        }
    }

    /// Altitude-resolved data (profile or grid)
    pub fn is_vertical(&self) -> bool {
        !matches!(self, Series::Flat { .. })
    }

    pub fn has_errors(&self) -> bool {
        match self {
            Series::Flat { errors, .. } | Series::Profile { errors, .. } => errors.is_some(),
            Series::Grid { errors, .. } => errors.is_some(),
        }
    }

    /// Number of non-missing samples
    pub fn count_valid(&self) -> usize {
        match self {
            Series::Flat { values, .. } | Series::Profile { values, .. } => {
                values.iter().filter(|v| !v.is_nan()).count()
            }
            Series::Grid { values, .. } => values
                .iter()
                .flat_map(|level| level.iter())
                .filter(|v| !v.is_nan())
                .count(),
        }
    }
}

/// Flatten identity, provenance and free attributes into one metadata map
pub fn flatten_meta(id: &StationIdentity, prov: &Provenance) -> MetaMap {
    let mut map = MetaMap::new();
    for (key, value) in &prov.attributes {
        map.insert(key.clone(), value.clone());
    }

    map.insert(station_meta::STATION_NAME.into(), id.station_name.clone().into());
    map.insert(station_meta::LATITUDE.into(), id.latitude.into());
    map.insert(station_meta::LONGITUDE.into(), id.longitude.into());
    map.insert(station_meta::ALTITUDE.into(), id.altitude.into());
    if let Some(height) = id.measurement_height {
        map.insert(station_meta::MEASUREMENT_HEIGHT.into(), height.into());
    }

    map.insert(station_meta::DATASET_NAME.into(), prov.dataset_name.clone().into());
    let optional = [
        (station_meta::PI, &prov.originator),
        (station_meta::INSTRUMENT_NAME, &prov.instrument_name),
        (station_meta::INSTRUMENT_TYPE, &prov.instrument_type),
        (station_meta::REVISION_DATE, &prov.revision_date),
        (station_meta::FILENAME, &prov.filename),
        (station_meta::STATION_NAME_ORIG, &prov.station_name_orig),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            map.insert(key.to_string(), value.clone().into());
        }
    }
    if let Some(ts_type) = prov.ts_type {
        map.insert(station_meta::TS_TYPE.into(), ts_type.as_str().into());
    }
    map
}

// =============================================================================
// Station Record
// =============================================================================

/// All data read for one station from one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub identity: StationIdentity,
    pub provenance: Provenance,

    /// Time axis shared by every variable
    pub times: Vec<DateTime<Utc>>,

    /// Series per variable
    pub data: BTreeMap<String, Series>,

    /// Column information per variable
    pub var_info: BTreeMap<String, VarInfo>,

    /// Variables present, in insertion order
    pub contains_vars: Vec<String>,
}

impl StationRecord {
    pub fn new(identity: StationIdentity, provenance: Provenance, times: Vec<DateTime<Utc>>) -> Self {
        Self {
            identity,
            provenance,
            times,
            data: BTreeMap::new(),
            var_info: BTreeMap::new(),
            contains_vars: Vec::new(),
        }
    }

    /// Add or replace the series of one variable
    pub fn insert_series(&mut self, var_name: impl Into<String>, series: Series, info: VarInfo) {
        let var_name = var_name.into();
        if !self.contains_vars.contains(&var_name) {
            self.contains_vars.push(var_name.clone());
        }
        self.var_info.insert(var_name.clone(), info);
        self.data.insert(var_name, series);
    }

    pub fn has_var(&self, var_name: &str) -> bool {
        self.data.contains_key(var_name)
    }

    pub fn series(&self, var_name: &str) -> Option<&Series> {
        self.data.get(var_name)
    }

    pub fn station_name(&self) -> &str {
        &self.identity.station_name
    }

    /// Check that every series fits the record's time axis
    pub fn validate_shapes(&self) -> Result<()> {
        let file = self.provenance.filename.clone().unwrap_or_default();
        for (var, series) in &self.data {
            let ok = match series {
                Series::Flat { values, errors } => {
                    values.len() == self.times.len()
                        && errors.as_ref().is_none_or(|e| e.len() == values.len())
                }
                Series::Profile {
                    altitudes,
                    values,
                    errors,
                } => {
                    self.times.len() == 1
                        && altitudes.len() == values.len()
                        && errors.as_ref().is_none_or(|e| e.len() == values.len())
                }
                Series::Grid {
                    altitudes,
                    values,
                    errors,
                } => {
                    values.len() == altitudes.len()
                        && values.iter().all(|level| level.len() == self.times.len())
                        && errors.as_ref().is_none_or(|e| e.len() == values.len())
                }
            };
            if !ok {
                return Err(ObsError::file_format(
                    file,
                    format!("series of variable {} does not match the time axis", var),
                ));
            }
        }
        Ok(())
    }

    /// Flattened metadata: identity, provenance and free attributes
    pub fn meta_map(&self) -> MetaMap {
        flatten_meta(&self.identity, &self.provenance)
    }

    /// Look up one flattened metadata value
    pub fn get_meta(&self, key: &str) -> Option<MetaValue> {
        self.meta_map().remove(key)
    }

    /// Non-missing samples of a flat variable as a time series
    pub fn time_series(&self, var_name: &str) -> Option<TimeSeries> {
        match self.data.get(var_name)? {
            Series::Flat { values, .. } => {
                let mut ts = TimeSeries::new();
                for (t, v) in self.times.iter().zip(values) {
                    if !v.is_nan() {
                        ts.push(*t, *v);
                    }
                }
                Some(ts)
            }
            _ => None,
        }
    }
}
