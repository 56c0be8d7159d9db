//! Tests for the station store
//!
//! Records are built directly rather than through the extractor so that
//! row counts and variable order are fully controlled.

pub mod registry_tests;

use crate::app::models::{Provenance, Series, StationIdentity, StationRecord, VarInfo};
use crate::app::services::station_store::StationStore;
use crate::config::StoreConfig;
use chrono::{DateTime, Duration, TimeZone, Utc};

pub fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

/// Create a record with flat series for the given variables
pub fn create_test_record(
    station: &str,
    filename: &str,
    num_times: usize,
    vars: &[&str],
) -> StationRecord {
    let identity = StationIdentity::new(station, 47.8, 11.0, 985.0);
    let provenance = Provenance {
        dataset_name: "EBASMC".to_string(),
        originator: Some("Doe, Jane".to_string()),
        filename: Some(filename.to_string()),
        ..Default::default()
    };
    let times = (0..num_times as i64).map(day).collect();
    let mut record = StationRecord::new(identity, provenance, times);
    for (offset, var) in vars.iter().enumerate() {
        let values = (0..num_times).map(|i| (offset * 100 + i) as f64).collect();
        record.insert_series(
            *var,
            Series::flat(values),
            VarInfo {
                unit: Some("1/Mm".to_string()),
                ..Default::default()
            },
        );
    }
    record
}

/// Create a record holding one profile at a single time stamp
pub fn create_profile_record(station: &str, time: DateTime<Utc>, altitudes: &[f64], values: &[f64]) -> StationRecord {
    let identity = StationIdentity::new(station, 44.3, 23.8, 101.0);
    let provenance = Provenance {
        dataset_name: "EBASMC".to_string(),
        ..Default::default()
    };
    let mut record = StationRecord::new(identity, provenance, vec![time]);
    record.insert_series(
        "bsc532aer",
        Series::profile(altitudes.to_vec(), values.to_vec()),
        VarInfo::default(),
    );
    record
}

/// Create a store with a small chunk size
pub fn create_test_store(chunk_size: usize) -> StationStore {
    StationStore::new(StoreConfig {
        chunk_size,
        ..Default::default()
    })
    .unwrap()
}
