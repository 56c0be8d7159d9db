//! Tests for the station merge engine


use crate::app::models::{MetaValue, Provenance, Series, StationIdentity, StationRecord, VarInfo};
use crate::app::services::station_merge::MergeEngine;
use crate::config::MergeConfig;
use chrono::{DateTime, Duration, TimeZone, Utc};

pub const VAR: &str = "concpm10";

pub fn t(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 3, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

pub fn identity() -> StationIdentity {
    StationIdentity::new("Ispra", 45.8, 8.63, 209.0)
}

/// Create a flat record from (day, value) samples
pub fn flat_record(filename: &str, samples: &[(i64, f64)]) -> StationRecord {
    let provenance = Provenance {
        dataset_name: "EBASMC".to_string(),
        filename: Some(filename.to_string()),
        ..Default::default()
    };
    let times = samples.iter().map(|(day, _)| t(*day)).collect();
    let mut record = StationRecord::new(identity(), provenance, times);
    record.insert_series(
        VAR,
        Series::flat(samples.iter().map(|(_, v)| *v).collect()),
        VarInfo {
            unit: Some("ug m-3".to_string()),
            ..Default::default()
        },
    );
    record
}

/// Create a flat record with a numeric preference attribute
pub fn ranked_record(filename: &str, rank: f64, samples: &[(i64, f64)]) -> StationRecord {
    let mut record = flat_record(filename, samples);
    record
        .provenance
        .attributes
        .insert("priority".to_string(), MetaValue::Number(rank));
    record
}

/// Create a profile record at one time stamp
pub fn profile_record(day: i64, altitudes: &[f64], values: &[f64]) -> StationRecord {
    let mut record = StationRecord::new(identity(), Provenance::default(), vec![t(day)]);
    record.insert_series(
        "ec532aer",
        Series::profile(altitudes.to_vec(), values.to_vec()),
        VarInfo::default(),
    );
    record
}

pub fn engine() -> MergeEngine {
    MergeEngine::new(MergeConfig::default())
}

/// Values of the merged flat series
pub fn flat_values(record: &StationRecord, var: &str) -> Vec<f64> {
    match record.series(var) {
        Some(Series::Flat { values, .. }) => values.clone(),
        other => panic!("expected flat series, got {:?}", other),
    }
}

/// Compare float vectors treating NaN as equal to NaN
pub fn assert_same_values(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
    for (a, e) in actual.iter().zip(expected) {
        assert!(
            (a.is_nan() && e.is_nan()) || (a - e).abs() < 1e-9,
            "{:?} vs {:?}",
            actual,
            expected
        );
    }
}
