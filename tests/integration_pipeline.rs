//! Integration tests for the read, store and merge pipeline
//!
//! These tests drive the public API with an in-memory file reader in place
//! of a format-specific parser.

use chrono::{DateTime, Duration, TimeZone, Utc};
use obs_processor::app::models::TsType;
use obs_processor::config::MergeConfig;
use obs_processor::{
    ColumnDef, FileReader, FileTask, MergeEngine, MergeOptions, ObsError, ObservationReader,
    ParsedFile, ProcessorConfig, Result, Series, VariableColumnSpec, VariableRegistry,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const PM10: &str = "pm10_mass";

#[derive(Default)]
struct MemoryReader {
    files: BTreeMap<PathBuf, ParsedFile>,
}

impl MemoryReader {
    fn with_file(mut self, file: ParsedFile) -> Self {
        self.files.insert(PathBuf::from(&file.filename), file);
        self
    }
}

impl FileReader for MemoryReader {
    fn read_file(&self, path: &Path) -> Result<ParsedFile> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ObsError::file_format(path.display().to_string(), "no such file"))
    }
}

fn hour(h: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 3, 1, 0, 0, 0).unwrap() + Duration::hours(h)
}

/// Hourly PM10 file starting at `start_hour`
fn pm10_file(
    filename: &str,
    station: &str,
    priority: &str,
    start_hour: i64,
    values: &[f64],
) -> ParsedFile {
    let meta = [
        ("station_name", station),
        ("station_latitude", "47.80"),
        ("station_longitude", "11.01"),
        ("station_altitude", "985 m"),
        ("unit", "ug/m3"),
        ("resolution_code", "1h"),
        ("priority", priority),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    ParsedFile {
        filename: filename.to_string(),
        default_matrix: Some("pm10".to_string()),
        columns: vec![ColumnDef::new(0, PM10)],
        data: values.iter().map(|v| vec![*v]).collect(),
        meta,
        times: (0..values.len() as i64).map(|i| hour(start_hour + i)).collect(),
    }
}

fn registry() -> VariableRegistry {
    VariableRegistry::from_specs(vec![VariableColumnSpec::new("concpm10", &[PM10])]).unwrap()
}

fn reader() -> ObservationReader<MemoryReader> {
    let files = MemoryReader::default()
        .with_file(pm10_file("hpb_a.nas", "Hohenpeissenberg", "1", 0, &[40.0, 41.0, 42.0, 43.0]))
        .with_file(pm10_file("hpb_b.nas", "Hohenpeissenberg", "2", 2, &[100.0, 101.0, 102.0]))
        .with_file(pm10_file("zsf.nas", "Zugspitze", "1", 0, &[5.0, f64::NAN, 7.0]));
    let config = ProcessorConfig::default()
        .with_workers(3)
        .with_chunk_size(2);
    ObservationReader::new(files, registry(), config).unwrap()
}

fn tasks() -> Vec<FileTask> {
    vec![
        FileTask::new("hpb_a.nas", &["concpm10"]),
        FileTask::new("hpb_b.nas", &["concpm10"]),
        FileTask::new("zsf.nas", &["concpm10"]),
    ]
}

/// Test that a batch read produces a finalized store with all rows
///
/// Purpose: Validate the reader, extractor and store work together
/// Benefit: Catches row loss across chunked store growth
#[test]
fn test_batch_read_fills_store() {
    let outcome = reader().read(&tasks(), None, None).unwrap();

    assert_eq!(outcome.stats.files_read, 3);
    assert!(outcome.files_failed.is_empty());
    assert!(outcome.store.is_finalized());
    assert_eq!(outcome.store.len(), 10);
    assert_eq!(
        outcome.store.unique_station_names(),
        vec!["Hohenpeissenberg".to_string(), "Zugspitze".to_string()]
    );

    let df = outcome.store.to_dataframe().unwrap();
    assert_eq!(df.height(), 10);
    assert_eq!(df.width(), 7);
}

/// Test the overlap law when merging two files of one station
///
/// Purpose: Validate that the preferred input wins on shared timestamps
/// Benefit: Displaced values stay recoverable from the overlap series
#[test]
fn test_merge_preferred_file_wins_overlap() {
    let outcome = reader().read(&tasks(), None, None).unwrap();
    let engine = MergeEngine::new(MergeConfig::default());
    let opts = MergeOptions::new().with_pref_attr("priority");

    let merged = outcome
        .store
        .to_station_data("Hohen*", "concpm10", &engine, &opts)
        .unwrap();
    assert_eq!(merged.len(), 1);

    let station = &merged[0];
    assert_eq!(station.merged_count, 2);
    assert_eq!(station.station.times, (0..5).map(hour).collect::<Vec<_>>());
    match station.station.series("concpm10") {
        Some(Series::Flat { values, .. }) => {
            assert_eq!(values, &vec![40.0, 41.0, 100.0, 101.0, 102.0]);
        }
        other => panic!("expected flat series, got {:?}", other),
    }

    let overlap = station.overlap_of("concpm10").unwrap();
    assert_eq!(overlap.len(), 2);
    assert_eq!(overlap.get(hour(2)), Some(42.0));
    assert_eq!(overlap.get(hour(3)), Some(43.0));
}

/// Test that reversing the preference flips the winner
///
/// Purpose: Validate the prefer_largest override
/// Benefit: Ensures ordering is driven by the attribute, not file order
#[test]
fn test_merge_prefer_smallest() {
    let outcome = reader().read(&tasks(), None, None).unwrap();
    let engine = MergeEngine::default();
    let opts = MergeOptions::new()
        .with_pref_attr("priority")
        .with_prefer_largest(false);

    let merged = outcome
        .store
        .to_station_data("Hohenpeissenberg", "concpm10", &engine, &opts)
        .unwrap();
    match merged[0].station.series("concpm10") {
        Some(Series::Flat { values, .. }) => {
            assert_eq!(values, &vec![40.0, 41.0, 42.0, 43.0, 102.0]);
        }
        other => panic!("expected flat series, got {:?}", other),
    }
    let overlap = merged[0].overlap_of("concpm10").unwrap();
    assert_eq!(overlap.get(hour(2)), Some(100.0));
}

/// Test regularization onto a daily grid
///
/// Purpose: Validate that hourly inputs collapse onto day starts
/// Benefit: Shows that only the earliest value per slot survives
#[test]
fn test_merge_with_regularization() {
    let outcome = reader().read(&tasks(), None, None).unwrap();
    let records = outcome.store.station_records("Zugspitze", "concpm10").unwrap();
    assert_eq!(records.len(), 1);

    let opts = MergeOptions::new().with_ts_types(vec![TsType::Daily]);
    let merged = MergeEngine::default().merge(&records, "concpm10", &opts).unwrap();

    assert_eq!(merged.station.times, vec![hour(0)]);
    assert_eq!(merged.station.provenance.ts_type, Some(TsType::Daily));
    match merged.station.series("concpm10") {
        Some(Series::Flat { values, .. }) => assert_eq!(values, &vec![5.0]),
        other => panic!("expected flat series, got {:?}", other),
    }
    assert_eq!(merged.overlap_of("concpm10").map(|ts| ts.len()), Some(1));
}

/// Test that unmatched patterns and unknown variables give no stations
///
/// Purpose: Validate query filtering
/// Benefit: Empty results are not errors
#[test]
fn test_query_without_matches() {
    let outcome = reader().read(&tasks(), None, None).unwrap();
    let engine = MergeEngine::default();

    let none = outcome
        .store
        .to_station_data("Jungfraujoch", "concpm10", &engine, &MergeOptions::new())
        .unwrap();
    assert!(none.is_empty());

    let records = outcome.store.station_records("*", "conco3").unwrap();
    assert!(records.is_empty());
}

/// Test that a worker-pool read matches a sequential read
///
/// Purpose: Validate deterministic results under concurrency
/// Benefit: Row order and metadata keys do not depend on scheduling
#[tokio::test]
async fn test_concurrent_read_is_deterministic() {
    let reader = reader();
    let mut tasks = tasks();
    tasks.push(FileTask::new("missing.nas", &["concpm10"]));

    let sequential = reader.read(&tasks, None, None).unwrap();
    let concurrent = reader.read_concurrent(&tasks, None, None).await.unwrap();

    assert_eq!(concurrent.stats.files_failed, 1);
    assert_eq!(concurrent.files_failed, sequential.files_failed);
    assert_eq!(concurrent.store.len(), sequential.store.len());
    assert_eq!(concurrent.store.meta_keys(), sequential.store.meta_keys());
    // rows hold NaN markers, so compare bit patterns
    let bits = |row: Option<&[f64]>| row.map(|r| r.iter().map(|v| v.to_bits()).collect::<Vec<_>>());
    for row in 0..sequential.store.len() {
        assert_eq!(bits(concurrent.store.row(row)), bits(sequential.store.row(row)));
    }
}

/// Test grouped merging onto each input's own resolution
///
/// Purpose: Validate fill_missing through the station query path
/// Benefit: Stations merged from one or two files both come out on a gap-free grid
#[test]
fn test_station_data_fills_recorded_resolution() {
    let mut gappy = pm10_file("zsf.nas", "Zugspitze", "1", 0, &[5.0, 6.0, 8.0]);
    gappy.times[2] = hour(3);
    let files = MemoryReader::default()
        .with_file(pm10_file("hpb_a.nas", "Hohenpeissenberg", "1", 0, &[40.0, 41.0, 42.0, 43.0]))
        .with_file(pm10_file("hpb_b.nas", "Hohenpeissenberg", "2", 2, &[100.0, 101.0, 102.0]))
        .with_file(gappy);
    let reader = ObservationReader::new(files, registry(), ProcessorConfig::default()).unwrap();
    let outcome = reader.read(&tasks(), None, None).unwrap();

    let opts = MergeOptions::new().with_pref_attr("priority").with_fill_missing();
    let merged = outcome
        .store
        .to_station_data("*", "concpm10", &MergeEngine::default(), &opts)
        .unwrap();
    assert_eq!(merged.len(), 2);

    let hpb = merged
        .iter()
        .find(|m| m.station.identity.station_name == "Hohenpeissenberg")
        .unwrap();
    assert_eq!(hpb.merged_count, 2);
    assert_eq!(hpb.station.times, (0..5).map(hour).collect::<Vec<_>>());
    assert_eq!(hpb.station.provenance.ts_type, Some(TsType::Hourly));

    let zsf = merged
        .iter()
        .find(|m| m.station.identity.station_name == "Zugspitze")
        .unwrap();
    assert_eq!(zsf.merged_count, 1);
    assert_eq!(zsf.station.times, (0..4).map(hour).collect::<Vec<_>>());
    assert_eq!(zsf.station.provenance.ts_type, Some(TsType::Hourly));
    match zsf.station.series("concpm10") {
        Some(Series::Flat { values, .. }) => {
            assert_eq!(&values[..2], &[5.0, 6.0]);
            assert!(values[2].is_nan());
            assert_eq!(values[3], 8.0);
        }
        other => panic!("expected flat series, got {:?}", other),
    }
}
