//! Queries on a finalized station store

use super::registry::StationMeta;
use super::store::{StationStore, decode_time};
use crate::app::models::{Series, SeriesKind, StationRecord};
use crate::app::services::station_merge::{MergeEngine, MergeOptions, MergedStation};
use crate::constants::store_layout::{
    ALT_INDEX, COLUMN_NAMES, DATA_INDEX, LAT_INDEX, LON_INDEX, META_KEY_INDEX, TIME_INDEX,
    VAR_INDEX,
};
use crate::error::{ObsError, Result};
use chrono::{DateTime, Utc};
use glob::Pattern;
use polars::prelude::{Column, DataFrame, DataType, TimeUnit};
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::debug;

impl StationStore {
    fn ensure_finalized(&self) -> Result<()> {
        if self.finalized {
            Ok(())
        } else {
            Err(ObsError::configuration(
                "Station store must be finalized before it can be queried",
            ))
        }
    }

    /// Name of a variable index
    pub fn var_name(&self, var_idx: usize) -> Option<&str> {
        self.var_index.name(var_idx)
    }

    /// Metadata entry of a `meta_key`
    pub fn meta(&self, meta_key: usize) -> Option<&StationMeta> {
        self.metadata.get(&meta_key)
    }

    /// Metadata keys currently registered, ascending
    pub fn meta_keys(&self) -> Vec<usize> {
        self.metadata.keys().copied().collect()
    }

    /// Distinct station names, sorted
    pub fn unique_station_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .metadata
            .values()
            .map(|meta| meta.station_name().to_string())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn times_of(&self, rows: &Range<usize>) -> Vec<DateTime<Utc>> {
        self.field_values(rows, TIME_INDEX)
            .into_iter()
            .filter_map(decode_time)
            .collect()
    }

    fn rebuild_records(
        &self,
        meta: &StationMeta,
        var: &str,
        ranges: &[Range<usize>],
    ) -> Vec<StationRecord> {
        let info = meta.var_info.get(var).cloned().unwrap_or_default();
        let base = |times: Vec<DateTime<Utc>>| {
            StationRecord::new(meta.identity.clone(), meta.provenance.clone(), times)
        };

        match meta.var_kinds.get(var) {
            Some(SeriesKind::Profile) => ranges
                .iter()
                .map(|range| {
                    let times = self.times_of(&(range.start..range.start + 1));
                    let mut record = base(times);
                    let series = Series::profile(
                        self.field_values(range, ALT_INDEX),
                        self.field_values(range, DATA_INDEX),
                    );
                    record.insert_series(var, series, info.clone());
                    record
                })
                .collect(),
            _ => {
                let mut times = Vec::new();
                let mut values = Vec::new();
                for range in ranges {
                    times.extend(self.times_of(range));
                    values.extend(self.field_values(range, DATA_INDEX));
                }
                let mut record = base(times);
                record.insert_series(var, Series::flat(values), info);
                vec![record]
            }
        }
    }

    /// Station records whose name matches `pattern` and that contain `var`.
    ///
    /// Flat variables give one record per metadata entry; profile variables
    /// give one record per stored profile.
    pub fn station_records(&self, pattern: &str, var: &str) -> Result<Vec<StationRecord>> {
        self.ensure_finalized()?;
        let pattern = Pattern::new(pattern)?;

        let mut records = Vec::new();
        for (key, meta) in &self.metadata {
            if !pattern.matches(meta.station_name()) {
                continue;
            }
            let Some(ranges) = self.meta_idx.get(key).and_then(|vars| vars.get(var)) else {
                continue;
            };
            records.extend(self.rebuild_records(meta, var, ranges));
        }
        debug!(
            "{} record(s) of {} match station pattern {}",
            records.len(),
            var,
            pattern
        );
        Ok(records)
    }

    /// Merge the matching records per station name.
    ///
    /// Stations are returned in name order; the first merge error aborts.
    pub fn to_station_data(
        &self,
        pattern: &str,
        var: &str,
        engine: &MergeEngine,
        opts: &MergeOptions,
    ) -> Result<Vec<MergedStation>> {
        let mut groups: BTreeMap<String, Vec<StationRecord>> = BTreeMap::new();
        for record in self.station_records(pattern, var)? {
            groups
                .entry(record.station_name().to_string())
                .or_default()
                .push(record);
        }
        groups
            .values()
            .map(|group| engine.merge(group, var, opts))
            .collect()
    }

    /// Export the table as a data frame with one column per row field
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        self.ensure_finalized()?;

        let as_u32 = |field: usize| -> Vec<u32> {
            self.field_column(field).into_iter().map(|v| v as u32).collect()
        };
        let millis: Vec<Option<i64>> = self
            .field_column(TIME_INDEX)
            .into_iter()
            .map(|v| decode_time(v).map(|t| t.timestamp_millis()))
            .collect();
        let time = Column::new(COLUMN_NAMES[TIME_INDEX].into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

        let df = DataFrame::new(vec![
            Column::new(COLUMN_NAMES[META_KEY_INDEX].into(), as_u32(META_KEY_INDEX)),
            time,
            Column::new(COLUMN_NAMES[LAT_INDEX].into(), self.field_column(LAT_INDEX)),
            Column::new(COLUMN_NAMES[LON_INDEX].into(), self.field_column(LON_INDEX)),
            Column::new(COLUMN_NAMES[ALT_INDEX].into(), self.field_column(ALT_INDEX)),
            Column::new(COLUMN_NAMES[VAR_INDEX].into(), as_u32(VAR_INDEX)),
            Column::new(COLUMN_NAMES[DATA_INDEX].into(), self.field_column(DATA_INDEX)),
        ])?;
        Ok(df)
    }
}
