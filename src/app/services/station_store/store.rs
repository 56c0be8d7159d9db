//! Append-only flat table of station observations

use super::registry::{StationMeta, VarIndex};
use crate::app::models::meta::same_meta_map;
use crate::app::models::{Series, StationRecord};
use crate::config::StoreConfig;
use crate::constants::DEFAULT_IDENTITY_RTOL;
use crate::constants::store_layout::{META_KEY_INDEX, ROW_WIDTH};
use crate::error::{ObsError, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::{debug, info};

/// Row ranges per variable of one metadata entry
pub type VarRows = BTreeMap<String, Vec<Range<usize>>>;

/// Encode a time stamp for the TIME field (seconds since the epoch)
pub fn encode_time(t: DateTime<Utc>) -> f64 {
    t.timestamp_millis() as f64 / 1000.0
}

/// Decode a TIME field written by [`encode_time`]
pub fn decode_time(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((value * 1000.0).round() as i64)
}

/// Growable columnar store for one ingestion session.
///
/// Every appended sample becomes one row of [`ROW_WIDTH`] numbers laid out
/// as in [`crate::constants::store_layout`]. Capacity grows in whole chunks
/// and is trimmed to the logical length by [`StationStore::finalize`], after
/// which the store is read-only.
#[derive(Debug, Clone)]
pub struct StationStore {
    pub(super) config: StoreConfig,
    pub(super) table: Vec<f64>,
    pub(super) rows: usize,
    pub(super) capacity: usize,
    pub(super) var_index: VarIndex,
    pub(super) metadata: BTreeMap<usize, StationMeta>,
    pub(super) meta_idx: BTreeMap<usize, VarRows>,
    pub(super) next_meta_key: usize,
    pub(super) finalized: bool,
}

impl Default for StationStore {
    fn default() -> Self {
        Self::with_config(StoreConfig::default())
    }
}

impl StationStore {
    /// Create an empty store
    pub fn new(config: StoreConfig) -> Result<Self> {
        if config.chunk_size == 0 {
            return Err(ObsError::configuration("Store chunk size must be positive"));
        }
        Ok(Self::with_config(config))
    }

    fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            table: Vec::new(),
            rows: 0,
            capacity: 0,
            var_index: VarIndex::new(),
            metadata: BTreeMap::new(),
            meta_idx: BTreeMap::new(),
            next_meta_key: 0,
            finalized: false,
        }
    }

    /// Logical number of rows
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Physical number of rows allocated
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn var_index(&self) -> &VarIndex {
        &self.var_index
    }

    /// Number of metadata entries
    pub fn num_meta(&self) -> usize {
        self.metadata.len()
    }

    /// One row of the table
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.rows {
            return None;
        }
        self.table.get(row * ROW_WIDTH..(row + 1) * ROW_WIDTH)
    }

    /// Ensure room for `additional` rows, growing in whole chunks
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        if self.finalized {
            return Err(ObsError::StoreFinalized);
        }
        let required = self.rows + additional;
        if required <= self.capacity {
            return Ok(());
        }

        let missing = required - self.capacity;
        let chunk = self.config.chunk_size;
        let grow_rows = missing.div_ceil(chunk) * chunk;
        let new_capacity = self.capacity + grow_rows;

        self.table
            .try_reserve_exact(grow_rows * ROW_WIDTH)
            .map_err(|_| ObsError::store_allocation(grow_rows))?;
        self.table.resize(new_capacity * ROW_WIDTH, f64::NAN);
        self.capacity = new_capacity;

        debug!(
            "Station store grown by {} rows to capacity {}",
            grow_rows, self.capacity
        );
        Ok(())
    }

    fn rows_needed(record: &StationRecord) -> Result<usize> {
        let mut total = 0;
        for (var, series) in &record.data {
            total += match series {
                Series::Flat { values, .. } | Series::Profile { values, .. } => values.len(),
                Series::Grid { .. } => {
                    return Err(ObsError::configuration(format!(
                        "Merged grid data of {} cannot be appended to the store",
                        var
                    )));
                }
            };
        }
        Ok(total)
    }

    fn write_row(&mut self, row: usize, fields: [f64; ROW_WIDTH]) {
        let start = row * ROW_WIDTH;
        self.table[start..start + ROW_WIDTH].copy_from_slice(&fields);
    }

    /// Append every variable of a record and register its metadata.
    ///
    /// Returns the record's `meta_key`. The record is checked before any row
    /// is written, so a rejected record leaves the store unchanged.
    pub fn append_record(&mut self, record: &StationRecord) -> Result<usize> {
        if self.finalized {
            return Err(ObsError::StoreFinalized);
        }
        record.validate_shapes()?;
        let needed = Self::rows_needed(record)?;
        self.reserve(needed)?;

        let meta_key = self.next_meta_key;
        let id = &record.identity;
        let mut var_rows = VarRows::new();

        for var in &record.contains_vars {
            let Some(series) = record.data.get(var) else {
                continue;
            };
            let var_idx = self.var_index.get_or_assign(var) as f64;
            let start = self.rows;

            match series {
                Series::Flat { values, .. } => {
                    for (t, value) in record.times.iter().zip(values) {
                        self.write_row(
                            self.rows,
                            [
                                meta_key as f64,
                                encode_time(*t),
                                id.latitude,
                                id.longitude,
                                id.altitude,
                                var_idx,
                                *value,
                            ],
                        );
                        self.rows += 1;
                    }
                }
                Series::Profile {
                    altitudes, values, ..
                } => {
                    let time = record.times.first().copied().map(encode_time).unwrap_or(f64::NAN);
                    for (alt, value) in altitudes.iter().zip(values) {
                        self.write_row(
                            self.rows,
                            [
                                meta_key as f64,
                                time,
                                id.latitude,
                                id.longitude,
                                *alt,
                                var_idx,
                                *value,
                            ],
                        );
                        self.rows += 1;
                    }
                }
                Series::Grid { .. } => {}
            }
            var_rows.entry(var.clone()).or_default().push(start..self.rows);
        }

        self.metadata.insert(meta_key, StationMeta::from_record(record));
        self.meta_idx.insert(meta_key, var_rows);
        self.next_meta_key += 1;

        debug!(
            "Appended {} rows for {} (meta_key {})",
            needed,
            record.station_name(),
            meta_key
        );
        Ok(meta_key)
    }

    /// Trim the table to its logical length and make the store read-only.
    ///
    /// With `merge_common_meta` set, metadata entries that agree on every
    /// key except the volatile ones are collapsed onto the earliest entry.
    pub fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Err(ObsError::StoreFinalized);
        }
        self.table.truncate(self.rows * ROW_WIDTH);
        self.table.shrink_to_fit();
        self.capacity = self.rows;

        if self.config.merge_common_meta {
            self.merge_common_meta();
        }
        self.finalized = true;

        info!(
            "Station store finalized: {} rows, {} metadata entries, {} variables",
            self.rows,
            self.metadata.len(),
            self.var_index.len()
        );
        Ok(())
    }

    fn merge_common_meta(&mut self) {
        let ignore = &self.config.volatile_meta_keys;
        let mut survivors: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut remap: BTreeMap<usize, usize> = BTreeMap::new();

        for (&key, meta) in &self.metadata {
            let candidates = survivors.entry(meta.station_name().to_string()).or_default();
            let target = candidates.iter().copied().find(|existing| {
                self.metadata.get(existing).is_some_and(|kept| {
                    same_meta_map(&kept.meta_map(), &meta.meta_map(), ignore, DEFAULT_IDENTITY_RTOL)
                        && kept.compatible_var_info(meta)
                })
            });
            match target {
                Some(existing) => {
                    remap.insert(key, existing);
                }
                None => candidates.push(key),
            }
        }
        if remap.is_empty() {
            return;
        }

        for row in 0..self.rows {
            let field = row * ROW_WIDTH + META_KEY_INDEX;
            let key = self.table[field] as usize;
            if let Some(&target) = remap.get(&key) {
                self.table[field] = target as f64;
            }
        }

        for (&from, &to) in &remap {
            if let Some(meta) = self.metadata.remove(&from) {
                if let Some(kept) = self.metadata.get_mut(&to) {
                    kept.absorb(meta);
                }
            }
            if let Some(ranges) = self.meta_idx.remove(&from) {
                let kept = self.meta_idx.entry(to).or_default();
                for (var, mut var_ranges) in ranges {
                    kept.entry(var).or_default().append(&mut var_ranges);
                }
            }
        }
        debug!("Collapsed {} metadata entries", remap.len());
    }

    /// Column values of one field over a row range
    pub(super) fn field_values(&self, rows: &Range<usize>, field: usize) -> Vec<f64> {
        rows.clone()
            .map(|row| self.table[row * ROW_WIDTH + field])
            .collect()
    }

    /// One field over all rows
    pub(super) fn field_column(&self, field: usize) -> Vec<f64> {
        self.field_values(&(0..self.rows), field)
    }
}
