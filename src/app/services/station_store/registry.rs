//! Side registries of the station store
//!
//! The variable index assigns integer ids to variable names in first-seen
//! order. Station metadata entries are keyed by `meta_key` and hold
//! everything about a record that does not go into the numeric table.

use crate::app::models::{
    MetaMap, Provenance, SeriesKind, StationIdentity, StationRecord, VarInfo, flatten_meta,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Variable name to `var_idx` mapping, monotonic for the store's lifetime
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VarIndex {
    index: BTreeMap<String, usize>,
    names: Vec<String>,
}

impl VarIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `name`, assigning the next free one on first sight
    pub fn get_or_assign(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn name(&self, idx: usize) -> Option<&str> {
        self.names.get(idx).map(String::as_str)
    }

    /// Variable names in index order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Metadata registry entry for one ingested record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationMeta {
    pub identity: StationIdentity,
    pub provenance: Provenance,
    pub var_info: BTreeMap<String, VarInfo>,

    /// Variables stored under this key, in first-seen order
    pub variables: Vec<String>,

    /// Shape of each variable's rows
    pub var_kinds: BTreeMap<String, SeriesKind>,
}

impl StationMeta {
    pub fn from_record(record: &StationRecord) -> Self {
        Self {
            identity: record.identity.clone(),
            provenance: record.provenance.clone(),
            var_info: record.var_info.clone(),
            variables: record.contains_vars.clone(),
            var_kinds: record
                .data
                .iter()
                .map(|(var, series)| (var.clone(), series.kind()))
                .collect(),
        }
    }

    pub fn station_name(&self) -> &str {
        &self.identity.station_name
    }

    pub fn meta_map(&self) -> MetaMap {
        flatten_meta(&self.identity, &self.provenance)
    }

    /// True if shared variables carry the same column information
    pub fn compatible_var_info(&self, other: &StationMeta) -> bool {
        self.var_info.iter().all(|(var, info)| {
            other.var_info.get(var).is_none_or(|theirs| theirs == info)
                && other
                    .var_kinds
                    .get(var)
                    .is_none_or(|kind| self.var_kinds.get(var) == Some(kind))
        })
    }

    /// Absorb the variables of a collapsed entry
    pub fn absorb(&mut self, other: StationMeta) {
        for var in other.variables {
            if !self.variables.contains(&var) {
                self.variables.push(var);
            }
        }
        for (var, info) in other.var_info {
            self.var_info.entry(var).or_insert(info);
        }
        for (var, kind) in other.var_kinds {
            self.var_kinds.entry(var).or_insert(kind);
        }
    }
}
