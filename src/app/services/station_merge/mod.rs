//! Station merge engine
//!
//! Combines several station records believed to describe one physical site
//! into a single record per variable.
//!
//! # Flat Series
//!
//! Inputs are ordered by a preference attribute (or by their number of valid
//! samples) and folded into a running result. On shared time stamps the
//! later, more preferred input wins and the displaced value is kept in the
//! overlap series. Optionally the result is reindexed onto the canonical grid
//! of its temporal resolution.
//!
//! # Vertical Profiles
//!
//! Each input holds one profile at one time stamp. Profiles are linearly
//! interpolated onto a fixed vertical grid (no extrapolation) and assembled
//! into a `[level][time]` grid.
//!
//! All merge errors are returned to the caller; nothing is skipped silently.

pub mod engine;
pub mod flat;
pub mod profile;
pub mod regularize;

#[cfg(test)]
pub mod tests;

pub use engine::MergeEngine;
pub use profile::interpolate_profile;

use crate::app::models::{StationRecord, TimeSeries, TsType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-request merge options; unset fields fall back to the engine config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Metadata attribute used to order the inputs
    pub pref_attr: Option<String>,

    /// Largest sort key wins on overlaps (overrides the engine default)
    pub prefer_largest: Option<bool>,

    /// Temporal resolution of each input; triggers regularization
    pub ts_types: Option<Vec<TsType>>,

    /// Regularize using each input's own `ts_type` when no labels are given
    #[serde(default)]
    pub fill_missing: bool,

    /// Metadata keys excluded from the conflict check
    pub ignore_meta_keys: Option<Vec<String>>,

    /// Canonical altitude levels for profile merges
    pub vertical_levels: Option<Vec<f64>>,
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Order inputs by a metadata attribute
    pub fn with_pref_attr(mut self, attr: impl Into<String>) -> Self {
        self.pref_attr = Some(attr.into());
        self
    }

    pub fn with_prefer_largest(mut self, prefer_largest: bool) -> Self {
        self.prefer_largest = Some(prefer_largest);
        self
    }

    /// Regularize onto the grid of the given per-input resolutions
    pub fn with_ts_types(mut self, ts_types: Vec<TsType>) -> Self {
        self.ts_types = Some(ts_types);
        self
    }

    /// Regularize onto the grid of the inputs' recorded resolution
    pub fn with_fill_missing(mut self) -> Self {
        self.fill_missing = true;
        self
    }

    pub fn with_ignore_meta_keys(mut self, keys: &[&str]) -> Self {
        self.ignore_meta_keys = Some(keys.iter().map(|k| k.to_string()).collect());
        self
    }

    pub fn with_vertical_levels(mut self, levels: Vec<f64>) -> Self {
        self.vertical_levels = Some(levels);
        self
    }
}

/// Result of merging one station group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedStation {
    /// Merged record holding the target variable only
    pub station: StationRecord,

    /// Values displaced during the merge, per variable
    pub overlap: BTreeMap<String, TimeSeries>,

    /// Source files of the inputs, in merge order
    pub source_files: Vec<String>,

    /// Number of inputs merged
    pub merged_count: usize,
}

impl MergedStation {
    /// Overlap series of one variable, if any value was displaced
    pub fn overlap_of(&self, var: &str) -> Option<&TimeSeries> {
        self.overlap.get(var).filter(|ts| !ts.is_empty())
    }
}
