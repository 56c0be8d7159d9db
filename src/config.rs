//! Configuration management and validation.
//!
//! Provides configuration structures for column resolution, store growth,
//! station merging and batch reading. Every default lives in
//! [`crate::constants`]; configurations are per session, so independent
//! ingestion runs never share state.

use crate::constants::{
    DEFAULT_IDENTITY_RTOL, DEFAULT_MERGE_IGNORE_KEYS, DEFAULT_STORE_CHUNK_SIZE,
    DEFAULT_VERT_GRID_LOWER_M, DEFAULT_VERT_GRID_STEP_M, DEFAULT_VERT_GRID_UPPER_M,
    DEFAULT_VOLATILE_META_KEYS, IGNORE_STATISTICS, PREFER_STATISTICS, WAVELENGTH_TOL_NM,
};
use crate::error::{ObsError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Column resolution preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Statistic preference used when a variable does not define its own
    pub prefer_statistics: Vec<String>,

    /// Statistics whose columns are never candidates
    pub ignore_statistics: Vec<String>,

    /// Wavelength tolerance used when a variable does not define its own
    pub wavelength_tol_nm: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            prefer_statistics: to_strings(PREFER_STATISTICS),
            ignore_statistics: to_strings(IGNORE_STATISTICS),
            wavelength_tol_nm: WAVELENGTH_TOL_NM,
        }
    }
}

/// Station store growth and finalization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Rows added per growth step
    pub chunk_size: usize,

    /// Collapse identical metadata entries on finalize
    pub merge_common_meta: bool,

    /// Metadata keys ignored when collapsing entries
    pub volatile_meta_keys: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_STORE_CHUNK_SIZE,
            merge_common_meta: true,
            volatile_meta_keys: to_strings(DEFAULT_VOLATILE_META_KEYS),
        }
    }
}

/// Fixed vertical grid onto which profile data is interpolated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticalGrid {
    pub lower: f64,
    pub upper: f64,
    pub step: f64,
}

impl Default for VerticalGrid {
    fn default() -> Self {
        Self {
            lower: DEFAULT_VERT_GRID_LOWER_M,
            upper: DEFAULT_VERT_GRID_UPPER_M,
            step: DEFAULT_VERT_GRID_STEP_M,
        }
    }
}

impl VerticalGrid {
    /// Altitude levels from `lower` to `upper` inclusive
    pub fn levels(&self) -> Vec<f64> {
        if self.step <= 0.0 || self.upper < self.lower {
            return Vec::new();
        }
        let count = ((self.upper - self.lower) / self.step).floor() as usize + 1;
        (0..count)
            .map(|i| self.lower + i as f64 * self.step)
            .collect()
    }
}

/// Station merge settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Metadata keys excluded from the conflict check
    pub ignore_meta_keys: Vec<String>,

    /// Relative tolerance for latitude, longitude and altitude
    pub identity_rtol: f64,

    /// Prefer the input with the largest sort key on overlaps
    pub prefer_largest: bool,

    /// Canonical grid for profile merges
    pub vertical_grid: VerticalGrid,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            ignore_meta_keys: to_strings(DEFAULT_MERGE_IGNORE_KEYS),
            identity_rtol: DEFAULT_IDENTITY_RTOL,
            prefer_largest: true,
            vertical_grid: VerticalGrid::default(),
        }
    }
}

/// Global configuration for observation processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    pub resolver: ResolverConfig,
    pub store: StoreConfig,
    pub merge: MergeConfig,

    /// Number of worker tasks for concurrent file reading
    pub workers: usize,

    /// Show a progress bar during batch reads
    pub show_progress: bool,

    /// Dataset name recorded in station provenance
    pub dataset_name: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            store: StoreConfig::default(),
            merge: MergeConfig::default(),
            workers: num_cpus::get(),
            show_progress: false,
            dataset_name: crate::constants::DEFAULT_DATASET_NAME.to_string(),
        }
    }
}

impl ProcessorConfig {
    /// Create configuration with custom worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the store growth chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.store.chunk_size = chunk_size;
        self
    }

    /// Set the wavelength tolerance
    pub fn with_wavelength_tolerance(mut self, tol_nm: f64) -> Self {
        self.resolver.wavelength_tol_nm = tol_nm;
        self
    }

    /// Enable or disable metadata collapsing on finalize
    pub fn with_merge_common_meta(mut self, enabled: bool) -> Self {
        self.store.merge_common_meta = enabled;
        self
    }

    /// Configure the canonical vertical grid
    pub fn with_vertical_grid(mut self, grid: VerticalGrid) -> Self {
        self.merge.vertical_grid = grid;
        self
    }

    /// Enable progress bars for batch reads
    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    /// Set the dataset name
    pub fn with_dataset_name(mut self, name: impl Into<String>) -> Self {
        self.dataset_name = name.into();
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.store.chunk_size == 0 {
            return Err(ObsError::configuration("Store chunk size must be positive"));
        }
        if self.workers == 0 {
            return Err(ObsError::configuration("Worker count must be positive"));
        }
        if !(self.resolver.wavelength_tol_nm >= 0.0) {
            return Err(ObsError::configuration(format!(
                "Invalid wavelength tolerance {}",
                self.resolver.wavelength_tol_nm
            )));
        }
        if !(self.merge.identity_rtol >= 0.0) {
            return Err(ObsError::configuration(format!(
                "Invalid identity tolerance {}",
                self.merge.identity_rtol
            )));
        }
        let grid = &self.merge.vertical_grid;
        if !(grid.step > 0.0) || grid.upper < grid.lower {
            return Err(ObsError::configuration(format!(
                "Invalid vertical grid: lower={}, upper={}, step={}",
                grid.lower, grid.upper, grid.step
            )));
        }

        debug!(
            "Configuration valid: chunk_size={}, workers={}, {} vertical levels",
            self.store.chunk_size,
            self.workers,
            grid.levels().len()
        );
        Ok(())
    }
}
