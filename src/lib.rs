//! Observation Processor Library
//!
//! A Rust library for ingesting ground-station observation files, resolving
//! which raw data column holds a requested variable, accumulating the
//! results in a growable columnar store, and merging records of the same
//! physical station into one gap-aware time series.
//!
//! This library provides tools for:
//! - Resolving ambiguous columns by matrix, statistic, wavelength and
//!   missing-data preferences
//! - Extracting station records with identity and provenance metadata
//! - Accumulating records in an append-only flat table with side registries
//! - Merging station groups with overlap bookkeeping and vertical-profile
//!   interpolation
//! - Reading file batches sequentially or on a worker pool
//!
//! File-format parsing is not part of this crate: parsers implement
//! [`processor::FileReader`] and hand over a [`app::models::ParsedFile`].

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod processor;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod column_resolver;
        pub mod station_extractor;
        pub mod station_merge;
        pub mod station_store;
    }
}

// Re-export commonly used types
pub use app::models::{
    ColumnDef, MetaValue, ParsedFile, Provenance, Series, StationIdentity, StationRecord, TsType,
    VarInfo, VariableColumnSpec, VariableRegistry,
};
pub use app::services::column_resolver::ColumnResolver;
pub use app::services::station_extractor::StationExtractor;
pub use app::services::station_merge::{MergeEngine, MergeOptions, MergedStation};
pub use app::services::station_store::StationStore;
pub use config::ProcessorConfig;
pub use error::{ObsError, Result};
pub use processor::{FileReader, FileTask, ObservationReader, ReadOutcome};
