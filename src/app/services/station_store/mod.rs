//! Station store: accumulation of station records in one flat table
//!
//! The store is append-only for the lifetime of an ingestion session. Rows
//! follow the fixed layout `{meta_key, time, lat, lon, alt, var_idx, value}`
//! (see [`crate::constants::store_layout`]); everything else about a record
//! lives in the side registries.
//!
//! - [`store`] - table growth, appends and finalization
//! - [`registry`] - variable index and per-record metadata entries
//! - [`query`] - record reconstruction, grouped merging and data frame export
//!
//! The store has no internal locking. Concurrent readers must funnel their
//! records through a single writer.

pub mod query;
pub mod registry;
pub mod store;

#[cfg(test)]
pub mod tests;

pub use registry::{StationMeta, VarIndex};
pub use store::{StationStore, decode_time, encode_time};
