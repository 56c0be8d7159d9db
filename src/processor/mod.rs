//! Batch ingestion of observation files.
//!
//! Collapses per-variable file lists into read tasks, runs parsing, column
//! resolution and extraction per file (sequentially or on a worker pool),
//! and funnels every record through a single writer into a
//! [`StationStore`](crate::app::services::station_store::StationStore).

pub mod file_lists;
pub mod reader;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use file_lists::{FileTask, merge_file_lists};
pub use reader::{FileReader, ObservationReader};
pub use stats::{FailedFile, ReadOutcome, ReadStats};
