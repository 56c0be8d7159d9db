//! Station record extraction
//!
//! Turns the resolved columns of one [`ParsedFile`](crate::app::models::ParsedFile)
//! plus its file-level metadata into a single
//! [`StationRecord`](crate::app::models::StationRecord).
//!
//! - [`metadata`] - station identity and provenance from file metadata
//! - [`extractor`] - per-variable resolution, all-missing filtering and
//!   column information fallbacks

pub mod extractor;
pub mod metadata;

#[cfg(test)]
pub mod tests;

pub use extractor::StationExtractor;
pub use metadata::{provenance_from_file, station_identity_from_file};
