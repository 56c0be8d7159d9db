//! Batch read statistics and outcome

use crate::app::services::station_store::StationStore;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// A file skipped during a batch read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Statistics for one batch read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadStats {
    /// Number of files selected for reading
    pub files_total: usize,
    /// Number of files appended to the store
    pub files_read: usize,
    /// Number of files skipped with a recoverable error
    pub files_failed: usize,
    /// Rows written to the store
    pub rows_appended: usize,
    pub elapsed: Duration,
}

impl ReadStats {
    /// Percentage of selected files that were read
    pub fn success_rate(&self) -> f64 {
        if self.files_total == 0 {
            100.0
        } else {
            (self.files_read as f64 / self.files_total as f64) * 100.0
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{}/{} files read ({:.1}%), {} failed, {} rows in {:.2}s",
            self.files_read,
            self.files_total,
            self.success_rate(),
            self.files_failed,
            self.rows_appended,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Result of a batch read: the finalized store plus bookkeeping
#[derive(Debug)]
pub struct ReadOutcome {
    pub store: StationStore,
    pub files_failed: Vec<FailedFile>,
    pub stats: ReadStats,
}
