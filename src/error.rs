//! Error handling for observation ingestion and station merging.
//!
//! Per-file errors (variable not found, ambiguous columns, malformed input) are
//! recoverable at batch level: the reader logs them and moves on. Errors raised
//! while merging an explicitly requested station group are surfaced to the
//! caller unchanged.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObsError {
    #[error("Variable {variable} not found in file {file}")]
    VariableNotFound { variable: String, file: String },

    #[error("None of the requested variables {variables:?} could be found in file {file}")]
    NoVariablesFound { file: String, variables: Vec<String> },

    #[error(
        "Could not identify unique column for variable {variable} in file {file}: candidates {candidates:?}"
    )]
    ResolutionFailure {
        variable: String,
        file: String,
        candidates: Vec<usize>,
    },

    #[error("Invalid file format in {file}: {reason}")]
    FileFormat { file: String, reason: String },

    #[error("All data columns of requested variables are missing in {file}")]
    NoUsableData { file: String },

    #[error("Data coverage error: {message}")]
    DataCoverage { message: String },

    #[error("Metadata error: {message}")]
    MetaData { message: String },

    #[error("Station identity mismatch: {message}")]
    Identity { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Variable definition error: {message}")]
    VariableDefinition { message: String },

    #[error("Failed to grow station store by {requested_rows} rows")]
    StoreAllocation { requested_rows: usize },

    #[error("Station store is finalized and read-only")]
    StoreFinalized,

    #[error("Invalid station name pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Worker task failed: {reason}")]
    TaskFailed { reason: String },
}

pub type Result<T> = std::result::Result<T, ObsError>;

impl ObsError {
    /// Create a variable-not-found error
    pub fn variable_not_found(variable: impl Into<String>, file: impl Into<String>) -> Self {
        Self::VariableNotFound {
            variable: variable.into(),
            file: file.into(),
        }
    }

    /// Create a whole-file not-found error
    pub fn no_variables_found(file: impl Into<String>, variables: Vec<String>) -> Self {
        Self::NoVariablesFound {
            file: file.into(),
            variables,
        }
    }

    /// Create a resolution failure for an ambiguous column match
    pub fn resolution_failure(
        variable: impl Into<String>,
        file: impl Into<String>,
        candidates: Vec<usize>,
    ) -> Self {
        Self::ResolutionFailure {
            variable: variable.into(),
            file: file.into(),
            candidates,
        }
    }

    /// Create a file format error
    pub fn file_format(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FileFormat {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Create a no-usable-data error
    pub fn no_usable_data(file: impl Into<String>) -> Self {
        Self::NoUsableData { file: file.into() }
    }

    /// Create a data coverage error
    pub fn data_coverage(message: impl Into<String>) -> Self {
        Self::DataCoverage {
            message: message.into(),
        }
    }

    /// Create a metadata error
    pub fn meta_data(message: impl Into<String>) -> Self {
        Self::MetaData {
            message: message.into(),
        }
    }

    /// Create a station identity error
    pub fn identity(message: impl Into<String>) -> Self {
        Self::Identity {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a variable definition error
    pub fn variable_definition(message: impl Into<String>) -> Self {
        Self::VariableDefinition {
            message: message.into(),
        }
    }

    /// Create a store allocation error
    pub fn store_allocation(requested_rows: usize) -> Self {
        Self::StoreAllocation { requested_rows }
    }

    /// Create a worker task failure
    pub fn task_failed(reason: impl Into<String>) -> Self {
        Self::TaskFailed {
            reason: reason.into(),
        }
    }

    /// True for the per-variable and per-file not-found signals
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::VariableNotFound { .. } | Self::NoVariablesFound { .. }
        )
    }

    /// True for errors after which a batch read skips the file and continues
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::VariableNotFound { .. }
                | Self::NoVariablesFound { .. }
                | Self::ResolutionFailure { .. }
                | Self::FileFormat { .. }
                | Self::NoUsableData { .. }
        )
    }
}
