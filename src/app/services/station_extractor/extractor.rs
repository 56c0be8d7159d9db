//! Station extractor: resolved columns to a station record

use super::metadata::{provenance_from_file, station_identity_from_file};
use crate::app::models::{ParsedFile, Series, StationRecord, VarInfo, VariableRegistry};
use crate::app::services::column_resolver::ColumnResolver;
use crate::config::ProcessorConfig;
use crate::constants::file_meta;
use crate::error::{ObsError, Result};
use tracing::{debug, warn};

/// Builds station records from parsed files
#[derive(Debug, Clone)]
pub struct StationExtractor {
    resolver: ColumnResolver,
    dataset_name: String,
}

impl StationExtractor {
    pub fn new(resolver: ColumnResolver, dataset_name: impl Into<String>) -> Self {
        Self {
            resolver,
            dataset_name: dataset_name.into(),
        }
    }

    /// Create an extractor from the processor configuration
    pub fn from_config(config: &ProcessorConfig) -> Self {
        Self::new(
            ColumnResolver::new(config.resolver.clone()),
            config.dataset_name.clone(),
        )
    }

    pub fn resolver(&self) -> &ColumnResolver {
        &self.resolver
    }

    /// Extract the requested variables of one file into a station record.
    ///
    /// Variables absent from the file are skipped. If none resolves the whole
    /// file is not found; if every resolved column is entirely missing the
    /// file has no usable data. Ambiguity and format errors propagate.
    pub fn extract<S: AsRef<str>>(
        &self,
        file: &ParsedFile,
        vars: &[S],
        registry: &VariableRegistry,
    ) -> Result<StationRecord> {
        file.validate()?;
        let (identity, station_name_orig) = station_identity_from_file(file)?;

        let mut resolved = Vec::new();
        for var in vars {
            let var = var.as_ref();
            let spec = registry.get(var)?;
            match self.resolver.resolve(spec, file) {
                Ok(column) => resolved.push((var, column)),
                Err(e) if e.is_not_found() => debug!("{}", e),
                Err(e) => return Err(e),
            }
        }
        if resolved.is_empty() {
            return Err(ObsError::no_variables_found(
                &file.filename,
                vars.iter().map(|v| v.as_ref().to_string()).collect(),
            ));
        }

        let provenance = provenance_from_file(file, &self.dataset_name, station_name_orig);
        let mut record = StationRecord::new(identity, provenance, file.times.clone());

        for (var, column_idx) in resolved {
            let values = file.column_values(column_idx);
            if values.iter().all(|v| v.is_nan()) {
                warn!(
                    "All values of {} (column {}) are missing in {}, dropping variable",
                    var, column_idx, file.filename
                );
                continue;
            }

            let column = &file.columns[column_idx];
            let info = VarInfo {
                unit: column
                    .unit()
                    .or_else(|| file.meta(file_meta::UNIT))
                    .map(str::to_string),
                matrix: file.effective_matrix(column),
                statistics: file.effective_statistics(column),
                wavelength_nm: column.wavelength_nm(),
            };
            debug!("{} read from column {} of {}", var, column_idx, file.filename);
            record.insert_series(var, Series::flat(values), info);
        }

        if record.contains_vars.is_empty() {
            return Err(ObsError::no_usable_data(&file.filename));
        }
        Ok(record)
    }
}
