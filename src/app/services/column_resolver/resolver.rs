//! Column resolver orchestration

use super::candidates::find_candidates;
use super::tie_break::{by_matrix, by_missing_count, by_statistics, has_mixed_matrices};
use super::wavelength::filter_by_wavelength;
use crate::app::models::{ParsedFile, VariableColumnSpec};
use crate::config::ResolverConfig;
use crate::error::{ObsError, Result};
use tracing::debug;

/// Resolves variable specifications to data columns
#[derive(Debug, Clone, Default)]
pub struct ColumnResolver {
    config: ResolverConfig,
}

impl ColumnResolver {
    /// Create a resolver with the given preferences
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `spec` to exactly one column index of `file`.
    ///
    /// Returns [`ObsError::VariableNotFound`] when no column qualifies and
    /// [`ObsError::ResolutionFailure`] when a unique column is required but
    /// the cascade ends in a tie. Without the uniqueness requirement a
    /// residual tie resolves to the lowest column index.
    ///
    /// Candidates declaring a wavelength need a spec with a target
    /// wavelength ([`ObsError::VariableDefinition`]). Candidates of different
    /// matrices need a matrix preference ([`ObsError::ResolutionFailure`]).
    pub fn resolve(&self, spec: &VariableColumnSpec, file: &ParsedFile) -> Result<usize> {
        file.validate()?;

        let mut candidates = find_candidates(spec, file, &self.config.ignore_statistics);
        debug!(
            "{}: {} candidate column(s) in {}",
            spec.var_name,
            candidates.len(),
            file.filename
        );
        if candidates.is_empty() {
            return Err(ObsError::variable_not_found(&spec.var_name, &file.filename));
        }

        match spec.wavelength_nm {
            Some(target) => {
                let tol = spec.wavelength_tol_nm.unwrap_or(self.config.wavelength_tol_nm);
                candidates = filter_by_wavelength(&candidates, file, target, tol)?;
                if candidates.is_empty() {
                    return Err(ObsError::variable_not_found(&spec.var_name, &file.filename));
                }
            }
            None => {
                let with_wavelength = candidates
                    .iter()
                    .find(|&&idx| file.columns[idx].has_wavelength());
                if let Some(col) = with_wavelength {
                    return Err(ObsError::variable_definition(format!(
                        "Column {} of {} declares a wavelength but variable {} defines none",
                        col, file.filename, spec.var_name
                    )));
                }
            }
        }

        if candidates.len() > 1 {
            match &spec.matrix {
                Some(matrix_prefs) => candidates = by_matrix(&candidates, file, matrix_prefs),
                None if has_mixed_matrices(&candidates, file) => {
                    return Err(ObsError::resolution_failure(
                        &spec.var_name,
                        &file.filename,
                        candidates,
                    ));
                }
                None => {}
            }
        }
        if candidates.len() > 1 {
            let stat_prefs = spec
                .statistics
                .as_ref()
                .unwrap_or(&self.config.prefer_statistics);
            candidates = by_statistics(&candidates, file, stat_prefs);
        }
        if candidates.len() > 1 {
            candidates = by_missing_count(&candidates, file);
        }

        match candidates.as_slice() {
            [] => Err(ObsError::variable_not_found(&spec.var_name, &file.filename)),
            [single] => Ok(*single),
            tied if spec.require_unique => Err(ObsError::resolution_failure(
                &spec.var_name,
                &file.filename,
                tied.to_vec(),
            )),
            // candidates stay in column order through every stage
            tied @ [lowest, ..] => {
                debug!(
                    "{}: columns {:?} tied in {}, using column {}",
                    spec.var_name, tied, file.filename, lowest
                );
                Ok(*lowest)
            }
        }
    }
}
