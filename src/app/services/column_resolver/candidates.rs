//! Candidate column filtering

use crate::app::models::{ParsedFile, VariableColumnSpec};

/// Columns that may hold the variable described by `spec`.
///
/// A column qualifies when its component name is accepted, its effective
/// matrix is in the spec's matrix list (if any), and its own statistics
/// attribute is neither ignored nor outside the spec's statistic list. The
/// file-level statistic only takes part in the tie-break, so columns without
/// their own attribute are never rejected here.
pub fn find_candidates(
    spec: &VariableColumnSpec,
    file: &ParsedFile,
    ignore_statistics: &[String],
) -> Vec<usize> {
    file.columns
        .iter()
        .filter(|col| spec.accepts_component(&col.name))
        .filter(|col| match &spec.matrix {
            Some(accepted) => file
                .effective_matrix(col)
                .is_some_and(|m| accepted.contains(&m)),
            None => true,
        })
        .filter(|col| match col.statistics() {
            Some(stat) if ignore_statistics.iter().any(|s| s == stat) => false,
            Some(stat) => spec
                .statistics
                .as_ref()
                .is_none_or(|accepted| accepted.iter().any(|s| s == stat)),
            None => true,
        })
        .map(|col| col.index)
        .collect()
}
