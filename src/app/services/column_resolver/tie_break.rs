//! Tie-break cascade for multiple candidate columns
//!
//! Each stage keeps the subset of candidates achieving the best (lowest)
//! rank. Unlisted values rank after every listed one.

use crate::app::models::ParsedFile;

/// Keep the candidates with the lowest key
fn keep_min_by<F>(candidates: &[usize], key: F) -> Vec<usize>
where
    F: Fn(usize) -> usize,
{
    let Some(best) = candidates.iter().map(|&idx| key(idx)).min() else {
        return Vec::new();
    };
    candidates
        .iter()
        .copied()
        .filter(|&idx| key(idx) == best)
        .collect()
}

/// Position of `value` in `preferences`, or `usize::MAX` if unlisted
pub fn preference_rank(value: Option<&str>, preferences: &[String]) -> usize {
    value
        .and_then(|v| preferences.iter().position(|p| p == v))
        .unwrap_or(usize::MAX)
}

/// Keep the candidates whose effective matrix ranks best
pub fn by_matrix(candidates: &[usize], file: &ParsedFile, preferences: &[String]) -> Vec<usize> {
    keep_min_by(candidates, |idx| {
        let matrix = file.effective_matrix(&file.columns[idx]);
        preference_rank(matrix.as_deref(), preferences)
    })
}

/// True if the candidates do not all share one effective matrix
pub fn has_mixed_matrices(candidates: &[usize], file: &ParsedFile) -> bool {
    let mut matrices = candidates
        .iter()
        .map(|&idx| file.effective_matrix(&file.columns[idx]));
    match matrices.next() {
        Some(first) => matrices.any(|m| m != first),
        None => false,
    }
}

/// Keep the candidates whose effective statistic ranks best
pub fn by_statistics(
    candidates: &[usize],
    file: &ParsedFile,
    preferences: &[String],
) -> Vec<usize> {
    keep_min_by(candidates, |idx| {
        let statistic = file.effective_statistics(&file.columns[idx]);
        preference_rank(statistic.as_deref(), preferences)
    })
}

/// Keep the candidates with the fewest missing samples
pub fn by_missing_count(candidates: &[usize], file: &ParsedFile) -> Vec<usize> {
    keep_min_by(candidates, |idx| file.nan_count(idx))
}
