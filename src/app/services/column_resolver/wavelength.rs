//! Wavelength proximity filter

use crate::app::models::ParsedFile;
use crate::constants::column_attr;
use crate::error::{ObsError, Result};
use tracing::debug;

/// Restrict candidates to those nearest a target wavelength.
///
/// Columns outside `[target - tol, target + tol]` are dropped. Of the
/// remaining columns with a wavelength, only those at the minimal absolute
/// distance are kept (ties allowed). Columns without a wavelength attribute
/// pass through. An attribute that cannot be parsed is a format error.
pub fn filter_by_wavelength(
    candidates: &[usize],
    file: &ParsedFile,
    target_nm: f64,
    tol_nm: f64,
) -> Result<Vec<usize>> {
    let mut without_wavelength = Vec::new();
    let mut in_range: Vec<(usize, f64)> = Vec::new();

    for &idx in candidates {
        let column = &file.columns[idx];
        let Some(raw) = column.attr(column_attr::WAVELENGTH) else {
            without_wavelength.push(idx);
            continue;
        };
        let wavelength = column.wavelength_nm().ok_or_else(|| {
            ObsError::file_format(
                &file.filename,
                format!("column {} has unparsable wavelength '{}'", idx, raw),
            )
        })?;
        let distance = (wavelength - target_nm).abs();
        if distance <= tol_nm {
            in_range.push((idx, distance));
        } else {
            debug!(
                "Column {} at {} nm outside {} +/- {} nm",
                idx, wavelength, target_nm, tol_nm
            );
        }
    }

    let closest = in_range
        .iter()
        .map(|(_, d)| *d)
        .fold(f64::INFINITY, f64::min);

    let mut kept: Vec<usize> = in_range
        .into_iter()
        .filter(|(_, d)| *d == closest)
        .map(|(idx, _)| idx)
        .chain(without_wavelength)
        .collect();
    kept.sort_unstable();
    Ok(kept)
}
