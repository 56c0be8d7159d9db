//! Vertical profile interpolation and grid assembly

use crate::app::models::{Series, StationRecord};
use crate::error::{ObsError, Result};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Linearly interpolate a profile onto `levels`.
///
/// Levels outside the native altitude range are missing; there is no
/// extrapolation. Native levels with a missing altitude are ignored.
pub fn interpolate_profile(altitudes: &[f64], values: &[f64], levels: &[f64]) -> Vec<f64> {
    let mut native: Vec<(f64, f64)> = altitudes
        .iter()
        .copied()
        .zip(values.iter().copied())
        .filter(|(alt, _)| !alt.is_nan())
        .collect();
    native.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    let (Some(&(lowest, _)), Some(&(highest, _))) = (native.first(), native.last()) else {
        return vec![f64::NAN; levels.len()];
    };

    levels
        .iter()
        .map(|&level| {
            if level < lowest || level > highest {
                return f64::NAN;
            }
            let upper = native.partition_point(|(alt, _)| *alt < level);
            let (alt_hi, val_hi) = native[upper];
            if alt_hi == level || upper == 0 {
                return val_hi;
            }
            let (alt_lo, val_lo) = native[upper - 1];
            val_lo + (val_hi - val_lo) * (level - alt_lo) / (alt_hi - alt_lo)
        })
        .collect()
}

/// One interpolated input: time stamp, values and optional errors on the grid
pub struct GriddedProfile {
    pub time: DateTime<Utc>,
    pub values: Vec<f64>,
    pub errors: Option<Vec<f64>>,
}

/// Interpolate the profile of `var` in one record onto `levels`
pub fn grid_profile(record: &StationRecord, var: &str, levels: &[f64]) -> Result<GriddedProfile> {
    let [time] = record.times.as_slice() else {
        return Err(ObsError::data_coverage(format!(
            "Profile of {} at {} has {} time stamps, expected exactly one",
            var,
            record.station_name(),
            record.times.len()
        )));
    };
    let Some(Series::Profile {
        altitudes,
        values,
        errors,
    }) = record.series(var)
    else {
        return Err(ObsError::configuration(format!(
            "Variable {} of {} is not a vertical profile",
            var,
            record.station_name()
        )));
    };

    Ok(GriddedProfile {
        time: *time,
        values: interpolate_profile(altitudes, values, levels),
        errors: errors
            .as_ref()
            .map(|errors| interpolate_profile(altitudes, errors, levels)),
    })
}

/// Assemble profiles into `[level][time]` arrays over their distinct times.
///
/// Profiles are applied in the given order; a later profile at the same time
/// overwrites every level where it has data.
pub fn assemble_grid(
    profiles: &[GriddedProfile],
    num_levels: usize,
) -> (Vec<DateTime<Utc>>, Vec<Vec<f64>>, Option<Vec<Vec<f64>>>) {
    let mut times: Vec<DateTime<Utc>> = profiles.iter().map(|p| p.time).collect();
    times.sort();
    times.dedup();

    let with_errors = profiles.iter().any(|p| p.errors.is_some());
    let mut values = vec![vec![f64::NAN; times.len()]; num_levels];
    let mut errors = vec![vec![f64::NAN; times.len()]; if with_errors { num_levels } else { 0 }];

    for profile in profiles {
        let Ok(col) = times.binary_search(&profile.time) else {
            continue;
        };
        for (level, value) in profile.values.iter().enumerate() {
            if value.is_nan() {
                continue;
            }
            values[level][col] = *value;
            if let Some(profile_errors) = &profile.errors {
                errors[level][col] = profile_errors[level];
            }
        }
    }
    (times, values, with_errors.then_some(errors))
}
