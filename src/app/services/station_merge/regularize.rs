//! Reindexing of merged series onto a canonical time grid

use super::flat::MergeSlots;
use crate::app::models::{StationRecord, TimeSeries, TsType};
use crate::error::{ObsError, Result};

/// Common resolution of all inputs; labels must agree
pub fn common_ts_type(ts_types: &[TsType], num_inputs: usize) -> Result<TsType> {
    if ts_types.len() != num_inputs {
        return Err(ObsError::configuration(format!(
            "{} temporal resolutions given for {} inputs",
            ts_types.len(),
            num_inputs
        )));
    }
    let Some(&first) = ts_types.first() else {
        return Err(ObsError::configuration("No temporal resolution given"));
    };
    if let Some(other) = ts_types.iter().find(|t| **t != first) {
        return Err(ObsError::meta_data(format!(
            "Inputs have different temporal resolutions: {} vs {}",
            first, other
        )));
    }
    Ok(first)
}

/// Resolution recorded in each input's provenance
pub fn input_ts_types(inputs: &[&StationRecord]) -> Result<Vec<TsType>> {
    inputs
        .iter()
        .map(|record| {
            record.provenance.ts_type.ok_or_else(|| {
                ObsError::meta_data(format!(
                    "Input {} of station {} has no temporal resolution",
                    record.provenance.filename.as_deref().unwrap_or("<unknown>"),
                    record.station_name()
                ))
            })
        })
        .collect()
}

/// Move merged slots onto the grid of `ts_type`.
///
/// Each time stamp is floored onto its grid slot. When several valid samples
/// share a slot the earliest is kept and the others go to `overlap`. Grid
/// points without data are filled with missing markers.
pub fn regularize(slots: MergeSlots, ts_type: TsType, overlap: &mut TimeSeries) -> Result<MergeSlots> {
    let (Some(first), Some(last)) = (
        slots.keys().next().copied(),
        slots.keys().next_back().copied(),
    ) else {
        return Ok(slots);
    };

    let mut gridded: MergeSlots = ts_type
        .grid(first, last)
        .into_iter()
        .map(|t| (t, (f64::NAN, None)))
        .collect();

    for (time, (value, error)) in slots {
        let slot_time = ts_type.floor(time).ok_or_else(|| {
            ObsError::data_coverage(format!("Time stamp {} cannot be placed on a {} grid", time, ts_type))
        })?;
        let Some(slot) = gridded.get_mut(&slot_time) else {
            return Err(ObsError::data_coverage(format!(
                "Time stamp {} outside the {} grid",
                time, ts_type
            )));
        };
        if slot.0.is_nan() {
            *slot = (value, error);
        } else if !value.is_nan() {
            overlap.push(time, value);
        }
    }
    Ok(gridded)
}
