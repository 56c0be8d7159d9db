//! Preference-ordered merging of flat time series

use crate::app::models::{MetaValue, Series, StationRecord, TimeSeries};
use crate::error::{ObsError, Result};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Running merge result: value and optional error per time stamp
pub type MergeSlots = BTreeMap<DateTime<Utc>, (f64, Option<f64>)>;

/// Order inputs from least to most preferred.
///
/// Sorting is ascending by the preference attribute if given, else by the
/// number of valid samples of `var`; the sort is stable. With
/// `prefer_largest` the ascending order is kept so the largest key is
/// applied last and wins. Otherwise the order is reversed.
pub fn order_inputs<'a>(
    inputs: &'a [StationRecord],
    var: &str,
    pref_attr: Option<&str>,
    prefer_largest: bool,
) -> Result<Vec<&'a StationRecord>> {
    let mut ordered: Vec<&StationRecord> = inputs.iter().collect();

    match pref_attr {
        Some(attr) => {
            let mut keyed: Vec<(MetaValue, &StationRecord)> = Vec::with_capacity(ordered.len());
            for record in ordered {
                let value = record.get_meta(attr).ok_or_else(|| {
                    ObsError::meta_data(format!(
                        "Preference attribute {} missing in {}",
                        attr,
                        record.provenance.filename.as_deref().unwrap_or(record.station_name())
                    ))
                })?;
                keyed.push((value, record));
            }
            for pair in keyed.windows(2) {
                if pair[0].0.sort_cmp(&pair[1].0).is_none() {
                    return Err(ObsError::meta_data(format!(
                        "Values of preference attribute {} cannot be compared: {} vs {}",
                        attr, pair[0].0, pair[1].0
                    )));
                }
            }
            keyed.sort_by(|a, b| a.0.sort_cmp(&b.0).unwrap_or(Ordering::Equal));
            ordered = keyed.into_iter().map(|(_, record)| record).collect();
        }
        None => {
            ordered.sort_by_key(|record| {
                record.series(var).map(Series::count_valid).unwrap_or(0)
            });
        }
    }

    if !prefer_largest {
        ordered.reverse();
    }
    Ok(ordered)
}

/// Fold one flat input into the running result.
///
/// A valid incoming value replaces the stored one; a replaced valid value is
/// recorded in `overlap`. Missing incoming values never displace data.
pub fn merge_into(
    slots: &mut MergeSlots,
    overlap: &mut TimeSeries,
    record: &StationRecord,
    var: &str,
) -> Result<()> {
    let Some(Series::Flat { values, errors }) = record.series(var) else {
        return Err(ObsError::configuration(format!(
            "Variable {} of {} is not a flat series",
            var,
            record.station_name()
        )));
    };

    for (i, (time, value)) in record.times.iter().zip(values).enumerate() {
        let error = errors.as_ref().and_then(|e| e.get(i).copied());
        match slots.get(time) {
            Some((existing, _)) if !existing.is_nan() => {
                if value.is_nan() {
                    continue;
                }
                overlap.push(*time, *existing);
                slots.insert(*time, (*value, error));
            }
            _ => {
                slots.insert(*time, (*value, error));
            }
        }
    }
    Ok(())
}

/// Split merge slots into time, value and error vectors
pub fn unpack_slots(slots: MergeSlots, with_errors: bool) -> (Vec<DateTime<Utc>>, Vec<f64>, Option<Vec<f64>>) {
    let mut times = Vec::with_capacity(slots.len());
    let mut values = Vec::with_capacity(slots.len());
    let mut errors = Vec::with_capacity(if with_errors { slots.len() } else { 0 });
    for (time, (value, error)) in slots {
        times.push(time);
        values.push(value);
        if with_errors {
            errors.push(error.unwrap_or(f64::NAN));
        }
    }
    (times, values, with_errors.then_some(errors))
}
