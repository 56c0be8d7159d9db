//! Merge engine orchestration: input checks and dispatch

use super::flat::{MergeSlots, merge_into, order_inputs, unpack_slots};
use super::profile::{assemble_grid, grid_profile};
use super::regularize::{common_ts_type, input_ts_types, regularize};
use super::{MergeOptions, MergedStation};
use crate::app::models::meta::first_shared_conflict;
use crate::app::models::{Series, SeriesKind, StationRecord, TimeSeries, VarInfo};
use crate::config::MergeConfig;
use crate::constants::station_meta;
use crate::error::{ObsError, Result};
use std::collections::BTreeMap;
use tracing::debug;

/// Merges station groups according to a [`MergeConfig`]
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    config: MergeConfig,
}

impl MergeEngine {
    pub fn new(config: MergeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Merge the records of one station group for variable `var`
    pub fn merge(
        &self,
        inputs: &[StationRecord],
        var: &str,
        opts: &MergeOptions,
    ) -> Result<MergedStation> {
        let kind = self.check_inputs(inputs, var, opts)?;
        let prefer_largest = opts.prefer_largest.unwrap_or(self.config.prefer_largest);
        let ordered = order_inputs(inputs, var, opts.pref_attr.as_deref(), prefer_largest)?;

        debug!(
            "Merging {} input(s) of {} for station {}",
            ordered.len(),
            var,
            inputs[0].station_name()
        );
        match kind {
            SeriesKind::Flat => self.merge_flat(&ordered, var, opts),
            _ => self.merge_profiles(&ordered, var, opts),
        }
    }

    /// Validate a merge group; returns the shared series kind
    fn check_inputs(
        &self,
        inputs: &[StationRecord],
        var: &str,
        opts: &MergeOptions,
    ) -> Result<SeriesKind> {
        let Some(first) = inputs.first() else {
            return Err(ObsError::data_coverage(format!(
                "No station data given for merging {}",
                var
            )));
        };

        let mut kind = None;
        for record in inputs {
            let Some(series) = record.series(var) else {
                return Err(ObsError::data_coverage(format!(
                    "Variable {} missing in input {} of station {}",
                    var,
                    record.provenance.filename.as_deref().unwrap_or("<unknown>"),
                    record.station_name()
                )));
            };
            match (kind, series.kind()) {
                (_, SeriesKind::Grid) => {
                    return Err(ObsError::configuration(format!(
                        "Variable {} is already merged onto a grid",
                        var
                    )));
                }
                (None, k) => kind = Some(k),
                (Some(k), other) if k != other => {
                    return Err(ObsError::configuration(format!(
                        "Cannot merge flat and profile data of {} for station {}",
                        var,
                        record.station_name()
                    )));
                }
                _ => {}
            }
            first
                .identity
                .check_same_site(&record.identity, self.config.identity_rtol)?;
        }

        let units: Vec<&str> = inputs
            .iter()
            .filter_map(|r| r.var_info.get(var).and_then(|info| info.unit.as_deref()))
            .collect();
        if let Some(other) = units.iter().find(|u| **u != units[0]) {
            return Err(ObsError::meta_data(format!(
                "Inputs of {} have different units: {} vs {}",
                var, units[0], other
            )));
        }

        let mut ignore = opts
            .ignore_meta_keys
            .clone()
            .unwrap_or_else(|| self.config.ignore_meta_keys.clone());
        ignore.extend(station_meta::IDENTITY_KEYS.iter().map(|k| k.to_string()));
        // the preference attribute is expected to differ between inputs
        ignore.extend(opts.pref_attr.clone());

        let maps: Vec<_> = inputs.iter().map(StationRecord::meta_map).collect();
        for (i, a) in maps.iter().enumerate() {
            for b in &maps[i + 1..] {
                if let Some(key) = first_shared_conflict(a, b, &ignore, self.config.identity_rtol) {
                    return Err(ObsError::meta_data(format!(
                        "Conflicting metadata {} for station {}: {:?} vs {:?}",
                        key,
                        first.station_name(),
                        a.get(key),
                        b.get(key)
                    )));
                }
            }
        }

        kind.ok_or_else(|| ObsError::data_coverage(format!("No data for {}", var)))
    }

    fn base_record(
        ordered: &[&StationRecord],
        var: &str,
        times: Vec<chrono::DateTime<chrono::Utc>>,
    ) -> (StationRecord, VarInfo) {
        // metadata of the most preferred input
        let base = ordered[ordered.len() - 1];
        let info = base.var_info.get(var).cloned().unwrap_or_default();
        (
            StationRecord::new(base.identity.clone(), base.provenance.clone(), times),
            info,
        )
    }

    fn source_files(ordered: &[&StationRecord]) -> Vec<String> {
        ordered
            .iter()
            .filter_map(|r| r.provenance.filename.clone())
            .collect()
    }

    fn merge_flat(
        &self,
        ordered: &[&StationRecord],
        var: &str,
        opts: &MergeOptions,
    ) -> Result<MergedStation> {
        let mut slots = MergeSlots::new();
        let mut overlap = TimeSeries::new();
        for record in ordered {
            merge_into(&mut slots, &mut overlap, record, var)?;
        }

        let ts_type = match &opts.ts_types {
            Some(labels) => Some(common_ts_type(labels, ordered.len())?),
            None if opts.fill_missing => {
                let labels = input_ts_types(ordered)?;
                Some(common_ts_type(&labels, labels.len())?)
            }
            None => None,
        };
        if let Some(common) = ts_type {
            slots = regularize(slots, common, &mut overlap)?;
        }
        overlap.sort_by_time();

        let with_errors = ordered
            .iter()
            .any(|r| r.series(var).is_some_and(Series::has_errors));
        let (times, values, errors) = unpack_slots(slots, with_errors);

        let (mut station, info) = Self::base_record(ordered, var, times);
        if ts_type.is_some() {
            station.provenance.ts_type = ts_type;
        }
        station.insert_series(var, Series::Flat { values, errors }, info);

        Ok(MergedStation {
            station,
            overlap: BTreeMap::from([(var.to_string(), overlap)]),
            source_files: Self::source_files(ordered),
            merged_count: ordered.len(),
        })
    }

    fn merge_profiles(
        &self,
        ordered: &[&StationRecord],
        var: &str,
        opts: &MergeOptions,
    ) -> Result<MergedStation> {
        if opts.ts_types.is_some() {
            return Err(ObsError::configuration(format!(
                "Temporal regularization is not supported for profile data of {}",
                var
            )));
        }
        if opts.fill_missing {
            debug!("Profiles of {} are not regularized; fill_missing ignored", var);
        }

        let levels = opts
            .vertical_levels
            .clone()
            .unwrap_or_else(|| self.config.vertical_grid.levels());
        if levels.is_empty() {
            return Err(ObsError::configuration("Vertical grid has no levels"));
        }

        let profiles = ordered
            .iter()
            .map(|record| grid_profile(record, var, &levels))
            .collect::<Result<Vec<_>>>()?;
        let (times, values, errors) = assemble_grid(&profiles, levels.len());

        let (mut station, info) = Self::base_record(ordered, var, times);
        station.insert_series(
            var,
            Series::Grid {
                altitudes: levels,
                values,
                errors,
            },
            info,
        );

        Ok(MergedStation {
            station,
            overlap: BTreeMap::new(),
            source_files: Self::source_files(ordered),
            merged_count: ordered.len(),
        })
    }
}
