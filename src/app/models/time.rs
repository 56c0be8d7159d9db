//! Temporal resolution labels and simple time series

use crate::constants::RESOLUTION_CODES;
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Temporal resolution of a time series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TsType {
    Hourly,
    Daily,
    Monthly,
    Yearly,
}

impl TsType {
    /// Map a file resolution code ("1h", "1d", "1mo") to a resolution
    pub fn from_resolution_code(code: &str) -> Option<Self> {
        RESOLUTION_CODES
            .iter()
            .find(|(c, _)| *c == code.trim())
            .and_then(|(_, label)| label.parse().ok())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TsType::Hourly => "hourly",
            TsType::Daily => "daily",
            TsType::Monthly => "monthly",
            TsType::Yearly => "yearly",
        }
    }

    /// Start of the grid interval containing `t`
    pub fn floor(&self, t: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let (year, month, day, hour) = match self {
            TsType::Hourly => (t.year(), t.month(), t.day(), t.hour()),
            TsType::Daily => (t.year(), t.month(), t.day(), 0),
            TsType::Monthly => (t.year(), t.month(), 1, 0),
            TsType::Yearly => (t.year(), 1, 1, 0),
        };
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .map(|n| n.and_utc())
    }

    /// Next grid point after the grid point `t`
    pub fn step(&self, t: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TsType::Hourly => Some(t + chrono::Duration::hours(1)),
            TsType::Daily => Some(t + chrono::Duration::days(1)),
            TsType::Monthly => {
                let (year, month) = if t.month() == 12 {
                    (t.year() + 1, 1)
                } else {
                    (t.year(), t.month() + 1)
                };
                NaiveDate::from_ymd_opt(year, month, 1)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|n| n.and_utc())
            }
            TsType::Yearly => NaiveDate::from_ymd_opt(t.year() + 1, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|n| n.and_utc()),
        }
    }

    /// Canonical grid covering `[floor(start), floor(end)]`
    pub fn grid(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let mut points = Vec::new();
        let (Some(mut current), Some(last)) = (self.floor(start), self.floor(end)) else {
            return points;
        };
        while current <= last {
            points.push(current);
            match self.step(current) {
                Some(next) => current = next,
                None => break,
            }
        }
        points
    }
}

impl FromStr for TsType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hourly" => Ok(TsType::Hourly),
            "daily" => Ok(TsType::Daily),
            "monthly" => Ok(TsType::Monthly),
            "yearly" => Ok(TsType::Yearly),
            other => Err(format!("Unknown ts_type: {}", other)),
        }
    }
}

impl fmt::Display for TsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values indexed by time stamp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub times: Vec<DateTime<Utc>>,
    pub values: Vec<f64>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: DateTime<Utc>, value: f64) {
        self.times.push(time);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Value at a time stamp (first match)
    pub fn get(&self, time: DateTime<Utc>) -> Option<f64> {
        self.times
            .iter()
            .position(|t| *t == time)
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    /// Sort samples by time, keeping the relative order of equal stamps
    pub fn sort_by_time(&mut self) {
        let mut pairs: Vec<(DateTime<Utc>, f64)> = self.iter().collect();
        pairs.sort_by_key(|(t, _)| *t);
        self.times = pairs.iter().map(|(t, _)| *t).collect();
        self.values = pairs.iter().map(|(_, v)| *v).collect();
    }
}
