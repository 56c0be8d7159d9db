//! Extensible metadata values and metadata comparison

use crate::constants::{IDENTITY_ATOL, station_meta};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A single metadata attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Number(f64),
    Text(String),
    List(Vec<MetaValue>),
}

/// Flattened key/value view of station metadata
pub type MetaMap = BTreeMap<String, MetaValue>;

impl MetaValue {
    /// Text content, if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetaValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Order two values for preference sorting.
    ///
    /// Numbers compare numerically and text lexically; any other pairing is
    /// not comparable.
    pub fn sort_cmp(&self, other: &MetaValue) -> Option<Ordering> {
        match (self, other) {
            (MetaValue::Number(a), MetaValue::Number(b)) => a.partial_cmp(b),
            (MetaValue::Text(a), MetaValue::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Text(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        MetaValue::Number(value)
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Number(v) => write!(f, "{}", v),
            MetaValue::Text(s) => write!(f, "{}", s),
            MetaValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// numpy-style `isclose`: |a - b| <= atol + rtol * |b|
pub fn is_close(a: f64, b: f64, rtol: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        return true;
    }
    (a - b).abs() <= IDENTITY_ATOL + rtol * b.abs()
}

/// Compare one metadata value, using a tolerance for the coordinate keys
pub fn same_meta_value(key: &str, a: &MetaValue, b: &MetaValue, rtol: f64) -> bool {
    if station_meta::NUMERIC_KEYS.contains(&key) {
        if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
            return is_close(x, y, rtol);
        }
    }
    a == b
}

/// Find the first key present in both maps whose values disagree.
///
/// Keys listed in `ignore_keys` are skipped. Keys present in only one of the
/// maps are not conflicts.
pub fn first_shared_conflict<'a>(
    a: &'a MetaMap,
    b: &MetaMap,
    ignore_keys: &[String],
    rtol: f64,
) -> Option<&'a str> {
    a.iter()
        .filter(|(key, _)| !ignore_keys.iter().any(|k| k == *key))
        .find(|(key, value)| {
            b.get(*key)
                .is_some_and(|other| !same_meta_value(key, value, other, rtol))
        })
        .map(|(key, _)| key.as_str())
}

/// True if both maps have the same key set and agree on every non-ignored key
pub fn same_meta_map(a: &MetaMap, b: &MetaMap, ignore_keys: &[String], rtol: f64) -> bool {
    let keys_a: Vec<&String> = a
        .keys()
        .filter(|k| !ignore_keys.contains(*k))
        .collect();
    let keys_b: Vec<&String> = b
        .keys()
        .filter(|k| !ignore_keys.contains(*k))
        .collect();
    keys_a == keys_b && first_shared_conflict(a, b, ignore_keys, rtol).is_none()
}
