//! Lenient, string-keyed metadata bag attached to every task.
//!
//! Method-specific inputs (`risk_prob`, `bv`, `kano_votes`, `deadline_days`,
//! PERT triplets, history series, ...) arrive untyped: numbers may be JSON
//! numbers or numeric strings, lists may be JSON arrays or JSON-encoded
//! strings. Every consumer goes through the accessors here, which return
//! `None` (or the supplied default) instead of failing.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Typed key-value map with parse-or-default accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, Value>);

impl Metadata {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether the key is present with a non-null value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(|v| !v.is_null())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Finite number under `key`, if it parses.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(parse_number)
    }

    /// Finite number under `key`, or `default`.
    #[must_use]
    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        self.number(key).unwrap_or(default)
    }

    /// Truthiness of `key`: `true/1/yes/y/on`, `true`, or any positive number.
    /// Missing or unparseable values are `false`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(parse_flag)
    }

    /// String value under `key` (only when stored as a JSON string).
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Value under `key` with JSON-encoded strings decoded.
    ///
    /// A string that does not decode to JSON is returned as-is.
    #[must_use]
    pub fn decoded(&self, key: &str) -> Option<Value> {
        self.0.get(key).map(decode_value)
    }

    /// Numbers under `key`: a JSON array, a JSON-encoded array, a
    /// comma/semicolon separated string, or a single number. Entries that
    /// fail to parse are dropped.
    #[must_use]
    pub fn number_list(&self, key: &str) -> Vec<f64> {
        match self.decoded(key) {
            Some(Value::Array(items)) => items.iter().filter_map(parse_number).collect(),
            Some(Value::String(raw)) => raw
                .split([',', ';'])
                .filter_map(|part| part.trim().parse::<f64>().ok())
                .filter(|x| x.is_finite())
                .collect(),
            Some(other) => parse_number(&other).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Strings under `key`: a JSON array (non-string items are stringified)
    /// or a comma separated string. Blank entries are dropped.
    #[must_use]
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.decoded(key) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                })
                .filter(|s| !s.is_empty())
                .collect(),
            Some(Value::String(raw)) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// PERT triplet from `{prefix}_o`, `{prefix}_m`, `{prefix}_p`; all three
    /// must parse.
    #[must_use]
    pub fn pert_triplet(&self, prefix: &str) -> Option<(f64, f64, f64)> {
        let o = self.number(&format!("{prefix}_o"))?;
        let m = self.number(&format!("{prefix}_m"))?;
        let p = self.number(&format!("{prefix}_p"))?;
        Some((o, m, p))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Lenient number parse: JSON numbers, numeric strings, booleans as 1/0.
/// Non-finite results are rejected.
#[must_use]
pub fn parse_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|x| x.is_finite())
}

/// Lenient truthiness used for metadata flags.
#[must_use]
pub fn parse_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x > 0.0),
        Value::String(s) => {
            let lowered = s.trim().to_ascii_lowercase();
            matches!(lowered.as_str(), "true" | "yes" | "y" | "on")
                || lowered.parse::<f64>().is_ok_and(|x| x > 0.0)
        }
        _ => false,
    }
}

/// Decode a JSON-encoded string into structured JSON; other values pass through.
#[must_use]
pub fn decode_value(value: &Value) -> Value {
    if let Value::String(raw) = value {
        let trimmed = raw.trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
                return parsed;
            }
        }
    }
    value.clone()
}
