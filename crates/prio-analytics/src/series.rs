//! Parsing of timestamped value series stored in task metadata.
//!
//! Accepted shapes (as JSON or a JSON-encoded string):
//!
//! ```text
//! [{"ts": "2024-01-01", "value": 3}, ...]    timestamped objects
//! [["2024-01-01T00:00:00Z", 3], ...]         [ts, value] pairs
//! [3, 4, 5]                                  bare values, x = index
//! ```
//!
//! Timestamps become fractional days since the Unix epoch. Entries that do
//! not parse are skipped.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use prio_core::metadata::{Metadata, parse_number};
use serde_json::Value;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// One observation: `x` in days (or index), `y` the value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A parsed series, ordered by `x`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub points: Vec<Point>,
    /// Whether `x` came from timestamps rather than positions.
    pub timestamped: bool,
}

impl Series {
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    #[must_use]
    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    /// Keep only the last `max_len` points.
    #[must_use]
    pub fn truncated(mut self, max_len: usize) -> Self {
        if self.points.len() > max_len {
            let dropped = self.points.len() - max_len;
            tracing::debug!(dropped, max_len, "truncating series");
            self.points.drain(..dropped);
        }
        self
    }

    /// Mean spacing between consecutive `x` values; 1 when undefined.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn step(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if self.points.len() > 1 && last.x > first.x => {
                (last.x - first.x) / (self.points.len() - 1) as f64
            }
            _ => 1.0,
        }
    }
}

/// Series stored under the first of `keys` that yields any point.
#[must_use]
pub fn from_metadata(meta: &Metadata, keys: &[&str]) -> Series {
    keys.iter()
        .filter_map(|key| meta.decoded(key))
        .map(|raw| parse(&raw))
        .find(|series| !series.is_empty())
        .unwrap_or_default()
}

/// Parse a series value in any accepted shape.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn parse(raw: &Value) -> Series {
    let Value::Array(items) = raw else {
        return Series::default();
    };
    let mut timestamped = Vec::new();
    let mut bare = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match item {
            Value::Object(obj) => {
                let ts = obj
                    .get("ts")
                    .or_else(|| obj.get("timestamp"))
                    .or_else(|| obj.get("date"));
                let value = obj.get("value").and_then(parse_number);
                if let (Some(x), Some(y)) = (ts.and_then(parse_timestamp), value) {
                    timestamped.push(Point { x, y });
                }
            }
            Value::Array(pair) if pair.len() >= 2 => {
                if let (Some(x), Some(y)) = (parse_timestamp(&pair[0]), parse_number(&pair[1])) {
                    timestamped.push(Point { x, y });
                }
            }
            other => {
                if let Some(y) = parse_number(other) {
                    bare.push(Point {
                        x: index as f64,
                        y,
                    });
                }
            }
        }
    }

    // Mixed input: timestamped entries win, positions are meaningless next to them.
    if timestamped.is_empty() {
        Series {
            points: bare,
            timestamped: false,
        }
    } else {
        timestamped.sort_by(|a, b| a.x.total_cmp(&b.x));
        Series {
            points: timestamped,
            timestamped: true,
        }
    }
}

/// RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD`, or a number of days.
#[allow(clippy::cast_precision_loss)]
fn parse_timestamp(value: &Value) -> Option<f64> {
    let raw = match value {
        Value::String(s) => s.trim(),
        Value::Number(_) => return parse_number(value),
        _ => return None,
    };
    let seconds = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.timestamp_millis() as f64 / 1000.0
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        dt.and_utc().timestamp_millis() as f64 / 1000.0
    } else if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        date.and_hms_opt(0, 0, 0)?.and_utc().timestamp() as f64
    } else {
        return None;
    };
    Some(seconds / SECONDS_PER_DAY)
}
