use chrono::{NaiveDate, NaiveDateTime};
use serde::ser::Serializer;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Canonical scalar form of a raw result cell.
///
/// Every cell that enters the pipeline is normalized exactly once; the
/// plotting backend only ever sees these variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Temporal(NaiveDateTime),
    Bool(bool),
    Text(String),
    /// Canonical marker for null/undefined/unmapped cells.
    Missing,
}

/// Datetime formats accepted as "ISO-like". Tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Normalize a raw JSON cell into a canonical scalar.
///
/// Total: malformed input falls back to text pass-through, never errors.
pub fn normalize(raw: &serde_json::Value) -> Value {
    match raw {
        serde_json::Value::Null => Value::Missing,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) => Value::Number(f),
            None => Value::Text(n.to_string()),
        },
        serde_json::Value::String(s) => normalize_str(s),
        // Arrays/objects have no scalar form; keep their JSON text.
        other => Value::Text(other.to_string()),
    }
}

fn normalize_str(s: &str) -> Value {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Value::Text(s.to_string());
    }
    if let Some(ts) = parse_temporal(trimmed) {
        return Value::Temporal(ts);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return Value::Number(f);
        }
    }
    Value::Text(s.to_string())
}

fn parse_temporal(s: &str) -> Option<NaiveDateTime> {
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    None
}

impl Value {
    /// Numeric view used by stacking/percent math. Temporal values are not
    /// y-measures, so only true numbers qualify.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Position on a continuous axis: numbers as-is, timestamps as epoch
    /// milliseconds. Text and missing values have no continuous position.
    pub fn axis_position(&self) -> Option<f64> {
        match self {
            Value::Number(f) => Some(*f),
            Value::Temporal(ts) => Some(ts.and_utc().timestamp_millis() as f64),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Ordering used by sortX: continuous positions compare numerically,
    /// everything else by display text. Missing sorts first.
    pub fn cmp_axis(&self, other: &Value) -> Ordering {
        match (self.axis_position(), other.axis_position()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => match (self.is_missing(), other.is_missing()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => self.to_string().cmp(&other.to_string()),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Temporal(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Text(s) => write!(f, "{}", s),
            Value::Missing => Ok(()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Temporal(ts) => {
                serializer.serialize_str(&ts.format("%Y-%m-%dT%H:%M:%S").to_string())
            }
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Missing => serializer.serialize_none(),
        }
    }
}
