//! Sweep-variable tags.
//!
//! Every scenario update function returns the tags it contributes. The tags of a simulation are
//! the union of the tags of its update functions, and analyzers attach them to every row of the
//! simulation's table so rows can be grouped by sweep point later.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

/// The tags of a simulation, keyed by sweep-variable name.
pub type Tags = BTreeMap<String, TagValue>;

/// The name of the replicate sweep variable. Aggregation averages over it.
pub const RUN_NUMBER: &str = "Run_Number";

/// A single tag value.
///
/// Integers and floats compare numerically with each other (so a tag written as `1` and read back
/// as `1.0` lands in the same group); strings sort after all numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl TagValue {
    /// Parses a table cell, preferring integers, then floats, then falling back to a string.
    #[must_use]
    pub fn parse(cell: &str) -> TagValue {
        let trimmed = cell.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return TagValue::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return TagValue::Float(f);
        }
        TagValue::Str(cell.to_string())
    }

    /// Converts a scalar JSON value. Arrays, objects and null have no tag representation.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<TagValue> {
        match value {
            Value::Bool(b) => Some(TagValue::Int(i64::from(*b))),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(TagValue::Int(i)),
                None => n.as_f64().map(TagValue::Float),
            },
            Value::String(s) => Some(TagValue::Str(s.clone())),
            _ => None,
        }
    }

    /// The numeric value of this tag, if it has one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            TagValue::Int(i) => Some(*i as f64),
            TagValue::Float(f) => Some(*f),
            TagValue::Str(_) => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// `-0.0` and `0.0` must hash and compare the same.
    fn normalized(f: f64) -> f64 {
        if f == 0.0 {
            0.0
        } else {
            f
        }
    }
}

impl PartialEq for TagValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TagValue {}

impl PartialOrd for TagValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TagValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (TagValue::Int(a), TagValue::Int(b)) => a.cmp(b),
            (TagValue::Str(a), TagValue::Str(b)) => a.cmp(b),
            (TagValue::Str(_), _) => Ordering::Greater,
            (_, TagValue::Str(_)) => Ordering::Less,
            (TagValue::Int(a), TagValue::Float(b)) => cmp_int_float(*a, *b),
            (TagValue::Float(a), TagValue::Int(b)) => cmp_int_float(*b, *a).reverse(),
            (TagValue::Float(a), TagValue::Float(b)) => {
                TagValue::normalized(*a).total_cmp(&TagValue::normalized(*b))
            }
        }
    }
}

/// Exact comparison of an integer with a float, without rounding `i` to the nearest `f64`.
/// `NaN` sorts after every integer.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() || f >= TWO_POW_63 {
        return Ordering::Less;
    }
    if f < -TWO_POW_63 {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal if f > whole => Ordering::Less,
        Ordering::Equal if f < whole => Ordering::Greater,
        ordering => ordering,
    }
}

impl Hash for TagValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            TagValue::Str(s) => {
                1u8.hash(state);
                s.hash(state);
            }
            numeric => {
                0u8.hash(state);
                let f = TagValue::normalized(numeric.as_f64().unwrap_or(f64::NAN));
                f.to_bits().hash(state);
            }
        }
    }
}

impl Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Int(i) => write!(f, "{i}"),
            // Keep a trailing `.0` on integral floats so the column reads back as a float.
            TagValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{v:.1}")
            }
            TagValue::Float(v) => write!(f, "{v}"),
            TagValue::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Int(value)
    }
}

impl From<i32> for TagValue {
    fn from(value: i32) -> Self {
        TagValue::Int(i64::from(value))
    }
}

impl From<u32> for TagValue {
    fn from(value: u32) -> Self {
        TagValue::Int(i64::from(value))
    }
}

impl From<u64> for TagValue {
    fn from(value: u64) -> Self {
        TagValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<usize> for TagValue {
    fn from(value: usize) -> Self {
        TagValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        TagValue::Float(value)
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Str(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Str(value)
    }
}

impl From<&TagValue> for Value {
    fn from(tag: &TagValue) -> Self {
        match tag {
            TagValue::Int(i) => Value::from(*i),
            TagValue::Float(f) => Value::from(*f),
            TagValue::Str(s) => Value::from(s.clone()),
        }
    }
}

/// Builds a `Tags` map from `(name, value)` pairs.
///
/// ```
/// use vgsweep::sweep::tags;
/// let t = tags([("Coverage", 0.6.into()), ("Label", "No_nets".into())]);
/// assert_eq!(t.len(), 2);
/// ```
pub fn tags<const N: usize>(pairs: [(&str, TagValue); N]) -> Tags {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}
