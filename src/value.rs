/// QueryFrame cell values
///
/// A `FieldValue` is the dynamically typed content of one cell. Query
/// responses arrive as JSON, so every cell can hold any scalar, a timestamp
/// or an opaque document; the declared `FieldType` of the owning field says
/// how the column should be interpreted, not what each cell must contain.
///
/// Text and numeric coercions follow the rules the dashboard front end has
/// always applied, so display output stays byte-compatible:
///
/// - `Null` renders as the empty string and coerces to `NaN`
/// - whole numbers render without a fractional part (`1`, not `1.0`)
/// - non-finite numbers render as `NaN`, `Infinity` and `-Infinity`
/// - booleans coerce to `1` / `0`
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// 2^53, the end of the range where every integer is an exact `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Time(DateTime<Utc>),
    /// Arrays, objects and anything else without a scalar interpretation
    Other(Value),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<&DateTime<Utc>> {
        match self {
            FieldValue::Time(v) => Some(v),
            _ => None,
        }
    }

    /// Coerce to a number, `NaN` when there is no numeric reading.
    pub fn to_number(&self) -> f64 {
        match self {
            FieldValue::Number(v) => *v,
            FieldValue::Bool(true) => 1.0,
            FieldValue::Bool(false) => 0.0,
            FieldValue::String(s) => parse_number(s),
            FieldValue::Time(t) => t.timestamp_millis() as f64,
            FieldValue::Null | FieldValue::Other(_) => f64::NAN,
        }
    }

    /// Default text conversion used when nothing formats the value.
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(v) => v.to_string(),
            FieldValue::Number(v) => format_number(*v),
            FieldValue::String(s) => s.clone(),
            FieldValue::Time(t) => t.to_rfc3339(),
            FieldValue::Other(v) => json_to_text(v),
        }
    }

    /// Plain JSON form. Whole numbers within the exact integer range are
    /// written as JSON integers, non-finite numbers become `null`, times
    /// become epoch milliseconds.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(v) => Value::Bool(*v),
            FieldValue::Number(v) if v.fract() == 0.0 && v.abs() < MAX_SAFE_INTEGER => Value::from(*v as i64),
            FieldValue::Number(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::Time(t) => Value::from(t.timestamp_millis()),
            FieldValue::Other(v) => v.clone(),
        }
    }

    /// Interpret the value as a point in time: a timestamp, epoch
    /// milliseconds, or an RFC 3339 / numeric string.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Time(t) => Some(*t),
            FieldValue::Number(ms) => millis_to_datetime(*ms),
            FieldValue::String(s) => DateTime::parse_from_rfc3339(s.trim())
                .map(|d| d.with_timezone(&Utc))
                .ok()
                .or_else(|| millis_to_datetime(parse_number(s))),
            _ => None,
        }
    }
}

pub(crate) fn millis_to_datetime(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() {
        return None;
    }
    Utc.timestamp_millis_opt(ms.round() as i64).single()
}

/// Render a number the way `String(number)` does.
pub fn format_number(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if v == 0.0 {
        return "0".to_string();
    }

    let abs = v.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let s = format!("{:e}", v);
        return match s.split_once('e') {
            Some((mantissa, exp)) if exp.starts_with('-') => format!("{}e{}", mantissa, exp),
            Some((mantissa, exp)) => format!("{}e+{}", mantissa, exp),
            None => s,
        };
    }
    format!("{}", v)
}

/// Strict numeric parse of a whole string. Surrounding whitespace is
/// ignored; the empty string is `NaN`.
pub fn parse_number(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return f64::NAN;
    }
    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let lower = t.to_ascii_lowercase();
    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = lower.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix)
                .map(|n| n as f64)
                .unwrap_or(f64::NAN);
        }
    }

    let plausible = t
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !plausible {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

/// Lenient numeric parse of the longest numeric prefix, `NaN` when there is
/// none (`"12px"` is `12`, `"px"` is `NaN`).
pub fn parse_float_prefix(s: &str) -> f64 {
    let t = s.trim_start();
    if t.starts_with("Infinity") || t.starts_with("+Infinity") {
        return f64::INFINITY;
    }
    if t.starts_with("-Infinity") {
        return f64::NEG_INFINITY;
    }

    let bytes = t.as_bytes();
    let mut end = 0;
    if end < bytes.len() && matches!(bytes[end], b'+' | b'-') {
        end += 1;
    }
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return f64::NAN;
    }

    // Only consume an exponent when it is complete.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    t[..end].parse::<f64>().unwrap_or(f64::NAN)
}

fn json_to_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| FieldValue::from(item.clone()).to_text())
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
        other => FieldValue::from(other.clone()).to_text(),
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or(FieldValue::Null),
            Value::String(s) => FieldValue::String(s),
            other => FieldValue::Other(other),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Number(v as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Number(v as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::Time(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(FieldValue::from)
    }
}
