//! Type tags and coercions for dynamic setting values.
//!
//! Settings are stored as `serde_json::Value`. Widgets however want a
//! string, an integer or a double, so every value can be projected onto
//! those representations with the lenient rules below.

use serde_json::Value;

/// The tag of a dynamic value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Null,
    Bool,
    Int,
    Double,
    String,
    Array,
    Dict,
}

impl ValueType {
    /// Whether the type holds other values (array or dict)
    pub fn is_aggregate(self) -> bool {
        matches!(self, ValueType::Array | ValueType::Dict)
    }
}

/// Get the type tag of a value
pub fn value_type(value: &Value) -> ValueType {
    match value {
        Value::Null => ValueType::Null,
        Value::Bool(_) => ValueType::Bool,
        Value::Number(n) if n.is_i64() || n.is_u64() => ValueType::Int,
        Value::Number(_) => ValueType::Double,
        Value::String(_) => ValueType::String,
        Value::Array(_) => ValueType::Array,
        Value::Object(_) => ValueType::Dict,
    }
}

/// Convert a scalar value to its string form.
///
/// Returns `None` for null and aggregate values.
pub fn string_xform(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(if *b { "true" } else { "false" }.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(format_double)
            }
        }
        Value::String(s) => Some(s.clone()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Integer projection of a value
pub fn get_int(value: &Value) -> i64 {
    match value {
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else if let Some(u) = n.as_u64() {
                i64::try_from(u).unwrap_or(i64::MAX)
            } else {
                // `as` saturates and truncates toward zero
                n.as_f64().map(|d| d as i64).unwrap_or(0)
            }
        }
        Value::String(s) => parse_int_prefix(s),
        _ => 0,
    }
}

/// Floating point projection of a value
pub fn get_double(value: &Value) -> f64 {
    match value {
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_double_prefix(s),
        _ => 0.0,
    }
}

/// Boolean projection of a value
pub fn get_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|d| d != 0.0).unwrap_or(false),
        Value::String(s) => {
            let s = s.trim();
            if ["true", "yes", "on"].iter().any(|t| s.eq_ignore_ascii_case(t)) {
                true
            } else if ["false", "no", "off"].iter().any(|t| s.eq_ignore_ascii_case(t)) {
                false
            } else {
                parse_double_prefix(s) != 0.0
            }
        }
        _ => false,
    }
}

/// Shortest decimal form that reads back as the same double.
fn format_double(d: f64) -> String {
    format!("{}", d)
}

/// Parse the leading integer of a string, like C's `strtoll`.
fn parse_int_prefix(s: &str) -> i64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return 0;
    }
    s[..end].parse::<i64>().unwrap_or_else(|_| {
        if bytes[0] == b'-' {
            i64::MIN
        } else {
            i64::MAX
        }
    })
}

/// Parse the leading floating point number of a string, like C's `strtod`.
fn parse_double_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    if let Ok(d) = s.trim_end().parse::<f64>() {
        return d;
    }
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().unwrap_or(0.0)
}
