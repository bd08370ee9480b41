/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The data context IF conditions are evaluated against.
//!
//! The context is a read-only JSON value. Values are looked up by dotted
//! path and coerced to strings or numbers with the same rules a JavaScript
//! host applies, since template authors write conditions against those
//! renderings (`"undefined"` for a missing key, `"1,2"` for an array, ...).

use serde_json::Value;

/// A read-only data context.
#[derive(Debug, Clone, PartialEq)]
pub struct DataContext {
    root: Value,
}

impl Default for DataContext {
    fn default() -> Self {
        Self::new(Value::Object(serde_json::Map::new()))
    }
}

impl DataContext {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Decode a context from JSON text.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json).map(Self::new)
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Resolve a dotted path such as `step.question`.
    ///
    /// Object segments are keys; array segments are decimal indices. Any
    /// missing segment makes the whole lookup `None` (undefined).
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.root;
        for segment in path.split('.') {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

/// String rendering of a possibly-undefined value.
pub fn to_display_string(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(value) => value_to_string(value),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => value_to_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn number_to_string(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) => format_f64(f),
        None => n.to_string(),
    }
}

fn format_f64(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        let sign = if f > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if f == f.trunc() && f.abs() < 1e21 {
        // Integral floats render without a fractional part.
        format!("{}", f as i128)
    } else if f.abs() < 1e-6 || f.abs() >= 1e21 {
        let formatted = format!("{:e}", f);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        }
    } else {
        format!("{}", f)
    }
}

/// Numeric rendering of a possibly-undefined value.
///
/// Returns NaN for values with no numeric reading.
pub fn to_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => string_to_number(s),
        // Arrays go through their string rendering: `[]` and `[null]` are
        // blank, `["7"]` is "7", `[1, 2]` is "1,2".
        Some(array @ Value::Array(_)) => string_to_number(&value_to_string(array)),
        Some(Value::Object(_)) => f64::NAN,
    }
}

/// Parse a string the way a numeric conversion of text does: surrounding
/// whitespace is ignored, blank text is zero, anything else non-numeric is
/// NaN.
pub fn string_to_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix)
                .map(|n| n as f64)
                .unwrap_or(f64::NAN);
        }
    }

    // Rust's float parser also accepts "inf", "nan" and friends; only
    // decimal notation is numeric here.
    let decimal = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !decimal {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}
