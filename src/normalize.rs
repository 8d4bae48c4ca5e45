//! Defensive field normalization for agent output.
//!
//! The agents do not promise consistent types: a list of competitors may arrive
//! as a JSON array, as a string containing an encoded array, or not at all.
//! [`safe_parse`] turns any of those into a value of the expected shape or the
//! caller's fallback, and reports which one it produced.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

// Thousands-grouped amounts first, then a plain amount with `.` or `,` decimals.
static PRICE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:[.,]\d+)?").unwrap());

/// Outcome of [`safe_parse`].
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// The input (or its decoded form) was usable.
    Value(Value),
    /// The input was absent or unusable; this is the caller's fallback.
    Fallback(Value),
}

impl Parsed {
    pub fn into_value(self) -> Value {
        match self {
            Parsed::Value(v) | Parsed::Fallback(v) => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Parsed::Fallback(_))
    }
}

fn same_shape(a: &Value, b: &Value) -> bool {
    matches!(
        (a, b),
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_))
    )
}

/// Coerce `value` toward the shape of `fallback`.
///
/// - absent or `null` → fallback
/// - string → JSON-decoded value when it decodes to the fallback's shape, else fallback
/// - array/object → passed through unchanged
/// - anything else → passed through as is
pub fn safe_parse(value: Option<&Value>, fallback: Value) -> Parsed {
    match value {
        None | Some(Value::Null) => Parsed::Fallback(fallback),
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(decoded) if same_shape(&decoded, &fallback) => Parsed::Value(decoded),
            Ok(_) | Err(_) => {
                tracing::debug!(len = raw.len(), "string field did not decode to expected shape");
                Parsed::Fallback(fallback)
            }
        },
        Some(other) => Parsed::Value(other.clone()),
    }
}

/// Normalize a field expected to hold a list.
pub fn parse_list(value: Option<&Value>) -> Vec<Value> {
    match safe_parse(value, Value::Array(Vec::new())).into_value() {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

/// Normalize a field expected to hold an object.
pub fn parse_object(value: Option<&Value>) -> Map<String, Value> {
    match safe_parse(value, Value::Object(Map::new())).into_value() {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Normalize a list field and render each entry as display text.
///
/// Objects are reduced to their `name` (or `title`) field when present.
pub fn parse_string_list(value: Option<&Value>) -> Vec<String> {
    parse_list(value)
        .iter()
        .filter_map(display_text)
        .filter(|s| !s.trim().is_empty())
        .collect()
}

/// Render a scalar (or named object) as text. Returns `None` for null.
pub fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => ["name", "title", "file_name", "filename"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .or_else(|| Some(value.to_string())),
        Value::Array(_) => Some(value.to_string()),
    }
}

/// Read a text field from an object, `None` when missing or blank.
pub fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(display_text)
        .filter(|s| !s.trim().is_empty())
}

/// The first amount in `text`: `"$15-$49"` is 15, `"19,99"` is 19.99 and
/// `"$1,299"` is 1299.
fn first_amount(text: &str) -> Option<f64> {
    let token = PRICE_REGEX.find(text)?.as_str();
    let normalized = if token.matches(',').count() == 1 && !token.contains('.') {
        match token.split_once(',') {
            Some((_, decimals)) if decimals.len() != 3 => token.replace(',', "."),
            _ => token.replace(',', ""),
        }
    } else {
        token.replace(',', "")
    };
    normalized.parse().ok()
}

/// Read a price that may be a number or a string such as `"$19.99"`.
pub fn parse_price(value: Option<&Value>) -> f64 {
    let price = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => first_amount(s).unwrap_or(0.0),
        _ => 0.0,
    };
    if price.is_finite() && price >= 0.0 {
        price
    } else {
        0.0
    }
}
