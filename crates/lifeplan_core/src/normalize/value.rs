//! JSON coercion primitives for schema repair.
//!
//! # Responsibility
//! - Coerce arbitrary JSON values into the primitive shapes the document
//!   model expects, with permissive per-call-site fallbacks.
//!
//! # Invariants
//! - Coercion never fails; unusable input degrades to the caller's default.
//! - Blank strings never count as ids.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde_json::Value;

static NULL: Value = Value::Null;

/// Borrows `key` from an object value; `Null` when absent or not an object.
pub(crate) fn field<'a>(value: &'a Value, key: &str) -> &'a Value {
    match value {
        Value::Object(map) => map.get(key).unwrap_or(&NULL),
        _ => &NULL,
    }
}

/// Borrows the elements of an array value; empty otherwise.
pub(crate) fn array(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or(&[])
}

/// Stringifies scalars; `default` for null and containers.
pub(crate) fn string_or(value: &Value, default: &str) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => default.to_string(),
    }
}

pub(crate) fn string_or_empty(value: &Value) -> String {
    string_or(value, "")
}

/// Numeric coercion: numbers pass through, numeric strings parse, bools map
/// to 0/1. Everything else, and non-finite results, fall back to `default`.
pub(crate) fn number_or(value: &Value, default: f64) -> f64 {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    };
    match parsed {
        Some(number) if number.is_finite() => number,
        _ => default,
    }
}

/// Integer coercion via [`number_or`], truncating toward zero.
pub(crate) fn int_or(value: &Value, default: i64) -> i64 {
    number_or(value, default as f64).trunc() as i64
}

/// JSON truthiness mirroring the stored layout's loose flags.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// True unless the stored value is literally `false`.
pub(crate) fn bool_default_true(value: &Value) -> bool {
    !matches!(value, Value::Bool(false))
}

/// A reference id: `None` when missing or blank.
pub(crate) fn opt_id(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Reuses a stored id when usable, otherwise mints a fresh one.
pub(crate) fn id_or_fresh(value: &Value) -> String {
    opt_id(value).unwrap_or_else(crate::model::fresh_id)
}

/// Coerces an array into non-blank ids; first occurrence wins.
pub(crate) fn id_list(value: &Value) -> Vec<String> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut ids = Vec::new();
    for entry in array(value) {
        if let Some(id) = opt_id(entry) {
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }
    }
    ids
}

/// Parses an ISO `YYYY-MM-DD` date from text.
pub(crate) fn date_from_str(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// Parses an ISO `YYYY-MM-DD` date value; anything else is `None`.
pub(crate) fn date_or_none(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(text) => date_from_str(text),
        _ => None,
    }
}

/// Epoch-milliseconds timestamp with fallback.
pub(crate) fn epoch_ms_or(value: &Value, default: i64) -> i64 {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|n| n as i64))
            .unwrap_or(default),
        Value::String(text) => text.trim().parse::<i64>().unwrap_or(default),
        _ => default,
    }
}

/// A calendar year from a JSON map key.
pub(crate) fn year_from_key(key: &str) -> Option<i32> {
    key.trim().parse::<i32>().ok()
}

/// A calendar year from an integer or numeric-string value.
pub(crate) fn year_from_value(value: &Value) -> Option<i32> {
    match value {
        Value::Number(number) => number.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(text) => year_from_key(text),
        _ => None,
    }
}

/// Coerces an array into week-day numbers 0..=6, sorted and deduplicated.
pub(crate) fn day_numbers(value: &Value) -> Vec<u8> {
    let mut days: Vec<u8> = array(value)
        .iter()
        .filter_map(|entry| {
            let day = int_or(entry, -1);
            (0..=6).contains(&day).then_some(day as u8)
        })
        .collect();
    days.sort_unstable();
    days.dedup();
    days
}
