//! Lenient accessors over untyped JSON.
//!
//! Handoff records are produced by several generations of tooling, so every
//! lookup here answers "absent" for a wrong type instead of failing.

use serde_json::{Map, Value};

pub(crate) type Object = Map<String, Value>;

pub(crate) fn object(value: Option<&Value>) -> Option<&Object> {
    value.and_then(Value::as_object)
}

pub(crate) fn field<'a>(obj: Option<&'a Object>, key: &str) -> Option<&'a Value> {
    obj.and_then(|map| map.get(key))
}

/// Text of a scalar value. Numbers and booleans keep their JSON spelling;
/// empty strings, nulls, arrays and objects count as absent.
pub(crate) fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Scalar items of an array, in order. Anything that is not an array is
/// treated as an empty list.
pub(crate) fn text_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| scalar_text(Some(item)))
            .collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn flag(value: Option<&Value>, default: bool) -> bool {
    value.and_then(Value::as_bool).unwrap_or(default)
}

pub(crate) fn count(value: Option<&Value>) -> u64 {
    value.and_then(Value::as_u64).unwrap_or(0)
}
