//! Query-string serialization for dumped wire objects.
//!
//! List endpoints take their filter parameters in the query string rather
//! than a body, using the bracket convention: nested objects flatten to
//! `key[subkey]` and arrays repeat the key with empty brackets. [`flatten`]
//! turns a wire object into ordered pairs, [`encode`] percent-encodes and
//! joins them, and [`query_string`] does both in one call.

use serde_json::Value as JsonValue;
use thiserror::Error;

/// Error raised when the top-level value is not an object.
///
/// Query strings have no way to express a bare scalar or array, so
/// anything other than a JSON object at the top level is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("query parameters must be an object, got {0}")]
    NotAnObject(&'static str),
}

// -------------------------------------------------------------------------
// Flattening

/// Flattens a wire object into ordered `(key, value)` query pairs.
///
/// Pairs come out in the order the object holds its entries, depth first.
/// Nested objects extend the key with `[subkey]`, arrays repeat the key
/// with `[]` once per element, and null entries are omitted entirely.
/// Scalars render in their plain string forms: `true`/`false` for bools,
/// shortest round-trip decimal for numbers, the bare text for strings.
///
/// Examples:
/// - `{"limit": 10}` flattens to `[("limit", "10")]`
/// - `{"created": {"gt": 5}}` flattens to `[("created[gt]", "5")]`
/// - `{"ids": ["a", "b"]}` flattens to `[("ids[]", "a"), ("ids[]", "b")]`
/// - `{"after": null}` flattens to `[]`
///
/// An empty object or array contributes no pairs, so its key drops out of
/// the query string entirely.
pub fn flatten(value: &JsonValue) -> Result<Vec<(String, String)>, QueryError> {
    let entries = match value {
        JsonValue::Object(entries) => entries,
        other => return Err(QueryError::NotAnObject(json_kind(other))),
    };
    let mut pairs = Vec::new();
    for (key, entry) in entries {
        flatten_into(key.clone(), entry, &mut pairs);
    }
    Ok(pairs)
}

fn flatten_into(key: String, value: &JsonValue, pairs: &mut Vec<(String, String)>) {
    match value {
        JsonValue::Null => {}
        JsonValue::Bool(flag) => pairs.push((key, flag.to_string())),
        JsonValue::Number(number) => pairs.push((key, number.to_string())),
        JsonValue::String(text) => pairs.push((key, text.clone())),
        JsonValue::Array(items) => {
            for item in items {
                flatten_into(format!("{key}[]"), item, pairs);
            }
        }
        JsonValue::Object(entries) => {
            for (subkey, entry) in entries {
                flatten_into(format!("{key}[{subkey}]"), entry, pairs);
            }
        }
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

// -------------------------------------------------------------------------
// Encoding

/// Percent-encodes pairs and joins them into a query string.
///
/// Both keys and values are encoded, so brackets arrive as `%5B`/`%5D`
/// and reserved characters in values cannot smuggle extra pairs in.
///
/// Examples:
/// - `[("limit", "10")]` encodes to `limit=10`
/// - `[("ids[]", "a"), ("ids[]", "b")]` encodes to `ids%5B%5D=a&ids%5B%5D=b`
pub fn encode(pairs: &[(String, String)]) -> String {
    let mut out = String::new();
    for (key, value) in pairs {
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(&urlencoding::encode(key));
        out.push('=');
        out.push_str(&urlencoding::encode(value));
    }
    out
}

/// Flattens and encodes in one call.
pub fn query_string(value: &JsonValue) -> Result<String, QueryError> {
    Ok(encode(&flatten(value)?))
}

// -------------------------------------------------------------------------
// Tests
