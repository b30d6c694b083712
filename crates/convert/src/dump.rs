//! The dump pass: typed values in, wire data out.
//!
//! Dumping is strict about runtime shape: a value that does not match
//! its declared converter fails with a type mismatch rather than being
//! passed along, since shape violations here mean the typed value was
//! assembled wrong. The one piece of state threaded through is the
//! retry-safety flag, cleared whenever an absent field is filled from a
//! generated default.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::descriptor::{
    Converter, EnumDescriptor, FieldDefault, ModelDescriptor, Scalar, UnionDescriptor,
};
use crate::error::ConvertError;
use crate::value::{format_timestamp, FieldValue, ModelValue, Value};

// -------------------------------------------------------------------------
// DumpState / Dumped

/// Per-call dump context.
#[derive(Debug, Clone)]
pub struct DumpState {
    pub retry_safe: bool,
}

impl DumpState {
    pub fn new() -> DumpState {
        DumpState { retry_safe: true }
    }
}

impl Default for DumpState {
    fn default() -> DumpState {
        DumpState::new()
    }
}

/// The result of a top-level dump: the wire value plus whether the
/// request it describes can be replayed verbatim.
#[derive(Debug, Clone)]
pub struct Dumped {
    pub wire: JsonValue,
    pub retry_safe: bool,
}

// -------------------------------------------------------------------------
// dump

/// Dumps `value` through `converter` to wire shape.
pub fn dump(
    converter: &Converter,
    value: &Value,
    state: &mut DumpState,
) -> Result<JsonValue, ConvertError> {
    match converter {
        Converter::Unknown => Ok(value.to_json()),
        Converter::Scalar(scalar) => dump_scalar(*scalar, value),
        Converter::Enum(descriptor) => dump_enum(descriptor, value),
        Converter::List(element) => dump_list(element, value, state),
        Converter::Map(values) => dump_map(values, value, state),
        Converter::Model(descriptor) => dump_model(descriptor, value, state),
        Converter::Union(descriptor) => dump_union(descriptor, value, state),
    }
}

fn dump_scalar(scalar: Scalar, value: &Value) -> Result<JsonValue, ConvertError> {
    match scalar {
        Scalar::Str => match value {
            Value::Str(s) => Ok(JsonValue::String(s.clone())),
            other => Err(mismatch("str", other)),
        },
        Scalar::Int => match value {
            Value::Int(i) => Ok(JsonValue::from(*i)),
            Value::UInt(u) => match i64::try_from(*u) {
                Ok(i) => Ok(JsonValue::from(i)),
                Err(_) => Err(mismatch("int", value)),
            },
            other => Err(mismatch("int", other)),
        },
        Scalar::Float => match value {
            Value::Float(f) => Ok(JsonValue::from(*f)),
            Value::Int(i) => Ok(JsonValue::from(*i as f64)),
            Value::UInt(u) => Ok(JsonValue::from(*u as f64)),
            other => Err(mismatch("float", other)),
        },
        Scalar::Bool => match value {
            Value::Bool(b) => Ok(JsonValue::Bool(*b)),
            other => Err(mismatch("bool", other)),
        },
        Scalar::Bytes => match value {
            Value::Bytes(bytes) => Ok(JsonValue::String(STANDARD.encode(bytes))),
            other => Err(mismatch("bytes", other)),
        },
        Scalar::Timestamp => match value {
            Value::Timestamp(ts) => Ok(JsonValue::String(format_timestamp(ts))),
            other => Err(mismatch("timestamp", other)),
        },
    }
}

fn dump_enum(descriptor: &EnumDescriptor, value: &Value) -> Result<JsonValue, ConvertError> {
    match value {
        Value::Str(s) => Ok(JsonValue::String(s.clone())),
        other => Err(mismatch(descriptor.name(), other)),
    }
}

fn dump_list(
    element: &Converter,
    value: &Value,
    state: &mut DumpState,
) -> Result<JsonValue, ConvertError> {
    let items = match value {
        Value::List(items) => items,
        other => return Err(mismatch("list", other)),
    };
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let rendered = dump(element, item, state).map_err(|err| err.at_index(index))?;
        out.push(rendered);
    }
    Ok(JsonValue::Array(out))
}

fn dump_map(
    values: &Converter,
    value: &Value,
    state: &mut DumpState,
) -> Result<JsonValue, ConvertError> {
    let entries = match value {
        Value::Map(entries) => entries,
        other => return Err(mismatch("map", other)),
    };
    let mut out = serde_json::Map::new();
    for (key, entry) in entries {
        let rendered = dump(values, entry, state).map_err(|err| err.at_key(key))?;
        out.insert(key.clone(), rendered);
    }
    Ok(JsonValue::Object(out))
}

fn dump_model(
    descriptor: &Arc<ModelDescriptor>,
    value: &Value,
    state: &mut DumpState,
) -> Result<JsonValue, ConvertError> {
    match value {
        Value::Model(model) => dump_model_value(descriptor, model, state),
        other => Err(mismatch(descriptor.name(), other)),
    }
}

/// Model dumping, emitting fields in declaration order then extra data.
///
/// Absent fields with a declared default are filled here, and nowhere
/// else; a `Generated` default clears the retry-safety flag. Absent
/// required fields without one, and nulls in non-nullable fields, are
/// assembly mistakes that surface as errors now rather than as a
/// rejected request later.
pub(crate) fn dump_model_value(
    descriptor: &Arc<ModelDescriptor>,
    model: &ModelValue,
    state: &mut DumpState,
) -> Result<JsonValue, ConvertError> {
    if !Arc::ptr_eq(descriptor, model.descriptor()) {
        return Err(ConvertError::TypeMismatch {
            expected: descriptor.name().to_string(),
            got: model.descriptor().name().to_string(),
        });
    }
    let mut out = serde_json::Map::new();
    for field in descriptor.fields() {
        match model.field_value(&field.local_name) {
            None => match &field.default {
                Some(FieldDefault::Const(value)) => {
                    out.insert(field.wire_name.clone(), value.clone());
                }
                Some(FieldDefault::Generated(generate)) => {
                    tracing::trace!(
                        field = %field.local_name,
                        "substituted generated default"
                    );
                    state.retry_safe = false;
                    out.insert(field.wire_name.clone(), generate());
                }
                None => {
                    if !field.optional {
                        return Err(ConvertError::MissingRequiredField(
                            field.local_name.clone(),
                        ));
                    }
                }
            },
            Some(FieldValue::Null) => {
                if !field.nullable {
                    return Err(ConvertError::UnexpectedNull(field.local_name.clone()));
                }
                out.insert(field.wire_name.clone(), JsonValue::Null);
            }
            Some(FieldValue::Value(value)) => {
                let rendered = dump(&field.converter, value, state)
                    .map_err(|err| err.in_field(&field.local_name))?;
                out.insert(field.wire_name.clone(), rendered);
            }
        }
    }
    for (key, value) in model.extra() {
        out.insert(key.clone(), value.clone());
    }
    Ok(JsonValue::Object(out))
}

fn dump_union(
    descriptor: &Arc<UnionDescriptor>,
    value: &Value,
    state: &mut DumpState,
) -> Result<JsonValue, ConvertError> {
    if let Value::Model(model) = value {
        if let Some(variant) = descriptor.claiming_variant(model) {
            return dump(&variant.converter, value, state);
        }
    } else {
        for variant in descriptor.variants() {
            if kind_accepts(&variant.converter, value) {
                return dump(&variant.converter, value, state);
            }
        }
    }
    Err(ConvertError::TypeMismatch {
        expected: descriptor.name().to_string(),
        got: value.kind().to_string(),
    })
}

/// Whether a variant's converter can dump a value of this runtime
/// kind. Model variants are excluded here; they dispatch by descriptor
/// identity instead.
fn kind_accepts(converter: &Converter, value: &Value) -> bool {
    match converter {
        Converter::Unknown => true,
        Converter::Scalar(Scalar::Str) => matches!(value, Value::Str(_)),
        Converter::Scalar(Scalar::Int) => matches!(value, Value::Int(_) | Value::UInt(_)),
        Converter::Scalar(Scalar::Float) => matches!(value, Value::Float(_)),
        Converter::Scalar(Scalar::Bool) => matches!(value, Value::Bool(_)),
        Converter::Scalar(Scalar::Bytes) => matches!(value, Value::Bytes(_)),
        Converter::Scalar(Scalar::Timestamp) => matches!(value, Value::Timestamp(_)),
        Converter::Enum(_) => matches!(value, Value::Str(_)),
        Converter::List(_) => matches!(value, Value::List(_)),
        Converter::Map(_) => matches!(value, Value::Map(_)),
        Converter::Model(_) => false,
        Converter::Union(inner) => inner
            .variants()
            .any(|variant| kind_accepts(&variant.converter, value)),
    }
}

fn mismatch(expected: impl Into<String>, got: &Value) -> ConvertError {
    ConvertError::TypeMismatch {
        expected: expected.into(),
        got: got.kind().to_string(),
    }
}
