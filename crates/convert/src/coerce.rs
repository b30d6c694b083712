//! The coerce pass: wire data in, typed values out.
//!
//! Every helper here takes its input by value and either returns the
//! fully typed result or fails without side effects; no partially
//! coerced container or model ever escapes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::DateTime;
use indexmap::IndexMap;
use std::sync::Arc;

use crate::descriptor::{
    Converter, EnumDescriptor, ModelDescriptor, Scalar, UnionDescriptor,
};
use crate::error::ConvertError;
use crate::value::{FieldValue, ModelValue, Value};

// -------------------------------------------------------------------------
// CoerceState

/// Which key space model coercion reads raw keys from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameLookup {
    Wire,
    Local,
}

/// Per-call coercion context.
#[derive(Debug, Clone, Copy)]
pub struct CoerceState {
    pub names: NameLookup,
}

impl CoerceState {
    pub fn new(names: NameLookup) -> CoerceState {
        CoerceState { names }
    }
}

// -------------------------------------------------------------------------
// coerce

/// Coerces `value` through `converter`, accepting wire-shaped input or
/// an already-typed value of the same kind.
pub fn coerce(
    converter: &Converter,
    value: Value,
    state: &CoerceState,
) -> Result<Value, ConvertError> {
    match converter {
        Converter::Unknown => Ok(value),
        Converter::Scalar(scalar) => coerce_scalar(*scalar, value),
        Converter::Enum(descriptor) => coerce_enum(descriptor, value),
        Converter::List(element) => coerce_list(element, value, state),
        Converter::Map(values) => coerce_map(values, value, state),
        Converter::Model(descriptor) => {
            coerce_model_value(descriptor, value, state).map(Value::Model)
        }
        Converter::Union(descriptor) => coerce_union(descriptor, value, state),
    }
}

fn coerce_scalar(scalar: Scalar, value: Value) -> Result<Value, ConvertError> {
    match scalar {
        Scalar::Str => match value {
            Value::Str(s) => Ok(Value::Str(s)),
            other => Err(mismatch("str", &other)),
        },
        Scalar::Int => match value {
            Value::Int(i) => Ok(Value::Int(i)),
            Value::UInt(u) => match i64::try_from(u) {
                Ok(i) => Ok(Value::Int(i)),
                Err(_) => Err(mismatch("int", &Value::UInt(u))),
            },
            other => Err(mismatch("int", &other)),
        },
        Scalar::Float => match value {
            Value::Float(f) => Ok(Value::Float(f)),
            Value::Int(i) => Ok(Value::Float(i as f64)),
            Value::UInt(u) => Ok(Value::Float(u as f64)),
            other => Err(mismatch("float", &other)),
        },
        Scalar::Bool => match value {
            Value::Bool(b) => Ok(Value::Bool(b)),
            other => Err(mismatch("bool", &other)),
        },
        Scalar::Bytes => match value {
            Value::Bytes(bytes) => Ok(Value::Bytes(bytes)),
            Value::Str(s) => match STANDARD.decode(&s) {
                Ok(bytes) => Ok(Value::Bytes(bytes)),
                Err(err) => Err(ConvertError::Format {
                    kind: "base64",
                    detail: err.to_string(),
                }),
            },
            other => Err(mismatch("bytes", &other)),
        },
        Scalar::Timestamp => match value {
            Value::Timestamp(ts) => Ok(Value::Timestamp(ts)),
            Value::Str(s) => match DateTime::parse_from_rfc3339(&s) {
                Ok(ts) => Ok(Value::Timestamp(ts)),
                Err(err) => Err(ConvertError::Format {
                    kind: "timestamp",
                    detail: format!("`{s}`: {err}"),
                }),
            },
            other => Err(mismatch("timestamp", &other)),
        },
    }
}

fn coerce_enum(descriptor: &EnumDescriptor, value: Value) -> Result<Value, ConvertError> {
    match value {
        Value::Str(s) => {
            if !descriptor.is_member(&s) {
                tracing::trace!(
                    name = descriptor.name(),
                    value = %s,
                    "unrecognized enum member passed through"
                );
            }
            Ok(Value::Str(s))
        }
        other => Err(mismatch(descriptor.name(), &other)),
    }
}

fn coerce_list(
    element: &Converter,
    value: Value,
    state: &CoerceState,
) -> Result<Value, ConvertError> {
    let items = match value {
        Value::List(items) => items,
        other => return Err(mismatch("list", &other)),
    };
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let coerced = coerce(element, item, state).map_err(|err| err.at_index(index))?;
        out.push(coerced);
    }
    Ok(Value::List(out))
}

fn coerce_map(
    values: &Converter,
    value: Value,
    state: &CoerceState,
) -> Result<Value, ConvertError> {
    let entries = match value {
        Value::Map(entries) => entries,
        other => return Err(mismatch("map", &other)),
    };
    let mut out = IndexMap::with_capacity(entries.len());
    for (key, entry) in entries {
        let coerced = coerce(values, entry, state).map_err(|err| err.at_key(&key))?;
        out.insert(key, coerced);
    }
    Ok(Value::Map(out))
}

/// Model coercion, returning the typed instance directly.
///
/// Walks declared fields in declaration order, consuming matching raw
/// keys; whatever remains afterwards is undeclared and lands verbatim
/// in the extra map, keeping its relative wire order.
pub(crate) fn coerce_model_value(
    descriptor: &Arc<ModelDescriptor>,
    value: Value,
    state: &CoerceState,
) -> Result<ModelValue, ConvertError> {
    let mut entries = match value {
        Value::Model(model) => {
            if Arc::ptr_eq(model.descriptor(), descriptor) {
                return Ok(model);
            }
            return Err(ConvertError::TypeMismatch {
                expected: descriptor.name().to_string(),
                got: model.descriptor().name().to_string(),
            });
        }
        Value::Map(entries) => entries,
        other => return Err(mismatch(descriptor.name(), &other)),
    };

    let mut fields: IndexMap<String, FieldValue> = IndexMap::new();
    for field in descriptor.fields() {
        let key = match state.names {
            NameLookup::Wire => &field.wire_name,
            NameLookup::Local => &field.local_name,
        };
        let Some(raw) = entries.shift_remove(key) else {
            // a declared default guarantees the field on the wire at
            // dump time, so its absence here is fine
            if field.optional || field.default.is_some() {
                continue;
            }
            return Err(ConvertError::MissingRequiredField(field.local_name.clone()));
        };
        if raw.is_null() {
            if field.nullable {
                fields.insert(field.local_name.clone(), FieldValue::Null);
            } else if !field.optional {
                return Err(ConvertError::UnexpectedNull(field.local_name.clone()));
            }
            // optional non-nullable sent as null reads as omitted
            continue;
        }
        let coerced = coerce(&field.converter, raw, state)
            .map_err(|err| err.in_field(&field.local_name))?;
        fields.insert(field.local_name.clone(), FieldValue::Value(coerced));
    }

    let extra = entries
        .into_iter()
        .map(|(key, raw)| (key, raw.to_json()))
        .collect();
    Ok(ModelValue::from_parts(descriptor.clone(), fields, extra))
}

fn coerce_union(
    descriptor: &Arc<UnionDescriptor>,
    value: Value,
    state: &CoerceState,
) -> Result<Value, ConvertError> {
    if let Value::Model(model) = &value {
        if descriptor.claiming_variant(model).is_some() {
            return Ok(value);
        }
    }
    match descriptor.discriminator() {
        Some(field) => coerce_discriminated(descriptor, field, value, state),
        None => coerce_probed(descriptor, value, state),
    }
}

fn coerce_discriminated(
    descriptor: &UnionDescriptor,
    field: &str,
    value: Value,
    state: &CoerceState,
) -> Result<Value, ConvertError> {
    let tag = match &value {
        Value::Map(entries) => match entries.get(field) {
            Some(Value::Str(tag)) => Some(tag.clone()),
            _ => None,
        },
        other => return Err(mismatch(descriptor.name(), other)),
    };
    let Some(tag) = tag else {
        return Err(ConvertError::UnknownVariant {
            union: descriptor.name().to_string(),
        });
    };
    match descriptor.variant_by_tag(&tag) {
        Some(variant) => {
            tracing::trace!(
                union = descriptor.name(),
                tag = %tag,
                "discriminator selected variant"
            );
            coerce(&variant.converter, value, state)
        }
        None => Err(ConvertError::UnknownVariant {
            union: descriptor.name().to_string(),
        }),
    }
}

fn coerce_probed(
    descriptor: &UnionDescriptor,
    value: Value,
    state: &CoerceState,
) -> Result<Value, ConvertError> {
    for (index, variant) in descriptor.variants().enumerate() {
        match coerce(&variant.converter, value.clone(), state) {
            Ok(typed) => {
                tracing::trace!(
                    union = descriptor.name(),
                    variant = index,
                    kind = variant.converter.kind(),
                    "probe accepted value"
                );
                return Ok(typed);
            }
            Err(_) => continue,
        }
    }
    Err(ConvertError::UnknownVariant {
        union: descriptor.name().to_string(),
    })
}

fn mismatch(expected: impl Into<String>, got: &Value) -> ConvertError {
    ConvertError::TypeMismatch {
        expected: expected.into(),
        got: got.kind().to_string(),
    }
}
