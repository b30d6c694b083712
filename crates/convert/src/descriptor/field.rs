//! Field metadata for model descriptors.

use serde_json::Value as JsonValue;
use std::fmt;

use crate::descriptor::Converter;

// -------------------------------------------------------------------------
// FieldDefault

/// A value substituted for an absent field during the dump pass.
///
/// `Const` substitutes the same wire value every time. `Generated` mints
/// a fresh one per dump and therefore marks the dumped result as not
/// retry-safe.
#[derive(Clone)]
pub enum FieldDefault {
    Const(JsonValue),
    Generated(fn() -> JsonValue),
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldDefault::Const(value) => f.debug_tuple("Const").field(value).finish(),
            FieldDefault::Generated(_) => f.write_str("Generated(..)"),
        }
    }
}

// -------------------------------------------------------------------------
// FieldDescriptor

/// Declared metadata for one model field.
///
/// The wire name defaults to the local name; `wire` overrides it when
/// the API casing differs. Defaults fire only during dump, and only for
/// absent fields; a required field carrying one coerces as if optional,
/// since the dump pass guarantees it on the wire.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub wire_name: String,
    pub local_name: String,
    pub converter: Converter,
    pub optional: bool,
    pub nullable: bool,
    pub default: Option<FieldDefault>,
}

impl FieldDescriptor {
    pub fn required(local: &str, converter: Converter) -> FieldDescriptor {
        FieldDescriptor {
            wire_name: local.to_string(),
            local_name: local.to_string(),
            converter,
            optional: false,
            nullable: false,
            default: None,
        }
    }

    pub fn optional(local: &str, converter: Converter) -> FieldDescriptor {
        FieldDescriptor {
            optional: true,
            ..FieldDescriptor::required(local, converter)
        }
    }

    pub fn wire(mut self, wire_name: &str) -> FieldDescriptor {
        self.wire_name = wire_name.to_string();
        self
    }

    pub fn nullable(mut self) -> FieldDescriptor {
        self.nullable = true;
        self
    }

    pub fn const_default(mut self, value: JsonValue) -> FieldDescriptor {
        self.default = Some(FieldDefault::Const(value));
        self
    }

    pub fn generated_default(mut self, generate: fn() -> JsonValue) -> FieldDescriptor {
        self.default = Some(FieldDefault::Generated(generate));
        self
    }
}
