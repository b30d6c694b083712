//! The converter tree and its type descriptors.

pub mod cell;
pub mod defaults;
pub mod enums;
pub mod field;
pub mod model;
pub mod union;

pub use cell::DescriptorCell;
pub use enums::EnumDescriptor;
pub use field::{FieldDefault, FieldDescriptor};
pub use model::{ModelDescriptor, ModelDescriptorBuilder};
pub use union::{UnionDescriptor, UnionDescriptorBuilder, UnionVariant};

use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

use crate::coerce::{self, CoerceState, NameLookup};
use crate::dump::{self, Dumped, DumpState};
use crate::error::ConvertError;
use crate::value::Value;

// -------------------------------------------------------------------------
// Scalar

/// The leaf value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    Str,
    Int,
    Float,
    Bool,
    Bytes,
    Timestamp,
}

impl Scalar {
    pub fn kind(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Bytes => "bytes",
            Self::Timestamp => "timestamp",
        }
    }
}

// -------------------------------------------------------------------------
// Converter

/// A bidirectional conversion between wire shape and typed values.
///
/// The tree mirrors the declared type: leaves are scalars and enums,
/// containers and models carry the converters of their parts, unions
/// carry their alternatives. Descriptor-bearing variants share their
/// descriptor behind `Arc`, so one built descriptor serves every field
/// referencing the type. `Unknown` passes values through untouched in
/// both directions.
#[derive(Debug, Clone)]
pub enum Converter {
    Unknown,
    Scalar(Scalar),
    Enum(Arc<EnumDescriptor>),
    List(Arc<Converter>),
    Map(Arc<Converter>),
    Model(Arc<ModelDescriptor>),
    Union(Arc<UnionDescriptor>),
}

impl Converter {
    pub fn str() -> Converter {
        Converter::Scalar(Scalar::Str)
    }
    pub fn int() -> Converter {
        Converter::Scalar(Scalar::Int)
    }
    pub fn float() -> Converter {
        Converter::Scalar(Scalar::Float)
    }
    pub fn bool() -> Converter {
        Converter::Scalar(Scalar::Bool)
    }
    pub fn bytes() -> Converter {
        Converter::Scalar(Scalar::Bytes)
    }
    pub fn timestamp() -> Converter {
        Converter::Scalar(Scalar::Timestamp)
    }
    pub fn unknown() -> Converter {
        Converter::Unknown
    }
    pub fn enum_of(descriptor: Arc<EnumDescriptor>) -> Converter {
        Converter::Enum(descriptor)
    }
    pub fn list(element: Converter) -> Converter {
        Converter::List(Arc::new(element))
    }
    pub fn map(values: Converter) -> Converter {
        Converter::Map(Arc::new(values))
    }
    pub fn model(descriptor: Arc<ModelDescriptor>) -> Converter {
        Converter::Model(descriptor)
    }
    pub fn union(descriptor: Arc<UnionDescriptor>) -> Converter {
        Converter::Union(descriptor)
    }

    /// Stable kind string, used in errors, traces and union dispatch.
    pub fn kind(&self) -> &'static str {
        match self {
            Converter::Unknown => "unknown",
            Converter::Scalar(scalar) => scalar.kind(),
            Converter::Enum(_) => "enum",
            Converter::List(_) => "list",
            Converter::Map(_) => "map",
            Converter::Model(_) => "model",
            Converter::Union(_) => "union",
        }
    }

    /// Coerces wire-shaped input, or an already-typed value of this
    /// kind, into its typed form. Model keys are read by wire name.
    pub fn coerce(&self, value: Value) -> Result<Value, ConvertError> {
        coerce::coerce(self, value, &CoerceState::new(NameLookup::Wire))
    }

    /// Like `coerce`, starting from a decoded JSON body.
    pub fn coerce_json(&self, json: JsonValue) -> Result<Value, ConvertError> {
        self.coerce(Value::from_json(json))
    }

    /// Like `coerce`, but model keys are read by local name. For
    /// re-coercing values a caller assembled against local names.
    pub fn coerce_local(&self, value: Value) -> Result<Value, ConvertError> {
        coerce::coerce(self, value, &CoerceState::new(NameLookup::Local))
    }

    /// Dumps a typed value to wire shape.
    ///
    /// The returned `retry_safe` flag is false when any absent field
    /// along the way was filled from a `Generated` default; replaying
    /// such a request would mint different values.
    pub fn dump(&self, value: &Value) -> Result<Dumped, ConvertError> {
        let mut state = DumpState::new();
        let wire = dump::dump(self, value, &mut state)?;
        Ok(Dumped {
            wire,
            retry_safe: state.retry_safe,
        })
    }
}

impl fmt::Display for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Converter::Enum(descriptor) => write!(f, "enum {}", descriptor.name()),
            Converter::List(element) => write!(f, "list<{element}>"),
            Converter::Map(values) => write!(f, "map<{values}>"),
            Converter::Model(descriptor) => write!(f, "model {}", descriptor.name()),
            Converter::Union(descriptor) => write!(f, "union {}", descriptor.name()),
            other => f.write_str(other.kind()),
        }
    }
}
