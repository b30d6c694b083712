//! Conversion failure kinds shared by the coerce and dump passes.

use thiserror::Error;

/// Failure raised while coercing wire data or dumping a typed value.
///
/// The first five variants are the terminal kinds; `Field`, `Index` and
/// `Key` wrap a terminal error with location context as the failure
/// unwinds, so the rendered message reads as a path into the value.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("missing required field `{0}`")]
    MissingRequiredField(String),
    #[error("unexpected null in field `{0}`")]
    UnexpectedNull(String),
    #[error("expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },
    #[error("no variant of union `{union}` matched")]
    UnknownVariant { union: String },
    #[error("invalid {kind}: {detail}")]
    Format {
        kind: &'static str,
        detail: String,
    },
    #[error("field `{name}`: {source}")]
    Field {
        name: String,
        source: Box<ConvertError>,
    },
    #[error("index {index}: {source}")]
    Index {
        index: usize,
        source: Box<ConvertError>,
    },
    #[error("key `{key}`: {source}")]
    Key {
        key: String,
        source: Box<ConvertError>,
    },
}

impl ConvertError {
    /// Wraps the error with the local name of the field it occurred in.
    pub fn in_field(self, name: &str) -> ConvertError {
        ConvertError::Field {
            name: name.to_string(),
            source: Box::new(self),
        }
    }

    /// Wraps the error with the list index it occurred at.
    pub fn at_index(self, index: usize) -> ConvertError {
        ConvertError::Index {
            index,
            source: Box::new(self),
        }
    }

    /// Wraps the error with the map key it occurred at.
    pub fn at_key(self, key: &str) -> ConvertError {
        ConvertError::Key {
            key: key.to_string(),
            source: Box::new(self),
        }
    }

    /// The terminal kind at the bottom of the context chain.
    pub fn root(&self) -> &ConvertError {
        match self {
            ConvertError::Field { source, .. }
            | ConvertError::Index { source, .. }
            | ConvertError::Key { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Misuse of the strongly-typed field accessor on a model value.
///
/// Not a conversion failure: reading an absent field is an API-usage
/// error on the caller's side, kept apart from `ConvertError` so match
/// arms on conversion results stay exhaustive over wire problems only.
#[derive(Debug, Error)]
pub enum FieldAccessError {
    #[error("field `{0}` is not set")]
    Absent(String),
    #[error("no field `{0}` declared")]
    Undeclared(String),
    #[error("key `{0}` is a declared field")]
    Declared(String),
}
