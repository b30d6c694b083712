//! Bidirectional conversion between untyped wire JSON and typed model
//! values, for generated API clients.
//!
//! The engine is a tree of [`Converter`]s mirroring a declared type.
//! The coerce pass walks wire data down the tree and produces typed
//! [`Value`]s; the dump pass walks a typed value back out to wire
//! shape. Model types declare their fields once through
//! [`ModelDescriptor`] builders, published lazily through
//! [`DescriptorCell`] statics; enums and unions work the same way.
//!
//! Two deliberate soft spots keep old clients compatible with newer
//! servers: unknown wire keys ride along on model values as extra
//! data, and unknown enum strings pass through unchanged. Everything
//! else is strict, and fails with a [`ConvertError`] naming the path.

pub mod coerce;
pub mod descriptor;
pub mod dump;
pub mod error;
pub mod value;

pub use coerce::{CoerceState, NameLookup};
pub use descriptor::{
    defaults, Converter, DescriptorCell, EnumDescriptor, FieldDefault, FieldDescriptor,
    ModelDescriptor, ModelDescriptorBuilder, Scalar, UnionDescriptor, UnionDescriptorBuilder,
    UnionVariant,
};
pub use dump::{DumpState, Dumped};
pub use error::{ConvertError, FieldAccessError};
pub use value::{FieldState, FieldValue, ModelValue, Value};
