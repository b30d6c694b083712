//! Typed model instances.
//!
//! A `ModelValue` pairs a model descriptor with the fields actually
//! present. Declared fields occupy one of three states: absent (the key
//! is missing from the field map), present-with-null, or
//! present-with-value. Undeclared wire keys live in a separate ordered
//! extra map, kept verbatim in wire shape; a key is never in both maps
//! at once.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::descriptor::ModelDescriptor;
use crate::error::FieldAccessError;
use crate::value::Value;

static NULL: Value = Value::Null;

// -------------------------------------------------------------------------
// FieldValue / FieldState

/// A declared field that is present on a model value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Value(Value),
}

/// The three-state view of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Absent,
    Null,
    Present,
}

// -------------------------------------------------------------------------
// ModelValue

/// An instance of a model type.
#[derive(Debug, Clone)]
pub struct ModelValue {
    descriptor: Arc<ModelDescriptor>,
    fields: IndexMap<String, FieldValue>,
    extra: IndexMap<String, JsonValue>,
}

impl ModelValue {
    /// An empty instance with every declared field absent.
    pub fn new(descriptor: Arc<ModelDescriptor>) -> ModelValue {
        ModelValue {
            descriptor,
            fields: IndexMap::new(),
            extra: IndexMap::new(),
        }
    }

    pub(crate) fn from_parts(
        descriptor: Arc<ModelDescriptor>,
        fields: IndexMap<String, FieldValue>,
        extra: IndexMap<String, JsonValue>,
    ) -> ModelValue {
        ModelValue {
            descriptor,
            fields,
            extra,
        }
    }

    pub fn descriptor(&self) -> &Arc<ModelDescriptor> {
        &self.descriptor
    }

    /// Sets a declared field by local name. A `Value::Null` argument
    /// normalizes to the present-with-null state.
    pub fn set(
        &mut self,
        local: &str,
        value: impl Into<Value>,
    ) -> Result<(), FieldAccessError> {
        self.declared(local)?;
        let entry = match value.into() {
            Value::Null => FieldValue::Null,
            value => FieldValue::Value(value),
        };
        self.fields.insert(local.to_string(), entry);
        Ok(())
    }

    /// Sets a declared field to the present-with-null state.
    pub fn set_null(&mut self, local: &str) -> Result<(), FieldAccessError> {
        self.declared(local)?;
        self.fields.insert(local.to_string(), FieldValue::Null);
        Ok(())
    }

    /// Returns a declared field to the absent state.
    pub fn unset(&mut self, local: &str) -> Result<(), FieldAccessError> {
        self.declared(local)?;
        self.fields.shift_remove(local);
        Ok(())
    }

    /// Stores an undeclared wire key verbatim. Keys matching a declared
    /// field's wire name are rejected; those go through `set`.
    pub fn set_extra(
        &mut self,
        wire_key: &str,
        value: JsonValue,
    ) -> Result<(), FieldAccessError> {
        if self.descriptor.field_by_wire(wire_key).is_some() {
            return Err(FieldAccessError::Declared(wire_key.to_string()));
        }
        self.extra.insert(wire_key.to_string(), value);
        Ok(())
    }

    /// Strongly-typed read. Absent and undeclared names are distinct
    /// errors; present-with-null reads as `Ok(None)`.
    pub fn get(&self, local: &str) -> Result<Option<&Value>, FieldAccessError> {
        self.declared(local)?;
        match self.fields.get(local) {
            None => Err(FieldAccessError::Absent(local.to_string())),
            Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::Value(value)) => Ok(Some(value)),
        }
    }

    /// Dynamic read: absent, null and undeclared names all read as
    /// null. The forgiving counterpart to `get`.
    pub fn raw(&self, local: &str) -> &Value {
        match self.fields.get(local) {
            Some(FieldValue::Value(value)) => value,
            _ => &NULL,
        }
    }

    /// The three-state view of a field. Undeclared names read as
    /// absent.
    pub fn state(&self, local: &str) -> FieldState {
        match self.fields.get(local) {
            None => FieldState::Absent,
            Some(FieldValue::Null) => FieldState::Null,
            Some(FieldValue::Value(_)) => FieldState::Present,
        }
    }

    /// Present fields in insertion order, keyed by local name.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn field_value(&self, local: &str) -> Option<&FieldValue> {
        self.fields.get(local)
    }

    /// Undeclared wire entries in insertion order.
    pub fn extra(&self) -> &IndexMap<String, JsonValue> {
        &self.extra
    }

    /// Raw wire render: present fields under wire names, then extra
    /// data. No defaults, no invariant checks; the dump pass is the
    /// validated counterpart.
    pub fn to_json(&self) -> JsonValue {
        let mut out = serde_json::Map::new();
        for (local, field) in &self.fields {
            let Some(descriptor) = self.descriptor.field(local) else {
                continue;
            };
            let rendered = match field {
                FieldValue::Null => JsonValue::Null,
                FieldValue::Value(value) => value.to_json(),
            };
            out.insert(descriptor.wire_name.clone(), rendered);
        }
        for (key, value) in &self.extra {
            out.insert(key.clone(), value.clone());
        }
        JsonValue::Object(out)
    }

    fn declared(&self, local: &str) -> Result<(), FieldAccessError> {
        if self.descriptor.field(local).is_none() {
            return Err(FieldAccessError::Undeclared(local.to_string()));
        }
        Ok(())
    }
}

impl PartialEq for ModelValue {
    fn eq(&self, other: &ModelValue) -> bool {
        Arc::ptr_eq(&self.descriptor, &other.descriptor)
            && self.fields == other.fields
            && self.extra == other.extra
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Converter, FieldDescriptor, ModelDescriptor};
    use serde_json::json;

    fn descriptor() -> Arc<ModelDescriptor> {
        ModelDescriptor::builder("Account")
            .field(FieldDescriptor::required("id", Converter::str()))
            .field(FieldDescriptor::optional("name", Converter::str()).nullable())
            .build()
    }

    #[test]
    fn set_get_state_matrix() {
        let mut account = ModelValue::new(descriptor());
        assert_eq!(account.state("name"), FieldState::Absent);
        assert!(matches!(
            account.get("name"),
            Err(FieldAccessError::Absent(_))
        ));

        account.set("name", "Ada").unwrap();
        assert_eq!(account.state("name"), FieldState::Present);
        assert_eq!(account.get("name").unwrap(), Some(&Value::from("Ada")));

        account.set_null("name").unwrap();
        assert_eq!(account.state("name"), FieldState::Null);
        assert_eq!(account.get("name").unwrap(), None);

        account.unset("name").unwrap();
        assert_eq!(account.state("name"), FieldState::Absent);
    }

    #[test]
    fn set_normalizes_null_value() {
        let mut account = ModelValue::new(descriptor());
        account.set("name", Value::Null).unwrap();
        assert_eq!(account.state("name"), FieldState::Null);
    }

    #[test]
    fn undeclared_names_are_rejected() {
        let mut account = ModelValue::new(descriptor());
        assert!(matches!(
            account.set("nope", 1i64),
            Err(FieldAccessError::Undeclared(_))
        ));
        assert!(matches!(
            account.get("nope"),
            Err(FieldAccessError::Undeclared(_))
        ));
        assert_eq!(account.raw("nope"), &Value::Null);
    }

    #[test]
    fn extra_rejects_declared_wire_names() {
        let mut account = ModelValue::new(descriptor());
        assert!(matches!(
            account.set_extra("id", json!("x")),
            Err(FieldAccessError::Declared(_))
        ));
        account.set_extra("undocumented", json!({"a": 1})).unwrap();
        assert_eq!(account.extra()["undocumented"], json!({"a": 1}));
    }

    #[test]
    fn raw_reads_null_for_absent_and_null() {
        let mut account = ModelValue::new(descriptor());
        assert!(account.raw("name").is_null());
        account.set_null("name").unwrap();
        assert!(account.raw("name").is_null());
        account.set("name", "Ada").unwrap();
        assert_eq!(account.raw("name").as_str(), Some("Ada"));
    }
}
