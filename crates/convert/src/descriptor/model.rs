//! Model type descriptors.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::coerce::{self, CoerceState, NameLookup};
use crate::descriptor::FieldDescriptor;
use crate::dump::{self, Dumped, DumpState};
use crate::error::ConvertError;
use crate::value::ModelValue;

// -------------------------------------------------------------------------
// ModelDescriptor

/// The declared shape of one model type: its fields in declaration
/// order, keyed by local name, with a wire-name index on the side.
///
/// Built once per type through `builder` and shared behind `Arc`;
/// nothing about it can change after `build`, which is what makes
/// lazy publication through a `DescriptorCell` race-free.
#[derive(Debug)]
pub struct ModelDescriptor {
    name: String,
    fields: IndexMap<String, FieldDescriptor>,
    by_wire: IndexMap<String, String>,
}

impl ModelDescriptor {
    pub fn builder(name: &str) -> ModelDescriptorBuilder {
        ModelDescriptorBuilder {
            name: name.to_string(),
            fields: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn field(&self, local: &str) -> Option<&FieldDescriptor> {
        self.fields.get(local)
    }

    pub fn field_by_wire(&self, wire: &str) -> Option<&FieldDescriptor> {
        self.fields.get(self.by_wire.get(wire)?)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Coerces a decoded response body into a typed instance.
    pub fn coerce(self: &Arc<Self>, raw: JsonValue) -> Result<ModelValue, ConvertError> {
        let state = CoerceState::new(NameLookup::Wire);
        coerce::coerce_model_value(self, crate::value::Value::from_json(raw), &state)
    }

    /// Dumps a typed instance to wire shape, reporting retry-safety.
    pub fn dump(self: &Arc<Self>, value: &ModelValue) -> Result<Dumped, ConvertError> {
        let mut state = DumpState::new();
        let wire = dump::dump_model_value(self, value, &mut state)?;
        Ok(Dumped {
            wire,
            retry_safe: state.retry_safe,
        })
    }
}

// -------------------------------------------------------------------------
// ModelDescriptorBuilder

#[derive(Debug)]
pub struct ModelDescriptorBuilder {
    name: String,
    fields: IndexMap<String, FieldDescriptor>,
}

impl ModelDescriptorBuilder {
    pub fn field(mut self, field: FieldDescriptor) -> ModelDescriptorBuilder {
        debug_assert!(
            !self.fields.contains_key(&field.local_name),
            "duplicate field `{}` on model `{}`",
            field.local_name,
            self.name
        );
        self.fields.insert(field.local_name.clone(), field);
        self
    }

    pub fn build(self) -> Arc<ModelDescriptor> {
        let mut by_wire = IndexMap::new();
        for field in self.fields.values() {
            let replaced = by_wire.insert(field.wire_name.clone(), field.local_name.clone());
            debug_assert!(
                replaced.is_none(),
                "duplicate wire name `{}` on model `{}`",
                field.wire_name,
                self.name
            );
        }
        tracing::debug!(
            model = %self.name,
            fields = self.fields.len(),
            "built model descriptor"
        );
        Arc::new(ModelDescriptor {
            name: self.name,
            fields: self.fields,
            by_wire,
        })
    }
}
