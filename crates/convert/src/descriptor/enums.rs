//! Enum type descriptors.

use indexmap::IndexSet;
use std::sync::Arc;

// -------------------------------------------------------------------------
// EnumDescriptor

/// A named set of string literals in declaration order.
///
/// Membership is advisory: coercion lets unknown strings through
/// unchanged so a newer server cannot break an older client by adding
/// members. `is_member` exists for callers that want to branch on
/// recognized values.
#[derive(Debug)]
pub struct EnumDescriptor {
    name: String,
    members: IndexSet<String>,
}

impl EnumDescriptor {
    pub fn new(name: &str, members: &[&str]) -> Arc<EnumDescriptor> {
        tracing::debug!(name, members = members.len(), "built enum descriptor");
        Arc::new(EnumDescriptor {
            name: name.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    pub fn is_member(&self, value: &str) -> bool {
        self.members.contains(value)
    }
}
