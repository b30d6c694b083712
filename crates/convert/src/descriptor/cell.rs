//! Lazy one-time descriptor publication.

use std::sync::{Arc, OnceLock};

/// A `const`-constructible cell holding one lazily built descriptor.
///
/// Generated code keeps one `static` cell per model, enum or union
/// type; `get_or_build` runs the builder on first use and every later
/// call returns the same `Arc`. Concurrent first calls block until the
/// one running builder publishes, so a descriptor is only ever built
/// once.
///
/// ```
/// use std::sync::Arc;
/// use wirework_convert::{Converter, DescriptorCell, FieldDescriptor, ModelDescriptor};
///
/// static CHARGE: DescriptorCell<ModelDescriptor> = DescriptorCell::new();
///
/// fn charge() -> Arc<ModelDescriptor> {
///     CHARGE.get_or_build(|| {
///         ModelDescriptor::builder("Charge")
///             .field(FieldDescriptor::required("id", Converter::str()))
///             .build()
///     })
/// }
///
/// assert!(Arc::ptr_eq(&charge(), &charge()));
/// ```
#[derive(Debug)]
pub struct DescriptorCell<T> {
    cell: OnceLock<Arc<T>>,
}

impl<T> DescriptorCell<T> {
    pub const fn new() -> DescriptorCell<T> {
        DescriptorCell {
            cell: OnceLock::new(),
        }
    }

    pub fn get_or_build(&self, build: impl FnOnce() -> Arc<T>) -> Arc<T> {
        self.cell.get_or_init(build).clone()
    }
}

impl<T> Default for DescriptorCell<T> {
    fn default() -> DescriptorCell<T> {
        DescriptorCell::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::EnumDescriptor;

    #[test]
    fn builds_once_and_shares() {
        static CELL: DescriptorCell<EnumDescriptor> = DescriptorCell::new();
        let first = CELL.get_or_build(|| EnumDescriptor::new("Status", &["ok"]));
        let second = CELL.get_or_build(|| EnumDescriptor::new("Status", &["other"]));
        assert!(Arc::ptr_eq(&first, &second));
        assert!(second.is_member("ok"));
    }
}
