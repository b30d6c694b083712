//! Union type descriptors.

use std::sync::Arc;

use crate::descriptor::Converter;
use crate::value::ModelValue;

// -------------------------------------------------------------------------
// UnionVariant

/// One alternative of a union: an optional discriminator tag plus the
/// converter that handles values of this shape.
#[derive(Debug, Clone)]
pub struct UnionVariant {
    pub tag: Option<String>,
    pub converter: Converter,
}

// -------------------------------------------------------------------------
// UnionDescriptor

/// A set of alternative shapes, resolved one of two ways.
///
/// With a discriminator declared, coercion reads that field from the
/// raw map and dispatches to the variant whose tag matches; untagged
/// variants are unreachable on that path. Without one, variants are
/// probed in declaration order and the first successful coercion wins.
/// Declaration order is a documented contract, not an accident: a
/// variant whose required fields are a superset of a later variant's
/// must be declared first, or input meant for it will resolve to the
/// permissive one. When two variants genuinely accept the same input,
/// the earlier declaration wins, and that is the whole tie-break.
#[derive(Debug)]
pub struct UnionDescriptor {
    name: String,
    discriminator: Option<String>,
    variants: Vec<UnionVariant>,
}

impl UnionDescriptor {
    pub fn builder(name: &str) -> UnionDescriptorBuilder {
        UnionDescriptorBuilder {
            name: name.to_string(),
            discriminator: None,
            variants: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }

    pub fn variants(&self) -> impl Iterator<Item = &UnionVariant> {
        self.variants.iter()
    }

    pub fn variant_by_tag(&self, tag: &str) -> Option<&UnionVariant> {
        self.variants
            .iter()
            .find(|variant| variant.tag.as_deref() == Some(tag))
    }

    /// First variant that produces values of this model type, looking
    /// through nested unions. Typed model values re-enter and leave a
    /// union through this lookup.
    pub(crate) fn claiming_variant(&self, model: &ModelValue) -> Option<&UnionVariant> {
        self.variants
            .iter()
            .find(|variant| converter_claims(&variant.converter, model))
    }
}

fn converter_claims(converter: &Converter, model: &ModelValue) -> bool {
    match converter {
        Converter::Model(descriptor) => Arc::ptr_eq(descriptor, model.descriptor()),
        Converter::Union(inner) => inner.claiming_variant(model).is_some(),
        _ => false,
    }
}

// -------------------------------------------------------------------------
// UnionDescriptorBuilder

#[derive(Debug)]
pub struct UnionDescriptorBuilder {
    name: String,
    discriminator: Option<String>,
    variants: Vec<UnionVariant>,
}

impl UnionDescriptorBuilder {
    /// Declares the wire field whose value selects the variant.
    pub fn discriminator(mut self, field: &str) -> UnionDescriptorBuilder {
        self.discriminator = Some(field.to_string());
        self
    }

    /// Adds a tagged variant.
    pub fn variant(mut self, tag: &str, converter: Converter) -> UnionDescriptorBuilder {
        debug_assert!(
            self.variants
                .iter()
                .all(|v| v.tag.as_deref() != Some(tag)),
            "duplicate variant tag `{}` on union `{}`",
            tag,
            self.name
        );
        self.variants.push(UnionVariant {
            tag: Some(tag.to_string()),
            converter,
        });
        self
    }

    /// Adds an untagged variant, resolved by probing only.
    pub fn probe(mut self, converter: Converter) -> UnionDescriptorBuilder {
        self.variants.push(UnionVariant {
            tag: None,
            converter,
        });
        self
    }

    pub fn build(self) -> Arc<UnionDescriptor> {
        tracing::debug!(
            union = %self.name,
            variants = self.variants.len(),
            discriminated = self.discriminator.is_some(),
            "built union descriptor"
        );
        Arc::new(UnionDescriptor {
            name: self.name,
            discriminator: self.discriminator,
            variants: self.variants,
        })
    }
}
