// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node-kind schemas.
//!
//! A [`Schema`] lists the properties a node kind declares and the defaults it
//! overrides. Declared properties fall back to the kind default and then the
//! registry default; undeclared ones have no fallback at all.

use alloc::boxed::Box;
use smallvec::SmallVec;

use crate::id::{Property, PropertyId};
use crate::value::{ErasedValue, PropertyValue};

/// The declared properties of one node kind.
///
/// ```rust
/// use canopy_property::{PropertyMetadataBuilder, PropertyRegistry, Schema};
///
/// let mut registry = PropertyRegistry::new();
/// let radius = registry.register("radius", PropertyMetadataBuilder::new(0.0_f64).build());
/// let label = registry.register("label", PropertyMetadataBuilder::new(String::new()).build());
///
/// let circle = Schema::builder("circle")
///     .declare_with_default(radius, 10.0)
///     .build();
///
/// assert!(circle.declares(radius.id()));
/// assert!(!circle.declares(label.id()));
/// assert_eq!(circle.default_for(radius), Some(&10.0));
/// ```
#[derive(Clone, Debug)]
pub struct Schema {
    name: Box<str>,
    /// Sorted by [`PropertyId`].
    entries: SmallVec<[(PropertyId, Option<ErasedValue>); 16]>,
}

impl Schema {
    /// Starts a schema for the named node kind.
    #[must_use]
    pub fn builder(name: &str) -> SchemaBuilder {
        SchemaBuilder {
            schema: Self {
                name: name.into(),
                entries: SmallVec::new(),
            },
        }
    }

    /// Returns the kind name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn find(&self, id: PropertyId) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&id, |(pid, _)| *pid)
    }

    /// Returns `true` if the kind declares `id`.
    #[must_use]
    pub fn declares(&self, id: PropertyId) -> bool {
        self.find(id).is_ok()
    }

    /// Returns the kind's default for `id`, if it overrides the registry one.
    #[must_use]
    pub fn default_erased(&self, id: PropertyId) -> Option<&ErasedValue> {
        self.find(id)
            .ok()
            .and_then(|idx| self.entries[idx].1.as_ref())
    }

    /// Typed variant of [`default_erased`](Self::default_erased).
    #[must_use]
    pub fn default_for<T: PropertyValue>(&self, property: Property<T>) -> Option<&T> {
        self.default_erased(property.id())
            .and_then(ErasedValue::downcast_ref)
    }

    /// Returns the declared property IDs in ascending order.
    pub fn properties(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    /// Returns the number of declared properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the kind declares nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for [`Schema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    fn insert(mut self, id: PropertyId, default: Option<ErasedValue>) -> Self {
        match self.schema.find(id) {
            Ok(idx) => {
                if default.is_some() {
                    self.schema.entries[idx].1 = default;
                }
            }
            Err(idx) => self.schema.entries.insert(idx, (id, default)),
        }
        self
    }

    /// Declares a property that keeps its registry default.
    #[must_use]
    pub fn declare<T: PropertyValue>(self, property: Property<T>) -> Self {
        self.insert(property.id(), None)
    }

    /// Declares a property with a kind-specific default.
    #[must_use]
    pub fn declare_with_default<T: PropertyValue>(self, property: Property<T>, value: T) -> Self {
        self.insert(property.id(), Some(ErasedValue::new(value)))
    }

    /// Declares every property of `base`, keeping its defaults.
    ///
    /// Later declarations on this builder override inherited defaults.
    #[must_use]
    pub fn extend(mut self, base: &Schema) -> Self {
        for (id, default) in &base.entries {
            self = self.insert(*id, default.clone());
        }
        self
    }

    /// Finishes the schema.
    #[must_use]
    pub fn build(self) -> Schema {
        self.schema
    }
}
