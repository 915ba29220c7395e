// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property registry.
//!
//! [`PropertyRegistry`] assigns each named property its [`PropertyId`] and
//! holds the metadata shared by every node: registry default, dirty
//! classification and value callbacks.

use alloc::boxed::Box;
use alloc::vec::Vec;
use canopy_dirty::DirtyKinds;
use core::any::{Any, TypeId};
use core::fmt;
use hashbrown::HashMap;

use crate::error::InvalidValue;
use crate::id::{Property, PropertyId};
use crate::metadata::PropertyMetadata;
use crate::value::{ErasedValue, PropertyValue};

/// A registration entry for a property.
pub struct PropertyRegistration {
    name: &'static str,
    type_id: TypeId,
    affects: DirtyKinds,
    default_value: ErasedValue,
    metadata: Box<dyn Any>,
}

impl PropertyRegistration {
    /// Returns the property name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the [`TypeId`] of the property's value type.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the dirty kinds a change invalidates.
    #[must_use]
    #[inline]
    pub fn affects(&self) -> DirtyKinds {
        self.affects
    }

    /// Returns the registry default, erased.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> &ErasedValue {
        &self.default_value
    }
}

impl fmt::Debug for PropertyRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistration")
            .field("name", &self.name)
            .field("affects", &self.affects)
            .field("default_value", &self.default_value)
            .finish_non_exhaustive()
    }
}

/// A registry for scene properties.
///
/// Properties are registered once, usually when a scene is built, and looked
/// up by name or ID afterwards.
///
/// # Example
///
/// ```rust
/// use canopy_dirty::DirtyKinds;
/// use canopy_property::{PropertyMetadataBuilder, PropertyRegistry};
///
/// let mut registry = PropertyRegistry::new();
/// let radius = registry.register(
///     "radius",
///     PropertyMetadataBuilder::new(0.0_f64).geometry().build(),
/// );
///
/// assert_eq!(registry.by_name("radius"), Some(radius.id()));
/// assert!(registry.affects(radius.id()).contains(DirtyKinds::MEASURE));
/// ```
#[derive(Default)]
pub struct PropertyRegistry {
    properties: Vec<PropertyRegistration>,
    by_name: HashMap<&'static str, PropertyId>,
}

impl PropertyRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new property with the given name and metadata.
    ///
    /// # Panics
    ///
    /// Panics if a property with the same name is already registered,
    /// or if more than 65,535 properties are registered.
    pub fn register<T: PropertyValue>(
        &mut self,
        name: &'static str,
        metadata: PropertyMetadata<T>,
    ) -> Property<T> {
        assert!(
            !self.by_name.contains_key(name),
            "Property '{name}' is already registered"
        );
        assert!(
            self.properties.len() < u16::MAX as usize,
            "Too many properties registered (max {})",
            u16::MAX
        );

        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let id = PropertyId::new(self.properties.len() as u16);

        self.properties.push(PropertyRegistration {
            name,
            type_id: TypeId::of::<T>(),
            affects: metadata.affects(),
            default_value: ErasedValue::new(metadata.default_value().clone()),
            metadata: Box::new(metadata),
        });
        self.by_name.insert(name, id);

        Property::from_id(id)
    }

    /// Returns the number of registered properties.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if no properties are registered.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Looks up a property by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<PropertyId> {
        self.by_name.get(name).copied()
    }

    /// Looks up a typed property by name.
    ///
    /// Returns `None` if the name is unknown or registered with another type.
    #[must_use]
    pub fn typed<T: PropertyValue>(&self, name: &str) -> Option<Property<T>> {
        let id = self.by_name(name)?;
        (self.get(id)?.type_id == TypeId::of::<T>()).then_some(Property::from_id(id))
    }

    /// Returns the name of a property.
    #[must_use]
    pub fn name(&self, id: PropertyId) -> Option<&'static str> {
        self.get(id).map(|r| r.name)
    }

    /// Returns the registration for a property.
    #[must_use]
    pub fn get(&self, id: PropertyId) -> Option<&PropertyRegistration> {
        self.properties.get(id.index() as usize)
    }

    /// Returns the dirty kinds affected by a property.
    #[must_use]
    pub fn affects(&self, id: PropertyId) -> DirtyKinds {
        self.get(id).map(|r| r.affects).unwrap_or_default()
    }

    /// Returns the registry default of a property.
    #[must_use]
    pub fn default_value(&self, id: PropertyId) -> Option<&ErasedValue> {
        self.get(id).map(|r| &r.default_value)
    }

    /// Returns the metadata for a typed property.
    ///
    /// Returns `None` if the property is not registered or the type doesn't match.
    #[must_use]
    pub fn get_metadata<T: PropertyValue>(
        &self,
        property: Property<T>,
    ) -> Option<&PropertyMetadata<T>> {
        self.get(property.id())
            .and_then(|r| r.metadata.downcast_ref())
    }

    /// Coerces and validates `value` with the property's callbacks.
    ///
    /// Unregistered properties pass through unchanged.
    pub fn prepare<T: PropertyValue>(
        &self,
        property: Property<T>,
        value: T,
    ) -> Result<T, InvalidValue> {
        match self.get_metadata(property) {
            Some(metadata) => metadata.prepare(value),
            None => Ok(value),
        }
    }

    /// Returns an iterator over all registered properties.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &PropertyRegistration)> {
        self.properties.iter().enumerate().map(|(i, r)| {
            #[expect(clippy::cast_possible_truncation, reason = "index < len < u16::MAX")]
            (PropertyId::new(i as u16), r)
        })
    }
}

impl fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("count", &self.properties.len())
            .field(
                "properties",
                &self.properties.iter().map(|r| r.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::PropertyMetadataBuilder;
    use alloc::string::String;
    use alloc::{format, vec, vec::Vec};

    #[test]
    fn registry_register() {
        let mut registry = PropertyRegistry::new();
        assert!(registry.is_empty());

        let width = registry.register("width", PropertyMetadataBuilder::new(0.0_f64).build());

        assert_eq!(registry.len(), 1);
        assert_eq!(width.id().index(), 0);
        assert_eq!(registry.name(width.id()), Some("width"));
        assert_eq!(registry.name(PropertyId::new(999)), None);
    }

    #[test]
    fn typed_lookup_checks_the_value_type() {
        let mut registry = PropertyRegistry::new();
        let text = registry.register("text", PropertyMetadataBuilder::new(String::new()).build());

        assert_eq!(registry.typed::<String>("text"), Some(text));
        assert_eq!(registry.typed::<f64>("text"), None);
        assert_eq!(registry.typed::<String>("label"), None);
    }

    #[test]
    fn defaults_and_classification() {
        let mut registry = PropertyRegistry::new();
        let opacity = registry.register(
            "opacity",
            PropertyMetadataBuilder::new(1.0_f64).paint().build(),
        );

        assert_eq!(registry.affects(opacity.id()), DirtyKinds::DRAW);
        assert_eq!(
            registry.default_value(opacity.id()).and_then(|v| v.downcast_ref::<f64>()),
            Some(&1.0)
        );
        assert_eq!(
            registry.get_metadata(opacity).map(|m| *m.default_value()),
            Some(1.0)
        );
        assert!(registry.affects(PropertyId::new(42)).is_empty());
    }

    #[test]
    fn prepare_applies_callbacks() {
        let mut registry = PropertyRegistry::new();
        let opacity = registry.register(
            "opacity",
            PropertyMetadataBuilder::new(1.0_f64)
                .coerce(|v: f64| v.clamp(0.0, 1.0))
                .validate(|v| {
                    if v.is_nan() {
                        Err(InvalidValue::new("opacity is NaN"))
                    } else {
                        Ok(())
                    }
                })
                .build(),
        );

        assert_eq!(registry.prepare(opacity, 2.0), Ok(1.0));
        assert!(registry.prepare(opacity, f64::NAN).is_err());

        let stray: Property<f64> = Property::from_id(PropertyId::new(9));
        assert_eq!(registry.prepare(stray, 2.0), Ok(2.0));
    }

    #[test]
    fn registry_iter() {
        let mut registry = PropertyRegistry::new();
        registry.register("width", PropertyMetadataBuilder::new(0.0_f64).build());
        registry.register("height", PropertyMetadataBuilder::new(0.0_f64).build());

        let names: Vec<_> = registry.iter().map(|(_, r)| r.name()).collect();
        assert_eq!(names, vec!["width", "height"]);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn registry_duplicate_name() {
        let mut registry = PropertyRegistry::new();
        registry.register("width", PropertyMetadataBuilder::new(0.0_f64).build());
        registry.register("width", PropertyMetadataBuilder::new(0.0_f64).build());
    }

    #[test]
    fn registry_debug() {
        let mut registry = PropertyRegistry::new();
        registry.register("width", PropertyMetadataBuilder::new(0.0_f64).build());

        let debug = format!("{registry:?}");
        assert!(debug.contains("PropertyRegistry"));
        assert!(debug.contains("width"));
    }
}
