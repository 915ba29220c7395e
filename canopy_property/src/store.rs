// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node sparse property storage.
//!
//! [`PropertyStore`] keeps three layers of typed values plus a bucket of
//! dynamically named extras:
//!
//! - **Local**: values set by the caller (the node's base values)
//! - **State**: overrides of the node's active visual state
//! - **Animation**: in-flight transition values (highest precedence)
//!
//! Each layer is a sorted vector searched by [`PropertyId`], which keeps the
//! handful of values a node usually carries contiguous and avoids hashing.
//! The local layer is stored inline for up to eight entries.

use alloc::boxed::Box;
use alloc::vec::Vec;
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::id::{Property, PropertyId};
use crate::registry::PropertyRegistry;
use crate::schema::Schema;
use crate::value::{ErasedValue, PropertyValue, Value};

/// Most nodes set fewer than eight local values.
const INLINE_CAPACITY: usize = 8;

type Entry = (PropertyId, ErasedValue);

/// A value layer of a [`PropertyStore`], lowest precedence first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Caller-set base values.
    Local,
    /// Overrides of the active visual state.
    State,
    /// Interpolated transition values.
    Animation,
}

/// Per-node sparse storage for property values.
///
/// # Resolution
///
/// - [`base`](Self::base): Local → kind default → registry default
/// - [`effective`](Self::effective): Animation → State → base
///
/// Defaults only apply to properties the node's [`Schema`] declares. An
/// undeclared property resolves to its local value or to nothing.
///
/// # Example
///
/// ```rust
/// use canopy_property::{PropertyMetadataBuilder, PropertyRegistry, PropertyStore, Schema};
///
/// let mut registry = PropertyRegistry::new();
/// let width = registry.register("width", PropertyMetadataBuilder::new(0.0_f64).build());
/// let schema = Schema::builder("rect").declare(width).build();
///
/// let mut store = PropertyStore::<u32>::new(1);
/// assert_eq!(store.get(width, &schema, &registry), Some(&0.0));
///
/// store.set_local(width, 100.0);
/// store.set_animation(width, 150.0);
/// assert_eq!(store.get(width, &schema, &registry), Some(&150.0));
/// assert_eq!(store.base(width.id(), &schema, &registry).and_then(|v| v.downcast_ref()), Some(&100.0));
/// ```
#[derive(Clone, Debug)]
pub struct PropertyStore<K> {
    local: SmallVec<[Entry; INLINE_CAPACITY]>,
    /// Stored out-of-line so nodes without states pay nothing.
    state: Vec<Entry>,
    animation: Vec<Entry>,
    extras: HashMap<Box<str>, Value>,
    owner: K,
}

#[inline]
fn find(entries: &[Entry], id: PropertyId) -> Result<usize, usize> {
    entries.binary_search_by_key(&id, |(pid, _)| *pid)
}

impl<K: Copy + Eq> PropertyStore<K> {
    /// Creates a new property store for the given owner key.
    #[must_use]
    pub fn new(owner: K) -> Self {
        Self {
            local: SmallVec::new(),
            state: Vec::new(),
            animation: Vec::new(),
            extras: HashMap::new(),
            owner,
        }
    }

    /// Returns the owner key of this store.
    #[must_use]
    #[inline]
    pub fn owner(&self) -> K {
        self.owner
    }

    /// Returns `true` if no layer and no extra holds a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
            && self.state.is_empty()
            && self.animation.is_empty()
            && self.extras.is_empty()
    }

    #[inline]
    fn entries(&self, layer: Layer) -> &[Entry] {
        match layer {
            Layer::Local => &self.local,
            Layer::State => &self.state,
            Layer::Animation => &self.animation,
        }
    }

    /// Returns the property IDs with a value in `layer`, ascending.
    pub fn layer_ids(&self, layer: Layer) -> impl Iterator<Item = PropertyId> + '_ {
        self.entries(layer).iter().map(|(id, _)| *id)
    }

    /// Returns the property IDs with a value in any layer, ascending.
    pub fn property_ids(&self) -> impl Iterator<Item = PropertyId> {
        let mut ids: SmallVec<[PropertyId; INLINE_CAPACITY]> = self
            .local
            .iter()
            .chain(&self.state)
            .chain(&self.animation)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter()
    }

    /// Returns the raw value of `id` in `layer`.
    #[must_use]
    #[inline]
    pub fn get_layer(&self, id: PropertyId, layer: Layer) -> Option<&ErasedValue> {
        let entries = self.entries(layer);
        find(entries, id).ok().map(|idx| &entries[idx].1)
    }

    /// Stores a raw value in `layer`, returning the value it replaced.
    pub fn set_layer(
        &mut self,
        id: PropertyId,
        layer: Layer,
        value: ErasedValue,
    ) -> Option<ErasedValue> {
        match layer {
            Layer::Local => match find(&self.local, id) {
                Ok(idx) => Some(core::mem::replace(&mut self.local[idx].1, value)),
                Err(idx) => {
                    self.local.insert(idx, (id, value));
                    None
                }
            },
            Layer::State | Layer::Animation => {
                let entries = if layer == Layer::State {
                    &mut self.state
                } else {
                    &mut self.animation
                };
                match find(entries, id) {
                    Ok(idx) => Some(core::mem::replace(&mut entries[idx].1, value)),
                    Err(idx) => {
                        entries.insert(idx, (id, value));
                        None
                    }
                }
            }
        }
    }

    /// Removes the value of `id` from `layer`.
    pub fn clear_layer(&mut self, id: PropertyId, layer: Layer) -> Option<ErasedValue> {
        match layer {
            Layer::Local => {
                let idx = find(&self.local, id).ok()?;
                Some(self.local.remove(idx).1)
            }
            Layer::State => {
                let idx = find(&self.state, id).ok()?;
                Some(self.state.remove(idx).1)
            }
            Layer::Animation => {
                let idx = find(&self.animation, id).ok()?;
                Some(self.animation.remove(idx).1)
            }
        }
    }

    /// Empties `layer`, returning how many values it held.
    pub fn clear_layer_all(&mut self, layer: Layer) -> usize {
        match layer {
            Layer::Local => {
                let len = self.local.len();
                self.local.clear();
                len
            }
            Layer::State => {
                let len = self.state.len();
                self.state.clear();
                len
            }
            Layer::Animation => {
                let len = self.animation.len();
                self.animation.clear();
                len
            }
        }
    }

    // =========================================================================
    // Typed layer access
    // =========================================================================

    /// Gets the local value, if set.
    #[must_use]
    #[inline]
    pub fn get_local<T: PropertyValue>(&self, property: Property<T>) -> Option<&T> {
        self.get_layer(property.id(), Layer::Local)
            .and_then(ErasedValue::downcast_ref)
    }

    /// Sets the local value, returning the previous one.
    pub fn set_local<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        value: T,
    ) -> Option<ErasedValue> {
        self.set_layer(property.id(), Layer::Local, ErasedValue::new(value))
    }

    /// Returns `true` if the property has a local value.
    #[must_use]
    #[inline]
    pub fn has_local<T: PropertyValue>(&self, property: Property<T>) -> bool {
        find(&self.local, property.id()).is_ok()
    }

    /// Gets the animation value, if set.
    #[must_use]
    #[inline]
    pub fn get_animation<T: PropertyValue>(&self, property: Property<T>) -> Option<&T> {
        self.get_layer(property.id(), Layer::Animation)
            .and_then(ErasedValue::downcast_ref)
    }

    /// Sets the animation value, returning the previous one.
    pub fn set_animation<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        value: T,
    ) -> Option<ErasedValue> {
        self.set_layer(property.id(), Layer::Animation, ErasedValue::new(value))
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolves the base value: Local → kind default → registry default.
    #[must_use]
    pub fn base<'a>(
        &'a self,
        id: PropertyId,
        schema: &'a Schema,
        registry: &'a PropertyRegistry,
    ) -> Option<&'a ErasedValue> {
        if let Some(v) = self.get_layer(id, Layer::Local) {
            return Some(v);
        }
        if !schema.declares(id) {
            return None;
        }
        schema
            .default_erased(id)
            .or_else(|| registry.default_value(id))
    }

    /// Resolves the effective value: Animation → State → base.
    #[must_use]
    pub fn effective<'a>(
        &'a self,
        id: PropertyId,
        schema: &'a Schema,
        registry: &'a PropertyRegistry,
    ) -> Option<&'a ErasedValue> {
        self.get_layer(id, Layer::Animation)
            .or_else(|| self.get_layer(id, Layer::State))
            .or_else(|| self.base(id, schema, registry))
    }

    /// Typed variant of [`effective`](Self::effective).
    ///
    /// Returns `None` when nothing resolves or the stored type differs from `T`.
    #[must_use]
    pub fn get<'a, T: PropertyValue>(
        &'a self,
        property: Property<T>,
        schema: &'a Schema,
        registry: &'a PropertyRegistry,
    ) -> Option<&'a T> {
        self.effective(property.id(), schema, registry)
            .and_then(ErasedValue::downcast_ref)
    }

    // =========================================================================
    // Extras
    // =========================================================================

    /// Gets a dynamically named value.
    #[must_use]
    pub fn get_extra(&self, name: &str) -> Option<&Value> {
        self.extras.get(name)
    }

    /// Sets a dynamically named value, returning the previous one.
    pub fn set_extra(&mut self, name: &str, value: Value) -> Option<Value> {
        match self.extras.get_mut(name) {
            Some(slot) => Some(core::mem::replace(slot, value)),
            None => {
                self.extras.insert(name.into(), value);
                None
            }
        }
    }

    /// Removes a dynamically named value.
    pub fn clear_extra(&mut self, name: &str) -> Option<Value> {
        self.extras.remove(name)
    }

    /// Iterates over the named extras in arbitrary order.
    pub fn extras(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.extras.iter().map(|(k, v)| (&**k, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::PropertyMetadataBuilder;
    use alloc::vec::Vec;

    struct Fixture {
        registry: PropertyRegistry,
        schema: Schema,
        width: Property<f64>,
        count: Property<i32>,
        stray: Property<f64>,
    }

    fn fixture() -> Fixture {
        let mut registry = PropertyRegistry::new();
        let width = registry.register("width", PropertyMetadataBuilder::new(1.0_f64).build());
        let count = registry.register("count", PropertyMetadataBuilder::new(0_i32).build());
        let stray = registry.register("stray", PropertyMetadataBuilder::new(5.0_f64).build());
        let schema = Schema::builder("test")
            .declare_with_default(width, 10.0)
            .declare(count)
            .build();
        Fixture {
            registry,
            schema,
            width,
            count,
            stray,
        }
    }

    #[test]
    fn store_new() {
        let store = PropertyStore::<u32>::new(1);
        assert!(store.is_empty());
        assert_eq!(store.owner(), 1);
    }

    #[test]
    fn defaults_resolve_kind_then_registry() {
        let f = fixture();
        let store = PropertyStore::<u32>::new(1);
        assert_eq!(store.get(f.width, &f.schema, &f.registry), Some(&10.0));
        assert_eq!(store.get(f.count, &f.schema, &f.registry), Some(&0));
    }

    #[test]
    fn undeclared_properties_have_no_default() {
        let f = fixture();
        let mut store = PropertyStore::<u32>::new(1);
        assert_eq!(store.get(f.stray, &f.schema, &f.registry), None);

        store.set_local(f.stray, 2.0);
        assert_eq!(store.get(f.stray, &f.schema, &f.registry), Some(&2.0));
    }

    #[test]
    fn layers_take_precedence_in_order() {
        let f = fixture();
        let mut store = PropertyStore::<u32>::new(1);
        let id = f.width.id();

        store.set_local(f.width, 1.0);
        store.set_layer(id, Layer::State, ErasedValue::new(2.0_f64));
        assert_eq!(store.get(f.width, &f.schema, &f.registry), Some(&2.0));

        store.set_animation(f.width, 3.0);
        assert_eq!(store.get(f.width, &f.schema, &f.registry), Some(&3.0));

        assert_eq!(store.clear_layer_all(Layer::Animation), 1);
        assert_eq!(store.get(f.width, &f.schema, &f.registry), Some(&2.0));
        assert!(store.clear_layer(id, Layer::State).is_some());
        assert_eq!(store.get(f.width, &f.schema, &f.registry), Some(&1.0));
        assert_eq!(
            store
                .base(id, &f.schema, &f.registry)
                .and_then(|v| v.downcast_ref::<f64>()),
            Some(&1.0)
        );
    }

    #[test]
    fn set_returns_the_replaced_value() {
        let f = fixture();
        let mut store = PropertyStore::<u32>::new(1);

        assert!(store.set_local(f.width, 1.0).is_none());
        let old = store.set_local(f.width, 2.0);
        assert_eq!(old.and_then(|v| v.downcast_ref::<f64>().copied()), Some(1.0));
        assert!(store.has_local(f.width));
        assert_eq!(store.get_local(f.width), Some(&2.0));
        assert!(store.clear_layer(f.width.id(), Layer::Local).is_some());
        assert!(store.clear_layer(f.width.id(), Layer::Local).is_none());
    }

    #[test]
    fn property_ids_merge_layers() {
        let f = fixture();
        let mut store = PropertyStore::<u32>::new(1);
        store.set_local(f.stray, 1.0);
        store.set_local(f.width, 1.0);
        store.set_animation(f.width, 2.0);
        store.set_layer(f.count.id(), Layer::State, ErasedValue::new(3_i32));

        let ids: Vec<_> = store.property_ids().collect();
        assert_eq!(ids, [f.width.id(), f.count.id(), f.stray.id()]);
        let local: Vec<_> = store.layer_ids(Layer::Local).collect();
        assert_eq!(local, [f.width.id(), f.stray.id()]);
    }

    #[test]
    fn extras_live_outside_the_layers() {
        let mut store = PropertyStore::<u32>::new(1);
        assert!(store.set_extra("tooltip", Value::from("hello")).is_none());
        assert_eq!(store.get_extra("tooltip"), Some(&Value::from("hello")));

        let old = store.set_extra("tooltip", Value::from("bye"));
        assert_eq!(old, Some(Value::from("hello")));
        assert_eq!(store.extras().count(), 1);
        assert!(!store.is_empty());

        assert_eq!(store.clear_extra("tooltip"), Some(Value::from("bye")));
        assert!(store.get_extra("tooltip").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn mismatched_types_do_not_resolve() {
        let f = fixture();
        let mut store = PropertyStore::<u32>::new(1);
        store.set_layer(f.width.id(), Layer::Local, ErasedValue::new(7_i32));
        assert_eq!(store.get(f.width, &f.schema, &f.registry), None);
    }
}
