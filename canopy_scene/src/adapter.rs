// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapter chains: ordered value transformers applied on read.
//!
//! An adapter is a pure function `(value, target) -> value` attached to one
//! key of one node. Reading the key folds the stored value through every
//! adapter for that key:
//!
//! - Adapters run in ascending priority.
//! - Ties keep insertion order.
//! - Each adapter receives the previous adapter's output.
//!
//! Adapters never write to the property store; they only change the value in
//! transit. The chain itself caches nothing; [`Node`](crate::Node) caches
//! resolved values and clears the cache when membership changes.

use core::any::Any;
use core::fmt;

use canopy_property::PropertyId;

use crate::node::NodeView;

/// Boxed adapter for values of type `T`.
pub type AdapterFn<T> = Box<dyn Fn(T, &NodeView<'_>) -> T>;

/// The key an adapter intercepts.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AdapterKey {
    /// A registered property.
    Property(PropertyId),
    /// A dynamically named extra.
    Named(Box<str>),
}

impl From<PropertyId> for AdapterKey {
    fn from(id: PropertyId) -> Self {
        Self::Property(id)
    }
}

impl From<&str> for AdapterKey {
    fn from(name: &str) -> Self {
        Self::Named(name.into())
    }
}

/// Identifies an adapter within its node's chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AdapterId(u64);

struct Entry {
    id: AdapterId,
    key: AdapterKey,
    priority: i32,
    /// An [`AdapterFn<T>`] for the key's value type.
    adapter: Box<dyn Any>,
}

/// The adapters attached to one node, across all of its keys.
#[derive(Default)]
pub struct AdapterChain {
    /// Sorted by priority; insertion order within a priority.
    entries: Vec<Entry>,
    next_id: u64,
}

impl AdapterChain {
    /// Adds an adapter for `key`.
    pub fn add<T, F>(&mut self, key: AdapterKey, priority: i32, adapter: F) -> AdapterId
    where
        T: 'static,
        F: Fn(T, &NodeView<'_>) -> T + 'static,
    {
        let id = AdapterId(self.next_id);
        self.next_id += 1;
        let boxed: AdapterFn<T> = Box::new(adapter);
        let at = self.entries.partition_point(|e| e.priority <= priority);
        self.entries.insert(
            at,
            Entry {
                id,
                key,
                priority,
                adapter: Box::new(boxed),
            },
        );
        id
    }

    /// Removes an adapter, returning the key it was attached to.
    pub fn remove(&mut self, id: AdapterId) -> Option<AdapterKey> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx).key)
    }

    /// Folds `value` through every adapter for `key`.
    ///
    /// Adapters registered for another value type are skipped. With no
    /// adapters the value comes back unchanged.
    pub fn apply<T: 'static>(&self, key: &AdapterKey, value: T, target: &NodeView<'_>) -> T {
        self.entries
            .iter()
            .filter(|e| e.key == *key)
            .filter_map(|e| e.adapter.downcast_ref::<AdapterFn<T>>())
            .fold(value, |value, adapter| adapter(value, target))
    }

    /// Returns `true` if any adapter is attached to `key`.
    #[must_use]
    pub fn contains_key(&self, key: &AdapterKey) -> bool {
        self.entries.iter().any(|e| e.key == *key)
    }

    /// Returns the number of adapters across all keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no adapter is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for AdapterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (e.id, &e.key, e.priority)))
            .finish()
    }
}
