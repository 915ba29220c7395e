// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property and node-kind identifiers.
//!
//! [`PropertyId`] is the runtime key stored in a [`PropertyStore`](crate::PropertyStore);
//! [`Property<T>`] adds the value type so reads and writes are checked at
//! compile time. [`KindId`] names a registered [`Schema`](crate::Schema).

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// A runtime property identifier.
///
/// Issued by [`PropertyRegistry::register`](crate::PropertyRegistry::register)
/// in registration order. The `u16` keeps per-node entries compact.
///
/// ```rust
/// use canopy_property::PropertyId;
///
/// let id = PropertyId::new(3);
/// assert_eq!(id.index(), 3);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(u16);

impl PropertyId {
    /// Creates a property ID from a registry index.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the registry index of this property.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyId({})", self.0)
    }
}

/// A typed property key.
///
/// `Property<T>` is a [`PropertyId`] tagged with the value type `T`. It is
/// `Copy` and the same size as the bare ID, so widgets keep their keys in
/// plain structs and pass them by value.
///
/// ```rust
/// use canopy_property::{PropertyMetadataBuilder, PropertyRegistry};
///
/// let mut registry = PropertyRegistry::new();
/// let radius = registry.register("radius", PropertyMetadataBuilder::new(0.0_f64).build());
///
/// // `radius` only accepts `f64` values.
/// assert_eq!(registry.name(radius.id()), Some("radius"));
/// ```
pub struct Property<T> {
    id: PropertyId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Property<T> {
    /// Wraps a property ID.
    ///
    /// The ID must have been registered with value type `T`; reads through a
    /// mismatched handle find no value.
    #[must_use]
    #[inline]
    pub const fn from_id(id: PropertyId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Returns the untyped ID.
    #[must_use]
    #[inline]
    pub const fn id(self) -> PropertyId {
        self.id
    }
}

impl<T> Copy for Property<T> {}

impl<T> Clone for Property<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Property<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Property<T> {}

impl<T> Hash for Property<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.id)
            .field("type", &core::any::type_name::<T>())
            .finish()
    }
}

/// Identifies a registered node kind (its [`Schema`](crate::Schema)).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct KindId(pub u16);

impl KindId {
    /// Returns the kind's index in its registry.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}
