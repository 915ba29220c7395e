// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Property: typed, schema-restricted property storage.
//!
//! Every scene node owns a [`PropertyStore`]. Keys are typed [`Property<T>`]
//! handles issued by a shared [`PropertyRegistry`], and each node kind has a
//! [`Schema`] listing the properties it declares.
//!
//! ## Core Concepts
//!
//! ### Layers
//!
//! A store resolves a property through three layers, highest first:
//!
//! - **Animation** - values of an in-flight state transition
//! - **State** - overrides of the node's active visual state
//! - **Local** - values the caller set
//!
//! followed by the kind default from the [`Schema`] and the registry default
//! from the [`PropertyMetadata`]. Defaults apply to declared properties only.
//!
//! ### Metadata
//!
//! [`PropertyMetadata`] classifies each property by the
//! [`DirtyKinds`](canopy_dirty::DirtyKinds) a change invalidates, and may
//! coerce or reject incoming values.
//!
//! ### Values
//!
//! Stored values implement [`PropertyValue`], which provides equality (so
//! writes of an equal value are detected) and interpolation. [`Value`] is the
//! tagged union for dynamically named extras.
//!
//! ## Quick Start
//!
//! ```rust
//! use canopy_dirty::DirtyKinds;
//! use canopy_property::{
//!     Color, ErasedValue, Layer, PropertyMetadataBuilder, PropertyRegistry, PropertyStore,
//!     Schema,
//! };
//!
//! let mut registry = PropertyRegistry::new();
//! let radius = registry.register(
//!     "radius",
//!     PropertyMetadataBuilder::new(0.0_f64).geometry().build(),
//! );
//! let fill = registry.register(
//!     "fill",
//!     PropertyMetadataBuilder::new(Color::BLACK).paint().build(),
//! );
//! assert_eq!(registry.affects(radius.id()), DirtyKinds::MEASURE | DirtyKinds::DRAW);
//!
//! let circle = Schema::builder("circle")
//!     .declare_with_default(radius, 10.0)
//!     .declare(fill)
//!     .build();
//!
//! let mut store = PropertyStore::<u32>::new(1);
//! assert_eq!(store.get(radius, &circle, &registry), Some(&10.0));
//!
//! store.set_local(radius, 20.0);
//! store.set_layer(fill.id(), Layer::State, ErasedValue::new(Color::WHITE));
//! assert_eq!(store.get(radius, &circle, &registry), Some(&20.0));
//! assert_eq!(store.get(fill, &circle, &registry), Some(&Color::WHITE));
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod error;
mod id;
mod metadata;
mod registry;
mod schema;
mod store;
mod value;

pub use error::InvalidValue;
pub use id::{KindId, Property, PropertyId};
pub use metadata::{
    CoerceValueCallback, PropertyMetadata, PropertyMetadataBuilder, ValidateValueCallback,
};
pub use registry::{PropertyRegistration, PropertyRegistry};
pub use schema::{Schema, SchemaBuilder};
pub use store::{Layer, PropertyStore};
pub use value::{Color, Dimension, ErasedValue, PropertyValue, Value};
