// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property metadata definitions.
//!
//! [`PropertyMetadata`] holds a property's registry default, the
//! [`DirtyKinds`] a change invalidates, and optional coercion and validation
//! callbacks. [`PropertyMetadataBuilder`] constructs it.

use alloc::boxed::Box;
use canopy_dirty::DirtyKinds;
use core::fmt;

use crate::error::InvalidValue;
use crate::value::PropertyValue;

/// Callback for coercing a property value before it's compared and stored.
///
/// Typically clamps to a range.
pub type CoerceValueCallback<T> = Box<dyn Fn(T) -> T>;

/// Callback that accepts or rejects a coerced value.
pub type ValidateValueCallback<T> = Box<dyn Fn(&T) -> Result<(), InvalidValue>>;

/// Metadata for a registered property.
///
/// # Example
///
/// ```rust
/// use canopy_dirty::DirtyKinds;
/// use canopy_property::PropertyMetadataBuilder;
///
/// let metadata = PropertyMetadataBuilder::new(1.0_f64)
///     .paint()
///     .coerce(|v: f64| v.clamp(0.0, 1.0))
///     .build();
///
/// assert_eq!(metadata.default_value(), &1.0);
/// assert_eq!(metadata.affects(), DirtyKinds::DRAW);
/// assert_eq!(metadata.prepare(3.0), Ok(1.0));
/// ```
pub struct PropertyMetadata<T: PropertyValue> {
    default_value: T,
    affects: DirtyKinds,
    coerce_callback: Option<CoerceValueCallback<T>>,
    validate_callback: Option<ValidateValueCallback<T>>,
}

impl<T: PropertyValue> PropertyMetadata<T> {
    /// Creates metadata that invalidates nothing and accepts every value.
    #[must_use]
    pub fn new(default_value: T) -> Self {
        Self {
            default_value,
            affects: DirtyKinds::empty(),
            coerce_callback: None,
            validate_callback: None,
        }
    }

    /// Returns a reference to the default value.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    /// Returns the dirty kinds a change to this property invalidates.
    #[must_use]
    #[inline]
    pub fn affects(&self) -> DirtyKinds {
        self.affects
    }

    /// Coerces a value using the coerce callback if one is set.
    #[inline]
    pub fn coerce(&self, value: T) -> T {
        if let Some(callback) = &self.coerce_callback {
            callback(value)
        } else {
            value
        }
    }

    /// Runs the validator, if any.
    pub fn validate(&self, value: &T) -> Result<(), InvalidValue> {
        match &self.validate_callback {
            Some(callback) => callback(value),
            None => Ok(()),
        }
    }

    /// Coerces and then validates a value about to be stored.
    pub fn prepare(&self, value: T) -> Result<T, InvalidValue> {
        let value = self.coerce(value);
        self.validate(&value)?;
        Ok(value)
    }
}

impl<T: PropertyValue> fmt::Debug for PropertyMetadata<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMetadata")
            .field("default_value", &self.default_value)
            .field("affects", &self.affects)
            .field("has_coerce_callback", &self.coerce_callback.is_some())
            .field("has_validate_callback", &self.validate_callback.is_some())
            .finish()
    }
}

/// Builder for [`PropertyMetadata`].
///
/// The classification shortcuts mirror the three kinds of scene keys:
/// [`geometry`](Self::geometry) for keys that change a node's shape,
/// [`paint`](Self::paint) for keys that only change how it is drawn and
/// [`layout`](Self::layout) for keys that move it.
pub struct PropertyMetadataBuilder<T: PropertyValue> {
    metadata: PropertyMetadata<T>,
}

impl<T: PropertyValue> fmt::Debug for PropertyMetadataBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyMetadataBuilder")
            .field(&self.metadata)
            .finish()
    }
}

impl<T: PropertyValue> PropertyMetadataBuilder<T> {
    /// Creates a new builder with the given default value.
    #[must_use]
    pub fn new(default_value: T) -> Self {
        Self {
            metadata: PropertyMetadata::new(default_value),
        }
    }

    /// Sets the dirty kinds affected by changes to this property.
    #[must_use]
    pub fn affects(mut self, kinds: DirtyKinds) -> Self {
        self.metadata.affects = kinds;
        self
    }

    /// Classifies the property as geometry (re-measure and re-draw).
    #[must_use]
    pub fn geometry(self) -> Self {
        self.affects(DirtyKinds::GEOMETRY)
    }

    /// Classifies the property as paint (re-draw only).
    #[must_use]
    pub fn paint(self) -> Self {
        self.affects(DirtyKinds::DRAW)
    }

    /// Classifies the property as layout (re-position only).
    #[must_use]
    pub fn layout(self) -> Self {
        self.affects(DirtyKinds::POSITION)
    }

    /// Sets a callback to coerce values before they are stored.
    #[must_use]
    pub fn coerce<F>(mut self, callback: F) -> Self
    where
        F: Fn(T) -> T + 'static,
    {
        self.metadata.coerce_callback = Some(Box::new(callback));
        self
    }

    /// Sets a callback that rejects malformed values.
    #[must_use]
    pub fn validate<F>(mut self, callback: F) -> Self
    where
        F: Fn(&T) -> Result<(), InvalidValue> + 'static,
    {
        self.metadata.validate_callback = Some(Box::new(callback));
        self
    }

    /// Builds the [`PropertyMetadata`].
    #[must_use]
    pub fn build(self) -> PropertyMetadata<T> {
        self.metadata
    }
}
