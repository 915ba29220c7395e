// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property value types.
//!
//! Every stored value implements [`PropertyValue`]: it can be cloned,
//! compared for equality (so no-op writes are detected) and interpolated (so
//! state transitions can animate it). [`ErasedValue`] stores any such value in
//! a heterogeneous collection; [`Value`] is the tagged union used for
//! undeclared, dynamically named keys.

use alloc::boxed::Box;
use alloc::string::String;
use core::any::{Any, TypeId};
use core::fmt;

/// A value that can live in a property store.
///
/// Equality is value equality: two colors with the same channels are equal
/// regardless of where they came from. [`interpolate`](Self::interpolate)
/// defaults to a step at the end of the transition, which suits values with
/// no meaningful midpoint (strings, flags).
pub trait PropertyValue: Clone + PartialEq + fmt::Debug + 'static {
    /// Returns the value at progress `t` (0.0 to 1.0) between `self` and `to`.
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        if t >= 1.0 { to.clone() } else { self.clone() }
    }
}

#[inline]
fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

impl PropertyValue for f64 {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        lerp(*self, *to, t)
    }
}

impl PropertyValue for f32 {
    #[expect(clippy::cast_possible_truncation, reason = "lerp between two f32 values")]
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        lerp(f64::from(*self), f64::from(*to), t) as Self
    }
}

impl PropertyValue for bool {}
impl PropertyValue for i32 {}
impl PropertyValue for u32 {}
impl PropertyValue for String {}
impl PropertyValue for &'static str {}

impl<T: PropertyValue> PropertyValue for Option<T> {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        match (self, to) {
            (Some(a), Some(b)) => Some(a.interpolate(b, t)),
            _ if t >= 1.0 => to.clone(),
            _ => self.clone(),
        }
    }
}

/// An 8-bit RGBA color.
///
/// ```rust
/// use canopy_property::{Color, PropertyValue};
///
/// let black = Color::rgb(0, 0, 0);
/// let white = Color::from_hex(0xffffff);
/// assert_eq!(black.interpolate(&white, 0.5), Color::rgb(128, 128, 128));
/// assert_eq!(white.to_string(), "#ffffff");
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 is opaque).
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Creates an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Creates a color with alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color from `0xRRGGBB`.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "masked to 8 bits")]
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb(
            ((hex >> 16) & 0xff) as u8,
            ((hex >> 8) & 0xff) as u8,
            (hex & 0xff) as u8,
        )
    }
}

#[expect(clippy::cast_possible_truncation, reason = "clamped to the u8 range")]
fn lerp_channel(from: u8, to: u8, t: f64) -> u8 {
    let v = lerp(f64::from(from), f64::from(to), t);
    let v = if v < 0.0 {
        0.0
    } else if v > 255.0 {
        255.0
    } else {
        v
    };
    (v + 0.5) as u8
}

impl PropertyValue for Color {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        Self {
            r: lerp_channel(self.r, to.r, t),
            g: lerp_channel(self.g, to.g, t),
            b: lerp_channel(self.b, to.b, t),
            a: lerp_channel(self.a, to.a, t),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                f64::from(self.a) / 255.0
            )
        }
    }
}

/// A size with a unit: absolute pixels or a percentage of the container.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Dimension {
    /// Absolute size in surface units.
    Px(f64),
    /// Relative size, where `100.0` is the full extent of the container.
    Percent(f64),
}

impl Default for Dimension {
    fn default() -> Self {
        Self::Px(0.0)
    }
}

impl Dimension {
    /// Resolves against the container extent `full`.
    #[must_use]
    pub fn resolve(self, full: f64) -> f64 {
        match self {
            Self::Px(v) => v,
            Self::Percent(p) => full * p / 100.0,
        }
    }
}

impl PropertyValue for Dimension {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        match (*self, *to) {
            (Self::Px(a), Self::Px(b)) => Self::Px(lerp(a, b, t)),
            (Self::Percent(a), Self::Percent(b)) => Self::Percent(lerp(a, b, t)),
            _ if t >= 1.0 => *to,
            _ => *self,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(v) => write!(f, "{v}"),
            Self::Percent(p) => write!(f, "{p}%"),
        }
    }
}

/// Tagged union for dynamically named keys outside a node's schema.
#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    /// A number.
    Number(f64),
    /// A flag.
    Bool(bool),
    /// Free text.
    Text(String),
    /// A color.
    Color(Color),
    /// A size with a unit.
    Dimension(Dimension),
}

impl Value {
    /// Returns the number, if this is [`Value::Number`].
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text, if this is [`Value::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl PropertyValue for Value {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        match (self, to) {
            (Self::Number(a), Self::Number(b)) => Self::Number(lerp(*a, *b, t)),
            (Self::Color(a), Self::Color(b)) => Self::Color(a.interpolate(b, t)),
            (Self::Dimension(a), Self::Dimension(b)) => Self::Dimension(a.interpolate(b, t)),
            _ if t >= 1.0 => to.clone(),
            _ => self.clone(),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(String::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Color> for Value {
    fn from(v: Color) -> Self {
        Self::Color(v)
    }
}

impl From<Dimension> for Value {
    fn from(v: Dimension) -> Self {
        Self::Dimension(v)
    }
}

/// A type-erased property value.
///
/// Wraps any [`PropertyValue`] on the heap together with its type, and keeps
/// equality, interpolation and `Debug` available without knowing the type.
///
/// ```rust
/// use canopy_property::ErasedValue;
///
/// let a = ErasedValue::new(10.0_f64);
/// let b = ErasedValue::new(20.0_f64);
/// assert_eq!(a.downcast_ref::<f64>(), Some(&10.0));
/// assert!(!a.value_eq(&b));
/// assert_eq!(a.interpolate(&b, 0.5).downcast_ref::<f64>(), Some(&15.0));
/// ```
pub struct ErasedValue {
    inner: Box<dyn ErasedValueTrait>,
    type_id: TypeId,
}

impl ErasedValue {
    /// Erases a concrete value.
    #[must_use]
    pub fn new<T: PropertyValue>(value: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            inner: Box::new(value),
        }
    }

    /// Returns the [`TypeId`] of the contained value.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns `true` if the contained value is of type `T`.
    #[must_use]
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Borrows the value as `T`, or `None` if it has another type.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        if self.is::<T>() {
            self.inner.as_any().downcast_ref()
        } else {
            None
        }
    }

    /// Returns `true` if both values have the same type and compare equal.
    #[must_use]
    pub fn value_eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.inner.eq_erased(other.inner.as_any())
    }

    /// Interpolates towards `to` at progress `t`.
    ///
    /// Values of different types cannot be blended; the result steps to `to`
    /// once `t` reaches 1.0.
    #[must_use]
    pub fn interpolate(&self, to: &Self, t: f64) -> Self {
        if self.type_id == to.type_id {
            if let Some(v) = self.inner.interpolate_erased(to.inner.as_any(), t) {
                return Self {
                    inner: v,
                    type_id: self.type_id,
                };
            }
        }
        if t >= 1.0 { to.clone() } else { self.clone() }
    }
}

impl Clone for ErasedValue {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_boxed(),
            type_id: self.type_id,
        }
    }
}

impl PartialEq for ErasedValue {
    fn eq(&self, other: &Self) -> bool {
        self.value_eq(other)
    }
}

impl fmt::Debug for ErasedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt_erased(f)
    }
}

/// Object-safe view of a [`PropertyValue`].
trait ErasedValueTrait: Any {
    fn as_any(&self) -> &dyn Any;
    fn clone_boxed(&self) -> Box<dyn ErasedValueTrait>;
    fn eq_erased(&self, other: &dyn Any) -> bool;
    fn interpolate_erased(&self, to: &dyn Any, t: f64) -> Option<Box<dyn ErasedValueTrait>>;
    fn fmt_erased(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T: PropertyValue> ErasedValueTrait for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn ErasedValueTrait> {
        Box::new(self.clone())
    }

    fn eq_erased(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self == other)
    }

    fn interpolate_erased(&self, to: &dyn Any, t: f64) -> Option<Box<dyn ErasedValueTrait>> {
        let to = to.downcast_ref::<T>()?;
        Some(Box::new(self.interpolate(to, t)))
    }

    fn fmt_erased(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
