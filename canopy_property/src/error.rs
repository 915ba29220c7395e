// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error returned when a property validator rejects a value.

use alloc::borrow::Cow;
use core::fmt;

/// A value was rejected by its property's validator.
///
/// The store is left untouched when this is returned.
#[derive(Clone, PartialEq, Eq)]
pub struct InvalidValue {
    reason: Cow<'static, str>,
}

impl InvalidValue {
    /// Creates an error with a human-readable reason.
    #[must_use]
    pub fn new(reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Returns the reason the value was rejected.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Debug for InvalidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InvalidValue({:?})", self.reason)
    }
}

impl fmt::Display for InvalidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid property value: {}", self.reason)
    }
}

impl core::error::Error for InvalidValue {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::ToString;

    #[test]
    fn display_includes_reason() {
        let err = InvalidValue::new("radius must be non-negative");
        assert_eq!(
            err.to_string(),
            "invalid property value: radius must be non-negative"
        );
        assert_eq!(err.reason(), "radius must be non-negative");
        assert_eq!(format!("{err:?}"), "InvalidValue(\"radius must be non-negative\")");
    }

    #[test]
    fn owned_reasons_are_accepted() {
        let err = InvalidValue::new(format!("{} is out of range", 7));
        assert_eq!(err.reason(), "7 is out of range");
    }
}
