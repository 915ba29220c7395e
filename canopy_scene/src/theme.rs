// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Theme lookup.
//!
//! The scene never hard-codes a palette. Nodes and states name a *role*
//! ("button-hover", "link") and the host's [`Theme`] maps it to a color.
//! Unknown roles resolve to `None` and the requesting override is skipped.

use std::fmt;
use std::rc::Rc;

use canopy_property::Color;

/// Maps color roles to concrete colors.
pub trait Theme {
    /// Returns the color for `role`, or `None` if the theme has no such role.
    fn color_for(&self, role: &str) -> Option<Color>;
}

/// An immutable role-to-color table.
///
/// Cloning is cheap; the table is shared behind an [`Rc`].
///
/// # Example
///
/// ```rust
/// use canopy_property::Color;
/// use canopy_scene::{StaticTheme, Theme};
///
/// let light = StaticTheme::builder()
///     .set("primary", Color::from_hex(0x0078d4))
///     .build();
/// let dark = StaticTheme::builder()
///     .set("primary", Color::from_hex(0x4cc2ff))
///     .build();
///
/// assert_eq!(light.color_for("primary"), Some(Color::from_hex(0x0078d4)));
/// assert_eq!(dark.color_for("primary"), Some(Color::from_hex(0x4cc2ff)));
/// assert_eq!(dark.color_for("link"), None);
/// ```
#[derive(Clone, Default)]
pub struct StaticTheme {
    /// Sorted by role for binary search lookup.
    roles: Rc<[(Box<str>, Color)]>,
}

impl StaticTheme {
    /// Starts an empty theme.
    #[must_use]
    pub fn builder() -> StaticThemeBuilder {
        StaticThemeBuilder::default()
    }

    /// Returns the number of roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns `true` if the theme has no roles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Iterates over the roles in sorted order.
    pub fn roles(&self) -> impl Iterator<Item = &str> + '_ {
        self.roles.iter().map(|(role, _)| &**role)
    }
}

impl Theme for StaticTheme {
    fn color_for(&self, role: &str) -> Option<Color> {
        self.roles
            .binary_search_by(|(r, _)| (**r).cmp(role))
            .ok()
            .map(|idx| self.roles[idx].1)
    }
}

impl fmt::Debug for StaticTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.roles.iter().map(|(r, c)| (r, c)))
            .finish()
    }
}

/// Builder for [`StaticTheme`].
#[derive(Debug, Default)]
pub struct StaticThemeBuilder {
    roles: Vec<(Box<str>, Color)>,
}

impl StaticThemeBuilder {
    /// Sets a role, replacing any earlier color for it.
    #[must_use]
    pub fn set(mut self, role: &str, color: Color) -> Self {
        match self.roles.binary_search_by(|(r, _)| (**r).cmp(role)) {
            Ok(idx) => self.roles[idx].1 = color,
            Err(idx) => self.roles.insert(idx, (role.into(), color)),
        }
        self
    }

    /// Builds the theme.
    #[must_use]
    pub fn build(self) -> StaticTheme {
        StaticTheme {
            roles: self.roles.into(),
        }
    }
}
