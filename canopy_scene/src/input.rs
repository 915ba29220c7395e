// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Normalized input events delivered by the host.

use kurbo::Point;

bitflags::bitflags! {
    /// Modifier keys held during an input event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT = 0b0000_0001;
        /// Control.
        const CTRL  = 0b0000_0010;
        /// Alt / Option.
        const ALT   = 0b0000_0100;
        /// Meta / Command / Super.
        const META  = 0b0000_1000;
    }
}

/// What happened.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// The pointer entered the node.
    PointerEnter,
    /// The pointer left the node.
    PointerLeave,
    /// The pointer moved over the node.
    PointerMove,
    /// A pointer button was pressed.
    PointerDown,
    /// A pointer button was released.
    PointerUp,
    /// A key was pressed while the node had focus.
    KeyDown,
    /// A key was released while the node had focus.
    KeyUp,
}

/// A pointer or keyboard event, already hit-tested to a target node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InputEvent {
    /// What happened.
    pub kind: InputKind,
    /// Pointer position in surface coordinates.
    pub position: Point,
    /// Modifier keys held.
    pub modifiers: Modifiers,
}

impl InputEvent {
    /// Creates an event with no modifiers.
    #[must_use]
    pub fn new(kind: InputKind, position: Point) -> Self {
        Self {
            kind,
            position,
            modifiers: Modifiers::empty(),
        }
    }

    /// Sets the modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}
