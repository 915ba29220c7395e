// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty kinds: the invalidation domains of a scene node.

bitflags::bitflags! {
    /// The set of recomputations a node needs before it is valid again.
    ///
    /// Property metadata classifies each key by the kinds it affects:
    /// geometry keys affect [`MEASURE`](Self::MEASURE) and [`DRAW`](Self::DRAW),
    /// paint keys only [`DRAW`](Self::DRAW), and layout keys
    /// [`POSITION`](Self::POSITION).
    ///
    /// # Example
    ///
    /// ```
    /// use canopy_dirty::DirtyKinds;
    ///
    /// let geometry = DirtyKinds::GEOMETRY;
    /// assert!(geometry.contains(DirtyKinds::MEASURE));
    /// assert!(geometry.contains(DirtyKinds::DRAW));
    /// assert!(!geometry.contains(DirtyKinds::POSITION));
    /// ```
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct DirtyKinds: u8 {
        /// Bounds must be re-measured.
        const MEASURE  = 0b0000_0001;
        /// Surface output must be re-drawn.
        const DRAW     = 0b0000_0010;
        /// Transform, visibility or placement must be re-applied.
        const POSITION = 0b0000_0100;
        /// Some descendant is dirty; the node itself needs no recomputation.
        const CHILDREN = 0b0000_1000;

        /// Keys that change the shape of a node.
        const GEOMETRY = Self::MEASURE.bits() | Self::DRAW.bits();
        /// Everything a freshly created node needs.
        const ALL = Self::MEASURE.bits() | Self::DRAW.bits() | Self::POSITION.bits();
    }
}

impl DirtyKinds {
    /// Returns the kinds a container must take on when a child is marked `self`.
    ///
    /// A child whose bounds or placement changed forces its container to
    /// re-measure and re-run layout. Any other child change only records
    /// that the subtree is dirty.
    #[must_use]
    pub fn propagated_to_parent(self) -> Self {
        if self.intersects(Self::MEASURE | Self::POSITION) {
            Self::MEASURE | Self::POSITION
        } else if self.is_empty() {
            Self::empty()
        } else {
            Self::CHILDREN
        }
    }

    /// Returns `true` if any of the node's own recomputations is requested.
    #[must_use]
    pub fn needs_work(self) -> bool {
        self.intersects(Self::ALL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_is_measure_and_draw() {
        assert_eq!(DirtyKinds::GEOMETRY, DirtyKinds::MEASURE | DirtyKinds::DRAW);
        assert!(!DirtyKinds::ALL.contains(DirtyKinds::CHILDREN));
    }

    #[test]
    fn measure_and_position_propagate_as_relayout() {
        let up = DirtyKinds::MEASURE.propagated_to_parent();
        assert_eq!(up, DirtyKinds::MEASURE | DirtyKinds::POSITION);
        let up = DirtyKinds::POSITION.propagated_to_parent();
        assert_eq!(up, DirtyKinds::MEASURE | DirtyKinds::POSITION);
    }

    #[test]
    fn paint_only_propagates_as_children_marker() {
        assert_eq!(DirtyKinds::DRAW.propagated_to_parent(), DirtyKinds::CHILDREN);
        assert_eq!(
            DirtyKinds::CHILDREN.propagated_to_parent(),
            DirtyKinds::CHILDREN
        );
        assert!(DirtyKinds::empty().propagated_to_parent().is_empty());
    }

    #[test]
    fn children_marker_is_not_work() {
        assert!(!DirtyKinds::CHILDREN.needs_work());
        assert!((DirtyKinds::CHILDREN | DirtyKinds::DRAW).needs_work());
    }
}
