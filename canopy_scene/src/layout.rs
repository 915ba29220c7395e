// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pluggable container layout.
//!
//! A [`LayoutStrategy`] turns the bounds of a container's children into one
//! offset per child. Strategies are pure: the result depends only on the
//! children's bounds, so running a layout twice without a mutation in
//! between produces the same offsets.

use kurbo::{Rect, Vec2};

use crate::error::LayoutError;
use crate::node::NodeId;

/// A child as seen by a layout strategy.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayoutChild {
    /// The child.
    pub id: NodeId,
    /// Measured bounds in the container's space, before any layout offset.
    pub bounds: Rect,
}

/// Places the children of a container.
pub trait LayoutStrategy {
    /// Returns one offset (or error) per child, in the same order.
    ///
    /// A child whose entry is an error keeps its previous offset.
    fn arrange(&self, children: &[LayoutChild]) -> Vec<Result<Vec2, LayoutError>>;
}

fn check(child: &LayoutChild) -> Result<(), LayoutError> {
    let b = child.bounds;
    if [b.x0, b.y0, b.x1, b.y1].iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(LayoutError::NonFiniteBounds(child.id))
    }
}

/// Leaves children where their own `x`/`y` put them.
#[derive(Copy, Clone, Debug, Default)]
pub struct Absolute;

impl LayoutStrategy for Absolute {
    fn arrange(&self, children: &[LayoutChild]) -> Vec<Result<Vec2, LayoutError>> {
        children.iter().map(|c| check(c).map(|()| Vec2::ZERO)).collect()
    }
}

/// Main axis of a [`Stack`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Axis {
    /// Left to right.
    #[default]
    Horizontal,
    /// Top to bottom.
    Vertical,
}

/// Places children one after another along an axis.
///
/// Each child's bounds start where the previous child's ended plus `gap`.
/// The cross axis is left to the child.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Stack {
    /// Main axis.
    pub axis: Axis,
    /// Space between consecutive children.
    pub gap: f64,
}

impl Stack {
    /// Creates a stack along `axis`.
    #[must_use]
    pub fn new(axis: Axis, gap: f64) -> Self {
        Self { axis, gap }
    }
}

impl LayoutStrategy for Stack {
    fn arrange(&self, children: &[LayoutChild]) -> Vec<Result<Vec2, LayoutError>> {
        let mut cursor = 0.0;
        children
            .iter()
            .map(|c| {
                check(c)?;
                let b = c.bounds;
                let offset = match self.axis {
                    Axis::Horizontal => {
                        let offset = Vec2::new(cursor - b.x0, 0.0);
                        cursor += b.width() + self.gap;
                        offset
                    }
                    Axis::Vertical => {
                        let offset = Vec2::new(0.0, cursor - b.y0);
                        cursor += b.height() + self.gap;
                        offset
                    }
                };
                if offset.is_finite() {
                    Ok(offset)
                } else {
                    Err(LayoutError::NonFiniteOffset(c.id))
                }
            })
            .collect()
    }
}

/// Places children row by row in uniform cells.
///
/// Cells are as wide as the widest child and as tall as the tallest.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Grid {
    /// Cells per row.
    pub columns: usize,
    /// Space between cells, both ways.
    pub gap: f64,
}

impl Grid {
    /// Creates a grid with `columns` cells per row.
    #[must_use]
    pub fn new(columns: usize, gap: f64) -> Self {
        Self { columns, gap }
    }
}

impl LayoutStrategy for Grid {
    fn arrange(&self, children: &[LayoutChild]) -> Vec<Result<Vec2, LayoutError>> {
        if self.columns == 0 {
            return children.iter().map(|_| Err(LayoutError::ZeroColumns)).collect();
        }
        let (cell_w, cell_h) = children
            .iter()
            .filter(|c| check(c).is_ok())
            .fold((0.0_f64, 0.0_f64), |(w, h), c| {
                (w.max(c.bounds.width()), h.max(c.bounds.height()))
            });
        children
            .iter()
            .enumerate()
            .map(|(i, c)| {
                check(c)?;
                let (col, row) = ((i % self.columns) as f64, (i / self.columns) as f64);
                let offset = Vec2::new(
                    col * (cell_w + self.gap) - c.bounds.x0,
                    row * (cell_h + self.gap) - c.bounds.y0,
                );
                if offset.is_finite() {
                    Ok(offset)
                } else {
                    Err(LayoutError::NonFiniteOffset(c.id))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(i: u32, bounds: Rect) -> LayoutChild {
        LayoutChild {
            id: NodeId::new(i, 0),
            bounds,
        }
    }

    #[test]
    fn absolute_keeps_children_in_place() {
        let out = Absolute.arrange(&[child(0, Rect::new(5.0, 5.0, 10.0, 10.0))]);
        assert_eq!(out, [Ok(Vec2::ZERO)]);
    }

    #[test]
    fn stack_lines_up_bounds() {
        let children = [
            child(0, Rect::new(-10.0, -10.0, 10.0, 10.0)),
            child(1, Rect::new(0.0, 0.0, 5.0, 5.0)),
        ];
        let out = Stack::new(Axis::Horizontal, 2.0).arrange(&children);
        assert_eq!(out, [Ok(Vec2::new(10.0, 0.0)), Ok(Vec2::new(22.0, 0.0))]);

        let out = Stack::new(Axis::Vertical, 0.0).arrange(&children);
        assert_eq!(out, [Ok(Vec2::new(0.0, 10.0)), Ok(Vec2::new(0.0, 20.0))]);
    }

    #[test]
    fn layout_is_idempotent() {
        let children = [
            child(0, Rect::new(0.0, 0.0, 3.0, 4.0)),
            child(1, Rect::new(0.0, 0.0, 6.0, 1.0)),
            child(2, Rect::new(0.0, 0.0, 2.0, 2.0)),
        ];
        let grid = Grid::new(2, 1.0);
        assert_eq!(grid.arrange(&children), grid.arrange(&children));
        assert_eq!(
            grid.arrange(&children),
            [
                Ok(Vec2::new(0.0, 0.0)),
                Ok(Vec2::new(7.0, 0.0)),
                Ok(Vec2::new(0.0, 5.0)),
            ]
        );
    }

    #[test]
    fn failures_are_per_child() {
        let children = [
            child(0, Rect::new(0.0, 0.0, f64::NAN, 1.0)),
            child(1, Rect::new(0.0, 0.0, 1.0, 1.0)),
        ];
        let out = Stack::default().arrange(&children);
        assert_eq!(out[0], Err(LayoutError::NonFiniteBounds(NodeId::new(0, 0))));
        assert_eq!(out[1], Ok(Vec2::ZERO));
        assert!(
            Grid::new(0, 0.0)
                .arrange(&children)
                .iter()
                .all(|r| *r == Err(LayoutError::ZeroColumns))
        );
    }
}
