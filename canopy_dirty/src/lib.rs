// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Dirty: dirty kinds and a coalescing invalidation queue.
//!
//! A retained scene graph re-renders incrementally: mutating a node marks it
//! dirty in one or more *kinds*, and a batched pass later validates every
//! dirty node exactly once. This crate holds the two building blocks for
//! that workflow:
//!
//! - [`DirtyKinds`]: which parts of a node must be recomputed
//!   (measure, draw, position) plus a marker for "a descendant is dirty".
//! - [`DirtyQueue`]: keys waiting for the next pass. Repeated marks of the
//!   same key before the queue is taken coalesce into a single entry holding
//!   the union of kinds, and entries keep first-mark order.
//!
//! ## Quick Start
//!
//! ```rust
//! use canopy_dirty::{DirtyKinds, DirtyQueue};
//!
//! let mut queue = DirtyQueue::<u32>::new();
//!
//! queue.mark(7, DirtyKinds::DRAW);
//! queue.mark(3, DirtyKinds::MEASURE);
//! // Coalesces with the first entry for key 7.
//! queue.mark(7, DirtyKinds::POSITION);
//!
//! let batch = queue.take();
//! assert_eq!(batch.len(), 2);
//! assert_eq!(batch[0], (7, DirtyKinds::DRAW | DirtyKinds::POSITION));
//! assert_eq!(batch[1], (3, DirtyKinds::MEASURE));
//!
//! // Marks after `take` start the next batch.
//! assert!(queue.is_empty());
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod kinds;
mod queue;

pub use kinds::DirtyKinds;
pub use queue::DirtyQueue;
