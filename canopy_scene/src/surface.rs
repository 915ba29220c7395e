// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The vector surface nodes draw onto.
//!
//! [`Surface`] is the only way drawing has a visible effect. Every method has
//! a default that does nothing, so partial implementations are valid; a
//! surface that cannot create elements returns `None` and the nodes simply
//! draw nothing.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;

/// Opaque handle to a surface element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(pub u64);

/// A retained vector-drawing surface.
pub trait Surface {
    /// Creates a detached element.
    fn create_element(&mut self, tag: &str) -> Option<ElementHandle> {
        let _ = tag;
        None
    }

    /// Sets an attribute on an element.
    fn set_attribute(&mut self, element: ElementHandle, name: &str, value: &str) {
        let _ = (element, name, value);
    }

    /// Appends `child` as the last child of `parent`, moving it if attached.
    fn append_child(&mut self, parent: ElementHandle, child: ElementHandle) {
        let _ = (parent, child);
    }

    /// Removes an element and its subtree.
    fn remove_element(&mut self, element: ElementHandle) {
        let _ = element;
    }
}

/// A surface that discards everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullSurface;

impl Surface for NullSurface {}

/// One call made on a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceCall {
    /// `create_element(tag)` returned `handle`.
    Create {
        /// The created element.
        handle: ElementHandle,
        /// The element tag.
        tag: String,
    },
    /// `set_attribute`.
    SetAttribute {
        /// The element.
        handle: ElementHandle,
        /// Attribute name.
        name: String,
        /// Attribute value.
        value: String,
    },
    /// `append_child`.
    Append {
        /// The parent element.
        parent: ElementHandle,
        /// The appended element.
        child: ElementHandle,
    },
    /// `remove_element`.
    Remove {
        /// The removed element.
        handle: ElementHandle,
    },
}

#[derive(Debug, Default)]
struct Recording {
    calls: Vec<SurfaceCall>,
    attributes: HashMap<(ElementHandle, String), String>,
    tags: HashMap<ElementHandle, String>,
    next: u64,
}

/// A surface that records every call.
///
/// Clones share the same recording, so a test can hand one clone to the
/// scene and inspect the other.
///
/// ```rust
/// use canopy_scene::{RecordingSurface, Surface};
///
/// let recording = RecordingSurface::default();
/// let mut surface = recording.clone();
/// let el = surface.create_element("circle").unwrap();
/// surface.set_attribute(el, "r", "10");
///
/// assert_eq!(recording.attribute(el, "r").as_deref(), Some("10"));
/// assert_eq!(recording.tag(el).as_deref(), Some("circle"));
/// assert_eq!(recording.calls().len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    inner: Rc<RefCell<Recording>>,
}

impl RecordingSurface {
    /// Returns a copy of every call so far.
    #[must_use]
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.inner.borrow().calls.clone()
    }

    /// Returns the latest value of an attribute.
    #[must_use]
    pub fn attribute(&self, element: ElementHandle, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .attributes
            .get(&(element, name.to_owned()))
            .cloned()
    }

    /// Returns the tag an element was created with.
    #[must_use]
    pub fn tag(&self, element: ElementHandle) -> Option<String> {
        self.inner.borrow().tags.get(&element).cloned()
    }

    /// Counts `set_attribute` calls for `name` on any element.
    #[must_use]
    pub fn count_attribute_writes(&self, name: &str) -> usize {
        self.inner
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, SurfaceCall::SetAttribute { name: n, .. } if n == name))
            .count()
    }

    /// Forgets recorded calls but keeps the element table.
    pub fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }
}

impl Surface for RecordingSurface {
    fn create_element(&mut self, tag: &str) -> Option<ElementHandle> {
        let mut rec = self.inner.borrow_mut();
        let handle = ElementHandle(rec.next);
        rec.next += 1;
        rec.tags.insert(handle, tag.to_owned());
        rec.calls.push(SurfaceCall::Create {
            handle,
            tag: tag.to_owned(),
        });
        Some(handle)
    }

    fn set_attribute(&mut self, element: ElementHandle, name: &str, value: &str) {
        let mut rec = self.inner.borrow_mut();
        rec.attributes
            .insert((element, name.to_owned()), value.to_owned());
        rec.calls.push(SurfaceCall::SetAttribute {
            handle: element,
            name: name.to_owned(),
            value: value.to_owned(),
        });
    }

    fn append_child(&mut self, parent: ElementHandle, child: ElementHandle) {
        self.inner
            .borrow_mut()
            .calls
            .push(SurfaceCall::Append { parent, child });
    }

    fn remove_element(&mut self, element: ElementHandle) {
        let mut rec = self.inner.borrow_mut();
        rec.attributes.retain(|(handle, _), _| *handle != element);
        rec.calls.push(SurfaceCall::Remove { handle: element });
    }
}
