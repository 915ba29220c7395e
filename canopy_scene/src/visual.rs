// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capability traits for concrete visual elements.
//!
//! A widget is a node plus a [`Visual`]: a strategy object that knows how to
//! measure and draw the node from its resolved properties, and which states
//! it starts with. [`Visual`] is implemented for every type that implements
//! [`Measurable`], [`Drawable`] and [`Stateful`].

use core::fmt;

use canopy_property::{Property, PropertyValue, Value};
use kurbo::Rect;

use crate::error::{HookError, SceneResult};
use crate::node::{NodeId, NodeView};
use crate::scene::Scene;
use crate::state::State;
use crate::surface::{ElementHandle, Surface};

/// A scene mutation postponed until after the current pass.
pub type Deferred = Box<dyn FnOnce(&mut Scene) -> SceneResult<()>>;

/// Computes a node's bounds in its local space.
pub trait Measurable {
    /// Returns the local bounds. Must not have side effects.
    fn measure(&self, cx: &MeasureCx<'_>) -> Result<Rect, HookError>;
}

/// Issues surface calls for a node.
pub trait Drawable {
    /// Tag of the element backing the node.
    fn tag(&self) -> &'static str {
        "path"
    }

    /// Writes the node's element.
    ///
    /// Mutations of the scene must go through [`DrawCx::defer`]; they take
    /// effect on the next flush.
    fn draw(&mut self, cx: &mut DrawCx<'_>) -> Result<(), HookError>;
}

/// Supplies a widget's initial states.
pub trait Stateful {
    /// States installed when the node is created.
    fn states(&self) -> Vec<State> {
        Vec::new()
    }

    /// Whether pointer input drives the `hover`/`down` states.
    fn interactive(&self) -> bool {
        false
    }
}

/// A complete visual strategy.
pub trait Visual: Measurable + Drawable + Stateful {}

impl<T: Measurable + Drawable + Stateful + ?Sized> Visual for T {}

/// Read access for [`Measurable::measure`].
pub struct MeasureCx<'a> {
    view: NodeView<'a>,
}

impl<'a> MeasureCx<'a> {
    pub(crate) fn new(view: NodeView<'a>) -> Self {
        Self { view }
    }

    /// Returns the node being measured.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.view.id()
    }

    /// Reads an adapter- and state-resolved property.
    #[must_use]
    pub fn get<T: PropertyValue>(&self, property: Property<T>) -> Option<T> {
        resolve(&self.view, property)
    }

    /// Reads a property, falling back to `default` when it is unset.
    #[must_use]
    pub fn get_or<T: PropertyValue>(&self, property: Property<T>, default: T) -> T {
        self.get(property).unwrap_or(default)
    }

    /// Reads a named extra through its adapters.
    #[must_use]
    pub fn extra(&self, name: &str) -> Option<Value> {
        let view = &self.view;
        view.node().resolve_extra(name, view.schema(), view.registry())
    }
}

impl fmt::Debug for MeasureCx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MeasureCx").field(&self.view).finish()
    }
}

fn resolve<T: PropertyValue>(view: &NodeView<'_>, property: Property<T>) -> Option<T> {
    view.node().resolve(property, view.schema(), view.registry())
}

/// Surface access for [`Drawable::draw`].
pub struct DrawCx<'a> {
    view: NodeView<'a>,
    element: Option<ElementHandle>,
    surface: &'a mut dyn Surface,
    deferred: &'a mut Vec<Deferred>,
}

impl<'a> DrawCx<'a> {
    pub(crate) fn new(
        view: NodeView<'a>,
        element: Option<ElementHandle>,
        surface: &'a mut dyn Surface,
        deferred: &'a mut Vec<Deferred>,
    ) -> Self {
        Self {
            view,
            element,
            surface,
            deferred,
        }
    }

    /// Returns the node being drawn.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.view.id()
    }

    /// Reads an adapter- and state-resolved property.
    #[must_use]
    pub fn get<T: PropertyValue>(&self, property: Property<T>) -> Option<T> {
        resolve(&self.view, property)
    }

    /// Reads a property, falling back to `default` when it is unset.
    #[must_use]
    pub fn get_or<T: PropertyValue>(&self, property: Property<T>, default: T) -> T {
        self.get(property).unwrap_or(default)
    }

    /// Reads a named extra through its adapters.
    #[must_use]
    pub fn extra(&self, name: &str) -> Option<Value> {
        let view = &self.view;
        view.node().resolve_extra(name, view.schema(), view.registry())
    }

    /// Returns the node's element, if the surface created one.
    #[must_use]
    pub fn element(&self) -> Option<ElementHandle> {
        self.element
    }

    /// Sets an attribute on the node's element.
    pub fn set_attribute(&mut self, name: &str, value: impl fmt::Display) {
        if let Some(element) = self.element {
            self.surface
                .set_attribute(element, name, &value.to_string());
        }
    }

    /// Creates an element under the node's element.
    pub fn create_element(&mut self, tag: &str) -> Option<ElementHandle> {
        let parent = self.element?;
        let child = self.surface.create_element(tag)?;
        self.surface.append_child(parent, child);
        Some(child)
    }

    /// Returns the raw surface.
    pub fn surface(&mut self) -> &mut dyn Surface {
        &mut *self.surface
    }

    /// Postpones a scene mutation to the end of the pass.
    pub fn defer(&mut self, mutation: impl FnOnce(&mut Scene) -> SceneResult<()> + 'static) {
        self.deferred.push(Box::new(mutation));
    }

    /// Postpones setting a property of this node.
    pub fn defer_set<T: PropertyValue>(&mut self, property: Property<T>, value: T) {
        let id = self.id();
        self.defer(move |scene| scene.set(id, property, value).map(|_| ()));
    }
}

impl fmt::Debug for DrawCx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawCx")
            .field("view", &self.view)
            .field("element", &self.element)
            .field("deferred", &self.deferred.len())
            .finish_non_exhaustive()
    }
}
