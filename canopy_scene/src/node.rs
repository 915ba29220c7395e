// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nodes: the per-element state the scene arena holds.

use core::cell::RefCell;
use core::fmt;

use canopy_dirty::DirtyKinds;
use canopy_property::{
    ErasedValue, KindId, Property, PropertyRegistry, PropertyStore, PropertyValue, Schema, Value,
};
use hashbrown::HashMap;
use kurbo::{Affine, Point, Rect, Vec2};

use crate::adapter::{AdapterChain, AdapterKey};
use crate::disposer::{Disposer, DisposerRegistry};
use crate::event::{EventDispatcher, NodeEvent, Outcome};
use crate::layout::LayoutStrategy;
use crate::props::StandardProperties;
use crate::state::{StateSet, Transition};
use crate::surface::ElementHandle;
use crate::visual::Visual;

/// Identifier for a node in a [`Scene`](crate::Scene).
///
/// This is a generational handle: an index into the scene's slot arena plus
/// the slot's generation. Once a node is disposed its slot may be reused, and
/// the old handle then reports [`SceneError::Disposed`](crate::SceneError::Disposed)
/// instead of reaching the new occupant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32, u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn raw_idx(self) -> u32 {
        self.0
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.0, self.1)
    }
}

/// Where a node is in its life.
///
/// ```text
/// Created -> Configured -> Validated <-> Invalidated -> Disposed
/// ```
///
/// `Created` and `Configured` nodes have never been drawn. Any state may move
/// to `Disposed`, which is terminal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Freshly created; no property configured yet.
    Created,
    /// Configured but not yet validated by a flush.
    Configured,
    /// All dirty kinds cleared by a successful flush.
    Validated,
    /// Dirty since the last successful flush.
    Invalidated,
    /// Disposed; every operation fails.
    Disposed,
}

/// Pointer interaction state of an interactive node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct PointerState {
    pub(crate) hovered: bool,
    pub(crate) pressed: bool,
}

/// One visual element of the scene.
///
/// Nodes live in the scene's arena and are addressed by [`NodeId`]; callers
/// mutate them through [`Scene`](crate::Scene) methods and inspect them
/// through [`Scene::node`](crate::Scene::node).
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) kind: KindId,
    pub(crate) parent: Option<NodeId>,
    /// `Some` for containers, in paint order.
    pub(crate) children: Option<Vec<NodeId>>,
    pub(crate) layout: Option<Box<dyn LayoutStrategy>>,
    pub(crate) clip: bool,
    pub(crate) store: PropertyStore<NodeId>,
    pub(crate) adapters: AdapterChain,
    pub(crate) states: StateSet,
    pub(crate) transition: Option<Transition>,
    pub(crate) events: EventDispatcher,
    pub(crate) disposers: DisposerRegistry,
    pub(crate) dirty: DirtyKinds,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) visual: Option<Box<dyn Visual>>,
    pub(crate) element: Option<ElementHandle>,
    pub(crate) measured: Option<Rect>,
    /// Offset assigned by the parent's layout.
    pub(crate) offset: Vec2,
    /// Visibility last applied to the surface.
    pub(crate) shown: bool,
    pub(crate) interactive: bool,
    pub(crate) active: bool,
    pub(crate) pointer: PointerState,
    pub(crate) auto_hide: Option<Disposer>,
    /// Adapter-resolved values, cleared on every mutation of this node.
    cache: RefCell<HashMap<AdapterKey, ErasedValue>>,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: KindId) -> Self {
        Self {
            id,
            kind,
            parent: None,
            children: None,
            layout: None,
            clip: false,
            store: PropertyStore::new(id),
            adapters: AdapterChain::default(),
            states: StateSet::default(),
            transition: None,
            events: EventDispatcher::default(),
            disposers: DisposerRegistry::default(),
            dirty: DirtyKinds::empty(),
            lifecycle: Lifecycle::Created,
            visual: None,
            element: None,
            measured: None,
            offset: Vec2::ZERO,
            shown: false,
            interactive: false,
            active: false,
            pointer: PointerState::default(),
            auto_hide: None,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Returns the node's handle.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the node's kind.
    #[must_use]
    pub fn kind(&self) -> KindId {
        self.kind
    }

    /// Returns the owning container, if attached.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the children in paint order; empty for leaf nodes.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Returns `true` if the node can own children.
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.children.is_some()
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Returns the dirty kinds waiting for the next flush.
    #[must_use]
    pub fn dirty(&self) -> DirtyKinds {
        self.dirty
    }

    /// Returns the name of the active state.
    #[must_use]
    pub fn current_state(&self) -> &str {
        self.states.current()
    }

    /// Returns `true` while a state transition is animating.
    #[must_use]
    pub fn in_transition(&self) -> bool {
        self.transition.is_some()
    }

    /// Returns the surface element backing this node, once drawn.
    #[must_use]
    pub fn element(&self) -> Option<ElementHandle> {
        self.element
    }

    /// Returns the bounds recorded by the most recent measure pass.
    #[must_use]
    pub fn measured(&self) -> Option<Rect> {
        self.measured
    }

    /// Returns the offset the parent's layout assigned.
    #[must_use]
    pub fn layout_offset(&self) -> Vec2 {
        self.offset
    }

    /// Returns `true` if the node was last applied as visible.
    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Returns `true` if the active flag is set.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns `true` if the node is clipped to its measured bounds.
    #[must_use]
    pub fn clips(&self) -> bool {
        self.clip
    }

    /// Returns the number of cleanup actions the node still owns.
    #[must_use]
    pub fn pending_disposers(&self) -> usize {
        self.disposers.len()
    }

    pub(crate) fn view<'a>(
        &'a self,
        schema: &'a Schema,
        registry: &'a PropertyRegistry,
    ) -> NodeView<'a> {
        NodeView {
            node: self,
            schema,
            registry,
        }
    }

    /// Publishes `event` and drops the disposers of spent one-shot listeners.
    pub(crate) fn emit(&mut self, event: &NodeEvent) -> Outcome {
        let outcome = self.events.emit(event);
        for listener in self.events.take_spent() {
            if let Some(disposer) = self.disposers.find_listener(listener) {
                self.disposers.forget(disposer);
            }
        }
        outcome
    }

    pub(crate) fn clear_cache(&mut self) {
        self.cache.get_mut().clear();
    }

    /// Reads `adapter(state-override(base))`, caching the result.
    pub(crate) fn resolve<T: PropertyValue>(
        &self,
        property: Property<T>,
        schema: &Schema,
        registry: &PropertyRegistry,
    ) -> Option<T> {
        let key = AdapterKey::Property(property.id());
        if let Some(hit) = self.cache.borrow().get(&key)
            && let Some(v) = hit.downcast_ref::<T>()
        {
            return Some(v.clone());
        }
        let raw = self.store.get(property, schema, registry)?.clone();
        let value = self
            .adapters
            .apply(&key, raw, &self.view(schema, registry));
        self.cache
            .borrow_mut()
            .insert(key, ErasedValue::new(value.clone()));
        Some(value)
    }

    /// Reads a named extra through its adapters.
    pub(crate) fn resolve_extra(
        &self,
        name: &str,
        schema: &Schema,
        registry: &PropertyRegistry,
    ) -> Option<Value> {
        let key = AdapterKey::Named(name.into());
        if let Some(hit) = self.cache.borrow().get(&key)
            && let Some(v) = hit.downcast_ref::<Value>()
        {
            return Some(v.clone());
        }
        let raw = self.store.get_extra(name)?.clone();
        let value = self
            .adapters
            .apply(&key, raw, &self.view(schema, registry));
        self.cache
            .borrow_mut()
            .insert(key, ErasedValue::new(value.clone()));
        Some(value)
    }

    /// Transform from this node's space into its parent's, before layout.
    ///
    /// Scale and rotation (in degrees) pivot around `(pivot_x, pivot_y)`.
    pub(crate) fn own_transform(
        &self,
        schema: &Schema,
        registry: &PropertyRegistry,
        props: &StandardProperties,
    ) -> Affine {
        let read = |p: Property<f64>, default: f64| {
            self.resolve(p, schema, registry).unwrap_or(default)
        };
        let translate = Vec2::new(read(props.x, 0.0), read(props.y, 0.0));
        let pivot = Point::new(read(props.pivot_x, 0.0), read(props.pivot_y, 0.0));
        let scale = read(props.scale, 1.0);
        let rotation = read(props.rotation, 0.0);
        Affine::translate(translate)
            * Affine::rotate_about(rotation.to_radians(), pivot)
            * Affine::scale_about(scale, pivot)
    }

    /// Transform from this node's space into its parent's, including the
    /// offset assigned by the parent's layout.
    pub(crate) fn local_transform(
        &self,
        schema: &Schema,
        registry: &PropertyRegistry,
        props: &StandardProperties,
    ) -> Affine {
        Affine::translate(self.offset) * self.own_transform(schema, registry, props)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("lifecycle", &self.lifecycle)
            .field("dirty", &self.dirty)
            .field("state", &self.states.current())
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

/// Read-only view of a node handed to adapters and hooks.
///
/// Values read through a view are state-resolved but not adapted, so an
/// adapter can consult other properties of its target without recursing
/// into the adapter chain.
#[derive(Clone, Copy)]
pub struct NodeView<'a> {
    node: &'a Node,
    schema: &'a Schema,
    registry: &'a PropertyRegistry,
}

impl<'a> NodeView<'a> {
    /// Returns the node's handle.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.node.id
    }

    /// Returns the owning container, if attached.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.node.parent
    }

    /// Returns the name of the active state.
    #[must_use]
    pub fn current_state(&self) -> &'a str {
        self.node.states.current()
    }

    /// Reads a property without adapters: Animation → State → Local → defaults.
    #[must_use]
    pub fn raw<T: PropertyValue>(&self, property: Property<T>) -> Option<&'a T> {
        self.node.store.get(property, self.schema, self.registry)
    }

    /// Reads a named extra without adapters.
    #[must_use]
    pub fn extra(&self, name: &str) -> Option<&'a Value> {
        self.node.store.get_extra(name)
    }

    pub(crate) fn node(&self) -> &'a Node {
        self.node
    }

    pub(crate) fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub(crate) fn registry(&self) -> &'a PropertyRegistry {
        self.registry
    }
}

impl fmt::Debug for NodeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeView")
            .field("id", &self.node.id)
            .field("kind", &self.schema.name())
            .finish_non_exhaustive()
    }
}
