// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene: node arena, configuration surface and container operations.
//!
//! A [`Scene`] owns every node in a generational slot arena. Nodes are
//! addressed by [`NodeId`]; child-to-parent links are plain handles, and a
//! container owns its children through [`DisposeAction::Child`] entries in
//! its disposer registry.
//!
//! Every mutation marks the affected node in the scene's invalidation queue
//! and returns immediately. Surface work happens in [`Scene::flush`].

use core::fmt;
use std::time::Duration;

use canopy_dirty::{DirtyKinds, DirtyQueue};
use canopy_property::{
    ErasedValue, KindId, Layer, Property, PropertyId, PropertyMetadata, PropertyRegistry,
    PropertyValue, Schema, Value,
};
use kurbo::{Affine, Rect, Vec2};

use crate::adapter::AdapterKey;
use crate::config::SceneConfig;
use crate::disposer::{DisposeAction, Disposer};
use crate::error::{ConfigurationError, HookPhase, LayoutError, SceneError, SceneResult};
use crate::event::{EventKind, NodeEvent, Outcome};
use crate::input::{InputEvent, InputKind};
use crate::layout::{Absolute, LayoutChild, LayoutStrategy};
use crate::node::{Lifecycle, Node, NodeId, NodeView};
use crate::props::StandardProperties;
use crate::shapes::{Button, Circle, Label, Rectangle};
use crate::state::{ACTIVE_STATE, DEFAULT_STATE, DOWN_STATE, HOVER_STATE, State, switch_state};
use crate::surface::Surface;
use crate::theme::Theme;
use crate::timer::{Timer, TimerAction, TimerQueue};
use crate::visual::{MeasureCx, Visual};

/// Kinds every scene registers at creation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StandardKinds {
    /// Plain nodes: transform, opacity and visibility only.
    pub node: KindId,
    /// Containers.
    pub container: KindId,
    /// Circles.
    pub circle: KindId,
    /// Rectangles and buttons.
    pub rectangle: KindId,
    /// Text labels.
    pub label: KindId,
}

pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) node: Option<Node>,
}

/// Returns the node behind `id`, including one whose disposal is running.
pub(crate) fn slot(slots: &[Slot], id: NodeId) -> Option<&Node> {
    let slot = slots.get(id.idx())?;
    if slot.generation != id.generation() {
        return None;
    }
    slot.node.as_ref()
}

pub(crate) fn slot_mut(slots: &mut [Slot], id: NodeId) -> Option<&mut Node> {
    let slot = slots.get_mut(id.idx())?;
    if slot.generation != id.generation() {
        return None;
    }
    slot.node.as_mut()
}

/// Returns the node behind `id` unless it is disposed.
pub(crate) fn live(slots: &[Slot], id: NodeId) -> Option<&Node> {
    slot(slots, id).filter(|n| n.lifecycle != Lifecycle::Disposed)
}

pub(crate) fn live_mut(slots: &mut [Slot], id: NodeId) -> Option<&mut Node> {
    slot_mut(slots, id).filter(|n| n.lifecycle != Lifecycle::Disposed)
}

/// A retained scene graph.
///
/// ```rust
/// use std::time::Duration;
/// use canopy_scene::{Axis, RecordingSurface, Scene, Stack};
///
/// let surface = RecordingSurface::default();
/// let mut scene = Scene::new(surface.clone());
/// let p = scene.props();
///
/// let row = scene.create_container(Stack::new(Axis::Horizontal, 4.0));
/// let a = scene.create_circle(10.0).unwrap();
/// let b = scene.create_circle(10.0).unwrap();
/// scene.add_child(row, a, None).unwrap();
/// scene.add_child(row, b, None).unwrap();
///
/// let report = scene.flush(Duration::ZERO);
/// assert_eq!(report.drawn, 3);
/// // Circles are centered on their origin; the second starts after 20 + 4.
/// assert_eq!(scene.node(a).unwrap().layout_offset().x, 10.0);
/// assert_eq!(scene.node(b).unwrap().layout_offset().x, 34.0);
///
/// // Setting an equal value is a no-op.
/// assert!(!scene.set(a, p.radius, 10.0).unwrap());
/// assert!(scene.flush(Duration::ZERO).is_idle());
/// ```
pub struct Scene {
    pub(crate) config: SceneConfig,
    pub(crate) registry: PropertyRegistry,
    pub(crate) props: StandardProperties,
    pub(crate) kinds: Vec<Schema>,
    pub(crate) standard: StandardKinds,
    pub(crate) slots: Vec<Slot>,
    pub(crate) free: Vec<u32>,
    pub(crate) queue: DirtyQueue<NodeId>,
    pub(crate) timers: TimerQueue,
    pub(crate) surface: Box<dyn Surface>,
    pub(crate) theme: Option<Box<dyn Theme>>,
    /// Time of the most recent flush.
    pub(crate) now: Duration,
}

impl Scene {
    /// Creates an empty scene drawing into `surface`.
    pub fn new(surface: impl Surface + 'static) -> Self {
        Self::with_config(SceneConfig::default(), surface)
    }

    /// Creates an empty scene with explicit settings.
    pub fn with_config(config: SceneConfig, surface: impl Surface + 'static) -> Self {
        let mut registry = PropertyRegistry::new();
        let props = StandardProperties::register(&mut registry);
        let kinds = vec![
            props.node_schema(),
            props.container_schema(),
            props.circle_schema(),
            props.rectangle_schema(),
            props.label_schema(),
        ];
        let standard = StandardKinds {
            node: KindId(0),
            container: KindId(1),
            circle: KindId(2),
            rectangle: KindId(3),
            label: KindId(4),
        };
        Self {
            config,
            registry,
            props,
            kinds,
            standard,
            slots: Vec::new(),
            free: Vec::new(),
            queue: DirtyQueue::new(),
            timers: TimerQueue::default(),
            surface: Box::new(surface),
            theme: None,
            now: Duration::ZERO,
        }
    }

    /// Returns the scene's settings.
    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Returns the built-in property handles.
    #[must_use]
    pub fn props(&self) -> StandardProperties {
        self.props
    }

    /// Returns the built-in node kinds.
    #[must_use]
    pub fn kinds(&self) -> StandardKinds {
        self.standard
    }

    /// Returns the property registry.
    #[must_use]
    pub fn registry(&self) -> &PropertyRegistry {
        &self.registry
    }

    /// Registers an application property.
    ///
    /// # Panics
    ///
    /// Panics if a property with the same name is already registered.
    pub fn register_property<T: PropertyValue>(
        &mut self,
        name: &'static str,
        metadata: PropertyMetadata<T>,
    ) -> Property<T> {
        self.registry.register(name, metadata)
    }

    /// Registers a node kind and returns its ID.
    ///
    /// # Panics
    ///
    /// Panics if more than 65,535 kinds are registered.
    pub fn register_kind(&mut self, schema: Schema) -> KindId {
        let id = KindId(
            u16::try_from(self.kinds.len()).expect("too many node kinds for KindId (u16)"),
        );
        self.kinds.push(schema);
        id
    }

    /// Returns the schema of a registered kind.
    #[must_use]
    pub fn schema(&self, kind: KindId) -> Option<&Schema> {
        self.kinds.get(kind.index())
    }

    /// Installs the theme states read role colors from.
    ///
    /// Takes effect the next time a state is applied.
    pub fn set_theme(&mut self, theme: impl Theme + 'static) {
        self.theme = Some(Box::new(theme));
    }

    /// Returns the time passed to the most recent flush.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Returns the pending timers, so a host can sleep until the next one.
    #[must_use]
    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter_map(|s| s.node.as_ref())
            .filter(|n| n.lifecycle != Lifecycle::Disposed)
            .count()
    }

    /// Returns `true` if the scene holds no live node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `id` refers to a live node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        live(&self.slots, id).is_some()
    }

    /// Returns a live node.
    pub fn node(&self, id: NodeId) -> SceneResult<&Node> {
        live(&self.slots, id).ok_or(SceneError::Disposed(id))
    }

    fn node_mut(&mut self, id: NodeId) -> SceneResult<&mut Node> {
        live_mut(&mut self.slots, id).ok_or(SceneError::Disposed(id))
    }

    pub(crate) fn schema_of(&self, node: &Node) -> &Schema {
        &self.kinds[node.kind.index()]
    }

    fn property_name(&self, id: PropertyId) -> &'static str {
        self.registry.name(id).unwrap_or("<unregistered>")
    }

    // --- creation ---------------------------------------------------------

    fn alloc(&mut self, kind: KindId) -> NodeId {
        let id = if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            NodeId::new(idx, slot.generation)
        } else {
            let idx = u32::try_from(self.slots.len()).expect("too many nodes for NodeId (u32)");
            self.slots.push(Slot {
                generation: 1,
                node: None,
            });
            NodeId::new(idx, 1)
        };
        self.slots[id.idx()].node = Some(Node::new(id, kind));
        id
    }

    /// Creates a node of `kind`, optionally with a visual.
    ///
    /// The visual's default states are installed and the node is queued for
    /// its first draw.
    pub fn create_node(
        &mut self,
        kind: KindId,
        visual: Option<Box<dyn Visual>>,
    ) -> SceneResult<NodeId> {
        if kind.index() >= self.kinds.len() {
            return Err(ConfigurationError::UnknownKind(kind).into());
        }
        let id = self.alloc(kind);
        let node = self.node_mut(id)?;
        if let Some(visual) = visual {
            for state in visual.states() {
                node.states.insert(state);
            }
            node.interactive = visual.interactive();
            node.visual = Some(visual);
        }
        self.mark(id, DirtyKinds::ALL);
        tracing::trace!(node = %id, kind = kind.0, "created node");
        Ok(id)
    }

    /// Creates a container laid out by `layout`.
    pub fn create_container(&mut self, layout: impl LayoutStrategy + 'static) -> NodeId {
        let id = self.alloc(self.standard.container);
        if let Some(node) = live_mut(&mut self.slots, id) {
            node.children = Some(Vec::new());
            node.layout = Some(Box::new(layout));
        }
        self.mark(id, DirtyKinds::ALL);
        tracing::trace!(node = %id, "created container");
        id
    }

    fn create_with(
        &mut self,
        kind: KindId,
        visual: Box<dyn Visual>,
        init: impl FnOnce(&mut Self, NodeId) -> SceneResult<()>,
    ) -> SceneResult<NodeId> {
        let id = self.create_node(kind, Some(visual))?;
        if let Err(error) = init(self, id) {
            self.dispose(id);
            return Err(error);
        }
        Ok(id)
    }

    /// Creates a circle of the given radius.
    pub fn create_circle(&mut self, radius: f64) -> SceneResult<NodeId> {
        let p = self.props;
        self.create_with(self.standard.circle, Box::new(Circle::new(&p)), |scene, id| {
            scene.set(id, p.radius, radius).map(drop)
        })
    }

    /// Creates a rectangle with its origin at the top-left corner.
    pub fn create_rectangle(&mut self, width: f64, height: f64) -> SceneResult<NodeId> {
        let p = self.props;
        self.create_with(
            self.standard.rectangle,
            Box::new(Rectangle::new(&p)),
            |scene, id| {
                scene.set(id, p.width, width)?;
                scene.set(id, p.height, height).map(drop)
            },
        )
    }

    /// Creates a text label.
    pub fn create_label(&mut self, text: &str) -> SceneResult<NodeId> {
        let p = self.props;
        let text = text.to_owned();
        self.create_with(self.standard.label, Box::new(Label::new(&p)), |scene, id| {
            scene.set(id, p.text, text).map(drop)
        })
    }

    /// Creates an interactive button with themed states.
    pub fn create_button(&mut self, width: f64, height: f64) -> SceneResult<NodeId> {
        let p = self.props;
        self.create_with(
            self.standard.rectangle,
            Box::new(Button::new(&p)),
            |scene, id| {
                scene.set(id, p.width, width)?;
                scene.set(id, p.height, height).map(drop)
            },
        )
    }

    // --- properties -------------------------------------------------------

    /// Sets a local value.
    ///
    /// The value is coerced and validated first. Returns `Ok(false)` without
    /// invalidating anything when it equals the current base value.
    pub fn set<T: PropertyValue>(
        &mut self,
        id: NodeId,
        property: Property<T>,
        value: T,
    ) -> SceneResult<bool> {
        let name = self.property_name(property.id());
        let node = live_mut(&mut self.slots, id).ok_or(SceneError::Disposed(id))?;
        let value = self
            .registry
            .prepare(property, value)
            .map_err(|source| ConfigurationError::MalformedValue {
                property: name,
                source,
            })?;
        let schema = &self.kinds[node.kind.index()];
        let old = node.store.base(property.id(), schema, &self.registry).cloned();
        if old.as_ref().and_then(|v| v.downcast_ref::<T>()) == Some(&value) {
            return Ok(false);
        }
        node.store.set_local(property, value.clone());
        node.clear_cache();
        if node.lifecycle == Lifecycle::Created {
            node.lifecycle = Lifecycle::Configured;
        }
        self.mark(id, self.registry.affects(property.id()));
        self.emit(
            id,
            &NodeEvent::PropertyChanged {
                property: property.id(),
                name,
                old,
                new: Some(ErasedValue::new(value)),
            },
        );
        Ok(true)
    }

    /// Removes a local value so the property falls back to its default.
    ///
    /// Returns `Ok(false)` if there was no local value.
    pub fn clear<T: PropertyValue>(&mut self, id: NodeId, property: Property<T>) -> SceneResult<bool> {
        let name = self.property_name(property.id());
        let node = live_mut(&mut self.slots, id).ok_or(SceneError::Disposed(id))?;
        let schema = &self.kinds[node.kind.index()];
        let old = node.store.base(property.id(), schema, &self.registry).cloned();
        if node.store.clear_layer(property.id(), Layer::Local).is_none() {
            return Ok(false);
        }
        node.clear_cache();
        let new = node.store.base(property.id(), schema, &self.registry).cloned();
        let changed = match (&old, &new) {
            (Some(a), Some(b)) => !a.value_eq(b),
            (None, None) => false,
            _ => true,
        };
        if changed {
            self.mark(id, self.registry.affects(property.id()));
            self.emit(
                id,
                &NodeEvent::PropertyChanged {
                    property: property.id(),
                    name,
                    old,
                    new,
                },
            );
        }
        Ok(true)
    }

    /// Reads the effective value: `adapter(state-override(base))`.
    ///
    /// Fails with [`ConfigurationError::UnsetProperty`] when the property has
    /// neither a value nor a default for the node's kind.
    pub fn get<T: PropertyValue>(&self, id: NodeId, property: Property<T>) -> SceneResult<T> {
        self.try_get(id, property)?.ok_or_else(|| {
            ConfigurationError::UnsetProperty {
                property: self.property_name(property.id()).into(),
            }
            .into()
        })
    }

    /// Reads the effective value, or `None` when it is unset.
    pub fn try_get<T: PropertyValue>(
        &self,
        id: NodeId,
        property: Property<T>,
    ) -> SceneResult<Option<T>> {
        let node = self.node(id)?;
        Ok(node.resolve(property, self.schema_of(node), &self.registry))
    }

    /// Sets a named extra value. Extras carry no defaults and mark `DRAW`.
    pub fn set_extra(&mut self, id: NodeId, name: &str, value: impl Into<Value>) -> SceneResult<bool> {
        let value = value.into();
        let node = self.node_mut(id)?;
        if node.store.get_extra(name) == Some(&value) {
            return Ok(false);
        }
        node.store.set_extra(name, value);
        node.clear_cache();
        if node.lifecycle == Lifecycle::Created {
            node.lifecycle = Lifecycle::Configured;
        }
        self.mark(id, DirtyKinds::DRAW);
        self.emit(id, &NodeEvent::ExtraChanged { name: name.into() });
        Ok(true)
    }

    /// Reads a named extra through its adapters.
    pub fn get_extra(&self, id: NodeId, name: &str) -> SceneResult<Option<Value>> {
        let node = self.node(id)?;
        Ok(node.resolve_extra(name, self.schema_of(node), &self.registry))
    }

    /// Removes a named extra. Returns `Ok(false)` if it was not set.
    pub fn clear_extra(&mut self, id: NodeId, name: &str) -> SceneResult<bool> {
        let node = self.node_mut(id)?;
        if node.store.clear_extra(name).is_none() {
            return Ok(false);
        }
        node.clear_cache();
        self.mark(id, DirtyKinds::DRAW);
        self.emit(id, &NodeEvent::ExtraChanged { name: name.into() });
        Ok(true)
    }

    /// Marks a node dirty by hand.
    pub fn invalidate(&mut self, id: NodeId, kinds: DirtyKinds) -> SceneResult<()> {
        self.node(id)?;
        self.mark(id, kinds);
        Ok(())
    }

    // --- adapters ---------------------------------------------------------

    /// Attaches an adapter to a property.
    ///
    /// Adapters run in ascending `priority`, in insertion order within one
    /// priority, each receiving the previous one's output.
    pub fn add_adapter<T, F>(
        &mut self,
        id: NodeId,
        property: Property<T>,
        priority: i32,
        adapter: F,
    ) -> SceneResult<Disposer>
    where
        T: PropertyValue,
        F: Fn(T, &NodeView<'_>) -> T + 'static,
    {
        let node = self.node_mut(id)?;
        let adapter = node
            .adapters
            .add(AdapterKey::Property(property.id()), priority, adapter);
        let disposer = node.disposers.register(DisposeAction::Adapter(adapter));
        node.clear_cache();
        self.mark(id, self.registry.affects(property.id()));
        Ok(Disposer::new(id, disposer))
    }

    /// Attaches an adapter to a named extra.
    pub fn add_extra_adapter<F>(
        &mut self,
        id: NodeId,
        name: &str,
        priority: i32,
        adapter: F,
    ) -> SceneResult<Disposer>
    where
        F: Fn(Value, &NodeView<'_>) -> Value + 'static,
    {
        let node = self.node_mut(id)?;
        let adapter = node.adapters.add(AdapterKey::Named(name.into()), priority, adapter);
        let disposer = node.disposers.register(DisposeAction::Adapter(adapter));
        node.clear_cache();
        self.mark(id, DirtyKinds::DRAW);
        Ok(Disposer::new(id, disposer))
    }

    /// Folds an arbitrary value through the adapters of `property`.
    pub fn apply_adapters<T: PropertyValue>(
        &self,
        id: NodeId,
        property: Property<T>,
        value: T,
    ) -> SceneResult<T> {
        let node = self.node(id)?;
        let view = node.view(self.schema_of(node), &self.registry);
        Ok(node
            .adapters
            .apply(&AdapterKey::Property(property.id()), value, &view))
    }

    // --- states -----------------------------------------------------------

    /// Returns the named state, creating an empty one if missing.
    ///
    /// New states use the configured default transition. Edits take effect
    /// the next time the state is applied.
    pub fn create_state(&mut self, id: NodeId, name: &str) -> SceneResult<&mut State> {
        let duration = self.config.default_transition;
        Ok(self.node_mut(id)?.states.create(name, duration))
    }

    /// Adds or replaces a state.
    pub fn add_state(&mut self, id: NodeId, state: State) -> SceneResult<()> {
        self.node_mut(id)?.states.insert(state);
        Ok(())
    }

    /// Switches the node to the named state.
    ///
    /// Re-applying the current state is a no-op. With `animated`, values
    /// interpolate from their instantaneous value over the transition
    /// duration; otherwise they switch at once.
    pub fn apply_state(&mut self, id: NodeId, name: &str, animated: bool) -> SceneResult<()> {
        let node = live_mut(&mut self.slots, id).ok_or(SceneError::Disposed(id))?;
        if node.states.current() == name {
            return Ok(());
        }
        let target = node.states.get(name).cloned().ok_or_else(|| {
            ConfigurationError::UnknownState {
                name: name.to_owned(),
            }
        })?;
        let current = node
            .states
            .get(node.states.current())
            .cloned()
            .unwrap_or_else(|| State::new(DEFAULT_STATE, Duration::ZERO));
        let schema = &self.kinds[node.kind.index()];
        let switch = switch_state(
            &mut node.store,
            schema,
            &self.registry,
            &current,
            &target,
            self.theme.as_deref(),
            animated,
            self.now,
        );
        node.transition = switch.transition;
        node.states.set_current(name);
        node.clear_cache();
        let kinds = switch
            .keys
            .iter()
            .fold(DirtyKinds::empty(), |acc, key| acc | self.registry.affects(*key));
        tracing::debug!(node = %id, state = name, animated, "applied state");
        self.mark(id, kinds);
        self.emit(
            id,
            &NodeEvent::StateApplied {
                state: name.into(),
                animated,
            },
        );
        Ok(())
    }

    /// Sets the node's active flag and re-resolves its interaction state.
    pub fn set_active(&mut self, id: NodeId, active: bool) -> SceneResult<()> {
        let node = self.node_mut(id)?;
        if node.active == active {
            return Ok(());
        }
        node.active = active;
        self.sync_interaction_state(id)
    }

    fn sync_interaction_state(&mut self, id: NodeId) -> SceneResult<()> {
        let node = self.node(id)?;
        let wanted = [
            (node.pointer.pressed, DOWN_STATE),
            (node.pointer.hovered, HOVER_STATE),
            (node.active, ACTIVE_STATE),
        ]
        .into_iter()
        .find(|(on, name)| *on && node.states.contains(name))
        .map_or(DEFAULT_STATE, |(_, name)| name);
        self.apply_state(id, wanted, true)
    }

    // --- events -----------------------------------------------------------

    fn subscribe(
        &mut self,
        id: NodeId,
        filter: Option<EventKind>,
        once: bool,
        listener: impl FnMut(&NodeEvent) -> Outcome + 'static,
    ) -> SceneResult<Disposer> {
        let node = self.node_mut(id)?;
        let listener = if once {
            node.events.once(filter, listener)
        } else {
            node.events.on(filter, listener)
        };
        let disposer = node.disposers.register(DisposeAction::Listener(listener));
        Ok(Disposer::new(id, disposer))
    }

    /// Subscribes to one kind of event.
    pub fn on(
        &mut self,
        id: NodeId,
        kind: EventKind,
        mut listener: impl FnMut(&NodeEvent) + 'static,
    ) -> SceneResult<Disposer> {
        self.subscribe(id, Some(kind), false, move |event| {
            listener(event);
            Outcome::Continue
        })
    }

    /// Subscribes to every event of the node.
    pub fn on_any(
        &mut self,
        id: NodeId,
        mut listener: impl FnMut(&NodeEvent) + 'static,
    ) -> SceneResult<Disposer> {
        self.subscribe(id, None, false, move |event| {
            listener(event);
            Outcome::Continue
        })
    }

    /// Subscribes to the next event of one kind.
    pub fn once(
        &mut self,
        id: NodeId,
        kind: EventKind,
        mut listener: impl FnMut(&NodeEvent) + 'static,
    ) -> SceneResult<Disposer> {
        self.subscribe(id, Some(kind), true, move |event| {
            listener(event);
            Outcome::Continue
        })
    }

    /// Subscribes to input reaching the node, itself or through bubbling.
    ///
    /// Returning [`Outcome::Stop`] keeps the event from the node's ancestors.
    pub fn on_input(
        &mut self,
        id: NodeId,
        mut listener: impl FnMut(&InputEvent) -> Outcome + 'static,
    ) -> SceneResult<Disposer> {
        self.subscribe(id, Some(EventKind::Input), false, move |event| match event {
            NodeEvent::Input(input) => listener(input),
            _ => Outcome::Continue,
        })
    }

    pub(crate) fn emit(&mut self, id: NodeId, event: &NodeEvent) -> Outcome {
        live_mut(&mut self.slots, id).map_or(Outcome::Continue, |n| n.emit(event))
    }

    /// Routes input to `target` and then to its ancestors.
    ///
    /// Interactive targets first switch to their `hover`/`down` states.
    /// Returns `true` if a listener stopped propagation.
    pub fn dispatch_input(&mut self, target: NodeId, event: InputEvent) -> SceneResult<bool> {
        let interactive_states = self.config.interactive_states;
        let node = self.node_mut(target)?;
        if interactive_states && node.interactive {
            let pointer = &mut node.pointer;
            let changed = match event.kind {
                InputKind::PointerEnter => !core::mem::replace(&mut pointer.hovered, true),
                InputKind::PointerDown => !core::mem::replace(&mut pointer.pressed, true),
                InputKind::PointerUp => core::mem::replace(&mut pointer.pressed, false),
                InputKind::PointerLeave => {
                    let was = *pointer;
                    pointer.hovered = false;
                    pointer.pressed = false;
                    was.hovered || was.pressed
                }
                _ => false,
            };
            if changed {
                self.sync_interaction_state(target)?;
            }
        }
        let mut current = Some(target);
        while let Some(id) = current {
            let Some(node) = live_mut(&mut self.slots, id) else {
                break;
            };
            if node.emit(&NodeEvent::Input(event)) == Outcome::Stop {
                return Ok(true);
            }
            current = node.parent;
        }
        Ok(false)
    }

    // --- disposers and timers ---------------------------------------------

    /// Registers custom cleanup code owned by the node.
    pub fn register_disposer(
        &mut self,
        id: NodeId,
        cleanup: impl FnOnce() + 'static,
    ) -> SceneResult<Disposer> {
        let node = self.node_mut(id)?;
        let disposer = node
            .disposers
            .register(DisposeAction::Custom(Box::new(cleanup)));
        Ok(Disposer::new(id, disposer))
    }

    /// Runs one cleanup action early.
    ///
    /// Returns `false` if the action already ran (or its owner is disposed).
    pub fn release(&mut self, disposer: Disposer) -> bool {
        let owner = disposer.owner();
        let Some(node) = live_mut(&mut self.slots, owner) else {
            return false;
        };
        let Some(action) = node.disposers.take(disposer.id()) else {
            return false;
        };
        if node.auto_hide == Some(disposer) {
            node.auto_hide = None;
        }
        match action {
            DisposeAction::Child(child) => {
                self.dispose(child);
            }
            DisposeAction::Listener(listener) => {
                node.events.off(listener);
            }
            DisposeAction::Adapter(adapter) => {
                if let Some(key) = node.adapters.remove(adapter) {
                    node.clear_cache();
                    let kinds = match key {
                        AdapterKey::Property(p) => self.registry.affects(p),
                        AdapterKey::Named(_) => DirtyKinds::DRAW,
                    };
                    self.mark(owner, kinds);
                }
            }
            DisposeAction::Timer(timer) => {
                self.timers.cancel(timer);
            }
            DisposeAction::Custom(cleanup) => cleanup(),
        }
        true
    }

    /// Schedules `action` to run at the first flush `delay` after now.
    ///
    /// The timer is owned by the node; disposing the node cancels it.
    pub fn set_timeout(
        &mut self,
        id: NodeId,
        delay: Duration,
        action: TimerAction,
    ) -> SceneResult<Disposer> {
        let node = live_mut(&mut self.slots, id).ok_or(SceneError::Disposed(id))?;
        let timer = self.timers.reserve();
        let disposer = node.disposers.register(DisposeAction::Timer(timer));
        self.timers.insert(Timer {
            id: timer,
            owner: id,
            due: self.now + delay,
            disposer,
            action,
        });
        Ok(Disposer::new(id, disposer))
    }

    /// Shows the node now and hides it after `delay`.
    ///
    /// Calling this again restarts the countdown.
    pub fn auto_hide(&mut self, id: NodeId, delay: Duration) -> SceneResult<Disposer> {
        let visible = self.props.visible;
        self.set(id, visible, true)?;
        if let Some(previous) = self.node_mut(id)?.auto_hide.take() {
            self.release(previous);
        }
        let disposer = self.set_timeout(id, delay, TimerAction::SetVisible(false))?;
        self.node_mut(id)?.auto_hide = Some(disposer);
        Ok(disposer)
    }

    /// Disposes a node and everything it owns.
    ///
    /// Owned cleanup actions run newest first (children are disposed
    /// recursively), then the node publishes [`NodeEvent::Disposed`], leaves
    /// the surface and detaches from its parent. Returns `false` if the node
    /// was already disposed.
    pub fn dispose(&mut self, id: NodeId) -> bool {
        let Some(node) = live_mut(&mut self.slots, id) else {
            return false;
        };
        node.lifecycle = Lifecycle::Disposed;
        node.transition = None;
        node.auto_hide = None;
        let actions: Vec<DisposeAction> = node.disposers.drain().collect();
        for action in actions {
            match action {
                DisposeAction::Child(child) => {
                    self.dispose(child);
                }
                DisposeAction::Timer(timer) => {
                    self.timers.cancel(timer);
                }
                DisposeAction::Custom(cleanup) => cleanup(),
                // Dropped with the node; listeners still see `Disposed`.
                DisposeAction::Listener(_) | DisposeAction::Adapter(_) => {}
            }
        }
        self.queue.remove(id);

        let Some(node) = slot_mut(&mut self.slots, id) else {
            return true;
        };
        node.emit(&NodeEvent::Disposed);
        node.events.clear();
        let element = node.element.take();
        let parent = node.parent.take();
        let parent_disposing =
            parent.is_some_and(|p| slot(&self.slots, p).is_some_and(|n| n.lifecycle == Lifecycle::Disposed));
        if let Some(element) = element
            && !parent_disposing
        {
            self.surface.remove_element(element);
        }
        if let Some(parent) = parent {
            self.detach(parent, id);
        }

        let slot = &mut self.slots[id.idx()];
        slot.node = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.raw_idx());
        tracing::debug!(node = %id, "disposed node");
        true
    }

    // --- containers -------------------------------------------------------

    fn container(&self, id: NodeId) -> SceneResult<&Node> {
        let node = self.node(id)?;
        if node.is_container() {
            Ok(node)
        } else {
            Err(ConfigurationError::NotAContainer(id).into())
        }
    }

    /// Returns the children of a container, in paint order.
    pub fn children(&self, id: NodeId) -> SceneResult<&[NodeId]> {
        Ok(self.container(id)?.children())
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        live(&self.slots, id).and_then(|n| n.parent)
    }

    /// Returns the ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        core::iter::successors(self.parent_of(id), |p| self.parent_of(*p))
    }

    pub(crate) fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Adds `child` to `container` at `index` (or last).
    ///
    /// A child of another container moves here, keeping its identity and
    /// dirty state. A child already in `container` is re-ordered.
    pub fn add_child(
        &mut self,
        container: NodeId,
        child: NodeId,
        index: Option<usize>,
    ) -> SceneResult<()> {
        self.container(container)?;
        let previous = self.node(child)?.parent;
        if child == container || self.ancestors(container).any(|a| a == child) {
            return Err(ConfigurationError::WouldCycle { container, child }.into());
        }

        if previous == Some(container) {
            let node = self.node_mut(container)?;
            let children = node.children.get_or_insert_with(Vec::new);
            children.retain(|c| *c != child);
            let at = index.map_or(children.len(), |i| i.min(children.len()));
            children.insert(at, child);
            self.mark(container, DirtyKinds::ALL);
            return Ok(());
        }
        if let Some(previous) = previous {
            self.detach(previous, child);
        } else if self.node(child)?.is_container() && self.node(child)?.element().is_some() {
            // A parentless container was built with the root tag.
            self.drop_elements(child);
        }

        let node = self.node_mut(container)?;
        let children = node.children.get_or_insert_with(Vec::new);
        let at = index.map_or(children.len(), |i| i.min(children.len()));
        children.insert(at, child);
        node.disposers.register(DisposeAction::Child(child));
        let container_element = node.element;

        let node = self.node_mut(child)?;
        node.parent = Some(container);
        node.offset = Vec2::ZERO;
        let carried = node.dirty;
        if let (Some(parent), Some(element)) = (container_element, node.element) {
            self.surface.append_child(parent, element);
        }
        self.mark(
            container,
            DirtyKinds::ALL | carried.propagated_to_parent(),
        );
        self.mark(child, DirtyKinds::POSITION);
        tracing::trace!(container = %container, child = %child, "added child");
        Ok(())
    }

    /// Removes `child` from `container`, leaving it as a detached root.
    pub fn remove_child(&mut self, container: NodeId, child: NodeId) -> SceneResult<()> {
        self.container(container)?;
        if self.node(child)?.parent != Some(container) {
            return Err(ConfigurationError::NotAChild { container, child }.into());
        }
        self.detach(container, child);
        let node = self.node_mut(child)?;
        node.parent = None;
        node.offset = Vec2::ZERO;
        self.drop_elements(child);
        Ok(())
    }

    /// Removes the element of `root` and forgets its subtree's elements, so
    /// the next flush recreates them.
    fn drop_elements(&mut self, root: NodeId) {
        if let Some(element) = live(&self.slots, root).and_then(|n| n.element) {
            self.surface.remove_element(element);
        }
        // The surface dropped the whole subtree.
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = live_mut(&mut self.slots, id) {
                node.element = None;
                stack.extend(node.children());
                self.mark(id, DirtyKinds::ALL);
            }
        }
    }

    /// Forgets `child` in `parent`'s child list and disposer registry.
    fn detach(&mut self, parent: NodeId, child: NodeId) {
        let Some(node) = slot_mut(&mut self.slots, parent) else {
            return;
        };
        if let Some(children) = node.children.as_mut() {
            children.retain(|c| *c != child);
        }
        if let Some(disposer) = node.disposers.find_child(child) {
            node.disposers.forget(disposer);
        }
        self.mark(parent, DirtyKinds::MEASURE | DirtyKinds::POSITION);
    }

    /// Replaces a container's layout strategy.
    pub fn set_layout(
        &mut self,
        container: NodeId,
        layout: impl LayoutStrategy + 'static,
    ) -> SceneResult<()> {
        self.container(container)?;
        self.node_mut(container)?.layout = Some(Box::new(layout));
        self.mark(container, DirtyKinds::MEASURE | DirtyKinds::POSITION);
        Ok(())
    }

    /// Enables or disables clipping a container to its measured bounds.
    pub fn set_clip(&mut self, container: NodeId, clip: bool) -> SceneResult<()> {
        self.container(container)?;
        let node = self.node_mut(container)?;
        if node.clip != clip {
            node.clip = clip;
            self.mark(container, DirtyKinds::DRAW);
        }
        Ok(())
    }

    // --- geometry ---------------------------------------------------------

    /// Measures a node in its own coordinate space.
    ///
    /// Pure: nothing is cached and no event is published. Containers report
    /// the union of their children's bounds as their layout would place
    /// them.
    pub fn measure(&self, id: NodeId) -> SceneResult<Rect> {
        self.measure_node(self.node(id)?)
    }

    fn measure_node(&self, node: &Node) -> SceneResult<Rect> {
        if let Some(children) = node.children.as_deref() {
            let placed = self.layout_children(children);
            let offsets = self.proposed_offsets(node, &placed);
            return Ok(placed
                .iter()
                .zip(offsets)
                .map(|(child, offset)| {
                    child.bounds + offset.unwrap_or_else(|_| self.offset_of(child.id))
                })
                .reduce(|a, b| a.union(b))
                .unwrap_or(Rect::ZERO));
        }
        match node.visual.as_deref() {
            Some(visual) => {
                let cx = MeasureCx::new(node.view(self.schema_of(node), &self.registry));
                visual.measure(&cx).map_err(|source| SceneError::Hook {
                    node: node.id,
                    phase: HookPhase::Measure,
                    source,
                })
            }
            None => Ok(Rect::ZERO),
        }
    }

    fn offset_of(&self, id: NodeId) -> Vec2 {
        live(&self.slots, id).map_or(Vec2::ZERO, |n| n.offset)
    }

    /// Bounds of each live child in its container's space, before layout.
    pub(crate) fn layout_children(&self, children: &[NodeId]) -> Vec<LayoutChild> {
        children
            .iter()
            .filter_map(|c| live(&self.slots, *c))
            .map(|child| {
                let bounds = self
                    .measure_node(child)
                    .unwrap_or_else(|_| child.measured.unwrap_or(Rect::ZERO));
                let own = child.own_transform(self.schema_of(child), &self.registry, &self.props);
                LayoutChild {
                    id: child.id,
                    bounds: own.transform_rect_bbox(bounds),
                }
            })
            .collect()
    }

    /// Runs the container's layout; children it gives no entry keep their offset.
    pub(crate) fn proposed_offsets(
        &self,
        container: &Node,
        children: &[LayoutChild],
    ) -> Vec<Result<Vec2, LayoutError>> {
        let mut offsets = match container.layout.as_deref() {
            Some(layout) => layout.arrange(children),
            None => Absolute.arrange(children),
        };
        offsets.truncate(children.len());
        for child in &children[offsets.len()..] {
            offsets.push(Ok(self.offset_of(child.id)));
        }
        offsets
            .into_iter()
            .zip(children)
            .map(|(offset, child)| match offset {
                Ok(v) if !v.is_finite() => Err(LayoutError::NonFiniteOffset(child.id)),
                other => other,
            })
            .collect()
    }

    /// Returns the transform from the node's space to scene space.
    pub fn world_transform(&self, id: NodeId) -> SceneResult<Affine> {
        let mut transform = Affine::IDENTITY;
        let mut current = Some(id);
        while let Some(n) = current {
            let node = self.node(n)?;
            transform = node.local_transform(self.schema_of(node), &self.registry, &self.props)
                * transform;
            current = node.parent;
        }
        Ok(transform)
    }

    /// Returns the node's measured bounds in scene space.
    pub fn bounding_box(&self, id: NodeId) -> SceneResult<Rect> {
        let rect = self.measure(id)?;
        Ok(self.world_transform(id)?.transform_rect_bbox(rect))
    }

    // --- invalidation -----------------------------------------------------

    /// Queues `kinds` on `id` and propagates to its ancestors.
    ///
    /// Propagation stops at the first ancestor that already carries the
    /// propagated kinds. Disposed nodes are skipped.
    pub(crate) fn mark(&mut self, id: NodeId, kinds: DirtyKinds) {
        let mut current = id;
        let mut kinds = kinds;
        while !kinds.is_empty() {
            let Some(node) = live_mut(&mut self.slots, current) else {
                break;
            };
            let before = node.dirty;
            node.dirty |= kinds;
            if node.lifecycle == Lifecycle::Validated {
                node.lifecycle = Lifecycle::Invalidated;
            }
            self.queue.mark(current, kinds);
            if before.contains(kinds) {
                break;
            }
            let Some(parent) = node.parent else {
                break;
            };
            kinds = kinds.propagated_to_parent();
            current = parent;
        }
    }

    /// Returns `true` if any node is queued for the next flush.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Returns `true` if a flush would do work: queued nodes, running
    /// transitions or pending timers.
    #[must_use]
    pub fn has_pending_work(&self) -> bool {
        self.is_dirty()
            || !self.timers.is_empty()
            || self
                .slots
                .iter()
                .filter_map(|s| s.node.as_ref())
                .any(|n| n.transition.is_some())
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.len())
            .field("kinds", &self.kinds.len())
            .field("queued", &self.queue.len())
            .field("timers", &self.timers.len())
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}
