// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named visual states and the transitions between them.
//!
//! A [`State`] is a partial overlay of property values plus a transition
//! duration. Properties the state does not mention fall through to the
//! node's base values. Every node has an implicit, empty `"default"` state.
//!
//! Applying a state resolves every key in the union of the current and the
//! target state: the target's override if present, else the base value.
//! Animated applies interpolate linearly from each key's *instantaneous*
//! value, so interrupting a transition never snaps.

use std::time::Duration;

use canopy_property::{
    Color, ErasedValue, Layer, Property, PropertyId, PropertyRegistry, PropertyStore,
    PropertyValue, Schema,
};
use smallvec::SmallVec;

use crate::node::NodeId;
use crate::theme::Theme;

/// Name of the state every node starts in.
pub const DEFAULT_STATE: &str = "default";

/// Name of the state applied while the pointer is over an interactive node.
pub const HOVER_STATE: &str = "hover";

/// Name of the state applied while an interactive node is pressed.
pub const DOWN_STATE: &str = "down";

/// Name of the state applied while a node's active flag is set.
pub const ACTIVE_STATE: &str = "active";

/// A named partial override of a node's properties.
///
/// ```rust
/// use std::time::Duration;
/// use canopy_property::{Color, PropertyMetadataBuilder, PropertyRegistry};
/// use canopy_scene::State;
///
/// let mut registry = PropertyRegistry::new();
/// let fill = registry.register("fill", PropertyMetadataBuilder::new(Color::BLACK).build());
///
/// let mut hover = State::new("hover", Duration::from_millis(200));
/// hover.set(fill, Color::WHITE).set_theme_color(fill, "accent");
///
/// assert_eq!(hover.get(fill), Some(&Color::WHITE));
/// assert_eq!(hover.keys().count(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct State {
    name: Box<str>,
    overrides: SmallVec<[(PropertyId, ErasedValue); 4]>,
    theme_colors: SmallVec<[(PropertyId, Box<str>); 2]>,
    duration: Duration,
}

impl State {
    /// Creates an empty state.
    #[must_use]
    pub fn new(name: &str, duration: Duration) -> Self {
        Self {
            name: name.into(),
            overrides: SmallVec::new(),
            theme_colors: SmallVec::new(),
            duration,
        }
    }

    /// Returns the state's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the transition duration used when this state is applied.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Sets the transition duration.
    pub fn set_duration(&mut self, duration: Duration) -> &mut Self {
        self.duration = duration;
        self
    }

    /// Overrides a property while the state is active.
    pub fn set<T: PropertyValue>(&mut self, property: Property<T>, value: T) -> &mut Self {
        let id = property.id();
        let value = ErasedValue::new(value);
        match self.overrides.binary_search_by_key(&id, |(k, _)| *k) {
            Ok(idx) => self.overrides[idx].1 = value,
            Err(idx) => self.overrides.insert(idx, (id, value)),
        }
        self
    }

    /// Overrides a color property with the theme's color for `role`.
    ///
    /// The role is looked up each time the state is applied. An explicit
    /// [`set`](Self::set) of the same property takes precedence, and a role
    /// the theme does not know leaves the property to fall through.
    pub fn set_theme_color(&mut self, property: Property<Color>, role: &str) -> &mut Self {
        let id = property.id();
        match self.theme_colors.iter_mut().find(|(k, _)| *k == id) {
            Some(entry) => entry.1 = role.into(),
            None => self.theme_colors.push((id, role.into())),
        }
        self
    }

    /// Removes any override of `id`.
    pub fn remove(&mut self, id: PropertyId) -> bool {
        let before = self.overrides.len() + self.theme_colors.len();
        self.overrides.retain(|(k, _)| *k != id);
        self.theme_colors.retain(|(k, _)| *k != id);
        before != self.overrides.len() + self.theme_colors.len()
    }

    /// Returns the explicit override of a property.
    #[must_use]
    pub fn get<T: PropertyValue>(&self, property: Property<T>) -> Option<&T> {
        self.overrides
            .binary_search_by_key(&property.id(), |(k, _)| *k)
            .ok()
            .and_then(|idx| self.overrides[idx].1.downcast_ref())
    }

    /// Returns every property the state may override, ascending.
    pub fn keys(&self) -> impl Iterator<Item = PropertyId> + '_ {
        let mut keys: SmallVec<[PropertyId; 8]> = self
            .overrides
            .iter()
            .map(|(k, _)| *k)
            .chain(self.theme_colors.iter().map(|(k, _)| *k))
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys.into_iter()
    }

    /// Returns `true` if the state overrides nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty() && self.theme_colors.is_empty()
    }

    /// Resolves theme roles and returns the concrete overrides, ascending.
    pub(crate) fn resolve(&self, theme: Option<&dyn Theme>) -> Vec<(PropertyId, ErasedValue)> {
        let mut out: Vec<_> = self.overrides.iter().cloned().collect();
        if let Some(theme) = theme {
            for (id, role) in &self.theme_colors {
                if let Err(idx) = out.binary_search_by_key(id, |(k, _)| *k)
                    && let Some(color) = theme.color_for(role)
                {
                    out.insert(idx, (*id, ErasedValue::new(color)));
                }
            }
        }
        out
    }
}

/// The named states of one node and which of them is current.
#[derive(Clone, Debug)]
pub struct StateSet {
    states: Vec<State>,
    current: Box<str>,
}

impl Default for StateSet {
    fn default() -> Self {
        Self {
            states: vec![State::new(DEFAULT_STATE, Duration::ZERO)],
            current: DEFAULT_STATE.into(),
        }
    }
}

impl StateSet {
    /// Returns the state called `name`, creating it if needed.
    pub fn create(&mut self, name: &str, duration: Duration) -> &mut State {
        let idx = match self.states.iter().position(|s| &*s.name == name) {
            Some(idx) => idx,
            None => {
                self.states.push(State::new(name, duration));
                self.states.len() - 1
            }
        };
        &mut self.states[idx]
    }

    /// Adds or replaces a whole state.
    pub fn insert(&mut self, state: State) {
        match self.states.iter_mut().find(|s| s.name == state.name) {
            Some(slot) => *slot = state,
            None => self.states.push(state),
        }
    }

    /// Returns the state called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&State> {
        self.states.iter().find(|s| &*s.name == name)
    }

    /// Returns `true` if a state called `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the name of the current state.
    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }

    pub(crate) fn set_current(&mut self, name: &str) {
        self.current = name.into();
    }

    /// Iterates over the state names in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.states.iter().map(|s| &*s.name)
    }
}

/// An in-flight interpolation between two states.
#[derive(Clone, Debug)]
pub struct Transition {
    pub(crate) state: Box<str>,
    pub(crate) start: Duration,
    pub(crate) duration: Duration,
    /// `(key, from, to)` for every key the transition animates.
    pub(crate) keys: Vec<(PropertyId, ErasedValue, ErasedValue)>,
}

impl Transition {
    /// Returns progress in `0.0..=1.0` at time `now`.
    #[must_use]
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start).as_secs_f64();
        (elapsed / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Returns the name of the target state.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.state
    }

    /// Returns the interpolated value of every animated key at progress `t`.
    pub(crate) fn sample(&self, t: f64) -> impl Iterator<Item = (PropertyId, ErasedValue)> + '_ {
        self.keys
            .iter()
            .map(move |(id, from, to)| (*id, from.interpolate(to, t)))
    }
}

/// Outcome of switching a store to a new state.
#[derive(Debug)]
pub(crate) struct StateSwitch {
    /// Every key whose effective value may have changed.
    pub(crate) keys: Vec<PropertyId>,
    pub(crate) transition: Option<Transition>,
}

/// Rewrites the State and Animation layers of `store` for `target`.
///
/// `from` values are read before anything is cleared, so an interrupted
/// transition continues from where it was.
pub(crate) fn switch_state(
    store: &mut PropertyStore<NodeId>,
    schema: &Schema,
    registry: &PropertyRegistry,
    current: &State,
    target: &State,
    theme: Option<&dyn Theme>,
    animated: bool,
    now: Duration,
) -> StateSwitch {
    let overrides = target.resolve(theme);
    let mut keys: Vec<PropertyId> = current
        .keys()
        .chain(overrides.iter().map(|(k, _)| *k))
        .chain(store.layer_ids(Layer::Animation))
        .collect();
    keys.sort_unstable();
    keys.dedup();

    let from: Vec<(PropertyId, Option<ErasedValue>)> = keys
        .iter()
        .map(|id| (*id, store.effective(*id, schema, registry).cloned()))
        .collect();

    store.clear_layer_all(Layer::Animation);
    store.clear_layer_all(Layer::State);
    for (id, value) in overrides {
        store.set_layer(id, Layer::State, value);
    }

    // Leaving a state for one without its own duration reuses the
    // duration of the state being left.
    let duration = if target.duration.is_zero() {
        current.duration
    } else {
        target.duration
    };
    let mut transition = None;
    if animated && !duration.is_zero() {
        let animated_keys: Vec<_> = from
            .into_iter()
            .filter_map(|(id, from)| {
                let to = store.effective(id, schema, registry)?.clone();
                let from = from?;
                (!from.value_eq(&to)).then_some((id, from, to))
            })
            .collect();
        for (id, from, _) in &animated_keys {
            store.set_layer(*id, Layer::Animation, from.clone());
        }
        if !animated_keys.is_empty() {
            transition = Some(Transition {
                state: target.name.clone(),
                start: now,
                duration,
                keys: animated_keys,
            });
        }
    }

    StateSwitch { keys, transition }
}
