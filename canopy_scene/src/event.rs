// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node-scoped event dispatch.
//!
//! Each node owns an [`EventDispatcher`]. Listeners subscribe to one
//! [`EventKind`] (or to all of them), may be one-shot, and are removed
//! through the [`Disposer`](crate::Disposer) returned at subscription.
//!
//! Listeners observe events; they receive no access to the scene. A
//! listener that wants to react by mutating the scene records the intent
//! (for example in an `Rc<RefCell<_>>` queue) and the host applies it before
//! the next flush.

use core::fmt;

use canopy_property::{ErasedValue, PropertyId};

use crate::error::SceneError;
use crate::input::InputEvent;

/// Propagation control returned by listeners.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Outcome {
    /// Keep propagating to ancestors.
    #[default]
    Continue,
    /// Stop after the current node's listeners.
    Stop,
}

/// Events a node publishes.
#[derive(Clone, Debug)]
pub enum NodeEvent {
    /// A local value changed.
    PropertyChanged {
        /// The property.
        property: PropertyId,
        /// The registered property name.
        name: &'static str,
        /// Base value before the change, if any.
        old: Option<ErasedValue>,
        /// Base value after the change, if any.
        new: Option<ErasedValue>,
    },
    /// A named extra changed.
    ExtraChanged {
        /// The extra's name.
        name: Box<str>,
    },
    /// A flush validated the node.
    Validated,
    /// The node became visible on the surface.
    Shown,
    /// The node was hidden on the surface.
    Hidden,
    /// A state was applied.
    StateApplied {
        /// The new current state.
        state: Box<str>,
        /// Whether the switch animates.
        animated: bool,
    },
    /// An animated state switch completed.
    TransitionEnded {
        /// The state the transition reached.
        state: Box<str>,
    },
    /// A hook of this node failed during a flush.
    Error(SceneError),
    /// Pointer or keyboard input targeted this node or a descendant.
    Input(InputEvent),
    /// The node was disposed. Always the last event a node publishes.
    Disposed,
}

impl NodeEvent {
    /// Returns the event's kind.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PropertyChanged { .. } => EventKind::PropertyChanged,
            Self::ExtraChanged { .. } => EventKind::ExtraChanged,
            Self::Validated => EventKind::Validated,
            Self::Shown => EventKind::Shown,
            Self::Hidden => EventKind::Hidden,
            Self::StateApplied { .. } => EventKind::StateApplied,
            Self::TransitionEnded { .. } => EventKind::TransitionEnded,
            Self::Error(_) => EventKind::Error,
            Self::Input(_) => EventKind::Input,
            Self::Disposed => EventKind::Disposed,
        }
    }
}

/// Discriminant of [`NodeEvent`], used to filter subscriptions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`NodeEvent::PropertyChanged`].
    PropertyChanged,
    /// [`NodeEvent::ExtraChanged`].
    ExtraChanged,
    /// [`NodeEvent::Validated`].
    Validated,
    /// [`NodeEvent::Shown`].
    Shown,
    /// [`NodeEvent::Hidden`].
    Hidden,
    /// [`NodeEvent::StateApplied`].
    StateApplied,
    /// [`NodeEvent::TransitionEnded`].
    TransitionEnded,
    /// [`NodeEvent::Error`].
    Error,
    /// [`NodeEvent::Input`].
    Input,
    /// [`NodeEvent::Disposed`].
    Disposed,
}

/// Identifies a listener within its node's dispatcher.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A boxed listener.
pub type Listener = Box<dyn FnMut(&NodeEvent) -> Outcome>;

struct Subscription {
    id: ListenerId,
    filter: Option<EventKind>,
    once: bool,
    listener: Listener,
}

/// Publish/subscribe channel of one node.
///
/// ```rust
/// use canopy_scene::{EventDispatcher, EventKind, NodeEvent, Outcome};
/// use std::{cell::Cell, rc::Rc};
///
/// let seen = Rc::new(Cell::new(0));
/// let mut events = EventDispatcher::default();
/// let counter = seen.clone();
/// events.once(Some(EventKind::Shown), move |_| {
///     counter.set(counter.get() + 1);
///     Outcome::Continue
/// });
///
/// events.emit(&NodeEvent::Shown);
/// events.emit(&NodeEvent::Shown);
/// assert_eq!(seen.get(), 1);
/// assert!(events.is_empty());
/// ```
#[derive(Default)]
pub struct EventDispatcher {
    subscriptions: Vec<Subscription>,
    spent: Vec<ListenerId>,
    next_id: u64,
}

impl EventDispatcher {
    fn subscribe(&mut self, filter: Option<EventKind>, once: bool, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            filter,
            once,
            listener,
        });
        id
    }

    /// Subscribes to `filter` (or every kind when `None`).
    pub fn on(
        &mut self,
        filter: Option<EventKind>,
        listener: impl FnMut(&NodeEvent) -> Outcome + 'static,
    ) -> ListenerId {
        self.subscribe(filter, false, Box::new(listener))
    }

    /// Subscribes for the next matching event only.
    pub fn once(
        &mut self,
        filter: Option<EventKind>,
        listener: impl FnMut(&NodeEvent) -> Outcome + 'static,
    ) -> ListenerId {
        self.subscribe(filter, true, Box::new(listener))
    }

    /// Unsubscribes a listener. Returns `false` if it was already gone.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        before != self.subscriptions.len()
    }

    /// Delivers `event` to every matching listener in subscription order.
    ///
    /// Returns [`Outcome::Stop`] if any listener asked to stop propagation.
    /// One-shot listeners are removed after they run and reported by
    /// [`take_spent`](Self::take_spent).
    pub fn emit(&mut self, event: &NodeEvent) -> Outcome {
        let kind = event.kind();
        let mut outcome = Outcome::Continue;
        let spent = &mut self.spent;
        self.subscriptions.retain_mut(|s| {
            if s.filter.is_some_and(|f| f != kind) {
                return true;
            }
            if (s.listener)(event) == Outcome::Stop {
                outcome = Outcome::Stop;
            }
            if s.once {
                spent.push(s.id);
            }
            !s.once
        });
        outcome
    }

    /// Returns the one-shot listeners that fired since the last call.
    pub fn take_spent(&mut self) -> Vec<ListenerId> {
        core::mem::take(&mut self.spent)
    }

    /// Removes every listener.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
        self.spent.clear();
    }

    /// Returns the number of listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns `true` if nothing listens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.subscriptions.iter().map(|s| (s.id, s.filter, s.once)))
            .finish()
    }
}
