// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Disposer registry: scoped ownership of cleanup actions.
//!
//! Every resource a node allocates (a child, a listener, an adapter, a timer)
//! is registered as one cleanup action in the node's [`DisposerRegistry`],
//! and the caller receives a [`Disposer`] token for it. An action is consumed
//! exactly once: either early through [`Scene::release`](crate::Scene::release),
//! or when its owner is disposed. Releasing a token twice is a no-op.

use core::fmt;

use crate::adapter::AdapterId;
use crate::event::ListenerId;
use crate::node::NodeId;
use crate::timer::TimerId;

/// Token for one registered cleanup action.
///
/// Tokens are plain handles; dropping one does not release anything.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Disposer {
    owner: NodeId,
    id: DisposerId,
}

impl Disposer {
    pub(crate) const fn new(owner: NodeId, id: DisposerId) -> Self {
        Self { owner, id }
    }

    /// Returns the node that owns the action.
    #[must_use]
    pub const fn owner(self) -> NodeId {
        self.owner
    }

    pub(crate) const fn id(self) -> DisposerId {
        self.id
    }
}

/// Identifies an action within its owner's registry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisposerId(u64);

/// A cleanup action the scene knows how to run.
pub enum DisposeAction {
    /// Dispose an owned child node.
    Child(NodeId),
    /// Unsubscribe an event listener.
    Listener(ListenerId),
    /// Remove an adapter from the owner's chain.
    Adapter(AdapterId),
    /// Cancel a pending timer.
    Timer(TimerId),
    /// Run arbitrary cleanup code.
    Custom(Box<dyn FnOnce()>),
}

impl fmt::Debug for DisposeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Child(id) => f.debug_tuple("Child").field(id).finish(),
            Self::Listener(id) => f.debug_tuple("Listener").field(id).finish(),
            Self::Adapter(id) => f.debug_tuple("Adapter").field(id).finish(),
            Self::Timer(id) => f.debug_tuple("Timer").field(id).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Ordered cleanup actions owned by one node.
///
/// Actions run in reverse registration order on disposal, so resources are
/// torn down before the resources they were built on.
///
/// ```rust
/// use canopy_scene::{DisposeAction, DisposerRegistry};
/// use std::{cell::RefCell, rc::Rc};
///
/// let log = Rc::new(RefCell::new(Vec::new()));
/// let mut registry = DisposerRegistry::default();
/// for name in ["a", "b", "c"] {
///     let log = log.clone();
///     registry.register(DisposeAction::Custom(Box::new(move || log.borrow_mut().push(name))));
/// }
///
/// for action in registry.drain() {
///     if let DisposeAction::Custom(f) = action {
///         f();
///     }
/// }
/// assert_eq!(*log.borrow(), ["c", "b", "a"]);
/// ```
#[derive(Debug, Default)]
pub struct DisposerRegistry {
    entries: Vec<(DisposerId, DisposeAction)>,
    next_id: u64,
}

impl DisposerRegistry {
    /// Registers an action and returns its ID.
    pub fn register(&mut self, action: DisposeAction) -> DisposerId {
        let id = DisposerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, action));
        id
    }

    /// Removes and returns the action, if it has not been consumed yet.
    pub fn take(&mut self, id: DisposerId) -> Option<DisposeAction> {
        let idx = self
            .entries
            .binary_search_by_key(&id, |(entry, _)| *entry)
            .ok()?;
        Some(self.entries.remove(idx).1)
    }

    /// Drops the action without running it.
    ///
    /// Used when the resource was already released by other means, such as a
    /// child moving to another container.
    pub fn forget(&mut self, id: DisposerId) -> bool {
        self.take(id).is_some()
    }

    /// Finds the action registered for `child`.
    pub fn find_child(&self, child: NodeId) -> Option<DisposerId> {
        self.entries.iter().find_map(|(id, action)| match action {
            DisposeAction::Child(c) if *c == child => Some(*id),
            _ => None,
        })
    }

    /// Finds the action registered for `listener`.
    pub fn find_listener(&self, listener: ListenerId) -> Option<DisposerId> {
        self.entries.iter().find_map(|(id, action)| match action {
            DisposeAction::Listener(l) if *l == listener => Some(*id),
            _ => None,
        })
    }

    /// Removes every action, most recent first.
    pub fn drain(&mut self) -> impl Iterator<Item = DisposeAction> {
        let entries = core::mem::take(&mut self.entries);
        entries.into_iter().rev().map(|(_, action)| action)
    }

    /// Returns the number of pending actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
