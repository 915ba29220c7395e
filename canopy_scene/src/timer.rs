// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node-owned timers.
//!
//! The core never schedules frames itself. Delayed behavior (auto-hide,
//! delayed state changes) is a timer owned by a node through its disposer
//! registry: it fires during the first flush at or after its due time, and
//! disposing the owner cancels it.

use core::fmt;
use std::time::Duration;

use crate::disposer::DisposerId;
use crate::error::SceneResult;
use crate::node::NodeId;
use crate::scene::Scene;

/// Identifies a scheduled timer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What a timer does when it fires.
pub enum TimerAction {
    /// Set the owner's `visible` property.
    SetVisible(bool),
    /// Apply a state to the owner.
    ApplyState {
        /// State name.
        name: Box<str>,
        /// Whether to animate the switch.
        animated: bool,
    },
    /// Run arbitrary scene code.
    Custom(Box<dyn FnOnce(&mut Scene) -> SceneResult<()>>),
}

impl fmt::Debug for TimerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetVisible(v) => f.debug_tuple("SetVisible").field(v).finish(),
            Self::ApplyState { name, animated } => f
                .debug_struct("ApplyState")
                .field("name", name)
                .field("animated", animated)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Timer {
    pub(crate) id: TimerId,
    pub(crate) owner: NodeId,
    pub(crate) due: Duration,
    pub(crate) disposer: DisposerId,
    pub(crate) action: TimerAction,
}

/// Pending timers of a scene.
#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: Vec<Timer>,
    next_id: u64,
}

impl TimerQueue {
    /// Allocates the ID of the next timer.
    pub(crate) fn reserve(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn insert(&mut self, timer: Timer) {
        self.timers.push(timer);
    }

    /// Cancels a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        before != self.timers.len()
    }

    /// Removes the timers due at `now`, earliest first.
    pub(crate) fn take_due(&mut self, now: Duration) -> Vec<Timer> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            core::mem::take(&mut self.timers)
                .into_iter()
                .partition(|t| t.due <= now);
        self.timers = pending;
        due.sort_by_key(|t| (t.due, t.id));
        due
    }

    /// Returns the earliest due time, if any timer is pending.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// Returns the number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
