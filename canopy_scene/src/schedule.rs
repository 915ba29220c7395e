// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The flush: turning queued invalidations into surface calls.
//!
//! One [`Scene::flush`] is one tick:
//!
//! 1. due timers run and in-flight transitions advance, so their
//!    invalidations join this tick;
//! 2. the invalidation queue is taken, so anything marked from here on lands
//!    in the next tick;
//! 3. queued nodes are measured bottom-up, deepest first;
//! 4. queued nodes are laid out, drawn and positioned top-down, root-most
//!    first and then in queue order; children a layout moves join this pass;
//! 5. mutations deferred by draw hooks are applied.
//!
//! A failing hook is isolated to its node: it is logged, reported and
//! published as [`NodeEvent::Error`], and the node is left invalidated.

use core::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

use canopy_dirty::DirtyKinds;
use canopy_property::Layer;
use hashbrown::HashMap;

use crate::error::{HookPhase, SceneError, SceneResult};
use crate::event::NodeEvent;
use crate::node::{Lifecycle, NodeId};
use crate::scene::{Scene, live, live_mut};
use crate::surface::ElementHandle;
use crate::timer::TimerAction;
use crate::visual::{Deferred, DrawCx};

/// What one [`Scene::flush`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Timers that fired.
    pub timers_fired: usize,
    /// Transitions that reached their target.
    pub transitions_ended: usize,
    /// Nodes measured.
    pub measured: usize,
    /// Nodes drawn.
    pub drawn: usize,
    /// Nodes positioned.
    pub positioned: usize,
    /// Nodes validated.
    pub validated: usize,
    /// Children a layout could not place.
    pub layout_errors: usize,
    /// Nodes whose measure or draw hook failed.
    pub failures: Vec<NodeId>,
    /// Whether the flush left work for a later tick.
    pub pending: bool,
}

impl FlushReport {
    /// Returns `true` if the flush did nothing at all.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.timers_fired == 0
            && self.transitions_ended == 0
            && self.measured == 0
            && self.drawn == 0
            && self.positioned == 0
            && self.validated == 0
            && self.failures.is_empty()
    }
}

#[derive(Copy, Clone, Debug)]
struct Work {
    id: NodeId,
    kinds: DirtyKinds,
    depth: usize,
    order: usize,
}

impl Scene {
    /// Runs one tick at time `now`.
    ///
    /// The host calls this once per frame. Time only matters for timers and
    /// transitions; passing the same `now` twice is fine.
    pub fn flush(&mut self, now: Duration) -> FlushReport {
        let _span = tracing::debug_span!("flush", now = ?now).entered();
        self.now = now;
        let mut report = FlushReport {
            timers_fired: self.run_timers(now),
            transitions_ended: self.advance_transitions(now),
            ..FlushReport::default()
        };

        let mut work = Vec::new();
        for (order, (id, kinds)) in self.queue.take().into_iter().enumerate() {
            let Some(node) = live_mut(&mut self.slots, id) else {
                continue;
            };
            node.dirty = DirtyKinds::empty();
            work.push(Work {
                id,
                kinds,
                depth: 0,
                order,
            });
        }
        for w in &mut work {
            w.depth = self.depth(w.id);
        }

        self.measure_pass(&work, &mut report);
        let deferred = self.arrange_pass(&work, &mut report);

        for mutation in deferred {
            if let Err(error) = mutation(self) {
                tracing::warn!(%error, "deferred mutation failed");
            }
        }
        report.pending = self.has_pending_work();
        tracing::debug!(
            measured = report.measured,
            drawn = report.drawn,
            validated = report.validated,
            failures = report.failures.len(),
            "flush complete"
        );
        report
    }

    fn run_timers(&mut self, now: Duration) -> usize {
        let due = self.timers.take_due(now);
        let fired = due.len();
        for timer in due {
            let owner = timer.owner;
            let Some(node) = live_mut(&mut self.slots, owner) else {
                continue;
            };
            node.disposers.forget(timer.disposer);
            if node.auto_hide.is_some_and(|d| d.id() == timer.disposer) {
                node.auto_hide = None;
            }
            let result = match timer.action {
                TimerAction::SetVisible(visible) => {
                    let property = self.props.visible;
                    self.set(owner, property, visible).map(drop)
                }
                TimerAction::ApplyState { name, animated } => {
                    self.apply_state(owner, &name, animated)
                }
                TimerAction::Custom(action) => action(self),
            };
            if let Err(error) = result {
                tracing::warn!(node = %owner, %error, "timer action failed");
            }
        }
        fired
    }

    fn advance_transitions(&mut self, now: Duration) -> usize {
        let running: Vec<NodeId> = self
            .slots
            .iter()
            .filter_map(|s| s.node.as_ref())
            .filter(|n| n.transition.is_some() && n.lifecycle != Lifecycle::Disposed)
            .map(|n| n.id)
            .collect();
        let mut ended = 0;
        for id in running {
            let Some(node) = live_mut(&mut self.slots, id) else {
                continue;
            };
            let Some(transition) = node.transition.take() else {
                continue;
            };
            let t = transition.progress(now);
            let mut kinds = DirtyKinds::empty();
            let done = t >= 1.0;
            if done {
                for (key, _, _) in &transition.keys {
                    node.store.clear_layer(*key, Layer::Animation);
                    kinds |= self.registry.affects(*key);
                }
            } else {
                let samples: Vec<_> = transition.sample(t).collect();
                for (key, value) in samples {
                    node.store.set_layer(key, Layer::Animation, value);
                    kinds |= self.registry.affects(key);
                }
            }
            node.clear_cache();
            let state = transition.state.clone();
            if !done {
                node.transition = Some(transition);
            }
            self.mark(id, kinds);
            if done {
                ended += 1;
                self.emit(id, &NodeEvent::TransitionEnded { state });
            }
        }
        ended
    }

    fn fail(&mut self, id: NodeId, error: SceneError, report: &mut FlushReport) {
        tracing::error!(node = %id, %error, "hook failed");
        if !report.failures.contains(&id) {
            report.failures.push(id);
        }
        self.emit(id, &NodeEvent::Error(error));
    }

    fn measure_pass(&mut self, work: &[Work], report: &mut FlushReport) {
        let mut order: Vec<&Work> = work
            .iter()
            .filter(|w| w.kinds.contains(DirtyKinds::MEASURE))
            .collect();
        order.sort_by_key(|w| (Reverse(w.depth), w.order));
        for w in order {
            match self.measure(w.id) {
                Ok(rect) => {
                    if let Some(node) = live_mut(&mut self.slots, w.id) {
                        node.measured = Some(rect);
                    }
                    report.measured += 1;
                }
                Err(error) => self.fail(w.id, error, report),
            }
        }
    }

    /// Lays out, draws and positions queued nodes, parents first.
    fn arrange_pass(&mut self, work: &[Work], report: &mut FlushReport) -> Vec<Deferred> {
        let mut deferred = Vec::new();
        let mut pending: HashMap<NodeId, DirtyKinds> = HashMap::new();
        let mut heap = BinaryHeap::new();
        for w in work {
            pending.insert(w.id, w.kinds);
            heap.push(Reverse((w.depth, w.order, w.id)));
        }
        let mut next_order = work.len();

        while let Some(Reverse((depth, _, id))) = heap.pop() {
            let Some(kinds) = pending.remove(&id) else {
                continue;
            };
            if live(&self.slots, id).is_none() {
                continue;
            }
            self.ensure_element(id, true);

            if kinds.intersects(DirtyKinds::MEASURE | DirtyKinds::POSITION) {
                for child in self.relayout(id, report) {
                    let entry = pending.entry(child).or_insert_with(|| {
                        heap.push(Reverse((depth + 1, next_order, child)));
                        next_order += 1;
                        DirtyKinds::empty()
                    });
                    *entry |= DirtyKinds::POSITION;
                }
            }
            if kinds.contains(DirtyKinds::DRAW) {
                match self.draw_node(id, &mut deferred) {
                    Ok(()) => report.drawn += 1,
                    Err(error) => self.fail(id, error, report),
                }
            }
            if kinds.contains(DirtyKinds::POSITION) {
                self.position_node(id);
                report.positioned += 1;
            }

            let failed = report.failures.contains(&id);
            let Some(node) = live_mut(&mut self.slots, id) else {
                continue;
            };
            if failed {
                node.lifecycle = Lifecycle::Invalidated;
            } else {
                node.lifecycle = Lifecycle::Validated;
                report.validated += 1;
                node.emit(&NodeEvent::Validated);
            }
        }
        deferred
    }

    /// Creates the node's element if it has none yet.
    ///
    /// With `attach`, a new element is appended to the parent's element.
    fn ensure_element(&mut self, id: NodeId, attach: bool) {
        let Some(node) = live(&self.slots, id) else {
            return;
        };
        if node.element.is_some() {
            return;
        }
        let tag: &str = match (&node.children, node.visual.as_deref()) {
            (Some(_), _) if node.parent.is_none() => &self.config.root_tag,
            (Some(_), _) | (None, None) => &self.config.group_tag,
            (None, Some(visual)) => visual.tag(),
        };
        let parent_element = node
            .parent
            .and_then(|p| live(&self.slots, p))
            .and_then(|p| p.element);
        let Some(element) = self.surface.create_element(tag) else {
            return;
        };
        if let Some(node) = live_mut(&mut self.slots, id) {
            node.element = Some(element);
        }
        if attach && let Some(parent) = parent_element {
            self.surface.append_child(parent, element);
        }
    }

    /// Re-runs a container's layout and returns the children that moved.
    fn relayout(&mut self, id: NodeId, report: &mut FlushReport) -> Vec<NodeId> {
        let Some(node) = live(&self.slots, id) else {
            return Vec::new();
        };
        let Some(children) = node.children.as_deref() else {
            return Vec::new();
        };
        let placed = self.layout_children(children);
        let offsets = self.proposed_offsets(node, &placed);

        let mut moved = Vec::new();
        for (child, offset) in placed.iter().zip(offsets) {
            match offset {
                Ok(offset) => {
                    if let Some(node) = live_mut(&mut self.slots, child.id)
                        && node.offset != offset
                    {
                        node.offset = offset;
                        moved.push(child.id);
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        container = %id,
                        child = %child.id,
                        %error,
                        "layout failed, keeping the previous offset"
                    );
                    report.layout_errors += 1;
                }
            }
        }
        moved
    }

    fn draw_node(&mut self, id: NodeId, deferred: &mut Vec<Deferred>) -> SceneResult<()> {
        let children = live(&self.slots, id).map_or_else(Vec::new, |n| n.children().to_vec());
        for child in &children {
            self.ensure_element(*child, false);
        }
        let child_elements: Vec<ElementHandle> = children
            .iter()
            .filter_map(|c| live(&self.slots, *c).and_then(|n| n.element))
            .collect();

        let Self {
            slots,
            kinds,
            registry,
            surface,
            props,
            ..
        } = self;
        let Some(node) = live_mut(slots, id) else {
            return Ok(());
        };
        let schema = &kinds[node.kind.index()];
        let mut visual = node.visual.take();
        let result = {
            let node = &*node;
            if let Some(element) = node.element {
                // Re-appending in order restores paint order after inserts.
                for child in &child_elements {
                    surface.append_child(element, *child);
                }
                let opacity = node.resolve(props.opacity, schema, registry).unwrap_or(1.0);
                surface.set_attribute(element, "opacity", &opacity.to_string());
                if node.clip
                    && let Some(rect) = node.measured
                {
                    let clip = format!(
                        "{} {} {} {}",
                        rect.x0,
                        rect.y0,
                        rect.width(),
                        rect.height()
                    );
                    surface.set_attribute(element, "clip", &clip);
                }
            }
            match visual.as_mut() {
                Some(visual) => {
                    let view = node.view(schema, registry);
                    let mut cx = DrawCx::new(view, node.element, surface.as_mut(), deferred);
                    visual.draw(&mut cx)
                }
                None => Ok(()),
            }
        };
        node.visual = visual;
        result.map_err(|source| SceneError::Hook {
            node: id,
            phase: HookPhase::Draw,
            source,
        })
    }

    fn position_node(&mut self, id: NodeId) {
        let Self {
            slots,
            kinds,
            registry,
            surface,
            props,
            ..
        } = self;
        let Some(node) = live_mut(slots, id) else {
            return;
        };
        let schema = &kinds[node.kind.index()];
        let transform = node.local_transform(schema, registry, props);
        let visible = node.resolve(props.visible, schema, registry).unwrap_or(true);
        if let Some(element) = node.element {
            let [a, b, c, d, e, f] = transform.as_coeffs();
            surface.set_attribute(
                element,
                "transform",
                &format!("matrix({a} {b} {c} {d} {e} {f})"),
            );
            surface.set_attribute(
                element,
                "visibility",
                if visible { "visible" } else { "hidden" },
            );
        }
        if node.shown != visible {
            node.shown = visible;
            let event = if visible {
                NodeEvent::Shown
            } else {
                NodeEvent::Hidden
            };
            node.emit(&event);
        }
    }
}
