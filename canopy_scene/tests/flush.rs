// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flush batching, hook failures, lifecycle and timers.

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use canopy_scene::{
    Absolute, DirtyKinds, DrawCx, Drawable, EventKind, HookError, HookPhase, Lifecycle, MeasureCx,
    Measurable, NodeEvent, Property, SceneError, Stateful, TimerAction,
};
use kurbo::Rect;

use common::{ms, record, scene};

/// Logs the radius it draws with.
struct Probe {
    radius: Property<f64>,
    log: Rc<RefCell<Vec<f64>>>,
}

impl Measurable for Probe {
    fn measure(&self, cx: &MeasureCx<'_>) -> Result<Rect, HookError> {
        let r = cx.get_or(self.radius, 0.0);
        Ok(Rect::new(-r, -r, r, r))
    }
}

impl Drawable for Probe {
    fn draw(&mut self, cx: &mut DrawCx<'_>) -> Result<(), HookError> {
        self.log.borrow_mut().push(cx.get_or(self.radius, 0.0));
        Ok(())
    }
}

impl Stateful for Probe {}

/// Fails in the configured phase.
struct Broken(HookPhase);

impl Measurable for Broken {
    fn measure(&self, _: &MeasureCx<'_>) -> Result<Rect, HookError> {
        match self.0 {
            HookPhase::Measure => Err(HookError::new("no size")),
            HookPhase::Draw => Ok(Rect::ZERO),
        }
    }
}

impl Drawable for Broken {
    fn draw(&mut self, _: &mut DrawCx<'_>) -> Result<(), HookError> {
        match self.0 {
            HookPhase::Draw => Err(HookError::new("surface lost")),
            HookPhase::Measure => Ok(()),
        }
    }
}

impl Stateful for Broken {}

/// Fades itself out from its first draw.
struct Fader {
    opacity: Property<f64>,
    started: bool,
}

impl Measurable for Fader {
    fn measure(&self, _: &MeasureCx<'_>) -> Result<Rect, HookError> {
        Ok(Rect::new(0.0, 0.0, 1.0, 1.0))
    }
}

impl Drawable for Fader {
    fn draw(&mut self, cx: &mut DrawCx<'_>) -> Result<(), HookError> {
        if !self.started {
            self.started = true;
            cx.defer_set(self.opacity, 0.5);
        }
        Ok(())
    }
}

impl Stateful for Fader {}

#[test]
fn mutations_between_flushes_draw_once() {
    let (mut scene, _) = scene();
    let p = scene.props();
    let log = Rc::new(RefCell::new(Vec::new()));
    let probe = Probe {
        radius: p.radius,
        log: log.clone(),
    };
    let n = scene
        .create_node(scene.kinds().circle, Some(Box::new(probe)))
        .unwrap();
    for r in [5.0, 7.0, 10.0] {
        scene.set(n, p.radius, r).unwrap();
    }
    let report = scene.flush(ms(0));
    assert_eq!(report.drawn, 1);
    assert_eq!(*log.borrow(), [10.0]);

    scene.set(n, p.radius, 20.0).unwrap();
    scene.flush(ms(16));
    assert_eq!(*log.borrow(), [10.0, 20.0]);

    assert!(scene.flush(ms(32)).is_idle());
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn draw_failures_are_isolated_to_their_node() {
    let (mut scene, _) = scene();
    let root = scene.create_container(Absolute);
    let broken = scene
        .create_node(scene.kinds().node, Some(Box::new(Broken(HookPhase::Draw))))
        .unwrap();
    let sibling = scene.create_circle(4.0).unwrap();
    scene.add_child(root, broken, None).unwrap();
    scene.add_child(root, sibling, None).unwrap();
    let errors = record(&mut scene, broken, EventKind::Error);

    let report = scene.flush(ms(0));
    assert_eq!(report.failures, [broken]);
    assert_eq!(scene.node(broken).unwrap().lifecycle(), Lifecycle::Invalidated);
    assert_eq!(scene.node(sibling).unwrap().lifecycle(), Lifecycle::Validated);
    assert_eq!(scene.node(root).unwrap().lifecycle(), Lifecycle::Validated);

    let errors = errors.borrow();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        NodeEvent::Error(SceneError::Hook { node, phase: HookPhase::Draw, source })
            if *node == broken && source.message() == "surface lost"
    ));
}

#[test]
fn measure_failures_are_reported() {
    let (mut scene, _) = scene();
    let broken = scene
        .create_node(scene.kinds().node, Some(Box::new(Broken(HookPhase::Measure))))
        .unwrap();
    let errors = record(&mut scene, broken, EventKind::Error);

    let report = scene.flush(ms(0));
    assert_eq!(report.failures, [broken]);
    assert_eq!(report.measured, 0);
    assert_eq!(scene.node(broken).unwrap().measured(), None);
    assert!(matches!(
        &errors.borrow()[..],
        [NodeEvent::Error(SceneError::Hook { phase: HookPhase::Measure, .. })]
    ));
    assert!(matches!(
        scene.measure(broken),
        Err(SceneError::Hook { phase: HookPhase::Measure, .. })
    ));
}

#[test]
fn deferred_mutations_land_in_the_next_tick() {
    let (mut scene, surface) = scene();
    let p = scene.props();
    let fader = Fader {
        opacity: p.opacity,
        started: false,
    };
    let n = scene
        .create_node(scene.kinds().node, Some(Box::new(fader)))
        .unwrap();

    let report = scene.flush(ms(0));
    let el = scene.node(n).unwrap().element().unwrap();
    assert_eq!(surface.tag(el).as_deref(), Some("path"));
    assert_eq!(surface.attribute(el, "opacity").as_deref(), Some("1"));
    assert!(report.pending);
    assert_eq!(scene.get(n, p.opacity).unwrap(), 0.5);

    let report = scene.flush(ms(16));
    assert_eq!(surface.attribute(el, "opacity").as_deref(), Some("0.5"));
    assert!(!report.pending);
}

#[test]
fn lifecycle_follows_flushes() {
    let (mut scene, _) = scene();
    let p = scene.props();
    let group = scene.create_container(Absolute);
    assert_eq!(scene.node(group).unwrap().lifecycle(), Lifecycle::Created);

    let c = scene.create_circle(10.0).unwrap();
    assert_eq!(scene.node(c).unwrap().lifecycle(), Lifecycle::Configured);

    let validated = record(&mut scene, c, EventKind::Validated);
    scene.flush(ms(0));
    assert_eq!(scene.node(c).unwrap().lifecycle(), Lifecycle::Validated);
    assert_eq!(scene.node(group).unwrap().lifecycle(), Lifecycle::Validated);
    assert_eq!(validated.borrow().len(), 1);

    scene.set(c, p.radius, 12.0).unwrap();
    assert_eq!(scene.node(c).unwrap().lifecycle(), Lifecycle::Invalidated);
    scene.flush(ms(16));
    assert_eq!(scene.node(c).unwrap().lifecycle(), Lifecycle::Validated);
    assert_eq!(validated.borrow().len(), 2);
}

#[test]
fn visibility_changes_publish_hidden_and_shown() {
    let (mut scene, surface) = scene();
    let p = scene.props();
    let c = scene.create_circle(3.0).unwrap();
    let shown = record(&mut scene, c, EventKind::Shown);
    let hidden = record(&mut scene, c, EventKind::Hidden);
    scene.flush(ms(0));
    let el = scene.node(c).unwrap().element().unwrap();
    assert_eq!(shown.borrow().len(), 1);
    assert!(scene.node(c).unwrap().is_shown());

    scene.set(c, p.visible, false).unwrap();
    scene.flush(ms(16));
    assert_eq!(hidden.borrow().len(), 1);
    assert_eq!(surface.attribute(el, "visibility").as_deref(), Some("hidden"));

    // Moving a hidden node does not show it.
    scene.set(c, p.x, 4.0).unwrap();
    scene.flush(ms(32));
    assert_eq!(shown.borrow().len(), 1);

    scene.set(c, p.visible, true).unwrap();
    scene.flush(ms(48));
    assert_eq!(shown.borrow().len(), 2);
    assert_eq!(surface.attribute(el, "visibility").as_deref(), Some("visible"));
}

#[test]
fn auto_hide_restarts_its_countdown() {
    let (mut scene, _) = scene();
    let p = scene.props();
    let tip = scene.create_label("hint").unwrap();
    scene.set(tip, p.visible, false).unwrap();
    scene.flush(ms(0));
    let hidden = record(&mut scene, tip, EventKind::Hidden);

    scene.auto_hide(tip, ms(100)).unwrap();
    assert!(scene.get(tip, p.visible).unwrap());
    scene.flush(ms(50));

    scene.auto_hide(tip, ms(100)).unwrap();
    let report = scene.flush(ms(100));
    assert_eq!(report.timers_fired, 0);
    assert!(scene.get(tip, p.visible).unwrap());

    let report = scene.flush(ms(150));
    assert_eq!(report.timers_fired, 1);
    assert!(!scene.get(tip, p.visible).unwrap());
    assert_eq!(hidden.borrow().len(), 1);
    assert!(!report.pending);
}

#[test]
fn timers_apply_states_when_due() {
    let (mut scene, _) = scene();
    let p = scene.props();
    let c = scene.create_circle(10.0).unwrap();
    scene.create_state(c, "hover").unwrap().set(p.radius, 20.0);
    scene
        .set_timeout(
            c,
            ms(10),
            TimerAction::ApplyState {
                name: "hover".into(),
                animated: false,
            },
        )
        .unwrap();

    assert_eq!(scene.flush(ms(5)).timers_fired, 0);
    assert_eq!(scene.node(c).unwrap().current_state(), "default");
    assert_eq!(scene.flush(ms(10)).timers_fired, 1);
    assert_eq!(scene.node(c).unwrap().current_state(), "hover");
}

#[test]
fn disposal_and_release_cancel_timers() {
    let (mut scene, _) = scene();
    let fired = Rc::new(Cell::new(0));
    let a = scene.create_circle(1.0).unwrap();
    let b = scene.create_circle(1.0).unwrap();
    for id in [a, b] {
        let counter = fired.clone();
        scene
            .set_timeout(
                id,
                ms(10),
                TimerAction::Custom(Box::new(move |_| {
                    counter.set(counter.get() + 1);
                    Ok(())
                })),
            )
            .unwrap();
    }
    let counter = fired.clone();
    let released = scene
        .set_timeout(
            b,
            ms(10),
            TimerAction::Custom(Box::new(move |_| {
                counter.set(counter.get() + 100);
                Ok(())
            })),
        )
        .unwrap();

    scene.dispose(a);
    assert!(scene.release(released));
    assert!(!scene.release(released));

    let report = scene.flush(ms(20));
    assert_eq!(report.timers_fired, 1);
    assert_eq!(fired.get(), 1);
    assert!(!report.pending);
}

#[test]
fn once_listeners_release_their_disposer_when_they_fire() {
    let (mut scene, _) = scene();
    let c = scene.create_circle(1.0).unwrap();
    scene.flush(ms(0));
    let heard = Rc::new(Cell::new(0));

    let mut tokens = Vec::new();
    for tick in 1..=20 {
        let counter = heard.clone();
        let token = scene
            .once(c, EventKind::Validated, move |_| counter.set(counter.get() + 1))
            .unwrap();
        tokens.push(token);
        scene.invalidate(c, DirtyKinds::DRAW).unwrap();
        scene.flush(ms(tick * 16));
        assert_eq!(scene.node(c).unwrap().pending_disposers(), 0);
    }
    assert_eq!(heard.get(), 20);
    assert!(tokens.into_iter().all(|token| !scene.release(token)));

    // An unfired one-shot listener can still be released.
    let token = scene.once(c, EventKind::Hidden, |_| {}).unwrap();
    assert_eq!(scene.node(c).unwrap().pending_disposers(), 1);
    assert!(scene.release(token));
    assert_eq!(scene.node(c).unwrap().pending_disposers(), 0);
}

#[test]
fn disposed_nodes_reject_every_operation() {
    let (mut scene, _) = scene();
    let p = scene.props();
    let root = scene.create_container(Absolute);
    let c = scene.create_circle(1.0).unwrap();
    scene.dispose(c);

    let disposed = |r: Result<_, SceneError>| matches!(r, Err(SceneError::Disposed(id)) if id == c);
    assert!(disposed(scene.set(c, p.radius, 2.0).map(drop)));
    assert!(disposed(scene.get(c, p.radius).map(drop)));
    assert!(disposed(scene.apply_state(c, "default", false)));
    assert!(disposed(scene.create_state(c, "hover").map(drop)));
    assert!(disposed(scene.add_adapter(c, p.radius, 0, |r, _| r).map(drop)));
    assert!(disposed(scene.on_any(c, |_| {}).map(drop)));
    assert!(disposed(scene.invalidate(c, DirtyKinds::DRAW)));
    assert!(disposed(scene.add_child(root, c, None)));
    assert!(disposed(scene.measure(c).map(drop)));
    assert!(!scene.dispose(c));
}
