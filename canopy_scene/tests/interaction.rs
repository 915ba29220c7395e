// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input routing and interaction states.

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use canopy_scene::{
    Absolute, InputEvent, InputKind, Modifiers, NodeId, Outcome, Scene, SceneConfig,
};
use kurbo::Point;

use common::{scene, scene_with};

fn input(kind: InputKind) -> InputEvent {
    InputEvent::new(kind, Point::new(1.0, 2.0))
}

fn state(scene: &Scene, id: NodeId) -> String {
    scene.node(id).unwrap().current_state().to_owned()
}

#[test]
fn input_bubbles_from_the_target_to_the_root() {
    let (mut scene, _) = scene();
    let root = scene.create_container(Absolute);
    let inner = scene.create_container(Absolute);
    let leaf = scene.create_circle(5.0).unwrap();
    scene.add_child(root, inner, None).unwrap();
    scene.add_child(inner, leaf, None).unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    for (id, name) in [(root, "root"), (inner, "inner"), (leaf, "leaf")] {
        let sink = log.clone();
        scene
            .on_input(id, move |event| {
                sink.borrow_mut().push((name, event.kind));
                Outcome::Continue
            })
            .unwrap();
    }

    assert!(!scene.dispatch_input(leaf, input(InputKind::PointerMove)).unwrap());
    assert_eq!(
        *log.borrow(),
        [
            ("leaf", InputKind::PointerMove),
            ("inner", InputKind::PointerMove),
            ("root", InputKind::PointerMove),
        ]
    );

    // Stopping at `inner` still runs its other listeners.
    scene.on_input(inner, |_| Outcome::Stop).unwrap();
    log.borrow_mut().clear();
    assert!(scene.dispatch_input(leaf, input(InputKind::KeyDown)).unwrap());
    assert_eq!(
        *log.borrow(),
        [("leaf", InputKind::KeyDown), ("inner", InputKind::KeyDown)]
    );
}

#[test]
fn listeners_see_modifiers_and_position() {
    let (mut scene, _) = scene();
    let c = scene.create_circle(5.0).unwrap();
    let seen = Rc::new(Cell::new(None));
    let sink = seen.clone();
    scene
        .on_input(c, move |event| {
            sink.set(Some(*event));
            Outcome::Continue
        })
        .unwrap();

    let event = input(InputKind::PointerDown).with_modifiers(Modifiers::SHIFT | Modifiers::CTRL);
    scene.dispatch_input(c, event).unwrap();
    let seen = seen.get().unwrap();
    assert!(seen.modifiers.contains(Modifiers::SHIFT));
    assert!(!seen.modifiers.contains(Modifiers::ALT));
    assert_eq!(seen.position, Point::new(1.0, 2.0));
}

#[test]
fn buttons_follow_the_pointer() {
    let (mut scene, _) = scene();
    let b = scene.create_button(40.0, 20.0).unwrap();
    assert_eq!(state(&scene, b), "default");

    let steps = [
        (InputKind::PointerEnter, "hover"),
        (InputKind::PointerDown, "down"),
        (InputKind::PointerMove, "down"),
        (InputKind::PointerUp, "hover"),
        (InputKind::PointerLeave, "default"),
    ];
    for (kind, expected) in steps {
        scene.dispatch_input(b, input(kind)).unwrap();
        assert_eq!(state(&scene, b), expected, "after {kind:?}");
    }
}

#[test]
fn leaving_while_pressed_resets_the_button() {
    let (mut scene, _) = scene();
    let b = scene.create_button(40.0, 20.0).unwrap();
    scene.dispatch_input(b, input(InputKind::PointerEnter)).unwrap();
    scene.dispatch_input(b, input(InputKind::PointerDown)).unwrap();
    scene.dispatch_input(b, input(InputKind::PointerLeave)).unwrap();
    assert_eq!(state(&scene, b), "default");

    // A release outside the button changes nothing.
    scene.dispatch_input(b, input(InputKind::PointerUp)).unwrap();
    assert_eq!(state(&scene, b), "default");
}

#[test]
fn the_active_flag_outlasts_hover() {
    let (mut scene, _) = scene();
    let b = scene.create_button(40.0, 20.0).unwrap();
    scene.set_active(b, true).unwrap();
    assert_eq!(state(&scene, b), "active");
    assert!(scene.node(b).unwrap().is_active());

    scene.dispatch_input(b, input(InputKind::PointerEnter)).unwrap();
    assert_eq!(state(&scene, b), "hover");
    scene.dispatch_input(b, input(InputKind::PointerLeave)).unwrap();
    assert_eq!(state(&scene, b), "active");

    scene.set_active(b, false).unwrap();
    assert_eq!(state(&scene, b), "default");
}

#[test]
fn plain_nodes_ignore_pointer_states() {
    let (mut scene, _) = scene();
    let p = scene.props();
    let c = scene.create_circle(5.0).unwrap();
    scene.create_state(c, "hover").unwrap().set(p.radius, 8.0);
    scene.dispatch_input(c, input(InputKind::PointerEnter)).unwrap();
    assert_eq!(state(&scene, c), "default");
    assert_eq!(scene.get(c, p.radius).unwrap(), 5.0);
}

#[test]
fn interactive_states_can_be_disabled() {
    let (mut scene, _) = scene_with(SceneConfig::default().with_interactive_states(false));
    let b = scene.create_button(40.0, 20.0).unwrap();
    scene.dispatch_input(b, input(InputKind::PointerEnter)).unwrap();
    assert_eq!(state(&scene, b), "default");

    // Explicit applies still work.
    scene.apply_state(b, "hover", false).unwrap();
    assert_eq!(state(&scene, b), "hover");
}

#[test]
fn released_listeners_stop_hearing_input() {
    let (mut scene, _) = scene();
    let c = scene.create_circle(5.0).unwrap();
    let heard = Rc::new(Cell::new(0));
    let counter = heard.clone();
    let listener = scene
        .on_input(c, move |_| {
            counter.set(counter.get() + 1);
            Outcome::Continue
        })
        .unwrap();

    scene.dispatch_input(c, input(InputKind::PointerMove)).unwrap();
    assert!(scene.release(listener));
    scene.dispatch_input(c, input(InputKind::PointerMove)).unwrap();
    assert_eq!(heard.get(), 1);
    assert!(!scene.release(listener));
}
