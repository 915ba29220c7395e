// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property reads and writes, extras and adapters.

mod common;

use canopy_property::{PropertyMetadataBuilder, Schema};
use canopy_scene::{
    Color, ConfigurationError, EventKind, NodeEvent, SceneError, Value,
};

use common::{ms, record, scene};

#[test]
fn setting_an_equal_value_is_a_no_op() {
    let (mut scene, surface) = scene();
    let p = scene.props();
    let c = scene.create_circle(10.0).unwrap();
    scene.flush(ms(0));
    let changes = record(&mut scene, c, EventKind::PropertyChanged);
    surface.clear_calls();

    assert!(!scene.set(c, p.radius, 10.0).unwrap());
    assert!(changes.borrow().is_empty());
    assert!(!scene.is_dirty());
    assert!(scene.flush(ms(16)).is_idle());
    assert!(surface.calls().is_empty());
}

#[test]
fn property_changed_carries_old_and_new_base_values() {
    let (mut scene, _) = scene();
    let p = scene.props();
    let c = scene.create_circle(10.0).unwrap();
    let changes = record(&mut scene, c, EventKind::PropertyChanged);

    assert!(scene.set(c, p.radius, 20.0).unwrap());
    let changes = changes.borrow();
    assert_eq!(changes.len(), 1);
    let NodeEvent::PropertyChanged {
        property,
        name,
        old,
        new,
    } = &changes[0]
    else {
        panic!("expected a property change, got {:?}", changes[0]);
    };
    assert_eq!(*property, p.radius.id());
    assert_eq!(*name, "radius");
    assert_eq!(old.as_ref().and_then(|v| v.downcast_ref::<f64>()), Some(&10.0));
    assert_eq!(new.as_ref().and_then(|v| v.downcast_ref::<f64>()), Some(&20.0));
}

#[test]
fn adapters_compose_in_ascending_priority() {
    let (mut scene, _) = scene();
    let p = scene.props();
    let r = scene.create_rectangle(5.0, 1.0).unwrap();

    let double = scene.add_adapter(r, p.width, 10, |w, _| w * 2.0).unwrap();
    scene.add_adapter(r, p.width, 0, |w, _| w + 1.0).unwrap();
    assert_eq!(scene.get(r, p.width).unwrap(), 12.0);
    assert_eq!(scene.apply_adapters(r, p.width, 5.0).unwrap(), 12.0);

    // Removal only changes later reads.
    assert!(scene.release(double));
    assert_eq!(scene.get(r, p.width).unwrap(), 6.0);
    assert!(!scene.release(double));
}

#[test]
fn adapters_with_equal_priority_keep_insertion_order() {
    let (mut scene, _) = scene();
    let p = scene.props();
    let label = scene.create_label("x").unwrap();
    scene
        .add_adapter(label, p.text, 0, |t: String, _| t + "a")
        .unwrap();
    scene
        .add_adapter(label, p.text, 0, |t: String, _| t + "b")
        .unwrap();
    assert_eq!(scene.get(label, p.text).unwrap(), "xab");
}

#[test]
fn an_empty_chain_is_the_identity() {
    let (mut scene, _) = scene();
    let p = scene.props();
    let r = scene.create_rectangle(7.5, 1.0).unwrap();
    assert_eq!(scene.get(r, p.width).unwrap(), 7.5);
    assert_eq!(scene.apply_adapters(r, p.width, 3.25).unwrap(), 3.25);
}

#[test]
fn adapters_read_the_node_they_adapt() {
    let (mut scene, _) = scene();
    let p = scene.props();
    let r = scene.create_rectangle(5.0, 3.0).unwrap();
    scene
        .add_adapter(r, p.width, 0, move |w, node| {
            w + node.raw(p.height).copied().unwrap_or(0.0)
        })
        .unwrap();
    assert_eq!(scene.get(r, p.width).unwrap(), 8.0);

    // The cached result is dropped when an input changes.
    scene.set(r, p.height, 4.0).unwrap();
    assert_eq!(scene.get(r, p.width).unwrap(), 9.0);
}

#[test]
fn adapter_changes_invalidate_the_node() {
    let (mut scene, surface) = scene();
    let p = scene.props();
    let r = scene.create_rectangle(5.0, 3.0).unwrap();
    scene.flush(ms(0));
    let el = scene.node(r).unwrap().element().unwrap();

    let grow = scene.add_adapter(r, p.width, 0, |w, _| w + 10.0).unwrap();
    assert!(scene.is_dirty());
    scene.flush(ms(16));
    assert_eq!(surface.attribute(el, "width").as_deref(), Some("15"));

    scene.release(grow);
    scene.flush(ms(32));
    assert_eq!(surface.attribute(el, "width").as_deref(), Some("5"));
}

#[test]
fn clear_reverts_to_the_default() {
    let (mut scene, _) = scene();
    let p = scene.props();
    let c = scene.create_circle(1.0).unwrap();
    scene.set(c, p.fill, Color::WHITE).unwrap();
    scene.flush(ms(0));

    assert!(scene.clear(c, p.fill).unwrap());
    assert_eq!(scene.get(c, p.fill).unwrap(), Color::BLACK);
    assert!(scene.is_dirty());
    assert!(!scene.clear(c, p.fill).unwrap());
}

#[test]
fn extras_are_untyped_and_adaptable() {
    let (mut scene, _) = scene();
    let c = scene.create_circle(1.0).unwrap();
    let changes = record(&mut scene, c, EventKind::ExtraChanged);

    assert_eq!(scene.get_extra(c, "tooltip").unwrap(), None);
    assert!(scene.set_extra(c, "tooltip", "ten").unwrap());
    assert!(!scene.set_extra(c, "tooltip", "ten").unwrap());
    assert_eq!(changes.borrow().len(), 1);

    scene
        .add_extra_adapter(c, "tooltip", 0, |v, _| match v {
            Value::Text(t) => Value::Text(t.to_uppercase()),
            other => other,
        })
        .unwrap();
    assert_eq!(
        scene.get_extra(c, "tooltip").unwrap(),
        Some(Value::Text("TEN".into()))
    );

    assert!(scene.clear_extra(c, "tooltip").unwrap());
    assert_eq!(scene.get_extra(c, "tooltip").unwrap(), None);
}

#[test]
fn custom_kinds_supply_defaults() {
    let (mut scene, _) = scene();
    let weight = scene.register_property(
        "weight",
        PropertyMetadataBuilder::new(1.0_f64).paint().build(),
    );
    let badge = Schema::builder("badge")
        .extend(&scene.props().node_schema())
        .declare_with_default(weight, 3.0)
        .build();
    let kind = scene.register_kind(badge);
    let n = scene.create_node(kind, None).unwrap();

    assert_eq!(scene.get(n, weight).unwrap(), 3.0);
    assert_eq!(scene.registry().typed::<f64>("weight"), Some(weight));

    // Plain nodes do not declare it.
    let plain = scene.create_node(scene.kinds().node, None).unwrap();
    assert!(matches!(
        scene.get(plain, weight),
        Err(SceneError::Configuration(ConfigurationError::UnsetProperty { property })) if property == "weight"
    ));
}
