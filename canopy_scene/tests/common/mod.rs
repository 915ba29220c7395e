// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Helpers shared by the integration tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use canopy_scene::{EventKind, NodeEvent, NodeId, RecordingSurface, Scene, SceneConfig};
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness (`RUST_LOG` filters it).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A scene over a recording surface.
pub fn scene() -> (Scene, RecordingSurface) {
    scene_with(SceneConfig::default())
}

pub fn scene_with(config: SceneConfig) -> (Scene, RecordingSurface) {
    init_tracing();
    let surface = RecordingSurface::default();
    (Scene::with_config(config, surface.clone()), surface)
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Records every event of one kind a node publishes.
pub fn record(scene: &mut Scene, id: NodeId, kind: EventKind) -> Rc<RefCell<Vec<NodeEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    scene
        .on(id, kind, move |event| sink.borrow_mut().push(event.clone()))
        .unwrap();
    log
}
