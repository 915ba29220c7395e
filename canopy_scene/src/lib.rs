// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Scene: a retained scene-graph node engine.
//!
//! Every drawable thing (a shape, a button, a label, a popup) is a node in a
//! [`Scene`]. A node owns:
//!
//! - a property store, with per-kind defaults from a
//!   [`Schema`](canopy_property::Schema);
//! - named [`State`]s that overlay property values, switched immediately or
//!   through a linear transition;
//! - an adapter chain of pure functions that transform values on read;
//! - an [`EventDispatcher`] publishing [`NodeEvent`]s;
//! - a [`DisposerRegistry`] of cleanup actions (children, listeners, adapters,
//!   timers) run exactly once.
//!
//! Containers order their children and place them through a pluggable
//! [`LayoutStrategy`].
//!
//! ## Rendering
//!
//! Mutations only mark nodes dirty. [`Scene::flush`] validates queued nodes in
//! one batch: measure bottom-up, then layout, draw and position top-down,
//! issuing calls on the scene's [`Surface`]. Node visuals implement
//! [`Measurable`], [`Drawable`] and [`Stateful`]; see [`Circle`] for the
//! simplest one.
//!
//! The effective value of a property is
//! `adapters(animation ?? state ?? local ?? kind default ?? registry default)`.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use canopy_scene::{
//!     Absolute, Color, EventKind, NodeEvent, RecordingSurface, Scene, StaticTheme,
//!     BUTTON_HOVER_ROLE,
//! };
//!
//! let surface = RecordingSurface::default();
//! let mut scene = Scene::new(surface.clone());
//! scene.set_theme(StaticTheme::builder().set(BUTTON_HOVER_ROLE, Color::WHITE).build());
//! let p = scene.props();
//!
//! let root = scene.create_container(Absolute);
//! let button = scene.create_button(80.0, 24.0).unwrap();
//! scene.add_child(root, button, None).unwrap();
//! scene.set(button, p.x, 10.0).unwrap();
//!
//! // Double the rendered width without touching the stored value.
//! scene.add_adapter(button, p.width, 0, |w, _| w * 2.0).unwrap();
//! assert_eq!(scene.get(button, p.width).unwrap(), 160.0);
//!
//! scene.flush(Duration::ZERO);
//! let el = scene.node(button).unwrap().element().unwrap();
//! assert_eq!(surface.attribute(el, "width").as_deref(), Some("160"));
//!
//! scene.apply_state(button, "hover", false).unwrap();
//! assert_eq!(scene.get(button, p.fill).unwrap(), Color::WHITE);
//!
//! scene.dispose(root);
//! assert!(!scene.contains(button));
//! ```

mod adapter;
mod config;
mod disposer;
mod error;
mod event;
mod input;
mod layout;
mod node;
mod props;
mod scene;
mod schedule;
mod shapes;
mod state;
mod surface;
mod theme;
mod timer;
mod visual;

pub use canopy_dirty::DirtyKinds;
pub use canopy_property::{Color, Dimension, KindId, Property, PropertyId, Value};

pub use adapter::{AdapterChain, AdapterFn, AdapterId, AdapterKey};
pub use config::SceneConfig;
pub use disposer::{DisposeAction, Disposer, DisposerId, DisposerRegistry};
pub use error::{
    ConfigurationError, HookError, HookPhase, LayoutError, SceneError, SceneResult,
};
pub use event::{EventDispatcher, EventKind, Listener, ListenerId, NodeEvent, Outcome};
pub use input::{InputEvent, InputKind, Modifiers};
pub use layout::{Absolute, Axis, Grid, LayoutChild, LayoutStrategy, Stack};
pub use node::{Lifecycle, Node, NodeId, NodeView};
pub use props::StandardProperties;
pub use scene::{Scene, StandardKinds};
pub use schedule::FlushReport;
pub use shapes::{
    BUTTON_ACTIVE_ROLE, BUTTON_DOWN_ROLE, BUTTON_HOVER_ROLE, Button, Circle, Label, Rectangle,
};
pub use state::{
    ACTIVE_STATE, DEFAULT_STATE, DOWN_STATE, HOVER_STATE, State, StateSet, Transition,
};
pub use surface::{ElementHandle, NullSurface, RecordingSurface, Surface, SurfaceCall};
pub use theme::{StaticTheme, StaticThemeBuilder, Theme};
pub use timer::{TimerAction, TimerId, TimerQueue};
pub use visual::{Deferred, DrawCx, Drawable, MeasureCx, Measurable, Stateful, Visual};
