// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in visuals: circles, rectangles, labels and buttons.
//!
//! These only supply geometry and default states; everything else comes
//! from the node engine.

use std::time::Duration;

use canopy_property::{Color, Property};
use kurbo::Rect;

use crate::error::HookError;
use crate::props::StandardProperties;
use crate::state::{ACTIVE_STATE, DOWN_STATE, HOVER_STATE, State};
use crate::visual::{DrawCx, Drawable, MeasureCx, Measurable, Stateful};

#[derive(Copy, Clone, Debug)]
struct Paint {
    fill: Property<Color>,
    stroke: Property<Color>,
    stroke_width: Property<f64>,
}

impl Paint {
    fn new(props: &StandardProperties) -> Self {
        Self {
            fill: props.fill,
            stroke: props.stroke,
            stroke_width: props.stroke_width,
        }
    }

    fn draw(&self, cx: &mut DrawCx<'_>) {
        let fill = cx.get_or(self.fill, Color::BLACK);
        let stroke = cx.get_or(self.stroke, Color::TRANSPARENT);
        let width = cx.get_or(self.stroke_width, 1.0);
        cx.set_attribute("fill", fill);
        cx.set_attribute("stroke", stroke);
        cx.set_attribute("stroke-width", width);
    }
}

/// A circle centered on the node's origin.
#[derive(Copy, Clone, Debug)]
pub struct Circle {
    radius: Property<f64>,
    paint: Paint,
}

impl Circle {
    /// Creates the visual.
    #[must_use]
    pub fn new(props: &StandardProperties) -> Self {
        Self {
            radius: props.radius,
            paint: Paint::new(props),
        }
    }
}

impl Measurable for Circle {
    fn measure(&self, cx: &MeasureCx<'_>) -> Result<Rect, HookError> {
        let r = cx.get_or(self.radius, 0.0);
        Ok(Rect::new(-r, -r, r, r))
    }
}

impl Drawable for Circle {
    fn tag(&self) -> &'static str {
        "circle"
    }

    fn draw(&mut self, cx: &mut DrawCx<'_>) -> Result<(), HookError> {
        let r = cx.get_or(self.radius, 0.0);
        cx.set_attribute("r", r);
        self.paint.draw(cx);
        Ok(())
    }
}

impl Stateful for Circle {}

/// A rectangle with its top-left corner on the node's origin.
#[derive(Copy, Clone, Debug)]
pub struct Rectangle {
    width: Property<f64>,
    height: Property<f64>,
    paint: Paint,
}

impl Rectangle {
    /// Creates the visual.
    #[must_use]
    pub fn new(props: &StandardProperties) -> Self {
        Self {
            width: props.width,
            height: props.height,
            paint: Paint::new(props),
        }
    }
}

impl Measurable for Rectangle {
    fn measure(&self, cx: &MeasureCx<'_>) -> Result<Rect, HookError> {
        Ok(Rect::new(
            0.0,
            0.0,
            cx.get_or(self.width, 0.0),
            cx.get_or(self.height, 0.0),
        ))
    }
}

impl Drawable for Rectangle {
    fn tag(&self) -> &'static str {
        "rect"
    }

    fn draw(&mut self, cx: &mut DrawCx<'_>) -> Result<(), HookError> {
        let width = cx.get_or(self.width, 0.0);
        let height = cx.get_or(self.height, 0.0);
        cx.set_attribute("width", width);
        cx.set_attribute("height", height);
        self.paint.draw(cx);
        Ok(())
    }
}

impl Stateful for Rectangle {}

/// A single line of text with fixed-advance metrics.
#[derive(Copy, Clone, Debug)]
pub struct Label {
    text: Property<String>,
    fill: Property<Color>,
    /// Advance of one character.
    pub char_width: f64,
    /// Height of the line box.
    pub line_height: f64,
}

impl Label {
    /// Creates the visual with 7x16 character cells.
    #[must_use]
    pub fn new(props: &StandardProperties) -> Self {
        Self {
            text: props.text,
            fill: props.fill,
            char_width: 7.0,
            line_height: 16.0,
        }
    }
}

impl Measurable for Label {
    fn measure(&self, cx: &MeasureCx<'_>) -> Result<Rect, HookError> {
        let chars = cx.get(self.text).map_or(0, |t| t.chars().count());
        #[expect(clippy::cast_possible_truncation, reason = "label lengths fit in u32")]
        let chars = f64::from(chars as u32);
        Ok(Rect::new(0.0, 0.0, chars * self.char_width, self.line_height))
    }
}

impl Drawable for Label {
    fn tag(&self) -> &'static str {
        "text"
    }

    fn draw(&mut self, cx: &mut DrawCx<'_>) -> Result<(), HookError> {
        let text = cx.get(self.text).unwrap_or_default();
        let fill = cx.get_or(self.fill, Color::BLACK);
        cx.set_attribute("text", text);
        cx.set_attribute("fill", fill);
        Ok(())
    }
}

impl Stateful for Label {}

/// Theme role of a button's fill while hovered.
pub const BUTTON_HOVER_ROLE: &str = "button-hover";
/// Theme role of a button's fill while pressed.
pub const BUTTON_DOWN_ROLE: &str = "button-down";
/// Theme role of a button's fill while active.
pub const BUTTON_ACTIVE_ROLE: &str = "button-active";

/// An interactive rectangle with themed hover, down and active states.
#[derive(Copy, Clone, Debug)]
pub struct Button {
    body: Rectangle,
    fill: Property<Color>,
    /// Transition duration of the built-in states.
    pub transition: Duration,
}

impl Button {
    /// Creates the visual.
    #[must_use]
    pub fn new(props: &StandardProperties) -> Self {
        Self {
            body: Rectangle::new(props),
            fill: props.fill,
            transition: Duration::from_millis(150),
        }
    }
}

impl Measurable for Button {
    fn measure(&self, cx: &MeasureCx<'_>) -> Result<Rect, HookError> {
        self.body.measure(cx)
    }
}

impl Drawable for Button {
    fn tag(&self) -> &'static str {
        self.body.tag()
    }

    fn draw(&mut self, cx: &mut DrawCx<'_>) -> Result<(), HookError> {
        self.body.draw(cx)
    }
}

impl Stateful for Button {
    fn states(&self) -> Vec<State> {
        [
            (HOVER_STATE, BUTTON_HOVER_ROLE),
            (DOWN_STATE, BUTTON_DOWN_ROLE),
            (ACTIVE_STATE, BUTTON_ACTIVE_ROLE),
        ]
        .into_iter()
        .map(|(name, role)| {
            let mut state = State::new(name, self.transition);
            state.set_theme_color(self.fill, role);
            state
        })
        .collect()
    }

    fn interactive(&self) -> bool {
        true
    }
}
