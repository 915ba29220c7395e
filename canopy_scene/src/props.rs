// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The properties every scene registers, and the built-in node kinds.

use canopy_property::{
    Color, InvalidValue, Property, PropertyMetadataBuilder, PropertyRegistry, Schema, SchemaBuilder,
};

fn non_negative(v: &f64) -> Result<(), InvalidValue> {
    if v.is_finite() && *v >= 0.0 {
        Ok(())
    } else {
        Err(InvalidValue::new("expected a finite, non-negative number"))
    }
}

fn finite(v: &f64) -> Result<(), InvalidValue> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(InvalidValue::new("expected a finite number"))
    }
}

/// Handles for the built-in properties.
///
/// Layout keys (`x`, `y`, `scale`, `rotation`, `pivot_*`, `visible`) mark a
/// node for re-positioning. Paint keys (`opacity`, `fill`, `stroke`) only
/// mark it for re-drawing. Geometry keys (`radius`, `width`, `height`,
/// `stroke_width`, `text`) mark it for re-measuring and re-drawing.
#[derive(Copy, Clone, Debug)]
pub struct StandardProperties {
    /// Horizontal translation.
    pub x: Property<f64>,
    /// Vertical translation.
    pub y: Property<f64>,
    /// Uniform scale around the pivot.
    pub scale: Property<f64>,
    /// Rotation around the pivot, in degrees.
    pub rotation: Property<f64>,
    /// Pivot x in local coordinates.
    pub pivot_x: Property<f64>,
    /// Pivot y in local coordinates.
    pub pivot_y: Property<f64>,
    /// Opacity, clamped to `0.0..=1.0`.
    pub opacity: Property<f64>,
    /// Visibility.
    pub visible: Property<bool>,
    /// Circle radius.
    pub radius: Property<f64>,
    /// Rectangle width.
    pub width: Property<f64>,
    /// Rectangle height.
    pub height: Property<f64>,
    /// Fill color.
    pub fill: Property<Color>,
    /// Stroke color.
    pub stroke: Property<Color>,
    /// Stroke width.
    pub stroke_width: Property<f64>,
    /// Label text.
    pub text: Property<String>,
}

impl StandardProperties {
    /// Registers the built-in properties.
    ///
    /// # Panics
    ///
    /// Panics if `registry` already holds a property with a built-in name.
    pub fn register(registry: &mut PropertyRegistry) -> Self {
        let layout = |default: f64| {
            PropertyMetadataBuilder::new(default)
                .layout()
                .validate(finite)
                .build()
        };
        let geometry = |default: f64| {
            PropertyMetadataBuilder::new(default)
                .geometry()
                .validate(non_negative)
                .build()
        };
        Self {
            x: registry.register("x", layout(0.0)),
            y: registry.register("y", layout(0.0)),
            scale: registry.register("scale", layout(1.0)),
            rotation: registry.register("rotation", layout(0.0)),
            pivot_x: registry.register("pivot_x", layout(0.0)),
            pivot_y: registry.register("pivot_y", layout(0.0)),
            opacity: registry.register(
                "opacity",
                PropertyMetadataBuilder::new(1.0_f64)
                    .paint()
                    .coerce(|v: f64| v.clamp(0.0, 1.0))
                    .validate(|v| {
                        if v.is_nan() {
                            Err(InvalidValue::new("opacity is NaN"))
                        } else {
                            Ok(())
                        }
                    })
                    .build(),
            ),
            visible: registry.register(
                "visible",
                PropertyMetadataBuilder::new(true).layout().build(),
            ),
            radius: registry.register("radius", geometry(0.0)),
            width: registry.register("width", geometry(0.0)),
            height: registry.register("height", geometry(0.0)),
            fill: registry.register(
                "fill",
                PropertyMetadataBuilder::new(Color::BLACK).paint().build(),
            ),
            stroke: registry.register(
                "stroke",
                PropertyMetadataBuilder::new(Color::TRANSPARENT).paint().build(),
            ),
            stroke_width: registry.register("stroke_width", geometry(1.0)),
            text: registry.register(
                "text",
                PropertyMetadataBuilder::new(String::new()).geometry().build(),
            ),
        }
    }

    /// Schema shared by every node kind: transform, opacity and visibility.
    #[must_use]
    pub fn node_schema(&self) -> Schema {
        Schema::builder("node")
            .declare(self.x)
            .declare(self.y)
            .declare(self.scale)
            .declare(self.rotation)
            .declare(self.pivot_x)
            .declare(self.pivot_y)
            .declare(self.opacity)
            .declare(self.visible)
            .build()
    }

    fn paintable(&self, name: &str) -> SchemaBuilder {
        Schema::builder(name)
            .extend(&self.node_schema())
            .declare(self.fill)
            .declare(self.stroke)
            .declare(self.stroke_width)
    }

    /// Schema for containers.
    #[must_use]
    pub fn container_schema(&self) -> Schema {
        Schema::builder("container")
            .extend(&self.node_schema())
            .build()
    }

    /// Schema for circles.
    #[must_use]
    pub fn circle_schema(&self) -> Schema {
        self.paintable("circle").declare(self.radius).build()
    }

    /// Schema for rectangles and buttons.
    #[must_use]
    pub fn rectangle_schema(&self) -> Schema {
        self.paintable("rectangle")
            .declare(self.width)
            .declare(self.height)
            .build()
    }

    /// Schema for text labels.
    #[must_use]
    pub fn label_schema(&self) -> Schema {
        self.paintable("label").declare(self.text).build()
    }
}
