// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for scene operations.

use canopy_property::{InvalidValue, KindId};
use thiserror::Error;

use crate::node::NodeId;

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors surfaced by [`Scene`](crate::Scene) operations and flush passes.
#[derive(Clone, Debug, Error)]
pub enum SceneError {
    /// The caller configured a node incorrectly.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The node was disposed (or its handle never existed).
    #[error("node {0} is disposed")]
    Disposed(NodeId),

    /// A container's layout strategy could not place a child.
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// A measure or draw hook failed.
    #[error("{phase} hook of node {node} failed: {source}")]
    Hook {
        /// The node whose hook failed.
        node: NodeId,
        /// The pass the hook ran in.
        phase: HookPhase,
        /// The hook's own error.
        source: HookError,
    },
}

/// Synchronous misuse reported to the caller of the offending operation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigurationError {
    /// `apply_state` named a state the node does not define.
    #[error("unknown state `{name}`")]
    UnknownState {
        /// The requested state name.
        name: String,
    },

    /// A property validator rejected the value.
    #[error("malformed value for `{property}`: {source}")]
    MalformedValue {
        /// The property name.
        property: &'static str,
        /// The validator's verdict.
        source: InvalidValue,
    },

    /// A value was read from a property that has neither a value nor a default.
    #[error("property `{property}` is unset and not declared by the node's kind")]
    UnsetProperty {
        /// The property name.
        property: String,
    },

    /// The node kind is not registered with the scene.
    #[error("unknown node kind {0:?}")]
    UnknownKind(KindId),

    /// A container operation targeted a node that is not a container.
    #[error("node {0} is not a container")]
    NotAContainer(NodeId),

    /// `remove_child` named a node that is not a child of the container.
    #[error("node {child} is not a child of {container}")]
    NotAChild {
        /// The container.
        container: NodeId,
        /// The would-be child.
        child: NodeId,
    },

    /// Adding the child would make a container its own ancestor.
    #[error("adding {child} to {container} would create a cycle")]
    WouldCycle {
        /// The container.
        container: NodeId,
        /// The would-be child.
        child: NodeId,
    },
}

/// A layout strategy could not place a child.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LayoutError {
    /// The child's measured bounds are not finite.
    #[error("child {0} has non-finite bounds")]
    NonFiniteBounds(NodeId),

    /// A grid was configured with zero columns.
    #[error("grid layout needs at least one column")]
    ZeroColumns,

    /// The layout computed an offset that is not finite.
    #[error("computed a non-finite offset for child {0}")]
    NonFiniteOffset(NodeId),
}

/// The pass a hook ran in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HookPhase {
    /// Bottom-up measurement.
    Measure,
    /// Top-down drawing.
    Draw,
}

impl core::fmt::Display for HookPhase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Measure => "measure",
            Self::Draw => "draw",
        })
    }
}

/// Failure reported by a [`Visual`](crate::Visual) hook.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct HookError {
    message: String,
}

impl HookError {
    /// Creates a hook error with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = SceneError::from(ConfigurationError::UnknownState {
            name: "glow".into(),
        });
        assert_eq!(err.to_string(), "configuration error: unknown state `glow`");

        let err = SceneError::Hook {
            node: NodeId::new(3, 1),
            phase: HookPhase::Draw,
            source: HookError::new("surface lost"),
        };
        assert_eq!(err.to_string(), "draw hook of node 3v1 failed: surface lost");
    }

    #[test]
    fn malformed_values_keep_the_validator_reason() {
        let err = ConfigurationError::MalformedValue {
            property: "radius",
            source: InvalidValue::new("must be non-negative"),
        };
        assert_eq!(
            err.to_string(),
            "malformed value for `radius`: invalid property value: must be non-negative"
        );
    }
}
