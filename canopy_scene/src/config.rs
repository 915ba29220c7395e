// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene configuration.

use std::time::Duration;

/// Settings fixed when a [`Scene`](crate::Scene) is created.
///
/// ```rust
/// use std::time::Duration;
/// use canopy_scene::SceneConfig;
///
/// let config = SceneConfig::default()
///     .with_default_transition(Duration::from_millis(250))
///     .with_interactive_states(false);
/// assert_eq!(config.group_tag, "g");
/// assert!(!config.interactive_states);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneConfig {
    /// Element tag of containers without a parent.
    pub root_tag: String,
    /// Element tag of nested containers.
    pub group_tag: String,
    /// Duration given to states created through
    /// [`Scene::create_state`](crate::Scene::create_state).
    pub default_transition: Duration,
    /// Whether pointer input applies `hover`/`down` on interactive nodes.
    pub interactive_states: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            root_tag: "svg".into(),
            group_tag: "g".into(),
            default_transition: Duration::ZERO,
            interactive_states: true,
        }
    }
}

impl SceneConfig {
    /// Sets the root container tag.
    #[must_use]
    pub fn with_root_tag(mut self, tag: &str) -> Self {
        self.root_tag = tag.into();
        self
    }

    /// Sets the nested container tag.
    #[must_use]
    pub fn with_group_tag(mut self, tag: &str) -> Self {
        self.group_tag = tag.into();
        self
    }

    /// Sets the duration of newly created states.
    #[must_use]
    pub fn with_default_transition(mut self, duration: Duration) -> Self {
        self.default_transition = duration;
        self
    }

    /// Enables or disables automatic interactive states.
    #[must_use]
    pub fn with_interactive_states(mut self, enabled: bool) -> Self {
        self.interactive_states = enabled;
        self
    }
}
