//! Tree-wide configuration.
//!
//! A [`Config`] is resolved once when a root [`Graph`](crate::Graph) is
//! created and shared by every level below it. It carries the serializable
//! [`Settings`] plus the [`EmitterFactory`] that each new node is built with.
//!
//! # Example
//!
//! ```rust
//! use stategraph::config::{Config, ReentryPolicy};
//! use stategraph::Graph;
//!
//! let config = Config::<u32>::builder()
//!     .reentry(ReentryPolicy::Reject)
//!     .track_history(true)
//!     .build();
//!
//! let graph = Graph::with_config(config);
//! assert_eq!(graph.settings().reentry, ReentryPolicy::Reject);
//! ```

use crate::emitter::{default_factory, Emitter, EmitterFactory};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

pub mod error;

pub use error::ConfigError;

/// What `go` does when asked to enter the state that is already active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReentryPolicy {
    /// Return the active node unchanged without firing entry again
    #[default]
    Ignore,

    /// Fail with `GraphError::AlreadyActive`
    Reject,
}

/// Plain-data part of the configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Behavior of a transition into the already active state
    pub reentry: ReentryPolicy,

    /// Record a timestamped transition log at every graph level
    pub track_history: bool,

    /// Keep at most this many records per level; unbounded when `None`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<usize>,
}

impl Settings {
    /// Parse settings from a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Settings plus the emitter root used for every node of a tree.
pub struct Config<A> {
    pub(crate) settings: Settings,
    pub(crate) emitter: Rc<dyn EmitterFactory<A>>,
}

impl<A: 'static> Config<A> {
    pub fn builder() -> ConfigBuilder<A> {
        ConfigBuilder::new()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn new_emitter(&self) -> Box<dyn Emitter<A>> {
        self.emitter.create()
    }
}

impl<A: 'static> Default for Config<A> {
    fn default() -> Self {
        ConfigBuilder::new().build()
    }
}

impl<A> fmt::Debug for Config<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Config`]
pub struct ConfigBuilder<A> {
    settings: Settings,
    emitter: Option<Rc<dyn EmitterFactory<A>>>,
}

impl<A: 'static> ConfigBuilder<A> {
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            emitter: None,
        }
    }

    /// Replace all settings at once, e.g. with ones loaded from JSON
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the re-entry policy
    pub fn reentry(mut self, policy: ReentryPolicy) -> Self {
        self.settings.reentry = policy;
        self
    }

    /// Enable or disable transition history
    pub fn track_history(mut self, enabled: bool) -> Self {
        self.settings.track_history = enabled;
        self
    }

    /// Cap the number of history records kept per level
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.settings.history_limit = Some(limit);
        self
    }

    /// Install the emitter root used for every node constructed afterwards
    pub fn emitter<F>(mut self, factory: F) -> Self
    where
        F: EmitterFactory<A> + 'static,
    {
        self.emitter = Some(Rc::new(factory));
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config<A> {
        Config {
            settings: self.settings,
            emitter: self.emitter.unwrap_or_else(default_factory),
        }
    }
}

impl<A: 'static> Default for ConfigBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}
