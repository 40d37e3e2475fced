//! Classification configuration
//!
//! Deserialized from the host's TOML settings. Every field defaults so an
//! absent file behaves exactly like the out-of-the-box policy: server mode,
//! everything enabled, no local distance overrides.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which source decides a type's track distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackDistanceMode {
    /// Built-in defaults only.
    Default,
    /// Distances the remote pushed, falling back to the defaults.
    #[default]
    Server,
    /// Local per-type overrides, falling back to the defaults.
    User,
}

/// Per-group settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    pub enabled: bool,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Per-type settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeConfig {
    pub enabled: bool,
    /// Local track-distance override, used in `User` mode.
    pub track_distance: Option<i32>,
}

impl Default for TypeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            track_distance: None,
        }
    }
}

/// Classification policy inputs owned by the local user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    pub mode: TrackDistanceMode,
    /// Keyed by group name (see `Category::group_name`).
    pub groups: BTreeMap<String, GroupConfig>,
    /// Keyed by type identifier.
    pub types: BTreeMap<String, TypeConfig>,
}

impl ClassificationConfig {
    /// Whether the given group is enabled; absent groups are enabled.
    pub fn group_enabled(&self, group: &str) -> bool {
        self.groups.get(group).map_or(true, |g| g.enabled)
    }

    /// Whether the given type is enabled; absent types are enabled.
    pub fn type_enabled(&self, type_id: &str) -> bool {
        self.types.get(type_id).map_or(true, |t| t.enabled)
    }

    /// Local track-distance override for a type, if one is configured.
    pub fn type_track_distance(&self, type_id: &str) -> Option<i32> {
        self.types.get(type_id).and_then(|t| t.track_distance)
    }
}
