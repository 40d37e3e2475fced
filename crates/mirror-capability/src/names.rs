//! Capability names and values
//!
//! Names are plain strings on the wire; the well-known vocabulary the remote
//! authority currently speaks is collected here as constants. Unknown names
//! still round-trip through the store untouched (forward compatibility).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether any capture is permitted at all.
pub const DOWNLOAD_IN_GENERAL: &str = "downloadInGeneral";
/// Whether chunks outside the save radius may be kept.
pub const CACHE_CHUNKS: &str = "cacheChunks";
/// Whether entities may be captured.
pub const SAVE_ENTITIES: &str = "saveEntities";
/// Whether tile entities may be captured.
pub const SAVE_TILE_ENTITIES: &str = "saveTileEntities";
/// Whether container contents may be captured (in addition to the tile
/// entity itself).
pub const SAVE_CONTAINERS: &str = "saveContainers";
/// Whether received map images may be captured.
pub const SAVE_MAPS: &str = "saveMaps";
/// Whether the client may ask for capability changes.
pub const REQUEST_PERMISSIONS: &str = "requestPermissions";
/// Radius, in chunks around the observer, within which chunks may be saved.
pub const SAVE_RADIUS: &str = "saveRadius";

/// Name of a capability granted by the remote authority.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityName(pub String);

impl CapabilityName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CapabilityName {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Value of a capability: the remote grants booleans and integers only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilityValue {
    Bool(bool),
    Int(i64),
}

impl CapabilityValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CapabilityValue::Bool(b) => Some(*b),
            CapabilityValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            CapabilityValue::Int(i) => Some(*i),
            CapabilityValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for CapabilityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityValue::Bool(b) => write!(f, "{b}"),
            CapabilityValue::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<bool> for CapabilityValue {
    fn from(value: bool) -> Self {
        CapabilityValue::Bool(value)
    }
}

impl From<i64> for CapabilityValue {
    fn from(value: i64) -> Self {
        CapabilityValue::Int(value)
    }
}
