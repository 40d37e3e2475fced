//! Identifiers and item data shared across the workspace

use crate::position::ChunkPos;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric entity id assigned by the remote authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub i32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// String identifier naming an entity or tile type (e.g. `"Chest"`,
/// `"Villager"`). Owned by the external type registry; opaque here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityTypeId(pub String);

impl EntityTypeId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityTypeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Reference to a tracked entity: its id, type, and last known location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: EntityId,
    pub type_id: EntityTypeId,
    /// World-space position (feet).
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl EntityRef {
    /// The chunk this entity currently occupies.
    pub fn chunk(&self) -> ChunkPos {
        ChunkPos::new(
            (self.x / 16.0).floor() as i32,
            (self.z / 16.0).floor() as i32,
        )
    }

    /// Horizontal distance to the given observer position. The vertical
    /// component is ignored, matching how track distances are enforced.
    pub fn horizontal_distance_to(&self, x: f64, z: f64) -> f64 {
        let dx = self.x - x;
        let dz = self.z - z;
        (dx * dx + dz * dz).sqrt()
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.type_id, self.id)
    }
}

/// Window id of a displayed container UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub i32);

/// Id of a received map item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MapId(pub i32);

/// A single stack of items as displayed in a container slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: String,
    pub count: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<i16>,
}

impl ItemStack {
    pub fn new(item: impl Into<String>, count: u8) -> Self {
        Self {
            item: item.into(),
            count,
            damage: None,
        }
    }
}

/// Ordered view of a container's slots; `None` marks an empty slot.
pub type SlotSnapshot = Vec<Option<ItemStack>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_chunk_floors_negative_positions() {
        let entity = EntityRef {
            id: EntityId(1),
            type_id: EntityTypeId::from("Creeper"),
            x: -0.5,
            y: 64.0,
            z: 17.0,
        };
        assert_eq!(entity.chunk(), ChunkPos::new(-1, 1));
    }

    #[test]
    fn horizontal_distance_ignores_height() {
        let entity = EntityRef {
            id: EntityId(2),
            type_id: EntityTypeId::from("Cow"),
            x: 3.0,
            y: 200.0,
            z: 4.0,
        };
        assert!((entity.horizontal_distance_to(0.0, 0.0) - 5.0).abs() < 1e-9);
    }
}
