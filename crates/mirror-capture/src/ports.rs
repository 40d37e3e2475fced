//! Host-side ports consumed by the capture session
//!
//! The one place the host's scene graph is consulted. Implementations are
//! narrow and per-concern so the state machine itself stays free of any
//! host-object introspection.

use mirror_core::position::BlockPos;
use mirror_core::types::{EntityRef, EntityTypeId};

/// Queries against the host's current world view.
pub trait WorldPort {
    /// Type of the tile entity at the given position, if one is loaded.
    fn tile_type_at(&self, pos: BlockPos) -> Option<EntityTypeId>;

    /// The observer's current world-space position.
    fn observer_position(&self) -> (f64, f64, f64);

    /// The entity the observer is currently riding, if any.
    fn riding(&self) -> Option<EntityRef>;

    /// Slot count of the observer's personal ender inventory.
    fn ender_inventory_size(&self) -> usize;

    /// Snapshot an entity's state before it disappears. The payload shape
    /// is owned by the host; this core stores it opaquely.
    fn snapshot_entity(&self, entity: &EntityRef) -> serde_json::Value;
}

/// Static world used by tests across the workspace.
pub mod testing {
    use super::*;
    use std::collections::BTreeMap;

    /// World port over fixed tables.
    #[derive(Debug, Default)]
    pub struct StaticWorld {
        pub tiles: BTreeMap<(i32, i32, i32), EntityTypeId>,
        pub observer: (f64, f64, f64),
        pub riding: Option<EntityRef>,
        pub ender_size: usize,
    }

    impl StaticWorld {
        pub fn new() -> Self {
            Self {
                ender_size: 27,
                ..Self::default()
            }
        }

        pub fn with_tile(mut self, pos: BlockPos, type_id: impl Into<EntityTypeId>) -> Self {
            self.tiles.insert((pos.x, pos.y, pos.z), type_id.into());
            self
        }
    }

    impl WorldPort for StaticWorld {
        fn tile_type_at(&self, pos: BlockPos) -> Option<EntityTypeId> {
            self.tiles.get(&(pos.x, pos.y, pos.z)).cloned()
        }

        fn observer_position(&self) -> (f64, f64, f64) {
            self.observer
        }

        fn riding(&self) -> Option<EntityRef> {
            self.riding.clone()
        }

        fn ender_inventory_size(&self) -> usize {
            self.ender_size
        }

        fn snapshot_entity(&self, entity: &EntityRef) -> serde_json::Value {
            serde_json::json!({
                "id": entity.id.0,
                "type": entity.type_id.as_str(),
                "pos": [entity.x, entity.y, entity.z],
            })
        }
    }
}
