//! The `(backing, ui)` dispatch table
//!
//! Resolution of a closing container UI against its backing object is a
//! finite table, not a priority cascade: each supported pair maps to one
//! close handler, and an unlisted pair is a structural mismatch the caller
//! reports as unhandled. New pairs are added here, nowhere else.

use crate::container::{BackingKind, UiKind};

/// How a recognized `(backing, ui)` pair is captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseHandler {
    /// A chest tile; splits into single or paired capture by slot count.
    Chest,
    /// Partial overlay onto the observer's ender inventory.
    EnderOverlay,
    /// One tile entity with its slots and any auxiliary fields.
    SingleTile,
    /// An entity that carries inventory; contents overwritten wholesale.
    TravelingContainer,
    /// A merchant: trade list plus career resolution.
    MerchantCareer,
    /// A rideable storage carrier's inventory.
    CarrierContainer,
}

/// Look up the handler for a backing/UI pair.
pub fn resolve(backing: &BackingKind, ui: &UiKind) -> Option<CloseHandler> {
    match (backing, ui) {
        (BackingKind::TileEntity { type_id, .. }, ui) => {
            match (type_id.as_str(), ui) {
                ("Chest" | "TrappedChest", UiKind::Chest) => Some(CloseHandler::Chest),
                ("EnderChest", UiKind::Chest) => Some(CloseHandler::EnderOverlay),
                ("BrewingStand", UiKind::BrewingStand)
                | ("Furnace", UiKind::Furnace)
                | ("Dispenser", UiKind::Dispenser)
                | ("Hopper", UiKind::Hopper)
                | ("Beacon", UiKind::Beacon) => Some(CloseHandler::SingleTile),
                _ => None,
            }
        }
        (BackingKind::Entity(entity), ui) => match (entity.type_id.as_str(), ui) {
            ("ChestMinecart", UiKind::Chest) | ("HopperMinecart", UiKind::Hopper) => {
                Some(CloseHandler::TravelingContainer)
            }
            ("Villager", UiKind::Merchant) => Some(CloseHandler::MerchantCareer),
            (_, UiKind::CarrierInventory) => Some(CloseHandler::CarrierContainer),
            _ => None,
        },
        (BackingKind::None, _) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirror_core::position::BlockPos;
    use mirror_core::types::{EntityId, EntityRef, EntityTypeId};

    fn tile(type_id: &str) -> BackingKind {
        BackingKind::TileEntity {
            pos: BlockPos::new(0, 0, 0),
            type_id: EntityTypeId::from(type_id),
        }
    }

    fn entity(type_id: &str) -> BackingKind {
        BackingKind::Entity(EntityRef {
            id: EntityId(7),
            type_id: EntityTypeId::from(type_id),
            x: 0.0,
            y: 0.0,
            z: 0.0,
        })
    }

    #[test]
    fn supported_pairs_resolve() {
        assert_eq!(resolve(&tile("Chest"), &UiKind::Chest), Some(CloseHandler::Chest));
        assert_eq!(
            resolve(&tile("EnderChest"), &UiKind::Chest),
            Some(CloseHandler::EnderOverlay)
        );
        assert_eq!(
            resolve(&tile("Furnace"), &UiKind::Furnace),
            Some(CloseHandler::SingleTile)
        );
        assert_eq!(
            resolve(&entity("ChestMinecart"), &UiKind::Chest),
            Some(CloseHandler::TravelingContainer)
        );
        assert_eq!(
            resolve(&entity("Villager"), &UiKind::Merchant),
            Some(CloseHandler::MerchantCareer)
        );
        assert_eq!(
            resolve(&entity("Horse"), &UiKind::CarrierInventory),
            Some(CloseHandler::CarrierContainer)
        );
    }

    #[test]
    fn structural_mismatches_do_not_resolve() {
        // UI kind unrelated to the backing object.
        assert_eq!(resolve(&tile("Furnace"), &UiKind::Chest), None);
        assert_eq!(resolve(&entity("Villager"), &UiKind::Chest), None);
        assert_eq!(resolve(&tile("Chest"), &UiKind::Merchant), None);
        assert_eq!(resolve(&BackingKind::None, &UiKind::Chest), None);
        // The creative picker never captures.
        assert_eq!(resolve(&tile("Chest"), &UiKind::Creative), None);
    }
}
