//! Paired-container resolution
//!
//! When a chest UI shows more slots than one physical container holds, the
//! second half sits in one of the four cardinal neighbors. The first match
//! in the fixed scan order (south, north, east, west) determines the pair;
//! which half owns slots `[0, k)` depends only on coordinates — the half
//! with the lower coordinate on the differing axis is always first — so the
//! committed result is independent of scan order.

use crate::ports::WorldPort;
use mirror_core::position::BlockPos;
use mirror_core::types::EntityTypeId;

/// A resolved container pair, in commit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerPair {
    /// Owns slots `[0, k)` of the combined view.
    pub first: BlockPos,
    /// Owns slots `[k, 2k)`.
    pub second: BlockPos,
}

/// No neighbor held the second half.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no adjacent {type_id} found next to {pos}")]
pub struct PairingError {
    pub pos: BlockPos,
    pub type_id: EntityTypeId,
}

impl From<PairingError> for mirror_core::MirrorError {
    fn from(err: PairingError) -> Self {
        mirror_core::MirrorError::capture(err.to_string())
    }
}

/// Find the second half of a paired container of the same subtype among
/// the focused position's neighbors.
pub fn resolve_pair(
    world: &dyn WorldPort,
    pos: BlockPos,
    type_id: &EntityTypeId,
) -> Result<ContainerPair, PairingError> {
    for neighbor in pos.cardinal_neighbors() {
        if world.tile_type_at(neighbor).as_ref() != Some(type_id) {
            continue;
        }
        // Lower coordinate on the differing axis goes first.
        let (first, second) = if (neighbor.x, neighbor.z) < (pos.x, pos.z) {
            (neighbor, pos)
        } else {
            (pos, neighbor)
        };
        return Ok(ContainerPair { first, second });
    }
    Err(PairingError {
        pos,
        type_id: type_id.clone(),
    })
}
