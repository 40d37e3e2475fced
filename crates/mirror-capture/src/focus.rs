//! The current look target

use mirror_core::position::BlockPos;
use mirror_core::types::EntityRef;

/// The single object currently targeted by the local observer. Updated from
/// pointer sampling; exclusively owned by the capture session.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CaptureFocus {
    /// Nothing under the pointer.
    #[default]
    None,
    /// An entity is targeted.
    Entity(EntityRef),
    /// A block position is targeted.
    Block(BlockPos),
}

impl CaptureFocus {
    pub fn is_set(&self) -> bool {
        !matches!(self, CaptureFocus::None)
    }
}
