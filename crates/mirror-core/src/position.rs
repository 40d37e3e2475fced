//! Block and chunk coordinates
//!
//! A chunk is a 16x16 column of blocks; block coordinates map to chunk
//! coordinates by an arithmetic shift right by four, which rounds toward
//! negative infinity for negative positions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute position of a single block in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    /// Create a block position.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Position offset by the given deltas.
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The chunk containing this block.
    pub fn chunk(&self) -> ChunkPos {
        ChunkPos::new(self.x >> 4, self.z >> 4)
    }

    /// The four horizontal neighbors in the fixed scan order used for
    /// paired-container resolution: south (+z), north (-z), east (+x),
    /// west (-x).
    pub fn cardinal_neighbors(&self) -> [BlockPos; 4] {
        [
            self.offset(0, 0, 1),
            self.offset(0, 0, -1),
            self.offset(1, 0, 0),
            self.offset(-1, 0, 0),
        ]
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Position of a chunk column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    /// Create a chunk position.
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chebyshev distance to another chunk, in chunks.
    pub fn chebyshev_distance(&self, other: ChunkPos) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.z)
    }
}
