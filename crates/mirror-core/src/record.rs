//! Finished capture records and the commit sink port
//!
//! A [`CommitRecord`] is the immutable result of one successful capture.
//! Once handed to the sink it is final; durability and any retry policy
//! belong to the sink, not to this core.

use crate::position::{BlockPos, ChunkPos};
use crate::types::{EntityRef, EntityTypeId, MapId, SlotSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Auxiliary numeric fields captured alongside a tile entity's slots
/// (brew time, burn time, fuel, note pitch, ...).
pub type AuxFields = BTreeMap<String, i32>;

/// Immutable result of one successful capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommitRecord {
    /// A tile entity, keyed by block position.
    TileEntity {
        pos: BlockPos,
        kind: EntityTypeId,
        slots: SlotSnapshot,
        aux: AuxFields,
    },
    /// A tracked entity with its captured payload.
    Entity {
        entity: EntityRef,
        payload: serde_json::Value,
    },
    /// A chunk column to be flushed by the sink.
    Chunk { chunk: ChunkPos },
    /// A received map image.
    Map { id: MapId, image_data: Vec<u8> },
}

impl fmt::Display for CommitRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitRecord::TileEntity { pos, kind, .. } => {
                write!(f, "tile entity {kind} at {pos}")
            }
            CommitRecord::Entity { entity, .. } => write!(f, "entity {entity}"),
            CommitRecord::Chunk { chunk } => write!(f, "chunk {chunk}"),
            CommitRecord::Map { id, .. } => write!(f, "map {}", id.0),
        }
    }
}

/// Opaque error returned by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SinkError {
    /// Description passed through from the sink
    pub message: String,
}

impl SinkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The persistence collaborator. Expected idempotent for identical records;
/// the caller must not assume the commit completed synchronously.
pub trait CommitSink {
    /// Hand a finished record to the persistence layer.
    fn commit(&self, record: CommitRecord) -> Result<(), SinkError>;
}

impl<S: CommitSink + ?Sized> CommitSink for std::sync::Arc<S> {
    fn commit(&self, record: CommitRecord) -> Result<(), SinkError> {
        (**self).commit(record)
    }
}

/// In-memory sink used by tests across the workspace.
pub mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// Commit sink that records everything it is handed.
    #[derive(Default)]
    pub struct MemorySink {
        records: Mutex<Vec<CommitRecord>>,
    }

    impl MemorySink {
        pub fn new() -> Self {
            Self::default()
        }

        /// All records committed so far, in order.
        pub fn records(&self) -> Vec<CommitRecord> {
            self.records.lock().clone()
        }

        pub fn len(&self) -> usize {
            self.records.lock().len()
        }

        pub fn is_empty(&self) -> bool {
            self.records.lock().is_empty()
        }
    }

    impl CommitSink for MemorySink {
        fn commit(&self, record: CommitRecord) -> Result<(), SinkError> {
            self.records.lock().push(record);
            Ok(())
        }
    }

    /// Sink that rejects every record, for failure-path tests.
    #[derive(Default)]
    pub struct FailingSink;

    impl CommitSink for FailingSink {
        fn commit(&self, record: CommitRecord) -> Result<(), SinkError> {
            Err(SinkError::new(format!("refused {record}")))
        }
    }
}
