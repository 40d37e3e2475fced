//! Shared domain types for the Worldmirror capture core
//!
//! Everything in this crate is plain data: positions, identifiers, item
//! stacks, finished commit records, and the ports the rest of the workspace
//! talks through (the commit sink and the user-facing reporter). No component
//! logic lives here.

pub mod errors;
pub mod position;
pub mod record;
pub mod report;
pub mod types;

pub use errors::{MirrorError, MirrorResult};
pub use position::{BlockPos, ChunkPos};
pub use record::{CommitRecord, CommitSink, SinkError};
pub use report::{FilteredReporter, MessageKind, Report, ReportConfig, Reporter};
pub use types::{ContainerId, EntityId, EntityRef, EntityTypeId, ItemStack, MapId, SlotSnapshot};
