//! Capture state machine for Worldmirror
//!
//! Tracks what the local observer is looking at, bridges displayed
//! container UIs to the remote objects backing them, and reconciles the
//! resulting partial, order-sensitive information into commit records. All
//! trigger handlers run on one sequential event timeline and never block;
//! every handler is a no-op while capture is disabled.

pub mod container;
pub mod dispatch;
pub mod extensions;
pub mod focus;
pub mod pairing;
pub mod ports;
pub mod session;

pub use container::{BackingKind, ContainerView, DisplayName, MerchantView, UiKind};
pub use extensions::CaptureExtension;
pub use focus::CaptureFocus;
pub use ports::WorldPort;
pub use session::{CaptureSession, CloseOutcome, RemovalDecision, WorldMeta};
