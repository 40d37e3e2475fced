//! Capability store for the Worldmirror permission negotiation
//!
//! Holds the current set of granted and denied capabilities, per-region
//! overrides, and the pending-request queue. The store itself is passive:
//! the negotiation engine pushes [`NegotiationEffect`]s into it and the
//! capture state machine reads the current snapshot at decision time.

pub mod names;
pub mod shared;
pub mod store;

pub use names::{CapabilityName, CapabilityValue};
pub use shared::SharedCapabilities;
pub use store::{CapabilitySet, DefaultPolicy, NegotiationEffect, RegionOverride};
