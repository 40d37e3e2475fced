//! Permission negotiation protocol engine for Worldmirror
//!
//! Speaks the capability side channel: encodes INIT and REQUEST batches,
//! decodes GRANT and OVERRIDE payloads, and applies each fully decoded
//! payload to the capability store as one atomic effect. The channel is
//! asynchronous, unreliable, and push-shaped: nothing here correlates
//! requests with responses, and no payload failure is ever fatal.

pub mod engine;
pub mod messages;
pub mod session;
pub mod transport;

pub use engine::NegotiationEngine;
pub use messages::{DecodeError, InboundMessage, OutboundMessage, OverrideEntry};
pub use session::NegotiationState;
pub use transport::{Transport, TransportError};
