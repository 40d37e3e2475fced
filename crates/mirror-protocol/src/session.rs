//! Negotiation session states
//!
//! One long-lived session per connection. The protocol is push-shaped:
//! renegotiation returns to `Negotiated` on any inbound payload, whether or
//! not it acknowledges the specific request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of the negotiation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NegotiationState {
    /// No INIT has been sent yet.
    Uninitiated,
    /// INIT sent; waiting for the first capability payload. There is no
    /// timeout: a session can stay here indefinitely, resolving through the
    /// store's default policy.
    Handshaking,
    /// At least one capability payload has been applied.
    Negotiated,
    /// An outbound request batch is in flight.
    Renegotiating,
    /// Torn down; no further messages are processed.
    Closed,
}

impl NegotiationState {
    /// Whether inbound payloads are still processed in this state.
    pub fn accepts_payloads(&self) -> bool {
        !matches!(self, NegotiationState::Closed)
    }
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegotiationState::Uninitiated => "uninitiated",
            NegotiationState::Handshaking => "handshaking",
            NegotiationState::Negotiated => "negotiated",
            NegotiationState::Renegotiating => "renegotiating",
            NegotiationState::Closed => "closed",
        };
        f.write_str(name)
    }
}
