//! The negotiation engine
//!
//! Owns the session state and the outbound transport; shares the capability
//! store with the capture side. Every fully decoded inbound payload becomes
//! one atomic store effect. Transport and decode failures are logged and
//! absorbed here; capability state then resolves through the store's
//! default policy until the channel recovers.

use crate::messages::{InboundMessage, OutboundMessage};
use crate::session::NegotiationState;
use crate::transport::Transport;
use mirror_capability::SharedCapabilities;
use mirror_core::MirrorResult;

/// Protocol engine for one session.
pub struct NegotiationEngine<T: Transport> {
    state: NegotiationState,
    transport: T,
    caps: SharedCapabilities,
    client_version: String,
}

impl<T: Transport> NegotiationEngine<T> {
    /// Create an engine over an established transport.
    pub fn new(transport: T, caps: SharedCapabilities, client_version: impl Into<String>) -> Self {
        Self {
            state: NegotiationState::Uninitiated,
            transport,
            caps,
            client_version: client_version.into(),
        }
    }

    /// Current session state.
    pub fn state(&self) -> NegotiationState {
        self.state
    }

    /// Send the INIT message and enter `Handshaking`. A transport failure
    /// leaves the session `Uninitiated`; calling again retries.
    pub fn start(&mut self) -> MirrorResult<()> {
        if self.state != NegotiationState::Uninitiated {
            return Ok(());
        }
        let bytes = OutboundMessage::init(self.client_version.clone()).encode();
        match self.transport.send(&bytes) {
            Ok(()) => {
                self.state = NegotiationState::Handshaking;
                tracing::debug!("negotiation started");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%err, "could not send INIT; still uninitiated");
                Err(err.into())
            }
        }
    }

    /// Handle one inbound payload from the transport's delivery thread.
    /// Malformed payloads are dropped with a diagnostic and the session
    /// stays in its current state; this is never fatal.
    pub fn on_receive(&mut self, bytes: &[u8]) {
        if !self.state.accepts_payloads() {
            tracing::trace!("payload after close ignored");
            return;
        }

        let message = match InboundMessage::decode(bytes) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(%err, len = bytes.len(), "dropping malformed payload");
                return;
            }
        };

        // Decode completed; commit as one effect before any state change.
        self.caps.apply(message.into_effect());

        match self.state {
            NegotiationState::Handshaking | NegotiationState::Renegotiating => {
                self.state = NegotiationState::Negotiated;
            }
            // A push before our INIT still counts as negotiated state.
            NegotiationState::Uninitiated => {
                self.state = NegotiationState::Negotiated;
            }
            NegotiationState::Negotiated | NegotiationState::Closed => {}
        }
    }

    /// Serialize the pending request queue as one REQUEST batch. Requests
    /// leave the queue only once the transport accepts the bytes; the
    /// remote's acknowledgment arrives later as an ordinary GRANT.
    pub fn send_requests(&mut self) -> MirrorResult<()> {
        if self.state == NegotiationState::Closed {
            return Ok(());
        }
        let pending = self.caps.pending_requests();
        if pending.is_empty() {
            return Ok(());
        }

        let bytes = OutboundMessage::request(self.client_version.clone(), pending).encode();
        match self.transport.send(&bytes) {
            Ok(()) => {
                self.caps.mark_requests_sent();
                if self.state == NegotiationState::Negotiated {
                    self.state = NegotiationState::Renegotiating;
                }
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%err, "request batch not sent; keeping queue");
                Err(err.into())
            }
        }
    }

    /// Tear the session down. No further payloads are processed.
    pub fn close(&mut self) {
        self.state = NegotiationState::Closed;
        tracing::debug!("negotiation closed");
    }
}
