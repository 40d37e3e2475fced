//! Transport port for the negotiation side channel
//!
//! The host owns the actual connection; this crate only needs a way to hand
//! it bytes. Inbound bytes arrive through `NegotiationEngine::on_receive`,
//! registered by the host with whatever callback mechanism its networking
//! layer provides.

/// Failure to hand bytes to the underlying connection. Never fatal to the
/// rest of the system; the engine logs it and leaves its state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The connection is gone.
    #[error("transport disconnected: {reason}")]
    Disconnected { reason: String },

    /// The connection refused the payload.
    #[error("transport rejected payload: {reason}")]
    Rejected { reason: String },
}

impl TransportError {
    pub fn disconnected(reason: impl Into<String>) -> Self {
        Self::Disconnected {
            reason: reason.into(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

impl From<TransportError> for mirror_core::MirrorError {
    fn from(err: TransportError) -> Self {
        mirror_core::MirrorError::protocol(err.to_string())
    }
}

/// Byte-stream transport for outbound negotiation messages.
pub trait Transport {
    /// Hand one encoded message to the connection.
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
}

/// Transports used by tests across the workspace.
pub mod testing {
    use super::*;

    /// Transport that records every frame it is handed.
    #[derive(Debug, Default)]
    pub struct RecordingTransport {
        pub frames: Vec<Vec<u8>>,
        /// When set, every send fails with a disconnect.
        pub offline: bool,
    }

    impl RecordingTransport {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl Transport for RecordingTransport {
        fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
            if self.offline {
                return Err(TransportError::disconnected("offline"));
            }
            self.frames.push(bytes.to_vec());
            Ok(())
        }
    }
}
