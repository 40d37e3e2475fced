//! Unified error type for the Worldmirror core
//!
//! One small enum covers the workspace; components with genuinely distinct
//! failure modes a caller matches on (career resolution, transport) carry
//! their own narrow error types and convert into this one at the boundary.

use serde::{Deserialize, Serialize};

/// Unified error type for all Worldmirror operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum MirrorError {
    /// A negotiation payload could not be decoded.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the undecodable payload
        message: String,
    },

    /// A type could not be classified.
    #[error("Classification error: {message}")]
    Classification {
        /// Description of the unrecognized type
        message: String,
    },

    /// A capture step failed for one part of an object.
    #[error("Capture error: {message}")]
    Capture {
        /// Description of the failed part
        message: String,
    },

    /// The remote authority denies the operation.
    #[error("Permission denied: {message}")]
    PermissionDenied {
        /// Description of the denied operation
        message: String,
    },

    /// The persistence collaborator rejected a record.
    #[error("Sink error: {message}")]
    Sink {
        /// Description passed through from the sink
        message: String,
    },

    /// Invalid input or configuration.
    #[error("Invalid: {message}")]
    Invalid {
        /// Description of the invalid input
        message: String,
    },
}

impl MirrorError {
    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create a classification error.
    pub fn classification(message: impl Into<String>) -> Self {
        Self::Classification {
            message: message.into(),
        }
    }

    /// Create a capture error.
    pub fn capture(message: impl Into<String>) -> Self {
        Self::Capture {
            message: message.into(),
        }
    }

    /// Create a permission-denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    /// Create a sink error.
    pub fn sink(message: impl Into<String>) -> Self {
        Self::Sink {
            message: message.into(),
        }
    }

    /// Create an invalid-input error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

impl From<crate::record::SinkError> for MirrorError {
    fn from(err: crate::record::SinkError) -> Self {
        Self::Sink {
            message: err.message,
        }
    }
}

/// Result alias used across the workspace.
pub type MirrorResult<T> = Result<T, MirrorError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SinkError;

    #[test]
    fn sink_errors_convert_at_the_boundary() {
        let err = MirrorError::from(SinkError::new("disk full"));
        assert_eq!(err, MirrorError::sink("disk full"));
        assert_eq!(err.to_string(), "Sink error: disk full");
    }
}
