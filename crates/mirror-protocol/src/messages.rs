//! Negotiation wire schema
//!
//! Messages are JSON envelopes tagged by `kind`. Inbound GRANT payloads are
//! a flat mapping of capability-name strings to booleans or integers;
//! per-entity-type track distances ride in the same mapping under the
//! `entityRange.` name prefix. Unknown names and unrepresentable values are
//! ignored for forward compatibility; undecodable bytes reject the whole
//! payload so it can never partially apply.

use mirror_capability::{CapabilityName, CapabilityValue, NegotiationEffect, RegionOverride};
use mirror_core::position::ChunkPos;
use mirror_core::types::EntityTypeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name prefix carrying per-entity-type track distances in a GRANT mapping.
pub const ENTITY_RANGE_PREFIX: &str = "entityRange.";

/// State string sent with an INIT message.
pub const REFRESH_REQUEST: &str = "refresh-request";

/// One entry of an inbound OVERRIDE payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideEntry {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub capability: String,
    pub value: bool,
}

/// Message sent to the remote authority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// Opens (or re-opens) negotiation.
    #[serde(rename_all = "camelCase")]
    Init {
        client_version: String,
        state: String,
    },
    /// One batch of user-issued capability change requests.
    #[serde(rename_all = "camelCase")]
    Request {
        client_version: String,
        requests: BTreeMap<String, CapabilityValue>,
    },
}

impl OutboundMessage {
    /// The INIT message for this client version.
    pub fn init(client_version: impl Into<String>) -> Self {
        Self::Init {
            client_version: client_version.into(),
            state: REFRESH_REQUEST.to_owned(),
        }
    }

    /// A REQUEST batch from the pending queue.
    pub fn request(
        client_version: impl Into<String>,
        pending: Vec<(CapabilityName, CapabilityValue)>,
    ) -> Self {
        Self::Request {
            client_version: client_version.into(),
            requests: pending
                .into_iter()
                .map(|(name, value)| (name.0, value))
                .collect(),
        }
    }

    /// Serialize to wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        // The envelope contains only maps, strings and numbers; this cannot
        // fail for any value constructed above.
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// Message received from the remote authority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InboundMessage {
    /// Mapping of capability names to granted values.
    Grant {
        values: BTreeMap<String, serde_json::Value>,
    },
    /// Region override entries. `replace` drops the existing table first;
    /// otherwise entries augment it with replace-by-key semantics.
    #[serde(rename_all = "camelCase")]
    Override {
        entries: Vec<OverrideEntry>,
        #[serde(default)]
        replace: bool,
    },
    /// The remote restarted negotiation; all prior grants are void.
    Reset,
}

/// Failure to decode an inbound payload. The payload is dropped whole; the
/// capability store is untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("undecodable negotiation payload: {message}")]
pub struct DecodeError {
    pub message: String,
}

impl From<DecodeError> for mirror_core::MirrorError {
    fn from(err: DecodeError) -> Self {
        mirror_core::MirrorError::protocol(err.to_string())
    }
}

impl InboundMessage {
    /// Decode wire bytes into a message, fully, before anything is applied.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(bytes).map_err(|err| DecodeError {
            message: err.to_string(),
        })
    }

    /// Lower a decoded message into one atomic store effect.
    pub fn into_effect(self) -> NegotiationEffect {
        match self {
            InboundMessage::Grant { values } => {
                let mut booleans = Vec::new();
                let mut integers = Vec::new();
                let mut entity_ranges = Vec::new();
                for (name, value) in values {
                    if let Some(type_name) = name.strip_prefix(ENTITY_RANGE_PREFIX) {
                        match value.as_i64() {
                            Some(range) => entity_ranges
                                .push((EntityTypeId::new(type_name), range as i32)),
                            None => {
                                tracing::debug!(%name, "non-numeric entity range ignored")
                            }
                        }
                        continue;
                    }
                    match value {
                        serde_json::Value::Bool(b) => booleans.push((CapabilityName(name), b)),
                        serde_json::Value::Number(n) => match n.as_i64() {
                            Some(i) => integers.push((CapabilityName(name), i)),
                            None => tracing::debug!(%name, "non-integral grant value ignored"),
                        },
                        // Unknown value shapes are ignored for forward
                        // compatibility, same as unknown names.
                        other => {
                            tracing::debug!(%name, value = %other, "unsupported grant value ignored")
                        }
                    }
                }
                NegotiationEffect::Grant {
                    booleans,
                    integers,
                    entity_ranges,
                }
            }
            InboundMessage::Override { entries, replace } => NegotiationEffect::Overrides {
                entries: entries
                    .into_iter()
                    .map(|entry| RegionOverride {
                        chunk: ChunkPos::new(entry.chunk_x, entry.chunk_z),
                        capability: CapabilityName::new(entry.capability),
                        value: entry.value,
                    })
                    .collect(),
                replace,
            },
            InboundMessage::Reset => NegotiationEffect::Reset,
        }
    }
}
