//! The capability set and the effects that mutate it
//!
//! Every successfully decoded negotiation payload is applied as one
//! [`NegotiationEffect`]; an effect either applies completely or not at all.
//! Queries never block and never fail: a capability the remote has not
//! mentioned resolves through the [`DefaultPolicy`] chosen at session start.

use crate::names::{self, CapabilityName, CapabilityValue};
use indexmap::IndexMap;
use mirror_core::position::ChunkPos;
use mirror_core::types::EntityTypeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a boolean capability resolves when the remote never mentioned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultPolicy {
    /// Absence is treated as "allow" until a denial arrives.
    #[default]
    Permissive,
    /// Absence is treated as "deny" until a grant arrives.
    StrictDeny,
}

impl DefaultPolicy {
    fn default_bool(&self) -> bool {
        matches!(self, DefaultPolicy::Permissive)
    }
}

/// A per-chunk exception to a global capability value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionOverride {
    pub chunk: ChunkPos,
    pub capability: CapabilityName,
    pub value: bool,
}

/// Atomic mutation of the capability set, produced by the negotiation
/// engine from one fully decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NegotiationEffect {
    /// Granted values from an inbound GRANT payload.
    Grant {
        booleans: Vec<(CapabilityName, bool)>,
        integers: Vec<(CapabilityName, i64)>,
        entity_ranges: Vec<(EntityTypeId, i32)>,
    },
    /// Entries from an inbound OVERRIDE payload. Later entries for the same
    /// `(chunk, capability)` key supersede earlier ones in the same batch.
    Overrides {
        entries: Vec<RegionOverride>,
        /// Replace the whole table rather than augmenting it.
        replace: bool,
    },
    /// The remote signalled a fresh handshake; drop all negotiated state.
    Reset,
}

/// Authoritative permission state for one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapabilitySet {
    policy: DefaultPolicy,
    booleans: BTreeMap<CapabilityName, bool>,
    integers: BTreeMap<CapabilityName, i64>,
    entity_ranges: BTreeMap<EntityTypeId, i32>,
    overrides: IndexMap<(ChunkPos, CapabilityName), bool>,
    pending: IndexMap<CapabilityName, CapabilityValue>,
    /// True once at least one GRANT payload has been applied.
    negotiated: bool,
}

impl CapabilitySet {
    /// Create an empty set with the given default policy.
    pub fn new(policy: DefaultPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Whether at least one GRANT payload has been applied this session.
    pub fn has_negotiated(&self) -> bool {
        self.negotiated
    }

    /// Apply one effect. The effect mutates state as a whole; a decoded
    /// payload is never split across multiple calls.
    pub fn apply(&mut self, effect: NegotiationEffect) {
        match effect {
            NegotiationEffect::Grant {
                booleans,
                integers,
                entity_ranges,
            } => {
                for (name, value) in booleans {
                    self.booleans.insert(name, value);
                }
                for (name, value) in integers {
                    self.integers.insert(name, value);
                }
                for (type_id, range) in entity_ranges {
                    self.entity_ranges.insert(type_id, range);
                }
                self.negotiated = true;
            }
            NegotiationEffect::Overrides { entries, replace } => {
                if replace {
                    self.overrides.clear();
                }
                for entry in entries {
                    self.overrides
                        .insert((entry.chunk, entry.capability), entry.value);
                }
            }
            NegotiationEffect::Reset => {
                let policy = self.policy;
                *self = Self::new(policy);
            }
        }
    }

    /// Current value of a boolean capability; absence resolves through the
    /// default policy.
    pub fn query_bool(&self, name: &str) -> bool {
        self.booleans
            .get(&CapabilityName::from(name))
            .copied()
            .unwrap_or_else(|| self.policy.default_bool())
    }

    /// Current value of an integer capability, if the remote pushed one.
    pub fn query_int(&self, name: &str) -> Option<i64> {
        self.integers.get(&CapabilityName::from(name)).copied()
    }

    /// Per-chunk override for a capability, checked before the global value.
    pub fn region_override(&self, chunk: ChunkPos, name: &str) -> Option<bool> {
        self.overrides
            .get(&(chunk, CapabilityName::from(name)))
            .copied()
    }

    /// Boolean capability resolved for a specific chunk: the override if one
    /// exists, the global value otherwise.
    pub fn allows(&self, chunk: ChunkPos, name: &str) -> bool {
        self.region_override(chunk, name)
            .unwrap_or_else(|| self.query_bool(name))
    }

    /// Track distance the remote explicitly pushed for a type.
    pub fn entity_range(&self, type_id: &EntityTypeId) -> Option<i32> {
        self.entity_ranges.get(type_id).copied()
    }

    /// Whether any override entries are present.
    pub fn has_chunk_overrides(&self) -> bool {
        !self.overrides.is_empty()
    }

    /// Whether any capture is possible at all: the global grant, or at
    /// least one chunk-level override that could allow something.
    pub fn can_download_at_all(&self) -> bool {
        self.query_bool(names::DOWNLOAD_IN_GENERAL) || self.has_chunk_overrides()
    }

    /// Whether the remote accepts capability change requests.
    pub fn can_request_permissions(&self) -> bool {
        self.query_bool(names::REQUEST_PERMISSIONS)
    }

    /// Whether a chunk may be flushed. Override first; otherwise the global
    /// grant plus the radius rule: cached chunks are always allowed, and a
    /// negative radius means unlimited.
    pub fn can_save_chunk(&self, chunk: ChunkPos, observer_chunk: ChunkPos) -> bool {
        if let Some(value) = self.region_override(chunk, names::DOWNLOAD_IN_GENERAL) {
            return value;
        }
        if !self.query_bool(names::DOWNLOAD_IN_GENERAL) {
            return false;
        }
        if self.query_bool(names::CACHE_CHUNKS) {
            return true;
        }
        match self.query_int(names::SAVE_RADIUS) {
            Some(radius) if radius >= 0 => {
                i64::from(chunk.chebyshev_distance(observer_chunk)) <= radius
            }
            _ => true,
        }
    }

    /// Whether entities in the given chunk may be captured.
    pub fn can_save_entities(&self, chunk: ChunkPos) -> bool {
        self.allows(chunk, names::SAVE_ENTITIES)
    }

    /// Whether tile entities in the given chunk may be captured.
    pub fn can_save_tile_entities(&self, chunk: ChunkPos) -> bool {
        self.allows(chunk, names::SAVE_TILE_ENTITIES)
    }

    /// Whether container contents in the given chunk may be captured.
    /// Containers are tile entities first, so both grants must hold.
    pub fn can_save_containers(&self, chunk: ChunkPos) -> bool {
        self.can_save_tile_entities(chunk) && self.allows(chunk, names::SAVE_CONTAINERS)
    }

    /// Whether received map images may be captured.
    pub fn can_save_maps(&self) -> bool {
        self.query_bool(names::SAVE_MAPS)
    }

    /// Queue a user-issued capability change request. A request for a name
    /// already queued replaces its value but keeps its queue position.
    pub fn enqueue_request(&mut self, name: CapabilityName, value: CapabilityValue) {
        self.pending.insert(name, value);
    }

    /// The queued requests, in insertion order. Requests stay queued until
    /// [`mark_requests_sent`](Self::mark_requests_sent) confirms the encoded
    /// batch reached the transport.
    pub fn pending_requests(&self) -> Vec<(CapabilityName, CapabilityValue)> {
        self.pending
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .collect()
    }

    /// Clear the pending queue after the transport accepted the batch.
    /// Acknowledgment from the remote arrives separately, as a GRANT.
    pub fn mark_requests_sent(&mut self) {
        self.pending.clear();
    }

    /// Drop all state; used at session end.
    pub fn clear(&mut self) {
        let policy = self.policy;
        *self = Self::new(policy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant_bool(name: &str, value: bool) -> NegotiationEffect {
        NegotiationEffect::Grant {
            booleans: vec![(CapabilityName::from(name), value)],
            integers: vec![],
            entity_ranges: vec![],
        }
    }

    #[test]
    fn unknown_capability_resolves_through_policy() {
        let permissive = CapabilitySet::new(DefaultPolicy::Permissive);
        assert!(permissive.query_bool(names::SAVE_ENTITIES));

        let strict = CapabilitySet::new(DefaultPolicy::StrictDeny);
        assert!(!strict.query_bool(names::SAVE_ENTITIES));
    }

    #[test]
    fn denial_overrides_permissive_default() {
        let mut set = CapabilitySet::new(DefaultPolicy::Permissive);
        set.apply(grant_bool(names::SAVE_ENTITIES, false));
        assert!(!set.query_bool(names::SAVE_ENTITIES));
        // Unrelated capabilities keep the default.
        assert!(set.query_bool(names::SAVE_TILE_ENTITIES));
    }

    #[test]
    fn region_override_checked_before_global() {
        let mut set = CapabilitySet::new(DefaultPolicy::Permissive);
        set.apply(grant_bool(names::SAVE_TILE_ENTITIES, false));
        set.apply(NegotiationEffect::Overrides {
            entries: vec![RegionOverride {
                chunk: ChunkPos::new(2, 3),
                capability: CapabilityName::from(names::SAVE_TILE_ENTITIES),
                value: true,
            }],
            replace: false,
        });

        assert!(set.allows(ChunkPos::new(2, 3), names::SAVE_TILE_ENTITIES));
        assert!(!set.allows(ChunkPos::new(0, 0), names::SAVE_TILE_ENTITIES));
    }

    #[test]
    fn later_override_in_batch_supersedes_earlier() {
        let mut set = CapabilitySet::new(DefaultPolicy::Permissive);
        let chunk = ChunkPos::new(1, 1);
        set.apply(NegotiationEffect::Overrides {
            entries: vec![
                RegionOverride {
                    chunk,
                    capability: CapabilityName::from(names::SAVE_ENTITIES),
                    value: true,
                },
                RegionOverride {
                    chunk,
                    capability: CapabilityName::from(names::SAVE_ENTITIES),
                    value: false,
                },
            ],
            replace: false,
        });
        assert_eq!(set.region_override(chunk, names::SAVE_ENTITIES), Some(false));
    }

    #[test]
    fn save_chunk_respects_radius_and_cache() {
        let mut set = CapabilitySet::new(DefaultPolicy::Permissive);
        set.apply(NegotiationEffect::Grant {
            booleans: vec![(CapabilityName::from(names::CACHE_CHUNKS), false)],
            integers: vec![(CapabilityName::from(names::SAVE_RADIUS), 4)],
            entity_ranges: vec![],
        });

        let observer = ChunkPos::new(0, 0);
        assert!(set.can_save_chunk(ChunkPos::new(4, 0), observer));
        assert!(!set.can_save_chunk(ChunkPos::new(5, 0), observer));

        set.apply(grant_bool(names::CACHE_CHUNKS, true));
        assert!(set.can_save_chunk(ChunkPos::new(50, 50), observer));
    }

    #[test]
    fn containers_require_both_grants() {
        let mut set = CapabilitySet::new(DefaultPolicy::Permissive);
        let chunk = ChunkPos::new(0, 0);
        assert!(set.can_save_containers(chunk));

        set.apply(grant_bool(names::SAVE_TILE_ENTITIES, false));
        assert!(!set.can_save_containers(chunk));

        set.apply(grant_bool(names::SAVE_TILE_ENTITIES, true));
        set.apply(grant_bool(names::SAVE_CONTAINERS, false));
        assert!(!set.can_save_containers(chunk));
    }

    #[test]
    fn requests_stay_queued_until_confirmed() {
        let mut set = CapabilitySet::new(DefaultPolicy::Permissive);
        set.enqueue_request(
            CapabilityName::from(names::SAVE_RADIUS),
            CapabilityValue::Int(16),
        );
        set.enqueue_request(
            CapabilityName::from(names::SAVE_ENTITIES),
            CapabilityValue::Bool(true),
        );
        // Re-requesting replaces the value, keeps the position.
        set.enqueue_request(
            CapabilityName::from(names::SAVE_RADIUS),
            CapabilityValue::Int(32),
        );

        let pending = set.pending_requests();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].0.as_str(), names::SAVE_RADIUS);
        assert_eq!(pending[0].1, CapabilityValue::Int(32));

        // Draining does not remove; confirmation does.
        assert_eq!(set.pending_requests().len(), 2);
        set.mark_requests_sent();
        assert!(set.pending_requests().is_empty());
    }

    #[test]
    fn reset_forgets_everything_but_keeps_the_policy() {
        let mut set = CapabilitySet::new(DefaultPolicy::StrictDeny);
        set.apply(grant_bool(names::SAVE_ENTITIES, true));
        assert!(set.has_negotiated());

        set.apply(NegotiationEffect::Reset);
        assert!(!set.has_negotiated());
        assert!(!set.query_bool(names::SAVE_ENTITIES));
    }
}
