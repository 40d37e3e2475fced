//! Externally synchronized handle to the capability store
//!
//! Inbound protocol decoding may run on the transport's delivery thread;
//! effects reach the store through this single mutex-guarded path. The
//! capture state machine reads the current snapshot at decision time and
//! never holds the lock across a trigger.

use crate::names::{CapabilityName, CapabilityValue};
use crate::store::{CapabilitySet, DefaultPolicy, NegotiationEffect};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable handle to one session's capability set.
#[derive(Clone)]
pub struct SharedCapabilities {
    inner: Arc<Mutex<CapabilitySet>>,
}

impl SharedCapabilities {
    /// Create an empty store with the given default policy.
    pub fn new(policy: DefaultPolicy) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CapabilitySet::new(policy))),
        }
    }

    /// Apply one effect atomically.
    pub fn apply(&self, effect: NegotiationEffect) {
        tracing::debug!(?effect, "applying negotiation effect");
        self.inner.lock().apply(effect);
    }

    /// Read from the current snapshot. The closure must not re-enter the
    /// store.
    pub fn read<R>(&self, f: impl FnOnce(&CapabilitySet) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Queue a user-issued capability change request.
    pub fn enqueue_request(&self, name: CapabilityName, value: CapabilityValue) {
        self.inner.lock().enqueue_request(name, value);
    }

    /// The queued requests, in insertion order.
    pub fn pending_requests(&self) -> Vec<(CapabilityName, CapabilityValue)> {
        self.inner.lock().pending_requests()
    }

    /// Clear the pending queue after the transport accepted the batch.
    pub fn mark_requests_sent(&self) {
        self.inner.lock().mark_requests_sent();
    }

    /// Drop all state; used at session end.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}
