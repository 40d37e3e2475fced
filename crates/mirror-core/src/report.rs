//! User-facing capture messages
//!
//! Every trigger handler converts its outcome into a [`Report`] so the host
//! can surface it (chat line, overlay, log). Kinds are individually
//! suppressible; suppression is the reporter's concern, the core always
//! emits.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Category of a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageKind {
    /// General informational messages.
    Info,
    /// A chunk was flushed, or explicitly not flushed.
    ChunkUnloaded,
    /// A container close was captured.
    GuiClosedInfo,
    /// A container close partially failed or was not recognized.
    GuiClosedWarning,
    /// An entity removal decision.
    RemoveEntity,
    /// A block event was translated into a tile record.
    BlockEvent,
    /// A map image was captured.
    MapSaved,
    /// A non-fatal error worth showing to the user.
    Error,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageKind::Info => "info",
            MessageKind::ChunkUnloaded => "chunk-unloaded",
            MessageKind::GuiClosedInfo => "gui-closed-info",
            MessageKind::GuiClosedWarning => "gui-closed-warning",
            MessageKind::RemoveEntity => "remove-entity",
            MessageKind::BlockEvent => "block-event",
            MessageKind::MapSaved => "map-saved",
            MessageKind::Error => "error",
        };
        f.write_str(name)
    }
}

/// A single user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub kind: MessageKind,
    pub message: String,
}

impl Report {
    pub fn new(kind: MessageKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Where user-facing messages go. Implemented by the host.
pub trait Reporter {
    fn report(&self, report: Report);
}

impl<R: Reporter + ?Sized> Reporter for std::sync::Arc<R> {
    fn report(&self, report: Report) {
        (**self).report(report)
    }
}

/// Per-kind visibility toggles, deserialized from the host's settings.
/// Suppression happens at the reporter, never at the emitting site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Master switch for kinds without an explicit toggle.
    pub enabled: bool,
    /// Kinds toggled individually.
    pub kinds: BTreeMap<MessageKind, bool>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            kinds: BTreeMap::new(),
        }
    }
}

impl ReportConfig {
    /// Whether messages of this kind are shown.
    pub fn shows(&self, kind: MessageKind) -> bool {
        self.kinds.get(&kind).copied().unwrap_or(self.enabled)
    }
}

/// Reporter that applies a [`ReportConfig`] before forwarding.
pub struct FilteredReporter<R> {
    config: ReportConfig,
    inner: R,
}

impl<R: Reporter> FilteredReporter<R> {
    pub fn new(config: ReportConfig, inner: R) -> Self {
        Self { config, inner }
    }
}

impl<R: Reporter> Reporter for FilteredReporter<R> {
    fn report(&self, report: Report) {
        if self.config.shows(report.kind) {
            self.inner.report(report);
        } else {
            tracing::trace!(kind = %report.kind, "report suppressed");
        }
    }
}

/// Reporter that drops everything after a trace log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, report: Report) {
        tracing::trace!(kind = %report.kind, message = %report.message, "report dropped");
    }
}

/// In-memory reporter used by tests across the workspace.
pub mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// Reporter that records every message it receives.
    #[derive(Default)]
    pub struct MemoryReporter {
        reports: Mutex<Vec<Report>>,
    }

    impl MemoryReporter {
        pub fn new() -> Self {
            Self::default()
        }

        /// All reports received so far, in order.
        pub fn reports(&self) -> Vec<Report> {
            self.reports.lock().clone()
        }

        /// Reports of the given kind only.
        pub fn of_kind(&self, kind: MessageKind) -> Vec<Report> {
            self.reports
                .lock()
                .iter()
                .filter(|r| r.kind == kind)
                .cloned()
                .collect()
        }
    }

    impl Reporter for MemoryReporter {
        fn report(&self, report: Report) {
            self.reports.lock().push(report);
        }
    }
}
