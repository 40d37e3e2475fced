//! Capture extensions
//!
//! Fallback handlers for container closes the core dispatch does not
//! recognize. Registered as an explicit ordered list at session start and
//! consulted first-match-wins; only if none claims the close is the
//! unhandled warning reported.

use crate::container::ContainerView;
use crate::focus::CaptureFocus;

/// One registered fallback handler.
pub trait CaptureExtension {
    /// Short identifier used in diagnostics.
    fn id(&self) -> &str;

    /// Attempt to claim an unhandled container close. Returns true when the
    /// extension captured (or deliberately swallowed) it.
    fn on_container_unclaimed(&self, focus: &CaptureFocus, view: &ContainerView) -> bool;
}
