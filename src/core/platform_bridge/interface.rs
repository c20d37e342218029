//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Host-to-core interface types.
//
// Defines the contract between whatever produces input (a window backend,
// a test harness, a replay file) and the thread that owns the actor tree.
// Everything crossing this boundary is `Send`.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::event::InputEvent;

//=== PlatformEvent =======================================================

/// Messages sent from the host to the engine inbox.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    /// Input events in arrival order.
    Events(Vec<InputEvent>),

    /// Stop the engine at the next tick boundary.
    Quit,
}

impl PlatformEvent {
    /// Wraps a single input event.
    pub fn single(event: impl Into<InputEvent>) -> Self {
        Self::Events(vec![event.into()])
    }
}

impl From<InputEvent> for PlatformEvent {
    fn from(event: InputEvent) -> Self {
        Self::Events(vec![event])
    }
}
