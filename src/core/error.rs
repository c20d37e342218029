//=========================================================================
// Error Types
//=========================================================================
//
// Error taxonomy shared by the scene graph and its collaborators.
//
//   SceneError     → tree invariant violations (rejected, tree untouched)
//   ResourceError  → external loader failures (object stays "not loaded")
//   RenderError    → renderer/device failures reported by `end_draw`
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

//=== SceneError ==========================================================

/// Rejected tree mutation.
///
/// Returned by [`ActorRef::add_child`](crate::core::scene::ActorRef::add_child)
/// and friends. The tree is never modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The actor to be added is already attached to a parent.
    AlreadyHasParent,

    /// Attaching would make an actor its own ancestor.
    Cycle,

    /// The actor is not a child of the node it was removed from.
    NotAChild,
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyHasParent => write!(f, "The actor to be added already has a parent"),
            Self::Cycle => write!(f, "An actor cannot be its own ancestor"),
            Self::NotAChild => write!(f, "The actor is not a child of this node"),
        }
    }
}

impl std::error::Error for SceneError {}

//=== ResourceError =======================================================

/// Failure reported by an external resource loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// No file or embedded resource with that identifier.
    NotFound(String),

    /// The bytes were found but could not be decoded.
    Decode(String),

    /// Underlying I/O failure.
    Io(String),

    /// The worker delivering the resource went away.
    Disconnected,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "Resource not found: {}", id),
            Self::Decode(msg) => write!(f, "Resource decode failed: {}", msg),
            Self::Io(msg) => write!(f, "Resource I/O error: {}", msg),
            Self::Disconnected => write!(f, "Resource worker disconnected"),
        }
    }
}

impl std::error::Error for ResourceError {}

//=== RenderError =========================================================

/// Failure reported by a renderer at the end of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The graphics device was lost and must be recreated by the host.
    DeviceLost,

    /// Any other backend failure.
    Backend(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceLost => write!(f, "Graphics device lost"),
            Self::Backend(msg) => write!(f, "Renderer error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

//=========================================================================
// Unit Tests
//=========================================================================
