//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_stage::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine core
pub use crate::engine::{Engine, EngineBuilder};
pub use crate::core::EngineSystems;

// Platform bridge
pub use crate::core::platform_bridge::{PlatformEvent, TickControl};

// Scene graph
pub use crate::core::scene::{
    ActorRef, Button, ButtonStatus, ShapeVisual, Sprite, Stage, StageDelegate, StageKey,
    StageTransition, Visual,
};

// Actions and timers
pub use crate::core::action::{Action, ActionRef, Ease, LOOP_FOREVER};
pub use crate::core::task::{Task, TaskRef, INFINITE};

// Events
pub use crate::core::event::{Event, EventKind, EventType, InputEvent, KeyCode, Modifiers, MouseButton};

// Rendering and resources
pub use crate::core::render::{Color, Frame, FrameSequence, Renderer, Resource, ResourceLoader, Texture};
pub use crate::core::object::Shared;

// Errors
pub use crate::core::{RenderError, ResourceError, SceneError};
