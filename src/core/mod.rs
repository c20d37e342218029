//=========================================================================
// Core Systems
//=========================================================================
//
// Scene-graph runtime, leaf to root:
//
//   object           → Shared<T> reference counting + deferred release pool
//   task             → timers and per-actor task managers
//   event            → event model and listener chains
//   render           → renderer contract, textures, background loading
//   action           → tweens, composites, easing, frame animation
//   scene            → actors, visuals, buttons, stages, director
//   platform_bridge  → host → engine event inbox
//   systems          → per-engine container driven by `Engine::tick`
//
//=========================================================================

//=== Module Declarations =================================================

pub mod action;
pub mod error;
pub mod event;
pub mod object;
pub mod platform_bridge;
pub mod render;
pub mod scene;
pub mod systems;
pub mod task;

//=== Public API ==========================================================

pub use error::{RenderError, ResourceError, SceneError};
pub use systems::EngineSystems;
