//=========================================================================
// Scene System
//=========================================================================
//
// The actor tree and the stage stack that shows it.
//
// Architecture:
//   Director<K>
//     ├─ stages: HashMap<K, Stage>
//     │            └─ root: ActorRef ─> children ─> ...
//     └─ stack: Vec<K>
//
// Flow:
//   dispatch(event) → active stages top-down → ActorRef::dispatch()
//   update(dt)      → active stages bottom-up → ActorRef::update()
//   render(r)       → active stages bottom-up → ActorRef::render()
//
//=========================================================================

//=== Module Declarations =================================================

pub mod actor;
pub mod button;
pub mod director;
pub mod stage;
pub mod transform;
pub mod visual;

//=== Public API ==========================================================

pub use actor::{ActorNode, ActorRef, UpdateCallback, WeakActor};
pub use button::{Button, ButtonCallback, ButtonRef, ButtonStatus, BUTTON_LISTENER};
pub use director::{Director, StageKey, StageTransition, TransitionSender};
pub use stage::{Stage, StageDelegate};
pub use transform::Transform;
pub use visual::{ShapeVisual, Sprite, Visual};
