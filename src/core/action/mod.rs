//=========================================================================
// Action System
//=========================================================================
//
// Time-based behaviors attached to actors.
//
//   action          → Action (timing, loops, callbacks) + ActionKind trait
//   tween           → ActionTween<T: Tween> and the transform/opacity tweens
//   animation       → sprite frame-sequence tween
//   composite       → Delay, Sequence, Spawn
//   ease            → easing curves
//   action_manager  → per-actor list, named batch control
//
//=========================================================================

pub mod action;
pub mod action_manager;
pub mod animation;
pub mod composite;
pub mod ease;
pub mod tween;

pub use action::{Action, ActionCallback, ActionKind, ActionRef, ActionState, LOOP_FOREVER};
pub use action_manager::ActionManager;
pub use animation::Animation;
pub use composite::{Delay, Sequence, Spawn};
pub use ease::Ease;
pub use tween::{
    ActionTween, CustomTween, FadeTo, MoveBy, MoveTo, RotateBy, RotateTo, ScaleBy, ScaleTo,
    SkewBy, Tween,
};
