//=========================================================================
// Aetheric Stage: Library Root
//
// This crate defines the public API surface of the Aetheric Stage engine,
// a 2D scene graph with lazy transforms, opacity cascades, event
// dispatch, timers and actions layered over a host-provided renderer.
//
// Responsibilities:
// - Expose the engine facade (`Engine`, `EngineBuilder`)
// - Expose the scene-graph building blocks under `core`
// - Leave windowing, decoding and GPU work to the host behind traits
//
// Typical usage:
// ```ignore
// use aetheric_stage::prelude::*;
//
// let mut engine = EngineBuilder::<Screen>::new().build().init(|systems| {
//     systems.director.register_stage(Screen::Title, Stage::new());
//     systems.director.request(StageTransition::Push(Screen::Title));
// });
// engine.tick(1.0 / 60.0, &mut renderer);
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the scene graph and its runtime systems. Most hosts only
// need the prelude plus the `Renderer` trait.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `engine` defines the main entry point and the tick loop.
//
mod engine;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder};
