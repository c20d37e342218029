//=========================================================================
// Event System
//=========================================================================
//
// Event model and per-actor listener chains.
//
//   event     → Event / EventKind / EventType, input identifiers
//   listener  → EventListener + EventDispatcher (named batch control)
//
//=========================================================================

pub mod event;
pub mod listener;

pub use event::{Event, EventKind, EventType, InputEvent, KeyCode, Modifiers, MouseButton};
pub use listener::{EventDispatcher, EventListener, ListenerCallback, ListenerRef};
