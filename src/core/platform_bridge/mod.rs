//=========================================================================
// Platform Bridge
//=========================================================================
//
// Bridges the host (window backend, test harness) with the engine.
//
// Hosts only see the `Send` side of the contract: they push
// `PlatformEvent`s through the sender handed out by the engine. The
// collector on the engine thread turns them into tree events.
//
// Components:
// - `interface`: the message type (the contract)
// - `event_collector`: engine-side bounded draining
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Public API ==========================================================

pub use event_collector::TickControl;
pub use interface::PlatformEvent;

//=== Internal API ========================================================

pub(crate) use event_collector::EventCollector;
