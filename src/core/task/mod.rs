//=========================================================================
// Task System
//=========================================================================
//
// Delayed and repeating callbacks, owned by actors or by the engine.
//
//=========================================================================

mod task;
mod task_manager;

pub use task::{Task, TaskCallback, TaskRef, TaskState, INFINITE};
pub use task_manager::TaskManager;
