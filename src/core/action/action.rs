//=========================================================================
// Action
//=========================================================================
//
// A time-based behavior applied to one target actor.
//
// Lifecycle:
//   Init ──(delay > 0)──> Delayed ──> Running ──(last loop)──> Done ──> Stopped
//     └───────────────(no delay)──────────^
//
//   - pause is orthogonal to the state: a paused action is not stepped
//   - each completed iteration fires the loop-done callback; extra loops
//     re-init the kind (loops = -1 repeats forever)
//   - on Done: done callback, optional detach of the target, then Stopped
//   - stopped actions are swept by the owning ActionManager
//
// What the action *does* lives in its `ActionKind` (tweens, delay,
// composites). `Action` only owns timing, looping and callbacks.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use super::ease::Ease;
use crate::core::scene::ActorRef;

//=== Type Aliases ========================================================

pub type ActionRef = Rc<Action>;

/// Action callback; receives the action's target.
pub type ActionCallback = Box<dyn FnMut(&ActorRef)>;

/// Loop count meaning "repeat forever".
pub const LOOP_FOREVER: i32 = -1;

//=== ActionState =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Init,
    Delayed,
    Running,
    Done,
    Stopped,
}

//=== ActionKind ==========================================================

/// What an action does to its target.
pub trait ActionKind: Any {
    /// Called when an iteration starts (captures start values).
    fn init(&mut self, target: &ActorRef);

    /// Advances by `dt` seconds; returns `true` when the iteration is over.
    fn update(&mut self, target: &ActorRef, dt: f64) -> bool;

    /// Same parameters, fresh run-state.
    fn clone_kind(&self) -> Box<dyn ActionKind>;

    /// The inverse behavior, if one exists.
    fn reverse_kind(&self) -> Option<Box<dyn ActionKind>>;

    /// Sets the easing curve; ignored by kinds without one.
    fn set_ease(&mut self, _ease: Ease) {}

    fn as_any(&self) -> &dyn Any;
}

//=== Action ==============================================================

struct Runtime {
    delay: f64,
    delay_elapsed: f64,
    loops: i32,
    loops_done: i32,
    detach_target: bool,
}

impl Runtime {
    fn fresh(&self) -> Self {
        Self {
            delay: self.delay,
            delay_elapsed: 0.0,
            loops: self.loops,
            loops_done: 0,
            detach_target: self.detach_target,
        }
    }
}

pub struct Action {
    name: String,
    state: Cell<ActionState>,
    paused: Cell<bool>,
    kind: RefCell<Box<dyn ActionKind>>,
    runtime: RefCell<Runtime>,
    on_done: RefCell<Option<ActionCallback>>,
    on_loop_done: RefCell<Option<ActionCallback>>,
}

impl Action {
    //--- Construction -----------------------------------------------------

    pub fn new(kind: impl ActionKind) -> Self {
        Self::from_kind(Box::new(kind))
    }

    pub fn from_kind(kind: Box<dyn ActionKind>) -> Self {
        Self::from_runtime(
            String::new(),
            kind,
            Runtime {
                delay: 0.0,
                delay_elapsed: 0.0,
                loops: 0,
                loops_done: 0,
                detach_target: false,
            },
        )
    }

    fn from_runtime(name: String, kind: Box<dyn ActionKind>, runtime: Runtime) -> Self {
        Self {
            name,
            state: Cell::new(ActionState::Init),
            paused: Cell::new(false),
            kind: RefCell::new(kind),
            runtime: RefCell::new(runtime),
            on_done: RefCell::new(None),
            on_loop_done: RefCell::new(None),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Waits `seconds` before the first iteration starts.
    pub fn with_delay(self, seconds: f64) -> Self {
        self.runtime.borrow_mut().delay = seconds.max(0.0);
        self
    }

    /// Number of extra iterations (0 runs once, [`LOOP_FOREVER`] repeats).
    pub fn with_loops(self, loops: i32) -> Self {
        self.runtime.borrow_mut().loops = loops.max(LOOP_FOREVER);
        self
    }

    /// Detaches the target from its parent once the action is done.
    pub fn with_detach_target(self, detach: bool) -> Self {
        self.runtime.borrow_mut().detach_target = detach;
        self
    }

    pub fn with_ease(self, ease: Ease) -> Self {
        self.kind.borrow_mut().set_ease(ease);
        self
    }

    pub fn on_done<F: FnMut(&ActorRef) + 'static>(self, callback: F) -> Self {
        *self.on_done.borrow_mut() = Some(Box::new(callback));
        self
    }

    pub fn on_loop_done<F: FnMut(&ActorRef) + 'static>(self, callback: F) -> Self {
        *self.on_loop_done.borrow_mut() = Some(Box::new(callback));
        self
    }

    //--- Derivation -------------------------------------------------------

    /// Inverse action with fresh run-state, or `None` if the kind has no
    /// inverse. Callbacks are not carried over.
    pub fn reverse(&self) -> Option<Action> {
        let kind = self.kind.borrow().reverse_kind()?;
        Some(Self::from_runtime(self.name.clone(), kind, self.runtime.borrow().fresh()))
    }

    //--- Control ----------------------------------------------------------

    /// Stops the action; the manager sweeps it on its next pass.
    pub fn stop(&self) {
        self.state.set(ActionState::Stopped);
    }

    pub fn pause(&self) {
        self.paused.set(true);
    }

    pub fn resume(&self) {
        self.paused.set(false);
    }

    /// Rewinds to `Init` so the action runs again from the start.
    pub fn restart(&self) {
        self.state.set(ActionState::Init);
        self.paused.set(false);
        if let Ok(mut runtime) = self.runtime.try_borrow_mut() {
            runtime.delay_elapsed = 0.0;
            runtime.loops_done = 0;
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ActionState {
        self.state.get()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    pub fn is_running(&self) -> bool {
        self.state.get() == ActionState::Running
    }

    /// `true` once the action finished or was stopped.
    pub fn is_done(&self) -> bool {
        matches!(self.state.get(), ActionState::Done | ActionState::Stopped)
    }

    pub fn is_stopped(&self) -> bool {
        self.state.get() == ActionState::Stopped
    }

    pub fn loops(&self) -> i32 {
        self.runtime.borrow().loops
    }

    pub fn loops_done(&self) -> i32 {
        self.runtime.borrow().loops_done
    }

    /// Runs `f` on the kind if it is a `K`.
    pub fn with_kind<K: ActionKind, R>(&self, f: impl FnOnce(&K) -> R) -> Option<R> {
        let kind = self.kind.borrow();
        kind.as_any().downcast_ref::<K>().map(f)
    }

    //--- Stepping ---------------------------------------------------------

    /// Advances the action by `dt` seconds against `target`.
    pub fn step(&self, target: &ActorRef, dt: f64) {
        if self.paused.get() || self.is_done() {
            return;
        }

        let mut dt = dt;

        if self.state.get() == ActionState::Init {
            let delayed = {
                let mut runtime = self.runtime.borrow_mut();
                runtime.delay_elapsed = 0.0;
                runtime.loops_done = 0;
                runtime.delay > 0.0
            };
            if delayed {
                self.state.set(ActionState::Delayed);
            } else {
                self.kind.borrow_mut().init(target);
                self.state.set(ActionState::Running);
            }
        }

        if self.state.get() == ActionState::Delayed {
            let overshoot = {
                let mut runtime = self.runtime.borrow_mut();
                runtime.delay_elapsed += dt;
                runtime.delay_elapsed - runtime.delay
            };
            if overshoot < 0.0 {
                return;
            }
            dt = overshoot;
            self.kind.borrow_mut().init(target);
            self.state.set(ActionState::Running);
        }

        if self.state.get() == ActionState::Running {
            // Only the kind is borrowed while it runs, so user code may
            // still query and control this action.
            let finished = self.kind.borrow_mut().update(target, dt);
            if finished {
                self.complete_iteration(target);
            }
        }

        if self.state.get() == ActionState::Done {
            self.finish(target);
        }
    }

    fn complete_iteration(&self, target: &ActorRef) {
        let more = {
            let mut runtime = self.runtime.borrow_mut();
            runtime.loops_done += 1;
            runtime.loops < 0 || runtime.loops_done <= runtime.loops
        };

        Self::fire(&self.on_loop_done, target);

        // The callback may have stopped or restarted the action.
        if self.state.get() != ActionState::Running {
            return;
        }

        if more {
            self.kind.borrow_mut().init(target);
        } else {
            self.state.set(ActionState::Done);
        }
    }

    fn finish(&self, target: &ActorRef) {
        Self::fire(&self.on_done, target);

        if self.runtime.borrow().detach_target {
            target.remove_from_parent();
        }

        if self.state.get() == ActionState::Done {
            self.state.set(ActionState::Stopped);
        }
    }

    fn fire(slot: &RefCell<Option<ActionCallback>>, target: &ActorRef) {
        let callback = slot.borrow_mut().take();
        if let Some(mut callback) = callback {
            callback(target);
            let mut slot = slot.borrow_mut();
            if slot.is_none() {
                *slot = Some(callback);
            }
        }
    }

    /// Rewinds for reuse inside a composite.
    pub(crate) fn reset(&self) {
        self.state.set(ActionState::Init);
        let mut runtime = self.runtime.borrow_mut();
        runtime.delay_elapsed = 0.0;
        runtime.loops_done = 0;
    }
}

//--- Trait Implementations -----------------------------------------------

/// Same parameters and name, fresh run-state, no callbacks.
impl Clone for Action {
    fn clone(&self) -> Self {
        let kind = self.kind.borrow().clone_kind();
        Self::from_runtime(self.name.clone(), kind, self.runtime.borrow().fresh())
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("state", &self.state.get())
            .field("paused", &self.paused.get())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
