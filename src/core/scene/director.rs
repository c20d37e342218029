//=========================================================================
// Director
//=========================================================================
//
// Manages stage registration, stack operations, and lifecycle.
//
// Stages are stored in a HashMap by key and referenced via a stack of
// keys, so a stage keeps its actor tree between activations.
//
// Transitions are requested through a cloneable `TransitionSender` (a
// crossbeam channel) from anywhere, including actor callbacks in the
// middle of an update, and applied by `process_transitions()` at the
// tick boundary.
//
// Active stages:
//   stack top-down until (and including) the first opaque stage
//   update / render → bottom to top
//   dispatch        → top to bottom
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::stage::Stage;
use crate::core::event::Event;
use crate::core::render::Renderer;

//=== Stage Transition ====================================================

/// Stage stack operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageTransition<K: StageKey> {
    /// Adds a stage to the top of the stack.
    Push(K),

    /// Removes a specific stage from the stack.
    Remove(K),

    /// Replaces a stage in place with another one.
    Replace(K, K),

    /// Clears the whole stack.
    Clear,

    /// No transition occurs.
    Empty,
}

impl<K: StageKey> Default for StageTransition<K> {
    fn default() -> Self {
        Self::Empty
    }
}

//=== Stage Key Trait =====================================================

/// Marker trait for stage identifiers, usually a game-specific enum.
pub trait StageKey: Clone + Copy + Eq + Hash + Debug + Send + 'static {}

//=== Transition Sender ===================================================

/// Cloneable handle for requesting stage transitions.
#[derive(Debug, Clone)]
pub struct TransitionSender<K: StageKey> {
    tx: Sender<StageTransition<K>>,
}

impl<K: StageKey> TransitionSender<K> {
    /// Queues `transition` for the next tick boundary.
    ///
    /// Returns `false` if the director is gone.
    pub fn send(&self, transition: StageTransition<K>) -> bool {
        if self.tx.send(transition).is_err() {
            warn!(target: "scene::director", "Director dropped, transition {:?} discarded", transition);
            return false;
        }
        true
    }

    pub fn push(&self, key: K) -> bool {
        self.send(StageTransition::Push(key))
    }

    pub fn remove(&self, key: K) -> bool {
        self.send(StageTransition::Remove(key))
    }

    pub fn replace(&self, old_key: K, new_key: K) -> bool {
        self.send(StageTransition::Replace(old_key, new_key))
    }

    pub fn clear(&self) -> bool {
        self.send(StageTransition::Clear)
    }
}

//=== Director ============================================================

pub struct Director<K: StageKey> {
    stages: HashMap<K, Stage>,
    stack: Vec<K>,
    tx: Sender<StageTransition<K>>,
    rx: Receiver<StageTransition<K>>,
}

impl<K: StageKey> Director<K> {
    //--- Construction -----------------------------------------------------

    /// Creates a director with no stages and an empty stack.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            stages: HashMap::new(),
            stack: Vec::new(),
            tx,
            rx,
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers a stage; it must be registered before being pushed.
    pub fn register_stage(&mut self, key: K, stage: Stage) {
        if self.stages.insert(key, stage).is_some() {
            warn!(target: "scene::director", "Stage {:?} was already registered and has been replaced", key);
        }
    }

    pub fn stage(&self, key: K) -> Option<&Stage> {
        self.stages.get(&key)
    }

    pub fn stage_mut(&mut self, key: K) -> Option<&mut Stage> {
        self.stages.get_mut(&key)
    }

    //--- Stack Queries ----------------------------------------------------

    pub fn stack(&self) -> &[K] {
        &self.stack
    }

    /// Topmost stage key.
    pub fn current(&self) -> Option<K> {
        self.stack.last().copied()
    }

    /// Handle for queueing transitions from callbacks.
    pub fn transitions(&self) -> TransitionSender<K> {
        TransitionSender { tx: self.tx.clone() }
    }

    /// Queues a transition for the next tick boundary.
    pub fn request(&self, transition: StageTransition<K>) {
        // The director owns the receiver, so this cannot fail.
        let _ = self.tx.send(transition);
    }

    /// Active stages, bottom to top.
    pub fn active_stages(&self) -> Vec<K> {
        let mut active = Vec::new();

        for &key in self.stack.iter().rev() {
            active.insert(0, key);

            if let Some(stage) = self.stages.get(&key) {
                if !stage.is_transparent() {
                    break;
                }
            }
        }

        active
    }

    //--- Frame ------------------------------------------------------------

    /// Updates active stages, bottom to top.
    pub fn update(&mut self, dt: f64) {
        for key in self.active_stages() {
            if let Some(stage) = self.stages.get(&key) {
                stage.update(dt);
            }
        }
    }

    /// Renders active stages, bottom to top.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        for key in self.active_stages() {
            if let Some(stage) = self.stages.get(&key) {
                stage.render(renderer);
            }
        }
    }

    /// Dispatches `event` through active stages, top to bottom.
    ///
    /// A stage never "consumes" an event: lower stages still see it, but a
    /// target claimed above stays claimed.
    pub fn dispatch(&self, event: &mut Event) {
        for key in self.active_stages().into_iter().rev() {
            if let Some(stage) = self.stages.get(&key) {
                stage.dispatch(event);
            }
        }
    }

    //--- Transition Processing --------------------------------------------

    /// Applies every queued transition in FIFO order.
    ///
    /// Called at the tick boundary, after stage updates. Returns the number
    /// of transitions applied (including skipped ones).
    pub fn process_transitions(&mut self) -> usize {
        let mut processed = 0;

        while let Ok(transition) = self.rx.try_recv() {
            processed += 1;
            self.apply(transition);
        }

        processed
    }

    /// Exits every stacked stage (engine shutdown).
    pub fn shutdown(&mut self) {
        self.clear_stack();
        while self.rx.try_recv().is_ok() {}
    }

    //--- Internal Helpers -------------------------------------------------

    /// Edits the stack for one transition, then runs the exit hook of the
    /// stage leaving and the enter hook of the stage arriving.
    fn apply(&mut self, transition: StageTransition<K>) {
        let handover = match transition {
            StageTransition::Push(key) => self.admit(key).map(|()| {
                self.stack.push(key);
                (None, Some(key))
            }),
            StageTransition::Remove(key) => self.slot_of(key).map(|slot| {
                self.stack.remove(slot);
                (Some(key), None)
            }),
            StageTransition::Replace(old_key, new_key) => self.slot_of(old_key).and_then(|slot| {
                self.admit(new_key)?;
                self.stack[slot] = new_key;
                Ok((Some(old_key), Some(new_key)))
            }),
            StageTransition::Clear => {
                self.clear_stack();
                return;
            }
            StageTransition::Empty => return,
        };

        match handover {
            Ok((leaving, arriving)) => {
                debug!(target: "scene::director", "{:?} applied, stack is now {:?}", transition, self.stack);
                if let Some(stage) = leaving.and_then(|key| self.stages.get_mut(&key)) {
                    stage.exit();
                }
                if let Some(stage) = arriving.and_then(|key| self.stages.get_mut(&key)) {
                    stage.enter();
                }
            }
            Err(Skipped::NotStacked(key)) => {
                debug!(target: "scene::director", "{:?} skipped: stage {:?} is not stacked", transition, key);
            }
            Err(skipped) => {
                warn!(target: "scene::director", "{:?} skipped: {:?}", transition, skipped);
            }
        }
    }

    /// A stage may join the stack once, and only if it is registered.
    fn admit(&self, key: K) -> Result<(), Skipped<K>> {
        if self.stack.contains(&key) {
            Err(Skipped::AlreadyStacked(key))
        } else if !self.stages.contains_key(&key) {
            Err(Skipped::Unregistered(key))
        } else {
            Ok(())
        }
    }

    fn slot_of(&self, key: K) -> Result<usize, Skipped<K>> {
        self.stack
            .iter()
            .position(|&stacked| stacked == key)
            .ok_or(Skipped::NotStacked(key))
    }

    /// Exits stacked stages from the top down.
    fn clear_stack(&mut self) {
        if self.stack.is_empty() {
            return;
        }
        debug!(target: "scene::director", "Clearing stack {:?}", self.stack);

        for key in std::mem::take(&mut self.stack).into_iter().rev() {
            if let Some(stage) = self.stages.get_mut(&key) {
                stage.exit();
            }
        }
    }
}

/// Reason a queued transition left the stack untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skipped<K> {
    Unregistered(K),
    AlreadyStacked(K),
    NotStacked(K),
}

impl<K: StageKey> Default for Director<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StageKey> std::fmt::Debug for Director<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Director")
            .field("stages", &self.stages.len())
            .field("stack", &self.stack)
            .field("pending", &self.rx.len())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
