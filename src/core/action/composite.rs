//=========================================================================
// Delay & Composite Actions
//=========================================================================
//
//   Delay     → waits, does nothing
//   Sequence  → runs children one after another
//   Spawn     → runs children side by side, done when all are done
//
// Children are full `Action`s (own delay, loops and callbacks) and are
// rewound whenever the composite starts a new iteration.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;

//=== Internal Dependencies ===============================================

use super::action::{Action, ActionKind};
use crate::core::scene::ActorRef;

//=== Delay ===============================================================

#[derive(Debug, Clone, Copy)]
pub struct Delay {
    duration: f64,
    elapsed: f64,
}

impl Delay {
    pub fn new(seconds: f64) -> Self {
        Self {
            duration: seconds,
            elapsed: 0.0,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }
}

impl ActionKind for Delay {
    fn init(&mut self, _target: &ActorRef) {
        self.elapsed = 0.0;
    }

    fn update(&mut self, _target: &ActorRef, dt: f64) -> bool {
        self.elapsed += dt;
        self.elapsed >= self.duration
    }

    fn clone_kind(&self) -> Box<dyn ActionKind> {
        Box::new(Self::new(self.duration))
    }

    fn reverse_kind(&self) -> Option<Box<dyn ActionKind>> {
        Some(self.clone_kind())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

//=== Sequence ============================================================

pub struct Sequence {
    actions: Vec<Action>,
    index: usize,
}

impl Sequence {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions, index: 0 }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

impl ActionKind for Sequence {
    fn init(&mut self, _target: &ActorRef) {
        self.index = 0;
        for action in &self.actions {
            action.reset();
        }
    }

    fn update(&mut self, target: &ActorRef, dt: f64) -> bool {
        let mut dt = dt;
        while let Some(current) = self.actions.get(self.index) {
            current.step(target, dt);
            if !current.is_done() {
                return false;
            }
            // The next child starts right away so instant children chain
            // within a single frame.
            self.index += 1;
            dt = 0.0;
        }
        true
    }

    fn clone_kind(&self) -> Box<dyn ActionKind> {
        Box::new(Self::new(self.actions.clone()))
    }

    fn reverse_kind(&self) -> Option<Box<dyn ActionKind>> {
        let reversed = self
            .actions
            .iter()
            .rev()
            .map(Action::reverse)
            .collect::<Option<Vec<_>>>()?;
        Some(Box::new(Self::new(reversed)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

//=== Spawn ===============================================================

pub struct Spawn {
    actions: Vec<Action>,
}

impl Spawn {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

impl ActionKind for Spawn {
    fn init(&mut self, _target: &ActorRef) {
        for action in &self.actions {
            action.reset();
        }
    }

    fn update(&mut self, target: &ActorRef, dt: f64) -> bool {
        let mut all_done = true;
        for action in &self.actions {
            action.step(target, dt);
            all_done &= action.is_done();
        }
        all_done
    }

    fn clone_kind(&self) -> Box<dyn ActionKind> {
        Box::new(Self::new(self.actions.clone()))
    }

    fn reverse_kind(&self) -> Option<Box<dyn ActionKind>> {
        let reversed = self
            .actions
            .iter()
            .map(Action::reverse)
            .collect::<Option<Vec<_>>>()?;
        Some(Box::new(Self::new(reversed)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

//=== Constructors ========================================================

impl Action {
    pub fn delay(seconds: f64) -> Self {
        Action::new(Delay::new(seconds))
    }

    pub fn sequence(actions: Vec<Action>) -> Self {
        Action::new(Sequence::new(actions))
    }

    pub fn spawn(actions: Vec<Action>) -> Self {
        Action::new(Spawn::new(actions))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
