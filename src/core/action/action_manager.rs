//=========================================================================
// Action Manager
//=========================================================================
//
// Per-actor list of running actions.
//
// Stepping works on a snapshot so actions (and their callbacks) may add
// or stop actions on the same actor mid-pass. Newly added actions start
// on the next pass; stopped ones are swept afterwards.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::rc::Rc;

use log::trace;

//=== Internal Dependencies ===============================================

use super::action::{Action, ActionRef};
use crate::core::scene::ActorRef;

//=== ActionManager =======================================================

#[derive(Debug, Default)]
pub struct ActionManager {
    actions: Vec<ActionRef>,
}

impl ActionManager {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Registration -----------------------------------------------------

    pub fn add_action(&mut self, action: Action) -> ActionRef {
        self.add_action_ref(Rc::new(action))
    }

    /// Adds a shared action; adding the same action twice is a no-op.
    pub fn add_action_ref(&mut self, action: ActionRef) -> ActionRef {
        if !self.actions.iter().any(|a| Rc::ptr_eq(a, &action)) {
            self.actions.push(Rc::clone(&action));
        }
        action
    }

    /// First live action named `name`.
    pub fn get_action(&self, name: &str) -> Option<ActionRef> {
        self.actions
            .iter()
            .find(|a| !a.is_stopped() && a.name() == name)
            .cloned()
    }

    //--- Update -----------------------------------------------------------

    /// Steps every live action against `target`, then sweeps.
    pub fn update(&mut self, target: &ActorRef, dt: f64) {
        let snapshot = self.snapshot();
        Self::step_actions(&snapshot, target, dt);
        self.sweep();
    }

    /// Live actions at this instant.
    pub fn snapshot(&self) -> Vec<ActionRef> {
        self.actions
            .iter()
            .filter(|a| !a.is_stopped())
            .cloned()
            .collect()
    }

    pub fn step_actions(actions: &[ActionRef], target: &ActorRef, dt: f64) {
        for action in actions {
            action.step(target, dt);
        }
    }

    /// Drops stopped actions; returns how many were removed.
    pub fn sweep(&mut self) -> usize {
        let before = self.actions.len();
        self.actions.retain(|a| !a.is_stopped());
        let removed = before - self.actions.len();
        if removed > 0 {
            trace!(target: "action", "Swept {} finished action(s)", removed);
        }
        removed
    }

    //--- Named Batch Control ----------------------------------------------

    pub fn pause_action(&self, name: &str) {
        self.named(name).for_each(|a| a.pause());
    }

    pub fn resume_action(&self, name: &str) {
        self.named(name).for_each(|a| a.resume());
    }

    pub fn stop_action(&self, name: &str) {
        self.named(name).for_each(|a| a.stop());
    }

    pub fn pause_all_actions(&self) {
        self.actions.iter().for_each(|a| a.pause());
    }

    pub fn resume_all_actions(&self) {
        self.actions.iter().for_each(|a| a.resume());
    }

    pub fn stop_all_actions(&self) {
        self.actions.iter().for_each(|a| a.stop());
    }

    fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ActionRef> + 'a {
        self.actions.iter().filter(move |a| a.name() == name)
    }

    //--- Queries ----------------------------------------------------------

    pub fn actions(&self) -> &[ActionRef] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
