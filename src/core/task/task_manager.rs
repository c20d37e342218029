//=========================================================================
// Task Manager
//=========================================================================
//
// Owns a list of tasks and drives them each frame.
//
// Flow:
//   update_all(dt) → snapshot (not stopped) → Task::update → sweep stopped
//
// The snapshot lets callbacks add or stop tasks while the list is being
// walked. Actors split the two halves (`snapshot` / `sweep`) so no borrow
// of the actor is held while callbacks run.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::rc::Rc;

use log::trace;

//=== Internal Dependencies ===============================================

use super::task::TaskRef;

//=== TaskManager =========================================================

/// Per-owner list of [`Task`](super::Task)s with named batch control.
#[derive(Debug, Default)]
pub struct TaskManager {
    tasks: Vec<TaskRef>,
}

impl TaskManager {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self::default()
    }

    //--- Registration -----------------------------------------------------

    /// Adds and starts a task.
    ///
    /// Adding a task that is already present only restarts it (elapsed time
    /// reset); it is never listed twice.
    pub fn add_task(&mut self, task: TaskRef) -> TaskRef {
        if !self.tasks.iter().any(|t| Rc::ptr_eq(t, &task)) {
            self.tasks.push(Rc::clone(&task));
        }
        task.start();
        task
    }

    //--- Update -----------------------------------------------------------

    /// Updates every task and removes the stopped ones.
    pub fn update_all(&mut self, dt: f64) {
        if self.tasks.is_empty() {
            return;
        }

        let current = self.snapshot();
        Self::update_tasks(&current, dt);
        self.sweep();
    }

    /// Tasks that are not stopped, in insertion order.
    pub fn snapshot(&self) -> Vec<TaskRef> {
        self.tasks
            .iter()
            .filter(|task| !task.is_stopped())
            .cloned()
            .collect()
    }

    /// Updates a previously taken snapshot.
    pub fn update_tasks(tasks: &[TaskRef], dt: f64) {
        for task in tasks {
            task.update(dt);
        }
    }

    /// Removes stopped tasks; returns how many were removed.
    pub fn sweep(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.is_stopped());
        let removed = before - self.tasks.len();
        if removed > 0 {
            trace!(target: "task", "Swept {} stopped tasks", removed);
        }
        removed
    }

    //--- Named Batch Operations -------------------------------------------

    pub fn start_tasks(&self, name: &str) {
        self.named(name).for_each(|task| task.start());
    }

    pub fn stop_tasks(&self, name: &str) {
        self.named(name).for_each(|task| task.stop());
    }

    pub fn pause_tasks(&self, name: &str) {
        self.named(name).for_each(|task| task.pause());
    }

    pub fn resume_tasks(&self, name: &str) {
        self.named(name).for_each(|task| task.resume());
    }

    /// Removes all tasks with this name immediately.
    pub fn remove_tasks(&mut self, name: &str) {
        self.tasks.retain(|task| {
            let keep = task.name() != name;
            if !keep {
                task.stop();
            }
            keep
        });
    }

    pub fn start_all_tasks(&self) {
        self.tasks.iter().for_each(|task| task.start());
    }

    pub fn stop_all_tasks(&self) {
        self.tasks.iter().for_each(|task| task.stop());
    }

    pub fn pause_all_tasks(&self) {
        self.tasks.iter().for_each(|task| task.pause());
    }

    pub fn resume_all_tasks(&self) {
        self.tasks.iter().for_each(|task| task.resume());
    }

    pub fn remove_all_tasks(&mut self) {
        self.tasks.drain(..).for_each(|task| task.stop());
    }

    //--- Query API --------------------------------------------------------

    /// First task with this name.
    pub fn find(&self, name: &str) -> Option<TaskRef> {
        self.named(name).next().cloned()
    }

    pub fn tasks(&self) -> &[TaskRef] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    //--- Internal Helpers -------------------------------------------------

    fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TaskRef> + 'a {
        self.tasks.iter().filter(move |task| task.name() == name)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
