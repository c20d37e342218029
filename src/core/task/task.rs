//=========================================================================
// Task
//=========================================================================
//
// A named, repeating, delayed callback.
//
// State machine:
//   Idle ──start()──> Running ──total reached / stop()──> Stopped
//                       ↕ pause()/resume()
//
// Tasks are shared as `Rc<Task>` between their owner and whoever wants to
// control them later; all mutable state lives in `Cell`s so callbacks can
// stop or pause their own task while it is firing.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

//=== Type Aliases ========================================================

/// Shared handle to a task.
pub type TaskRef = Rc<Task>;

/// Callback invoked each time a task fires.
pub type TaskCallback = Box<dyn FnMut(&Task)>;

/// Total count meaning "fire forever".
pub const INFINITE: i32 = -1;

//=== TaskState ===========================================================

/// Lifecycle state of a [`Task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Created, not yet started.
    Idle,

    /// Accumulating time and firing.
    Running,

    /// Finished or stopped; the owning manager removes it.
    Stopped,
}

//=== Task ================================================================

/// Timer that fires a callback after a delay, a fixed or infinite number
/// of times.
///
/// A zero delay fires once per update. A non-zero delay fires once for each
/// full delay contained in the accumulated time, so a large step can fire
/// several times. A total of `0` stops the task without ever firing.
///
/// ```
/// use aetheric_stage::core::task::Task;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let fired = Rc::new(Cell::new(0));
/// let counter = Rc::clone(&fired);
/// let task = Task::new("tick", 0.5, 3, move |_| counter.set(counter.get() + 1));
///
/// task.start();
/// task.update(1.2);
/// assert_eq!(fired.get(), 2);
/// ```
pub struct Task {
    name: String,
    callback: RefCell<Option<TaskCallback>>,
    delay: Cell<f64>,
    total_times: Cell<i32>,
    run_times: Cell<i32>,
    elapsed: Cell<f64>,
    state: Cell<TaskState>,
    paused: Cell<bool>,
}

impl Task {
    //--- Construction -----------------------------------------------------

    /// Creates an idle task.
    ///
    /// `delay` is in seconds; `total_times` is the number of invocations
    /// (`INFINITE` for no limit).
    pub fn new<F>(name: impl Into<String>, delay: f64, total_times: i32, callback: F) -> TaskRef
    where
        F: FnMut(&Task) + 'static,
    {
        Rc::new(Self {
            name: name.into(),
            callback: RefCell::new(Some(Box::new(callback))),
            delay: Cell::new(delay.max(0.0)),
            total_times: Cell::new(total_times),
            run_times: Cell::new(0),
            elapsed: Cell::new(0.0),
            state: Cell::new(TaskState::Idle),
            paused: Cell::new(false),
        })
    }

    /// Task that fires once per update, forever.
    pub fn every_frame<F>(name: impl Into<String>, callback: F) -> TaskRef
    where
        F: FnMut(&Task) + 'static,
    {
        Self::new(name, 0.0, INFINITE, callback)
    }

    /// Task that fires once after `delay` seconds.
    pub fn once<F>(name: impl Into<String>, delay: f64, callback: F) -> TaskRef
    where
        F: FnMut(&Task) + 'static,
    {
        Self::new(name, delay, 1, callback)
    }

    //--- Control ----------------------------------------------------------

    /// Resets the elapsed accumulator and starts running.
    ///
    /// Revives a task that was stopped but not yet removed by its manager.
    pub fn start(&self) {
        self.elapsed.set(0.0);
        self.paused.set(false);
        self.state.set(TaskState::Running);
    }

    /// Stops the task. Its manager removes it on the next sweep.
    pub fn stop(&self) {
        self.state.set(TaskState::Stopped);
    }

    /// Suspends firing without removing the task.
    pub fn pause(&self) {
        self.paused.set(true);
    }

    pub fn resume(&self) {
        self.paused.set(false);
    }

    /// Clears the elapsed accumulator.
    pub fn reset(&self) {
        self.elapsed.set(0.0);
    }

    //--- Update -----------------------------------------------------------

    /// Advances the task by `dt` seconds, firing as many times as due.
    pub fn update(&self, dt: f64) {
        if !self.is_running() {
            return;
        }

        if self.total_times.get() == 0 {
            self.stop();
            return;
        }

        self.elapsed.set(self.elapsed.get() + dt);

        let delay = self.delay.get();
        if delay <= 0.0 {
            self.fire();
            return;
        }

        // Callbacks may stop or pause the task mid-loop.
        while self.is_running() && self.elapsed.get() >= delay {
            self.elapsed.set(self.elapsed.get() - delay);
            self.fire();
        }
    }

    fn fire(&self) {
        self.run_times.set(self.run_times.get() + 1);

        let callback = self.callback.borrow_mut().take();
        if let Some(mut callback) = callback {
            callback(self);
            let mut slot = self.callback.borrow_mut();
            if slot.is_none() {
                *slot = Some(callback);
            }
        }

        let total = self.total_times.get();
        if total >= 0 && self.run_times.get() >= total {
            self.stop();
        }
    }

    //--- Configuration ----------------------------------------------------

    /// Replaces the callback.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: FnMut(&Task) + 'static,
    {
        *self.callback.borrow_mut() = Some(Box::new(callback));
    }

    pub fn set_delay(&self, delay: f64) {
        self.delay.set(delay.max(0.0));
    }

    pub fn set_total_times(&self, total_times: i32) {
        self.total_times.set(total_times);
    }

    //--- Query API --------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> TaskState {
        self.state.get()
    }

    /// Running and not paused.
    pub fn is_running(&self) -> bool {
        self.state.get() == TaskState::Running && !self.paused.get()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    pub fn is_stopped(&self) -> bool {
        self.state.get() == TaskState::Stopped
    }

    /// Number of times the callback has fired.
    pub fn run_times(&self) -> i32 {
        self.run_times.get()
    }

    pub fn total_times(&self) -> i32 {
        self.total_times.get()
    }

    pub fn delay(&self) -> f64 {
        self.delay.get()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed.get()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("state", &self.state.get())
            .field("paused", &self.paused.get())
            .field("delay", &self.delay.get())
            .field("run_times", &self.run_times.get())
            .field("total_times", &self.total_times.get())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
