//=========================================================================
// Event Listeners
//=========================================================================
//
// Per-actor listener chain.
//
// Architecture:
//   EventDispatcher
//     └─ listeners: Vec<Rc<RefCell<EventListener>>>
//
// Flow:
//   snapshot() → deliver(event) → sweep()
//
// Listeners are shared (`ListenerRef`) so callers can keep a handle and
// stop or remove them later. Callbacks are taken out of their slot while
// they run; a callback may add, stop or remove listeners (its own
// included) or mutate the actor tree.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use super::event::{Event, EventType};

//=== Type Aliases ========================================================

/// Callback invoked for each matching event.
pub type ListenerCallback = Box<dyn FnMut(&mut Event)>;

/// Shared handle to a listener.
pub type ListenerRef = Rc<RefCell<EventListener>>;

//=== EventListener =======================================================

/// A callback bound to one event type (or to all of them).
pub struct EventListener {
    name: String,
    filter: Option<EventType>,
    callback: Option<ListenerCallback>,
    running: bool,
    removed: bool,
}

impl EventListener {
    //--- Construction -----------------------------------------------------

    /// Listener for a single event type.
    pub fn new<F>(event_type: EventType, callback: F) -> Self
    where
        F: FnMut(&mut Event) + 'static,
    {
        Self::build(Some(event_type), Box::new(callback))
    }

    /// Listener receiving every event.
    pub fn all<F>(callback: F) -> Self
    where
        F: FnMut(&mut Event) + 'static,
    {
        Self::build(None, Box::new(callback))
    }

    fn build(filter: Option<EventType>, callback: ListenerCallback) -> Self {
        Self {
            name: String::new(),
            filter,
            callback: Some(callback),
            running: true,
            removed: false,
        }
    }

    /// Sets the name used by the dispatcher's batch operations.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    //--- Control ----------------------------------------------------------

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stops receiving events without leaving the chain.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Marks the listener for removal after the current dispatch.
    pub fn remove(&mut self) {
        self.removed = true;
    }

    //--- Query API --------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filter(&self) -> Option<EventType> {
        self.filter
    }

    pub fn is_running(&self) -> bool {
        self.running && !self.removed
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Returns `true` if this listener wants `event_type`.
    pub fn accepts(&self, event_type: EventType) -> bool {
        self.is_running() && self.filter.map_or(true, |filter| filter == event_type)
    }
}

impl fmt::Debug for EventListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListener")
            .field("name", &self.name)
            .field("filter", &self.filter)
            .field("running", &self.running)
            .field("removed", &self.removed)
            .finish()
    }
}

//=== EventDispatcher =====================================================

/// Ordered listener chain.
#[derive(Debug, Default)]
pub struct EventDispatcher {
    listeners: Vec<ListenerRef>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Registration -----------------------------------------------------

    /// Appends a listener and returns its shared handle.
    pub fn add_listener(&mut self, listener: EventListener) -> ListenerRef {
        let listener = Rc::new(RefCell::new(listener));
        self.listeners.push(Rc::clone(&listener));
        listener
    }

    /// Appends an already shared listener (no-op if present).
    pub fn add_listener_ref(&mut self, listener: ListenerRef) -> ListenerRef {
        if !self.listeners.iter().any(|l| Rc::ptr_eq(l, &listener)) {
            self.listeners.push(Rc::clone(&listener));
        }
        listener
    }

    //--- Dispatch ---------------------------------------------------------

    /// Delivers `event` to every matching listener, then sweeps removed
    /// ones.
    pub fn dispatch(&mut self, event: &mut Event) {
        let listeners = self.snapshot();
        Self::deliver(&listeners, event);
        self.sweep();
    }

    /// Listeners not marked for removal, in registration order.
    pub fn snapshot(&self) -> Vec<ListenerRef> {
        self.listeners
            .iter()
            .filter(|l| !l.borrow().is_removed())
            .cloned()
            .collect()
    }

    /// Delivers `event` to a previously taken snapshot.
    pub fn deliver(listeners: &[ListenerRef], event: &mut Event) {
        let event_type = event.event_type();

        for listener in listeners {
            let callback = {
                let mut slot = listener.borrow_mut();
                if !slot.accepts(event_type) {
                    continue;
                }
                slot.callback.take()
            };

            if let Some(mut callback) = callback {
                callback(event);
                let mut slot = listener.borrow_mut();
                if slot.callback.is_none() {
                    slot.callback = Some(callback);
                }
            }
        }
    }

    /// Drops listeners marked for removal.
    pub fn sweep(&mut self) {
        self.listeners.retain(|l| !l.borrow().is_removed());
    }

    //--- Named Batch Operations -------------------------------------------

    pub fn start_listeners(&self, name: &str) {
        self.named(name).for_each(|l| l.borrow_mut().start());
    }

    pub fn stop_listeners(&self, name: &str) {
        self.named(name).for_each(|l| l.borrow_mut().stop());
    }

    pub fn remove_listeners(&mut self, name: &str) {
        self.named(name).for_each(|l| l.borrow_mut().remove());
        self.sweep();
    }

    pub fn start_all_listeners(&self) {
        self.listeners.iter().for_each(|l| l.borrow_mut().start());
    }

    pub fn stop_all_listeners(&self) {
        self.listeners.iter().for_each(|l| l.borrow_mut().stop());
    }

    pub fn remove_all_listeners(&mut self) {
        self.listeners.drain(..).for_each(|l| l.borrow_mut().remove());
    }

    //--- Query API --------------------------------------------------------

    pub fn listeners(&self) -> &[ListenerRef] {
        &self.listeners
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    //--- Internal Helpers -------------------------------------------------

    fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ListenerRef> + 'a {
        self.listeners.iter().filter(move |l| l.borrow().name() == name)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
