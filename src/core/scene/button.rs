//=========================================================================
// Button
//=========================================================================
//
// Turns any actor into a clickable button.
//
// Attaching makes the actor responsive and installs a listener named
// "button" that follows the synthesized hover / out / click events:
//
//   Normal ──MouseHover──> Hover ──MouseDown──> Pressed
//     ^                      │ ^                  │
//     └──────MouseOut────────┘ └─────MouseUp──────┘ (+ MouseClick)
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use super::actor::ActorRef;
use crate::core::event::{Event, EventListener, EventType};

//=== Types ===============================================================

/// Button callback; receives the actor the button is attached to.
pub type ButtonCallback = Box<dyn FnMut(&ActorRef)>;

pub type ButtonRef = Rc<Button>;

/// Listener name used for the button's event handler.
pub const BUTTON_LISTENER: &str = "button";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStatus {
    Normal,
    Hover,
    Pressed,
}

//=== Button ==============================================================

pub struct Button {
    status: Cell<ButtonStatus>,
    on_click: RefCell<Option<ButtonCallback>>,
    on_pressed: RefCell<Option<ButtonCallback>>,
    on_mouse_over: RefCell<Option<ButtonCallback>>,
    on_mouse_out: RefCell<Option<ButtonCallback>>,
}

impl Button {
    pub fn new() -> Self {
        Self {
            status: Cell::new(ButtonStatus::Normal),
            on_click: RefCell::new(None),
            on_pressed: RefCell::new(None),
            on_mouse_over: RefCell::new(None),
            on_mouse_out: RefCell::new(None),
        }
    }

    /// Button with only a click callback.
    pub fn with_click<F>(click: F) -> Self
    where
        F: FnMut(&ActorRef) + 'static,
    {
        let button = Self::new();
        button.set_click_callback(click);
        button
    }

    //--- Callbacks --------------------------------------------------------

    pub fn set_click_callback<F: FnMut(&ActorRef) + 'static>(&self, f: F) {
        *self.on_click.borrow_mut() = Some(Box::new(f));
    }

    pub fn set_pressed_callback<F: FnMut(&ActorRef) + 'static>(&self, f: F) {
        *self.on_pressed.borrow_mut() = Some(Box::new(f));
    }

    pub fn set_mouse_over_callback<F: FnMut(&ActorRef) + 'static>(&self, f: F) {
        *self.on_mouse_over.borrow_mut() = Some(Box::new(f));
    }

    pub fn set_mouse_out_callback<F: FnMut(&ActorRef) + 'static>(&self, f: F) {
        *self.on_mouse_out.borrow_mut() = Some(Box::new(f));
    }

    pub fn status(&self) -> ButtonStatus {
        self.status.get()
    }

    //--- Attachment -------------------------------------------------------

    /// Attaches the button to `actor` and returns a shared handle.
    ///
    /// The listener holds the actor weakly, so the button never keeps its
    /// actor alive.
    pub fn attach(self, actor: &ActorRef) -> ButtonRef {
        let button = Rc::new(self);
        actor.set_responsive(true);

        let handler = Rc::clone(&button);
        let weak = actor.downgrade();
        actor.add_listener(
            EventListener::all(move |event| {
                if let Some(actor) = weak.upgrade() {
                    handler.handle_event(&actor, event);
                }
            })
            .with_name(BUTTON_LISTENER),
        );

        button
    }

    /// Removes any button behavior from `actor`.
    pub fn detach(actor: &ActorRef) {
        actor.remove_listeners(BUTTON_LISTENER);
    }

    fn handle_event(&self, actor: &ActorRef, event: &Event) {
        match event.event_type() {
            EventType::MouseHover => {
                self.status.set(ButtonStatus::Hover);
                Self::fire(&self.on_mouse_over, actor);
            }
            EventType::MouseOut => {
                self.status.set(ButtonStatus::Normal);
                Self::fire(&self.on_mouse_out, actor);
            }
            EventType::MouseDown if self.status.get() == ButtonStatus::Hover => {
                self.status.set(ButtonStatus::Pressed);
                Self::fire(&self.on_pressed, actor);
            }
            EventType::MouseUp if self.status.get() == ButtonStatus::Pressed => {
                self.status.set(ButtonStatus::Hover);
            }
            EventType::MouseClick => {
                Self::fire(&self.on_click, actor);
            }
            _ => {}
        }
    }

    fn fire(slot: &RefCell<Option<ButtonCallback>>, actor: &ActorRef) {
        let callback = slot.borrow_mut().take();
        if let Some(mut callback) = callback {
            callback(actor);
            let mut slot = slot.borrow_mut();
            if slot.is_none() {
                *slot = Some(callback);
            }
        }
    }
}

impl Default for Button {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("status", &self.status.get())
            .field("has_click", &self.on_click.borrow().is_some())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::MouseButton;

    fn button_actor() -> (ActorRef, ActorRef) {
        let root = ActorRef::new();
        let actor = ActorRef::new();
        actor.set_size(40.0, 20.0);
        actor.set_position(10.0, 10.0);
        root.add_child(&actor).unwrap();
        (root, actor)
    }

    #[test]
    fn attach_makes_actor_responsive() {
        let (_root, actor) = button_actor();
        let _button = Button::new().attach(&actor);
        assert!(actor.is_responsive());
        assert_eq!(actor.listener_count(), 1);
    }

    #[test]
    fn full_click_cycle() {
        let (root, actor) = button_actor();
        let log = Rc::new(RefCell::new(Vec::new()));

        let record = |name: &'static str| {
            let log = Rc::clone(&log);
            move |_: &ActorRef| log.borrow_mut().push(name)
        };

        let button = Button::new();
        button.set_click_callback(record("click"));
        button.set_pressed_callback(record("pressed"));
        button.set_mouse_over_callback(record("over"));
        button.set_mouse_out_callback(record("out"));
        let button = button.attach(&actor);

        root.dispatch(&mut Event::mouse_move(20.0, 20.0));
        assert_eq!(button.status(), ButtonStatus::Hover);

        root.dispatch(&mut Event::mouse_down(20.0, 20.0, MouseButton::Left));
        assert_eq!(button.status(), ButtonStatus::Pressed);

        root.dispatch(&mut Event::mouse_up(20.0, 20.0, MouseButton::Left));
        assert_eq!(button.status(), ButtonStatus::Hover);

        root.dispatch(&mut Event::mouse_move(200.0, 200.0));
        assert_eq!(button.status(), ButtonStatus::Normal);

        assert_eq!(*log.borrow(), vec!["over", "pressed", "click", "out"]);
    }

    #[test]
    fn press_outside_does_nothing() {
        let (root, actor) = button_actor();
        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        let button = Button::with_click(move |_| counter.set(counter.get() + 1)).attach(&actor);

        root.dispatch(&mut Event::mouse_down(200.0, 200.0, MouseButton::Left));
        root.dispatch(&mut Event::mouse_up(200.0, 200.0, MouseButton::Left));

        assert_eq!(button.status(), ButtonStatus::Normal);
        assert_eq!(clicks.get(), 0);
    }

    #[test]
    fn click_callback_can_detach_button() {
        let (root, actor) = button_actor();
        let weak = actor.downgrade();
        let _button = Button::with_click(move |_| {
            if let Some(actor) = weak.upgrade() {
                Button::detach(&actor);
            }
        })
        .attach(&actor);

        root.dispatch(&mut Event::mouse_move(20.0, 20.0));
        root.dispatch(&mut Event::mouse_down(20.0, 20.0, MouseButton::Left));
        root.dispatch(&mut Event::mouse_up(20.0, 20.0, MouseButton::Left));

        assert_eq!(actor.listener_count(), 0);
    }
}
