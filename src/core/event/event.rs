//=========================================================================
// Scene Events
//
// Portable representation of the events routed through the actor tree.
//
// Hosts translate their OS/window events into `InputEvent`s, the `Send`
// wire form, and send them to the engine. The engine's collector turns
// each one into an `Event` on the main thread and dispatches it through
// the active stages.
//
// Event Flow:
// ```text
// Host (window, input backend)
//         ↓  PlatformEvent::Events(Vec<InputEvent>)
//    EventCollector (engine inbox, InputEvent → Event)
//         ↓
//    Director::dispatch (topmost stage first)
//         ↓
//    ActorRef::dispatch (children first, reverse z-order)
//         ↓
//    EventDispatcher (listener chain of each actor)
// ```
//
// Mouse events carry a `target` slot: the first responsive actor under
// the cursor claims the event by setting itself as target, so actors
// further back see the event as already handled.
//
//=========================================================================

//=== External Dependencies ===============================================

use kurbo::Point;

//=== Internal Dependencies ===============================================

use crate::core::scene::{ActorRef, WeakActor};

//=== MouseButton =========================================================

/// Physical mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button (typically left).
    Left,

    /// Secondary button (typically right).
    Right,

    /// Middle button (wheel click).
    Middle,

    /// Any other button (side buttons, thumb buttons, macro keys).
    Other,
}

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the character produced.
/// Text input arrives separately as [`EventKind::KeyChar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    /// Number row: 0-9
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    /// Letter keys: A-Z (physical location, not character)
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Function Keys ----------------------------------------------------

    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,

    //--- Arrow Keys -------------------------------------------------------

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Shift,
    Control,
    Alt,

    /// Fallback for keys the host could not map.
    Unidentified,
}

//=== Modifiers ===========================================================

/// Modifier key state (Shift, Ctrl, Alt) at the time of the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    /// Shift key held (either left or right).
    pub shift: bool,

    /// Ctrl key held (either left or right, Command on macOS).
    pub ctrl: bool,

    /// Alt key held (either left or right, Option on macOS).
    pub alt: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Self = Self { shift: false, ctrl: false, alt: false };

    /// Shift only.
    pub const SHIFT: Self = Self { shift: true, ctrl: false, alt: false };

    /// Ctrl only.
    pub const CTRL: Self = Self { shift: false, ctrl: true, alt: false };

    /// Alt only.
    pub const ALT: Self = Self { shift: false, ctrl: false, alt: true };
}

//=== EventType ===========================================================

/// Payload-free event tag, used by listeners to filter what they receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    MouseMove,
    MouseDown,
    MouseUp,
    MouseWheel,
    MouseHover,
    MouseOut,
    MouseClick,
    KeyDown,
    KeyUp,
    KeyChar,
    WindowMoved,
    WindowResized,
    WindowFocusChanged,
    WindowTitleChanged,
    WindowClosed,
}

impl EventType {
    /// Returns `true` for the mouse family (move, buttons, wheel, and the
    /// synthesized hover/out/click).
    pub fn is_mouse(self) -> bool {
        matches!(
            self,
            Self::MouseMove
                | Self::MouseDown
                | Self::MouseUp
                | Self::MouseWheel
                | Self::MouseHover
                | Self::MouseOut
                | Self::MouseClick
        )
    }

    pub fn is_keyboard(self) -> bool {
        matches!(self, Self::KeyDown | Self::KeyUp | Self::KeyChar)
    }

    pub fn is_window(self) -> bool {
        matches!(
            self,
            Self::WindowMoved
                | Self::WindowResized
                | Self::WindowFocusChanged
                | Self::WindowTitleChanged
                | Self::WindowClosed
        )
    }
}

//=== EventKind ===========================================================

/// Event payload.
///
/// Mouse positions are in window coordinates (pixels, top-left origin).
/// `MouseHover`, `MouseOut` and `MouseClick` are synthesized by the actor
/// tree during dispatch; hosts only send the raw move/down/up/wheel events.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    //--- Mouse ------------------------------------------------------------

    MouseMove { pos: Point },
    MouseDown { pos: Point, button: MouseButton },
    MouseUp { pos: Point, button: MouseButton },
    MouseWheel { pos: Point, delta: f64 },
    MouseHover { pos: Point },
    MouseOut { pos: Point },
    MouseClick { pos: Point, button: MouseButton },

    //--- Keyboard ---------------------------------------------------------

    KeyDown { key: KeyCode },
    KeyUp { key: KeyCode },
    KeyChar { ch: char },

    //--- Window -----------------------------------------------------------

    WindowMoved { x: i32, y: i32 },
    WindowResized { width: u32, height: u32 },
    WindowFocusChanged { focused: bool },
    WindowTitleChanged { title: String },
    WindowClosed,
}

impl EventKind {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::MouseMove { .. } => EventType::MouseMove,
            Self::MouseDown { .. } => EventType::MouseDown,
            Self::MouseUp { .. } => EventType::MouseUp,
            Self::MouseWheel { .. } => EventType::MouseWheel,
            Self::MouseHover { .. } => EventType::MouseHover,
            Self::MouseOut { .. } => EventType::MouseOut,
            Self::MouseClick { .. } => EventType::MouseClick,
            Self::KeyDown { .. } => EventType::KeyDown,
            Self::KeyUp { .. } => EventType::KeyUp,
            Self::KeyChar { .. } => EventType::KeyChar,
            Self::WindowMoved { .. } => EventType::WindowMoved,
            Self::WindowResized { .. } => EventType::WindowResized,
            Self::WindowFocusChanged { .. } => EventType::WindowFocusChanged,
            Self::WindowTitleChanged { .. } => EventType::WindowTitleChanged,
            Self::WindowClosed => EventType::WindowClosed,
        }
    }
}

//=== InputEvent ==========================================================

/// Thread-safe form of an event, as sent by hosts through the engine inbox.
///
/// Converted into an [`Event`] on the thread that owns the actor tree.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub kind: EventKind,
    pub modifiers: Modifiers,
}

impl InputEvent {
    pub fn new(kind: EventKind) -> Self {
        Self { kind, modifiers: Modifiers::NONE }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl From<EventKind> for InputEvent {
    fn from(kind: EventKind) -> Self {
        Self::new(kind)
    }
}

//=== Event ===============================================================

/// An event travelling through the actor tree.
#[derive(Debug, Clone)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,

    /// Modifier keys held when the event was produced.
    pub modifiers: Modifiers,

    target: Option<WeakActor>,
}

impl Event {
    //--- Construction -----------------------------------------------------

    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            modifiers: Modifiers::NONE,
            target: None,
        }
    }

    /// Returns the event with the given modifier state (consumes self).
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn mouse_move(x: f64, y: f64) -> Self {
        Self::new(EventKind::MouseMove { pos: Point::new(x, y) })
    }

    pub fn mouse_down(x: f64, y: f64, button: MouseButton) -> Self {
        Self::new(EventKind::MouseDown { pos: Point::new(x, y), button })
    }

    pub fn mouse_up(x: f64, y: f64, button: MouseButton) -> Self {
        Self::new(EventKind::MouseUp { pos: Point::new(x, y), button })
    }

    pub fn mouse_wheel(x: f64, y: f64, delta: f64) -> Self {
        Self::new(EventKind::MouseWheel { pos: Point::new(x, y), delta })
    }

    pub fn key_down(key: KeyCode) -> Self {
        Self::new(EventKind::KeyDown { key })
    }

    pub fn key_up(key: KeyCode) -> Self {
        Self::new(EventKind::KeyUp { key })
    }

    pub fn key_char(ch: char) -> Self {
        Self::new(EventKind::KeyChar { ch })
    }

    pub fn window_resized(width: u32, height: u32) -> Self {
        Self::new(EventKind::WindowResized { width, height })
    }

    pub fn window_closed() -> Self {
        Self::new(EventKind::WindowClosed)
    }

    //--- Query API --------------------------------------------------------

    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    pub fn is_mouse(&self) -> bool {
        self.event_type().is_mouse()
    }

    /// Cursor position for mouse events.
    pub fn position(&self) -> Option<Point> {
        match &self.kind {
            EventKind::MouseMove { pos }
            | EventKind::MouseDown { pos, .. }
            | EventKind::MouseUp { pos, .. }
            | EventKind::MouseWheel { pos, .. }
            | EventKind::MouseHover { pos }
            | EventKind::MouseOut { pos }
            | EventKind::MouseClick { pos, .. } => Some(*pos),
            _ => None,
        }
    }

    /// Button for mouse down/up/click events.
    pub fn button(&self) -> Option<MouseButton> {
        match &self.kind {
            EventKind::MouseDown { button, .. }
            | EventKind::MouseUp { button, .. }
            | EventKind::MouseClick { button, .. } => Some(*button),
            _ => None,
        }
    }

    //--- Target -----------------------------------------------------------

    /// The actor that claimed this event, if it is still alive.
    pub fn target(&self) -> Option<ActorRef> {
        self.target.as_ref().and_then(WeakActor::upgrade)
    }

    /// Returns `true` once some actor has claimed the event.
    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    pub fn set_target(&mut self, actor: &ActorRef) {
        self.target = Some(actor.downgrade());
    }

    pub fn clear_target(&mut self) {
        self.target = None;
    }

    /// Returns `true` if `actor` claimed this event.
    pub fn is_target(&self, actor: &ActorRef) -> bool {
        self.target
            .as_ref()
            .map_or(false, |target| target.points_to(actor))
    }

    //--- Synthesis --------------------------------------------------------

    /// Copy of a mouse event re-tagged as hover, targeted at `actor`.
    pub(crate) fn hover_for(&self, actor: &ActorRef) -> Option<Self> {
        let pos = self.position()?;
        Some(self.derive(EventKind::MouseHover { pos }, actor))
    }

    /// Copy of a mouse event re-tagged as out, targeted at `actor`.
    pub(crate) fn out_for(&self, actor: &ActorRef) -> Option<Self> {
        let pos = self.position()?;
        Some(self.derive(EventKind::MouseOut { pos }, actor))
    }

    /// Copy of a mouse-up event re-tagged as click, targeted at `actor`.
    pub(crate) fn click_for(&self, actor: &ActorRef) -> Option<Self> {
        let pos = self.position()?;
        let button = self.button()?;
        Some(self.derive(EventKind::MouseClick { pos, button }, actor))
    }

    fn derive(&self, kind: EventKind, actor: &ActorRef) -> Self {
        Self {
            kind,
            modifiers: self.modifiers,
            target: Some(actor.downgrade()),
        }
    }
}

impl From<EventKind> for Event {
    fn from(kind: EventKind) -> Self {
        Self::new(kind)
    }
}

impl From<InputEvent> for Event {
    fn from(input: InputEvent) -> Self {
        Self::new(input.kind).with_modifiers(input.modifiers)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
