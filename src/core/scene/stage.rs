//=========================================================================
// Stage
//=========================================================================
//
// A root actor plus optional lifecycle hooks.
//
// Every actor attached under a stage's root carries a weak reference to
// that root, so any node can find the stage it is shown on.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

//=== Internal Dependencies ===============================================

use super::actor::ActorRef;
use crate::core::error::SceneError;
use crate::core::event::Event;
use crate::core::render::Renderer;

//=== Stage Delegate ======================================================

/// Lifecycle hooks for a stage.
///
/// All methods have defaults, so an empty `impl` is a valid delegate.
pub trait StageDelegate {
    /// Called when the stage enters the director's stack.
    fn on_enter(&mut self, _root: &ActorRef) {}

    /// Called when the stage leaves the director's stack.
    fn on_exit(&mut self, _root: &ActorRef) {}

    /// Whether stages below this one stay active.
    ///
    /// Transparent stages (pause overlays, HUDs) let the stages beneath
    /// keep updating, rendering and receiving input. Opaque stages hide
    /// everything below them.
    fn is_transparent(&self) -> bool {
        false
    }
}

//=== Stage ===============================================================

pub struct Stage {
    root: ActorRef,
    delegate: Option<Box<dyn StageDelegate>>,
}

impl Stage {
    /// Empty opaque stage without hooks.
    pub fn new() -> Self {
        let root = ActorRef::new();
        root.set_name("stage");
        root.set_stage(Some(&root));
        Self { root, delegate: None }
    }

    pub fn with_delegate(delegate: impl StageDelegate + 'static) -> Self {
        let mut stage = Self::new();
        stage.delegate = Some(Box::new(delegate));
        stage
    }

    /// Sets the root size (usually the window size).
    pub fn with_size(self, width: f64, height: f64) -> Self {
        self.root.set_size(width, height);
        self
    }

    /// Root actor of the stage.
    pub fn root(&self) -> &ActorRef {
        &self.root
    }

    pub fn add_child(&self, child: &ActorRef) -> Result<(), SceneError> {
        self.root.add_child(child)
    }

    pub fn is_transparent(&self) -> bool {
        self.delegate.as_ref().map_or(false, |d| d.is_transparent())
    }

    //--- Frame ------------------------------------------------------------

    pub fn update(&self, dt: f64) {
        self.root.update(dt);
    }

    /// Renders the tree, then debug borders on top.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        self.root.render(renderer);
        self.root.render_border(renderer);
    }

    pub fn dispatch(&self, event: &mut Event) {
        self.root.dispatch(event);
    }

    //--- Lifecycle --------------------------------------------------------

    pub(crate) fn enter(&mut self) {
        if let Some(delegate) = self.delegate.as_mut() {
            delegate.on_enter(&self.root);
        }
    }

    pub(crate) fn exit(&mut self) {
        if let Some(delegate) = self.delegate.as_mut() {
            delegate.on_exit(&self.root);
        }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("root", &self.root)
            .field("transparent", &self.is_transparent())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
