//=========================================================================
// Engine Systems
//=========================================================================
//
// Container for the per-engine systems.
//
// Everything a running engine owns lives here; there are no process-wide
// singletons. Hosts reach it through `Engine::init` and
// `Engine::systems_mut`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use kurbo::Vec2;
use log::{debug, error, info};

//=== Internal Dependencies ===============================================

use crate::core::event::Event;
use crate::core::object::ReleasePool;
use crate::core::render::{AsyncLoader, Renderer, ResourceLoader, TextureCache};
use crate::core::scene::{ActorRef, Director, StageKey};
use crate::core::task::TaskManager;

//=== EngineSystems =======================================================

/// Engine-level systems.
///
/// # Available Systems
///
/// - `director`: stage registry and stage stack
/// - `timers`: engine-wide tasks, updated before any stage
/// - `pool`: deferred release pool, drained at the end of every tick
/// - `textures`: texture cache (present when a resource loader is set)
/// - `loader`: background loader (present when a resource loader is set)
pub struct EngineSystems<K: StageKey> {
    /// Stage registry and stack.
    pub director: Director<K>,

    /// Engine-wide timers.
    pub timers: TaskManager,

    /// Deferred release pool.
    pub pool: ReleasePool,

    /// Memoized textures, shared loader with `loader`.
    pub textures: Option<TextureCache>,

    /// Worker-thread loader; completions are delivered during the tick.
    pub loader: Option<AsyncLoader>,

    default_anchor: Vec2,
}

impl<K: StageKey> EngineSystems<K> {
    pub(crate) fn new(default_anchor: Vec2, resource_loader: Option<Arc<dyn ResourceLoader>>) -> Self {
        let pool = ReleasePool::new();

        let (textures, loader) = match resource_loader {
            Some(resource_loader) => (
                Some(TextureCache::new(Arc::clone(&resource_loader))),
                Some(AsyncLoader::new(resource_loader, pool.handle())),
            ),
            None => (None, None),
        };

        Self {
            director: Director::new(),
            timers: TaskManager::new(),
            pool,
            textures,
            loader,
            default_anchor,
        }
    }

    //--- Actors -----------------------------------------------------------

    /// Creates a detached actor using the configured default anchor.
    pub fn create_actor(&self) -> ActorRef {
        ActorRef::with_anchor(self.default_anchor.x, self.default_anchor.y)
    }

    pub fn default_anchor(&self) -> Vec2 {
        self.default_anchor
    }

    //--- Frame Phases -----------------------------------------------------

    /// Sends each event through the active stages, topmost first.
    pub(crate) fn dispatch(&self, events: &mut [Event]) {
        for event in events.iter_mut() {
            self.director.dispatch(event);
        }
    }

    /// Engine timers, then stages, then queued stage transitions.
    pub(crate) fn update(&mut self, dt: f64) {
        self.timers.update_all(dt);
        self.director.update(dt);

        let applied = self.director.process_transitions();
        if applied > 0 {
            debug!(target: "engine", "Applied {} stage transitions", applied);
        }
    }

    /// Runs callbacks for finished background loads.
    pub(crate) fn poll_loads(&mut self) -> usize {
        match self.loader.as_mut() {
            Some(loader) => loader.poll(),
            None => 0,
        }
    }

    /// Draws the active stages inside one begin/end pair.
    pub(crate) fn render(&self, renderer: &mut dyn Renderer) {
        renderer.begin_draw();
        self.director.render(renderer);
        if let Err(err) = renderer.end_draw() {
            error!(target: "engine", "Renderer failed to present frame: {}", err);
        }
    }

    /// Tears everything down: stages exit, timers and pending loads are
    /// dropped, the pool is cleared unconditionally.
    pub(crate) fn shutdown(&mut self) {
        self.director.shutdown();
        self.timers.remove_all_tasks();

        if let Some(loader) = self.loader.as_mut() {
            loader.shutdown();
        }
        if let Some(textures) = self.textures.as_mut() {
            textures.clear();
        }

        let destroyed = self.pool.clear();
        info!(target: "engine", "Engine systems shut down ({} pooled objects destroyed)", destroyed);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::recording::{DrawCall, RecordingRenderer};
    use crate::core::render::texture::tests::StubLoader;
    use crate::core::scene::{Stage, StageTransition};
    use crate::core::task::Task;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Key {
        Main,
    }

    impl StageKey for Key {}

    #[test]
    fn create_actor_uses_default_anchor() {
        let systems = EngineSystems::<Key>::new(Vec2::new(0.5, 0.5), None);
        assert_eq!(systems.create_actor().anchor(), Vec2::new(0.5, 0.5));
    }

    #[test]
    fn loader_systems_exist_only_with_a_resource_loader() {
        let mut bare = EngineSystems::<Key>::new(Vec2::ZERO, None);
        assert!(bare.textures.is_none());
        assert_eq!(bare.poll_loads(), 0);

        let mut loaded = EngineSystems::<Key>::new(Vec2::ZERO, Some(Arc::new(StubLoader::default())));
        assert!(loaded.textures.is_some());
        assert!(loaded.loader.is_some());
        loaded.shutdown();
    }

    #[test]
    fn timers_run_before_stages() {
        let mut systems = EngineSystems::<Key>::new(Vec2::ZERO, None);
        let order = Rc::new(std::cell::RefCell::new(Vec::new()));

        let stage = Stage::new();
        let log = Rc::clone(&order);
        stage.root().set_update_callback(move |_, _| log.borrow_mut().push("stage"));
        systems.director.register_stage(Key::Main, stage);
        systems.director.request(StageTransition::Push(Key::Main));
        systems.director.process_transitions();

        let log = Rc::clone(&order);
        systems.timers.add_task(Task::every_frame("t", move |_| log.borrow_mut().push("timer")));

        systems.update(0.016);
        assert_eq!(*order.borrow(), vec!["timer", "stage"]);
    }

    #[test]
    fn render_survives_end_draw_failure() {
        let systems = EngineSystems::<Key>::new(Vec2::ZERO, None);
        let mut renderer = RecordingRenderer {
            fail_end: Some(crate::core::error::RenderError::DeviceLost),
            ..Default::default()
        };

        systems.render(&mut renderer);
        systems.render(&mut renderer);
        assert_eq!(
            renderer.calls,
            vec![DrawCall::Begin, DrawCall::End, DrawCall::Begin, DrawCall::End]
        );
    }

    #[test]
    fn shutdown_clears_pool_and_timers() {
        let mut systems = EngineSystems::<Key>::new(Vec2::ZERO, None);
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        systems.timers.add_task(Task::every_frame("t", move |_| counter.set(counter.get() + 1)));

        let kept = systems.pool.adopt(7_u32);
        kept.retain();

        systems.shutdown();
        assert!(!kept.is_alive());
        assert!(systems.timers.is_empty());

        systems.update(0.1);
        assert_eq!(fired.get(), 0);
    }
}
