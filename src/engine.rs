//=========================================================================
// Aetheric Stage Engine
//
// Main entry point and coordinator for the engine.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run()──>  [Tick Loop]
//         │                          │
//         ├─ with_tps()              ├─ tick(): collect → dispatch →
//         ├─ with_channel_capacity() │          update → transitions →
//         └─ ...                     │          loads → render → drain
//                                    └─ event_sender() for the host
// ```
//
// The actor tree is single-threaded. Hosts drive input from any thread by
// sending `PlatformEvent`s; the engine drains them at the start of a tick.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::marker::PhantomData;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Sender};
use kurbo::Vec2;
use log::info;

//=== Internal Dependencies ===============================================

use crate::core::platform_bridge::{EventCollector, PlatformEvent, TickControl};
use crate::core::render::{Renderer, ResourceLoader};
use crate::core::scene::StageKey;
use crate::core::EngineSystems;

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **TPS**: 60.0 (ticks per second in [`Engine::run`])
/// - **Channel capacity**: 128 host messages
/// - **Max events per frame**: 100 host messages drained per tick
/// - **Default anchor**: (0, 0) for actors made by
///   [`EngineSystems::create_actor`]
///
/// # Examples
///
/// ```no_run
/// use aetheric_stage::EngineBuilder;
/// use aetheric_stage::core::scene::{Stage, StageKey, StageTransition};
/// # use aetheric_stage::core::render::Renderer;
/// # fn renderer() -> Box<dyn Renderer> { unimplemented!() }
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Screen { Title }
/// impl StageKey for Screen {}
///
/// let mut renderer = renderer();
/// EngineBuilder::<Screen>::new()
///     .with_tps(120.0)
///     .with_default_anchor(0.5, 0.5)
///     .build()
///     .init(|systems| {
///         systems.director.register_stage(Screen::Title, Stage::new());
///         systems.director.request(StageTransition::Push(Screen::Title));
///     })
///     .run(renderer.as_mut());
/// ```
pub struct EngineBuilder<K: StageKey> {
    tps: f64,
    channel_capacity: usize,
    max_events_per_frame: usize,
    default_anchor: Vec2,
    resource_loader: Option<Arc<dyn ResourceLoader>>,
    _phantom: PhantomData<K>,
}

impl<K: StageKey> EngineBuilder<K> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
            max_events_per_frame: 100,
            default_anchor: Vec2::ZERO,
            resource_loader: None,
            _phantom: PhantomData,
        }
    }

    /// Sets the target ticks per second for [`Engine::run`].
    ///
    /// Default: 60.0
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the capacity of the host → engine message channel.
    ///
    /// Senders block once the channel is full, so a small value applies
    /// back-pressure to a host that outpaces the engine.
    ///
    /// Default: 128
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Sets how many host messages one tick drains at most.
    ///
    /// Default: 100
    ///
    /// # Panics
    ///
    /// Panics if `max == 0`.
    pub fn with_max_events_per_frame(mut self, max: usize) -> Self {
        assert!(max > 0, "Max events per frame must be positive");
        self.max_events_per_frame = max;
        self
    }

    /// Sets the anchor given to actors created through the engine.
    ///
    /// Default: (0.0, 0.0)
    pub fn with_default_anchor(mut self, anchor_x: f64, anchor_y: f64) -> Self {
        self.default_anchor = Vec2::new(anchor_x, anchor_y);
        self
    }

    /// Enables the texture cache and the background loader.
    pub fn with_resource_loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
        self.resource_loader = Some(loader);
        self
    }

    /// Builds the engine instance.
    pub fn build(self) -> Engine<K> {
        info!(
            target: "engine",
            "Building engine (TPS: {}, channel: {}, max events/frame: {})",
            self.tps, self.channel_capacity, self.max_events_per_frame
        );

        let (sender, receiver) = bounded(self.channel_capacity);

        Engine {
            systems: EngineSystems::new(self.default_anchor, self.resource_loader),
            collector: EventCollector::new(receiver, self.max_events_per_frame),
            sender,
            tps: self.tps,
            ticks: 0,
            shut_down: false,
        }
    }
}

impl<K: StageKey> Default for EngineBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Aetheric Stage runtime.
///
/// Create via [`EngineBuilder`]. Drive it either with [`Engine::run`]
/// (paced loop until a quit message arrives) or by calling
/// [`Engine::tick`] from the host's own loop.
pub struct Engine<K: StageKey> {
    systems: EngineSystems<K>,
    collector: EventCollector,
    sender: Sender<PlatformEvent>,
    tps: f64,
    ticks: u64,
    shut_down: bool,
}

impl<K: StageKey> Engine<K> {
    //--- Initialization ---------------------------------------------------

    /// Configures engine systems (stages, timers) before running.
    pub fn init<F>(mut self, init_fn: F) -> Self
    where
        F: FnOnce(&mut EngineSystems<K>),
    {
        info!(target: "engine", "Initializing engine systems");

        init_fn(&mut self.systems);
        self.systems.director.process_transitions();

        info!(target: "engine", "Engine initialization complete");
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn systems(&self) -> &EngineSystems<K> {
        &self.systems
    }

    pub fn systems_mut(&mut self) -> &mut EngineSystems<K> {
        &mut self.systems
    }

    /// Handle the host uses to feed input and request shutdown.
    pub fn event_sender(&self) -> Sender<PlatformEvent> {
        self.sender.clone()
    }

    pub fn tps(&self) -> f64 {
        self.tps
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    //--- Execution --------------------------------------------------------

    /// Runs one frame.
    ///
    /// 1. Drain host messages (bounded)
    /// 2. Dispatch events through active stages, topmost first
    /// 3. Update engine timers, then active stages
    /// 4. Apply queued stage transitions
    /// 5. Deliver finished background loads
    /// 6. Render active stages bottom to top
    /// 7. Drain the release pool
    ///
    /// Returns [`TickControl::Exit`] once a quit message was received. Events
    /// that arrived before the quit are still dispatched; the rest of the
    /// frame is skipped.
    pub fn tick(&mut self, dt: f64, renderer: &mut dyn Renderer) -> TickControl {
        if self.shut_down {
            return TickControl::Exit;
        }

        //--- 1. Collect --------------------------------------------------
        let control = self.collector.collect_frame();

        //--- 2. Dispatch -------------------------------------------------
        let mut events = self.collector.take_events();
        self.systems.dispatch(&mut events);

        if control == TickControl::Exit {
            info!(target: "engine", "Quit requested after {} ticks", self.ticks);
            return TickControl::Exit;
        }

        //--- 3-4. Update + transitions -----------------------------------
        self.systems.update(dt);

        //--- 5. Async loads ----------------------------------------------
        self.systems.poll_loads();

        //--- 6. Render ---------------------------------------------------
        self.systems.render(renderer);

        //--- 7. Release pool ---------------------------------------------
        self.systems.pool.drain();

        self.ticks += 1;
        TickControl::Continue
    }

    /// Ticks at the configured rate until the host sends
    /// [`PlatformEvent::Quit`], then shuts down.
    pub fn run(mut self, renderer: &mut dyn Renderer) {
        info!(target: "engine", "Starting engine runtime (TPS: {})", self.tps);

        let frame_duration = Duration::from_secs_f64(1.0 / self.tps);
        let mut last = Instant::now();

        loop {
            let frame_start = Instant::now();
            let dt = frame_start.duration_since(last).as_secs_f64();
            last = frame_start;

            if self.tick(dt, renderer) == TickControl::Exit {
                break;
            }

            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                thread::sleep(frame_duration - elapsed);
            }
        }

        self.shutdown();
    }

    /// Exits all stages, drops timers and loads, and clears the release
    /// pool. Further ticks return [`TickControl::Exit`].
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        self.systems.shutdown();
        info!(target: "engine", "Engine shutdown complete ({} ticks)", self.ticks);
    }
}

impl<K: StageKey> Drop for Engine<K> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::{EventKind, EventType, InputEvent, MouseButton};
    use crate::core::render::recording::{DrawCall, RecordingRenderer};
    use crate::core::scene::{ActorRef, Stage, StageTransition};
    use crate::core::task::Task;
    use kurbo::Point;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestStage {
        Main,
        Overlay,
    }

    impl StageKey for TestStage {}

    fn engine_with_main() -> Engine<TestStage> {
        EngineBuilder::<TestStage>::new().build().init(|systems| {
            systems.director.register_stage(TestStage::Main, Stage::new().with_size(100.0, 100.0));
            systems.director.request(StageTransition::Push(TestStage::Main));
        })
    }

    //=====================================================================
    // EngineBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let builder = EngineBuilder::<TestStage>::new();
        assert_eq!(builder.tps, 60.0);
        assert_eq!(builder.channel_capacity, 128);
        assert_eq!(builder.max_events_per_frame, 100);
        assert_eq!(builder.default_anchor, Vec2::ZERO);
        assert!(builder.resource_loader.is_none());
    }

    #[test]
    fn builder_with_tps() {
        let builder = EngineBuilder::<TestStage>::new().with_tps(120.0);
        assert_eq!(builder.tps, 120.0);
    }

    #[test]
    #[should_panic(expected = "TPS must be positive")]
    fn builder_with_tps_panics_on_zero() {
        EngineBuilder::<TestStage>::new().with_tps(0.0);
    }

    #[test]
    #[should_panic(expected = "TPS must be positive")]
    fn builder_with_tps_panics_on_negative() {
        EngineBuilder::<TestStage>::new().with_tps(-60.0);
    }

    #[test]
    fn builder_with_channel_capacity() {
        let builder = EngineBuilder::<TestStage>::new().with_channel_capacity(256);
        assert_eq!(builder.channel_capacity, 256);
    }

    #[test]
    #[should_panic(expected = "Channel capacity must be positive")]
    fn builder_with_channel_capacity_panics_on_zero() {
        EngineBuilder::<TestStage>::new().with_channel_capacity(0);
    }

    #[test]
    #[should_panic(expected = "Max events per frame must be positive")]
    fn builder_with_max_events_panics_on_zero() {
        EngineBuilder::<TestStage>::new().with_max_events_per_frame(0);
    }

    #[test]
    fn builder_default_anchor_reaches_created_actors() {
        let engine = EngineBuilder::<TestStage>::new().with_default_anchor(0.5, 1.0).build();
        assert_eq!(engine.systems().create_actor().anchor(), Vec2::new(0.5, 1.0));
    }

    //=====================================================================
    // Engine Tests
    //=====================================================================

    #[test]
    fn init_applies_initial_transitions() {
        let engine = engine_with_main();
        assert_eq!(engine.systems().director.current(), Some(TestStage::Main));
    }

    #[test]
    fn tick_renders_inside_one_frame() {
        let mut engine = engine_with_main();
        let mut renderer = RecordingRenderer::default();

        assert_eq!(engine.tick(0.016, &mut renderer), TickControl::Continue);

        assert_eq!(renderer.calls.first(), Some(&DrawCall::Begin));
        assert_eq!(renderer.calls.last(), Some(&DrawCall::End));
        assert_eq!(engine.ticks(), 1);
    }

    #[test]
    fn tick_dispatches_host_events_before_update() {
        let mut engine = engine_with_main();
        let order = Rc::new(RefCell::new(Vec::new()));

        let button = ActorRef::new();
        button.set_size(10.0, 10.0);
        button.set_responsive(true);
        let log = Rc::clone(&order);
        button.on(EventType::MouseClick, move |_| log.borrow_mut().push("click"));
        let log = Rc::clone(&order);
        button.set_update_callback(move |_, _| log.borrow_mut().push("update"));
        if let Some(stage) = engine.systems().director.stage(TestStage::Main) {
            stage.add_child(&button).unwrap();
        }

        let sender = engine.event_sender();
        let at = Point::new(5.0, 5.0);
        sender
            .send(PlatformEvent::Events(vec![
                InputEvent::new(EventKind::MouseMove { pos: at }),
                InputEvent::new(EventKind::MouseDown { pos: at, button: MouseButton::Left }),
                InputEvent::new(EventKind::MouseUp { pos: at, button: MouseButton::Left }),
            ]))
            .unwrap();

        engine.tick(0.016, &mut RecordingRenderer::default());
        assert_eq!(*order.borrow(), vec!["click", "update"]);
    }

    #[test]
    fn tick_updates_timers() {
        let mut engine = engine_with_main();
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        engine
            .systems_mut()
            .timers
            .add_task(Task::new("tick", 0.0, 3, move |_| counter.set(counter.get() + 1)));

        for _ in 0..5 {
            engine.tick(0.016, &mut RecordingRenderer::default());
        }
        assert_eq!(fired.get(), 3);
    }

    #[test]
    fn transitions_requested_during_update_render_the_same_tick() {
        let mut engine = engine_with_main();
        let overlay = Stage::new();
        let marker = ActorRef::new();
        marker.set_size(1.0, 1.0);
        marker.set_show_border(true);
        overlay.add_child(&marker).unwrap();
        engine.systems_mut().director.register_stage(TestStage::Overlay, overlay);

        let sender = engine.systems().director.transitions();
        engine
            .systems_mut()
            .timers
            .add_task(Task::once("open", 0.0, move |_| {
                sender.push(TestStage::Overlay);
            }));

        let mut renderer = RecordingRenderer::default();
        engine.tick(0.016, &mut renderer);

        assert_eq!(engine.systems().director.current(), Some(TestStage::Overlay));
        assert!(renderer
            .calls
            .iter()
            .any(|call| matches!(call, DrawCall::FillShape { .. })));
    }

    #[test]
    fn tick_drains_release_pool() {
        let mut engine = engine_with_main();
        let temp = engine.systems_mut().pool.adopt(String::from("scratch"));
        let kept = engine.systems_mut().pool.adopt(String::from("kept"));
        kept.retain();

        engine.tick(0.016, &mut RecordingRenderer::default());

        assert!(!temp.is_alive());
        assert!(kept.is_alive());
    }

    #[test]
    fn tick_continues_after_render_failure() {
        let mut engine = engine_with_main();
        let mut renderer = RecordingRenderer {
            fail_end: Some(crate::core::error::RenderError::Backend("lost".into())),
            ..Default::default()
        };

        assert_eq!(engine.tick(0.016, &mut renderer), TickControl::Continue);
        assert_eq!(engine.tick(0.016, &mut renderer), TickControl::Continue);
        assert_eq!(engine.ticks(), 2);
    }

    #[test]
    fn quit_exits_without_rendering() {
        let mut engine = engine_with_main();
        engine.event_sender().send(PlatformEvent::Quit).unwrap();

        let mut renderer = RecordingRenderer::default();
        assert_eq!(engine.tick(0.016, &mut renderer), TickControl::Exit);
        assert!(renderer.calls.is_empty());
    }

    #[test]
    fn events_sent_before_quit_are_still_dispatched() {
        let mut engine = engine_with_main();
        let order = Rc::new(RefCell::new(Vec::new()));

        let button = ActorRef::new();
        button.set_size(10.0, 10.0);
        button.set_responsive(true);
        let log = Rc::clone(&order);
        button.on(EventType::MouseClick, move |_| log.borrow_mut().push("click"));
        let log = Rc::clone(&order);
        button.set_update_callback(move |_, _| log.borrow_mut().push("update"));
        if let Some(stage) = engine.systems().director.stage(TestStage::Main) {
            stage.add_child(&button).unwrap();
        }

        let sender = engine.event_sender();
        let at = Point::new(5.0, 5.0);
        sender
            .send(PlatformEvent::Events(vec![
                InputEvent::new(EventKind::MouseMove { pos: at }),
                InputEvent::new(EventKind::MouseDown { pos: at, button: MouseButton::Left }),
                InputEvent::new(EventKind::MouseUp { pos: at, button: MouseButton::Left }),
            ]))
            .unwrap();
        sender.send(PlatformEvent::Quit).unwrap();

        let mut renderer = RecordingRenderer::default();
        assert_eq!(engine.tick(0.016, &mut renderer), TickControl::Exit);
        assert_eq!(*order.borrow(), vec!["click"]);
        assert!(renderer.calls.is_empty());
    }

    #[test]
    fn run_returns_after_quit() {
        let engine = engine_with_main().init(|systems| {
            systems.timers.add_task(Task::every_frame("noop", |_| {}));
        });
        let sender = engine.event_sender();
        sender.send(PlatformEvent::single(InputEvent::new(EventKind::WindowClosed))).unwrap();
        sender.send(PlatformEvent::Quit).unwrap();

        engine.run(&mut RecordingRenderer::default());
    }

    #[test]
    fn shutdown_is_idempotent_and_stops_ticking() {
        let mut engine = engine_with_main();
        let pooled = engine.systems_mut().pool.adopt(1_u8);
        pooled.retain();

        engine.shutdown();
        engine.shutdown();

        assert!(!pooled.is_alive());
        assert_eq!(engine.systems().director.current(), None);
        assert_eq!(engine.tick(0.016, &mut RecordingRenderer::default()), TickControl::Exit);
    }
}
