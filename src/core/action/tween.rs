//=========================================================================
// Tweens
//=========================================================================
//
// Interpolating actions: `ActionTween<T>` owns duration, elapsed time and
// easing; `T: Tween` maps eased progress onto the target.
//
//   progress = min(elapsed / duration, 1)   (1 immediately if duration <= 0)
//   T::apply(target, ease(progress))
//
// `*By` tweens are relative and reversible (negated delta); `*To` tweens
// are absolute and have no inverse.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use kurbo::{Point, Vec2};

//=== Internal Dependencies ===============================================

use super::action::{Action, ActionKind};
use super::ease::Ease;
use crate::core::scene::ActorRef;

//=== Tween Trait =========================================================

pub trait Tween: Clone + 'static {
    /// Captures start values at the beginning of each iteration.
    fn start(&mut self, target: &ActorRef);

    /// Applies eased `progress` (0..=1, may overshoot with back easing).
    fn apply(&mut self, target: &ActorRef, progress: f64);

    /// Inverse tween, if one exists.
    fn reversed(&self) -> Option<Self>;
}

//=== ActionTween =========================================================

#[derive(Clone)]
pub struct ActionTween<T: Tween> {
    tween: T,
    duration: f64,
    elapsed: f64,
    ease: Ease,
}

impl<T: Tween> ActionTween<T> {
    pub fn new(tween: T, duration: f64) -> Self {
        Self {
            tween,
            duration,
            elapsed: 0.0,
            ease: Ease::Linear,
        }
    }

    pub fn tween(&self) -> &T {
        &self.tween
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn ease(&self) -> Ease {
        self.ease
    }

    fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }
}

impl<T: Tween> ActionKind for ActionTween<T> {
    fn init(&mut self, target: &ActorRef) {
        self.elapsed = 0.0;
        self.tween.start(target);
    }

    fn update(&mut self, target: &ActorRef, dt: f64) -> bool {
        self.elapsed += dt;
        let progress = self.progress();
        self.tween.apply(target, self.ease.apply(progress));
        progress >= 1.0
    }

    fn clone_kind(&self) -> Box<dyn ActionKind> {
        Box::new(Self {
            elapsed: 0.0,
            ..self.clone()
        })
    }

    fn reverse_kind(&self) -> Option<Box<dyn ActionKind>> {
        let tween = self.tween.reversed()?;
        Some(Box::new(Self {
            tween,
            duration: self.duration,
            elapsed: 0.0,
            ease: self.ease,
        }))
    }

    fn set_ease(&mut self, ease: Ease) {
        self.ease = ease;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

//=========================================================================
// Transform Tweens
//=========================================================================

//--- MoveBy --------------------------------------------------------------

/// Relative move.
///
/// Moves made by other code while the tween runs are kept: the start point
/// follows any displacement the tween did not cause.
#[derive(Debug, Clone, Copy)]
pub struct MoveBy {
    delta: Vec2,
    start: Point,
    prev: Point,
}

impl MoveBy {
    pub fn new(delta: Vec2) -> Self {
        Self {
            delta,
            start: Point::ZERO,
            prev: Point::ZERO,
        }
    }

    pub fn delta(&self) -> Vec2 {
        self.delta
    }
}

impl Tween for MoveBy {
    fn start(&mut self, target: &ActorRef) {
        self.start = target.position();
        self.prev = self.start;
    }

    fn apply(&mut self, target: &ActorRef, progress: f64) {
        let current = target.position();
        self.start += current - self.prev;

        let next = self.start + self.delta * progress;
        target.set_position_point(next);
        self.prev = next;
    }

    fn reversed(&self) -> Option<Self> {
        Some(Self::new(-self.delta))
    }
}

//--- MoveTo --------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct MoveTo {
    end: Point,
    by: MoveBy,
}

impl MoveTo {
    pub fn new(end: Point) -> Self {
        Self {
            end,
            by: MoveBy::new(Vec2::ZERO),
        }
    }
}

impl Tween for MoveTo {
    fn start(&mut self, target: &ActorRef) {
        self.by = MoveBy::new(self.end - target.position());
        self.by.start(target);
    }

    fn apply(&mut self, target: &ActorRef, progress: f64) {
        self.by.apply(target, progress);
    }

    fn reversed(&self) -> Option<Self> {
        None
    }
}

//--- RotateBy / RotateTo -------------------------------------------------

/// Relative rotation in degrees.
#[derive(Debug, Clone, Copy)]
pub struct RotateBy {
    delta: f64,
    start: f64,
}

impl RotateBy {
    pub fn new(delta: f64) -> Self {
        Self { delta, start: 0.0 }
    }
}

impl Tween for RotateBy {
    fn start(&mut self, target: &ActorRef) {
        self.start = target.rotation();
    }

    fn apply(&mut self, target: &ActorRef, progress: f64) {
        target.set_rotation(self.start + self.delta * progress);
    }

    fn reversed(&self) -> Option<Self> {
        Some(Self::new(-self.delta))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RotateTo {
    end: f64,
    start: f64,
}

impl RotateTo {
    pub fn new(end: f64) -> Self {
        Self { end, start: 0.0 }
    }
}

impl Tween for RotateTo {
    fn start(&mut self, target: &ActorRef) {
        self.start = target.rotation();
    }

    fn apply(&mut self, target: &ActorRef, progress: f64) {
        target.set_rotation(self.start + (self.end - self.start) * progress);
    }

    fn reversed(&self) -> Option<Self> {
        None
    }
}

//--- ScaleBy / ScaleTo ---------------------------------------------------

/// Multiplicative scale: ends at `start * factor`.
#[derive(Debug, Clone, Copy)]
pub struct ScaleBy {
    factor: Vec2,
    start: Vec2,
}

impl ScaleBy {
    pub fn new(factor_x: f64, factor_y: f64) -> Self {
        Self {
            factor: Vec2::new(factor_x, factor_y),
            start: Vec2::new(1.0, 1.0),
        }
    }
}

impl Tween for ScaleBy {
    fn start(&mut self, target: &ActorRef) {
        self.start = target.scale();
    }

    fn apply(&mut self, target: &ActorRef, progress: f64) {
        let lerp = |f: f64| 1.0 + (f - 1.0) * progress;
        target.set_scale(
            self.start.x * lerp(self.factor.x),
            self.start.y * lerp(self.factor.y),
        );
    }

    fn reversed(&self) -> Option<Self> {
        if self.factor.x == 0.0 || self.factor.y == 0.0 {
            return None;
        }
        Some(Self::new(1.0 / self.factor.x, 1.0 / self.factor.y))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScaleTo {
    end: Vec2,
    start: Vec2,
}

impl ScaleTo {
    pub fn new(scale_x: f64, scale_y: f64) -> Self {
        Self {
            end: Vec2::new(scale_x, scale_y),
            start: Vec2::new(1.0, 1.0),
        }
    }
}

impl Tween for ScaleTo {
    fn start(&mut self, target: &ActorRef) {
        self.start = target.scale();
    }

    fn apply(&mut self, target: &ActorRef, progress: f64) {
        let scale = self.start.lerp(self.end, progress);
        target.set_scale(scale.x, scale.y);
    }

    fn reversed(&self) -> Option<Self> {
        None
    }
}

//--- SkewBy --------------------------------------------------------------

/// Relative skew in degrees.
#[derive(Debug, Clone, Copy)]
pub struct SkewBy {
    delta: Vec2,
    start: Vec2,
}

impl SkewBy {
    pub fn new(delta_x: f64, delta_y: f64) -> Self {
        Self {
            delta: Vec2::new(delta_x, delta_y),
            start: Vec2::ZERO,
        }
    }
}

impl Tween for SkewBy {
    fn start(&mut self, target: &ActorRef) {
        self.start = target.skew();
    }

    fn apply(&mut self, target: &ActorRef, progress: f64) {
        let skew = self.start + self.delta * progress;
        target.set_skew(skew.x, skew.y);
    }

    fn reversed(&self) -> Option<Self> {
        Some(Self::new(-self.delta.x, -self.delta.y))
    }
}

//=========================================================================
// Opacity & Custom Tweens
//=========================================================================

#[derive(Debug, Clone, Copy)]
pub struct FadeTo {
    end: f32,
    start: f32,
}

impl FadeTo {
    pub fn new(opacity: f32) -> Self {
        Self { end: opacity, start: 1.0 }
    }
}

impl Tween for FadeTo {
    fn start(&mut self, target: &ActorRef) {
        self.start = target.opacity();
    }

    fn apply(&mut self, target: &ActorRef, progress: f64) {
        let progress = progress as f32;
        target.set_opacity(self.start + (self.end - self.start) * progress);
    }

    fn reversed(&self) -> Option<Self> {
        None
    }
}

/// Calls a function with eased progress every frame.
#[derive(Clone)]
pub struct CustomTween {
    func: Rc<dyn Fn(&ActorRef, f64)>,
}

impl CustomTween {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&ActorRef, f64) + 'static,
    {
        Self { func: Rc::new(func) }
    }
}

impl Tween for CustomTween {
    fn start(&mut self, _target: &ActorRef) {}

    fn apply(&mut self, target: &ActorRef, progress: f64) {
        (self.func)(target, progress);
    }

    fn reversed(&self) -> Option<Self> {
        None
    }
}

impl fmt::Debug for CustomTween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomTween")
    }
}

//=========================================================================
// Constructors
//=========================================================================

impl Action {
    pub fn tween<T: Tween>(duration: f64, tween: T) -> Self {
        Action::new(ActionTween::new(tween, duration))
    }

    pub fn move_by(duration: f64, dx: f64, dy: f64) -> Self {
        Self::tween(duration, MoveBy::new(Vec2::new(dx, dy)))
    }

    pub fn move_to(duration: f64, x: f64, y: f64) -> Self {
        Self::tween(duration, MoveTo::new(Point::new(x, y)))
    }

    pub fn rotate_by(duration: f64, degrees: f64) -> Self {
        Self::tween(duration, RotateBy::new(degrees))
    }

    pub fn rotate_to(duration: f64, degrees: f64) -> Self {
        Self::tween(duration, RotateTo::new(degrees))
    }

    pub fn scale_by(duration: f64, factor_x: f64, factor_y: f64) -> Self {
        Self::tween(duration, ScaleBy::new(factor_x, factor_y))
    }

    pub fn scale_to(duration: f64, scale_x: f64, scale_y: f64) -> Self {
        Self::tween(duration, ScaleTo::new(scale_x, scale_y))
    }

    pub fn skew_by(duration: f64, degrees_x: f64, degrees_y: f64) -> Self {
        Self::tween(duration, SkewBy::new(degrees_x, degrees_y))
    }

    pub fn fade_to(duration: f64, opacity: f32) -> Self {
        Self::tween(duration, FadeTo::new(opacity))
    }

    pub fn fade_in(duration: f64) -> Self {
        Self::fade_to(duration, 1.0)
    }

    pub fn fade_out(duration: f64) -> Self {
        Self::fade_to(duration, 0.0)
    }

    /// Calls `func` with the eased progress every frame.
    ///
    /// # Panics
    ///
    /// `func` may query and control the action it belongs to, but calling
    /// `with_kind`, `clone` or `reverse` on that same action from inside
    /// `func` panics: its kind is mutably borrowed while it runs.
    pub fn custom<F>(duration: f64, func: F) -> Self
    where
        F: Fn(&ActorRef, f64) + 'static,
    {
        Self::tween(duration, CustomTween::new(func))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
