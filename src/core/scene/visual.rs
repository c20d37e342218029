//=========================================================================
// Visuals
//=========================================================================
//
// What an actor looks like. An actor without a visual is a pure grouping
// node; with one it draws, may refine its bounds and hit test, and gets a
// per-frame hook.
//
//   Sprite       → a texture frame drawn into the actor's size
//   ShapeVisual  → a kurbo path, filled and/or stroked
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;

use kurbo::{BezPath, Circle, Ellipse, Line, Point, Rect, Shape, Size, Vec2};

//=== Internal Dependencies ===============================================

use super::actor::ActorRef;
use crate::core::render::{Color, Frame, Renderer, Resource, TextureCache};

//=== Visual ==============================================================

/// Per-type rendering and hit-test behavior attached to an actor.
pub trait Visual: Any {
    /// Draws in local space. Transform and opacity are already set.
    fn on_render(&self, renderer: &mut dyn Renderer, size: Size);

    /// Local bounds for an actor of `size`.
    fn bounds(&self, size: Size) -> Rect {
        Rect::from_origin_size(Point::ZERO, size)
    }

    /// Precise local-space hit test. Defaults to the bounds.
    fn contains_local_point(&self, point: Point, size: Size) -> bool {
        self.bounds(size).contains(point)
    }

    /// Per-frame hook, run after the actor's update callback.
    ///
    /// The visual is detached from `actor` while this runs. Queries on that
    /// actor which consult its visual (`has_visual`, `bounds`,
    /// `contains_point`, `sprite_frame`) see a visual-less actor until the
    /// hook returns. Use `self` for visual state. A visual set on `actor`
    /// from inside the hook replaces this one.
    fn on_update(&mut self, _actor: &ActorRef, _dt: f64) {}

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

//=========================================================================
// Sprite
//=========================================================================

/// Draws the cropped region of a frame, stretched to the actor's size.
#[derive(Debug, Clone, Default)]
pub struct Sprite {
    frame: Frame,
}

impl Sprite {
    pub fn new(frame: Frame) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn set_frame(&mut self, frame: Frame) {
        self.frame = frame;
    }

    pub fn is_loaded(&self) -> bool {
        self.frame.is_loaded()
    }
}

impl Visual for Sprite {
    fn on_render(&self, renderer: &mut dyn Renderer, size: Size) {
        if let Some(texture) = self.frame.texture() {
            let dest = Rect::from_origin_size(Point::ZERO, size);
            renderer.draw_bitmap(texture, self.frame.crop_rect(), dest);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

//--- Sprite Helpers on ActorRef ------------------------------------------

impl ActorRef {
    /// Creates an actor showing `frame`, sized to the frame.
    pub fn new_sprite(frame: Frame) -> Self {
        let actor = ActorRef::from_visual(Sprite::new(frame));
        let size = frame.size();
        actor.set_size(size.width, size.height);
        actor
    }

    /// Replaces the sprite frame and resizes the actor to it.
    ///
    /// Returns `false` if the actor's visual is not a [`Sprite`].
    pub fn set_sprite_frame(&self, frame: Frame) -> bool {
        let replaced = self
            .with_visual_mut(|sprite: &mut Sprite| sprite.set_frame(frame))
            .is_some();
        if replaced {
            let size = frame.size();
            self.set_size(size.width, size.height);
        }
        replaced
    }

    /// Loads `resource` through `cache` into the sprite frame.
    ///
    /// On failure the sprite keeps its current frame and `false` is
    /// returned.
    pub fn load_sprite(&self, cache: &mut TextureCache, resource: &Resource) -> bool {
        let mut frame = Frame::new();
        frame.load(cache, resource) && self.set_sprite_frame(frame)
    }

    pub fn sprite_frame(&self) -> Option<Frame> {
        self.with_visual(|sprite: &Sprite| *sprite.frame())
    }
}

//=========================================================================
// ShapeVisual
//=========================================================================

/// Vector shape, filled then stroked.
#[derive(Debug, Clone)]
pub struct ShapeVisual {
    path: BezPath,
    fill: Option<Color>,
    stroke: Option<Color>,
    stroke_width: f64,
}

const TOLERANCE: f64 = 0.1;

impl ShapeVisual {
    pub fn from_path(path: BezPath) -> Self {
        Self {
            path,
            fill: Some(Color::WHITE),
            stroke: None,
            stroke_width: 1.0,
        }
    }

    pub fn rect(size: Size) -> Self {
        Self::from_path(Rect::from_origin_size(Point::ZERO, size).to_path(TOLERANCE))
    }

    /// Circle whose bounding box starts at the origin.
    pub fn circle(radius: f64) -> Self {
        Self::from_path(Circle::new((radius, radius), radius).to_path(TOLERANCE))
    }

    pub fn ellipse(radii: Vec2) -> Self {
        Self::from_path(Ellipse::new(radii.to_point(), radii, 0.0).to_path(TOLERANCE))
    }

    /// Stroked line segment (no fill).
    pub fn line(from: Point, to: Point) -> Self {
        Self {
            fill: None,
            stroke: Some(Color::WHITE),
            ..Self::from_path(Line::new(from, to).to_path(TOLERANCE))
        }
    }

    /// Closed polygon through `points`; an empty path for fewer than 3.
    pub fn polygon(points: &[Point]) -> Self {
        let mut path = BezPath::new();
        if points.len() >= 3 {
            path.move_to(points[0]);
            for &point in &points[1..] {
                path.line_to(point);
            }
            path.close_path();
        }
        Self::from_path(path)
    }

    pub fn with_fill(mut self, color: Option<Color>) -> Self {
        self.fill = color;
        self
    }

    pub fn with_stroke(mut self, color: Option<Color>, width: f64) -> Self {
        self.stroke = color;
        self.stroke_width = width;
        self
    }

    pub fn path(&self) -> &BezPath {
        &self.path
    }

    pub fn set_path(&mut self, path: BezPath) {
        self.path = path;
    }

    pub fn fill(&self) -> Option<Color> {
        self.fill
    }

    pub fn stroke(&self) -> Option<Color> {
        self.stroke
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    /// Size of the path's bounding box.
    pub fn natural_size(&self) -> Size {
        let bbox = self.path.bounding_box();
        Size::new(bbox.x1.max(0.0), bbox.y1.max(0.0))
    }
}

impl Visual for ShapeVisual {
    fn on_render(&self, renderer: &mut dyn Renderer, _size: Size) {
        if let Some(fill) = self.fill {
            renderer.fill_shape(&self.path, fill);
        }
        if let Some(stroke) = self.stroke {
            renderer.draw_shape(&self.path, stroke, self.stroke_width);
        }
    }

    fn bounds(&self, _size: Size) -> Rect {
        self.path.bounding_box()
    }

    fn contains_local_point(&self, point: Point, _size: Size) -> bool {
        self.path.contains(point)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

//--- Shape Helpers on ActorRef -------------------------------------------

impl ActorRef {
    /// Creates an actor showing `shape`, sized to the shape's extent.
    pub fn new_shape(shape: ShapeVisual) -> Self {
        let size = shape.natural_size();
        let actor = ActorRef::from_visual(shape);
        actor.set_size(size.width, size.height);
        actor
    }

    /// Replaces the shape path and resizes the actor to it.
    ///
    /// Returns `false` if the actor's visual is not a [`ShapeVisual`].
    pub fn set_shape_path(&self, path: BezPath) -> bool {
        let size = self.with_visual_mut(|shape: &mut ShapeVisual| {
            shape.set_path(path);
            shape.natural_size()
        });
        match size {
            Some(size) => {
                self.set_size(size.width, size.height);
                true
            }
            None => false,
        }
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
    use crate::core::render::Texture;
    use std::sync::Arc;

    fn texture() -> Texture {
        Texture::new(7, Size::new(64.0, 32.0))
    }

    /// Records what the actor looks like from inside its own hook.
    struct HookRecorder {
        saw_visual: std::rc::Rc<std::cell::Cell<Option<bool>>>,
        replace: bool,
    }

    impl Visual for HookRecorder {
        fn on_render(&self, _renderer: &mut dyn Renderer, _size: Size) {}

        fn on_update(&mut self, actor: &ActorRef, _dt: f64) {
            self.saw_visual.set(Some(actor.has_visual()));
            if self.replace {
                actor.set_visual(Sprite::default());
            }
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    //--- Update Hook ------------------------------------------------------

    #[test]
    fn visual_is_detached_while_its_hook_runs() {
        let saw_visual = std::rc::Rc::new(std::cell::Cell::new(None));
        let actor = ActorRef::new();
        actor.set_visual(HookRecorder { saw_visual: saw_visual.clone(), replace: false });

        actor.update(0.016);
        assert_eq!(saw_visual.get(), Some(false));
        assert!(actor.with_visual(|_: &HookRecorder| ()).is_some());
    }

    #[test]
    fn visual_set_from_hook_replaces_the_running_one() {
        let saw_visual = std::rc::Rc::new(std::cell::Cell::new(None));
        let actor = ActorRef::new();
        actor.set_visual(HookRecorder { saw_visual, replace: true });

        actor.update(0.016);
        assert!(actor.with_visual(|_: &HookRecorder| ()).is_none());
        assert!(actor.with_visual(|_: &Sprite| ()).is_some());
    }

    //--- Sprite -----------------------------------------------------------

    #[test]
    fn sprite_takes_frame_size_and_draws_crop() {
        let mut frame = Frame::from_texture(texture());
        frame.set_crop_rect(Rect::new(0.0, 0.0, 16.0, 16.0));
        let actor = ActorRef::new_sprite(frame);

        assert_eq!(actor.size(), Size::new(16.0, 16.0));

        let mut renderer = RecordingRenderer::default();
        actor.render(&mut renderer);
        assert_eq!(
            renderer.bitmaps(),
            vec![(7, Rect::new(0.0, 0.0, 16.0, 16.0), Rect::new(0.0, 0.0, 16.0, 16.0))]
        );
    }

    #[test]
    fn unloaded_sprite_draws_nothing() {
        let actor = ActorRef::new_sprite(Frame::new());
        let mut renderer = RecordingRenderer::default();
        actor.render(&mut renderer);
        assert!(renderer.bitmaps().is_empty());
    }

    #[test]
    fn set_sprite_frame_only_on_sprites() {
        let sprite = ActorRef::new_sprite(Frame::new());
        assert!(sprite.set_sprite_frame(Frame::from_texture(texture())));
        assert_eq!(sprite.size(), Size::new(64.0, 32.0));

        let plain = ActorRef::new();
        assert!(!plain.set_sprite_frame(Frame::from_texture(texture())));
        assert_eq!(plain.size(), Size::ZERO);
    }

    #[test]
    fn failed_load_keeps_previous_frame() {
        let mut cache = TextureCache::new(Arc::new(StubLoader::default()));
        let actor = ActorRef::new_sprite(Frame::new());

        assert!(actor.load_sprite(&mut cache, &Resource::file("hero.png")));
        let loaded = actor.sprite_frame();

        assert!(!actor.load_sprite(&mut cache, &Resource::file("missing.txt")));
        assert_eq!(actor.sprite_frame(), loaded);
    }

    //--- Shape ------------------------------------------------------------

    #[test]
    fn shape_fills_then_strokes() {
        let shape = ShapeVisual::rect(Size::new(10.0, 10.0))
            .with_fill(Some(Color::BLUE))
            .with_stroke(Some(Color::BLACK), 3.0);
        let actor = ActorRef::new_shape(shape);
        assert_eq!(actor.size(), Size::new(10.0, 10.0));

        let mut renderer = RecordingRenderer::default();
        actor.render(&mut renderer);

        assert!(matches!(renderer.calls[2], DrawCall::FillShape { color, .. } if color == Color::BLUE));
        assert!(matches!(renderer.calls[3], DrawCall::DrawShape { stroke_width, .. } if stroke_width == 3.0));
    }

    #[test]
    fn circle_hit_test_is_precise() {
        let actor = ActorRef::new_shape(ShapeVisual::circle(10.0));
        assert!((actor.width() - 20.0).abs() < 1e-6);
        assert!((actor.height() - 20.0).abs() < 1e-6);

        assert!(actor.contains_point(Point::new(10.0, 10.0)));
        // Inside the bounding box, outside the circle.
        assert!(!actor.contains_point(Point::new(1.0, 1.0)));
    }

    #[test]
    fn polygon_needs_three_points() {
        let empty = ShapeVisual::polygon(&[Point::ZERO, Point::new(1.0, 1.0)]);
        assert_eq!(empty.natural_size(), Size::ZERO);

        let triangle = ShapeVisual::polygon(&[
            Point::ZERO,
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ]);
        assert_eq!(triangle.natural_size(), Size::new(10.0, 10.0));
    }

    #[test]
    fn set_shape_path_resizes() {
        let actor = ActorRef::new_shape(ShapeVisual::rect(Size::new(5.0, 5.0)));
        let path = Rect::new(0.0, 0.0, 8.0, 2.0).to_path(0.1);
        assert!(actor.set_shape_path(path));
        assert_eq!(actor.size(), Size::new(8.0, 2.0));
    }
}
