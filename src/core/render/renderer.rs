//=========================================================================
// Renderer Interface
//=========================================================================
//
// The narrow surface the scene graph draws through.
//
// The engine never creates GPU resources itself. Hosts implement
// `Renderer` on top of whatever backend they use; the actor tree only
// pushes a transform and an opacity before each actor draws its visual.
//
// Frame protocol:
//   begin_draw() → [set_transform / set_opacity / draw_* ]* → end_draw()
//
//=========================================================================

//=== External Dependencies ===============================================

use kurbo::{Affine, BezPath, Rect, Shape};

//=== Internal Dependencies ===============================================

use super::texture::Texture;
use crate::core::error::RenderError;

//=== Color ===============================================================

/// Straight (non-premultiplied) RGBA color, components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from a packed `0xRRGGBB` value.
    pub fn from_rgb_u32(rgb: u32) -> Self {
        let channel = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.0;
        Self::rgb(channel(16), channel(8), channel(0))
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

//=== Renderer ============================================================

/// Drawing backend used by [`ActorRef::render`](crate::core::scene::ActorRef::render).
///
/// All geometry is in the current actor's local space; the backend applies
/// the transform set by the last `set_transform` call and multiplies every
/// draw by the last `set_opacity`.
pub trait Renderer {
    /// Starts a frame.
    fn begin_draw(&mut self);

    /// Finishes a frame. Device loss and backend failures surface here.
    fn end_draw(&mut self) -> Result<(), RenderError>;

    /// Sets the local-to-window transform for subsequent draws.
    fn set_transform(&mut self, transform: Affine);

    /// Sets the opacity (0..=1) for subsequent draws.
    fn set_opacity(&mut self, opacity: f32);

    /// Strokes a path.
    fn draw_shape(&mut self, shape: &BezPath, color: Color, stroke_width: f64);

    /// Fills a path.
    fn fill_shape(&mut self, shape: &BezPath, color: Color);

    /// Draws the `src` region of a texture into `dest`.
    fn draw_bitmap(&mut self, texture: &Texture, src: Rect, dest: Rect);

    //--- Provided ---------------------------------------------------------

    fn draw_rect(&mut self, rect: Rect, color: Color, stroke_width: f64) {
        self.draw_shape(&rect.to_path(0.1), color, stroke_width);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.fill_shape(&rect.to_path(0.1), color);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
