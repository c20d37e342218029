//=========================================================================
// Recording Renderer (test double)
//=========================================================================

use kurbo::{Affine, BezPath, Rect, Shape};

use super::renderer::{Color, Renderer};
use super::texture::Texture;
use crate::core::error::RenderError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawCall {
    Begin,
    End,
    Transform(Affine),
    Opacity(f32),
    DrawShape { bounds: Rect, color: Color, stroke_width: f64 },
    FillShape { bounds: Rect, color: Color },
    Bitmap { texture: u64, src: Rect, dest: Rect },
}

/// Renderer that records every call; optionally fails `end_draw`.
#[derive(Debug, Default)]
pub(crate) struct RecordingRenderer {
    pub calls: Vec<DrawCall>,
    pub fail_end: Option<RenderError>,
}

impl RecordingRenderer {
    pub fn opacities(&self) -> Vec<f32> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Opacity(o) => Some(*o),
                _ => None,
            })
            .collect()
    }

    pub fn bitmaps(&self) -> Vec<(u64, Rect, Rect)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Bitmap { texture, src, dest } => Some((*texture, *src, *dest)),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn begin_draw(&mut self) {
        self.calls.push(DrawCall::Begin);
    }

    fn end_draw(&mut self) -> Result<(), RenderError> {
        self.calls.push(DrawCall::End);
        match self.fail_end.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn set_transform(&mut self, transform: Affine) {
        self.calls.push(DrawCall::Transform(transform));
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.calls.push(DrawCall::Opacity(opacity));
    }

    fn draw_shape(&mut self, shape: &BezPath, color: Color, stroke_width: f64) {
        self.calls.push(DrawCall::DrawShape {
            bounds: shape.bounding_box(),
            color,
            stroke_width,
        });
    }

    fn fill_shape(&mut self, shape: &BezPath, color: Color) {
        self.calls.push(DrawCall::FillShape {
            bounds: shape.bounding_box(),
            color,
        });
    }

    fn draw_bitmap(&mut self, texture: &Texture, src: Rect, dest: Rect) {
        self.calls.push(DrawCall::Bitmap {
            texture: texture.id(),
            src,
            dest,
        });
    }
}
