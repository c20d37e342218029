//=========================================================================
// Transform Descriptor
//=========================================================================
//
// Position / rotation / skew / scale of an actor relative to its parent.
//
// Matrix composition (column vectors, applied right to left):
//   local = translate(position) · rotate(rotation) · skew(skew) · scale(scale)
//
// Angles are in degrees.
//
//=========================================================================

//=== External Dependencies ===============================================

use kurbo::{Affine, Point, Vec2};

//=== Transform ===========================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Point,

    /// Clockwise rotation in degrees (y axis points down).
    pub rotation: f64,

    pub scale: Vec2,

    /// Horizontal and vertical skew angles in degrees.
    pub skew: Vec2,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Point::ZERO,
        rotation: 0.0,
        scale: Vec2::new(1.0, 1.0),
        skew: Vec2::ZERO,
    };

    /// Translation-only transform.
    pub fn from_position(position: Point) -> Self {
        Self { position, ..Self::IDENTITY }
    }

    /// Full local matrix.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.position.to_vec2())
            * Affine::rotate(self.rotation.to_radians())
            * Affine::skew(
                self.skew.x.to_radians().tan(),
                self.skew.y.to_radians().tan(),
            )
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
    }

    /// Returns `true` if only the position differs from identity.
    pub fn is_translation_only(&self) -> bool {
        self.rotation == 0.0 && self.scale == Vec2::new(1.0, 1.0) && self.skew == Vec2::ZERO
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
