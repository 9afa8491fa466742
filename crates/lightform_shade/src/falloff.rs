//! Area-light falloff functions for the scrim shader
//!
//! Every falloff takes the sample position relative to the light, in
//! centered panel coordinates, plus the light's height `h` above the panel.
//! The scrim shader only talks to the [`Falloff`] trait, so forms can be
//! swapped without touching anything else.

use glam::Vec2;

/// Constant attenuation of the segment light
const KC: f32 = 1.0;
/// Linear attenuation of the segment light
const KL: f32 = 0.3;
/// Quadratic attenuation of the segment light
const KQ: f32 = 1.8;

/// Irradiance profile of a light hovering at height `h`
pub trait Falloff: Send + Sync {
    fn evaluate(&self, p: Vec2, h: f32) -> f32;
}

/// Point light: `h / (|p|² + h²)^1.5`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointFalloff;

impl Falloff for PointFalloff {
    #[inline]
    fn evaluate(&self, p: Vec2, h: f32) -> f32 {
        let d2 = p.length_squared() + h * h;
        h / (d2 * d2.sqrt())
    }
}

/// Segment (rod) light from `a` to `b`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RodFalloff {
    pub a: Vec2,
    pub b: Vec2,
}

impl Default for RodFalloff {
    fn default() -> Self {
        Self {
            a: Vec2::new(-0.5, 0.0),
            b: Vec2::new(0.5, 0.0),
        }
    }
}

impl Falloff for RodFalloff {
    fn evaluate(&self, p: Vec2, h: f32) -> f32 {
        let ba = self.b - self.a;
        let len2 = ba.length_squared();
        let u = if len2 > 0.0 { ((p - self.a).dot(ba) / len2).clamp(0.0, 1.0) } else { 0.0 };
        let closest = self.a + ba * u;

        let d = ((p - closest).length_squared() + h * h).sqrt();
        if d <= f32::EPSILON {
            return 1.0 / KC;
        }
        let lambert = h / d;
        lambert / (KC + KL * d + KQ * d * d)
    }
}

/// Rectangular area light with half extents `half`
///
/// Integrated with the antiderivative
/// `F(x, y) = atan(x·y / (h·√(x² + y² + h²)))` evaluated at the corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectFalloff {
    pub half: Vec2,
}

impl Default for RectFalloff {
    fn default() -> Self {
        Self { half: Vec2::splat(0.5) }
    }
}

#[inline]
fn rect_antiderivative(x: f32, y: f32, h: f32) -> f32 {
    (x * y / (h * (x * x + y * y + h * h).sqrt())).atan()
}

impl Falloff for RectFalloff {
    fn evaluate(&self, p: Vec2, h: f32) -> f32 {
        let h = h.max(1e-6);
        let x1 = -self.half.x - p.x;
        let x2 = self.half.x - p.x;
        let y1 = -self.half.y - p.y;
        let y2 = self.half.y - p.y;
        rect_antiderivative(x2, y2, h) - rect_antiderivative(x1, y2, h) - rect_antiderivative(x2, y1, h)
            + rect_antiderivative(x1, y1, h)
    }
}

/// Selectable falloff form
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum FalloffKind {
    #[default]
    Point,
    Rod(RodFalloff),
    Rect(RectFalloff),
}

impl Falloff for FalloffKind {
    #[inline]
    fn evaluate(&self, p: Vec2, h: f32) -> f32 {
        match self {
            Self::Point => PointFalloff.evaluate(p, h),
            Self::Rod(f) => f.evaluate(p, h),
            Self::Rect(f) => f.evaluate(p, h),
        }
    }
}
