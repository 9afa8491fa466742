//! # lightform_math - Placement Math
//!
//! Leaf math shared by every other Lightform crate:
//! - **Spherical placement**: normalized lat/lon <-> (phi, theta) <-> cartesian
//! - **Easing**: named cubic-bezier curves used by signal animation
//! - **Panel transforms**: pure position/rotation/scale values for light panels
//!
//! Placement runs in `f64` so that round-trips through the editor's
//! drag handles stay exact; pixel work downstream uses `f32`.

pub mod spherical;
pub mod easing;
pub mod transform;

pub use spherical::*;
pub use easing::*;
pub use transform::*;

pub use glam::{DMat4, DQuat, DVec2, DVec3, Vec2, Vec3, Vec4};

/// Common math constants
pub mod consts {
    pub const PI: f64 = core::f64::consts::PI;
    pub const TAU: f64 = PI * 2.0;
    pub const FRAC_PI_2: f64 = PI / 2.0;
    pub const EPSILON: f64 = 1e-6;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Clamp value between min and max
#[inline]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value < min { min }
    else if value > max { max }
    else { value }
}

/// Remap `x` from `[a1, a2]` to `[b1, b2]` without clamping
#[inline]
pub fn map_linear(x: f64, a1: f64, a2: f64, b1: f64, b2: f64) -> f64 {
    b1 + (x - a1) * (b2 - b1) / (a2 - a1)
}

/// Smooth step interpolation
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// GLSL-style fractional part (always in `[0, 1)`)
#[inline]
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Compare two values within an absolute tolerance
#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

/// Deterministic 64-bit FNV-1a hash of a string key
pub fn fnv1a(key: &str) -> u64 {
    let mut hash = 0xcbf29ce484222325u64;
    for byte in key.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

pub mod prelude {
    pub use crate::spherical::{
        LatLon, SphericalAngles, latlon_to_phi_theta, phi_theta_to_latlon,
        spherical_to_cartesian, cartesian_to_spherical,
    };
    pub use crate::easing::Easing;
    pub use crate::transform::{PanelTransform, look_rotation};
    pub use crate::{lerp, clamp, map_linear, smoothstep, fract};
}
