//! Spherical placement
//!
//! A light is placed on the environment sphere by a normalized coordinate
//! `latlon = (x, y)` in `[-1, 1]²`. The mapping to spherical angles is
//!
//! ```text
//! phi   = mapLinear(y, -1, 1, π, 0)          y = +1 is the north pole
//! theta = mapLinear(x, -1, 1, π/2, -3π/2)
//! ```
//!
//! and angles become positions with the "set from spherical coords"
//! convention `r · (sinφ·sinθ, cosφ, sinφ·cosθ)`. With both choices a
//! light at `(x, y)` lands in the equirectangular image at
//! `((x + 1) / 2, (1 - y) / 2)`, so dragging in the HDRI view and
//! placement agree.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::consts::{PI, TAU};
use crate::map_linear;

/// Lower bound of the theta range produced by [`latlon_to_phi_theta`]
pub const THETA_MIN: f64 = -1.5 * PI;
/// Upper bound of the theta range produced by [`latlon_to_phi_theta`]
pub const THETA_MAX: f64 = 0.5 * PI;

/// Normalized placement coordinate, both axes in `[-1, 1]`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub x: f64,
    pub y: f64,
}

impl LatLon {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both axes into `[-1, 1]`
    #[inline]
    pub fn clamped(self) -> Self {
        Self::new(self.x.clamp(-1.0, 1.0), self.y.clamp(-1.0, 1.0))
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Polar (`phi`, from +Y) and azimuthal (`theta`) angles in radians
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SphericalAngles {
    pub phi: f64,
    pub theta: f64,
}

impl SphericalAngles {
    #[inline]
    pub const fn new(phi: f64, theta: f64) -> Self {
        Self { phi, theta }
    }
}

/// Convert a normalized lat/lon to spherical angles
#[inline]
pub fn latlon_to_phi_theta(latlon: LatLon) -> SphericalAngles {
    SphericalAngles {
        phi: map_linear(latlon.y, -1.0, 1.0, PI, 0.0),
        theta: map_linear(latlon.x, -1.0, 1.0, THETA_MAX, THETA_MIN),
    }
}

/// Inverse of [`latlon_to_phi_theta`]
///
/// Theta values outside `[-3π/2, π/2]` are wrapped by whole turns first,
/// so any azimuth maps back into `x ∈ [-1, 1]`.
pub fn phi_theta_to_latlon(angles: SphericalAngles) -> LatLon {
    let theta = wrap_theta(angles.theta);
    LatLon {
        x: map_linear(theta, THETA_MAX, THETA_MIN, -1.0, 1.0),
        y: map_linear(angles.phi, PI, 0.0, -1.0, 1.0),
    }
}

/// Wrap theta into `[-3π/2, π/2]`, leaving values already inside untouched
pub fn wrap_theta(theta: f64) -> f64 {
    if !theta.is_finite() || (THETA_MIN..=THETA_MAX).contains(&theta) {
        return theta;
    }
    let wrapped = (theta - THETA_MIN).rem_euclid(TAU) + THETA_MIN;
    if wrapped > THETA_MAX { wrapped - TAU } else { wrapped }
}

/// Spherical to cartesian, `radius · (sinφ·sinθ, cosφ, sinφ·cosθ)`
#[inline]
pub fn spherical_to_cartesian(radius: f64, angles: SphericalAngles) -> DVec3 {
    let (sin_phi, cos_phi) = angles.phi.sin_cos();
    let (sin_theta, cos_theta) = angles.theta.sin_cos();
    DVec3::new(
        radius * sin_phi * sin_theta,
        radius * cos_phi,
        radius * sin_phi * cos_theta,
    )
}

/// Cartesian to spherical; returns `(radius, angles)`
///
/// The zero vector yields radius 0 with both angles 0.
pub fn cartesian_to_spherical(v: DVec3) -> (f64, SphericalAngles) {
    let radius = v.length();
    if radius == 0.0 {
        return (0.0, SphericalAngles::default());
    }
    let theta = v.x.atan2(v.z);
    let phi = (v.y / radius).clamp(-1.0, 1.0).acos();
    (radius, SphericalAngles { phi, theta })
}

/// Unit direction for a lat/lon
#[inline]
pub fn latlon_to_direction(latlon: LatLon) -> DVec3 {
    spherical_to_cartesian(1.0, latlon_to_phi_theta(latlon))
}

/// Lat/lon of a world direction (used when dragging in the HDRI view)
pub fn direction_to_latlon(direction: DVec3) -> LatLon {
    let (_, angles) = cartesian_to_spherical(direction);
    phi_theta_to_latlon(angles)
}

/// Normalized equirectangular image position (top-left origin) of a lat/lon
#[inline]
pub fn latlon_to_equirect_uv(latlon: LatLon) -> DVec2 {
    DVec2::new((latlon.x + 1.0) * 0.5, (1.0 - latlon.y) * 0.5)
}

/// Inverse of [`latlon_to_equirect_uv`]
#[inline]
pub fn equirect_uv_to_latlon(uv: DVec2) -> LatLon {
    LatLon::new(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0)
}
