//! Panel placement
//!
//! Turns a light's parameters into the transform and outline of its
//! emissive panel. Everything here is a pure function of the light, so the
//! preview, the HDRI view and code generation all agree on where a light is.

use glam::{DQuat, DVec2, DVec3, Vec2};

use lightform_math::{look_rotation, spherical_to_cartesian, PanelTransform};
use lightform_scene::{Light, Shape};

/// Inner radius of a ring panel, relative to its outer radius
pub const RING_INNER_RADIUS: f64 = 0.5;

/// Panel outline in local space
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelGeometry {
    /// 1×1 quad centered on the origin
    Rect,
    /// Disc of radius 1
    Circle,
    /// Annulus between [`RING_INNER_RADIUS`] and 1
    Ring,
}

impl From<Shape> for PanelGeometry {
    fn from(shape: Shape) -> Self {
        match shape {
            Shape::Rectangle => Self::Rect,
            Shape::Circle => Self::Circle,
            Shape::Ring => Self::Ring,
        }
    }
}

impl PanelGeometry {
    /// UV of a local-space point, or `None` if it lies outside the panel
    pub fn uv(self, local: DVec2) -> Option<Vec2> {
        match self {
            Self::Rect => {
                if local.x.abs() > 0.5 || local.y.abs() > 0.5 {
                    return None;
                }
                Some((local + DVec2::splat(0.5)).as_vec2())
            }
            Self::Circle | Self::Ring => {
                let r2 = local.length_squared();
                if r2 > 1.0 {
                    return None;
                }
                if self == Self::Ring && r2 < RING_INNER_RADIUS * RING_INNER_RADIUS {
                    return None;
                }
                Some(((local + DVec2::ONE) * 0.5).as_vec2())
            }
        }
    }
}

#[inline]
fn non_negative(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

/// Static world transform of a light's panel
///
/// The panel sits on the sphere of radius `distance`, its +Z axis faces
/// `target`, and `rotation` rolls it about that axis.
pub fn panel_transform(light: &Light) -> PanelTransform {
    let position = spherical_to_cartesian(non_negative(light.distance), light.angles());
    let target = DVec3::from_array(light.target);
    let target = if target.is_finite() { target } else { DVec3::ZERO };

    let roll = if light.rotation.is_finite() { light.rotation } else { 0.0 };
    let rotation = look_rotation(position, target, DVec3::Y) * DQuat::from_rotation_z(roll);

    let s = non_negative(light.scale);
    let scale = DVec3::new(s * non_negative(light.scale_x), s * non_negative(light.scale_y), s);

    PanelTransform::new(position, rotation, scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightform_scene::LightKind;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_position_on_sphere() {
        let light = Light::new("a", "A", LightKind::default()).with_latlon(0.3, 0.4);
        let t = panel_transform(&light);
        assert!((t.position.length() - light.distance).abs() < EPS);
    }

    #[test]
    fn test_faces_target() {
        let mut light = Light::new("a", "A", LightKind::default()).with_latlon(-0.2, 0.1);
        light.target = [0.0, 1.0, 0.0];
        light.rotation = 0.8;
        let t = panel_transform(&light);
        let to_target = (DVec3::Y - t.position).normalize();
        assert!((t.normal() - to_target).length() < 1e-9);
    }

    #[test]
    fn test_scale_and_clamp() {
        let mut light = Light::new("a", "A", LightKind::default());
        light.scale = 2.0;
        light.scale_x = 3.0;
        light.scale_y = -1.0;
        let t = panel_transform(&light);
        assert_eq!(t.scale, DVec3::new(6.0, 0.0, 2.0));
    }

    #[test]
    fn test_roll_is_about_view_axis() {
        let light = Light::new("a", "A", LightKind::default());
        let mut rolled = light.clone();
        rolled.rotation = 1.0;
        let a = panel_transform(&light);
        let b = panel_transform(&rolled);
        assert!((a.normal() - b.normal()).length() < EPS);
        assert!((a.rotation * DVec3::X - b.rotation * DVec3::X).length() > 0.5);
    }

    #[test]
    fn test_geometry_uv() {
        assert_eq!(PanelGeometry::Rect.uv(DVec2::ZERO), Some(Vec2::splat(0.5)));
        assert_eq!(PanelGeometry::Rect.uv(DVec2::new(0.6, 0.0)), None);
        assert_eq!(PanelGeometry::Circle.uv(DVec2::new(0.0, 1.0)), Some(Vec2::new(0.5, 1.0)));
        assert_eq!(PanelGeometry::Ring.uv(DVec2::new(0.2, 0.0)), None);
        assert!(PanelGeometry::Ring.uv(DVec2::new(0.75, 0.0)).is_some());
    }
}
