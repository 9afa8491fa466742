//! Panel transform - position, rotation and scale of one light panel

use glam::{DMat3, DMat4, DQuat, DVec3, EulerRot};

/// Complete panel transform with position, rotation, and scale
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelTransform {
    pub position: DVec3,
    pub rotation: DQuat,
    pub scale: DVec3,
}

impl Default for PanelTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl PanelTransform {
    /// Identity transform
    pub const IDENTITY: Self = Self {
        position: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
        scale: DVec3::ONE,
    };

    /// Create a new transform
    #[inline]
    pub const fn new(position: DVec3, rotation: DQuat, scale: DVec3) -> Self {
        Self { position, rotation, scale }
    }

    /// Set position (builder pattern)
    #[inline]
    pub fn with_position(mut self, position: DVec3) -> Self {
        self.position = position;
        self
    }

    /// Set rotation (builder pattern)
    #[inline]
    pub fn with_rotation(mut self, rotation: DQuat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set scale (builder pattern)
    #[inline]
    pub fn with_scale(mut self, scale: DVec3) -> Self {
        self.scale = scale;
        self
    }

    /// Convert to a 4x4 transformation matrix
    pub fn to_matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Parent-child composition: `self` applied after `child`
    pub fn compose(&self, child: &PanelTransform) -> PanelTransform {
        PanelTransform {
            position: self.position + self.rotation * (self.scale * child.position),
            rotation: (self.rotation * child.rotation).normalize(),
            scale: self.scale * child.scale,
        }
    }

    /// Transform a point from panel space to world space
    #[inline]
    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.position + self.rotation * (point * self.scale)
    }

    /// Map a world point back into panel space
    ///
    /// Axes with zero scale collapse to 0.
    pub fn inverse_transform_point(&self, point: DVec3) -> DVec3 {
        let local = self.rotation.inverse() * (point - self.position);
        DVec3::new(
            safe_div(local.x, self.scale.x),
            safe_div(local.y, self.scale.y),
            safe_div(local.z, self.scale.z),
        )
    }

    /// Panel normal (+Z in local space)
    #[inline]
    pub fn normal(&self) -> DVec3 {
        self.rotation * DVec3::Z
    }

    /// Rotation as XYZ Euler angles
    #[inline]
    pub fn euler(&self) -> DVec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        DVec3::new(x, y, z)
    }

    /// Replace the rotation from XYZ Euler angles
    #[inline]
    pub fn set_euler(&mut self, euler: DVec3) {
        self.rotation = DQuat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z);
    }
}

#[inline]
fn safe_div(a: f64, b: f64) -> f64 {
    if b.abs() > 1e-12 { a / b } else { 0.0 }
}

/// Rotation whose local +Z axis points from `eye` toward `target`
///
/// When the view direction is parallel to `up` the direction is nudged
/// slightly so the basis stays well defined. A degenerate `eye == target`
/// returns identity.
pub fn look_rotation(eye: DVec3, target: DVec3, up: DVec3) -> DQuat {
    let mut z = target - eye;
    if z.length_squared() == 0.0 {
        return DQuat::IDENTITY;
    }
    z = z.normalize();

    let mut x = up.cross(z);
    if x.length_squared() == 0.0 {
        if (up.z.abs() - 1.0).abs() < f64::EPSILON {
            z.x += 0.0001;
        } else {
            z.z += 0.0001;
        }
        z = z.normalize();
        x = up.cross(z);
    }
    x = x.normalize();
    let y = z.cross(x);

    DQuat::from_mat3(&DMat3::from_cols(x, y, z)).normalize()
}
