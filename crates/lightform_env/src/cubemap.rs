//! Float cubemap storage and direction lookup
//!
//! Faces follow the usual GPU order and orientation (+X, -X, +Y, -Y, +Z, -Z;
//! texel row 0 is `t = 0`), so a face's `(s, t)` grid maps to the same
//! directions a hardware cube sampler would use.

use glam::{DVec2, DVec3, Vec4};

use crate::error::{EnvError, EnvResult};

/// One side of a cubemap
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// Faces in storage order
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Unnormalized direction through face coordinates `(s, t)` in `[0, 1]`
    pub fn direction(self, s: f64, t: f64) -> DVec3 {
        let sc = 2.0 * s - 1.0;
        let tc = 2.0 * t - 1.0;
        match self {
            Self::PositiveX => DVec3::new(1.0, -tc, -sc),
            Self::NegativeX => DVec3::new(-1.0, -tc, sc),
            Self::PositiveY => DVec3::new(sc, 1.0, tc),
            Self::NegativeY => DVec3::new(sc, -1.0, -tc),
            Self::PositiveZ => DVec3::new(sc, -tc, 1.0),
            Self::NegativeZ => DVec3::new(-sc, -tc, -1.0),
        }
    }

    /// Face hit by `direction` and the `(s, t)` coordinates on it
    pub fn locate(direction: DVec3) -> (CubeFace, DVec2) {
        let a = direction.abs();
        let (face, sc, tc, ma) = if a.x >= a.y && a.x >= a.z {
            if direction.x >= 0.0 {
                (Self::PositiveX, -direction.z, -direction.y, a.x)
            } else {
                (Self::NegativeX, direction.z, -direction.y, a.x)
            }
        } else if a.y >= a.z {
            if direction.y >= 0.0 {
                (Self::PositiveY, direction.x, direction.z, a.y)
            } else {
                (Self::NegativeY, direction.x, -direction.z, a.y)
            }
        } else if direction.z >= 0.0 {
            (Self::PositiveZ, direction.x, -direction.y, a.z)
        } else {
            (Self::NegativeZ, -direction.x, -direction.y, a.z)
        };

        if ma == 0.0 {
            return (face, DVec2::splat(0.5));
        }
        (face, DVec2::new((sc / ma + 1.0) * 0.5, (tc / ma + 1.0) * 0.5))
    }
}

/// Six square faces of linear RGBA texels
#[derive(Clone, Debug, PartialEq)]
pub struct Cubemap {
    size: u32,
    texels: Vec<Vec4>,
}

impl Cubemap {
    /// Transparent black cubemap with `size`×`size` faces
    pub fn new(size: u32) -> EnvResult<Self> {
        if size == 0 {
            return Err(EnvError::InvalidFaceSize(size));
        }
        let n = size as usize;
        Ok(Self { size, texels: vec![Vec4::ZERO; 6 * n * n] })
    }

    /// Cubemap where every texel is `color`
    pub fn filled(size: u32, color: Vec4) -> EnvResult<Self> {
        let mut cube = Self::new(size)?;
        cube.texels.fill(color);
        Ok(cube)
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    fn face_len(&self) -> usize {
        (self.size as usize).pow(2)
    }

    /// Row-major texels of one face
    pub fn face(&self, face: CubeFace) -> &[Vec4] {
        let len = self.face_len();
        &self.texels[face.index() * len..(face.index() + 1) * len]
    }

    pub fn face_mut(&mut self, face: CubeFace) -> &mut [Vec4] {
        let len = self.face_len();
        &mut self.texels[face.index() * len..(face.index() + 1) * len]
    }

    /// All six faces as mutable slices, in storage order
    pub fn faces_mut(&mut self) -> impl Iterator<Item = (CubeFace, &mut [Vec4])> + '_ {
        let len = self.face_len();
        CubeFace::ALL.into_iter().zip(self.texels.chunks_mut(len))
    }

    #[inline]
    pub fn texel(&self, face: CubeFace, x: u32, y: u32) -> Vec4 {
        let n = self.size;
        self.face(face)[(y.min(n - 1) * n + x.min(n - 1)) as usize]
    }

    /// Direction through the center of texel `(x, y)` on `face`
    pub fn texel_direction(&self, face: CubeFace, x: u32, y: u32) -> DVec3 {
        let n = self.size as f64;
        face.direction((x as f64 + 0.5) / n, (y as f64 + 0.5) / n).normalize()
    }

    /// Bilinear lookup along `direction`, filtered within the hit face
    pub fn sample(&self, direction: DVec3) -> Vec4 {
        if !direction.is_finite() {
            return Vec4::ZERO;
        }
        let (face, st) = CubeFace::locate(direction);
        let n = self.size as f64;
        let max = (self.size - 1) as f64;
        let x = (st.x * n - 0.5).clamp(0.0, max);
        let y = (st.y * n - 0.5).clamp(0.0, max);
        let (x0, y0) = (x.floor(), y.floor());
        let (fx, fy) = ((x - x0) as f32, (y - y0) as f32);
        let (xa, ya) = (x0 as u32, y0 as u32);

        let top = self.texel(face, xa, ya).lerp(self.texel(face, xa + 1, ya), fx);
        let bottom = self.texel(face, xa, ya + 1).lerp(self.texel(face, xa + 1, ya + 1), fx);
        top.lerp(bottom, fy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_centers() {
        let expected = [DVec3::X, -DVec3::X, DVec3::Y, -DVec3::Y, DVec3::Z, -DVec3::Z];
        for (face, axis) in CubeFace::ALL.into_iter().zip(expected) {
            assert_eq!(face.direction(0.5, 0.5), axis);
            let (hit, st) = CubeFace::locate(axis);
            assert_eq!(hit, face);
            assert_eq!(st, DVec2::splat(0.5));
        }
    }

    #[test]
    fn test_locate_inverts_direction() {
        for face in CubeFace::ALL {
            for &(s, t) in &[(0.1, 0.2), (0.9, 0.3), (0.5, 0.95)] {
                let (hit, st) = CubeFace::locate(face.direction(s, t) * 3.0);
                assert_eq!(hit, face);
                assert!((st - DVec2::new(s, t)).length() < 1e-12);
            }
        }
    }

    #[test]
    fn test_zero_face_size_rejected() {
        assert!(matches!(Cubemap::new(0), Err(EnvError::InvalidFaceSize(0))));
    }

    #[test]
    fn test_sample_picks_face() {
        let mut cube = Cubemap::new(4).unwrap();
        cube.face_mut(CubeFace::NegativeZ).fill(Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(cube.sample(-DVec3::Z), Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(cube.sample(DVec3::Z), Vec4::ZERO);
    }

    #[test]
    fn test_texel_direction_round_trip() {
        let cube = Cubemap::new(8).unwrap();
        let d = cube.texel_direction(CubeFace::PositiveY, 2, 5);
        let (face, st) = CubeFace::locate(d);
        assert_eq!(face, CubeFace::PositiveY);
        assert!((st.x * 8.0 - 2.5).abs() < 1e-9);
        assert!((st.y * 8.0 - 5.5).abs() < 1e-9);
    }
}
