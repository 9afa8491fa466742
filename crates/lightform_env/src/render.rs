//! Cube rasterizer
//!
//! Renders an [`EnvironmentScene`] into a [`Cubemap`] as seen from the
//! origin. Each texel casts a ray along its direction:
//!
//! 1. start from the background color
//! 2. blend sky backdrops (at infinity, no depth)
//! 3. intersect every flat panel in render order; fragments pass a
//!    LESS depth test, write depth, and blend source-over
//!
//! Panels are double sided. Fragments whose alpha is zero are discarded so
//! a fully transparent cutout never hides what is behind it.
//! Faces render on scoped threads, one per face.

use glam::{DVec2, DVec3, Vec2, Vec4};

use crate::compositor::{EnvironmentScene, Panel};
use crate::cubemap::{CubeFace, Cubemap};
use crate::error::EnvResult;

const MIN_DENOM: f64 = 1e-9;
const MIN_PANEL_SCALE: f64 = 1e-12;

/// Cubemap renderer with a fixed face size
#[derive(Clone, Copy, Debug)]
pub struct CubeRenderer {
    face_size: u32,
}

impl CubeRenderer {
    pub fn new(face_size: u32) -> Self {
        Self { face_size }
    }

    pub fn face_size(&self) -> u32 {
        self.face_size
    }

    /// Render `scene` into a fresh cubemap
    pub fn render(&self, scene: &EnvironmentScene) -> EnvResult<Cubemap> {
        let mut cube = Cubemap::new(self.face_size)?;
        let n = self.face_size;
        let background = Vec4::from_array(scene.background);

        std::thread::scope(|s| {
            for (face, texels) in cube.faces_mut() {
                s.spawn(move || render_face(scene, face, n, background, texels));
            }
        });

        log::trace!("Rendered {} panel(s) into {}px cube faces", scene.panels.len(), n);
        Ok(cube)
    }
}

fn render_face(scene: &EnvironmentScene, face: CubeFace, n: u32, background: Vec4, texels: &mut [Vec4]) {
    let size = n as f64;
    for y in 0..n {
        for x in 0..n {
            let dir = face
                .direction((x as f64 + 0.5) / size, (y as f64 + 0.5) / size)
                .normalize();
            texels[(y * n + x) as usize] = shade_ray(scene, dir, background);
        }
    }
}

/// Color seen along unit direction `dir`
pub fn shade_ray(scene: &EnvironmentScene, dir: DVec3, background: Vec4) -> Vec4 {
    let mut color = background;
    let mut depth = f64::INFINITY;

    for panel in &scene.panels {
        let hit = if panel.backdrop {
            Some((f64::INFINITY, sky_uv(dir)))
        } else {
            intersect(panel, dir)
        };
        let Some((distance, uv)) = hit else {
            continue;
        };
        if !panel.backdrop && distance >= depth {
            continue;
        }

        let src = panel.material.sample(uv);
        if src.w <= 0.0 {
            continue;
        }
        color = blend_over(src, color);
        if !panel.backdrop {
            depth = distance;
        }
    }
    color
}

/// UV of the enclosing sky sphere; `v = 1` straight up
fn sky_uv(dir: DVec3) -> Vec2 {
    let v = 1.0 - dir.y.clamp(-1.0, 1.0).acos() / core::f64::consts::PI;
    let u = dir.z.atan2(-dir.x) / core::f64::consts::TAU;
    Vec2::new(u.rem_euclid(1.0) as f32, v as f32)
}

/// Ray distance and panel UV where the ray from the origin meets `panel`
fn intersect(panel: &Panel, dir: DVec3) -> Option<(f64, Vec2)> {
    let t = &panel.transform;
    if t.scale.x.abs() < MIN_PANEL_SCALE || t.scale.y.abs() < MIN_PANEL_SCALE {
        return None;
    }
    let normal = t.normal();
    let denom = dir.dot(normal);
    if denom.abs() < MIN_DENOM {
        return None;
    }
    let distance = t.position.dot(normal) / denom;
    if !(distance > 0.0 && distance.is_finite()) {
        return None;
    }
    let local = t.inverse_transform_point(dir * distance);
    let uv = panel.geometry.uv(DVec2::new(local.x, local.y))?;
    Some((distance, uv))
}

/// Non-premultiplied source-over
#[inline]
fn blend_over(src: Vec4, dst: Vec4) -> Vec4 {
    let a = src.w;
    let rgb = src.truncate() * a + dst.truncate() * (1.0 - a);
    rgb.extend(a + dst.w * (1.0 - a))
}
