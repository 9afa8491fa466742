//! Panel materials
//!
//! A material evaluates one light's appearance at a panel UV. Every
//! appearance produces a base RGBA and a tint; the shared finish is then
//!
//! ```text
//! rgb   = base.rgb × tint × intensity
//! alpha = base.a × opacity
//! ```

use std::f32::consts::PI;
use std::sync::Arc;

use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};

use lightform_math::{fract, smoothstep};
use lightform_scene::{Light, NoiseType};

use crate::falloff::{Falloff, FalloffKind};
use crate::noise;
use crate::texture::{HdrTexture, TextureCache};
use crate::uniforms::{
    FinishUniforms, GradientUniforms, KindUniforms, NoiseUniforms, ScrimUniforms, ShaderUniforms, SkyUniforms,
    UmbrellaUniforms,
};

/// Per-pixel appearance before the shared finish
pub trait Appearance {
    /// Base color and coverage at `uv ∈ [0, 1]²`
    fn base(&self, uv: Vec2) -> Vec4;
}

#[inline]
fn centered(uv: Vec2) -> Vec2 {
    uv * 2.0 - Vec2::ONE
}

#[inline]
fn rgb(c: [f32; 4]) -> Vec3 {
    Vec3::new(c[0], c[1], c[2])
}

/// Flat fill
#[derive(Clone, Copy, Debug, Default)]
pub struct SolidShader;

impl Appearance for SolidShader {
    fn base(&self, _uv: Vec2) -> Vec4 {
        Vec4::ONE
    }
}

/// Two-color ramp along one axis
#[derive(Clone, Copy, Debug)]
pub struct GradientShader(pub GradientUniforms);

impl Appearance for GradientShader {
    fn base(&self, uv: Vec2) -> Vec4 {
        let u = &self.0;
        let coord = if u.axis == 1 { uv.y } else { uv.x };
        let t = ((coord - 0.5) * u.contrast + 0.5).clamp(0.0, 1.0);
        rgb(u.color_a).lerp(rgb(u.color_b), t).extend(1.0)
    }
}

/// Four-stop ramp driven by procedural noise
#[derive(Clone, Copy, Debug)]
pub struct NoiseShader(pub NoiseUniforms);

impl NoiseShader {
    fn kind(&self) -> NoiseType {
        match self.0.noise_type {
            1 => NoiseType::Simplex,
            2 => NoiseType::Cell,
            3 => NoiseType::Curl,
            _ => NoiseType::Perlin,
        }
    }
}

impl Appearance for NoiseShader {
    fn base(&self, uv: Vec2) -> Vec4 {
        let n = noise::sample(self.kind(), uv, self.0.scale) * 3.0;
        let segment = (n.floor() as usize).min(2);
        let t = n - segment as f32;
        let stops = &self.0.colors;
        rgb(stops[segment]).lerp(rgb(stops[segment + 1]), t).extend(1.0)
    }
}

/// Image-backed panel
#[derive(Clone, Debug)]
pub struct TextureShader(pub Arc<HdrTexture>);

impl Appearance for TextureShader {
    fn base(&self, uv: Vec2) -> Vec4 {
        self.0.sample(uv)
    }
}

/// Scrim lit by a virtual light hovering above it
#[derive(Clone, Copy, Debug)]
pub struct ScrimShader {
    pub uniforms: ScrimUniforms,
    pub falloff: FalloffKind,
}

impl Appearance for ScrimShader {
    fn base(&self, uv: Vec2) -> Vec4 {
        let offset = Vec2::from(self.uniforms.light_position);
        let p = centered(uv) - offset;
        let l = self.falloff.evaluate(p, self.uniforms.light_distance).max(0.0);
        Vec3::splat(l).extend(1.0)
    }
}

/// Umbrella with `light_sides` soft radial lobes
#[derive(Clone, Copy, Debug)]
pub struct UmbrellaShader(pub UmbrellaUniforms);

impl Appearance for UmbrellaShader {
    fn base(&self, uv: Vec2) -> Vec4 {
        let p = centered(uv);
        let at = p.y.atan2(p.x);
        let angle = (fract(at / PI * self.0.light_sides) * PI).sin() * PI * 0.5;
        let r2 = p.length_squared();
        let i = 1.0 - smoothstep(0.8, 1.0, r2);
        Vec3::splat(angle * i).extend(smoothstep(0.0, 0.5, i))
    }
}

/// Vertical two-color backdrop
#[derive(Clone, Copy, Debug)]
pub struct SkyShader(pub SkyUniforms);

impl Appearance for SkyShader {
    fn base(&self, uv: Vec2) -> Vec4 {
        rgb(self.0.color).lerp(rgb(self.0.color2), uv.y.clamp(0.0, 1.0)).extend(1.0)
    }
}

/// Appearance of one light, ready to sample
#[derive(Clone, Debug)]
pub enum Shader {
    Solid(SolidShader),
    Gradient(GradientShader),
    Noise(NoiseShader),
    Texture(TextureShader),
    Scrim(ScrimShader),
    Umbrella(UmbrellaShader),
    Sky(SkyShader),
}

impl Appearance for Shader {
    fn base(&self, uv: Vec2) -> Vec4 {
        match self {
            Self::Solid(s) => s.base(uv),
            Self::Gradient(s) => s.base(uv),
            Self::Noise(s) => s.base(uv),
            Self::Texture(s) => s.base(uv),
            Self::Scrim(s) => s.base(uv),
            Self::Umbrella(s) => s.base(uv),
            Self::Sky(s) => s.base(uv),
        }
    }
}

/// Shader plus the shared finish
#[derive(Clone, Debug)]
pub struct PanelMaterial {
    pub shader: Shader,
    pub finish: FinishUniforms,
}

impl PanelMaterial {
    /// Material for a uniform set
    ///
    /// Texture appearances need the decoded image; passing `None` for one
    /// falls back to a flat fill of the tint.
    pub fn new(uniforms: &ShaderUniforms, texture: Option<Arc<HdrTexture>>, falloff: FalloffKind) -> Self {
        let shader = match uniforms.kind {
            KindUniforms::Solid => Shader::Solid(SolidShader),
            KindUniforms::Gradient(u) => Shader::Gradient(GradientShader(u)),
            KindUniforms::Noise(u) => Shader::Noise(NoiseShader(u)),
            KindUniforms::Texture => match texture {
                Some(t) => Shader::Texture(TextureShader(t)),
                None => Shader::Solid(SolidShader),
            },
            KindUniforms::Scrim(u) => Shader::Scrim(ScrimShader { uniforms: u, falloff }),
            KindUniforms::Umbrella(u) => Shader::Umbrella(UmbrellaShader(u)),
            KindUniforms::Sky(u) => Shader::Sky(SkyShader(u)),
        };
        Self { shader, finish: uniforms.finish }
    }

    /// Material for a light, resolving its texture through `textures`
    ///
    /// Returns `None` while the light's texture is still decoding; the
    /// caller skips the panel for this frame.
    pub fn for_light(light: &Light, textures: &TextureCache, falloff: FalloffKind) -> Option<Self> {
        let uniforms = ShaderUniforms::from_light(light);
        let texture = match light.kind.texture_key() {
            Some(key) => Some(textures.request(key).texture()?.clone()),
            None => None,
        };
        Some(Self::new(&uniforms, texture, falloff))
    }

    /// Final linear RGBA at `uv`
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let base = self.shader.base(uv);
        let tint = Vec3::from(self.finish.color);
        let color = base.xyz() * tint * self.finish.intensity;
        let alpha = (base.w * self.finish.opacity).clamp(0.0, 1.0);
        let color = if color.is_finite() { color.max(Vec3::ZERO) } else { Vec3::ZERO };
        color.extend(alpha)
    }
}
