//! Uniform blocks
//!
//! One `#[repr(C)]` block per appearance type, built once per frame from
//! the light's parameters. Colors are converted to linear light here so the
//! shaders never see sRGB values. Every block is a multiple of 16 bytes and
//! can be uploaded as-is with [`ShaderUniforms::as_bytes`].

use lightform_scene::{GradientAxis, Light, LightKind, NoiseType};

/// Values every appearance shares
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FinishUniforms {
    /// Linear tint
    pub color: [f32; 3],
    pub intensity: f32,
    pub opacity: f32,
    pub _pad: [f32; 3],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GradientUniforms {
    pub color_a: [f32; 4],
    pub color_b: [f32; 4],
    pub contrast: f32,
    /// 0 = x, 1 = y
    pub axis: u32,
    pub _pad: [f32; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NoiseUniforms {
    /// Ramp stops A..D, alpha unused
    pub colors: [[f32; 4]; 4],
    pub scale: f32,
    /// 0 perlin, 1 simplex, 2 cell, 3 curl
    pub noise_type: u32,
    pub _pad: [f32; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ScrimUniforms {
    pub light_position: [f32; 2],
    pub light_distance: f32,
    pub _pad: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UmbrellaUniforms {
    pub light_sides: f32,
    pub _pad: [f32; 3],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkyUniforms {
    pub color: [f32; 4],
    pub color2: [f32; 4],
}

/// Type-specific block for one light
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KindUniforms {
    Solid,
    Gradient(GradientUniforms),
    Noise(NoiseUniforms),
    Texture,
    Scrim(ScrimUniforms),
    Umbrella(UmbrellaUniforms),
    Sky(SkyUniforms),
}

/// Everything a panel shader reads for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShaderUniforms {
    pub finish: FinishUniforms,
    pub kind: KindUniforms,
}

#[inline]
fn rgba(rgb: [f32; 3]) -> [f32; 4] {
    [rgb[0], rgb[1], rgb[2], 1.0]
}

/// Clamp to a finite, non-negative value
#[inline]
fn non_negative(v: f64) -> f32 {
    if v.is_finite() { v.max(0.0) as f32 } else { 0.0 }
}

impl ShaderUniforms {
    /// Build the uniform set from a light's parameters
    ///
    /// Ranges are clamped again here so an unsanitized light never feeds a
    /// shader a negative or non-finite value.
    pub fn from_light(light: &Light) -> Self {
        let white = [1.0, 1.0, 1.0];
        let (tint, kind) = match &light.kind {
            LightKind::Solid(p) => (p.color.to_linear(), KindUniforms::Solid),
            LightKind::Gradient(p) => (
                white,
                KindUniforms::Gradient(GradientUniforms {
                    color_a: rgba(p.color_a.to_linear()),
                    color_b: rgba(p.color_b.to_linear()),
                    contrast: non_negative(p.contrast),
                    axis: match p.axes {
                        GradientAxis::X => 0,
                        GradientAxis::Y => 1,
                    },
                    _pad: [0.0; 2],
                }),
            ),
            LightKind::Noise(p) => (
                white,
                KindUniforms::Noise(NoiseUniforms {
                    colors: [
                        rgba(p.color_a.to_linear()),
                        rgba(p.color_b.to_linear()),
                        rgba(p.color_c.to_linear()),
                        rgba(p.color_d.to_linear()),
                    ],
                    scale: non_negative(p.noise_scale),
                    noise_type: match p.noise_type {
                        NoiseType::Perlin => 0,
                        NoiseType::Simplex => 1,
                        NoiseType::Cell => 2,
                        NoiseType::Curl => 3,
                    },
                    _pad: [0.0; 2],
                }),
            ),
            LightKind::Texture(p) => (p.color.to_linear(), KindUniforms::Texture),
            LightKind::ProceduralScrim(p) => (
                p.color.to_linear(),
                KindUniforms::Scrim(ScrimUniforms {
                    light_position: [p.light_position.x as f32, p.light_position.y as f32],
                    light_distance: non_negative(p.light_distance).max(1e-3),
                    _pad: 0.0,
                }),
            ),
            LightKind::ProceduralUmbrella(p) => (
                p.color.to_linear(),
                KindUniforms::Umbrella(UmbrellaUniforms {
                    light_sides: p.light_sides.max(3) as f32,
                    _pad: [0.0; 3],
                }),
            ),
            LightKind::SkyGradient(p) => (
                white,
                KindUniforms::Sky(SkyUniforms {
                    color: rgba(p.color.to_linear()),
                    color2: rgba(p.color2.to_linear()),
                }),
            ),
        };

        Self {
            finish: FinishUniforms {
                color: tint,
                intensity: non_negative(light.intensity),
                opacity: non_negative(light.opacity).min(1.0),
                _pad: [0.0; 3],
            },
            kind,
        }
    }

    /// Raw bytes of the type-specific block (empty for types without one)
    pub fn kind_bytes(&self) -> &[u8] {
        match &self.kind {
            KindUniforms::Solid | KindUniforms::Texture => &[],
            KindUniforms::Gradient(u) => bytemuck::bytes_of(u),
            KindUniforms::Noise(u) => bytemuck::bytes_of(u),
            KindUniforms::Scrim(u) => bytemuck::bytes_of(u),
            KindUniforms::Umbrella(u) => bytemuck::bytes_of(u),
            KindUniforms::Sky(u) => bytemuck::bytes_of(u),
        }
    }

    /// Finish block followed by the type-specific block
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut bytes = bytemuck::bytes_of(&self.finish).to_vec();
        bytes.extend_from_slice(self.kind_bytes());
        bytes
    }
}
