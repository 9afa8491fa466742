//! Light entity model
//!
//! A light is a set of orthogonal parameters: where it sits on the
//! environment sphere, what panel shape it uses, how it looks
//! ([`LightKind`], the appearance type) and how it animates.
//!
//! # Invariants
//!
//! - `id` is unique within a store and never changes after creation
//! - `intensity`, `opacity`, `scale*` are non-negative (`opacity <= 1`)
//! - `light_sides >= 3` for umbrella lights
//!
//! [`Light::sanitize`] clamps numeric fields into range; the store calls it
//! on every write.

use serde::{Deserialize, Serialize};

use lightform_math::{latlon_to_phi_theta, LatLon, SphericalAngles};

use crate::color::Color;
use crate::id::LightId;

/// Default placement radius
pub const DEFAULT_DISTANCE: f64 = 4.0;
/// Smallest scrim height accepted by the falloff shaders
pub const MIN_LIGHT_DISTANCE: f64 = 1e-3;
/// Fewest spokes an umbrella light can have
pub const MIN_LIGHT_SIDES: u32 = 3;
/// Largest noise frequency multiplier
pub const MAX_NOISE_SCALE: f64 = 1000.0;

/// Panel geometry
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    #[serde(alias = "rect")]
    Rectangle,
    Circle,
    Ring,
}

impl Shape {
    /// Form name used in generated code
    pub fn form_name(self) -> &'static str {
        match self {
            Self::Rectangle => "rect",
            Self::Circle => "circle",
            Self::Ring => "ring",
        }
    }
}

/// Where a light sits on the environment sphere
///
/// Both schemes resolve to the same spherical angles through
/// [`Placement::angles`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Placement {
    /// Explicit spherical angles
    Spherical { phi: f64, theta: f64 },
    /// Normalized coordinate in `[-1, 1]²`
    Latlon { x: f64, y: f64 },
}

impl Default for Placement {
    fn default() -> Self {
        Self::Latlon { x: 0.0, y: 0.0 }
    }
}

impl Placement {
    /// Spherical angles for this placement
    pub fn angles(&self) -> SphericalAngles {
        match *self {
            Self::Spherical { phi, theta } => SphericalAngles::new(phi, theta),
            Self::Latlon { x, y } => latlon_to_phi_theta(LatLon::new(x, y)),
        }
    }

    /// Placement from a lat/lon
    pub fn from_latlon(latlon: LatLon) -> Self {
        Self::Latlon { x: latlon.x, y: latlon.y }
    }
}

/// Floating/rotation oscillation applied on top of the static transform
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Animation {
    /// Whether the oscillation runs at all
    pub enabled: bool,
    pub speed: f64,
    pub rotation_intensity: f64,
    pub float_intensity: f64,
    /// Vertical travel, as `(low, high)`
    pub floating_range: (f64, f64),
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            enabled: false,
            speed: 1.0,
            rotation_intensity: 1.0,
            float_intensity: 1.0,
            floating_range: (-0.1, 0.1),
        }
    }
}

/// Gradient direction in panel space
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientAxis {
    #[default]
    X,
    Y,
}

/// Procedural noise family
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseType {
    #[default]
    Perlin,
    Simplex,
    Cell,
    Curl,
}

/// Shader-space offset of the scrim's virtual point light
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LightPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolidParams {
    pub color: Color,
}

impl Default for SolidParams {
    fn default() -> Self {
        Self { color: Color::WHITE }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GradientParams {
    pub color_a: Color,
    pub color_b: Color,
    pub contrast: f64,
    pub axes: GradientAxis,
}

impl Default for GradientParams {
    fn default() -> Self {
        Self {
            color_a: Color::WHITE,
            color_b: Color::BLACK,
            contrast: 1.0,
            axes: GradientAxis::X,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoiseParams {
    pub color_a: Color,
    pub color_b: Color,
    pub color_c: Color,
    pub color_d: Color,
    pub noise_type: NoiseType,
    pub noise_scale: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            color_a: Color::rgb(255, 0, 0),
            color_b: Color::rgb(0, 255, 0),
            color_c: Color::rgb(0, 0, 255),
            color_d: Color::WHITE,
            noise_type: NoiseType::Perlin,
            noise_scale: 1.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextureParams {
    /// Resource key (path or URL) of the decoded image
    pub map: String,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrimParams {
    pub color: Color,
    pub light_position: LightPosition,
    /// Height of the virtual light above the panel
    pub light_distance: f64,
}

impl Default for ScrimParams {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            light_position: LightPosition::default(),
            light_distance: 0.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UmbrellaParams {
    pub color: Color,
    pub light_sides: u32,
}

impl Default for UmbrellaParams {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            light_sides: 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkyGradientParams {
    /// Bottom color
    pub color: Color,
    /// Top color
    pub color2: Color,
}

impl Default for SkyGradientParams {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            color2: Color::rgb(0x44, 0x88, 0xff),
        }
    }
}

/// Appearance type and its parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LightKind {
    Solid(SolidParams),
    Gradient(GradientParams),
    Noise(NoiseParams),
    Texture(TextureParams),
    ProceduralScrim(ScrimParams),
    ProceduralUmbrella(UmbrellaParams),
    SkyGradient(SkyGradientParams),
}

impl Default for LightKind {
    fn default() -> Self {
        Self::ProceduralScrim(ScrimParams::default())
    }
}

impl LightKind {
    /// Discriminator as written in saved state
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Solid(_) => "solid",
            Self::Gradient(_) => "gradient",
            Self::Noise(_) => "noise",
            Self::Texture(_) => "texture",
            Self::ProceduralScrim(_) => "procedural_scrim",
            Self::ProceduralUmbrella(_) => "procedural_umbrella",
            Self::SkyGradient(_) => "sky_gradient",
        }
    }

    /// Texture resource this light depends on, if any
    pub fn texture_key(&self) -> Option<&str> {
        match self {
            Self::Texture(params) => Some(params.map.as_str()),
            _ => None,
        }
    }

    /// Sky gradients enclose the scene instead of being flat panels
    pub fn is_backdrop(&self) -> bool {
        matches!(self, Self::SkyGradient(_))
    }
}

/// One light in the environment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Light {
    pub id: LightId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub shape: Shape,
    #[serde(default = "one")]
    pub intensity: f64,
    #[serde(default = "one")]
    pub opacity: f64,
    #[serde(default = "one")]
    pub scale: f64,
    #[serde(default = "one")]
    pub scale_x: f64,
    #[serde(default = "one")]
    pub scale_y: f64,
    /// Panel roll in radians
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_distance")]
    pub distance: f64,
    #[serde(default)]
    pub placement: Placement,
    /// Point the panel faces
    #[serde(default)]
    pub target: [f64; 3],
    #[serde(default = "yes")]
    pub visible: bool,
    #[serde(default)]
    pub solo: bool,
    /// UI-only selection state
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub animation: Animation,
    /// Store revision of the last write to this light
    #[serde(default)]
    pub ts: u64,
    #[serde(flatten)]
    pub kind: LightKind,
}

fn one() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

fn default_distance() -> f64 {
    DEFAULT_DISTANCE
}

impl Light {
    /// Create a light with default geometry
    pub fn new(id: impl Into<LightId>, name: impl Into<String>, kind: LightKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            shape: Shape::Rectangle,
            intensity: 1.0,
            opacity: 1.0,
            scale: 2.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            distance: DEFAULT_DISTANCE,
            placement: Placement::default(),
            target: [0.0; 3],
            visible: true,
            solo: false,
            selected: false,
            animation: Animation::default(),
            ts: 0,
            kind,
        }
    }

    /// Set placement (builder pattern)
    pub fn with_latlon(mut self, x: f64, y: f64) -> Self {
        self.placement = Placement::Latlon { x, y };
        self
    }

    /// Set shape (builder pattern)
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    /// Set intensity (builder pattern)
    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = intensity;
        self
    }

    /// Spherical angles of this light's placement
    #[inline]
    pub fn angles(&self) -> SphericalAngles {
        self.placement.angles()
    }

    /// Clamp numeric fields into their valid ranges
    ///
    /// Returns the names of the fields that had to change.
    pub fn sanitize(&mut self) -> Vec<&'static str> {
        let mut changed = Vec::new();
        let mut fix = |name: &'static str, value: &mut f64, min: f64, max: f64, fallback: f64| {
            let fixed = if value.is_finite() { value.clamp(min, max) } else { fallback };
            if fixed != *value {
                *value = fixed;
                changed.push(name);
            }
        };

        fix("intensity", &mut self.intensity, 0.0, f64::MAX, 0.0);
        fix("opacity", &mut self.opacity, 0.0, 1.0, 1.0);
        fix("scale", &mut self.scale, 0.0, f64::MAX, 0.0);
        fix("scaleX", &mut self.scale_x, 0.0, f64::MAX, 0.0);
        fix("scaleY", &mut self.scale_y, 0.0, f64::MAX, 0.0);
        fix("rotation", &mut self.rotation, f64::MIN, f64::MAX, 0.0);
        fix("distance", &mut self.distance, 0.0, f64::MAX, DEFAULT_DISTANCE);
        for axis in self.target.iter_mut() {
            fix("target", axis, f64::MIN, f64::MAX, 0.0);
        }

        match &mut self.placement {
            Placement::Latlon { x, y } => {
                fix("latlon", x, -1.0, 1.0, 0.0);
                fix("latlon", y, -1.0, 1.0, 0.0);
            }
            Placement::Spherical { phi, theta } => {
                fix("phi", phi, f64::MIN, f64::MAX, core::f64::consts::FRAC_PI_2);
                fix("theta", theta, f64::MIN, f64::MAX, 0.0);
            }
        }

        let anim = &mut self.animation;
        fix("animationSpeed", &mut anim.speed, f64::MIN, f64::MAX, 1.0);
        fix("animationRotationIntensity", &mut anim.rotation_intensity, 0.0, f64::MAX, 0.0);
        fix("animationFloatIntensity", &mut anim.float_intensity, 0.0, f64::MAX, 0.0);
        fix("animationFloatingRange", &mut anim.floating_range.0, f64::MIN, f64::MAX, -0.1);
        fix("animationFloatingRange", &mut anim.floating_range.1, f64::MIN, f64::MAX, 0.1);

        match &mut self.kind {
            LightKind::Gradient(params) => {
                fix("contrast", &mut params.contrast, 0.0, f64::MAX, 1.0);
            }
            LightKind::Noise(params) => {
                fix("noiseScale", &mut params.noise_scale, 0.0, MAX_NOISE_SCALE, 1.0);
            }
            LightKind::ProceduralScrim(params) => {
                fix("lightDistance", &mut params.light_distance, MIN_LIGHT_DISTANCE, f64::MAX, 0.3);
                fix("lightPosition", &mut params.light_position.x, f64::MIN, f64::MAX, 0.0);
                fix("lightPosition", &mut params.light_position.y, f64::MIN, f64::MAX, 0.0);
            }
            LightKind::ProceduralUmbrella(params) => {
                if params.light_sides < MIN_LIGHT_SIDES {
                    params.light_sides = MIN_LIGHT_SIDES;
                    changed.push("lightSides");
                }
            }
            LightKind::Solid(_) | LightKind::Texture(_) | LightKind::SkyGradient(_) => {}
        }

        changed
    }

    /// Copy with a fresh identity: suffixed name, not soloed, not selected
    pub fn duplicate_as(&self, id: LightId) -> Light {
        Light {
            id,
            name: format!("{} (copy)", self.name),
            solo: false,
            selected: false,
            ..self.clone()
        }
    }
}

/// Whether any light in the list is soloed
pub fn any_solo(lights: &[Light]) -> bool {
    lights.iter().any(|l| l.solo)
}

/// Render-time visibility: `solo` when anything is soloed, else `visible`
#[inline]
pub fn effective_visibility(light: &Light, is_solo: bool) -> bool {
    if is_solo { light.solo } else { light.visible }
}
