//! Environment compositor
//!
//! Once per frame, recomputes every light's panel from its parameters and
//! assembles the visible panels into an [`EnvironmentScene`] ready for the
//! cube rasterizer.
//!
//! Ordering rules:
//! - panels keep list order (`render_order` = index in the light list)
//! - sky backdrops are drawn before everything else
//! - lights whose effective visibility is off are culled
//! - a texture light whose image is still decoding is deferred to a later
//!   frame rather than drawn without its texture

use glam::Vec3;

use lightform_math::PanelTransform;
use lightform_scene::{any_solo, effective_visibility, Color, Light, LightId, Signal};
use lightform_shade::{FalloffKind, PanelMaterial, TextureCache};

use crate::animate::{apply_signals, float_transform};
use crate::panel::{panel_transform, PanelGeometry};

/// Compositor settings
#[derive(Clone, Debug)]
pub struct ComposeConfig {
    /// Fill behind every panel; `None` is transparent black
    pub background: Option<Color>,
    /// Falloff form used by scrim lights
    pub falloff: FalloffKind,
    /// Whether float animation and signals run
    pub animate: bool,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            background: None,
            falloff: FalloffKind::Point,
            animate: true,
        }
    }
}

/// One drawable panel
#[derive(Clone, Debug)]
pub struct Panel {
    pub light_id: LightId,
    /// Index of the light in the list
    pub render_order: usize,
    /// World transform including animation
    pub transform: PanelTransform,
    pub geometry: PanelGeometry,
    pub material: PanelMaterial,
    /// Enclosing sky sphere instead of a flat panel
    pub backdrop: bool,
}

/// Everything the cube rasterizer draws for one frame
#[derive(Clone, Debug, Default)]
pub struct EnvironmentScene {
    /// Linear background color with alpha
    pub background: [f32; 4],
    /// Backdrops first, then flat panels in list order
    pub panels: Vec<Panel>,
    /// Lights skipped this frame because their texture is not ready
    pub deferred: Vec<LightId>,
}

impl EnvironmentScene {
    /// Whether every visible light made it into the scene
    pub fn is_complete(&self) -> bool {
        self.deferred.is_empty()
    }
}

/// Per-frame scene assembler
#[derive(Clone, Debug, Default)]
pub struct Compositor {
    config: ComposeConfig,
}

impl Compositor {
    pub fn new(config: ComposeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// Assemble the scene for `time` seconds into playback
    pub fn compose(&self, lights: &[Light], signals: &[Signal], textures: &TextureCache, time: f64) -> EnvironmentScene {
        let solo = any_solo(lights);
        let mut backdrops = Vec::new();
        let mut panels = Vec::new();
        let mut deferred = Vec::new();

        for (index, light) in lights.iter().enumerate() {
            if !effective_visibility(light, solo) {
                continue;
            }

            let Some(material) = PanelMaterial::for_light(light, textures, self.config.falloff) else {
                log::debug!("Deferring {} until its texture is decoded", light.id);
                deferred.push(light.id.clone());
                continue;
            };

            let mut transform = panel_transform(light);
            if self.config.animate {
                let samples: Vec<_> = signals
                    .iter()
                    .filter(|s| s.target_id == light.id)
                    .map(|s| s.sample(time))
                    .collect();
                apply_signals(&mut transform, &samples);
                transform = float_transform(light.id.as_str(), &light.animation, time).compose(&transform);
            }

            let backdrop = light.kind.is_backdrop();
            let panel = Panel {
                light_id: light.id.clone(),
                render_order: index,
                transform,
                geometry: PanelGeometry::from(light.shape),
                material,
                backdrop,
            };
            if backdrop {
                backdrops.push(panel);
            } else {
                panels.push(panel);
            }
        }

        backdrops.extend(panels);
        EnvironmentScene {
            background: self.background(),
            panels: backdrops,
            deferred,
        }
    }

    fn background(&self) -> [f32; 4] {
        match self.config.background {
            Some(color) => Vec3::from(color.to_linear()).extend(1.0).to_array(),
            None => [0.0; 4],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightform_scene::{LightKind, SkyGradientParams, SolidParams, TextureParams};
    use lightform_shade::{HdrTexture, TextureLoader, TextureResult};
    use std::sync::Arc;

    struct NeverLoader;

    impl TextureLoader for NeverLoader {
        fn load(&self, key: &str) -> TextureResult<HdrTexture> {
            std::thread::sleep(std::time::Duration::from_millis(200));
            Err(lightform_shade::TextureError::NotFound(key.to_string()))
        }
    }

    fn cache() -> TextureCache {
        TextureCache::new(Arc::new(NeverLoader))
    }

    fn solid(id: &str) -> Light {
        Light::new(id, id, LightKind::Solid(SolidParams::default()))
    }

    #[test]
    fn test_render_order_and_culling() {
        let mut hidden = solid("b");
        hidden.visible = false;
        let lights = vec![solid("a"), hidden, solid("c")];
        let scene = Compositor::default().compose(&lights, &[], &cache(), 0.0);
        let order: Vec<_> = scene.panels.iter().map(|p| (p.light_id.as_str().to_string(), p.render_order)).collect();
        assert_eq!(order, vec![("a".to_string(), 0), ("c".to_string(), 2)]);
    }

    #[test]
    fn test_solo_overrides_visible() {
        let mut soloed = solid("b");
        soloed.solo = true;
        let scene = Compositor::default().compose(&[solid("a"), soloed], &[], &cache(), 0.0);
        assert_eq!(scene.panels.len(), 1);
        assert_eq!(scene.panels[0].light_id.as_str(), "b");
    }

    #[test]
    fn test_backdrop_first() {
        let sky = Light::new("sky", "Sky", LightKind::SkyGradient(SkyGradientParams::default()));
        let scene = Compositor::default().compose(&[solid("a"), sky], &[], &cache(), 0.0);
        assert!(scene.panels[0].backdrop);
        assert_eq!(scene.panels[0].render_order, 1);
    }

    #[test]
    fn test_pending_texture_deferred() {
        let tex = Light::new(
            "t",
            "T",
            LightKind::Texture(TextureParams { map: "slow.exr".into(), color: Color::WHITE }),
        );
        let scene = Compositor::default().compose(&[tex, solid("a")], &[], &cache(), 0.0);
        assert_eq!(scene.deferred, vec![LightId::from("t")]);
        assert_eq!(scene.panels.len(), 1);
        assert!(!scene.is_complete());
    }

    #[test]
    fn test_static_when_not_animating() {
        let mut light = solid("a");
        light.animation.enabled = true;
        let config = ComposeConfig { animate: false, ..ComposeConfig::default() };
        let scene = Compositor::new(config).compose(&[light.clone()], &[], &cache(), 3.0);
        assert_eq!(scene.panels[0].transform, panel_transform(&light));
    }

    #[test]
    fn test_background_linear() {
        let config = ComposeConfig { background: Some(Color::BLACK), ..ComposeConfig::default() };
        let scene = Compositor::new(config).compose(&[], &[], &cache(), 0.0);
        assert_eq!(scene.background, [0.0, 0.0, 0.0, 1.0]);
    }
}
