//! # lightform_env - Environment Compositing
//!
//! Turns the light list into an HDRI:
//!
//! - [`panel`]: where each light's panel sits and what outline it has
//! - [`animate`]: float oscillation and signal channels
//! - [`compositor`]: per-frame assembly of visible panels
//! - [`render`]: ray-cast rasterization into a [`Cubemap`]
//! - [`projector`]: cubemap to equirectangular readback
//!
//! ```
//! use lightform_env::prelude::*;
//! use lightform_scene::{Light, LightKind};
//! use lightform_shade::TextureCache;
//!
//! let lights = vec![Light::new("light-1", "Key", LightKind::default())];
//! let scene = Compositor::default().compose(&lights, &[], &TextureCache::with_root("."), 0.0);
//! let cube = CubeRenderer::new(16).render(&scene).unwrap();
//! let image = project(&cube, &ProjectorOptions::new(64, ColorEncoding::Linear, PixelType::F32)).unwrap();
//! assert_eq!(image.pixels.len(), 64 * 32 * 4);
//! ```

pub mod animate;
pub mod compositor;
pub mod cubemap;
pub mod error;
pub mod panel;
pub mod projector;
pub mod render;

pub use animate::{apply_signals, float_phase, float_transform};
pub use compositor::{ComposeConfig, Compositor, EnvironmentScene, Panel};
pub use cubemap::{CubeFace, Cubemap};
pub use error::{EnvError, EnvResult};
pub use panel::{panel_transform, PanelGeometry, RING_INNER_RADIUS};
pub use projector::{
    equirect_direction, project, project_linear, project_on, ColorEncoding, EquirectImage, PixelData, PixelType,
    ProjectorOptions, RenderSurface, SizeGuard, SoftwareSurface,
};
pub use render::CubeRenderer;

pub mod prelude {
    pub use crate::compositor::{ComposeConfig, Compositor, EnvironmentScene};
    pub use crate::cubemap::Cubemap;
    pub use crate::projector::{project, ColorEncoding, EquirectImage, PixelData, PixelType, ProjectorOptions};
    pub use crate::render::CubeRenderer;
}
