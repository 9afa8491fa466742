//! # lightform_shade - Appearance Shaders
//!
//! Pure per-pixel shading of light panels:
//!
//! - [`uniforms`]: `#[repr(C)]` parameter blocks built once per frame from
//!   a light
//! - [`material`]: one shader per appearance type plus the shared
//!   intensity/opacity finish
//! - [`falloff`]: swappable area-light profiles for the scrim shader
//! - [`noise`]: perlin, simplex, cell and curl noise
//! - [`texture`]: linear float images and the decode-once texture cache

pub mod error;
pub mod falloff;
pub mod material;
pub mod noise;
pub mod texture;
pub mod uniforms;

pub use error::{TextureError, TextureResult};
pub use falloff::{Falloff, FalloffKind, PointFalloff, RectFalloff, RodFalloff};
pub use material::{Appearance, PanelMaterial, Shader};
pub use texture::{FileTextureLoader, HdrTexture, TextureCache, TextureLoader, TextureState};
pub use uniforms::{FinishUniforms, KindUniforms, ShaderUniforms};

pub mod prelude {
    pub use crate::falloff::FalloffKind;
    pub use crate::material::{Appearance, PanelMaterial};
    pub use crate::texture::{HdrTexture, TextureCache, TextureState};
    pub use crate::uniforms::ShaderUniforms;
}
