//! # lightform_export - HDRI Export
//!
//! Projects the environment cubemap to an equirectangular image and
//! encodes it as Radiance HDR (linear float) or as 8-bit PNG, JPEG or
//! WebP. Output files are always named `envmap.<ext>`.

pub mod encode;
pub mod error;
pub mod format;

pub use encode::{encode, export_cubemap, save, ExportedImage};
pub use error::{ExportError, ExportResult};
pub use format::{ExportFormat, ExportOptions, ResolutionPreset, EXPORT_BASENAME};
