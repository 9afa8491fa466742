//! Pixel buffer encoders
//!
//! 8-bit formats take RGBA bytes as read back from the projector. JPEG has
//! no alpha channel, so alpha is dropped. HDR takes float RGBA, drops alpha
//! and writes Radiance RGBE.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use image::codecs::hdr::HdrEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb};

use lightform_env::{project, Cubemap, EquirectImage, PixelData};

use crate::error::{ExportError, ExportResult};
use crate::format::{ExportFormat, ExportOptions};

/// An encoded file, ready to save or hand to a download
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedImage {
    pub filename: String,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// Project `cubemap` and encode it per `options`
pub fn export_cubemap(cubemap: &Cubemap, options: &ExportOptions) -> ExportResult<ExportedImage> {
    let image = project(cubemap, &options.projector())?;
    let bytes = encode(&image, options.format, options.jpeg_quality)?;
    log::info!(
        "Exported {}x{} {} ({} bytes)",
        image.width,
        image.height,
        options.format.filename(),
        bytes.len()
    );
    Ok(ExportedImage {
        filename: options.format.filename(),
        mime_type: options.format.mime_type(),
        width: image.width,
        height: image.height,
        bytes,
    })
}

/// Encode a projected image into `format`
pub fn encode(image: &EquirectImage, format: ExportFormat, jpeg_quality: u8) -> ExportResult<Vec<u8>> {
    let expected = image.width as usize * image.height as usize * 4;
    if image.pixels.len() != expected {
        return Err(ExportError::BufferSize { expected, actual: image.pixels.len() });
    }

    let (w, h) = (image.width, image.height);
    let mut out = Vec::new();
    match (format, &image.pixels) {
        (ExportFormat::Hdr, PixelData::F32(px)) => {
            let rgb: Vec<Rgb<f32>> = px.chunks_exact(4).map(|p| Rgb([p[0], p[1], p[2]])).collect();
            HdrEncoder::new(&mut out).encode(&rgb, w as usize, h as usize)?;
        }
        (ExportFormat::Png, PixelData::U8(px)) => {
            PngEncoder::new(&mut out).write_image(px, w, h, ExtendedColorType::Rgba8)?;
        }
        (ExportFormat::Jpeg, PixelData::U8(px)) => {
            let rgb: Vec<u8> = px.chunks_exact(4).flat_map(|p| [p[0], p[1], p[2]]).collect();
            JpegEncoder::new_with_quality(&mut out, jpeg_quality.clamp(1, 100)).write_image(
                &rgb,
                w,
                h,
                ExtendedColorType::Rgb8,
            )?;
        }
        (ExportFormat::Webp, PixelData::U8(px)) => {
            WebPEncoder::new_lossless(&mut out).write_image(px, w, h, ExtendedColorType::Rgba8)?;
        }
        (format, _) => {
            let expected = if format.is_hdr() { "float" } else { "8-bit" };
            return Err(ExportError::PixelType { format, expected });
        }
    }
    Ok(out)
}

/// Write `image` into `dir` under its filename
///
/// Writes a uniquely named temporary sibling first and renames it over the
/// target, so a failed save never leaves a truncated file behind.
pub fn save(image: &ExportedImage, dir: impl AsRef<Path>) -> ExportResult<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(&image.filename);
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&image.bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(&path).map_err(|e| e.error)?;
    log::info!("Saved {}", path.display());
    Ok(path)
}
