//! Output formats and resolution presets

use std::fmt;
use std::str::FromStr;

use lightform_env::{ColorEncoding, PixelType, ProjectorOptions};
use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Base name of every exported file
pub const EXPORT_BASENAME: &str = "envmap";

/// Encoded output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Radiance RGBE, linear float
    #[default]
    Hdr,
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
    Webp,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [Self::Hdr, Self::Png, Self::Jpeg, Self::Webp];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Hdr => "hdr",
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Hdr => "image/vnd.radiance",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    /// `envmap.<ext>`
    pub fn filename(self) -> String {
        format!("{}.{}", EXPORT_BASENAME, self.extension())
    }

    /// Float formats keep values above 1
    pub fn is_hdr(self) -> bool {
        self == Self::Hdr
    }

    /// Readback encoding and pixel type this format is written from
    pub fn readback(self) -> (ColorEncoding, PixelType) {
        if self.is_hdr() {
            (ColorEncoding::Linear, PixelType::F32)
        } else {
            (ColorEncoding::Srgb, PixelType::U8)
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hdr" | "image/vnd.radiance" => Ok(Self::Hdr),
            "png" | "image/png" => Ok(Self::Png),
            "jpg" | "jpeg" | "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "webp" | "image/webp" => Ok(Self::Webp),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

/// Equirectangular output size
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionPreset {
    #[default]
    #[serde(rename = "1k")]
    OneK,
    #[serde(rename = "2k")]
    TwoK,
    #[serde(rename = "4k")]
    FourK,
}

impl ResolutionPreset {
    pub const ALL: [ResolutionPreset; 3] = [Self::OneK, Self::TwoK, Self::FourK];

    /// `(width, height)`, always 2:1
    pub fn size(self) -> (u32, u32) {
        match self {
            Self::OneK => (1024, 512),
            Self::TwoK => (2048, 1024),
            Self::FourK => (4096, 2048),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::OneK => "1k",
            Self::TwoK => "2k",
            Self::FourK => "4k",
        }
    }
}

impl FromStr for ResolutionPreset {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ExportError::UnknownPreset(s.to_string()))
    }
}

/// What to export
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub preset: ResolutionPreset,
    /// JPEG quality, 1..=100
    pub jpeg_quality: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            preset: ResolutionPreset::default(),
            jpeg_quality: 100,
        }
    }
}

impl ExportOptions {
    pub fn new(format: ExportFormat, preset: ResolutionPreset) -> Self {
        Self { format, preset, ..Self::default() }
    }

    /// Projection settings for this export
    pub fn projector(&self) -> ProjectorOptions {
        let (width, height) = self.preset.size();
        let (encoding, pixel_type) = self.format.readback();
        ProjectorOptions { width, height, encoding, pixel_type }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filenames() {
        let names: Vec<_> = ExportFormat::ALL.iter().map(|f| f.filename()).collect();
        assert_eq!(names, ["envmap.hdr", "envmap.png", "envmap.jpg", "envmap.webp"]);
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("JPG".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert_eq!("image/vnd.radiance".parse::<ExportFormat>().unwrap(), ExportFormat::Hdr);
        assert!(matches!("tiff".parse::<ExportFormat>(), Err(ExportError::UnknownFormat(_))));
    }

    #[test]
    fn test_presets_are_two_to_one() {
        for preset in ResolutionPreset::ALL {
            let (w, h) = preset.size();
            assert_eq!(w, h * 2);
            assert_eq!(preset.name().parse::<ResolutionPreset>().unwrap(), preset);
        }
        assert!("8k".parse::<ResolutionPreset>().is_err());
    }

    #[test]
    fn test_hdr_reads_back_linear_float() {
        let opts = ExportOptions::new(ExportFormat::Hdr, ResolutionPreset::TwoK).projector();
        assert_eq!((opts.width, opts.height), (2048, 1024));
        assert_eq!(opts.encoding, ColorEncoding::Linear);
        assert_eq!(opts.pixel_type, PixelType::F32);

        let opts = ExportOptions::new(ExportFormat::Png, ResolutionPreset::OneK).projector();
        assert_eq!(opts.encoding, ColorEncoding::Srgb);
        assert_eq!(opts.pixel_type, PixelType::U8);
    }
}
