//! Studio configuration
//!
//! # Configuration Sources (first match wins)
//!
//! 1. Command line: `--config <path>`
//! 2. Environment variable: `LIGHTFORM_CONFIG=<path>`
//! 3. `./lightform.toml` in the working directory
//! 4. Built-in defaults
//!
//! An explicitly named file that cannot be read is an error; a missing
//! `./lightform.toml` is not.
//!
//! # Example Config File
//!
//! ```toml
//! [storage]
//! dir = ".lightform"
//!
//! [environment]
//! face_size = 256
//! background = "#000000"
//! falloff = "point"      # point, rod, rect
//! texture_root = "."
//!
//! [export]
//! format = "hdr"         # hdr, png, jpeg, webp
//! resolution = "1k"      # 1k, 2k, 4k
//! dir = "export"
//!
//! [animation]
//! enabled = true
//! frames = 60
//! fps = 60.0
//!
//! [code]
//! enabled = true
//! path = "export/Env.jsx"
//! ```

use std::path::{Path, PathBuf};

use lightform_export::{ExportFormat, ExportOptions, ResolutionPreset};
use lightform_scene::Color;
use lightform_shade::{FalloffKind, RectFalloff, RodFalloff};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "LIGHTFORM_CONFIG";
/// Config file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "lightform.toml";

/// Where scene state is persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from(".lightform") }
    }
}

/// Scrim falloff form by name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FalloffName {
    #[default]
    Point,
    Rod,
    Rect,
}

impl FalloffName {
    pub fn kind(self) -> FalloffKind {
        match self {
            Self::Point => FalloffKind::Point,
            Self::Rod => FalloffKind::Rod(RodFalloff::default()),
            Self::Rect => FalloffKind::Rect(RectFalloff::default()),
        }
    }
}

/// Cubemap rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Cubemap face size in texels
    pub face_size: u32,
    /// Fill behind all panels
    pub background: Option<Color>,
    pub falloff: FalloffName,
    /// Directory texture keys resolve against
    pub texture_root: PathBuf,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            face_size: 256,
            background: None,
            falloff: FalloffName::Point,
            texture_root: PathBuf::from("."),
        }
    }
}

/// HDRI export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: ExportFormat,
    pub resolution: ResolutionPreset,
    pub jpeg_quality: u8,
    pub dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Hdr,
            resolution: ResolutionPreset::OneK,
            jpeg_quality: 100,
            dir: PathBuf::from("export"),
        }
    }
}

impl ExportConfig {
    pub fn options(&self) -> ExportOptions {
        ExportOptions { format: self.format, preset: self.resolution, jpeg_quality: self.jpeg_quality }
    }
}

/// Frame simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub enabled: bool,
    /// Frames simulated before the export frame
    pub frames: u32,
    pub fps: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self { enabled: true, frames: 1, fps: 60.0 }
    }
}

impl AnimationConfig {
    /// Playback time of `frame`
    pub fn time_of(&self, frame: u32) -> f64 {
        frame as f64 / self.fps
    }
}

/// Generated code output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeConfig {
    pub enabled: bool,
    pub path: PathBuf,
    /// `resolution` prop of the generated environment
    pub resolution: u32,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self { enabled: true, path: PathBuf::from("export/Env.jsx"), resolution: 2048 }
    }
}

/// Complete studio configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub storage: StorageConfig,
    pub environment: EnvironmentConfig,
    pub export: ExportConfig,
    pub animation: AnimationConfig,
    pub code: CodeConfig,
    /// File this config came from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl StudioConfig {
    /// Load from the first configured source
    pub fn load(args: &[String]) -> ConfigResult<Self> {
        let env = std::env::var(CONFIG_ENV).ok().filter(|v| !v.is_empty());
        match locate(args, env)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.is_file() {
                    Self::load_from_file(local)
                } else {
                    log::info!("No config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load and validate a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        config.source = Some(path.to_path_buf());
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.environment.face_size == 0 {
            return Err(ConfigError::Invalid("environment.face_size must be positive".into()));
        }
        if !(self.animation.fps.is_finite() && self.animation.fps > 0.0) {
            return Err(ConfigError::Invalid(format!("animation.fps must be positive, got {}", self.animation.fps)));
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        let (w, h) = self.export.resolution.size();
        log::info!("Storage: {}", self.storage.dir.display());
        log::info!(
            "Environment: {}px faces, falloff {:?}, background {}",
            self.environment.face_size,
            self.environment.falloff,
            self.environment.background.map(|c| c.to_hex()).unwrap_or_else(|| "none".into())
        );
        log::info!("Export: {} {}x{} into {}", self.export.format, w, h, self.export.dir.display());
        if self.animation.enabled {
            log::info!("Animation: {} frame(s) at {} fps", self.animation.frames, self.animation.fps);
        }
    }
}

/// Config path named by `--config` or the environment, if any
pub fn locate(args: &[String], env: Option<String>) -> ConfigResult<Option<PathBuf>> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(value) = arg.strip_prefix("--config=") {
            return Ok(Some(PathBuf::from(value)));
        }
        if arg == "--config" {
            return match iter.next() {
                Some(value) => Ok(Some(PathBuf::from(value))),
                None => Err(ConfigError::MissingValue("--config")),
            };
        }
    }
    Ok(env.map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_locate_priority() {
        let env = Some("env.toml".to_string());
        assert_eq!(
            locate(&args(&["lightform", "--config", "cli.toml"]), env.clone()).unwrap(),
            Some(PathBuf::from("cli.toml"))
        );
        assert_eq!(
            locate(&args(&["lightform", "--config=eq.toml"]), env.clone()).unwrap(),
            Some(PathBuf::from("eq.toml"))
        );
        assert_eq!(locate(&args(&["lightform"]), env).unwrap(), Some(PathBuf::from("env.toml")));
        assert_eq!(locate(&args(&["lightform"]), None).unwrap(), None);
    }

    #[test]
    fn test_locate_missing_value() {
        assert!(matches!(
            locate(&args(&["lightform", "--config"]), None),
            Err(ConfigError::MissingValue("--config"))
        ));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = StudioConfig::from_toml(
            r##"
            [environment]
            face_size = 64
            background = "#102030"
            falloff = "rect"

            [export]
            format = "png"
            resolution = "2k"
            "##,
        )
        .unwrap();
        assert_eq!(config.environment.face_size, 64);
        assert_eq!(config.environment.background, Some(Color::rgb(0x10, 0x20, 0x30)));
        assert_eq!(config.environment.falloff, FalloffName::Rect);
        assert_eq!(config.export.format, ExportFormat::Png);
        assert_eq!(config.export.resolution, ResolutionPreset::TwoK);
        assert_eq!(config.animation, AnimationConfig::default());
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            StudioConfig::from_toml("[environment]\nface_size = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(StudioConfig::from_toml("[animation]\nfps = -1.0"), Err(ConfigError::Invalid(_))));
        assert!(matches!(StudioConfig::from_toml("[export]\nresolution = \"8k\""), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studio.toml");
        std::fs::write(&path, "[animation]\nframes = 10\n").unwrap();
        let config = StudioConfig::load_from_file(&path).unwrap();
        assert_eq!(config.animation.frames, 10);
        assert_eq!(config.source.as_deref(), Some(path.as_path()));

        let missing = StudioConfig::load_from_file(dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }
}
