//! Studio error types

use std::io;
use std::path::PathBuf;

use lightform_env::EnvError;
use lightform_export::ExportError;
use lightform_scene::SceneError;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0} expects a value")]
    MissingValue(&'static str),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that end a studio run
#[derive(Debug, Error)]
pub enum StudioError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type StudioResult<T> = Result<T, StudioError>;
