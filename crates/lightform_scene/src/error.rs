//! Scene error types

use thiserror::Error;

use crate::id::{CameraId, LightId, SignalId};

/// Scene store and persistence errors
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Light not found: {0}")]
    LightNotFound(LightId),

    #[error("Camera not found: {0}")]
    CameraNotFound(CameraId),

    #[error("Signal not found: {0}")]
    SignalNotFound(SignalId),

    #[error("No light is selected")]
    NothingSelected,

    #[error("Invalid color '{0}'")]
    InvalidColor(String),

    #[error("Invalid partial update: {0}")]
    InvalidPatch(String),

    #[error("Unsupported schema version {found} (newest known is {supported})")]
    UnsupportedVersion { found: u64, supported: u32 },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;
