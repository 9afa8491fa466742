//! Texture loading errors

use thiserror::Error;

/// Failure to produce a decoded texture
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("Texture light has no resource key")]
    EmptyKey,

    #[error("Texture '{0}' not found")]
    NotFound(String),

    #[error("Failed to decode texture '{key}': {message}")]
    Decode { key: String, message: String },

    #[error("Texture '{key}' has invalid dimensions {width}x{height}")]
    InvalidSize { key: String, width: u32, height: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for texture operations
pub type TextureResult<T> = Result<T, TextureError>;
