//! Environment error types

use thiserror::Error;

/// Compositing and projection errors
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("Invalid equirectangular resolution {width}x{height} (must be non-zero and 2:1)")]
    InvalidResolution { width: u32, height: u32 },

    #[error("Invalid cubemap face size {0}")]
    InvalidFaceSize(u32),

    #[error("Readback failed: {0}")]
    Readback(String),
}

/// Result type for environment operations
pub type EnvResult<T> = Result<T, EnvError>;
