//! Export error types

use std::io;

use lightform_env::EnvError;
use thiserror::Error;

use crate::format::ExportFormat;

/// Export errors
///
/// Any of these aborts the single export; nothing is retried.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Projection failed: {0}")]
    Projection(#[from] EnvError),

    #[error("Encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("{format:?} export needs {expected} pixels")]
    PixelType { format: ExportFormat, expected: &'static str },

    #[error("Pixel buffer holds {actual} values, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    #[error("Unknown resolution preset: {0}")]
    UnknownPreset(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;
