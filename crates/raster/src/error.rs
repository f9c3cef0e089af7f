//! Error types for raster operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using RasterError.
pub type RasterResult<T> = Result<T, RasterError>;

/// Errors produced while building, reading or writing pixel buffers.
#[derive(Debug, Error)]
pub enum RasterError {
    /// Pixel data does not match the declared dimensions.
    #[error("pixel data length {actual} does not match {width}x{height} ({expected} pixels)")]
    SizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    /// Image has a zero dimension.
    #[error("image dimensions must be non-zero, got {width}x{height}")]
    EmptyImage { width: usize, height: usize },

    /// Failed to decode an image file.
    #[error("failed to read image {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Failed to encode or write an image file.
    #[error("failed to write image {path}: {message}")]
    Encode { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RasterError {
    /// Create a Decode error for a path.
    pub fn decode(path: impl Into<PathBuf>, msg: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            message: msg.to_string(),
        }
    }

    /// Create an Encode error for a path.
    pub fn encode(path: impl Into<PathBuf>, msg: impl ToString) -> Self {
        Self::Encode {
            path: path.into(),
            message: msg.to_string(),
        }
    }
}
