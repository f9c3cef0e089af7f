//! Error types for the contour pipeline.

use raster::RasterError;
use thiserror::Error;

/// Errors that can occur while building or running the pipeline.
///
/// Every variant is fatal to the run; nothing is retried.
#[derive(Error, Debug)]
pub enum MarchError {
    /// Invalid pipeline configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A stencil file could not be read.
    #[error("failed to load stencil {index}: {source}")]
    StencilLoad {
        index: usize,
        #[source]
        source: RasterError,
    },

    /// A stencil does not have the step dimensions.
    #[error("stencil {index} is {width}x{height}, expected {expected_width}x{expected_height}")]
    StencilSize {
        index: usize,
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },

    /// A stencil source panicked while loading.
    #[error("stencil source panicked loading stencil {index}: {message}")]
    StencilPanic { index: usize, message: String },

    /// The stencil set was not fully populated after the loading phase.
    #[error("stencil set incomplete: {loaded} of {expected} stencils loaded")]
    StencilSetIncomplete { loaded: usize, expected: usize },

    /// The worker pool could not be created.
    #[error("failed to start worker pool: {0}")]
    ThreadPool(String),

    #[error(transparent)]
    Raster(#[from] RasterError),
}

impl MarchError {
    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for the error workers report when another worker's stencil
    /// load failed.
    pub fn is_secondary(&self) -> bool {
        matches!(self, Self::StencilSetIncomplete { .. })
    }
}

/// Result type for pipeline operations.
pub type MarchResult<T> = std::result::Result<T, MarchError>;
