//! Configuration for the contour pipeline.

use std::path::PathBuf;

use crate::error::{MarchError, MarchResult};

/// Number of marching-squares corner configurations (4 corners, 1 bit each).
pub const STENCIL_COUNT: usize = 16;

/// Default sample spacing in pixels, both axes.
pub const DEFAULT_STEP: usize = 8;

/// Luminance cutoff: samples brighter than this are outside the contour.
pub const DEFAULT_THRESHOLD: u8 = 200;

/// Maximum width after rescaling.
pub const DEFAULT_MAX_WIDTH: usize = 2048;

/// Maximum height after rescaling.
pub const DEFAULT_MAX_HEIGHT: usize = 2048;

/// Upper bound on the worker pool size.
pub const MAX_WORKERS: usize = 256;

/// Directory the sixteen stencil images are read from.
pub const DEFAULT_STENCIL_DIR: &str = "./contours";

/// Configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Worker pool size, fixed for the whole run.
    pub workers: usize,
    /// Horizontal distance between sample points; also the stencil width.
    pub step_x: usize,
    /// Vertical distance between sample points; also the stencil height.
    pub step_y: usize,
    /// Luminance threshold for the occupancy grid.
    pub threshold: u8,
    pub max_width: usize,
    pub max_height: usize,
    /// Directory holding `0.ppm` .. `15.ppm`.
    pub stencil_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            step_x: DEFAULT_STEP,
            step_y: DEFAULT_STEP,
            threshold: DEFAULT_THRESHOLD,
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            stencil_dir: PathBuf::from(DEFAULT_STENCIL_DIR),
        }
    }
}

impl PipelineConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_step(mut self, step_x: usize, step_y: usize) -> Self {
        self.step_x = step_x;
        self.step_y = step_y;
        self
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_max_resolution(mut self, max_width: usize, max_height: usize) -> Self {
        self.max_width = max_width;
        self.max_height = max_height;
        self
    }

    pub fn with_stencil_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.stencil_dir = dir.into();
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> MarchResult<()> {
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(MarchError::config(format!(
                "workers must be 1-{MAX_WORKERS}, got {}",
                self.workers
            )));
        }

        if self.step_x == 0 || self.step_y == 0 {
            return Err(MarchError::config(format!(
                "step must be > 0, got {}x{}",
                self.step_x, self.step_y
            )));
        }

        // The rescaler divides by (max - 1)
        if self.max_width < 2 || self.max_height < 2 {
            return Err(MarchError::config(format!(
                "max resolution must be at least 2x2, got {}x{}",
                self.max_width, self.max_height
            )));
        }

        Ok(())
    }
}
