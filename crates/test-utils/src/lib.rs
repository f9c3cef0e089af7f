//! Shared test utilities for the contour workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic image generators with known contours
//! - Stencil fixtures (marked stencils, on-disk stencil directories)
//! - `assert_images_eq!` for pixel-exact comparisons
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{vertical_edge_image, marked_stencils};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Asserts two images are identical, reporting the first differing pixel.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_images_eq;
///
/// assert_images_eq!(parallel.image, sequential.image);
/// ```
#[macro_export]
macro_rules! assert_images_eq {
    ($left:expr, $right:expr) => {{
        let left: &$crate::PixelBuffer = &$left;
        let right: &$crate::PixelBuffer = &$right;
        assert_eq!(
            (left.width(), left.height()),
            (right.width(), right.height()),
            "image sizes differ"
        );
        if let Some(i) = left
            .pixels()
            .iter()
            .zip(right.pixels())
            .position(|(a, b)| a != b)
        {
            panic!(
                "images differ at ({}, {}): {:?} != {:?}",
                i % left.width(),
                i / left.width(),
                left.pixels()[i],
                right.pixels()[i]
            );
        }
    }};
}

#[doc(hidden)]
pub use raster::PixelBuffer;
