//! Raster primitives shared by the contour pipeline.
//!
//! - [`PixelBuffer`]: fixed-size, row-major RGB image owned by the pipeline
//! - [`read_image`] / [`write_image`]: file I/O (PPM and the other formats
//!   the `image` crate recognizes by extension)
//! - [`sample_bicubic`]: Catmull-Rom bicubic sampling at normalized coordinates

pub mod buffer;
pub mod error;
pub mod io;
pub mod sample;

pub use buffer::{PixelBuffer, PixelView, Rgb};
pub use error::{RasterError, RasterResult};
pub use io::{read_image, write_image};
pub use sample::sample_bicubic;
