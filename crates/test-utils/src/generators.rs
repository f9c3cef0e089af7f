//! Synthetic test images with predictable contours.
//!
//! Dark pixels are pure black and light pixels pure white, so every generator
//! lands on the same side of any threshold in `1..=254`.

use raster::{PixelBuffer, Rgb};

/// Image of a single gray level.
pub fn solid_image(width: usize, height: usize, level: u8) -> PixelBuffer {
    PixelBuffer::filled(width, height, Rgb::gray(level))
}

/// Black for `x < edge_x`, white from `edge_x` on.
///
/// # Example
///
/// ```
/// use test_utils::vertical_edge_image;
///
/// let img = vertical_edge_image(8, 2, 3);
/// assert_eq!(img.get(2, 0), raster::Rgb::BLACK);
/// assert_eq!(img.get(3, 1), raster::Rgb::WHITE);
/// ```
pub fn vertical_edge_image(width: usize, height: usize, edge_x: usize) -> PixelBuffer {
    from_fn(width, height, |x, _| x < edge_x)
}

/// Black for `y < edge_y`, white from `edge_y` on.
pub fn horizontal_edge_image(width: usize, height: usize, edge_y: usize) -> PixelBuffer {
    from_fn(width, height, |_, y| y < edge_y)
}

/// Black and white squares of side `square`, black at the origin.
pub fn checkerboard_image(width: usize, height: usize, square: usize) -> PixelBuffer {
    assert!(square > 0, "square size must be positive");
    from_fn(width, height, |x, y| (x / square + y / square) % 2 == 0)
}

/// Black disc of `radius` centered in a white image.
pub fn disc_image(width: usize, height: usize, radius: f64) -> PixelBuffer {
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    from_fn(width, height, |x, y| {
        let dx = x as f64 + 0.5 - cx;
        let dy = y as f64 + 0.5 - cy;
        dx * dx + dy * dy <= radius * radius
    })
}

/// Smooth color gradient, distinct channels per axis.
///
/// Useful wherever the exact pixel values matter (rescaling, copying) rather
/// than the thresholded shape.
pub fn gradient_image(width: usize, height: usize) -> PixelBuffer {
    let mut img = PixelBuffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            let b = ((x + y) % 256) as u8;
            img.set(x, y, Rgb::new(r, g, b));
        }
    }
    img
}

fn from_fn(width: usize, height: usize, dark: impl Fn(usize, usize) -> bool) -> PixelBuffer {
    let mut img = PixelBuffer::filled(width, height, Rgb::WHITE);
    for y in 0..height {
        for x in 0..width {
            if dark(x, y) {
                img.set(x, y, Rgb::BLACK);
            }
        }
    }
    img
}
