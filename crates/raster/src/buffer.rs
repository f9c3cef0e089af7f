//! Row-major RGB pixel storage.

use crate::error::{RasterError, RasterResult};

/// A single RGB pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Gray pixel with all three channels set to `v`.
    pub const fn gray(v: u8) -> Self {
        Self::new(v, v, v)
    }

    /// Mean of the three channels, truncated.
    #[inline]
    pub fn luminance(self) -> u8 {
        ((self.r as u16 + self.g as u16 + self.b as u16) / 3) as u8
    }

    #[inline]
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

/// Fixed-size RGB image stored row-major (`index = y * width + x`).
///
/// Coordinates outside the buffer are a sizing defect in the caller and
/// panic rather than returning an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl PixelBuffer {
    /// Black image of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Rgb::BLACK)
    }

    /// Image of the given size with every pixel set to `color`.
    pub fn filled(width: usize, height: usize, color: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    /// Wrap existing pixel data, checking `pixels.len() == width * height`.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Rgb>) -> RasterResult<Self> {
        let expected = width * height;
        if pixels.len() != expected {
            return Err(RasterError::SizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from packed `RGBRGB...` bytes.
    pub fn from_rgb_bytes(width: usize, height: usize, bytes: &[u8]) -> RasterResult<Self> {
        if bytes.len() != width * height * 3 {
            return Err(RasterError::SizeMismatch {
                width,
                height,
                expected: width * height,
                actual: bytes.len() / 3,
            });
        }
        let pixels = bytes
            .chunks_exact(3)
            .map(|c| Rgb::new(c[0], c[1], c[2]))
            .collect();
        Self::from_pixels(width, height, pixels)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} buffer",
            self.width,
            self.height
        );
        y * self.width + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.pixels[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: Rgb) {
        let idx = self.index(x, y);
        self.pixels[idx] = color;
    }

    /// One row of pixels.
    pub fn row(&self, y: usize) -> &[Rgb] {
        let start = self.index(0, y);
        &self.pixels[start..start + self.width]
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<Rgb> {
        self.pixels
    }

    /// Packed `RGBRGB...` bytes, row-major.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for p in &self.pixels {
            bytes.extend_from_slice(&p.to_array());
        }
        bytes
    }

    /// Borrowed read-only view.
    pub fn view(&self) -> PixelView<'_> {
        PixelView::new(self.width, self.height, &self.pixels)
    }
}

/// Borrowed, read-only row-major RGB image.
#[derive(Debug, Clone, Copy)]
pub struct PixelView<'a> {
    width: usize,
    height: usize,
    pixels: &'a [Rgb],
}

impl<'a> PixelView<'a> {
    pub fn new(width: usize, height: usize, pixels: &'a [Rgb]) -> Self {
        assert_eq!(
            pixels.len(),
            width * height,
            "view of {width}x{height} needs {} pixels",
            width * height
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Rgb {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} view",
            self.width,
            self.height
        );
        self.pixels[y * self.width + x]
    }

    pub fn pixels(&self) -> &'a [Rgb] {
        self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luminance_truncates() {
        assert_eq!(Rgb::new(255, 255, 255).luminance(), 255);
        assert_eq!(Rgb::new(1, 1, 0).luminance(), 0);
        assert_eq!(Rgb::new(200, 201, 202).luminance(), 201);
        assert_eq!(Rgb::new(255, 255, 0).luminance(), 170);
    }

    #[test]
    fn test_from_pixels_checks_length() {
        assert!(PixelBuffer::from_pixels(2, 2, vec![Rgb::BLACK; 4]).is_ok());
        let err = PixelBuffer::from_pixels(2, 2, vec![Rgb::BLACK; 3]).unwrap_err();
        assert!(matches!(
            err,
            RasterError::SizeMismatch {
                expected: 4,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_row_major_layout() {
        let mut img = PixelBuffer::new(3, 2);
        img.set(2, 1, Rgb::WHITE);
        assert_eq!(img.pixels()[5], Rgb::WHITE);
        assert_eq!(img.row(1)[2], Rgb::WHITE);
        assert_eq!(img.get(2, 0), Rgb::BLACK);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_out_of_bounds_panics() {
        let img = PixelBuffer::new(4, 4);
        img.get(4, 0);
    }

    #[test]
    fn test_rgb_bytes_round_trip() {
        let bytes: Vec<u8> = (0..18).collect();
        let img = PixelBuffer::from_rgb_bytes(3, 2, &bytes).unwrap();
        assert_eq!(img.get(1, 0), Rgb::new(3, 4, 5));
        assert_eq!(img.to_rgb_bytes(), bytes);
    }
}
