//! Downscale-only bicubic rescaling.

use std::borrow::Cow;
use std::ops::Range;

use raster::{sample_bicubic, PixelBuffer, Rgb};

/// True when an image of `width x height` exceeds the maximum resolution.
///
/// Depends on nothing but the four sizes, so every worker evaluating it for
/// the same run gets the same answer.
#[inline]
pub fn needs_rescale(width: usize, height: usize, max_width: usize, max_height: usize) -> bool {
    !(width <= max_width && height <= max_height)
}

/// Rescale `image` to exactly `max_width x max_height` if it exceeds either
/// bound, otherwise return it untouched.
///
/// Never upscales. The aspect ratio is not preserved.
pub fn rescale(image: &PixelBuffer, max_width: usize, max_height: usize) -> Cow<'_, PixelBuffer> {
    if !needs_rescale(image.width(), image.height(), max_width, max_height) {
        return Cow::Borrowed(image);
    }

    let mut scaled = PixelBuffer::new(max_width, max_height);
    rescale_rows(
        image,
        scaled.pixels_mut(),
        max_width,
        max_height,
        0..max_height,
    );
    Cow::Owned(scaled)
}

/// Fill destination rows `rows` of a `dst_width x dst_height` image.
///
/// `band` holds exactly those rows, row-major. Destination pixel `(x, y)`
/// samples the source at `u = x / (dst_width - 1)`, `v = y / (dst_height - 1)`.
pub fn rescale_rows(
    src: &PixelBuffer,
    band: &mut [Rgb],
    dst_width: usize,
    dst_height: usize,
    rows: Range<usize>,
) {
    assert_eq!(
        band.len(),
        rows.len() * dst_width,
        "band does not match rows {rows:?}"
    );
    if dst_width == 0 {
        return;
    }

    for (y, row) in rows.zip(band.chunks_exact_mut(dst_width)) {
        let v = normalized(y, dst_height);
        for (x, px) in row.iter_mut().enumerate() {
            *px = sample_bicubic(src, normalized(x, dst_width), v);
        }
    }
}

#[inline]
fn normalized(i: usize, n: usize) -> f32 {
    if n > 1 {
        i as f32 / (n - 1) as f32
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: usize, height: usize) -> PixelBuffer {
        let mut img = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                img.set(x, y, Rgb::new((x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8));
            }
        }
        img
    }

    #[test]
    fn test_predicate() {
        assert!(!needs_rescale(2048, 2048, 2048, 2048));
        assert!(!needs_rescale(1, 1, 2048, 2048));
        assert!(needs_rescale(2049, 10, 2048, 2048));
        assert!(needs_rescale(10, 2049, 2048, 2048));
    }

    #[test]
    fn test_within_bounds_is_identity() {
        let img = gradient(30, 20);
        let out = rescale(&img, 30, 20);
        match out {
            Cow::Borrowed(b) => assert!(std::ptr::eq(b, &img)),
            Cow::Owned(_) => panic!("in-bounds image was copied"),
        }
    }

    #[test]
    fn test_oversized_image_hits_exact_bounds() {
        let img = gradient(40, 12);
        let out = rescale(&img, 16, 16);
        assert!(matches!(out, Cow::Owned(_)));
        assert_eq!((out.width(), out.height()), (16, 16));
    }

    #[test]
    fn test_every_pixel_matches_sampler() {
        let img = gradient(50, 41);
        let out = rescale(&img, 20, 10);
        for y in 0..10 {
            for x in 0..20 {
                let expected = sample_bicubic(&img, x as f32 / 19.0, y as f32 / 9.0);
                assert_eq!(out.get(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_split_rows_match_whole() {
        let img = gradient(64, 64);
        let whole = rescale(&img, 24, 24).into_owned();

        let mut pixels = vec![Rgb::BLACK; 24 * 24];
        let (top, bottom) = pixels.split_at_mut(10 * 24);
        rescale_rows(&img, bottom, 24, 24, 10..24);
        rescale_rows(&img, top, 24, 24, 0..10);
        assert_eq!(pixels, whole.pixels());
    }
}
