//! Bicubic sampling at normalized image coordinates.

use crate::buffer::{PixelBuffer, Rgb};

/// Sample `image` at normalized coordinates `u` (along x) and `v` (along y),
/// both in `[0, 1]`.
///
/// Pixel centers sit at `(i + 0.5) / width`, so `u = 0` and `u = 1` land half a
/// pixel outside the first and last centers; neighbors past the border are
/// clamped to the edge. Each channel is interpolated with a Catmull-Rom cubic
/// over the 4x4 neighborhood, then clamped to `0..=255`.
pub fn sample_bicubic(image: &PixelBuffer, u: f32, v: f32) -> Rgb {
    let x = u * image.width() as f32 - 0.5;
    let y = v * image.height() as f32 - 0.5;

    let x0 = x.floor();
    let y0 = y.floor();
    let xf = x - x0;
    let yf = y - y0;

    let max_x = image.width() as i64 - 1;
    let max_y = image.height() as i64 - 1;

    // 4x4 neighborhood, rows indexed by y offset
    let mut patch = [[Rgb::BLACK; 4]; 4];
    for (j, row) in patch.iter_mut().enumerate() {
        let py = (y0 as i64 + j as i64 - 1).clamp(0, max_y) as usize;
        for (i, px) in row.iter_mut().enumerate() {
            let sx = (x0 as i64 + i as i64 - 1).clamp(0, max_x) as usize;
            *px = image.get(sx, py);
        }
    }

    let channel = |pick: fn(Rgb) -> u8| -> u8 {
        let mut cols = [0.0f32; 4];
        for (j, row) in patch.iter().enumerate() {
            cols[j] = cubic_1d(
                pick(row[0]) as f32,
                pick(row[1]) as f32,
                pick(row[2]) as f32,
                pick(row[3]) as f32,
                xf,
            );
        }
        cubic_1d(cols[0], cols[1], cols[2], cols[3], yf).clamp(0.0, 255.0) as u8
    };

    Rgb::new(channel(|p| p.r), channel(|p| p.g), channel(|p| p.b))
}

/// 1D cubic interpolation using Catmull-Rom spline.
fn cubic_1d(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;

    let a = -0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3;
    let b = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
    let c = -0.5 * p0 + 0.5 * p2;
    let d = p1;

    a * t3 + b * t2 + c * t + d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cubic_1d_endpoints() {
        assert_eq!(cubic_1d(0.0, 10.0, 20.0, 30.0, 0.0), 10.0);
        assert!((cubic_1d(0.0, 10.0, 20.0, 30.0, 1.0) - 20.0).abs() < 1e-4);
        // Linear data stays linear
        assert!((cubic_1d(0.0, 10.0, 20.0, 30.0, 0.5) - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_uniform_image_samples_uniformly() {
        let color = Rgb::new(12, 130, 250);
        let img = PixelBuffer::filled(7, 5, color);
        for &(u, v) in &[(0.0, 0.0), (1.0, 1.0), (0.5, 0.25), (0.13, 0.97)] {
            assert_eq!(sample_bicubic(&img, u, v), color, "at ({u}, {v})");
        }
    }

    #[test]
    fn test_corners_hit_border_pixels() {
        let mut img = PixelBuffer::filled(16, 16, Rgb::gray(100));
        for y in 0..4 {
            for x in 0..4 {
                img.set(x, y, Rgb::gray(10));
                img.set(15 - x, 15 - y, Rgb::gray(240));
            }
        }
        assert_eq!(sample_bicubic(&img, 0.0, 0.0), Rgb::gray(10));
        assert_eq!(sample_bicubic(&img, 1.0, 1.0), Rgb::gray(240));
    }

    #[test]
    fn test_overshoot_is_clamped() {
        // Hard 0 -> 255 step produces Catmull-Rom ringing that must clamp
        let mut img = PixelBuffer::new(8, 1);
        for x in 4..8 {
            img.set(x, 0, Rgb::WHITE);
        }
        for i in 0..=20 {
            let s = sample_bicubic(&img, i as f32 / 20.0, 0.0);
            assert_eq!(s.r, s.g);
            assert_eq!(s.g, s.b);
        }
    }
}
