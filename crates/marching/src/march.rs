//! Contour stamping.
//!
//! Every cell of the occupancy grid is classified by its four corners and the
//! matching stencil overwrites the cell's `step_x x step_y` pixel block.
//! Blocks of different cells never overlap, so cells can be stamped in any
//! order and by any number of workers as long as each cell has one owner.

use std::ops::Range;

use raster::{PixelBuffer, Rgb};

use crate::grid::{GridGeometry, GridView, OccupancyGrid};
use crate::stencil::{StencilRefs, StencilSet};

/// Configuration index from the four corner values (each `0` or `1`).
#[inline]
pub fn configuration_index(top_left: u8, top_right: u8, bottom_right: u8, bottom_left: u8) -> u8 {
    8 * top_left + 4 * top_right + 2 * bottom_right + bottom_left
}

/// Stamp every cell of `grid` into `image`.
///
/// `grid` must have been sampled from an image of the same size with the
/// same steps, and the stencils must be `step_x x step_y`. Pixels right of
/// `p * step_x` or below `q * step_y` are left untouched.
pub fn march(
    image: &mut PixelBuffer,
    grid: &OccupancyGrid,
    stencils: &StencilSet,
    step_x: usize,
    step_y: usize,
) {
    let geom = GridGeometry::new(image.width(), image.height(), step_x, step_y);
    assert_eq!(
        (grid.cols(), grid.rows()),
        (geom.points_x(), geom.points_y()),
        "grid does not match {}x{} image at step {step_x}x{step_y}",
        image.width(),
        image.height()
    );
    assert_eq!(
        (stencils.width(), stencils.height()),
        (step_x, step_y),
        "stencil size does not match step"
    );

    let band_len = geom.cells_y * step_y * geom.width;
    stamp_rows(
        &mut image.pixels_mut()[..band_len],
        &geom,
        grid.view(),
        &stencils.refs(),
        0..geom.cells_y,
    );
}

/// Stamp the cells of grid rows `rows` into `band`.
///
/// `band` holds image rows `rows.start * step_y .. rows.end * step_y`,
/// row-major with the full image width.
pub fn stamp_rows(
    band: &mut [Rgb],
    geom: &GridGeometry,
    grid: GridView<'_>,
    stencils: &StencilRefs<'_>,
    rows: Range<usize>,
) {
    let width = geom.width;
    assert_eq!(
        band.len(),
        rows.len() * geom.step_y * width,
        "pixel band does not match cell rows {rows:?}"
    );

    for (local, gy) in rows.enumerate() {
        let top = local * geom.step_y;
        for gx in 0..geom.cells_x {
            let stencil = stencils.get(grid.configuration(gx, gy));
            let x0 = gx * geom.step_x;
            for sy in 0..geom.step_y {
                let dst = (top + sy) * width + x0;
                band[dst..dst + geom.step_x].copy_from_slice(stencil.row(sy));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::sample_grid;

    /// Stencil `k` is a solid gray of value `k * 16`.
    fn marked(step: usize) -> StencilSet {
        let stencils = (0..16)
            .map(|k| PixelBuffer::filled(step, step, Rgb::gray(k as u8 * 16)))
            .collect();
        StencilSet::new(stencils).unwrap()
    }

    #[test]
    fn test_configuration_index_weights() {
        assert_eq!(configuration_index(0, 0, 0, 0), 0);
        assert_eq!(configuration_index(1, 0, 0, 0), 8);
        assert_eq!(configuration_index(0, 1, 0, 0), 4);
        assert_eq!(configuration_index(0, 0, 1, 0), 2);
        assert_eq!(configuration_index(0, 0, 0, 1), 1);
        assert_eq!(configuration_index(1, 1, 1, 1), 15);
    }

    #[test]
    fn test_stamps_each_cell_with_its_configuration() {
        // 2x2 cells, grid 3x3:
        // 1 0 0
        // 0 0 0
        // 0 0 1
        let grid = OccupancyGrid::from_cells(3, 3, vec![1, 0, 0, 0, 0, 0, 0, 0, 1]);
        let mut img = PixelBuffer::filled(8, 8, Rgb::new(1, 2, 3));
        march(&mut img, &grid, &marked(4), 4, 4);

        assert_eq!(img.get(0, 0), Rgb::gray(8 * 16));
        assert_eq!(img.get(7, 0), Rgb::gray(0));
        assert_eq!(img.get(0, 7), Rgb::gray(0));
        assert_eq!(img.get(7, 7), Rgb::gray(2 * 16));
    }

    #[test]
    fn test_remainder_strips_untouched() {
        let sentinel = Rgb::new(1, 2, 3);
        let mut img = PixelBuffer::filled(20, 19, sentinel);
        let grid = sample_grid(&img, 8, 8, 200);
        march(&mut img, &grid, &marked(8), 8, 8);

        for y in 0..19 {
            for x in 0..20 {
                let stamped = x < 16 && y < 16;
                assert_eq!(img.get(x, y) != sentinel, stamped, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_stamp_rows_in_two_bands_matches_whole() {
        let mut img = PixelBuffer::filled(24, 24, Rgb::WHITE);
        for y in 0..24 {
            for x in 0..24 {
                if x + y < 20 {
                    img.set(x, y, Rgb::BLACK);
                }
            }
        }
        let grid = sample_grid(&img, 4, 4, 200);
        let stencils = marked(4);

        let mut whole = img.clone();
        march(&mut whole, &grid, &stencils, 4, 4);

        let geom = GridGeometry::new(24, 24, 4, 4);
        let refs = stencils.refs();
        let mut split = img.clone();
        let (top, bottom) = split.pixels_mut().split_at_mut(2 * 4 * 24);
        stamp_rows(bottom, &geom, grid.view(), &refs, 2..6);
        stamp_rows(top, &geom, grid.view(), &refs, 0..2);
        assert_eq!(split, whole);
    }

    #[test]
    #[should_panic(expected = "grid does not match")]
    fn test_mismatched_grid_panics() {
        let mut img = PixelBuffer::new(16, 16);
        let grid = OccupancyGrid::from_cells(2, 2, vec![0; 4]);
        march(&mut img, &grid, &marked(8), 4, 4);
    }
}
