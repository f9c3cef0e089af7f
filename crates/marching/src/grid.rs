//! Binary occupancy grid sampled from image luminance.
//!
//! For an image of `width x height` and steps `step_x, step_y` the grid has
//! `(p + 1) x (q + 1)` points, `p = width / step_x`, `q = height / step_y`.
//! Point `(gx, gy)` samples pixel `(gx * step_x, gy * step_y)`, except the
//! last column (`gx == p`) which samples `x = width - 1` and the last row
//! (`gy == q`) which samples `y = height - 1`. The lattice position there may
//! fall outside the image, the image's own last column/row never does.
//!
//! Points are stored row-major by `gy`.

use std::ops::Range;

use raster::{PixelBuffer, PixelView, Rgb};

use crate::march::configuration_index;

/// Grid value for one sampled pixel: `0` if brighter than `threshold`,
/// `1` otherwise.
#[inline]
pub fn occupancy(pixel: Rgb, threshold: u8) -> u8 {
    if pixel.luminance() > threshold {
        0
    } else {
        1
    }
}

/// Cell and point counts for an image/step pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    pub step_x: usize,
    pub step_y: usize,
    /// Cells across (`p`).
    pub cells_x: usize,
    /// Cells down (`q`).
    pub cells_y: usize,
}

impl GridGeometry {
    pub fn new(width: usize, height: usize, step_x: usize, step_y: usize) -> Self {
        assert!(step_x > 0 && step_y > 0, "grid step must be positive");
        Self {
            width,
            height,
            step_x,
            step_y,
            cells_x: width / step_x,
            cells_y: height / step_y,
        }
    }

    /// Grid points per row (`p + 1`).
    #[inline]
    pub fn points_x(&self) -> usize {
        self.cells_x + 1
    }

    /// Grid rows (`q + 1`).
    #[inline]
    pub fn points_y(&self) -> usize {
        self.cells_y + 1
    }

    /// Total grid points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points_x() * self.points_y()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pixel sampled for grid point `(gx, gy)`.
    #[inline]
    pub fn sample_point(&self, gx: usize, gy: usize) -> (usize, usize) {
        let x = if gx < self.cells_x {
            gx * self.step_x
        } else {
            self.width - 1
        };
        let y = if gy < self.cells_y {
            gy * self.step_y
        } else {
            self.height - 1
        };
        (x, y)
    }
}

/// Owned occupancy grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    cols: usize,
    rows: usize,
    cells: Vec<u8>,
}

impl OccupancyGrid {
    /// Wrap row-major cell values. Panics if the length does not match.
    pub fn from_cells(cols: usize, rows: usize, cells: Vec<u8>) -> Self {
        assert_eq!(cells.len(), cols * rows, "grid cell count mismatch");
        Self { cols, rows, cells }
    }

    /// Points per row (`p + 1`).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Rows of points (`q + 1`).
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn get(&self, gx: usize, gy: usize) -> u8 {
        self.view().get(gx, gy)
    }

    /// Configuration index of cell `(gx, gy)`.
    pub fn configuration(&self, gx: usize, gy: usize) -> u8 {
        self.view().configuration(gx, gy)
    }

    /// Number of points set to `1`.
    pub fn count_ones(&self) -> usize {
        self.cells.iter().filter(|&&c| c == 1).count()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn view(&self) -> GridView<'_> {
        GridView::new(self.cols, self.rows, &self.cells)
    }
}

/// Borrowed occupancy grid.
#[derive(Debug, Clone, Copy)]
pub struct GridView<'a> {
    cols: usize,
    rows: usize,
    cells: &'a [u8],
}

impl<'a> GridView<'a> {
    pub fn new(cols: usize, rows: usize, cells: &'a [u8]) -> Self {
        assert_eq!(cells.len(), cols * rows, "grid cell count mismatch");
        Self { cols, rows, cells }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn get(&self, gx: usize, gy: usize) -> u8 {
        assert!(gx < self.cols && gy < self.rows, "grid point ({gx}, {gy}) out of range");
        self.cells[gy * self.cols + gx]
    }

    /// `8 * top-left + 4 * top-right + 2 * bottom-right + 1 * bottom-left`
    /// for the cell whose top-left point is `(gx, gy)`.
    #[inline]
    pub fn configuration(&self, gx: usize, gy: usize) -> u8 {
        configuration_index(
            self.get(gx, gy),
            self.get(gx + 1, gy),
            self.get(gx + 1, gy + 1),
            self.get(gx, gy + 1),
        )
    }
}

/// Sample the whole occupancy grid of `image`.
pub fn sample_grid(image: &PixelBuffer, step_x: usize, step_y: usize, threshold: u8) -> OccupancyGrid {
    assert!(!image.is_empty(), "cannot sample an empty image");
    let geom = GridGeometry::new(image.width(), image.height(), step_x, step_y);
    let mut cells = vec![0u8; geom.len()];

    let (body, last) = cells.split_at_mut(geom.cells_y * geom.points_x());
    fill_rows(image.view(), &geom, threshold, body, 0..geom.cells_y);
    fill_last_row(image.view(), &geom, threshold, last, 0..geom.points_x());

    OccupancyGrid::from_cells(geom.points_x(), geom.points_y(), cells)
}

/// Fill grid rows `rows` (each a subset of `0..q`), last column included.
///
/// `out` holds exactly those rows.
pub fn fill_rows(
    image: PixelView<'_>,
    geom: &GridGeometry,
    threshold: u8,
    out: &mut [u8],
    rows: Range<usize>,
) {
    let cols = geom.points_x();
    assert_eq!(out.len(), rows.len() * cols, "grid band does not match rows {rows:?}");

    for (gy, row) in rows.zip(out.chunks_exact_mut(cols)) {
        for (gx, cell) in row.iter_mut().enumerate() {
            let (x, y) = geom.sample_point(gx, gy);
            *cell = occupancy(image.get(x, y), threshold);
        }
    }
}

/// Fill points `cols` (a subset of `0..=p`) of the last grid row (`gy == q`).
///
/// `out` holds exactly those points.
pub fn fill_last_row(
    image: PixelView<'_>,
    geom: &GridGeometry,
    threshold: u8,
    out: &mut [u8],
    cols: Range<usize>,
) {
    assert_eq!(out.len(), cols.len(), "grid slice does not match columns {cols:?}");
    let gy = geom.cells_y;
    for (gx, cell) in cols.zip(out.iter_mut()) {
        let (x, y) = geom.sample_point(gx, gy);
        *cell = occupancy(image.get(x, y), threshold);
    }
}
