//! The sixteen contour stencils, one per corner configuration.
//!
//! Stencil `k` is the image stamped into a cell whose configuration index is
//! `k` (see [`crate::march::configuration_index`]). All stencils share the
//! sample step as their size.

use std::path::{Path, PathBuf};

use image::RgbImage;
use imageproc::drawing::draw_line_segment_mut;
use raster::io::from_rgb_image;
use raster::{read_image, write_image, PixelBuffer};
use tracing::{debug, warn};

use crate::config::STENCIL_COUNT;
use crate::error::{MarchError, MarchResult};

/// Where stencils come from. Implementations are shared by all workers.
///
/// A panic inside `load` is caught by the pipeline and reported as
/// [`MarchError::StencilPanic`]; the run then fails like any other load error.
pub trait StencilSource: Sync {
    /// Load stencil `index` (`0..16`).
    fn load(&self, index: usize) -> MarchResult<PixelBuffer>;
}

/// Stencils stored as `{dir}/{index}.ppm`.
#[derive(Debug, Clone)]
pub struct DirectoryStencils {
    dir: PathBuf,
}

impl DirectoryStencils {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, index: usize) -> PathBuf {
        stencil_path(&self.dir, index)
    }
}

impl StencilSource for DirectoryStencils {
    fn load(&self, index: usize) -> MarchResult<PixelBuffer> {
        let path = self.path(index);
        read_image(&path).map_err(|source| MarchError::StencilLoad { index, source })
    }
}

/// File name of stencil `index` inside `dir`.
pub fn stencil_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("{index}.ppm"))
}

/// Load stencil `index` from `source` and check it is `step_x x step_y`.
pub fn load_stencil(
    source: &dyn StencilSource,
    index: usize,
    step_x: usize,
    step_y: usize,
) -> MarchResult<PixelBuffer> {
    let stencil = source.load(index)?;
    check_size(index, &stencil, step_x, step_y)?;
    Ok(stencil)
}

fn check_size(index: usize, stencil: &PixelBuffer, width: usize, height: usize) -> MarchResult<()> {
    if stencil.width() != width || stencil.height() != height {
        warn!(
            index,
            width = stencil.width(),
            height = stencil.height(),
            "Rejected stencil with wrong size"
        );
        return Err(MarchError::StencilSize {
            index,
            width: stencil.width(),
            height: stencil.height(),
            expected_width: width,
            expected_height: height,
        });
    }
    Ok(())
}

/// A complete, validated set of sixteen equally sized stencils.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StencilSet {
    stencils: Vec<PixelBuffer>,
    width: usize,
    height: usize,
}

impl StencilSet {
    /// Build from sixteen buffers of identical, non-zero size.
    pub fn new(stencils: Vec<PixelBuffer>) -> MarchResult<Self> {
        if stencils.len() != STENCIL_COUNT {
            return Err(MarchError::config(format!(
                "expected {STENCIL_COUNT} stencils, got {}",
                stencils.len()
            )));
        }
        let (width, height) = (stencils[0].width(), stencils[0].height());
        if width == 0 || height == 0 {
            return Err(MarchError::config("stencils must not be empty"));
        }
        for (index, stencil) in stencils.iter().enumerate() {
            check_size(index, stencil, width, height)?;
        }
        Ok(Self {
            stencils,
            width,
            height,
        })
    }

    /// Read `{dir}/0.ppm` .. `{dir}/15.ppm`. Any failure aborts the load.
    pub fn load(dir: impl AsRef<Path>, step_x: usize, step_y: usize) -> MarchResult<Self> {
        Self::load_from(&DirectoryStencils::new(dir.as_ref()), step_x, step_y)
    }

    /// Load all sixteen stencils from `source`, sequentially.
    pub fn load_from(source: &dyn StencilSource, step_x: usize, step_y: usize) -> MarchResult<Self> {
        let stencils = (0..STENCIL_COUNT)
            .map(|index| load_stencil(source, index, step_x, step_y))
            .collect::<MarchResult<Vec<_>>>()?;
        Self::new(stencils)
    }

    /// Draw the canonical marching-squares fragments: a white cell with a
    /// black segment between the midpoints of every edge whose two corners
    /// disagree. Saddle configurations 5 and 10 get two segments.
    pub fn synthesize(step_x: usize, step_y: usize) -> MarchResult<Self> {
        let (w, h) = match (u32::try_from(step_x), u32::try_from(step_y)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
            _ => {
                return Err(MarchError::config(format!(
                    "invalid stencil size {step_x}x{step_y}"
                )))
            }
        };

        let mut stencils = Vec::with_capacity(STENCIL_COUNT);
        for k in 0..STENCIL_COUNT as u8 {
            let mut img = RgbImage::from_pixel(w, h, image::Rgb([255, 255, 255]));
            for &(a, b) in segments(k) {
                draw_line_segment_mut(&mut img, a.point(w, h), b.point(w, h), image::Rgb([0, 0, 0]));
            }
            stencils.push(from_rgb_image(&img)?);
        }
        debug!(width = w, height = h, "Synthesized stencil set");
        Self::new(stencils)
    }

    /// Write every stencil to `{dir}/{index}.ppm`, creating `dir` if needed.
    pub fn save(&self, dir: impl AsRef<Path>) -> MarchResult<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(raster::RasterError::from)?;
        for (index, stencil) in self.stencils.iter().enumerate() {
            write_image(stencil, stencil_path(dir, index))?;
        }
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, index: usize) -> &PixelBuffer {
        &self.stencils[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &PixelBuffer> {
        self.stencils.iter()
    }

    pub fn refs(&self) -> StencilRefs<'_> {
        StencilRefs {
            stencils: self.stencils.iter().collect(),
        }
    }
}

impl StencilSource for StencilSet {
    fn load(&self, index: usize) -> MarchResult<PixelBuffer> {
        Ok(self.stencils[index].clone())
    }
}

/// Borrowed lookup table from configuration index to stencil.
#[derive(Debug, Clone)]
pub struct StencilRefs<'a> {
    stencils: Vec<&'a PixelBuffer>,
}

impl<'a> StencilRefs<'a> {
    /// Borrow a fully loaded slot array. `None` if any slot is empty or the
    /// count is wrong.
    pub fn from_slots(slots: &'a [Option<PixelBuffer>]) -> Option<Self> {
        if slots.len() != STENCIL_COUNT {
            return None;
        }
        let stencils = slots
            .iter()
            .map(Option::as_ref)
            .collect::<Option<Vec<_>>>()?;
        Some(Self { stencils })
    }

    #[inline]
    pub fn get(&self, index: u8) -> &'a PixelBuffer {
        self.stencils[index as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    /// Midpoint of this edge in pixel coordinates of a `w x h` stencil.
    fn point(self, w: u32, h: u32) -> (f32, f32) {
        let (max_x, max_y) = ((w - 1) as f32, (h - 1) as f32);
        match self {
            Edge::Top => (max_x / 2.0, 0.0),
            Edge::Right => (max_x, max_y / 2.0),
            Edge::Bottom => (max_x / 2.0, max_y),
            Edge::Left => (0.0, max_y / 2.0),
        }
    }
}

/// Segments for configuration `k` (bits: 8 top-left, 4 top-right,
/// 2 bottom-right, 1 bottom-left).
fn segments(k: u8) -> &'static [(Edge, Edge)] {
    use Edge::*;
    match k {
        1 | 14 => &[(Left, Bottom)],
        2 | 13 => &[(Bottom, Right)],
        3 | 12 => &[(Left, Right)],
        4 | 11 => &[(Top, Right)],
        5 => &[(Top, Right), (Left, Bottom)],
        6 | 9 => &[(Top, Bottom)],
        7 | 8 => &[(Left, Top)],
        10 => &[(Left, Top), (Bottom, Right)],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raster::Rgb;

    fn dark_pixels(img: &PixelBuffer) -> usize {
        img.pixels().iter().filter(|p| **p == Rgb::BLACK).count()
    }

    #[test]
    fn test_synthesized_set_shape() {
        let set = StencilSet::synthesize(8, 8).unwrap();
        assert_eq!((set.width(), set.height()), (8, 8));
        assert_eq!(set.iter().count(), 16);
        assert!(set.iter().all(|s| s.width() == 8 && s.height() == 8));
    }

    #[test]
    fn test_uniform_configurations_are_blank() {
        let set = StencilSet::synthesize(8, 8).unwrap();
        assert_eq!(dark_pixels(set.get(0)), 0);
        assert_eq!(dark_pixels(set.get(15)), 0);
        for k in 1..15 {
            assert!(dark_pixels(set.get(k)) > 0, "stencil {k} has no line");
        }
    }

    #[test]
    fn test_horizontal_split_draws_middle_row() {
        let set = StencilSet::synthesize(8, 8).unwrap();
        let s = set.get(3);
        // Left (0, 3.5) to right (7, 3.5): one full row of dark pixels
        let dark_rows: Vec<usize> = (0..8)
            .filter(|&y| (0..8).all(|x| s.get(x, y) == Rgb::BLACK))
            .collect();
        assert_eq!(dark_rows.len(), 1);
        assert_eq!(set.get(3), set.get(12));
    }

    #[test]
    fn test_saddles_have_two_segments() {
        let set = StencilSet::synthesize(16, 16).unwrap();
        assert!(dark_pixels(set.get(5)) > dark_pixels(set.get(4)));
        assert!(dark_pixels(set.get(10)) > dark_pixels(set.get(8)));
        assert_ne!(set.get(5), set.get(10));
    }

    #[test]
    fn test_new_rejects_mixed_sizes() {
        let mut stencils = vec![PixelBuffer::new(8, 8); 16];
        stencils[9] = PixelBuffer::new(8, 4);
        let err = StencilSet::new(stencils).unwrap_err();
        assert!(matches!(err, MarchError::StencilSize { index: 9, .. }));
    }

    #[test]
    fn test_new_rejects_wrong_count() {
        assert!(StencilSet::new(vec![PixelBuffer::new(8, 8); 15]).is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let set = StencilSet::synthesize(8, 8).unwrap();
        set.save(dir.path()).unwrap();

        for k in 0..16 {
            assert!(dir.path().join(format!("{k}.ppm")).exists());
        }
        let loaded = StencilSet::load(dir.path(), 8, 8).unwrap();
        assert_eq!(loaded, set);
    }

    #[test]
    fn test_load_rejects_wrong_step() {
        let dir = tempfile::tempdir().unwrap();
        StencilSet::synthesize(8, 8).unwrap().save(dir.path()).unwrap();
        let err = StencilSet::load(dir.path(), 4, 4).unwrap_err();
        assert!(matches!(err, MarchError::StencilSize { index: 0, .. }));
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        StencilSet::synthesize(8, 8).unwrap().save(dir.path()).unwrap();
        std::fs::remove_file(dir.path().join("11.ppm")).unwrap();

        let err = StencilSet::load(dir.path(), 8, 8).unwrap_err();
        assert!(matches!(err, MarchError::StencilLoad { index: 11, .. }));
    }

    #[test]
    fn test_refs_from_slots() {
        let set = StencilSet::synthesize(4, 4).unwrap();
        let mut slots: Vec<Option<PixelBuffer>> = set.iter().cloned().map(Some).collect();
        let refs = StencilRefs::from_slots(&slots).unwrap();
        assert_eq!(refs.get(7), set.get(7));

        slots[3] = None;
        assert!(StencilRefs::from_slots(&slots).is_none());
    }
}
