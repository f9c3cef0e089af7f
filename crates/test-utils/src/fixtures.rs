//! Stencil fixtures for contour tests.

use std::path::{Path, PathBuf};

use raster::{write_image, PixelBuffer, Rgb};
use tempfile::TempDir;

/// Number of stencils in a full set.
pub const STENCIL_COUNT: usize = 16;

/// Gray level of marked stencil `k`. Distinct for every `k` in `0..16`.
pub fn marked_level(k: usize) -> u8 {
    (k * 16) as u8
}

/// Sixteen `step x step` stencils, stencil `k` solid gray at
/// [`marked_level`]`(k)`.
///
/// Lets a test read the configuration index of a cell straight off the
/// output image.
pub fn marked_stencils(step: usize) -> Vec<PixelBuffer> {
    (0..STENCIL_COUNT)
        .map(|k| PixelBuffer::filled(step, step, Rgb::gray(marked_level(k))))
        .collect()
}

/// Configuration index stamped at pixel `(x, y)` of an image marched with
/// [`marked_stencils`].
pub fn marked_configuration(image: &PixelBuffer, x: usize, y: usize) -> usize {
    let level = image.get(x, y);
    assert!(
        level.r == level.g && level.g == level.b && level.r % 16 == 0,
        "pixel ({x}, {y}) = {level:?} is not a marked stencil"
    );
    level.r as usize / 16
}

/// Write `stencils` as `{dir}/{k}.ppm`.
pub fn write_stencils(dir: &Path, stencils: &[PixelBuffer]) {
    for (k, stencil) in stencils.iter().enumerate() {
        write_image(stencil, dir.join(format!("{k}.ppm"))).expect("failed to write stencil");
    }
}

/// A temporary stencil directory holding `stencils`.
///
/// The directory is removed when the returned guard drops.
pub fn write_stencil_dir(stencils: &[PixelBuffer]) -> TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    write_stencils(dir.path(), stencils);
    dir
}

/// Path to stencil `k` inside `dir`.
pub fn stencil_file(dir: &Path, k: usize) -> PathBuf {
    dir.join(format!("{k}.ppm"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marked_levels_are_distinct() {
        let levels: std::collections::HashSet<u8> = (0..STENCIL_COUNT).map(marked_level).collect();
        assert_eq!(levels.len(), STENCIL_COUNT);
    }

    #[test]
    fn test_marked_configuration_reads_back() {
        let stencils = marked_stencils(4);
        assert_eq!(stencils.len(), 16);
        assert_eq!(marked_configuration(&stencils[11], 3, 3), 11);
    }

    #[test]
    fn test_write_stencil_dir() {
        let dir = write_stencil_dir(&marked_stencils(4));
        for k in 0..STENCIL_COUNT {
            assert!(stencil_file(dir.path(), k).exists());
        }
    }
}
