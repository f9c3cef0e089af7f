//! Static work partitioning across a fixed worker pool.
//!
//! Every phase splits its index space `[0, total)` with the same formula:
//!
//! ```text
//! start = floor(id * total / workers)
//! end   = min(floor((id + 1) * total / workers), total)
//! ```
//!
//! Worker `id`'s `end` is computed by the exact same expression as worker
//! `id + 1`'s `start`, so consecutive slices share their boundary and the
//! union over all ids is `[0, total)` with no gaps or overlaps. Slice lengths
//! differ by at most one. When `total < workers` some slices are empty.

use std::ops::Range;

/// Slice of `[0, total)` owned by worker `id` out of `workers`.
pub fn partition_range(id: usize, workers: usize, total: usize) -> Range<usize> {
    debug_assert!(workers > 0, "worker count must be positive");
    debug_assert!(id < workers, "worker id {id} out of range for {workers} workers");

    let bound = |k: usize| (k as f64 * total as f64 / workers as f64) as usize;
    let start = bound(id);
    let end = bound(id + 1).min(total);
    start..end
}

/// A worker's position in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub id: usize,
    pub workers: usize,
}

impl Partition {
    pub fn new(id: usize, workers: usize) -> Self {
        assert!(
            id < workers,
            "worker id {id} out of range for {workers} workers"
        );
        Self { id, workers }
    }

    /// This worker's slice of `[0, total)`.
    #[inline]
    pub fn range(&self, total: usize) -> Range<usize> {
        partition_range(self.id, self.workers, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exact_cover(workers: usize, total: usize) {
        let mut next = 0;
        for id in 0..workers {
            let r = partition_range(id, workers, total);
            assert_eq!(
                r.start, next,
                "gap or overlap at worker {id} ({workers} workers, total {total})"
            );
            assert!(r.start <= r.end);
            next = r.end;
        }
        assert_eq!(next, total, "{workers} workers do not cover {total}");
    }

    #[test]
    fn test_partition_covers_exactly() {
        for workers in 1..=64 {
            for total in 0..=300 {
                assert_exact_cover(workers, total);
            }
        }
    }

    #[test]
    fn test_partition_large_totals() {
        for workers in [1, 2, 3, 7, 8, 13, 64, 255, 256] {
            for total in [2048, 4095, 4096, 2049 * 2049, 1 << 24] {
                assert_exact_cover(workers, total);
            }
        }
    }

    #[test]
    fn test_partition_is_balanced() {
        for workers in 1..=32 {
            for total in 0..=200 {
                let lens: Vec<usize> = (0..workers)
                    .map(|id| partition_range(id, workers, total).len())
                    .collect();
                let min = *lens.iter().min().unwrap();
                let max = *lens.iter().max().unwrap();
                assert!(max - min <= 1, "{workers} workers, total {total}: {lens:?}");
            }
        }
    }

    #[test]
    fn test_fewer_items_than_workers() {
        let ranges: Vec<_> = (0..8).map(|id| partition_range(id, 8, 3)).collect();
        let non_empty = ranges.iter().filter(|r| !r.is_empty()).count();
        assert_eq!(non_empty, 3);
        assert!(ranges.iter().all(|r| r.len() <= 1));
    }

    #[test]
    fn test_zero_total_gives_empty_slices() {
        for id in 0..4 {
            assert!(partition_range(id, 4, 0).is_empty());
        }
    }

    #[test]
    fn test_stencil_split_for_four_workers() {
        let p: Vec<_> = (0..4).map(|id| Partition::new(id, 4).range(16)).collect();
        assert_eq!(p, vec![0..4, 4..8, 8..12, 12..16]);
    }

    #[test]
    fn test_uneven_split() {
        let p: Vec<_> = (0..3).map(|id| Partition::new(id, 3).range(16)).collect();
        assert_eq!(p, vec![0..5, 5..10, 10..16]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_partition_rejects_bad_id() {
        Partition::new(4, 4);
    }
}
