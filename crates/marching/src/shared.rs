//! Shared storage written by disjoint worker slices.
//!
//! A [`PhaseBuffer`] is shared by reference across the whole pool. During a
//! phase each worker takes a mutable view of the index range the partition
//! formula assigns it; ranges of different workers never overlap, so no two
//! live `&mut` views alias. After the phase barrier the buffer is only read.
//!
//! The access methods are `unsafe` because the compiler cannot see the
//! partition. Each call site states which phase and which range it relies on.

use std::marker::PhantomData;
use std::ops::Range;
use std::ptr::{self, NonNull};
use std::slice;

use raster::buffer::{PixelView, Rgb};

/// Fixed-length heap buffer with phase-partitioned shared mutation.
pub struct PhaseBuffer<T> {
    ptr: NonNull<T>,
    len: usize,
    _owns: PhantomData<Box<[T]>>,
}

// Sound as long as the access contract below is upheld: writers touch
// disjoint ranges, readers only run when no writer is active.
unsafe impl<T: Send> Send for PhaseBuffer<T> {}
unsafe impl<T: Send + Sync> Sync for PhaseBuffer<T> {}

impl<T> PhaseBuffer<T> {
    pub fn new(data: Vec<T>) -> Self {
        let boxed: &mut [T] = Box::leak(data.into_boxed_slice());
        let len = boxed.len();
        Self {
            ptr: NonNull::from(boxed).cast::<T>(),
            len,
            _owns: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Mutable view of `range`.
    ///
    /// # Safety
    ///
    /// For as long as the returned slice lives, no other reference (shared
    /// or mutable) to any element of `range` may exist on any thread.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn range_mut(&self, range: Range<usize>) -> &mut [T] {
        assert!(
            range.start <= range.end && range.end <= self.len,
            "range {range:?} outside buffer of length {}",
            self.len
        );
        slice::from_raw_parts_mut(self.ptr.as_ptr().add(range.start), range.len())
    }

    /// Shared view of the whole buffer.
    ///
    /// # Safety
    ///
    /// No mutable view obtained from [`range_mut`](Self::range_mut) may be
    /// alive on any thread while the returned slice lives.
    pub unsafe fn as_slice(&self) -> &[T] {
        slice::from_raw_parts(self.ptr.as_ptr(), self.len)
    }

    /// Exclusive access; safe because `&mut self` rules out any view.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: `&mut self` guarantees no outstanding views.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    pub fn into_vec(self) -> Vec<T> {
        let this = std::mem::ManuallyDrop::new(self);
        // SAFETY: ptr/len come from the leaked box in `new`, and `this` will
        // not run Drop.
        let boxed =
            unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(this.ptr.as_ptr(), this.len)) };
        boxed.into_vec()
    }
}

impl<T> Drop for PhaseBuffer<T> {
    fn drop(&mut self) {
        // SAFETY: ptr/len come from the leaked box in `new`.
        unsafe {
            drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr(),
                self.len,
            )));
        }
    }
}

/// An RGB image whose pixels live in a [`PhaseBuffer`].
pub struct SharedImage {
    width: usize,
    height: usize,
    pixels: PhaseBuffer<Rgb>,
}

impl SharedImage {
    pub fn new(width: usize, height: usize, pixels: Vec<Rgb>) -> Self {
        assert_eq!(pixels.len(), width * height, "pixel count mismatch");
        Self {
            width,
            height,
            pixels: PhaseBuffer::new(pixels),
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

    /// Mutable view of image rows `rows`, row-major.
    ///
    /// # Safety
    ///
    /// Same contract as [`PhaseBuffer::range_mut`], applied to the pixels of
    /// those rows.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn rows_mut(&self, rows: Range<usize>) -> &mut [Rgb] {
        self.pixels
            .range_mut(rows.start * self.width..rows.end * self.width)
    }

    /// Read-only view of the whole image.
    ///
    /// # Safety
    ///
    /// Same contract as [`PhaseBuffer::as_slice`].
    pub unsafe fn view(&self) -> PixelView<'_> {
        PixelView::new(self.width, self.height, self.pixels.as_slice())
    }

    pub fn into_pixels(self) -> Vec<Rgb> {
        self.pixels.into_vec()
    }
}
