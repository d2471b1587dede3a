//! Variable-width chunk iteration for vector kernels
//!
//! A vector kernel does not pick its own step width. Every step it tells the
//! vector unit how many elements remain and processes however many elements
//! the unit grants. On fixed-width SIMD the grant is either a full register or
//! zero (which hands the tail to the scalar remainder pass); on a
//! length-agnostic unit such as RVV the grant comes from `vsetvl` and may be
//! any value up to the request, including a short final step.
//!
//! [`VectorChunkCursor`] captures that protocol as an iterator so kernels
//! share one loop shape:
//!
//! ```rust
//! use powprim::simd::chunks::{fixed_width, VectorChunkCursor};
//!
//! let mut cursor = VectorChunkCursor::new(37, fixed_width(16));
//! let widths: Vec<usize> = cursor.by_ref().map(|c| c.width).collect();
//! assert_eq!(widths, vec![16, 16]);
//! // 5 elements are left for the scalar remainder pass
//! assert_eq!(cursor.processed(), 32);
//! assert_eq!(cursor.remaining(), 5);
//! ```

/// One granted step of a vector loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Element index of the first element in this step
    pub offset: usize,
    /// Number of elements the vector unit granted for this step
    pub width: usize,
}

impl Chunk {
    /// Index one past the last element of this step.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.width
    }
}

/// Per-call cursor over `total` elements, advanced by widths granted by a
/// request function.
///
/// The request function receives the remaining element count and returns
/// the granted width. A grant of zero ends the bulk phase; grants larger than
/// the remaining count are clamped.
pub struct VectorChunkCursor<F>
where
    F: FnMut(usize) -> usize,
{
    total: usize,
    processed: usize,
    step_width: usize,
    request: F,
}

impl<F> VectorChunkCursor<F>
where
    F: FnMut(usize) -> usize,
{
    /// Create a cursor over `total` elements.
    #[inline]
    pub fn new(total: usize, request: F) -> Self {
        Self {
            total,
            processed: 0,
            step_width: 0,
            request,
        }
    }

    /// Elements covered by the steps yielded so far.
    #[inline]
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Elements not yet covered.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.total - self.processed
    }

    /// Width of the most recent step, 0 before the first one.
    #[inline]
    pub fn step_width(&self) -> usize {
        self.step_width
    }
}

impl<F> Iterator for VectorChunkCursor<F>
where
    F: FnMut(usize) -> usize,
{
    type Item = Chunk;

    #[inline]
    fn next(&mut self) -> Option<Chunk> {
        let remaining = self.remaining();
        if remaining == 0 {
            return None;
        }

        let width = (self.request)(remaining).min(remaining);
        if width == 0 {
            return None;
        }

        let chunk = Chunk {
            offset: self.processed,
            width,
        };
        self.processed += width;
        self.step_width = width;
        Some(chunk)
    }
}

/// Request function for a fixed-width register of `lanes` elements.
///
/// Grants a full register while at least one fits, then zero.
#[inline]
pub fn fixed_width(lanes: usize) -> impl FnMut(usize) -> usize {
    move |remaining| if remaining >= lanes { lanes } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_leaves_tail() {
        let mut cursor = VectorChunkCursor::new(70, fixed_width(32));
        let chunks: Vec<Chunk> = cursor.by_ref().collect();
        assert_eq!(
            chunks,
            vec![
                Chunk { offset: 0, width: 32 },
                Chunk { offset: 32, width: 32 }
            ]
        );
        assert_eq!(cursor.processed(), 64);
        assert_eq!(cursor.remaining(), 6);
        assert_eq!(cursor.step_width(), 32);
    }

    #[test]
    fn test_empty_input() {
        let mut cursor = VectorChunkCursor::new(0, fixed_width(16));
        assert!(cursor.next().is_none());
        assert_eq!(cursor.processed(), 0);
        assert_eq!(cursor.step_width(), 0);
    }

    #[test]
    fn test_length_agnostic_grants() {
        // behaves like vsetvl with VLMAX = 24
        let vlmax = 24;
        let mut cursor = VectorChunkCursor::new(100, move |remaining: usize| remaining.min(vlmax));
        let widths: Vec<usize> = cursor.by_ref().map(|c| c.width).collect();
        assert_eq!(widths, vec![24, 24, 24, 24, 4]);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_uneven_grants_cover_everything() {
        // a unit may split the last two steps evenly instead of leaving a runt
        let mut cursor = VectorChunkCursor::new(40, |remaining: usize| {
            if remaining > 32 {
                remaining.div_ceil(2)
            } else {
                remaining.min(16)
            }
        });
        let chunks: Vec<Chunk> = cursor.by_ref().collect();
        let mut next = 0;
        for chunk in &chunks {
            assert_eq!(chunk.offset, next);
            next = chunk.end();
        }
        assert_eq!(next, 40);
    }

    #[test]
    fn test_oversized_grant_is_clamped() {
        let mut cursor = VectorChunkCursor::new(5, |_| 64);
        assert_eq!(cursor.next(), Some(Chunk { offset: 0, width: 5 }));
        assert!(cursor.next().is_none());
    }
}
