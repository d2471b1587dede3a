//! Memory-hierarchy helpers
//!
//! The primitives never own memory; this module only carries the cache-line
//! geometry and the prefetch hints used when walking caller-owned regions.

pub mod prefetch;

pub use prefetch::{
    flush_cache_line, prefetch, prefetch_nta, prefetch_range, prefetch_read, prefetch_write,
    PrefetchLocality, CACHE_LINE_SIZE,
};

/// Lines prefetched ahead of the cursor by the streaming copy loops.
pub const PREFETCH_LOOKAHEAD_LINES: usize = 4;

/// Prefetch the lines of a dataset item ahead of use.
///
/// Walks `item` in cache-line steps issuing read hints, as done before a
/// dataset item is folded into the hash state.
#[inline]
pub fn prefetch_dataset_item(item: &[u8]) {
    prefetch_range(item);
}
