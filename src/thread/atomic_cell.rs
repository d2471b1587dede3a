//! Atomic 64-bit cell
//!
//! A machine word with a fixed access protocol: loads acquire, stores
//! release, and read-modify-write operations are sequentially consistent
//! (a full barrier on both sides). The protocol is baked into the type so
//! call sites in the hashing loop cannot pick a weaker ordering by mistake.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared 64-bit counter or flag word.
///
/// `#[repr(transparent)]` over [`AtomicU64`], so a word in caller-owned
/// memory can be viewed as a cell with [`AtomicCell::from_ptr`].
///
/// # Examples
///
/// ```rust
/// use powprim::thread::AtomicCell;
///
/// let nonce = AtomicCell::new(41);
/// assert_eq!(nonce.fetch_add(1), 41);
/// assert_eq!(nonce.exchange(0), 42);
/// assert_eq!(nonce.load(), 0);
/// ```
#[repr(transparent)]
#[derive(Default)]
pub struct AtomicCell {
    value: AtomicU64,
}

impl AtomicCell {
    /// Create a cell holding `value`.
    pub const fn new(value: u64) -> Self {
        Self {
            value: AtomicU64::new(value),
        }
    }

    /// View a caller-owned word as a cell.
    ///
    /// # Safety
    ///
    /// `ptr` must be non-null, 8-byte aligned and valid for reads and writes
    /// for `'a`, and during `'a` the word must only be accessed atomically.
    pub unsafe fn from_ptr<'a>(ptr: *mut u64) -> &'a Self {
        // SAFETY: repr(transparent) over AtomicU64, which has the layout of
        // u64 with 8-byte alignment; the caller guarantees the rest.
        unsafe { &*ptr.cast::<AtomicCell>() }
    }

    /// Acquire load.
    #[inline]
    pub fn load(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Release store.
    #[inline]
    pub fn store(&self, value: u64) {
        self.value.store(value, Ordering::Release)
    }

    /// Sequentially consistent swap; returns the previous value.
    #[inline]
    pub fn exchange(&self, value: u64) -> u64 {
        self.value.swap(value, Ordering::SeqCst)
    }

    /// Sequentially consistent wrapping add; returns the previous value.
    #[inline]
    pub fn fetch_add(&self, delta: u64) -> u64 {
        self.value.fetch_add(delta, Ordering::SeqCst)
    }

    /// Raw pointer to the underlying word.
    #[inline]
    pub fn as_ptr(&self) -> *mut u64 {
        self.value.as_ptr()
    }

    /// Consume the cell and return its value.
    pub fn into_inner(self) -> u64 {
        self.value.into_inner()
    }
}

impl From<u64> for AtomicCell {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for AtomicCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicCell").field(&self.load()).finish()
    }
}
