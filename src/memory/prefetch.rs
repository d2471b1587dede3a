//! Cache-line prefetch hints
//!
//! Thin cross-platform wrappers over the prefetch instructions of each
//! supported architecture. Dataset initialization walks large regions line by
//! line and issues these ahead of the copy cursor; the hashing loop uses
//! [`prefetch_read`] on the next dataset item.
//!
//! # Platform mapping
//!
//! - **x86_64**: `_mm_prefetch` with `T0` (read), `T0` after a write intent is
//!   not expressible so writes use `T0` as well, `NTA` for streaming.
//! - **aarch64**: `prfm pldl1keep`, `pstl1keep` and `pldl1strm`.
//! - **riscv64**: Zicbop `prefetch.r` / `prefetch.w`. They are encoded in the
//!   `ori` hint space, so cores without Zicbop execute them as no-ops.
//! - Anything else: no-op.
//!
//! Prefetch instructions never fault, so none of these functions dereference
//! the pointer and all of them are safe to call with any address.
//!
//! # Examples
//!
//! ```rust
//! use powprim::memory::prefetch::{prefetch_range, prefetch_read, CACHE_LINE_SIZE};
//!
//! let data = vec![0u8; 16 * CACHE_LINE_SIZE];
//! prefetch_read(data.as_ptr());
//! prefetch_range(&data);
//! ```

/// Size of a cache line on every supported target.
pub const CACHE_LINE_SIZE: usize = 64;

/// Prefetch locality hints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefetchLocality {
    /// Temporal L1 cache (T0) - data accessed again soon
    L1Temporal,
    /// Non-temporal (NTA) - streaming data accessed once, minimize pollution
    NonTemporal,
}

/// Issue a prefetch for the line containing `addr` with the given locality.
#[inline(always)]
pub fn prefetch(addr: *const u8, locality: PrefetchLocality) {
    match locality {
        PrefetchLocality::L1Temporal => prefetch_read(addr),
        PrefetchLocality::NonTemporal => prefetch_nta(addr),
    }
}

/// Hint that the line containing `addr` will be read soon.
#[inline(always)]
pub fn prefetch_read(addr: *const u8) {
    #[cfg(target_arch = "x86_64")]
    {
        use std::arch::x86_64::{_mm_prefetch, _MM_HINT_T0};
        // SAFETY: prefetch is a hint and never faults.
        unsafe { _mm_prefetch::<_MM_HINT_T0>(addr as *const i8) };
    }

    #[cfg(target_arch = "aarch64")]
    {
        // SAFETY: prefetch is a hint and never faults.
        unsafe {
            std::arch::asm!("prfm pldl1keep, [{0}]", in(reg) addr, options(nostack, readonly, preserves_flags));
        }
    }

    #[cfg(target_arch = "riscv64")]
    {
        // SAFETY: prefetch.r is an ori hint and never faults.
        unsafe {
            std::arch::asm!(
                ".option push",
                ".option arch, +zicbop",
                "prefetch.r 0({0})",
                ".option pop",
                in(reg) addr,
                options(nostack, readonly, preserves_flags)
            );
        }
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64")))]
    {
        let _ = addr;
    }
}

/// Hint that the line containing `addr` will be written soon.
#[inline(always)]
pub fn prefetch_write(addr: *const u8) {
    #[cfg(target_arch = "x86_64")]
    {
        use std::arch::x86_64::{_mm_prefetch, _MM_HINT_T0};
        // SAFETY: prefetch is a hint and never faults.
        unsafe { _mm_prefetch::<_MM_HINT_T0>(addr as *const i8) };
    }

    #[cfg(target_arch = "aarch64")]
    {
        // SAFETY: prefetch is a hint and never faults.
        unsafe {
            std::arch::asm!("prfm pstl1keep, [{0}]", in(reg) addr, options(nostack, readonly, preserves_flags));
        }
    }

    #[cfg(target_arch = "riscv64")]
    {
        // SAFETY: prefetch.w is an ori hint and never faults.
        unsafe {
            std::arch::asm!(
                ".option push",
                ".option arch, +zicbop",
                "prefetch.w 0({0})",
                ".option pop",
                in(reg) addr,
                options(nostack, readonly, preserves_flags)
            );
        }
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64")))]
    {
        let _ = addr;
    }
}

/// Hint that the line containing `addr` is streamed and should not displace
/// hot data.
#[inline(always)]
pub fn prefetch_nta(addr: *const u8) {
    #[cfg(target_arch = "x86_64")]
    {
        use std::arch::x86_64::{_mm_prefetch, _MM_HINT_NTA};
        // SAFETY: prefetch is a hint and never faults.
        unsafe { _mm_prefetch::<_MM_HINT_NTA>(addr as *const i8) };
    }

    #[cfg(target_arch = "aarch64")]
    {
        // SAFETY: prefetch is a hint and never faults.
        unsafe {
            std::arch::asm!("prfm pldl1strm, [{0}]", in(reg) addr, options(nostack, readonly, preserves_flags));
        }
    }

    // Zicbop has no non-temporal variant
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    prefetch_read(addr);
}

/// Prefetch every cache line covered by `data` for reading.
#[inline]
pub fn prefetch_range(data: &[u8]) {
    for line in data.chunks(CACHE_LINE_SIZE) {
        prefetch_read(line.as_ptr());
    }
}

/// Flush hint for the line containing `addr`.
///
/// Userspace has no portable cache-maintenance instruction, so this is a
/// no-op kept for call-site symmetry with the prefetch hints.
#[inline(always)]
pub fn flush_cache_line(addr: *const u8) {
    let _ = addr;
}
