//! # Capability-Dispatched Primitives
//!
//! The primitive library: bulk memory operations, byte substitution and bit
//! manipulation for the proof-of-work hot path, each available in up to three
//! tiers.
//!
//! | Tier | Implementation |
//! |---|---|
//! | Vector | SSE2/AVX2/AES-NI, NEON, RVV kernels over [`chunks::VectorChunkCursor`] |
//! | Hardware-scalar | POPCNT/BMI, A64 `cnt`/`rbit`, Zbb/Zba instructions |
//! | Pure-scalar | [`scalar`], the portable reference |
//!
//! Tier choice happens once per [`PrimitiveLibrary`]; every result is
//! bit-identical to the pure-scalar reference on every tier.
//!
//! ## Example
//!
//! ```
//! use powprim::simd;
//!
//! let src = b"dataset line".to_vec();
//! let mut dst = vec![0u8; src.len()];
//! simd::copy(&mut dst, &src);
//! assert_eq!(simd::compare(&dst, &src), 0);
//!
//! assert_eq!(simd::count_trailing_zeros(0), 64);
//! assert_eq!(simd::add_as_unsigned_word(0xFFFF_FFFF, 1), 1 << 32);
//! ```

pub mod chunks;
pub mod dispatch;
pub mod scalar;
pub mod tables;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
mod x86_64;
#[cfg(all(feature = "simd", target_arch = "x86_64"))]
use self::x86_64 as backend;

#[cfg(all(feature = "simd", target_arch = "aarch64"))]
mod aarch64;
#[cfg(all(feature = "simd", target_arch = "aarch64"))]
use self::aarch64 as backend;

#[cfg(all(feature = "simd", target_arch = "riscv64"))]
mod riscv64;
#[cfg(all(feature = "simd", target_arch = "riscv64"))]
use self::riscv64 as backend;
#[cfg(all(feature = "simd", target_arch = "riscv64"))]
pub(crate) use self::riscv64::vlen_bits as riscv_vlen_bits;

#[cfg(not(all(
    feature = "simd",
    any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64")
)))]
mod backend {
    use super::dispatch::TierKernels;
    use crate::system::CapabilityDescriptor;

    pub(crate) fn vector_kernels(_descriptor: &CapabilityDescriptor) -> TierKernels {
        TierKernels::EMPTY
    }

    pub(crate) fn hardware_scalar_kernels(_descriptor: &CapabilityDescriptor) -> TierKernels {
        TierKernels::EMPTY
    }
}

pub use chunks::{Chunk, VectorChunkCursor};
pub use dispatch::{select, Op, PrimitiveLibrary, Tier};

/// View `ptr[from..len]` as a slice.
///
/// # Safety
///
/// `ptr` must be valid for `len` reads and `from <= len`.
#[inline(always)]
#[allow(dead_code)]
pub(crate) unsafe fn tail<'a, T>(ptr: *const T, from: usize, len: usize) -> &'a [T] {
    unsafe { std::slice::from_raw_parts(ptr.add(from), len - from) }
}

/// View `ptr[from..len]` as a mutable slice.
///
/// # Safety
///
/// `ptr` must be valid for `len` reads and writes, `from <= len`, and no
/// other reference may alias the range.
#[inline(always)]
#[allow(dead_code)]
pub(crate) unsafe fn tail_mut<'a, T>(ptr: *mut T, from: usize, len: usize) -> &'a mut [T] {
    unsafe { std::slice::from_raw_parts_mut(ptr.add(from), len - from) }
}

//==============================================================================
// CONVENIENCE FUNCTIONS OVER THE GLOBAL LIBRARY
//==============================================================================

/// Copy `src` into `dst`; panics if the lengths differ.
#[inline]
pub fn copy(dst: &mut [u8], src: &[u8]) {
    PrimitiveLibrary::global().copy(dst, src)
}

/// Fill `dst` with `pattern`.
#[inline]
pub fn fill(dst: &mut [u64], pattern: u64) {
    PrimitiveLibrary::global().fill(dst, pattern)
}

/// Lexicographic compare; see [`PrimitiveLibrary::compare`].
#[inline]
pub fn compare(a: &[u8], b: &[u8]) -> i32 {
    PrimitiveLibrary::global().compare(a, b)
}

/// `a[i] ^= b[i]`; panics if the lengths differ.
#[inline]
pub fn xor(a: &mut [u8], b: &[u8]) {
    PrimitiveLibrary::global().xor(a, b)
}

/// Rotate each word left by 8 bits.
#[inline]
pub fn rotate_left8_in32(words: &mut [u32]) {
    PrimitiveLibrary::global().rotate_left8_in32(words)
}

/// Apply the S-box to every byte.
#[inline]
pub fn byte_substitution(state: &mut [u8]) {
    PrimitiveLibrary::global().byte_substitution(state)
}

/// Apply the inverse S-box to every byte.
#[inline]
pub fn inverse_byte_substitution(state: &mut [u8]) {
    PrimitiveLibrary::global().inverse_byte_substitution(state)
}

/// Number of set bits.
#[inline]
pub fn popcount(x: u64) -> u32 {
    PrimitiveLibrary::global().popcount(x)
}

/// Number of trailing zero bits; 64 for zero.
#[inline]
pub fn count_trailing_zeros(x: u64) -> u32 {
    PrimitiveLibrary::global().count_trailing_zeros(x)
}

/// One substitution-and-diffusion round.
#[inline]
pub fn mixing_round(input: u32, round_key: u32) -> u32 {
    PrimitiveLibrary::global().mixing_round(input, round_key)
}

/// Sum of the zero-extended low 32 bits of `a` and `b`.
#[inline]
pub fn add_as_unsigned_word(a: u64, b: u64) -> u64 {
    PrimitiveLibrary::global().add_as_unsigned_word(a, b)
}

/// Rotate a 32-bit word right by `r mod 32` bits.
#[inline]
pub fn rotate_right32(x: u32, r: u32) -> u32 {
    PrimitiveLibrary::global().rotate_right32(x, r)
}

/// Rotate a 64-bit word right by `r mod 64` bits.
#[inline]
pub fn rotate_right64(x: u64, r: u32) -> u64 {
    PrimitiveLibrary::global().rotate_right64(x, r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_is_shared() {
        let a = PrimitiveLibrary::global() as *const PrimitiveLibrary;
        let b = PrimitiveLibrary::global() as *const PrimitiveLibrary;
        assert_eq!(a, b);
    }

    #[test]
    fn test_free_functions() {
        let mut state = [0u8, 1, 0x53, 0xFF];
        byte_substitution(&mut state);
        assert_eq!(state, [0x63, 0x7C, 0xED, 0x16]);
        inverse_byte_substitution(&mut state);
        assert_eq!(state, [0, 1, 0x53, 0xFF]);

        let mut words = [0u64; 3];
        fill(&mut words, 9);
        assert_eq!(words, [9, 9, 9]);

        let mut a = [1u8, 2, 3];
        xor(&mut a, &[1, 2, 3]);
        assert_eq!(a, [0, 0, 0]);

        assert_eq!(popcount(0xF0F0), 8);
        assert_eq!(mixing_round(0, 5), 5);
    }

    #[test]
    fn test_tail_helpers() {
        let mut data = [1u32, 2, 3, 4, 5];
        let view = unsafe { tail(data.as_ptr(), 3, data.len()) };
        assert_eq!(view, &[4, 5]);
        let view = unsafe { tail_mut(data.as_mut_ptr(), 5, 5) };
        assert!(view.is_empty());
    }
}
