//! x86_64 kernels
//!
//! Vector tier: SSE2 (16-byte registers) or AVX2 (32-byte registers) by the
//! detected width, plus AES-NI byte substitution. Hardware-scalar tier:
//! POPCNT, BMI1 `tzcnt` and BMI2 `rorx`/`ror` rotates.

use super::chunks::{fixed_width, VectorChunkCursor};
use super::dispatch::{CompareKernel, CopyKernel, FillKernel, RotateKernel, TierKernels, XorKernel};
use super::{scalar, tail, tail_mut};
use crate::system::CapabilityDescriptor;
use std::arch::x86_64::*;
use std::slice;

pub(crate) fn vector_kernels(descriptor: &CapabilityDescriptor) -> TierKernels {
    let wide = descriptor.vector_width_bits >= 256;
    TierKernels {
        copy: Some(if wide { copy_avx2 as CopyKernel } else { copy_sse2 }),
        fill: Some(if wide { fill_avx2 as FillKernel } else { fill_sse2 }),
        compare: Some(if wide { compare_avx2 as CompareKernel } else { compare_sse2 }),
        xor: Some(if wide { xor_avx2 as XorKernel } else { xor_sse2 }),
        rotate: Some(if wide { rotate_avx2 as RotateKernel } else { rotate_sse2 }),
        // SubBytes only exists fused into the AES round instructions
        subst: if descriptor.crypto_rounds {
            Some(subst_aesni)
        } else {
            None
        },
        ..TierKernels::EMPTY
    }
}

pub(crate) fn hardware_scalar_kernels(_descriptor: &CapabilityDescriptor) -> TierKernels {
    TierKernels {
        rotate: Some(rotate_rorx),
        popcount: Some(popcount_popcnt),
        ctz: Some(ctz_tzcnt),
        rotr32: Some(rotr32_bmi2),
        rotr64: Some(rotr64_bmi2),
        ..TierKernels::EMPTY
    }
}

//==============================================================================
// SSE2 IMPLEMENTATIONS
//==============================================================================

#[target_feature(enable = "sse2")]
unsafe fn copy_sse2(dst: *mut u8, src: *const u8, n: usize) {
    let mut cursor = VectorChunkCursor::new(n, fixed_width(16));
    for chunk in cursor.by_ref() {
        unsafe {
            let v = _mm_loadu_si128(src.add(chunk.offset) as *const __m128i);
            _mm_storeu_si128(dst.add(chunk.offset) as *mut __m128i, v);
        }
    }
    let done = cursor.processed();
    unsafe { scalar::copy(tail_mut(dst, done, n), tail(src, done, n)) }
}

#[target_feature(enable = "sse2")]
unsafe fn fill_sse2(dst: *mut u64, pattern: u64, count: usize) {
    let v = unsafe { _mm_set1_epi64x(pattern as i64) };
    let mut cursor = VectorChunkCursor::new(count, fixed_width(2));
    for chunk in cursor.by_ref() {
        unsafe { _mm_storeu_si128(dst.add(chunk.offset) as *mut __m128i, v) };
    }
    let done = cursor.processed();
    unsafe { scalar::fill(tail_mut(dst, done, count), pattern) }
}

#[target_feature(enable = "sse2")]
unsafe fn compare_sse2(a: *const u8, b: *const u8, n: usize) -> i32 {
    let mut cursor = VectorChunkCursor::new(n, fixed_width(16));
    for chunk in cursor.by_ref() {
        let mask = unsafe {
            let va = _mm_loadu_si128(a.add(chunk.offset) as *const __m128i);
            let vb = _mm_loadu_si128(b.add(chunk.offset) as *const __m128i);
            _mm_movemask_epi8(_mm_cmpeq_epi8(va, vb)) as u32
        };
        if mask != 0xFFFF {
            // rescan the mismatched chunk for the first differing byte
            return unsafe {
                scalar::compare(
                    slice::from_raw_parts(a.add(chunk.offset), chunk.width),
                    slice::from_raw_parts(b.add(chunk.offset), chunk.width),
                )
            };
        }
    }
    let done = cursor.processed();
    unsafe { scalar::compare(tail(a, done, n), tail(b, done, n)) }
}

#[target_feature(enable = "sse2")]
unsafe fn xor_sse2(a: *mut u8, b: *const u8, n: usize) {
    let mut cursor = VectorChunkCursor::new(n, fixed_width(16));
    for chunk in cursor.by_ref() {
        unsafe {
            let pa = a.add(chunk.offset) as *mut __m128i;
            let vb = _mm_loadu_si128(b.add(chunk.offset) as *const __m128i);
            _mm_storeu_si128(pa, _mm_xor_si128(_mm_loadu_si128(pa), vb));
        }
    }
    let done = cursor.processed();
    unsafe { scalar::xor(tail_mut(a, done, n), tail(b, done, n)) }
}

#[target_feature(enable = "sse2")]
unsafe fn rotate_sse2(words: *mut u32, count: usize) {
    let mut cursor = VectorChunkCursor::new(count, fixed_width(4));
    for chunk in cursor.by_ref() {
        unsafe {
            let p = words.add(chunk.offset) as *mut __m128i;
            let v = _mm_loadu_si128(p);
            _mm_storeu_si128(p, _mm_or_si128(_mm_slli_epi32::<8>(v), _mm_srli_epi32::<24>(v)));
        }
    }
    let done = cursor.processed();
    unsafe { scalar::rotate_left8_in32(tail_mut(words, done, count)) }
}

//==============================================================================
// AVX2 IMPLEMENTATIONS
//==============================================================================

#[target_feature(enable = "avx2")]
unsafe fn copy_avx2(dst: *mut u8, src: *const u8, n: usize) {
    let mut cursor = VectorChunkCursor::new(n, fixed_width(32));
    for chunk in cursor.by_ref() {
        unsafe {
            let v = _mm256_loadu_si256(src.add(chunk.offset) as *const __m256i);
            _mm256_storeu_si256(dst.add(chunk.offset) as *mut __m256i, v);
        }
    }
    let done = cursor.processed();
    unsafe { scalar::copy(tail_mut(dst, done, n), tail(src, done, n)) }
}

#[target_feature(enable = "avx2")]
unsafe fn fill_avx2(dst: *mut u64, pattern: u64, count: usize) {
    let v = unsafe { _mm256_set1_epi64x(pattern as i64) };
    let mut cursor = VectorChunkCursor::new(count, fixed_width(4));
    for chunk in cursor.by_ref() {
        unsafe { _mm256_storeu_si256(dst.add(chunk.offset) as *mut __m256i, v) };
    }
    let done = cursor.processed();
    unsafe { scalar::fill(tail_mut(dst, done, count), pattern) }
}

#[target_feature(enable = "avx2")]
unsafe fn compare_avx2(a: *const u8, b: *const u8, n: usize) -> i32 {
    let mut cursor = VectorChunkCursor::new(n, fixed_width(32));
    for chunk in cursor.by_ref() {
        let mask = unsafe {
            let va = _mm256_loadu_si256(a.add(chunk.offset) as *const __m256i);
            let vb = _mm256_loadu_si256(b.add(chunk.offset) as *const __m256i);
            _mm256_movemask_epi8(_mm256_cmpeq_epi8(va, vb)) as u32
        };
        if mask != u32::MAX {
            return unsafe {
                scalar::compare(
                    slice::from_raw_parts(a.add(chunk.offset), chunk.width),
                    slice::from_raw_parts(b.add(chunk.offset), chunk.width),
                )
            };
        }
    }
    let done = cursor.processed();
    unsafe { scalar::compare(tail(a, done, n), tail(b, done, n)) }
}

#[target_feature(enable = "avx2")]
unsafe fn xor_avx2(a: *mut u8, b: *const u8, n: usize) {
    let mut cursor = VectorChunkCursor::new(n, fixed_width(32));
    for chunk in cursor.by_ref() {
        unsafe {
            let pa = a.add(chunk.offset) as *mut __m256i;
            let vb = _mm256_loadu_si256(b.add(chunk.offset) as *const __m256i);
            _mm256_storeu_si256(pa, _mm256_xor_si256(_mm256_loadu_si256(pa), vb));
        }
    }
    let done = cursor.processed();
    unsafe { scalar::xor(tail_mut(a, done, n), tail(b, done, n)) }
}

#[target_feature(enable = "avx2")]
unsafe fn rotate_avx2(words: *mut u32, count: usize) {
    let mut cursor = VectorChunkCursor::new(count, fixed_width(8));
    for chunk in cursor.by_ref() {
        unsafe {
            let p = words.add(chunk.offset) as *mut __m256i;
            let v = _mm256_loadu_si256(p);
            _mm256_storeu_si256(
                p,
                _mm256_or_si256(_mm256_slli_epi32::<8>(v), _mm256_srli_epi32::<24>(v)),
            );
        }
    }
    let done = cursor.processed();
    unsafe { scalar::rotate_left8_in32(tail_mut(words, done, count)) }
}

//==============================================================================
// AES-NI SUBSTITUTION
//==============================================================================

/// SubBytes through `aesenclast`.
///
/// `aesenclast(x, 0)` computes `ShiftRows(SubBytes(x))`. Since SubBytes is
/// byte-wise it commutes with the ShiftRows permutation, so undoing
/// ShiftRows with a shuffle first leaves plain SubBytes.
#[target_feature(enable = "aes,ssse3")]
unsafe fn subst_aesni(state: *mut u8, n: usize) {
    let (inv_shift_rows, zero) = unsafe {
        (
            _mm_setr_epi8(0, 13, 10, 7, 4, 1, 14, 11, 8, 5, 2, 15, 12, 9, 6, 3),
            _mm_setzero_si128(),
        )
    };

    let mut cursor = VectorChunkCursor::new(n, fixed_width(16));
    for chunk in cursor.by_ref() {
        unsafe {
            let p = state.add(chunk.offset) as *mut __m128i;
            let v = _mm_shuffle_epi8(_mm_loadu_si128(p), inv_shift_rows);
            _mm_storeu_si128(p, _mm_aesenclast_si128(v, zero));
        }
    }
    let done = cursor.processed();
    unsafe { scalar::byte_substitution(tail_mut(state, done, n)) }
}

//==============================================================================
// HARDWARE-SCALAR IMPLEMENTATIONS
//==============================================================================

#[target_feature(enable = "popcnt")]
unsafe fn popcount_popcnt(x: u64) -> u32 {
    unsafe { _popcnt64(x as i64) as u32 }
}

#[target_feature(enable = "bmi1")]
unsafe fn ctz_tzcnt(x: u64) -> u32 {
    // tzcnt defines the zero input as the operand width
    unsafe { _tzcnt_u64(x) as u32 }
}

#[target_feature(enable = "bmi2")]
unsafe fn rotate_rorx(words: *mut u32, count: usize) {
    for w in unsafe { slice::from_raw_parts_mut(words, count) } {
        *w = w.rotate_left(8);
    }
}

// Immediate counts fold into rorx; variable counts use ror, which masks the
// count to the operand width exactly like the scalar reference.
#[target_feature(enable = "bmi2")]
unsafe fn rotr32_bmi2(x: u32, r: u32) -> u32 {
    x.rotate_right(r & 31)
}

#[target_feature(enable = "bmi2")]
unsafe fn rotr64_bmi2(x: u64, r: u32) -> u64 {
    x.rotate_right(r & 63)
}
