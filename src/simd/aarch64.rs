//! aarch64 kernels
//!
//! Vector tier: 128-bit NEON, with byte substitution as a four-step `tbl`
//! lookup over the 256-byte S-box. Hardware-scalar tier: `cnt`, `rbit`+`clz`
//! and `ror`.

use super::chunks::{fixed_width, VectorChunkCursor};
use super::dispatch::TierKernels;
use super::tables::SBOX;
use super::{scalar, tail, tail_mut};
use crate::system::CapabilityDescriptor;
use std::arch::aarch64::*;
use std::slice;

pub(crate) fn vector_kernels(_descriptor: &CapabilityDescriptor) -> TierKernels {
    TierKernels {
        copy: Some(copy_neon),
        fill: Some(fill_neon),
        compare: Some(compare_neon),
        xor: Some(xor_neon),
        rotate: Some(rotate_neon),
        subst: Some(subst_neon),
        ..TierKernels::EMPTY
    }
}

pub(crate) fn hardware_scalar_kernels(_descriptor: &CapabilityDescriptor) -> TierKernels {
    TierKernels {
        rotate: Some(rotate_ror),
        popcount: Some(popcount_cnt),
        ctz: Some(ctz_rbit_clz),
        rotr32: Some(rotr32_ror),
        rotr64: Some(rotr64_ror),
        ..TierKernels::EMPTY
    }
}

#[target_feature(enable = "neon")]
unsafe fn copy_neon(dst: *mut u8, src: *const u8, n: usize) {
    let mut cursor = VectorChunkCursor::new(n, fixed_width(16));
    for chunk in cursor.by_ref() {
        unsafe { vst1q_u8(dst.add(chunk.offset), vld1q_u8(src.add(chunk.offset))) };
    }
    let done = cursor.processed();
    unsafe { scalar::copy(tail_mut(dst, done, n), tail(src, done, n)) }
}

#[target_feature(enable = "neon")]
unsafe fn fill_neon(dst: *mut u64, pattern: u64, count: usize) {
    let v = unsafe { vdupq_n_u64(pattern) };
    let mut cursor = VectorChunkCursor::new(count, fixed_width(2));
    for chunk in cursor.by_ref() {
        unsafe { vst1q_u64(dst.add(chunk.offset), v) };
    }
    let done = cursor.processed();
    unsafe { scalar::fill(tail_mut(dst, done, count), pattern) }
}

#[target_feature(enable = "neon")]
unsafe fn compare_neon(a: *const u8, b: *const u8, n: usize) -> i32 {
    let mut cursor = VectorChunkCursor::new(n, fixed_width(16));
    for chunk in cursor.by_ref() {
        // all lanes equal iff the minimum of the eq mask is 0xFF
        let all_equal = unsafe {
            let eq = vceqq_u8(vld1q_u8(a.add(chunk.offset)), vld1q_u8(b.add(chunk.offset)));
            vminvq_u8(eq) == 0xFF
        };
        if !all_equal {
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

#[target_feature(enable = "neon")]
unsafe fn xor_neon(a: *mut u8, b: *const u8, n: usize) {
    let mut cursor = VectorChunkCursor::new(n, fixed_width(16));
    for chunk in cursor.by_ref() {
        unsafe {
            let pa = a.add(chunk.offset);
            vst1q_u8(pa, veorq_u8(vld1q_u8(pa), vld1q_u8(b.add(chunk.offset))));
        }
    }
    let done = cursor.processed();
    unsafe { scalar::xor(tail_mut(a, done, n), tail(b, done, n)) }
}

#[target_feature(enable = "neon")]
unsafe fn rotate_neon(words: *mut u32, count: usize) {
    let mut cursor = VectorChunkCursor::new(count, fixed_width(4));
    for chunk in cursor.by_ref() {
        unsafe {
            let p = words.add(chunk.offset);
            let v = vld1q_u32(p);
            vst1q_u32(p, vorrq_u32(vshlq_n_u32::<8>(v), vshrq_n_u32::<24>(v)));
        }
    }
    let done = cursor.processed();
    unsafe { scalar::rotate_left8_in32(tail_mut(words, done, count)) }
}

/// S-box lookup with `tbl`/`tbx`.
///
/// `tbl` over four registers covers 64 table entries and yields 0 for larger
/// indices; each following `tbx` covers the next 64 entries with the index
/// rebased, leaving lanes outside its window untouched.
#[target_feature(enable = "neon")]
unsafe fn subst_neon(state: *mut u8, n: usize) {
    let (t0, t1, t2, t3, step) = unsafe {
        let base = SBOX.as_ptr();
        (
            vld1q_u8_x4(base),
            vld1q_u8_x4(base.add(64)),
            vld1q_u8_x4(base.add(128)),
            vld1q_u8_x4(base.add(192)),
            vdupq_n_u8(64),
        )
    };

    let mut cursor = VectorChunkCursor::new(n, fixed_width(16));
    for chunk in cursor.by_ref() {
        unsafe {
            let p = state.add(chunk.offset);
            let idx0 = vld1q_u8(p);
            let idx1 = vsubq_u8(idx0, step);
            let idx2 = vsubq_u8(idx1, step);
            let idx3 = vsubq_u8(idx2, step);
            let mut r = vqtbl4q_u8(t0, idx0);
            r = vqtbx4q_u8(r, t1, idx1);
            r = vqtbx4q_u8(r, t2, idx2);
            r = vqtbx4q_u8(r, t3, idx3);
            vst1q_u8(p, r);
        }
    }
    let done = cursor.processed();
    unsafe { scalar::byte_substitution(tail_mut(state, done, n)) }
}

#[target_feature(enable = "neon")]
unsafe fn popcount_cnt(x: u64) -> u32 {
    unsafe { vaddv_u8(vcnt_u8(vcreate_u8(x))) as u32 }
}

fn ctz_rbit_clz(x: u64) -> u32 {
    // clz of zero is 64, so the zero input needs no special case
    x.reverse_bits().leading_zeros()
}

unsafe fn rotate_ror(words: *mut u32, count: usize) {
    for w in unsafe { slice::from_raw_parts_mut(words, count) } {
        *w = w.rotate_right(24);
    }
}

// rorv takes the amount modulo the register width
fn rotr32_ror(x: u32, r: u32) -> u32 {
    x.rotate_right(r & 31)
}

fn rotr64_ror(x: u64, r: u32) -> u64 {
    x.rotate_right(r & 63)
}
