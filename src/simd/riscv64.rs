//! riscv64 kernels
//!
//! Vector tier: RVV 1.0, length-agnostic. Each step asks `vsetvli` for the
//! remaining element count and processes the granted `vl`, so there is no
//! fixed register width and normally no scalar tail. Hardware-scalar tier:
//! Zbb `cpop`, `ctz`, `roriw`, `rorw`, `ror` and Zba `add.uw`.
//!
//! The crate is not built with the `v`, `zba` or `zbb` target features, so
//! every block enables its extension locally with `.option arch`. Vector
//! state is caller-saved under the C ABI; `clobber_abi("C")` tells the
//! compiler the blocks may overwrite it.

use super::chunks::VectorChunkCursor;
use super::dispatch::TierKernels;
use super::tables::SBOX;
use super::{scalar, tail, tail_mut};
use crate::system::CapabilityDescriptor;
use core::arch::asm;
use std::slice;

pub(crate) fn vector_kernels(_descriptor: &CapabilityDescriptor) -> TierKernels {
    TierKernels {
        copy: Some(copy_rvv),
        fill: Some(fill_rvv),
        compare: Some(compare_rvv),
        xor: Some(xor_rvv),
        rotate: Some(rotate_rvv),
        subst: Some(subst_rvv),
        ..TierKernels::EMPTY
    }
}

pub(crate) fn hardware_scalar_kernels(_descriptor: &CapabilityDescriptor) -> TierKernels {
    TierKernels {
        rotate: Some(rotate_roriw),
        popcount: Some(popcount_cpop),
        ctz: Some(ctz_zbb),
        add_word: Some(add_uw),
        rotr32: Some(rotr32_rorw),
        rotr64: Some(rotr64_ror),
        ..TierKernels::EMPTY
    }
}

/// Vector register length in bits.
///
/// # Safety
///
/// The V extension must be present; `vlenb` traps otherwise.
pub(crate) unsafe fn vlen_bits() -> u32 {
    let vlenb: usize;
    unsafe {
        asm!(
            ".option push",
            ".option arch, +v",
            "csrr {0}, vlenb",
            ".option pop",
            out(reg) vlenb,
            options(nomem, nostack, preserves_flags)
        );
    }
    (vlenb * 8) as u32
}

macro_rules! vsetvl {
    ($name:ident, $sew:literal) => {
        /// Granted vector length for `avl` remaining elements.
        #[inline(always)]
        unsafe fn $name(avl: usize) -> usize {
            let vl: usize;
            unsafe {
                asm!(
                    ".option push",
                    ".option arch, +v",
                    concat!("vsetvli {vl}, {avl}, ", $sew, ", m8, ta, ma"),
                    ".option pop",
                    vl = lateout(reg) vl,
                    avl = in(reg) avl,
                    options(nomem, nostack, preserves_flags)
                );
            }
            vl
        }
    };
}

vsetvl!(vsetvl_e8m8, "e8");
vsetvl!(vsetvl_e32m8, "e32");
vsetvl!(vsetvl_e64m8, "e64");

//==============================================================================
// RVV IMPLEMENTATIONS
//==============================================================================

unsafe fn copy_rvv(dst: *mut u8, src: *const u8, n: usize) {
    let mut cursor = VectorChunkCursor::new(n, |remaining| unsafe { vsetvl_e8m8(remaining) });
    for chunk in cursor.by_ref() {
        unsafe {
            asm!(
                ".option push",
                ".option arch, +v",
                "vsetvli zero, {vl}, e8, m8, ta, ma",
                "vle8.v v8, ({src})",
                "vse8.v v8, ({dst})",
                ".option pop",
                vl = in(reg) chunk.width,
                src = in(reg) src.add(chunk.offset),
                dst = in(reg) dst.add(chunk.offset),
                clobber_abi("C"),
                options(nostack, preserves_flags)
            );
        }
    }
    let done = cursor.processed();
    unsafe { scalar::copy(tail_mut(dst, done, n), tail(src, done, n)) }
}

unsafe fn fill_rvv(dst: *mut u64, pattern: u64, count: usize) {
    let mut cursor = VectorChunkCursor::new(count, |remaining| unsafe { vsetvl_e64m8(remaining) });
    for chunk in cursor.by_ref() {
        unsafe {
            asm!(
                ".option push",
                ".option arch, +v",
                "vsetvli zero, {vl}, e64, m8, ta, ma",
                "vmv.v.x v8, {pattern}",
                "vse64.v v8, ({dst})",
                ".option pop",
                vl = in(reg) chunk.width,
                pattern = in(reg) pattern,
                dst = in(reg) dst.add(chunk.offset),
                clobber_abi("C"),
                options(nostack, preserves_flags)
            );
        }
    }
    let done = cursor.processed();
    unsafe { scalar::fill(tail_mut(dst, done, count), pattern) }
}

unsafe fn compare_rvv(a: *const u8, b: *const u8, n: usize) -> i32 {
    let mut cursor = VectorChunkCursor::new(n, |remaining| unsafe { vsetvl_e8m8(remaining) });
    for chunk in cursor.by_ref() {
        let mismatches: usize;
        unsafe {
            asm!(
                ".option push",
                ".option arch, +v",
                "vsetvli zero, {vl}, e8, m8, ta, ma",
                "vle8.v v8, ({a})",
                "vle8.v v16, ({b})",
                "vmsne.vv v0, v8, v16",
                "vcpop.m {count}, v0",
                ".option pop",
                vl = in(reg) chunk.width,
                a = in(reg) a.add(chunk.offset),
                b = in(reg) b.add(chunk.offset),
                count = lateout(reg) mismatches,
                clobber_abi("C"),
                options(readonly, nostack, preserves_flags)
            );
        }
        if mismatches != 0 {
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

unsafe fn xor_rvv(a: *mut u8, b: *const u8, n: usize) {
    let mut cursor = VectorChunkCursor::new(n, |remaining| unsafe { vsetvl_e8m8(remaining) });
    for chunk in cursor.by_ref() {
        unsafe {
            asm!(
                ".option push",
                ".option arch, +v",
                "vsetvli zero, {vl}, e8, m8, ta, ma",
                "vle8.v v8, ({a})",
                "vle8.v v16, ({b})",
                "vxor.vv v8, v8, v16",
                "vse8.v v8, ({a})",
                ".option pop",
                vl = in(reg) chunk.width,
                a = in(reg) a.add(chunk.offset),
                b = in(reg) b.add(chunk.offset),
                clobber_abi("C"),
                options(nostack, preserves_flags)
            );
        }
    }
    let done = cursor.processed();
    unsafe { scalar::xor(tail_mut(a, done, n), tail(b, done, n)) }
}

unsafe fn rotate_rvv(words: *mut u32, count: usize) {
    let mut cursor = VectorChunkCursor::new(count, |remaining| unsafe { vsetvl_e32m8(remaining) });
    for chunk in cursor.by_ref() {
        unsafe {
            asm!(
                ".option push",
                ".option arch, +v",
                "vsetvli zero, {vl}, e32, m8, ta, ma",
                "vle32.v v8, ({p})",
                "vsll.vi v16, v8, 8",
                "vsrl.vi v8, v8, 24",
                "vor.vv v8, v8, v16",
                "vse32.v v8, ({p})",
                ".option pop",
                vl = in(reg) chunk.width,
                p = in(reg) words.add(chunk.offset),
                clobber_abi("C"),
                options(nostack, preserves_flags)
            );
        }
    }
    let done = cursor.processed();
    unsafe { scalar::rotate_left8_in32(tail_mut(words, done, count)) }
}

/// Indexed gather from the S-box: each state byte is the offset of its image.
unsafe fn subst_rvv(state: *mut u8, n: usize) {
    let table = SBOX.as_ptr();
    let mut cursor = VectorChunkCursor::new(n, |remaining| unsafe { vsetvl_e8m8(remaining) });
    for chunk in cursor.by_ref() {
        unsafe {
            asm!(
                ".option push",
                ".option arch, +v",
                "vsetvli zero, {vl}, e8, m8, ta, ma",
                "vle8.v v8, ({p})",
                "vluxei8.v v16, ({table}), v8",
                "vse8.v v16, ({p})",
                ".option pop",
                vl = in(reg) chunk.width,
                p = in(reg) state.add(chunk.offset),
                table = in(reg) table,
                clobber_abi("C"),
                options(nostack, preserves_flags)
            );
        }
    }
    let done = cursor.processed();
    unsafe { scalar::byte_substitution(tail_mut(state, done, n)) }
}

//==============================================================================
// ZBB / ZBA IMPLEMENTATIONS
//==============================================================================

unsafe fn popcount_cpop(x: u64) -> u32 {
    let count: u64;
    unsafe {
        asm!(
            ".option push",
            ".option arch, +zbb",
            "cpop {count}, {x}",
            ".option pop",
            count = lateout(reg) count,
            x = in(reg) x,
            options(pure, nomem, nostack, preserves_flags)
        );
    }
    count as u32
}

unsafe fn ctz_zbb(x: u64) -> u32 {
    // Zbb ctz returns XLEN for zero
    let count: u64;
    unsafe {
        asm!(
            ".option push",
            ".option arch, +zbb",
            "ctz {count}, {x}",
            ".option pop",
            count = lateout(reg) count,
            x = in(reg) x,
            options(pure, nomem, nostack, preserves_flags)
        );
    }
    count as u32
}

unsafe fn rotate_roriw(words: *mut u32, count: usize) {
    for w in unsafe { slice::from_raw_parts_mut(words, count) } {
        let rotated: u64;
        unsafe {
            asm!(
                ".option push",
                ".option arch, +zbb",
                "roriw {r}, {x}, 24",
                ".option pop",
                r = lateout(reg) rotated,
                x = in(reg) *w as u64,
                options(pure, nomem, nostack, preserves_flags)
            );
        }
        // roriw sign-extends; only the low word is meaningful
        *w = rotated as u32;
    }
}

unsafe fn rotr32_rorw(x: u32, r: u32) -> u32 {
    // rorw reads only the low 5 bits of the amount and sign-extends the result
    let rotated: u64;
    unsafe {
        asm!(
            ".option push",
            ".option arch, +zbb",
            "rorw {out}, {x}, {r}",
            ".option pop",
            out = lateout(reg) rotated,
            x = in(reg) x as u64,
            r = in(reg) r as u64,
            options(pure, nomem, nostack, preserves_flags)
        );
    }
    rotated as u32
}

unsafe fn rotr64_ror(x: u64, r: u32) -> u64 {
    // ror reads only the low 6 bits of the amount
    let rotated: u64;
    unsafe {
        asm!(
            ".option push",
            ".option arch, +zbb",
            "ror {out}, {x}, {r}",
            ".option pop",
            out = lateout(reg) rotated,
            x = in(reg) x,
            r = in(reg) r as u64,
            options(pure, nomem, nostack, preserves_flags)
        );
    }
    rotated
}

unsafe fn add_uw(a: u64, b: u64) -> u64 {
    let sum: u64;
    unsafe {
        asm!(
            ".option push",
            ".option arch, +zba",
            "zext.w {t}, {b}",
            "add.uw {sum}, {a}, {t}",
            ".option pop",
            t = out(reg) _,
            sum = lateout(reg) sum,
            a = in(reg) a,
            b = in(reg) b,
            options(pure, nomem, nostack, preserves_flags)
        );
    }
    sum
}
