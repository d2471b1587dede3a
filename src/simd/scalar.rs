//! Pure-scalar tier
//!
//! Portable implementations of every primitive. They define the reference
//! semantics the vector and hardware-scalar tiers must reproduce bit for bit,
//! and they serve as the remainder pass of every vector kernel.
//!
//! All functions take slices of equal length (or, for [`compare`], compare
//! exactly `a.len()` bytes); the length contract is checked by the public
//! API in [`super::dispatch`].

use super::tables::{INV_SBOX, MIX_TABLE, SBOX};
use crate::memory::{prefetch_read, CACHE_LINE_SIZE, PREFETCH_LOOKAHEAD_LINES};

const LOW_WORD: u64 = 0xFFFF_FFFF;

/// Copy `src` into `dst` line by line, prefetching ahead of the read cursor.
#[inline]
pub fn copy(dst: &mut [u8], src: &[u8]) {
    debug_assert_eq!(dst.len(), src.len());

    let lines = src.len() / CACHE_LINE_SIZE;
    for (i, (d, s)) in dst
        .chunks_exact_mut(CACHE_LINE_SIZE)
        .zip(src.chunks_exact(CACHE_LINE_SIZE))
        .enumerate()
    {
        if i + PREFETCH_LOOKAHEAD_LINES < lines {
            prefetch_read(src[(i + PREFETCH_LOOKAHEAD_LINES) * CACHE_LINE_SIZE..].as_ptr());
        }
        d.copy_from_slice(s);
    }

    let done = lines * CACHE_LINE_SIZE;
    dst[done..].copy_from_slice(&src[done..]);
}

/// Fill `dst` with `pattern`, eight words per iteration.
#[inline]
pub fn fill(dst: &mut [u64], pattern: u64) {
    let mut blocks = dst.chunks_exact_mut(8);
    for block in &mut blocks {
        block[0] = pattern;
        block[1] = pattern;
        block[2] = pattern;
        block[3] = pattern;
        block[4] = pattern;
        block[5] = pattern;
        block[6] = pattern;
        block[7] = pattern;
    }
    for word in blocks.into_remainder() {
        *word = pattern;
    }
}

/// Compare `a` and `b` byte by byte.
///
/// Returns 0 when equal, otherwise `a[k] - b[k]` at the first differing
/// index `k`. Whole 8-byte words are skipped while equal.
#[inline]
pub fn compare(a: &[u8], b: &[u8]) -> i32 {
    debug_assert_eq!(a.len(), b.len());

    let words = a.len() / 8;
    for (wa, wb) in a.chunks_exact(8).zip(b.chunks_exact(8)) {
        if wa != wb {
            return first_difference(wa, wb);
        }
    }

    let done = words * 8;
    first_difference(&a[done..], &b[done..])
}

#[inline]
fn first_difference(a: &[u8], b: &[u8]) -> i32 {
    a.iter()
        .zip(b)
        .find(|(x, y)| x != y)
        .map(|(&x, &y)| x as i32 - y as i32)
        .unwrap_or(0)
}

/// `a[i] ^= b[i]`, a word at a time.
#[inline]
pub fn xor(a: &mut [u8], b: &[u8]) {
    debug_assert_eq!(a.len(), b.len());

    let mut a_words = a.chunks_exact_mut(8);
    let mut b_words = b.chunks_exact(8);
    for (wa, wb) in (&mut a_words).zip(&mut b_words) {
        let mut x = [0u8; 8];
        let mut y = [0u8; 8];
        x.copy_from_slice(wa);
        y.copy_from_slice(wb);
        wa.copy_from_slice(&(u64::from_ne_bytes(x) ^ u64::from_ne_bytes(y)).to_ne_bytes());
    }

    for (x, y) in a_words.into_remainder().iter_mut().zip(b_words.remainder()) {
        *x ^= *y;
    }
}

/// Rotate each 32-bit word left by 8.
#[inline]
pub fn rotate_left8_in32(words: &mut [u32]) {
    for w in words {
        *w = (*w << 8) | (*w >> 24);
    }
}

/// Rotate `x` right by `r mod 32` bits.
#[inline]
pub fn rotate_right32(x: u32, r: u32) -> u32 {
    let r = r & 31;
    // the left shift is masked too, so r == 0 yields x | x
    (x >> r) | (x << (r.wrapping_neg() & 31))
}

/// Rotate `x` right by `r mod 64` bits.
#[inline]
pub fn rotate_right64(x: u64, r: u32) -> u64 {
    let r = r & 63;
    (x >> r) | (x << (r.wrapping_neg() & 63))
}

/// Replace each byte with its S-box image.
#[inline]
pub fn byte_substitution(state: &mut [u8]) {
    for b in state {
        *b = SBOX[*b as usize];
    }
}

/// Replace each byte with its inverse S-box image.
#[inline]
pub fn inverse_byte_substitution(state: &mut [u8]) {
    for b in state {
        *b = INV_SBOX[*b as usize];
    }
}

/// SWAR population count.
#[inline]
pub fn popcount(x: u64) -> u32 {
    let mut v = x;
    v -= (v >> 1) & 0x5555_5555_5555_5555;
    v = (v & 0x3333_3333_3333_3333) + ((v >> 2) & 0x3333_3333_3333_3333);
    v = (v + (v >> 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    (v.wrapping_mul(0x0101_0101_0101_0101) >> 56) as u32
}

const DEBRUIJN64: u64 = 0x03F7_9D71_B4CB_0A89;

const fn build_debruijn_index() -> [u8; 64] {
    let mut table = [0u8; 64];
    let mut i = 0;
    while i < 64 {
        table[((DEBRUIJN64 << i) >> 58) as usize] = i as u8;
        i += 1;
    }
    table
}

static DEBRUIJN_INDEX: [u8; 64] = build_debruijn_index();

/// Trailing zero count via de Bruijn multiplication; 64 for zero.
#[inline]
pub fn count_trailing_zeros(x: u64) -> u32 {
    if x == 0 {
        return 64;
    }
    let lowest = x & x.wrapping_neg();
    DEBRUIJN_INDEX[(lowest.wrapping_mul(DEBRUIJN64) >> 58) as usize] as u32
}

/// One table-driven substitution-and-diffusion round.
///
/// Each byte of `input` indexes the shared T-table; the four entries and the
/// round key are folded together with XOR.
#[inline]
pub fn mixing_round(input: u32, round_key: u32) -> u32 {
    let [b0, b1, b2, b3] = input.to_le_bytes();
    MIX_TABLE[b0 as usize]
        ^ MIX_TABLE[b1 as usize]
        ^ MIX_TABLE[b2 as usize]
        ^ MIX_TABLE[b3 as usize]
        ^ round_key
}

/// Sum of the low 32 bits of `a` and `b`, widened to 64 bits.
#[inline]
pub fn add_as_unsigned_word(a: u64, b: u64) -> u64 {
    (a & LOW_WORD) + (b & LOW_WORD)
}
