//! Fixed lookup tables shared by every implementation tier.
//!
//! All tables are computed at compile time so the vector, hardware-scalar and
//! pure-scalar tiers read the very same bytes.
//!
//! - [`SBOX`]: the FIPS-197 AES S-box. This is the fixed, invertible byte map
//!   used by the byte substitution step.
//! - [`INV_SBOX`]: its inverse.
//! - [`MIX_TABLE`]: the 256-entry AES encryption T-table (`Te0`, little-endian
//!   packing) used by the mixing round. Entry `x` packs the MixColumns image of
//!   the column `(S[x], 0, 0, 0)`: bytes `(2·S[x], S[x], S[x], 3·S[x])` from
//!   least to most significant.

/// Multiply by `x` (i.e. 2) in GF(2^8) with the AES polynomial.
#[inline]
pub const fn gf_double(b: u8) -> u8 {
    let shifted = b << 1;
    if b & 0x80 != 0 {
        shifted ^ 0x1B
    } else {
        shifted
    }
}

/// Multiply by `x + 1` (i.e. 3) in GF(2^8).
#[inline]
pub const fn gf_triple(b: u8) -> u8 {
    gf_double(b) ^ b
}

const fn build_sbox() -> [u8; 256] {
    let mut sbox = [0u8; 256];
    let mut p: u8 = 1;
    let mut q: u8 = 1;

    // p walks the multiplicative group by powers of 3, q by powers of 3^-1,
    // so q is always the inverse of p.
    loop {
        p = p ^ (p << 1) ^ if p & 0x80 != 0 { 0x1B } else { 0 };

        q ^= q << 1;
        q ^= q << 2;
        q ^= q << 4;
        if q & 0x80 != 0 {
            q ^= 0x09;
        }

        let affine = q
            ^ q.rotate_left(1)
            ^ q.rotate_left(2)
            ^ q.rotate_left(3)
            ^ q.rotate_left(4);
        sbox[p as usize] = affine ^ 0x63;

        if p == 1 {
            break;
        }
    }

    // 0 has no inverse
    sbox[0] = 0x63;
    sbox
}

const fn build_inverse(table: &[u8; 256]) -> [u8; 256] {
    let mut inv = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        inv[table[i] as usize] = i as u8;
        i += 1;
    }
    inv
}

const fn build_mix_table(sbox: &[u8; 256]) -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let s = sbox[i];
        table[i] = (gf_double(s) as u32)
            | ((s as u32) << 8)
            | ((s as u32) << 16)
            | ((gf_triple(s) as u32) << 24);
        i += 1;
    }
    table
}

/// AES S-box.
pub static SBOX: [u8; 256] = build_sbox();

/// Inverse AES S-box.
pub static INV_SBOX: [u8; 256] = build_inverse(&build_sbox());

/// Mixing-round diffusion table (AES `Te0`).
pub static MIX_TABLE: [u32; 256] = build_mix_table(&build_sbox());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sbox_known_values() {
        assert_eq!(SBOX[0x00], 0x63);
        assert_eq!(SBOX[0x01], 0x7C);
        assert_eq!(SBOX[0x53], 0xED);
        assert_eq!(SBOX[0x9A], 0xB8);
        assert_eq!(SBOX[0xFF], 0x16);
    }

    #[test]
    fn test_sbox_is_permutation() {
        let mut seen = [false; 256];
        for &b in SBOX.iter() {
            assert!(!seen[b as usize], "duplicate output {:#04x}", b);
            seen[b as usize] = true;
        }
    }

    #[test]
    fn test_inverse_roundtrip() {
        for x in 0..=255u8 {
            assert_eq!(INV_SBOX[SBOX[x as usize] as usize], x);
        }
        assert_eq!(INV_SBOX[0x63], 0x00);
        assert_eq!(INV_SBOX[0x16], 0xFF);
    }

    #[test]
    fn test_mix_table_known_values() {
        assert_eq!(MIX_TABLE[0x00], 0xA563_63C6);
        assert_eq!(MIX_TABLE[0x01], 0x847C_7CF8);
        assert_eq!(MIX_TABLE[0xFF], 0x3A16_162C);
    }

    #[test]
    fn test_gf_arithmetic() {
        assert_eq!(gf_double(0x57), 0xAE);
        assert_eq!(gf_double(0xAE), 0x47);
        assert_eq!(gf_triple(0x63), 0xA5);
    }
}
