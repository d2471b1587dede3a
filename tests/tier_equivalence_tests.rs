//! Cross-tier equivalence tests
//!
//! Every tier the running machine can serve must produce results identical
//! to the portable scalar tier, for every length including the awkward ones
//! around vector widths.

use powprim::simd::scalar;
use powprim::{CapabilityDescriptor, Op, PrimitiveLibrary, Tier};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

const SIZES: [usize; 10] = [0, 1, 7, 8, 9, 63, 64, 65, 4096, 4133];

fn random_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rng.fill_bytes(&mut buf);
    buf
}

/// Libraries worth comparing on this machine: scalar, detected, and the
/// hardware-scalar tier forced by masking off the vector unit.
fn libraries() -> Vec<PrimitiveLibrary> {
    let detected = PrimitiveLibrary::detected();
    let no_vector = PrimitiveLibrary::with_capabilities(CapabilityDescriptor {
        vector_unit: false,
        vector_width_bits: 0,
        crypto_rounds: false,
        ..detected.descriptor()
    });
    vec![PrimitiveLibrary::scalar(), detected, no_vector]
}

#[test]
fn test_copy_matches_across_tiers() {
    let mut rng = StdRng::seed_from_u64(0xC0FF);
    for lib in libraries() {
        for &len in &SIZES {
            let src = random_bytes(&mut rng, len);
            let mut dst = vec![0u8; len];
            lib.copy(&mut dst, &src);
            assert_eq!(dst, src, "copy len {} tier {}", len, lib.tier(Op::Copy));
        }
    }
}

#[test]
fn test_copy_unaligned_offsets() {
    let mut rng = StdRng::seed_from_u64(17);
    let src = random_bytes(&mut rng, 4200);
    for lib in libraries() {
        for offset in 0..8 {
            let mut dst = vec![0u8; 4200];
            let len = 4133;
            lib.copy(&mut dst[offset..offset + len], &src[8 - offset..8 - offset + len]);
            assert_eq!(&dst[offset..offset + len], &src[8 - offset..8 - offset + len]);
            assert!(dst[..offset].iter().all(|&b| b == 0));
            assert!(dst[offset + len..].iter().all(|&b| b == 0));
        }
    }
}

#[test]
fn test_fill_matches_across_tiers() {
    for lib in libraries() {
        for &len in &SIZES {
            let mut words = vec![0u64; len];
            lib.fill(&mut words, 0x0123_4567_89AB_CDEF);
            assert!(words.iter().all(|&w| w == 0x0123_4567_89AB_CDEF));
        }
    }
}

#[test]
fn test_compare_random_pairs() {
    let mut rng = StdRng::seed_from_u64(0xA11CE);
    let scalar = PrimitiveLibrary::scalar();
    for lib in libraries() {
        for _ in 0..100 {
            let len = rng.gen_range(0..5000);
            let a = random_bytes(&mut rng, len);
            let mut b = a.clone();
            if len > 0 && rng.gen_bool(0.7) {
                let k = rng.gen_range(0..len);
                b[k] = b[k].wrapping_add(rng.gen_range(1..=255));
            }
            assert_eq!(lib.compare(&a, &b), scalar.compare(&a, &b), "len {}", len);
        }
    }
}

#[test]
fn test_compare_last_byte_mismatch() {
    for lib in libraries() {
        for &len in SIZES.iter().filter(|&&n| n > 0) {
            let a = vec![0x40u8; len];
            let mut b = a.clone();
            b[len - 1] = 0x45;
            assert_eq!(lib.compare(&a, &b), 0x40 - 0x45);
            assert_eq!(lib.compare(&b, &a), 0x45 - 0x40);
            assert_eq!(lib.compare(&a, &a), 0);
        }
    }
}

#[test]
fn test_compare_prefix_orders_first() {
    let lib = PrimitiveLibrary::detected();
    assert_eq!(lib.compare(b"abc", b"abcd"), -1);
    assert_eq!(lib.compare(b"abcd", b"abc"), 1);
    assert_eq!(lib.compare(b"", b""), 0);
}

#[test]
fn test_xor_matches_across_tiers() {
    let mut rng = StdRng::seed_from_u64(99);
    for lib in libraries() {
        for &len in &SIZES {
            let a = random_bytes(&mut rng, len);
            let b = random_bytes(&mut rng, len);
            let mut out = a.clone();
            lib.xor(&mut out, &b);
            let expected: Vec<u8> = a.iter().zip(&b).map(|(x, y)| x ^ y).collect();
            assert_eq!(out, expected);

            // self-inverse
            lib.xor(&mut out, &b);
            assert_eq!(out, a);
        }
    }
}

#[test]
fn test_rotate_four_times_is_identity() {
    let mut rng = StdRng::seed_from_u64(4);
    for lib in libraries() {
        for &len in &SIZES {
            let original: Vec<u32> = (0..len).map(|_| rng.gen()).collect();
            let mut words = original.clone();
            lib.rotate_left8_in32(&mut words);
            let once = words.clone();
            for (w, o) in once.iter().zip(&original) {
                assert_eq!(*w, o.rotate_left(8));
            }
            for _ in 0..3 {
                lib.rotate_left8_in32(&mut words);
            }
            assert_eq!(words, original);
        }
    }
}

#[test]
fn test_byte_substitution_matches_across_tiers() {
    let mut rng = StdRng::seed_from_u64(0x5B0C);
    let scalar = PrimitiveLibrary::scalar();
    for lib in libraries() {
        for &len in &SIZES {
            let input = random_bytes(&mut rng, len);
            let mut expected = input.clone();
            scalar.byte_substitution(&mut expected);
            let mut actual = input.clone();
            lib.byte_substitution(&mut actual);
            assert_eq!(actual, expected, "subst len {} tier {}", len, lib.tier(Op::ByteSubstitution));

            lib.inverse_byte_substitution(&mut actual);
            assert_eq!(actual, input);
        }
    }
}

#[test]
fn test_bit_ops_over_seeded_values() {
    let mut rng = StdRng::seed_from_u64(1000);
    let values: Vec<u64> = (0..1000).map(|_| rng.gen()).collect();
    for lib in libraries() {
        for &x in &values {
            assert_eq!(lib.popcount(x), x.count_ones());
            assert_eq!(lib.count_trailing_zeros(x), x.trailing_zeros());
        }
        assert_eq!(lib.popcount(0), 0);
        assert_eq!(lib.popcount(u64::MAX), 64);
        assert_eq!(lib.count_trailing_zeros(0), 64);
        assert_eq!(lib.count_trailing_zeros(1 << 63), 63);
    }
}

#[test]
fn test_mixing_round_and_widening_add() {
    let mut rng = StdRng::seed_from_u64(77);
    for lib in libraries() {
        assert_eq!(lib.tier(Op::MixingRound), Tier::PureScalar);
        for _ in 0..200 {
            let input: u32 = rng.gen();
            let key: u32 = rng.gen();
            assert_eq!(lib.mixing_round(input, key), scalar::mixing_round(input, key));

            let a: u64 = rng.gen();
            let b: u64 = rng.gen();
            assert_eq!(lib.add_as_unsigned_word(a, b), (a & 0xFFFF_FFFF) + (b & 0xFFFF_FFFF));
        }
    }
}

#[test]
fn test_rotate_right_every_amount_across_tiers() {
    let mut rng = StdRng::seed_from_u64(0x0707);
    let scalar = PrimitiveLibrary::scalar();
    for lib in libraries() {
        for _ in 0..20 {
            let x32: u32 = rng.gen();
            let x64: u64 = rng.gen();
            for r in 0..32 {
                assert_eq!(lib.rotate_right32(x32, r), scalar.rotate_right32(x32, r));
                assert_eq!(lib.rotate_right32(x32, r), x32.rotate_right(r));
            }
            for r in 0..64 {
                assert_eq!(lib.rotate_right64(x64, r), scalar.rotate_right64(x64, r));
                assert_eq!(lib.rotate_right64(x64, r), x64.rotate_right(r));
            }
        }
        // amounts wrap at the word width
        assert_eq!(lib.rotate_right32(0x1234_5678, 32), 0x1234_5678);
        assert_eq!(lib.rotate_right64(0xF0, 68), 0x0F);
    }
}

#[test]
fn test_full_suite_on_random_pairs() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0100);
    let scalar = PrimitiveLibrary::scalar();
    let detected = PrimitiveLibrary::detected();

    for round in 0..100 {
        let len = rng.gen_range(0..5000);
        let a = random_bytes(&mut rng, len);
        let mut b = random_bytes(&mut rng, len);
        if rng.gen_bool(0.3) {
            b.copy_from_slice(&a);
            if len > 0 {
                let k = rng.gen_range(0..len);
                b[k] ^= 1 << rng.gen_range(0..8);
            }
        }

        // byte buffers
        let (mut slow, mut fast) = (vec![0u8; len], vec![0u8; len]);
        scalar.copy(&mut slow, &a);
        detected.copy(&mut fast, &a);
        assert_eq!(slow, fast, "copy round {}", round);

        assert_eq!(scalar.compare(&a, &b), detected.compare(&a, &b), "compare round {}", round);

        let (mut slow, mut fast) = (a.clone(), a.clone());
        scalar.xor(&mut slow, &b);
        detected.xor(&mut fast, &b);
        assert_eq!(slow, fast, "xor round {}", round);

        let (mut slow, mut fast) = (b.clone(), b.clone());
        scalar.byte_substitution(&mut slow);
        detected.byte_substitution(&mut fast);
        assert_eq!(slow, fast, "substitution round {}", round);

        // word views of the same pair
        let words: Vec<u32> = a
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        let (mut slow, mut fast) = (words.clone(), words.clone());
        scalar.rotate_left8_in32(&mut slow);
        detected.rotate_left8_in32(&mut fast);
        assert_eq!(slow, fast, "rotate round {}", round);

        let pattern = b
            .chunks_exact(8)
            .next()
            .map_or(0, |c| u64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]));
        let (mut slow, mut fast) = (vec![0u64; len / 8], vec![0u64; len / 8]);
        scalar.fill(&mut slow, pattern);
        detected.fill(&mut fast, pattern);
        assert_eq!(slow, fast, "fill round {}", round);

        // scalar ops over words drawn from the pair
        for (x, y) in a.chunks_exact(8).zip(b.chunks_exact(8)).take(64) {
            let x = u64::from_le_bytes([x[0], x[1], x[2], x[3], x[4], x[5], x[6], x[7]]);
            let y = u64::from_le_bytes([y[0], y[1], y[2], y[3], y[4], y[5], y[6], y[7]]);
            assert_eq!(scalar.popcount(x), detected.popcount(x));
            assert_eq!(scalar.count_trailing_zeros(x), detected.count_trailing_zeros(x));
            assert_eq!(scalar.add_as_unsigned_word(x, y), detected.add_as_unsigned_word(x, y));
            assert_eq!(
                scalar.mixing_round(x as u32, y as u32),
                detected.mixing_round(x as u32, y as u32)
            );
            assert_eq!(
                scalar.rotate_right32(x as u32, y as u32),
                detected.rotate_right32(x as u32, y as u32)
            );
            assert_eq!(scalar.rotate_right64(x, y as u32), detected.rotate_right64(x, y as u32));
        }
    }
}

proptest! {
    #[test]
    fn prop_compare_sign_matches_slice_ordering(a in proptest::collection::vec(any::<u8>(), 0..300),
                                                b in proptest::collection::vec(any::<u8>(), 0..300)) {
        let lib = PrimitiveLibrary::global();
        let result = lib.compare(&a, &b);
        prop_assert_eq!(result.signum(), a.cmp(&b) as i32);
    }

    #[test]
    fn prop_detected_copy_and_xor_match_scalar(data in proptest::collection::vec(any::<u8>(), 0..2048),
                                               key in any::<u8>()) {
        let lib = PrimitiveLibrary::global();
        let scalar = PrimitiveLibrary::scalar();

        let mut fast = vec![0u8; data.len()];
        lib.copy(&mut fast, &data);
        prop_assert_eq!(&fast, &data);

        let pad = vec![key; data.len()];
        let mut slow = data.clone();
        lib.xor(&mut fast, &pad);
        scalar.xor(&mut slow, &pad);
        prop_assert_eq!(fast, slow);
    }

    #[test]
    fn prop_bit_ops_match_std(x in any::<u64>()) {
        let lib = PrimitiveLibrary::global();
        prop_assert_eq!(lib.popcount(x), x.count_ones());
        prop_assert_eq!(lib.count_trailing_zeros(x), x.trailing_zeros());
    }
}
