//! Compact (`nBits`) target encoding and block-proof arithmetic.
//!
//! The compact form is the 32-bit floating-point-like encoding of a 256-bit
//! target inherited from Bitcoin: the high byte is a base-256 exponent, the
//! low 23 bits a mantissa, and bit 23 a sign flag (never set for valid
//! targets, but decodable).

use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Result of decoding a compact target.
#[derive(Debug, Clone)]
pub struct DecodedTarget {
    /// The decoded 256-bit target (truncated if `overflow` is set).
    pub target: BigUint,
    /// The sign bit was set with a non-zero mantissa.
    pub negative: bool,
    /// The exponent places mantissa bits above bit 255.
    pub overflow: bool,
}

/// Decode a compact-encoded target.
pub fn compact_to_target(bits: u32) -> DecodedTarget {
    let size = (bits >> 24) as u32;
    let mut word = bits & 0x007f_ffff;

    let target = if size <= 3 {
        word >>= 8 * (3 - size);
        BigUint::from(word)
    } else {
        BigUint::from(word) << (8 * (size - 3))
    };

    let negative = word != 0 && (bits & 0x0080_0000) != 0;
    let overflow =
        word != 0 && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));

    DecodedTarget {
        target,
        negative,
        overflow,
    }
}

/// Encode a target in compact form.
///
/// The mantissa is shifted down a byte when its high bit is set, so the sign
/// flag of the encoding is never produced for an unsigned target.
pub fn target_to_compact(target: &BigUint) -> u32 {
    if target.is_zero() {
        return 0;
    }

    let mut size = (target.bits() as u32 + 7) / 8;
    let mut compact: u32 = if size <= 3 {
        let low: u32 = target.iter_u32_digits().next().unwrap_or(0);
        low << (8 * (3 - size))
    } else {
        let shifted = target >> (8 * (size - 3));
        shifted.iter_u32_digits().next().unwrap_or(0)
    };

    if compact & 0x0080_0000 != 0 {
        compact >>= 8;
        size += 1;
    }

    compact | (size << 24)
}

/// Work contributed by a block with the given compact target.
///
/// `proof = 2^256 / (target + 1)`, zero for malformed or out-of-range
/// encodings. Cumulative chain work is the sum of these per block.
pub fn block_proof(bits: u32) -> BigUint {
    let decoded = compact_to_target(bits);
    if decoded.negative || decoded.overflow || decoded.target.is_zero() {
        return BigUint::zero();
    }
    (BigUint::one() << 256u32) / (&decoded.target + 1u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decode(bits: u32) -> BigUint {
        compact_to_target(bits).target
    }

    #[test]
    fn test_known_encodings() {
        // powLimit = ~0 >> 1 encodes as 0x207fffff.
        let pow_limit = ((BigUint::one() << 256u32) - 1u32) >> 1u32;
        assert_eq!(target_to_compact(&pow_limit), 0x207f_ffff);

        // posLimit = ~0 >> 20 encodes with a 0x00000f... mantissa.
        let pos_limit = ((BigUint::one() << 256u32) - 1u32) >> 20u32;
        let bits = target_to_compact(&pos_limit);
        assert_eq!(bits >> 24, 30);
        assert_eq!(decode(bits), BigUint::from(0x000f_ffffu32) << (8 * 27));

        // The classic Bitcoin genesis target.
        assert_eq!(
            decode(0x1d00_ffff),
            BigUint::from(0xffffu32) << (8 * (0x1d - 3))
        );
    }

    #[test]
    fn test_small_exponents() {
        assert_eq!(decode(0x0100_0012), BigUint::zero()); // 0x12 >> 16
        assert_eq!(decode(0x0200_1234), BigUint::from(0x12u32));
        assert_eq!(decode(0x0300_1234), BigUint::from(0x1234u32));
    }

    #[test]
    fn test_negative_and_overflow_flags() {
        assert!(compact_to_target(0x0180_0001).negative);
        assert!(!compact_to_target(0x0180_0000).negative); // zero mantissa
        assert!(compact_to_target(0xff00_0001).overflow);
        assert!(compact_to_target(0x2200_ffff).overflow);
        // A 16-bit mantissa at exponent 33 still tops out below 2^256.
        assert!(!compact_to_target(0x2100_ffff).overflow);
        assert!(!compact_to_target(0x2000_ffff).overflow);
    }

    #[test]
    fn test_block_proof_rejects_malformed() {
        assert!(block_proof(0).is_zero());
        assert!(block_proof(0x0180_0001).is_zero()); // negative
        assert!(block_proof(0xff00_0001).is_zero()); // overflow
        assert!(!block_proof(0x207f_ffff).is_zero());
    }

    #[test]
    fn test_block_proof_monotonic_in_difficulty() {
        // A smaller target means more work.
        assert!(block_proof(0x1d00_ffff) > block_proof(0x207f_ffff));
    }

    proptest! {
        /// compact(uncompact(x)) == x for well-formed encodings.
        ///
        /// Sizes 1..=3 truncate mantissa bits on decode and so only
        /// round-trip for canonical mantissas; those are unit-tested above.
        #[test]
        fn compact_round_trip(mantissa in 0x008000u32..=0x7fffffu32, size in 4u32..=32u32) {
            let bits = (size << 24) | mantissa;
            let decoded = compact_to_target(bits);
            prop_assume!(!decoded.negative && !decoded.overflow);
            prop_assert_eq!(target_to_compact(&decoded.target), bits);
        }
    }
}
