//! 256-bit hash type.
//!
//! Stored little-endian internally, matching the on-disk and over-the-wire
//! byte order of the original chain. Display and hex parsing use the
//! conventional big-endian ("reversed") form seen in explorers and logs.

use num_bigint::BigUint;
use std::fmt;

/// A 256-bit opaque value (block hash, txid, target).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Uint256([u8; 32]);

impl Uint256 {
    /// The all-zero value.
    pub const ZERO: Uint256 = Uint256([0u8; 32]);

    /// Construct from little-endian bytes (wire order).
    pub fn from_le_bytes(bytes: [u8; 32]) -> Self {
        Uint256(bytes)
    }

    /// Construct from a big-endian hex string, with or without a `0x` prefix.
    ///
    /// Used for checkpoint and genesis literals. Panics on malformed input,
    /// so it is only suitable for compile-time constants.
    pub fn from_be_hex(s: &str) -> Self {
        let s = s.strip_prefix("0x").unwrap_or(s);
        assert_eq!(s.len(), 64, "uint256 hex literal must be 64 nibbles");
        let mut be = [0u8; 32];
        hex::decode_to_slice(s, &mut be).expect("valid uint256 hex literal");
        be.reverse();
        Uint256(be)
    }

    /// Little-endian bytes (wire order).
    pub fn as_le_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Interpret as an unsigned integer (little-endian).
    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_le(&self.0)
    }

    /// Truncate an unsigned integer to 256 bits.
    pub fn from_biguint(value: &BigUint) -> Self {
        let mut bytes = value.to_bytes_le();
        bytes.truncate(32);
        let mut le = [0u8; 32];
        le[..bytes.len()].copy_from_slice(&bytes);
        Uint256(le)
    }

    /// The low 64 bits.
    pub fn low_u64(&self) -> u64 {
        let mut b = [0u8; 8];
        b.copy_from_slice(&self.0[..8]);
        u64::from_le_bytes(b)
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl Ord for Uint256 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Numeric comparison: most significant byte is last in LE order.
        self.0.iter().rev().cmp(other.0.iter().rev())
    }
}

impl PartialOrd for Uint256 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Uint256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut be = self.0;
        be.reverse();
        write!(f, "{}", hex::encode(be))
    }
}

impl fmt::Debug for Uint256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let h = Uint256::from_be_hex(
            "7286972be4dbc1463d256049b7471c252e6557e222cab9be73181d359cd28bcc",
        );
        assert_eq!(
            h.to_string(),
            "7286972be4dbc1463d256049b7471c252e6557e222cab9be73181d359cd28bcc"
        );
        // Wire order is reversed: the display's last byte pair comes first.
        assert_eq!(h.as_le_bytes()[0], 0xcc);
        assert_eq!(h.as_le_bytes()[31], 0x72);
    }

    #[test]
    fn test_ordering_is_numeric() {
        let small = Uint256::from_be_hex(
            "0000000000000000000000000000000000000000000000000000000000000001",
        );
        let big = Uint256::from_be_hex(
            "0100000000000000000000000000000000000000000000000000000000000000",
        );
        assert!(small < big);
        assert!(Uint256::ZERO < small);
    }

    #[test]
    fn test_biguint_round_trip() {
        let h = Uint256::from_be_hex(
            "00000342c5dc5f7fd4a8ef041d4df4e569bd40756405a8c336c5f42c77e097a2",
        );
        assert_eq!(Uint256::from_biguint(&h.to_biguint()), h);
    }

    #[test]
    fn test_low_u64_and_entropy_parity() {
        let odd = Uint256::from_be_hex(
            "0000000000000000000000000000000000000000000000000000000000000001",
        );
        assert_eq!(odd.low_u64() & 1, 1);
        assert_eq!(Uint256::ZERO.low_u64() & 1, 0);
    }
}
