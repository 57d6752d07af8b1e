//! Consensus (wire) serialization.
//!
//! Only the encoding direction is provided: the core computes hashes over
//! serializations it builds itself, while parsing of peer- or disk-supplied
//! bytes belongs to the network and storage layers.

use crate::uint256::Uint256;

/// Append-only consensus encoder.
#[derive(Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u32_le(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i32_le(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i64_le(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_uint256(&mut self, v: &Uint256) {
        self.buf.extend_from_slice(v.as_le_bytes());
    }

    pub fn write_bytes(&mut self, v: &[u8]) {
        self.buf.extend_from_slice(v);
    }

    /// Bitcoin-style variable-length integer prefix.
    pub fn write_compact_size(&mut self, v: u64) {
        if v < 0xfd {
            self.buf.push(v as u8);
        } else if v <= 0xffff {
            self.buf.push(0xfd);
            self.buf.extend_from_slice(&(v as u16).to_le_bytes());
        } else if v <= 0xffff_ffff {
            self.buf.push(0xfe);
            self.buf.extend_from_slice(&(v as u32).to_le_bytes());
        } else {
            self.buf.push(0xff);
            self.buf.extend_from_slice(&v.to_le_bytes());
        }
    }

    /// Length-prefixed byte vector (scripts, signatures).
    pub fn write_var_bytes(&mut self, v: &[u8]) {
        self.write_compact_size(v.len() as u64);
        self.buf.extend_from_slice(v);
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}
