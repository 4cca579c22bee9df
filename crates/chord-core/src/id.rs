//! 160-bit ring identifiers and the interval arithmetic routing depends on.

use sha1::{Digest, Sha1};
use std::fmt;

/// A point on the 160-bit identifier ring, big-endian, derived by SHA-1.
///
/// Byte-lexicographic ordering on a fixed-width big-endian array is the
/// same as numeric ordering, so `Ord` is derived directly instead of
/// converting to a bignum type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RingId([u8; 20]);

impl RingId {
    pub const BITS: u32 = 160;

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        RingId(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// `(self + 2^i) mod 2^160`. `i` must be `< 160`.
    pub fn add_pow2(&self, i: u32) -> Self {
        assert!(i < Self::BITS, "finger offset out of range: {i}");
        let mut bytes = self.0;
        let mut idx = 19 - (i / 8) as usize;
        let mut carry: u16 = 1u16 << (i % 8);
        loop {
            let sum = bytes[idx] as u16 + carry;
            bytes[idx] = (sum & 0xFF) as u8;
            carry = sum >> 8;
            if carry == 0 || idx == 0 {
                break;
            }
            idx -= 1;
        }
        RingId(bytes)
    }
}

impl fmt::Display for RingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for RingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RingId({self})")
    }
}

/// SHA-1 of the UTF-8 bytes of `text`, read big-endian as a 160-bit integer.
pub fn hash_id(text: &str) -> RingId {
    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest);
    RingId(bytes)
}

/// Is `x` in the half-open-closed arc `(low, high]` on the ring?
pub fn in_arc_oc(x: RingId, low: RingId, high: RingId) -> bool {
    if low < high {
        low < x && x <= high
    } else if low > high {
        x > low || x <= high
    } else {
        // Degenerate full-ring arc: only reachable in a one-node ring.
        true
    }
}

/// Is `x` in the open arc `(low, high)` on the ring?
pub fn in_arc_oo(x: RingId, low: RingId, high: RingId) -> bool {
    if low < high {
        low < x && x < high
    } else if low > high {
        x > low || x < high
    } else {
        false
    }
}
