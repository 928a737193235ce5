//  64-bit FNV-1a, used to pick the start of a probe sequence.

use std::hash::{BuildHasherDefault, Hasher};

const OFFSET_BASIS: u64 = 14_695_981_039_346_656_037;
const PRIME: u64 = 1_099_511_628_211;

/// A `BuildHasher` which returns a `Default` `FnvHasher`.
pub type FnvBuildHasher = BuildHasherDefault<FnvHasher>;

/// Returns the 64-bit FNV-1a hash of `bytes`.
///
/// The start of the probe sequence of a key in a table of `capacity` slots is
/// `fingerprint(key) % capacity`.
#[inline]
pub fn fingerprint(bytes: &[u8]) -> u64 {
    write(OFFSET_BASIS, bytes)
}

/// An incremental FNV-1a hasher.
///
/// Hashing a byte slice with a single `write` gives the same value as
/// [`fingerprint`]. This is NOT a cryptographic algorithm.
#[derive(Clone, Copy, Debug)]
pub struct FnvHasher {
    hash: u64,
}

impl Default for FnvHasher {
    #[inline]
    fn default() -> Self {
        Self { hash: OFFSET_BASIS }
    }
}

impl Hasher for FnvHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.hash = write(self.hash, bytes);
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }
}

#[inline]
fn write(mut hash: u64, bytes: &[u8]) -> u64 {
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
