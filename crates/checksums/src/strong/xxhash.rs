use std::fmt;

use super::StrongDigest;

/// Streaming XXH64 hasher.
///
/// XXH64 is not cryptographic, but it is fast and its seed makes offline
/// precomputation of colliding blocks impractical.
///
/// ```
/// use checksums::strong::{StrongDigest, Xxh64};
///
/// let mut hasher = Xxh64::with_seed(42);
/// hasher.update(b"chunk 1");
/// hasher.update(b"chunk 2");
/// assert_eq!(hasher.finalize(), Xxh64::digest_seeded(42, b"chunk 1chunk 2"));
/// assert_ne!(Xxh64::digest_seeded(42, b"x"), Xxh64::digest_seeded(43, b"x"));
/// ```
#[derive(Clone)]
pub struct Xxh64 {
    inner: xxhash_rust::xxh64::Xxh64,
}

impl Xxh64 {
    /// One-shot digest of `data` with an explicit seed. Output is little-endian.
    #[must_use]
    pub fn digest_seeded(seed: u64, data: &[u8]) -> [u8; 8] {
        xxhash_rust::xxh64::xxh64(data, seed).to_le_bytes()
    }
}

impl fmt::Debug for Xxh64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Xxh64").finish_non_exhaustive()
    }
}

impl StrongDigest for Xxh64 {
    type Seed = u64;
    type Digest = [u8; 8];
    const DIGEST_LEN: usize = 8;

    fn with_seed(seed: Self::Seed) -> Self {
        Self {
            inner: xxhash_rust::xxh64::Xxh64::new(seed),
        }
    }

    fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    fn finalize(self) -> Self::Digest {
        self.inner.digest().to_le_bytes()
    }
}
