//! crates/signature/src/checksum_spec.rs
//!
//! The strong-checksum capability handed to generators and matchers.
//!
//! A [`ChecksumSpec`] fixes everything that determines a block's strong sum:
//! the algorithm, the truncation length and the optional seed bytes mixed in
//! after the block data. Both sides of a transfer must use the same spec, so
//! it is carried inside every [`Signature`](crate::Signature) and passed to the
//! matcher from there rather than looked up in any global registry.

use std::fmt;
use std::num::NonZeroU8;

use checksums::strong::{Md4, Md5, Sha1, StrongDigest, Xxh64};

use crate::algorithm::SignatureAlgorithm;
use crate::generation::SignatureError;

/// Streaming strong hasher for one of the supported algorithms.
#[derive(Clone)]
pub enum StrongHasher {
    /// MD4 state.
    Md4(Md4),
    /// MD5 state.
    Md5(Md5),
    /// SHA-1 state.
    Sha1(Sha1),
    /// XXH64 state.
    Xxh64(Xxh64),
}

impl StrongHasher {
    /// Creates a fresh hasher for `algorithm`.
    #[must_use]
    pub fn new(algorithm: SignatureAlgorithm) -> Self {
        match algorithm {
            SignatureAlgorithm::Md4 => Self::Md4(Md4::new()),
            SignatureAlgorithm::Md5 => Self::Md5(Md5::new()),
            SignatureAlgorithm::Sha1 => Self::Sha1(Sha1::new()),
            SignatureAlgorithm::Xxh64 { seed } => Self::Xxh64(Xxh64::with_seed(seed)),
        }
    }

    /// Feeds bytes into the state.
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Md4(hasher) => hasher.update(data),
            Self::Md5(hasher) => hasher.update(data),
            Self::Sha1(hasher) => hasher.update(data),
            Self::Xxh64(hasher) => hasher.update(data),
        }
    }

    /// Finishes the digest, keeping at most `len` leading bytes.
    #[must_use]
    pub fn finalize_truncated(self, len: usize) -> Vec<u8> {
        fn take(digest: &[u8], len: usize) -> Vec<u8> {
            digest[..len.min(digest.len())].to_vec()
        }

        match self {
            Self::Md4(hasher) => take(&hasher.finalize(), len),
            Self::Md5(hasher) => take(&hasher.finalize(), len),
            Self::Sha1(hasher) => take(&hasher.finalize(), len),
            Self::Xxh64(hasher) => take(&hasher.finalize(), len),
        }
    }
}

impl fmt::Debug for StrongHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Md4(_) => "Md4",
            Self::Md5(_) => "Md5",
            Self::Sha1(_) => "Sha1",
            Self::Xxh64(_) => "Xxh64",
        };
        f.debug_tuple("StrongHasher").field(&name).finish()
    }
}

/// Algorithm, truncation length and seed that together define a strong sum.
#[derive(Clone)]
pub struct ChecksumSpec {
    algorithm: SignatureAlgorithm,
    strong_len: NonZeroU8,
    seed: Vec<u8>,
    template: StrongHasher,
}

impl ChecksumSpec {
    /// Creates a spec using the full digest width and no seed.
    #[must_use]
    pub fn new(algorithm: SignatureAlgorithm) -> Self {
        let full = u8::try_from(algorithm.digest_len()).unwrap_or(u8::MAX);
        Self {
            algorithm,
            strong_len: NonZeroU8::new(full).unwrap_or(NonZeroU8::MIN),
            seed: Vec::new(),
            template: StrongHasher::new(algorithm),
        }
    }

    /// Creates a spec with explicit truncation length and seed.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::DigestLengthMismatch`] when `strong_len`
    /// exceeds the algorithm's digest width.
    pub fn from_raw_parts(
        algorithm: SignatureAlgorithm,
        strong_len: NonZeroU8,
        seed: Vec<u8>,
    ) -> Result<Self, SignatureError> {
        if usize::from(strong_len.get()) > algorithm.digest_len() {
            return Err(SignatureError::DigestLengthMismatch {
                algorithm,
                requested: strong_len,
            });
        }
        Ok(Self {
            algorithm,
            strong_len,
            seed,
            template: StrongHasher::new(algorithm),
        })
    }

    /// Returns the configured algorithm.
    #[inline]
    #[must_use]
    pub const fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Returns the number of strong-sum bytes kept per block.
    #[inline]
    #[must_use]
    pub const fn strong_len(&self) -> NonZeroU8 {
        self.strong_len
    }

    /// Returns the seed bytes appended after each block's data.
    #[inline]
    #[must_use]
    pub fn seed(&self) -> &[u8] {
        &self.seed
    }

    /// Returns a fresh hasher forked from the spec's template state.
    #[must_use]
    pub fn hasher(&self) -> StrongHasher {
        self.template.clone()
    }

    /// Computes the truncated strong sum of `data`.
    #[must_use]
    pub fn strong_sum(&self, data: &[u8]) -> Vec<u8> {
        self.strong_sum_parts(data, &[])
    }

    /// Computes the truncated strong sum of `front` followed by `back`.
    ///
    /// Lets callers hash a wrapped ring-buffer window without copying it.
    #[must_use]
    pub fn strong_sum_parts(&self, front: &[u8], back: &[u8]) -> Vec<u8> {
        let mut hasher = self.hasher();
        hasher.update(front);
        hasher.update(back);
        if !self.seed.is_empty() {
            hasher.update(&self.seed);
        }
        hasher.finalize_truncated(usize::from(self.strong_len.get()))
    }
}

impl fmt::Debug for ChecksumSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChecksumSpec")
            .field("algorithm", &self.algorithm)
            .field("strong_len", &self.strong_len)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ChecksumSpec {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm
            && self.strong_len == other.strong_len
            && self.seed == other.seed
    }
}

impl Eq for ChecksumSpec {}

impl Default for ChecksumSpec {
    fn default() -> Self {
        Self::new(SignatureAlgorithm::default())
    }
}
