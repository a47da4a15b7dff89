//! crates/signature/src/algorithm.rs
//!
//! Strong checksum algorithm definitions for signature generation.

use std::fmt;
use std::str::FromStr;

use checksums::strong::{Md4, Md5, Sha1, StrongDigest, Xxh64};
use thiserror::Error;

/// Strong checksum strategies supported by the signature generator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SignatureAlgorithm {
    /// MD4, the classic rsync block checksum.
    #[default]
    Md4,
    /// MD5.
    Md5,
    /// SHA-1.
    Sha1,
    /// XXH64 with an explicit seed.
    Xxh64 {
        /// Seed applied to the XXH64 instance.
        seed: u64,
    },
}

/// Error returned when an algorithm name or identifier is not recognised.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unsupported strong checksum algorithm '{name}' (expected md4, md5, sha1 or xxh64)")]
pub struct UnknownAlgorithm {
    name: String,
}

impl UnknownAlgorithm {
    /// Returns the rejected name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl SignatureAlgorithm {
    /// Returns the full digest width produced by the algorithm in bytes.
    #[inline]
    #[must_use]
    pub const fn digest_len(self) -> usize {
        match self {
            Self::Md4 => Md4::DIGEST_LEN,
            Self::Md5 => Md5::DIGEST_LEN,
            Self::Sha1 => Sha1::DIGEST_LEN,
            Self::Xxh64 { .. } => Xxh64::DIGEST_LEN,
        }
    }

    /// Canonical lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Md4 => "md4",
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Xxh64 { .. } => "xxh64",
        }
    }

    /// Identifier used in the signature stream header.
    #[must_use]
    pub const fn wire_id(self) -> u8 {
        match self {
            Self::Md4 => 1,
            Self::Md5 => 2,
            Self::Sha1 => 3,
            Self::Xxh64 { .. } => 4,
        }
    }

    /// Inverse of [`wire_id`](Self::wire_id). `seed` only matters for seeded algorithms.
    #[must_use]
    pub const fn from_wire_id(id: u8, seed: u64) -> Option<Self> {
        match id {
            1 => Some(Self::Md4),
            2 => Some(Self::Md5),
            3 => Some(Self::Sha1),
            4 => Some(Self::Xxh64 { seed }),
            _ => None,
        }
    }

    /// Seed carried by the algorithm, zero for unseeded ones.
    #[must_use]
    pub const fn seed(self) -> u64 {
        match self {
            Self::Xxh64 { seed } => seed,
            Self::Md4 | Self::Md5 | Self::Sha1 => 0,
        }
    }

    /// Returns the same algorithm with `seed` applied where it has one.
    #[must_use]
    pub const fn with_seed(self, seed: u64) -> Self {
        match self {
            Self::Xxh64 { .. } => Self::Xxh64 { seed },
            other => other,
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md4" => Ok(Self::Md4),
            "md5" => Ok(Self::Md5),
            "sha1" | "sha-1" => Ok(Self::Sha1),
            "xxh64" | "xxhash" => Ok(Self::Xxh64 { seed: 0 }),
            _ => Err(UnknownAlgorithm { name: s.to_owned() }),
        }
    }
}
