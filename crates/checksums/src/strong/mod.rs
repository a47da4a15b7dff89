//! Strong checksums that confirm weak rolling-checksum hits.
//!
//! Each algorithm implements [`StrongDigest`], a streaming interface with
//! `update`/`finalize` and a fixed output width. Hashers are [`Clone`], so a
//! partially fed state can be forked and finished independently; block
//! hashing relies on this to reuse a seeded template.

mod md4;
mod md5;
mod sha1;
mod xxhash;

pub use md4::Md4;
pub use md5::Md5;
pub use sha1::Sha1;
pub use xxhash::Xxh64;

/// Streaming digest with a fixed output width.
pub trait StrongDigest: Clone {
    /// Initialisation parameter (e.g. the XXH64 seed). `()` for unseeded algorithms.
    type Seed: Default;
    /// Finalised digest type.
    type Digest: AsRef<[u8]> + Copy + Eq + std::fmt::Debug;
    /// Width of [`Self::Digest`] in bytes.
    const DIGEST_LEN: usize;

    /// Creates a hasher with the default seed.
    fn new() -> Self {
        Self::with_seed(Self::Seed::default())
    }

    /// Creates a hasher initialised with `seed`.
    fn with_seed(seed: Self::Seed) -> Self;

    /// Feeds bytes into the state.
    fn update(&mut self, data: &[u8]);

    /// Consumes the hasher and returns the digest.
    fn finalize(self) -> Self::Digest;

    /// One-shot digest of `data` with the default seed.
    fn digest(data: &[u8]) -> Self::Digest {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn md4_known_vectors() {
        assert_eq!(hex(&Md4::digest(b"")), "31d6cfe0d16ae931b73c59d7e0c089c0");
        assert_eq!(hex(&Md4::digest(b"abc")), "a448017aaf21d8525fc10ae87aa6729d");
    }

    #[test]
    fn md5_known_vectors() {
        assert_eq!(hex(&Md5::digest(b"")), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(hex(&Md5::digest(b"abc")), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn sha1_known_vectors() {
        assert_eq!(
            hex(&Sha1::digest(b"abc")),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn xxh64_known_vector() {
        assert_eq!(
            u64::from_le_bytes(<Xxh64 as StrongDigest>::digest(b"")),
            0xef46db3751d8e999
        );
    }

    fn cloned_state_finishes_independently<D: StrongDigest>() {
        let mut prefix = D::new();
        prefix.update(b"shared prefix ");
        let mut left = prefix.clone();
        let mut right = prefix;
        left.update(b"left");
        right.update(b"right");
        assert_eq!(left.finalize(), D::digest(b"shared prefix left"));
        assert_eq!(right.finalize(), D::digest(b"shared prefix right"));
    }

    #[test]
    fn clones_fork_state() {
        cloned_state_finishes_independently::<Md4>();
        cloned_state_finishes_independently::<Md5>();
        cloned_state_finishes_independently::<Sha1>();
        cloned_state_finishes_independently::<Xxh64>();
    }

    #[test]
    fn digest_len_matches_output() {
        assert_eq!(Md4::digest(b"x").len(), Md4::DIGEST_LEN);
        assert_eq!(Md5::digest(b"x").len(), Md5::DIGEST_LEN);
        assert_eq!(Sha1::digest(b"x").len(), Sha1::DIGEST_LEN);
        assert_eq!(<Xxh64 as StrongDigest>::digest(b"x").len(), Xxh64::DIGEST_LEN);
    }
}
