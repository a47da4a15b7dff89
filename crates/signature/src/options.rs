//! crates/signature/src/options.rs
//!
//! Builder for the knobs that shape a signature.

use std::num::{NonZeroU8, NonZeroU32};

use crate::algorithm::SignatureAlgorithm;
use crate::checksum_spec::ChecksumSpec;
use crate::generation::{SignatureError, SignatureGenerator};
use crate::layout::{SignatureLayout, calculate_signature_layout};

/// Signature configuration gathered from the command line or a caller.
///
/// ```
/// use signature::{SignatureAlgorithm, SignatureOptions};
///
/// let options = SignatureOptions::new()
///     .with_block_length(Some(2048))
///     .with_algorithm(SignatureAlgorithm::Xxh64 { seed: 1 })
///     .with_checksum_seed(b"seed".to_vec());
/// let generator = options.generator(1_000_000).unwrap();
/// assert_eq!(generator.block_length().get(), 2048);
/// assert_eq!(generator.spec().seed(), b"seed");
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SignatureOptions {
    block_length: Option<u32>,
    algorithm: SignatureAlgorithm,
    strong_len: Option<NonZeroU8>,
    seed: Vec<u8>,
}

impl SignatureOptions {
    /// Creates options with a derived block length, MD4 and no seed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces the block length; `None` derives it from the basis length.
    #[must_use]
    pub fn with_block_length(mut self, block_length: Option<u32>) -> Self {
        self.block_length = block_length;
        self
    }

    /// Selects the strong checksum algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Truncates strong sums to `len` bytes; `None` keeps the full digest.
    #[must_use]
    pub fn with_strong_len(mut self, len: Option<NonZeroU8>) -> Self {
        self.strong_len = len;
        self
    }

    /// Bytes mixed into every strong sum after the block data.
    #[must_use]
    pub fn with_checksum_seed(mut self, seed: Vec<u8>) -> Self {
        self.seed = seed;
        self
    }

    /// Returns the selected algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Validates the strong checksum settings.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::DigestLengthMismatch`] when the truncation
    /// length exceeds the algorithm's digest width.
    pub fn checksum_spec(&self) -> Result<ChecksumSpec, SignatureError> {
        match self.strong_len {
            Some(len) => ChecksumSpec::from_raw_parts(self.algorithm, len, self.seed.clone()),
            None => {
                let full = ChecksumSpec::new(self.algorithm);
                ChecksumSpec::from_raw_parts(self.algorithm, full.strong_len(), self.seed.clone())
            }
        }
    }

    /// Computes the block layout for a basis of `basis_len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::Layout`] for an out-of-range block length.
    pub fn layout(&self, basis_len: u64) -> Result<SignatureLayout, SignatureError> {
        Ok(calculate_signature_layout(basis_len, self.block_length)?)
    }

    /// Validates everything and returns a generator for a basis of `basis_len` bytes.
    ///
    /// # Errors
    ///
    /// See [`checksum_spec`](Self::checksum_spec) and [`layout`](Self::layout).
    pub fn generator(&self, basis_len: u64) -> Result<SignatureGenerator, SignatureError> {
        let spec = self.checksum_spec()?;
        let block_length: NonZeroU32 = self.layout(basis_len)?.block_length();
        Ok(SignatureGenerator::new(block_length, spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{DEFAULT_BLOCK_LENGTH, SignatureLayoutError};

    #[test]
    fn defaults_derive_block_length() {
        let generator = SignatureOptions::new().generator(10).expect("generator");
        assert_eq!(generator.block_length().get(), DEFAULT_BLOCK_LENGTH);
        assert_eq!(generator.spec().algorithm(), SignatureAlgorithm::Md4);
        assert_eq!(generator.spec().strong_len().get(), 16);
    }

    #[test]
    fn zero_block_length_is_a_configuration_error() {
        let err = SignatureOptions::new()
            .with_block_length(Some(0))
            .generator(10)
            .expect_err("zero block length");
        assert!(matches!(
            err,
            SignatureError::Layout(SignatureLayoutError::InvalidBlockLength(0))
        ));
    }

    #[test]
    fn oversized_strong_len_is_rejected() {
        let err = SignatureOptions::new()
            .with_algorithm(SignatureAlgorithm::Md5)
            .with_strong_len(NonZeroU8::new(17))
            .checksum_spec()
            .expect_err("md5 is sixteen bytes");
        assert!(matches!(err, SignatureError::DigestLengthMismatch { .. }));
    }

    #[test]
    fn truncation_and_seed_reach_the_spec() {
        let spec = SignatureOptions::new()
            .with_algorithm(SignatureAlgorithm::Sha1)
            .with_strong_len(NonZeroU8::new(6))
            .with_checksum_seed(vec![1, 2, 3])
            .checksum_spec()
            .expect("spec");
        assert_eq!(spec.strong_len().get(), 6);
        assert_eq!(spec.seed(), &[1, 2, 3]);
        assert_eq!(spec.strong_sum(b"data").len(), 6);
    }
}
