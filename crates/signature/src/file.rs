//! crates/signature/src/file.rs
//!
//! Aggregated basis signature container.

use crate::block::ChecksumPair;
use crate::checksum_spec::ChecksumSpec;
use crate::layout::SignatureLayout;

/// Ordered block checksums describing a basis.
///
/// Block lengths sum to [`total_bytes`](Self::total_bytes), offsets strictly
/// increase, and every block except possibly the last is exactly
/// `layout().block_length()` bytes long. The [`ChecksumSpec`] used to
/// compute the strong sums travels with the signature so the matcher hashes
/// target windows identically.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Signature {
    layout: SignatureLayout,
    spec: ChecksumSpec,
    blocks: Vec<ChecksumPair>,
    total_bytes: u64,
}

impl Signature {
    pub(crate) const fn new(
        layout: SignatureLayout,
        spec: ChecksumSpec,
        blocks: Vec<ChecksumPair>,
        total_bytes: u64,
    ) -> Self {
        Self {
            layout,
            spec,
            blocks,
            total_bytes,
        }
    }

    /// Creates a signature from raw components (for stream decoding).
    #[must_use]
    pub const fn from_raw_parts(
        layout: SignatureLayout,
        spec: ChecksumSpec,
        blocks: Vec<ChecksumPair>,
        total_bytes: u64,
    ) -> Self {
        Self::new(layout, spec, blocks, total_bytes)
    }

    /// Returns the layout used to generate the signature.
    #[inline]
    #[must_use]
    pub const fn layout(&self) -> SignatureLayout {
        self.layout
    }

    /// Returns the block length the basis was split with.
    #[inline]
    #[must_use]
    pub const fn block_length(&self) -> u32 {
        self.layout.block_length().get()
    }

    /// Returns the strong checksum configuration.
    #[inline]
    #[must_use]
    pub const fn spec(&self) -> &ChecksumSpec {
        &self.spec
    }

    /// Returns the block entries in generation order.
    #[inline]
    #[must_use]
    pub fn blocks(&self) -> &[ChecksumPair] {
        &self.blocks
    }

    /// Returns the number of basis bytes covered by the signature.
    #[inline]
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Returns `true` when the signature describes an empty basis.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU32;

    #[test]
    fn from_raw_parts_exposes_components() {
        let layout = SignatureLayout::from_raw_parts(NonZeroU32::new(700).expect("non-zero"), 50, 1);
        let sig = Signature::from_raw_parts(layout, ChecksumSpec::default(), vec![], 50);
        assert_eq!(sig.layout(), layout);
        assert_eq!(sig.block_length(), 700);
        assert_eq!(sig.total_bytes(), 50);
        assert!(sig.is_empty());
        assert_eq!(sig.spec(), &ChecksumSpec::default());
    }
}
