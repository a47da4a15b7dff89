//! crates/signature/src/block.rs
//!
//! Individual signature block representation.

use checksums::RollingDigest;

/// Checksums describing one block of the basis.
///
/// Created once per block during signature generation and immutable
/// afterwards. `seq` is the zero-based block index and `offset` the block's
/// byte position in the basis.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChecksumPair {
    rolling: RollingDigest,
    strong: Vec<u8>,
    offset: u64,
    seq: u32,
}

impl ChecksumPair {
    pub(crate) const fn new(rolling: RollingDigest, strong: Vec<u8>, offset: u64, seq: u32) -> Self {
        Self {
            rolling,
            strong,
            offset,
            seq,
        }
    }

    /// Creates a block descriptor from raw components (for stream decoding).
    ///
    /// The block length is taken from `rolling`.
    #[must_use]
    pub const fn from_raw_parts(
        rolling: RollingDigest,
        strong: Vec<u8>,
        offset: u64,
        seq: u32,
    ) -> Self {
        Self::new(rolling, strong, offset, seq)
    }

    /// Returns the packed 32-bit weak checksum.
    #[inline]
    #[must_use]
    pub const fn weak(&self) -> u32 {
        self.rolling.value()
    }

    /// Returns the rolling checksum digest associated with the block.
    #[inline]
    #[must_use]
    pub const fn rolling(&self) -> RollingDigest {
        self.rolling
    }

    /// Returns the (possibly truncated) strong checksum bytes.
    #[inline]
    #[must_use]
    pub fn strong(&self) -> &[u8] {
        &self.strong
    }

    /// Returns the byte position of the block in the basis.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the block length in bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.rolling.len() as u32
    }

    /// Reports whether the block covers no bytes.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rolling.is_empty()
    }

    /// Returns the zero-based block index.
    #[inline]
    #[must_use]
    pub const fn seq(&self) -> u32 {
        self.seq
    }
}
