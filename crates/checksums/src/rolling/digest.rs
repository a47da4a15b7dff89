use std::hash::{Hash, Hasher};

use super::checksum::RollingChecksum;

/// Digest produced by the rolling checksum.
///
/// Two digests compare equal when their sums match; the window length is
/// carried along for bookkeeping but does not take part in equality, since
/// a weak hit is only ever a candidate that the strong sum must confirm.
#[derive(Clone, Copy, Debug)]
pub struct RollingDigest {
    s1: u16,
    s2: u16,
    len: usize,
}

impl RollingDigest {
    /// Creates a digest from individual components.
    #[must_use]
    pub const fn new(sum1: u16, sum2: u16, len: usize) -> Self {
        Self {
            s1: sum1,
            s2: sum2,
            len,
        }
    }

    /// Computes the digest of `data` in one pass.
    ///
    /// # Examples
    ///
    /// ```
    /// use checksums::{RollingChecksum, RollingDigest};
    ///
    /// let mut checksum = RollingChecksum::new();
    /// checksum.update(b"block");
    /// assert_eq!(RollingDigest::from_bytes(b"block"), checksum.digest());
    /// ```
    #[must_use]
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut checksum = RollingChecksum::new();
        checksum.update(data);
        checksum.digest()
    }

    /// Rebuilds a digest from its packed 32-bit value.
    #[must_use]
    pub const fn from_value(value: u32, len: usize) -> Self {
        Self::new(value as u16, (value >> 16) as u16, len)
    }

    /// Returns the first checksum component (sum of bytes).
    #[must_use]
    pub const fn sum1(&self) -> u16 {
        self.s1
    }

    /// Returns the second checksum component (sum of prefix sums).
    #[must_use]
    pub const fn sum2(&self) -> u16 {
        self.s2
    }

    /// Returns the number of bytes that contributed to the digest.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when no bytes contributed to the digest.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the checksum in its packed 32-bit representation.
    #[must_use]
    pub const fn value(&self) -> u32 {
        ((self.s2 as u32) << 16) | (self.s1 as u32)
    }
}

impl PartialEq for RollingDigest {
    fn eq(&self, other: &Self) -> bool {
        self.s1 == other.s1 && self.s2 == other.s2
    }
}

impl Eq for RollingDigest {}

impl Hash for RollingDigest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value().hash(state);
    }
}

impl From<RollingDigest> for u32 {
    fn from(digest: RollingDigest) -> Self {
        digest.value()
    }
}
