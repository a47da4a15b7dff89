use super::digest::RollingDigest;
use super::error::RollingError;

/// Bias added to every byte before it enters the sums.
///
/// Without it a block of zero bytes would produce a zero checksum regardless
/// of its length.
pub const CHAR_OFFSET: u32 = 31;

/// Rolling checksum used for weak block matching.
///
/// `s1` accumulates the biased byte sum and `s2` the sum of its running
/// prefix sums, both truncated to 16 bits after every update. The checksum
/// does not store the window bytes; callers that slide a window supply the
/// outgoing byte themselves (see [`RollingWindow`](crate::RollingWindow) for a
/// variant that keeps them).
///
/// Two checksums are equal when their sums are; the window length is not
/// compared, matching [`RollingDigest`].
#[doc(alias = "rsum")]
#[derive(Clone, Debug, Default)]
pub struct RollingChecksum {
    s1: u32,
    s2: u32,
    len: usize,
}

impl PartialEq for RollingChecksum {
    fn eq(&self, other: &Self) -> bool {
        self.s1 == other.s1 && self.s2 == other.s2
    }
}

impl Eq for RollingChecksum {}

impl RollingChecksum {
    /// Creates a new rolling checksum with zeroed state.
    ///
    /// # Examples
    ///
    /// ```
    /// use checksums::RollingChecksum;
    ///
    /// let checksum = RollingChecksum::new();
    /// assert!(checksum.is_empty());
    /// assert_eq!(checksum.len(), 0);
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self {
            s1: 0,
            s2: 0,
            len: 0,
        }
    }

    /// Resets the checksum back to its initial state.
    pub const fn reset(&mut self) {
        self.s1 = 0;
        self.s2 = 0;
        self.len = 0;
    }

    /// Returns the number of bytes in the current window.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the window is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Extends the window with an additional slice of bytes.
    pub fn update(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }

        let mut s1 = self.s1;
        let mut s2 = self.s2;

        let mut iter = chunk.chunks_exact(4);
        for block in &mut iter {
            s1 = s1.wrapping_add(u32::from(block[0]) + CHAR_OFFSET);
            s2 = s2.wrapping_add(s1);

            s1 = s1.wrapping_add(u32::from(block[1]) + CHAR_OFFSET);
            s2 = s2.wrapping_add(s1);

            s1 = s1.wrapping_add(u32::from(block[2]) + CHAR_OFFSET);
            s2 = s2.wrapping_add(s1);

            s1 = s1.wrapping_add(u32::from(block[3]) + CHAR_OFFSET);
            s2 = s2.wrapping_add(s1);
        }

        for &byte in iter.remainder() {
            s1 = s1.wrapping_add(u32::from(byte) + CHAR_OFFSET);
            s2 = s2.wrapping_add(s1);
        }

        self.s1 = s1 & 0xffff;
        self.s2 = s2 & 0xffff;
        self.len = self.len.saturating_add(chunk.len());
    }

    /// Recomputes the state from scratch for a fresh block.
    ///
    /// This is how a window is (re)anchored, for example right after a block
    /// matched and the scan skips past it.
    pub fn update_from_block(&mut self, block: &[u8]) {
        self.reset();
        self.update(block);
    }

    /// Slides the window by one byte, removing `outgoing` and appending `incoming`.
    ///
    /// # Examples
    ///
    /// ```
    /// use checksums::RollingChecksum;
    ///
    /// let data = b"ABCD";
    /// let mut rolling = RollingChecksum::new();
    /// rolling.update(&data[0..3]); // "ABC"
    ///
    /// rolling.roll(data[0], data[3]).unwrap();
    ///
    /// let mut fresh = RollingChecksum::new();
    /// fresh.update(&data[1..4]); // "BCD"
    /// assert_eq!(rolling.value(), fresh.value());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`RollingError::EmptyWindow`] if no bytes have been processed.
    #[inline]
    pub fn roll(&mut self, outgoing: u8, incoming: u8) -> Result<(), RollingError> {
        let window_len = self.window_len_u32()?;

        let out = u32::from(outgoing) + CHAR_OFFSET;
        let inn = u32::from(incoming) + CHAR_OFFSET;

        let new_s1 = self.s1.wrapping_sub(out).wrapping_add(inn) & 0xffff;
        let new_s2 = self
            .s2
            .wrapping_sub(window_len.wrapping_mul(out))
            .wrapping_add(new_s1)
            & 0xffff;

        self.s1 = new_s1;
        self.s2 = new_s2;
        Ok(())
    }

    /// Shrinks the window by one byte from the left without adding a new one.
    ///
    /// Used at the end of the data, when fewer than a block's worth of bytes
    /// remain and the window can only contract.
    ///
    /// # Errors
    ///
    /// Returns [`RollingError::EmptyWindow`] if the window is already empty.
    #[inline]
    pub fn trim(&mut self, outgoing: u8) -> Result<(), RollingError> {
        let window_len = self.window_len_u32()?;
        let out = u32::from(outgoing) + CHAR_OFFSET;

        self.s1 = self.s1.wrapping_sub(out) & 0xffff;
        self.s2 = self.s2.wrapping_sub(window_len.wrapping_mul(out)) & 0xffff;
        self.len -= 1;
        Ok(())
    }

    #[inline]
    fn window_len_u32(&self) -> Result<u32, RollingError> {
        if self.len == 0 {
            return Err(RollingError::EmptyWindow);
        }

        u32::try_from(self.len).map_err(|_| RollingError::WindowTooLarge {
            len: self.len,
            limit: u32::MAX as usize,
        })
    }

    /// Returns the checksum in its packed 32-bit representation, `(s2 << 16) | s1`.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> u32 {
        (self.s2 << 16) | self.s1
    }

    /// Returns the current state as a structured digest.
    #[inline]
    #[must_use]
    pub const fn digest(&self) -> RollingDigest {
        RollingDigest::new(self.s1 as u16, self.s2 as u16, self.len)
    }

    #[cfg(test)]
    pub(crate) const fn force_state(&mut self, s1: u32, s2: u32, len: usize) {
        self.s1 = s1;
        self.s2 = s2;
        self.len = len;
    }
}

impl From<&RollingChecksum> for RollingDigest {
    fn from(checksum: &RollingChecksum) -> Self {
        checksum.digest()
    }
}
