use std::num::NonZeroUsize;

use super::checksum::RollingChecksum;
use super::digest::RollingDigest;
use super::error::RollingError;
use super::ring::ByteRing;

/// A rolling checksum that keeps the bytes of its window.
///
/// Streaming callers receive input in arbitrary chunks and cannot look back
/// into earlier buffers, so the window stores the bytes it covers. Pushing
/// into a full window evicts the oldest byte and rolls the checksum; pushing
/// into a partially filled one extends it.
#[derive(Clone, Debug)]
pub struct RollingWindow {
    ring: ByteRing,
    checksum: RollingChecksum,
}

impl RollingWindow {
    /// Creates an empty window that holds at most `capacity` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RollingError::WindowTooLarge`] when `capacity` does not fit
    /// in 32 bits.
    pub fn new(capacity: NonZeroUsize) -> Result<Self, RollingError> {
        let limit = u32::MAX as usize;
        if capacity.get() > limit {
            return Err(RollingError::WindowTooLarge {
                len: capacity.get(),
                limit,
            });
        }
        Ok(Self {
            ring: ByteRing::with_capacity(capacity),
            checksum: RollingChecksum::new(),
        })
    }

    /// Maximum number of bytes the window holds.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Number of bytes currently in the window.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` when the window holds no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ring.len() == 0
    }

    /// Returns `true` when the window holds `capacity` bytes.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Re-anchors the window on `buf[off..off + len]`, discarding the previous
    /// contents and recomputing the checksum from scratch.
    ///
    /// # Errors
    ///
    /// Returns [`RollingError::WindowTooLarge`] when `len` exceeds the
    /// window's capacity.
    ///
    /// # Panics
    ///
    /// Panics if `off + len` lies outside `buf`.
    pub fn check(&mut self, buf: &[u8], off: usize, len: usize) -> Result<(), RollingError> {
        if len > self.capacity() {
            return Err(RollingError::WindowTooLarge {
                len,
                limit: self.capacity(),
            });
        }
        let bytes = &buf[off..off + len];
        self.ring.clear();
        for &byte in bytes {
            self.ring.push_back(byte);
        }
        self.checksum.update_from_block(bytes);
        Ok(())
    }

    /// Advances the window by one position: the oldest byte leaves, `next`
    /// enters and the length stays the same. Returns the byte that left.
    ///
    /// # Errors
    ///
    /// Returns [`RollingError::EmptyWindow`] when there is nothing to roll.
    pub fn roll(&mut self, next: u8) -> Result<u8, RollingError> {
        let outgoing = self.ring.pop_front().ok_or(RollingError::EmptyWindow)?;
        self.ring.push_back(next);
        self.checksum.roll(outgoing, next)?;
        Ok(outgoing)
    }

    /// Pushes `byte` into the window.
    ///
    /// Returns the evicted byte when the window was already full.
    ///
    /// # Errors
    ///
    /// Propagates [`RollingError`] from the underlying checksum.
    pub fn push(&mut self, byte: u8) -> Result<Option<u8>, RollingError> {
        match self.ring.push_back(byte) {
            Some(outgoing) => {
                self.checksum.roll(outgoing, byte)?;
                Ok(Some(outgoing))
            }
            None => {
                self.checksum.update(&[byte]);
                Ok(None)
            }
        }
    }

    /// Removes the oldest byte, shrinking the window by one.
    ///
    /// Returns `Ok(None)` when the window is already empty.
    ///
    /// # Errors
    ///
    /// Propagates [`RollingError`] from the underlying checksum.
    pub fn trim(&mut self) -> Result<Option<u8>, RollingError> {
        let Some(outgoing) = self.ring.pop_front() else {
            return Ok(None);
        };
        self.checksum.trim(outgoing)?;
        Ok(Some(outgoing))
    }

    /// Empties the window.
    pub fn clear(&mut self) {
        self.ring.clear();
        self.checksum.reset();
    }

    /// Weak checksum of the bytes currently in the window.
    #[must_use]
    pub const fn digest(&self) -> RollingDigest {
        self.checksum.digest()
    }

    /// Packed 32-bit weak checksum of the window.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.checksum.value()
    }

    /// Window contents oldest-first, split where the ring wraps.
    #[must_use]
    pub fn as_slices(&self) -> (&[u8], &[u8]) {
        self.ring.as_slices()
    }

    /// Copies the window contents oldest-first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.ring.to_vec()
    }
}
