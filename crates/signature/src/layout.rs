//! crates/signature/src/layout.rs
//!
//! Block sizing heuristics following rsync's `sum_sizes_sqroot()`.

use core::num::NonZeroU32;

use thiserror::Error;

/// Default block length used when files are small.
pub const DEFAULT_BLOCK_LENGTH: u32 = 700;
/// Largest block length the heuristic or a caller may select.
pub const MAX_BLOCK_LENGTH: u32 = 1 << 17;

/// Describes how a basis of a given length is split into blocks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SignatureLayout {
    block_length: NonZeroU32,
    remainder: u32,
    block_count: u64,
}

impl SignatureLayout {
    /// Creates a layout from raw components (for stream decoding).
    #[must_use]
    pub const fn from_raw_parts(block_length: NonZeroU32, remainder: u32, block_count: u64) -> Self {
        Self {
            block_length,
            remainder,
            block_count,
        }
    }

    /// Splits `file_length` bytes into blocks of `block_length`.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureLayoutError::BlockCountOverflow`] when the block
    /// count does not fit in the `u32` sequence numbers.
    pub fn for_length(
        file_length: u64,
        block_length: NonZeroU32,
    ) -> Result<Self, SignatureLayoutError> {
        let len = u64::from(block_length.get());
        let remainder = (file_length % len) as u32;
        let block_count = file_length.div_ceil(len);
        if block_count > u64::from(u32::MAX) {
            return Err(SignatureLayoutError::BlockCountOverflow {
                block_length: block_length.get(),
                blocks: block_count,
            });
        }
        Ok(Self {
            block_length,
            remainder,
            block_count,
        })
    }

    /// Returns the block length in bytes.
    #[inline]
    #[must_use]
    pub const fn block_length(self) -> NonZeroU32 {
        self.block_length
    }

    /// Returns the trailing byte count that does not fill a complete block.
    #[inline]
    #[must_use]
    pub const fn remainder(self) -> u32 {
        self.remainder
    }

    /// Returns the number of blocks in the layout.
    #[inline]
    #[must_use]
    pub const fn block_count(self) -> u64 {
        self.block_count
    }

    /// Length of block `index`, or `None` past the end.
    #[must_use]
    pub fn block_len_at(self, index: u64) -> Option<u32> {
        if index >= self.block_count {
            return None;
        }
        if index + 1 == self.block_count && self.remainder != 0 {
            Some(self.remainder)
        } else {
            Some(self.block_length.get())
        }
    }
}

/// Errors produced when calculating signature layouts.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum SignatureLayoutError {
    /// Requested block length is zero or above [`MAX_BLOCK_LENGTH`].
    #[error("block length {0} is outside the supported range 1..=131072")]
    InvalidBlockLength(u32),
    /// Number of blocks exceeded [`u32::MAX`].
    #[error("block count {blocks} derived from block length {block_length} exceeds u32::MAX")]
    BlockCountOverflow {
        /// Block length that triggered the overflow.
        block_length: u32,
        /// Block count produced by the sizing heuristic.
        blocks: u64,
    },
}

/// Calculates the signature layout for a file.
///
/// A forced block length is validated and used as is; otherwise the length
/// is derived from the file size: [`DEFAULT_BLOCK_LENGTH`] for files up to
/// `700²` bytes, and roughly `√len` (rounded down to a multiple of eight)
/// for larger ones, capped at [`MAX_BLOCK_LENGTH`].
///
/// ```
/// use signature::calculate_signature_layout;
///
/// let layout = calculate_signature_layout(100, None).unwrap();
/// assert_eq!(layout.block_length().get(), 700);
/// assert_eq!(layout.block_count(), 1);
///
/// let layout = calculate_signature_layout(1 << 30, None).unwrap();
/// assert_eq!(layout.block_length().get(), 32768);
/// ```
#[doc(alias = "--block-size")]
#[doc(alias = "sum_sizes_sqroot")]
pub fn calculate_signature_layout(
    file_length: u64,
    forced_block_length: Option<u32>,
) -> Result<SignatureLayout, SignatureLayoutError> {
    let block_length = match forced_block_length {
        Some(length) if length > MAX_BLOCK_LENGTH => {
            return Err(SignatureLayoutError::InvalidBlockLength(length));
        }
        Some(length) => length,
        None => derive_block_length(file_length),
    };
    let block_length =
        NonZeroU32::new(block_length).ok_or(SignatureLayoutError::InvalidBlockLength(0))?;
    SignatureLayout::for_length(file_length, block_length)
}

fn derive_block_length(file_length: u64) -> u32 {
    if file_length <= u64::from(DEFAULT_BLOCK_LENGTH) * u64::from(DEFAULT_BLOCK_LENGTH) {
        return DEFAULT_BLOCK_LENGTH;
    }

    let mut c: u64 = 1;
    let mut l = file_length;
    while l >> 2 != 0 {
        c <<= 1;
        l >>= 2;
    }

    if c >= u64::from(MAX_BLOCK_LENGTH) {
        return MAX_BLOCK_LENGTH;
    }

    let mut block_length = 0u64;
    let mut current = c;
    while current >= 8 {
        block_length |= current;
        let candidate = u128::from(block_length);
        if u128::from(file_length) < candidate * candidate {
            block_length &= !current;
        }
        current >>= 1;
    }

    block_length.max(u64::from(DEFAULT_BLOCK_LENGTH)) as u32
}
