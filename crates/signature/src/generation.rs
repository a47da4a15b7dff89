//! crates/signature/src/generation.rs
//!
//! Basis signature generation from buffers and readers.

use std::io::{self, Read};
use std::num::{NonZeroU8, NonZeroU32};

use thiserror::Error;
#[cfg(feature = "tracing")]
use tracing::instrument;

use checksums::RollingDigest;
use logging::trace_genr;

use crate::algorithm::SignatureAlgorithm;
use crate::block::ChecksumPair;
use crate::checksum_spec::ChecksumSpec;
use crate::file::Signature;
use crate::layout::{SignatureLayout, SignatureLayoutError};

/// Errors returned when generating signatures.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Underlying I/O failure raised while reading the basis.
    #[error("failed to read input while generating signature: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
    /// Requested strong checksum length exceeds what the algorithm can provide.
    #[error("requested strong checksum length {requested} exceeds {algorithm} digest width")]
    DigestLengthMismatch {
        /// Strong checksum algorithm in use.
        algorithm: SignatureAlgorithm,
        /// Number of bytes requested.
        requested: NonZeroU8,
    },
    /// Block length or block count is outside the supported range.
    #[error(transparent)]
    Layout(#[from] SignatureLayoutError),
    /// The basis holds more blocks than a `u32` sequence number can address.
    #[error("basis describes more than {0} blocks")]
    TooManyBlocks(u64),
}

/// Splits a basis into blocks and computes each block's checksums.
///
/// Generation is a pure function of the input bytes, the block length, the
/// [`ChecksumSpec`] and the base offset: running it twice over the same
/// buffer yields identical [`ChecksumPair`] sequences.
///
/// ```
/// use std::num::NonZeroU32;
/// use signature::{ChecksumSpec, SignatureAlgorithm, SignatureGenerator};
///
/// let generator = SignatureGenerator::new(
///     NonZeroU32::new(4).unwrap(),
///     ChecksumSpec::new(SignatureAlgorithm::Md5),
/// );
/// let signature = generator.generate(b"abcdefghij", 0).unwrap();
/// let lengths: Vec<u32> = signature.blocks().iter().map(|b| b.len()).collect();
/// assert_eq!(lengths, [4, 4, 2]);
/// ```
#[derive(Clone, Debug)]
pub struct SignatureGenerator {
    block_length: NonZeroU32,
    spec: ChecksumSpec,
}

impl SignatureGenerator {
    /// Creates a generator for `block_length`-sized blocks.
    #[must_use]
    pub const fn new(block_length: NonZeroU32, spec: ChecksumSpec) -> Self {
        Self { block_length, spec }
    }

    /// Returns the configured block length.
    #[must_use]
    pub const fn block_length(&self) -> NonZeroU32 {
        self.block_length
    }

    /// Returns the strong checksum configuration.
    #[must_use]
    pub const fn spec(&self) -> &ChecksumSpec {
        &self.spec
    }

    /// Generates the signature of `buf`, numbering offsets from `base_offset`.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::Layout`] when `buf` holds more blocks than a
    /// `u32` sequence number can address.
    #[cfg_attr(feature = "tracing", instrument(skip(self, buf), fields(len = buf.len(), block_length = self.block_length.get()), name = "generate_signature"))]
    pub fn generate(&self, buf: &[u8], base_offset: u64) -> Result<Signature, SignatureError> {
        let layout = SignatureLayout::for_length(buf.len() as u64, self.block_length)?;
        let block_len = self.block_length.get() as usize;

        let blocks: Vec<ChecksumPair> = buf
            .chunks(block_len)
            .enumerate()
            .map(|(index, chunk)| {
                let offset = base_offset + (index * block_len) as u64;
                checksum_block(&self.spec, chunk, offset, index as u32)
            })
            .collect();

        trace_genr!(
            blocks = blocks.len(),
            block_length = block_len,
            "generated signature for {} bytes",
            buf.len()
        );
        Ok(Signature::new(layout, self.spec.clone(), blocks, buf.len() as u64))
    }

    /// Generates a signature by reading `reader` to its end.
    ///
    /// Only one block is buffered at a time, so the basis never needs to fit
    /// in memory.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the reader and reports
    /// [`SignatureError::TooManyBlocks`] when the input is too long.
    #[cfg_attr(feature = "tracing", instrument(skip(self, reader), fields(block_length = self.block_length.get()), name = "generate_signature_reader"))]
    pub fn generate_reader<R: Read>(&self, mut reader: R) -> Result<Signature, SignatureError> {
        let block_len = self.block_length.get() as usize;
        let mut buffer = vec![0u8; block_len];
        let mut blocks = Vec::new();
        let mut total_bytes: u64 = 0;

        loop {
            let filled = read_block(&mut reader, &mut buffer)?;
            if filled == 0 {
                break;
            }
            let seq = u32::try_from(blocks.len())
                .map_err(|_| SignatureError::TooManyBlocks(u64::from(u32::MAX)))?;
            blocks.push(checksum_block(
                &self.spec,
                &buffer[..filled],
                total_bytes,
                seq,
            ));
            total_bytes += filled as u64;
            if filled < block_len {
                break;
            }
        }

        trace_genr!(
            blocks = blocks.len(),
            block_length = block_len,
            "generated signature for {} streamed bytes",
            total_bytes
        );
        let layout = SignatureLayout::for_length(total_bytes, self.block_length)?;
        Ok(Signature::new(layout, self.spec.clone(), blocks, total_bytes))
    }
}

/// Generates the signature of `buf` (see [`SignatureGenerator::generate`]).
///
/// # Errors
///
/// See [`SignatureGenerator::generate`].
pub fn generate_signature(
    buf: &[u8],
    block_length: NonZeroU32,
    spec: &ChecksumSpec,
    base_offset: u64,
) -> Result<Signature, SignatureError> {
    SignatureGenerator::new(block_length, spec.clone()).generate(buf, base_offset)
}

/// Generates the signature of everything `reader` yields.
///
/// # Errors
///
/// See [`SignatureGenerator::generate_reader`].
pub fn generate_file_signature<R: Read>(
    reader: R,
    block_length: NonZeroU32,
    spec: &ChecksumSpec,
) -> Result<Signature, SignatureError> {
    SignatureGenerator::new(block_length, spec.clone()).generate_reader(reader)
}

pub(crate) fn checksum_block(
    spec: &ChecksumSpec,
    chunk: &[u8],
    offset: u64,
    seq: u32,
) -> ChecksumPair {
    let rolling = RollingDigest::from_bytes(chunk);
    let strong = spec.strong_sum(chunk);
    trace_genr!(trace: seq, offset, weak = rolling.value(), "block checksum");
    ChecksumPair::new(rolling, strong, offset, seq)
}

/// Fills `buffer` from `reader`, stopping early only at end of input.
fn read_block<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}
