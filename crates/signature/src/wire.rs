//! crates/signature/src/wire.rs
//!
//! Signature stream encoding.
//!
//! Layout (all integers big-endian):
//!
//! ```text
//! magic        4  "RDSG"
//! version      1
//! algorithm    1  SignatureAlgorithm::wire_id
//! hash seed    8  XXH64 seed, zero otherwise
//! block len    4
//! strong len   1
//! basis len    8
//! seed len     2
//! seed         seed len bytes
//! records      ceil(basis len / block len) x (weak u32, strong[strong len])
//! ```
//!
//! Block offsets and lengths are not stored per record; they follow from
//! the record position, the block length and the basis length.

use std::io::{self, Read, Write};
use std::num::{NonZeroU8, NonZeroU32};

use thiserror::Error;

use checksums::RollingDigest;

use crate::algorithm::SignatureAlgorithm;
use crate::block::ChecksumPair;
use crate::checksum_spec::ChecksumSpec;
use crate::file::Signature;
use crate::layout::{MAX_BLOCK_LENGTH, SignatureLayout};

/// Magic bytes opening a signature stream.
pub const SIGNATURE_MAGIC: [u8; 4] = *b"RDSG";
/// Current signature stream version.
pub const SIGNATURE_VERSION: u8 = 1;

/// Errors raised while decoding a signature stream.
#[derive(Debug, Error)]
pub enum SignatureFormatError {
    /// Reading or writing the stream failed, including truncated input.
    #[error("signature stream I/O failed: {0}")]
    Io(#[from] io::Error),
    /// The stream does not start with [`SIGNATURE_MAGIC`].
    #[error("not a signature stream (magic {0:02x?})")]
    BadMagic([u8; 4]),
    /// The stream was written by an unsupported format version.
    #[error("unsupported signature stream version {0}")]
    UnsupportedVersion(u8),
    /// The header names an unknown strong checksum algorithm.
    #[error("unknown strong checksum algorithm id {0}")]
    UnknownAlgorithm(u8),
    /// A header field is out of range.
    #[error("invalid signature header: {0}")]
    InvalidHeader(&'static str),
}

/// Writes `signature` to `writer`.
///
/// # Errors
///
/// Propagates I/O errors from the writer. A seed longer than `u16::MAX`
/// bytes is rejected with [`io::ErrorKind::InvalidInput`].
pub fn write_signature<W: Write>(mut writer: W, signature: &Signature) -> io::Result<()> {
    let spec = signature.spec();
    let seed_len = u16::try_from(spec.seed().len()).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "checksum seed longer than 65535 bytes")
    })?;

    writer.write_all(&SIGNATURE_MAGIC)?;
    writer.write_all(&[SIGNATURE_VERSION, spec.algorithm().wire_id()])?;
    writer.write_all(&spec.algorithm().seed().to_be_bytes())?;
    writer.write_all(&signature.block_length().to_be_bytes())?;
    writer.write_all(&[spec.strong_len().get()])?;
    writer.write_all(&signature.total_bytes().to_be_bytes())?;
    writer.write_all(&seed_len.to_be_bytes())?;
    writer.write_all(spec.seed())?;

    for block in signature.blocks() {
        writer.write_all(&block.weak().to_be_bytes())?;
        writer.write_all(block.strong())?;
    }
    writer.flush()
}

/// Reads a signature previously written by [`write_signature`].
///
/// # Errors
///
/// Returns [`SignatureFormatError`] for malformed headers and
/// [`SignatureFormatError::Io`] for truncated record data.
pub fn read_signature<R: Read>(mut reader: R) -> Result<Signature, SignatureFormatError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != SIGNATURE_MAGIC {
        return Err(SignatureFormatError::BadMagic(magic));
    }

    let version = read_u8(&mut reader)?;
    if version != SIGNATURE_VERSION {
        return Err(SignatureFormatError::UnsupportedVersion(version));
    }
    let algorithm_id = read_u8(&mut reader)?;
    let hash_seed = u64::from_be_bytes(read_array(&mut reader)?);
    let algorithm = SignatureAlgorithm::from_wire_id(algorithm_id, hash_seed)
        .ok_or(SignatureFormatError::UnknownAlgorithm(algorithm_id))?;

    let block_length = u32::from_be_bytes(read_array(&mut reader)?);
    let block_length = NonZeroU32::new(block_length)
        .filter(|len| len.get() <= MAX_BLOCK_LENGTH)
        .ok_or(SignatureFormatError::InvalidHeader("block length out of range"))?;
    let strong_len = NonZeroU8::new(read_u8(&mut reader)?)
        .ok_or(SignatureFormatError::InvalidHeader("zero strong checksum length"))?;
    let total_bytes = u64::from_be_bytes(read_array(&mut reader)?);
    let seed_len = u16::from_be_bytes(read_array(&mut reader)?);
    let mut seed = vec![0u8; usize::from(seed_len)];
    reader.read_exact(&mut seed)?;

    let spec = ChecksumSpec::from_raw_parts(algorithm, strong_len, seed)
        .map_err(|_| SignatureFormatError::InvalidHeader("strong length exceeds digest width"))?;
    let layout = SignatureLayout::for_length(total_bytes, block_length)
        .map_err(|_| SignatureFormatError::InvalidHeader("too many blocks"))?;

    let block_count = layout.block_count();
    let mut blocks = Vec::new();
    let mut offset = 0u64;
    for index in 0..block_count {
        let weak = u32::from_be_bytes(read_array(&mut reader)?);
        let mut strong = vec![0u8; usize::from(strong_len.get())];
        reader.read_exact(&mut strong)?;

        let len = layout.block_len_at(index).unwrap_or(0);
        let rolling = RollingDigest::from_value(weak, len as usize);
        blocks.push(ChecksumPair::from_raw_parts(rolling, strong, offset, index as u32));
        offset += u64::from(len);
    }

    Ok(Signature::from_raw_parts(layout, spec, blocks, total_bytes))
}

fn read_u8<R: Read>(reader: &mut R) -> io::Result<u8> {
    let [byte] = read_array::<R, 1>(reader)?;
    Ok(byte)
}

fn read_array<R: Read, const N: usize>(reader: &mut R) -> io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}
