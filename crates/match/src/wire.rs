//! crates/match/src/wire.rs
//!
//! Delta stream encoding.
//!
//! Layout (all integers big-endian):
//!
//! ```text
//! magic      4  "RDDL"
//! version    1
//! records    tag 1 = Copy    old u64, new u64, len u32
//!            tag 2 = Literal offset u64, len u32, data[len]
//! end        tag 0, target length u64
//! ```
//!
//! The target length trails the records so a [`DeltaWriter`] can encode
//! deltas as a [`StreamMatcher`](crate::StreamMatcher) emits them.

use std::io::{self, Read, Write};

use thiserror::Error;

use crate::script::{Delta, DeltaScript, TilingError};

/// Magic bytes opening a delta stream.
pub const DELTA_MAGIC: [u8; 4] = *b"RDDL";
/// Current delta stream version.
pub const DELTA_VERSION: u8 = 1;

const TAG_END: u8 = 0;
const TAG_COPY: u8 = 1;
const TAG_LITERAL: u8 = 2;

/// Errors raised while decoding a delta stream.
#[derive(Debug, Error)]
pub enum DeltaFormatError {
    /// Reading the stream failed, including truncated input.
    #[error("delta stream I/O failed: {0}")]
    Io(#[from] io::Error),
    /// The stream does not start with [`DELTA_MAGIC`].
    #[error("not a delta stream (magic {0:02x?})")]
    BadMagic([u8; 4]),
    /// The stream was written by an unsupported format version.
    #[error("unsupported delta stream version {0}")]
    UnsupportedVersion(u8),
    /// A record carries an unknown tag.
    #[error("unknown delta record tag {0}")]
    UnknownTag(u8),
    /// The decoded deltas do not tile the declared target length.
    #[error("malformed delta stream: {0}")]
    Tiling(#[from] TilingError),
}

/// Incremental delta stream encoder.
#[derive(Debug)]
pub struct DeltaWriter<W: Write> {
    writer: W,
    records: u64,
}

impl<W: Write> DeltaWriter<W> {
    /// Writes the stream header and returns the encoder.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `writer`.
    pub fn new(mut writer: W) -> io::Result<Self> {
        writer.write_all(&DELTA_MAGIC)?;
        writer.write_all(&[DELTA_VERSION])?;
        Ok(Self { writer, records: 0 })
    }

    /// Appends one delta record.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors. A literal longer than `u32::MAX` bytes is
    /// rejected with [`io::ErrorKind::InvalidInput`].
    pub fn write_delta(&mut self, delta: &Delta) -> io::Result<()> {
        match delta {
            Delta::Copy {
                old_offset,
                new_offset,
                len,
            } => {
                self.writer.write_all(&[TAG_COPY])?;
                self.writer.write_all(&old_offset.to_be_bytes())?;
                self.writer.write_all(&new_offset.to_be_bytes())?;
                self.writer.write_all(&len.to_be_bytes())?;
            }
            Delta::Literal { offset, data } => {
                let len = u32::try_from(data.len()).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidInput, "literal longer than 4 GiB")
                })?;
                self.writer.write_all(&[TAG_LITERAL])?;
                self.writer.write_all(&offset.to_be_bytes())?;
                self.writer.write_all(&len.to_be_bytes())?;
                self.writer.write_all(data)?;
            }
        }
        self.records += 1;
        Ok(())
    }

    /// Number of records written so far.
    #[must_use]
    pub const fn records(&self) -> u64 {
        self.records
    }

    /// Writes the end record and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors.
    pub fn finish(mut self, target_len: u64) -> io::Result<W> {
        self.writer.write_all(&[TAG_END])?;
        self.writer.write_all(&target_len.to_be_bytes())?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Encodes a whole script.
///
/// # Errors
///
/// See [`DeltaWriter::write_delta`].
pub fn write_delta_script<W: Write>(writer: W, script: &DeltaScript) -> io::Result<()> {
    let mut encoder = DeltaWriter::new(writer)?;
    for delta in script.deltas() {
        encoder.write_delta(delta)?;
    }
    encoder.finish(script.total_bytes())?;
    Ok(())
}

/// A decoded delta stream.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodedDelta {
    /// Deltas in stream order.
    pub script: DeltaScript,
    /// Target length declared by the end record.
    pub target_len: u64,
}

/// Decodes a delta stream and checks that it tiles its target.
///
/// # Errors
///
/// Returns [`DeltaFormatError`] for malformed or truncated input.
pub fn read_delta_script<R: Read>(mut reader: R) -> Result<DecodedDelta, DeltaFormatError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != DELTA_MAGIC {
        return Err(DeltaFormatError::BadMagic(magic));
    }
    let [version] = read_array::<_, 1>(&mut reader)?;
    if version != DELTA_VERSION {
        return Err(DeltaFormatError::UnsupportedVersion(version));
    }

    let mut deltas = Vec::new();
    let target_len = loop {
        let [tag] = read_array::<_, 1>(&mut reader)?;
        match tag {
            TAG_END => break u64::from_be_bytes(read_array(&mut reader)?),
            TAG_COPY => {
                let old_offset = u64::from_be_bytes(read_array(&mut reader)?);
                let new_offset = u64::from_be_bytes(read_array(&mut reader)?);
                let len = u32::from_be_bytes(read_array(&mut reader)?);
                deltas.push(Delta::Copy {
                    old_offset,
                    new_offset,
                    len,
                });
            }
            TAG_LITERAL => {
                let offset = u64::from_be_bytes(read_array(&mut reader)?);
                let len = u32::from_be_bytes(read_array(&mut reader)?);
                let mut data = Vec::new();
                let read = (&mut reader).take(u64::from(len)).read_to_end(&mut data)?;
                if read != len as usize {
                    return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
                }
                deltas.push(Delta::Literal { offset, data });
            }
            other => return Err(DeltaFormatError::UnknownTag(other)),
        }
    };

    let script = DeltaScript::from_deltas(deltas);
    script.validate_tiling(target_len)?;
    Ok(DecodedDelta { script, target_len })
}

fn read_array<R: Read, const N: usize>(reader: &mut R) -> io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DeltaScript {
        DeltaScript::from_deltas(vec![
            Delta::Literal {
                offset: 0,
                data: b"new".to_vec(),
            },
            Delta::Copy {
                old_offset: 100,
                new_offset: 3,
                len: 700,
            },
        ])
    }

    fn encode(script: &DeltaScript) -> Vec<u8> {
        let mut out = Vec::new();
        write_delta_script(&mut out, script).expect("encode");
        out
    }

    #[test]
    fn decodes_what_was_encoded() {
        let decoded = read_delta_script(encode(&sample()).as_slice()).expect("decode");
        assert_eq!(decoded.script, sample());
        assert_eq!(decoded.target_len, 703);
    }

    #[test]
    fn record_layout() {
        let bytes = encode(&sample());
        assert_eq!(&bytes[..5], b"RDDL\x01");
        assert_eq!(bytes[5], TAG_LITERAL);
        assert_eq!(&bytes[14..18], &3u32.to_be_bytes());
        assert_eq!(&bytes[18..21], b"new");
        assert_eq!(bytes[21], TAG_COPY);
        assert_eq!(bytes.len(), 5 + (1 + 8 + 4 + 3) + (1 + 8 + 8 + 4) + (1 + 8));
    }

    #[test]
    fn empty_script_encodes_zero_length_target() {
        let decoded = read_delta_script(encode(&DeltaScript::new()).as_slice()).expect("decode");
        assert!(decoded.script.is_empty());
        assert_eq!(decoded.target_len, 0);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let mut bytes = encode(&sample());
        bytes[5] = 9;
        let err = read_delta_script(bytes.as_slice()).expect_err("bad tag");
        assert!(matches!(err, DeltaFormatError::UnknownTag(9)));
    }

    #[test]
    fn bad_header_is_rejected() {
        let err = read_delta_script(&b"RDSG\x01"[..]).expect_err("bad magic");
        assert!(matches!(err, DeltaFormatError::BadMagic(_)));
        let err = read_delta_script(&b"RDDL\x07"[..]).expect_err("bad version");
        assert!(matches!(err, DeltaFormatError::UnsupportedVersion(7)));
    }

    #[test]
    fn truncated_literal_is_an_io_error() {
        let bytes = encode(&sample());
        let err = read_delta_script(&bytes[..20]).expect_err("truncated");
        assert!(
            matches!(err, DeltaFormatError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof)
        );
    }

    #[test]
    fn overlapping_records_are_rejected() {
        let mut out = Vec::new();
        let mut writer = DeltaWriter::new(&mut out).expect("header");
        for offset in [0, 1] {
            writer
                .write_delta(&Delta::Literal {
                    offset,
                    data: b"ab".to_vec(),
                })
                .expect("record");
        }
        assert_eq!(writer.records(), 2);
        writer.finish(3).expect("finish");
        let err = read_delta_script(out.as_slice()).expect_err("overlap");
        assert!(matches!(
            err,
            DeltaFormatError::Tiling(TilingError::Overlap { .. })
        ));
    }
}
