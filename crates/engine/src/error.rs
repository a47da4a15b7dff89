//! Error types for reconstruction.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use matching::TilingError;

/// Result type for rebuild operations.
pub type RebuildResult<T> = Result<T, RebuildError>;

/// Errors raised while applying deltas.
///
/// Everything except [`Io`](Self::Io) is detected before the destination is
/// opened or modified. An I/O failure part way through an in-place rebuild
/// leaves the file partially rewritten.
#[derive(Debug, Error)]
pub enum RebuildError {
    /// Reading the basis or writing the destination failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// A distinct-file rebuild named the basis as its destination.
    #[error("destination {} is the basis file; use an in-place rebuild", .path.display())]
    SamePath {
        /// The offending path.
        path: PathBuf,
    },
    /// An in-place rebuild of a missing file received a copy instruction.
    #[error("copy to offset {new_offset} requires a basis, but the destination does not exist")]
    CopyWithoutBasis {
        /// Target offset of the first copy.
        new_offset: u64,
    },
    /// A copy reads past the end of the basis.
    #[error("copy of {len} bytes from offset {old_offset} exceeds basis length {basis_len}")]
    CopyOutOfRange {
        /// Basis offset the copy reads from.
        old_offset: u64,
        /// Copy length.
        len: u32,
        /// Length of the basis.
        basis_len: u64,
    },
    /// Offsets plus lengths overflow `u64`.
    #[error("delta at offset {offset} overflows the addressable file size")]
    LengthOverflow {
        /// Write offset of the offending delta.
        offset: u64,
    },
    /// The deltas do not tile the target.
    #[error("deltas do not tile the target: {0}")]
    Tiling(#[from] TilingError),
}
