//! crates/cli/src/error.rs
//!
//! Failures surfaced by the front-end and the exit status each maps to.

use std::io;
use std::path::{Path, PathBuf};

use engine::RebuildError;
use matching::StreamError;
use matching::wire::DeltaFormatError;
use signature::wire::SignatureFormatError;
use signature::{SignatureError, UnknownAlgorithm};
use thiserror::Error;

/// Exit status for syntax or usage errors.
pub const EXIT_SYNTAX: i32 = 1;
/// Exit status for errors in file I/O.
pub const EXIT_FILE_IO: i32 = 11;
/// Exit status for malformed signature or delta streams.
pub const EXIT_STREAM_FORMAT: i32 = 12;

/// Error produced while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The command line could not be parsed.
    #[error("{0}")]
    Usage(String),
    /// `--checksum` names an unsupported algorithm.
    #[error(transparent)]
    Algorithm(#[from] UnknownAlgorithm),
    /// Opening, reading or writing a named file failed.
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        /// What was being attempted.
        action: &'static str,
        /// File involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// Signature options were rejected or the basis could not be read.
    #[error(transparent)]
    Signature(#[from] SignatureError),
    /// A signature file is malformed.
    #[error("{}: {source}", .path.display())]
    SignatureFormat {
        /// Signature file.
        path: PathBuf,
        /// Decoder failure.
        #[source]
        source: SignatureFormatError,
    },
    /// A delta file is malformed.
    #[error("{}: {source}", .path.display())]
    DeltaFormat {
        /// Delta file.
        path: PathBuf,
        /// Decoder failure.
        #[source]
        source: DeltaFormatError,
    },
    /// Matching the target failed or the delta could not be written.
    #[error(transparent)]
    Stream(#[from] StreamError),
    /// Reconstruction failed.
    #[error(transparent)]
    Rebuild(#[from] RebuildError),
}

impl CliError {
    /// Builds a closure wrapping an I/O error with its file and action.
    pub(crate) fn io<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> Self + 'a {
        move |source| Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Exit status reported for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) | Self::Algorithm(_) => EXIT_SYNTAX,
            Self::Io { .. } | Self::Stream(_) | Self::Signature(SignatureError::Io(_)) => {
                EXIT_FILE_IO
            }
            Self::Signature(_) => EXIT_SYNTAX,
            Self::SignatureFormat { .. } | Self::DeltaFormat { .. } => EXIT_STREAM_FORMAT,
            Self::Rebuild(error) => match error {
                RebuildError::Io(_) => EXIT_FILE_IO,
                RebuildError::SamePath { .. } | RebuildError::CopyWithoutBasis { .. } => {
                    EXIT_SYNTAX
                }
                RebuildError::CopyOutOfRange { .. }
                | RebuildError::LengthOverflow { .. }
                | RebuildError::Tiling(_) => EXIT_STREAM_FORMAT,
            },
        }
    }
}
