#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Basis signatures for block-level delta matching.
//!
//! A [`Signature`] splits a basis into fixed-length blocks and records a
//! [`ChecksumPair`] per block: the weak rolling checksum used for cheap
//! candidate filtering and a strong sum that confirms a candidate.
//!
//! - [`SignatureGenerator`] computes signatures from buffers or readers.
//! - [`ChecksumSpec`] is the strong-hash capability (algorithm, truncation,
//!   seed) carried by every signature and reused by the matcher.
//! - [`SignatureOptions`] validates user-facing configuration and derives the
//!   block length with [`calculate_signature_layout`].
//! - [`wire`] encodes signatures as a self-describing byte stream.

mod algorithm;
mod block;
mod checksum_spec;
mod file;
mod generation;
mod layout;
mod options;
#[cfg(feature = "parallel")]
#[cfg_attr(docsrs, doc(cfg(feature = "parallel")))]
pub mod parallel;
pub mod wire;

pub use algorithm::{SignatureAlgorithm, UnknownAlgorithm};
pub use block::ChecksumPair;
pub use checksum_spec::{ChecksumSpec, StrongHasher};
pub use file::Signature;
pub use generation::{
    SignatureError, SignatureGenerator, generate_file_signature, generate_signature,
};
pub use layout::{
    DEFAULT_BLOCK_LENGTH, MAX_BLOCK_LENGTH, SignatureLayout, SignatureLayoutError,
    calculate_signature_layout,
};
pub use options::SignatureOptions;
