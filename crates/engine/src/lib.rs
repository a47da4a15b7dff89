#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Reconstruction of targets from a basis and delta instructions.
//!
//! [`Rebuilder`] applies a list of [`Delta`](matching::Delta) values in one
//! of three modes:
//!
//! - into any [`Write`](std::io::Write) sink, reading copies from a seekable
//!   basis or an in-memory slice;
//! - into a new file distinct from the basis;
//! - in place, overwriting the basis file itself. Copies are ordered by the
//!   [`schedule`] module so no source is overwritten before it is read, and
//!   copies caught in a dependency cycle are buffered in memory.
//!
//! Validation (tiling, copy ranges, missing basis) always completes before
//! the destination is opened for writing.

mod error;
mod rebuild;
pub mod schedule;

pub use error::{RebuildError, RebuildResult};
pub use rebuild::{RebuildReport, Rebuilder};
