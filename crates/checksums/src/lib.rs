#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Checksums used for block-level delta matching.
//!
//! - [`RollingChecksum`] is the weak, O(1)-updatable checksum that filters
//!   candidate blocks while a window slides over the target.
//! - [`RollingWindow`] pairs the checksum with a ring buffer holding the
//!   window bytes, so the outgoing byte is available when the window rolls.
//! - [`strong`] hosts the collision-resistant digests that confirm a weak hit.

mod rolling;
pub mod strong;

pub use rolling::{CHAR_OFFSET, RollingChecksum, RollingDigest, RollingError, RollingWindow};
