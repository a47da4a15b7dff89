#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Block matching and delta generation.
//!
//! - [`BlockIndex`] indexes a basis [`Signature`](signature::Signature) by
//!   weak sum and confirms candidates by strong sum.
//! - [`Matcher`] scans a buffered target and returns a [`DeltaScript`].
//! - [`StreamMatcher`] does the same for a target fed in pieces, pushing
//!   each [`Delta`] to registered [`DeltaListener`]s as soon as it is known.
//! - [`wire`] encodes delta scripts as a byte stream.
//!
//! Both matchers share one policy: slide a block-sized window one byte at a
//! time, accept the first block whose weak and strong sums match, then jump
//! past it. When several basis blocks match, the one following the previous
//! match is preferred so identical runs coalesce into a single copy; failing
//! that, the lowest-offset block wins.

mod generator;
mod index;
mod script;
mod stream;
pub mod wire;

pub use generator::{DEFAULT_MAX_LITERAL, MatchOptions, Matcher, match_target};
pub use index::BlockIndex;
pub use script::{Delta, DeltaScript, TilingError};
pub use stream::{
    DeltaListener, ListenerError, ListenerErrors, ListenerFailure, StreamError, StreamMatcher,
    StreamState, StreamSummary,
};
