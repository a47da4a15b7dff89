//! Rolling checksum implementation for delta transfers.
//!
//! The rolling checksum is a weak but fast checksum used to identify candidate
//! blocks during delta generation. Sliding the window by one byte costs O(1)
//! instead of recomputing the sum from scratch.
//!
//! # Algorithm
//!
//! Two 16-bit accumulators are kept: `a` is the sum of the window bytes and
//! `b` the sum of the running prefix sums. Every byte is biased by
//! [`CHAR_OFFSET`] so that a window of zero bytes still yields a non-zero sum.
//! The packed value is `(a & 0xffff) | (b << 16)`.
//!
//! # Example
//!
//! ```rust
//! use checksums::RollingChecksum;
//!
//! let mut rolling = RollingChecksum::new();
//! rolling.update(b"hello");
//!
//! // Slide window: remove 'h', add '!'
//! rolling.roll(b'h', b'!').unwrap();
//!
//! let mut fresh = RollingChecksum::new();
//! fresh.update(b"ello!");
//! assert_eq!(rolling.value(), fresh.value());
//! ```

mod checksum;
mod digest;
mod error;
mod ring;
mod window;

pub use checksum::{CHAR_OFFSET, RollingChecksum};
pub use digest::RollingDigest;
pub use error::RollingError;
pub use window::RollingWindow;

#[cfg(test)]
mod tests;
