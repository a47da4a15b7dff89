//! crates/signature/src/parallel.rs
//!
//! Parallel signature generation using rayon.
//!
//! Blocks are checksummed independently, so a buffered basis can be split
//! across worker threads. The output is identical to sequential generation:
//! rayon's indexed collect preserves block order.

use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

use logging::trace_genr;

use crate::block::ChecksumPair;
use crate::file::Signature;
use crate::generation::{SignatureError, SignatureGenerator, checksum_block};
use crate::layout::SignatureLayout;

/// Basis size at which [`SignatureGenerator::generate_auto`] switches to
/// parallel checksumming.
pub const PARALLEL_THRESHOLD_BYTES: usize = 256 * 1024;

impl SignatureGenerator {
    /// Generates the signature of `buf` with blocks checksummed in parallel.
    ///
    /// # Errors
    ///
    /// Same as [`generate`](Self::generate).
    #[cfg_attr(feature = "tracing", instrument(skip(self, buf), fields(len = buf.len()), name = "generate_signature_parallel"))]
    pub fn generate_parallel(
        &self,
        buf: &[u8],
        base_offset: u64,
    ) -> Result<Signature, SignatureError> {
        let layout = SignatureLayout::for_length(buf.len() as u64, self.block_length())?;
        let block_len = self.block_length().get() as usize;
        let spec = self.spec();

        let blocks: Vec<ChecksumPair> = buf
            .par_chunks(block_len)
            .enumerate()
            .map(|(index, chunk)| {
                let offset = base_offset + (index * block_len) as u64;
                checksum_block(spec, chunk, offset, index as u32)
            })
            .collect();

        trace_genr!(
            blocks = blocks.len(),
            threads = rayon::current_num_threads(),
            "generated parallel signature for {} bytes",
            buf.len()
        );
        Ok(Signature::new(layout, spec.clone(), blocks, buf.len() as u64))
    }

    /// Picks sequential or parallel generation based on the basis size.
    ///
    /// # Errors
    ///
    /// Same as [`generate`](Self::generate).
    pub fn generate_auto(&self, buf: &[u8], base_offset: u64) -> Result<Signature, SignatureError> {
        if buf.len() >= PARALLEL_THRESHOLD_BYTES {
            self.generate_parallel(buf, base_offset)
        } else {
            self.generate(buf, base_offset)
        }
    }
}
