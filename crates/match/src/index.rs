//! crates/match/src/index.rs
//!
//! Weak-sum hash table over a basis signature.

use std::num::NonZeroU32;

use rustc_hash::FxHashMap;

use checksums::RollingDigest;
use signature::{ChecksumPair, ChecksumSpec, Signature};

/// Lookup table from weak rolling sum to the basis blocks that carry it.
///
/// Built once per signature and read-only while matching. Blocks sharing a
/// weak sum are chained in insertion (block) order, so among blocks with
/// equal strong sums the one with the lowest basis offset is found first.
#[derive(Clone, Debug)]
pub struct BlockIndex {
    block_length: NonZeroU32,
    spec: ChecksumSpec,
    blocks: Vec<ChecksumPair>,
    lookup: FxHashMap<u32, Vec<usize>>,
}

impl BlockIndex {
    /// Indexes every block of `signature` by its weak sum.
    #[must_use]
    pub fn build(signature: &Signature) -> Self {
        let blocks = signature.blocks().to_vec();
        let mut lookup: FxHashMap<u32, Vec<usize>> = FxHashMap::default();
        lookup.reserve(blocks.len());
        for (slot, block) in blocks.iter().enumerate() {
            lookup.entry(block.weak()).or_default().push(slot);
        }

        Self {
            block_length: signature.layout().block_length(),
            spec: signature.spec().clone(),
            blocks,
            lookup,
        }
    }

    /// Block length of the indexed signature.
    #[must_use]
    pub const fn block_length(&self) -> NonZeroU32 {
        self.block_length
    }

    /// Strong checksum settings target windows must be hashed with.
    #[must_use]
    pub const fn spec(&self) -> &ChecksumSpec {
        &self.spec
    }

    /// Number of indexed blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` when the basis was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of distinct weak sums.
    #[must_use]
    pub fn distinct_weak_sums(&self) -> usize {
        self.lookup.len()
    }

    /// Finds a basis block whose content equals the window `front ++ back`.
    ///
    /// `digest` is the rolling checksum of the window. The strong sum of the
    /// window is computed at most once and only when the weak sum hits a
    /// block of the same length. Among strong matches, the block numbered
    /// `preferred_seq` wins when present; otherwise the first inserted does.
    #[must_use]
    pub fn find_match(
        &self,
        digest: RollingDigest,
        front: &[u8],
        back: &[u8],
        preferred_seq: Option<u32>,
    ) -> Option<&ChecksumPair> {
        let candidates = self.lookup.get(&digest.value())?;
        let window_len = front.len() + back.len();

        let mut strong: Option<Vec<u8>> = None;
        let mut first: Option<&ChecksumPair> = None;
        for &slot in candidates {
            let block = &self.blocks[slot];
            if block.len() as usize != window_len {
                continue;
            }
            let sum = strong.get_or_insert_with(|| self.spec.strong_sum_parts(front, back));
            if block.strong() != sum.as_slice() {
                continue;
            }
            if preferred_seq == Some(block.seq()) {
                return Some(block);
            }
            if first.is_none() {
                first = Some(block);
            }
        }
        first
    }
}
