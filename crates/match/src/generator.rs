//! crates/match/src/generator.rs
//!
//! Whole-buffer delta generation.

use std::num::NonZeroUsize;

use checksums::RollingChecksum;
#[cfg(feature = "tracing")]
use tracing::instrument;

use logging::trace_delta;

use crate::index::BlockIndex;
use crate::script::{Delta, DeltaScript};

/// Default upper bound on the bytes carried by a single literal.
pub const DEFAULT_MAX_LITERAL: usize = 32 * 1024;

/// Knobs shared by [`Matcher`] and [`StreamMatcher`](crate::StreamMatcher).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MatchOptions {
    max_literal: NonZeroUsize,
}

impl MatchOptions {
    /// Creates options with the default literal bound.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_literal: match NonZeroUsize::new(DEFAULT_MAX_LITERAL) {
                Some(len) => len,
                None => NonZeroUsize::MIN,
            },
        }
    }

    /// Caps the length of each emitted literal. Longer unmatched runs are
    /// split into consecutive literals.
    #[must_use]
    pub const fn with_max_literal(mut self, max_literal: NonZeroUsize) -> Self {
        self.max_literal = max_literal;
        self
    }

    /// Returns the literal bound.
    #[must_use]
    pub const fn max_literal(&self) -> NonZeroUsize {
        self.max_literal
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Greedy, leftmost block matcher over a fully buffered target.
///
/// The window slides one byte at a time until its weak sum and strong sum
/// both hit a basis block, then jumps past the match. Once a block matches,
/// no longer alignment is searched for.
///
/// ```
/// use std::num::NonZeroU32;
/// use matching::{BlockIndex, Delta, Matcher};
/// use signature::{ChecksumSpec, SignatureGenerator};
///
/// let generator = SignatureGenerator::new(NonZeroU32::new(4).unwrap(), ChecksumSpec::default());
/// let index = BlockIndex::build(&generator.generate(b"abcdefgh", 0).unwrap());
/// let script = Matcher::new(&index).match_target(b"xxabcdefgh");
/// assert_eq!(
///     script.deltas(),
///     &[
///         Delta::Literal { offset: 0, data: b"xx".to_vec() },
///         Delta::Copy { old_offset: 0, new_offset: 2, len: 8 },
///     ]
/// );
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Matcher<'a> {
    index: &'a BlockIndex,
    options: MatchOptions,
}

impl<'a> Matcher<'a> {
    /// Creates a matcher over `index` with default options.
    #[must_use]
    pub const fn new(index: &'a BlockIndex) -> Self {
        Self {
            index,
            options: MatchOptions::new(),
        }
    }

    /// Replaces the options.
    #[must_use]
    pub const fn with_options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the index being matched against.
    #[must_use]
    pub const fn index(&self) -> &'a BlockIndex {
        self.index
    }

    /// Computes the delta script that rebuilds `target` from the basis.
    #[cfg_attr(feature = "tracing", instrument(skip(self, target), fields(len = target.len())))]
    pub fn match_target(&self, target: &[u8]) -> DeltaScript {
        let mut script = DeltaScript::new();
        let block_len = self.index.block_length().get() as usize;
        let max_literal = self.options.max_literal.get();
        let end = target.len();

        let mut pos = 0usize;
        let mut literal_start = 0usize;
        let mut window = block_len.min(end);
        let mut rolling = RollingChecksum::new();
        rolling.update_from_block(&target[..window]);
        let mut last_seq: Option<u32> = None;

        while window > 0 {
            let preferred = last_seq.and_then(|seq| seq.checked_add(1));
            let found = self.index.find_match(
                rolling.digest(),
                &target[pos..pos + window],
                &[],
                preferred,
            );

            if let Some(block) = found {
                push_literals(&mut script, target, literal_start, pos, max_literal);
                trace_delta!(
                    trace: seq = block.seq(),
                    offset = pos,
                    "matched basis block at {}",
                    block.offset()
                );
                script.push(Delta::Copy {
                    old_offset: block.offset(),
                    new_offset: pos as u64,
                    len: window as u32,
                });
                last_seq = Some(block.seq());
                pos += window;
                literal_start = pos;
                window = block_len.min(end - pos);
                rolling.update_from_block(&target[pos..pos + window]);
                continue;
            }

            if pos + window < end {
                if rolling.roll(target[pos], target[pos + window]).is_err() {
                    rolling.update_from_block(&target[pos + 1..=pos + window]);
                }
            } else {
                window -= 1;
                if rolling.trim(target[pos]).is_err() {
                    rolling.update_from_block(&target[pos + 1..pos + 1 + window]);
                }
            }
            pos += 1;

            if pos - literal_start == max_literal {
                push_literals(&mut script, target, literal_start, pos, max_literal);
                literal_start = pos;
            }
        }
        push_literals(&mut script, target, literal_start, end, max_literal);

        trace_delta!(
            deltas = script.len(),
            literal_bytes = script.literal_bytes(),
            copy_bytes = script.copy_bytes(),
            "matched {} target bytes",
            end
        );
        script
    }
}

/// Appends `target[start..end]` as literals of at most `max_literal` bytes.
fn push_literals(
    script: &mut DeltaScript,
    target: &[u8],
    start: usize,
    end: usize,
    max_literal: usize,
) {
    let mut offset = start;
    for chunk in target[start..end].chunks(max_literal) {
        script.push(Delta::Literal {
            offset: offset as u64,
            data: chunk.to_vec(),
        });
        offset += chunk.len();
    }
}

/// Matches `target` against `index` with default options.
#[must_use]
pub fn match_target(index: &BlockIndex, target: &[u8]) -> DeltaScript {
    Matcher::new(index).match_target(target)
}
