//! crates/match/src/script.rs
//!
//! Delta instructions and the ordered script that carries them.

use thiserror::Error;

/// One reconstruction instruction.
///
/// Offsets in the *target* coordinate space are write offsets; a well formed
/// set of deltas tiles `[0, target_len)` exactly once.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Delta {
    /// New bytes not taken from the basis.
    Literal {
        /// Position of the first byte in the target.
        offset: u64,
        /// Bytes to write.
        data: Vec<u8>,
    },
    /// A span of the basis reused at a (possibly different) position.
    Copy {
        /// Source position in the basis.
        old_offset: u64,
        /// Destination position in the target.
        new_offset: u64,
        /// Number of bytes copied.
        len: u32,
    },
}

impl Delta {
    /// Returns the target position this delta writes to.
    #[must_use]
    pub const fn write_offset(&self) -> u64 {
        match self {
            Self::Literal { offset, .. } => *offset,
            Self::Copy { new_offset, .. } => *new_offset,
        }
    }

    /// Returns the number of target bytes this delta produces.
    #[must_use]
    pub fn len(&self) -> u64 {
        match self {
            Self::Literal { data, .. } => data.len() as u64,
            Self::Copy { len, .. } => u64::from(*len),
        }
    }

    /// Returns `true` for a delta that writes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the target position one past the last byte written.
    #[must_use]
    pub fn write_end(&self) -> u64 {
        self.write_offset() + self.len()
    }

    /// Returns `true` when the delta is a literal payload.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }
}

/// Tiling violations reported by [`DeltaScript::validate_tiling`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum TilingError {
    /// A byte range of the target is not written by any delta.
    #[error("target bytes {start}..{end} are not covered by any delta")]
    Gap {
        /// First uncovered byte.
        start: u64,
        /// End of the uncovered range.
        end: u64,
    },
    /// Two deltas write the same target bytes.
    #[error("delta at offset {offset} overlaps bytes already written up to {covered}")]
    Overlap {
        /// Write offset of the offending delta.
        offset: u64,
        /// End of the range covered before it.
        covered: u64,
    },
    /// A delta writes zero bytes.
    #[error("empty delta at offset {offset}")]
    Empty {
        /// Write offset of the empty delta.
        offset: u64,
    },
    /// The deltas extend past the expected target length.
    #[error("deltas cover {covered} bytes but the target has {expected}")]
    Overrun {
        /// Expected target length.
        expected: u64,
        /// Bytes covered by the deltas.
        covered: u64,
    },
}

/// Ordered collection of [`Delta`] values that reconstruct a target.
///
/// [`push`](Self::push) merges a copy into its predecessor when both the
/// basis and the target spans are contiguous, so runs of consecutive
/// matching blocks collapse into a single instruction.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DeltaScript {
    deltas: Vec<Delta>,
    literal_bytes: u64,
    copy_bytes: u64,
}

impl DeltaScript {
    /// Creates an empty script.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            deltas: Vec::new(),
            literal_bytes: 0,
            copy_bytes: 0,
        }
    }

    /// Builds a script from deltas as given, without coalescing.
    #[must_use]
    pub fn from_deltas(deltas: Vec<Delta>) -> Self {
        let mut literal_bytes = 0;
        let mut copy_bytes = 0;
        for delta in &deltas {
            if delta.is_literal() {
                literal_bytes += delta.len();
            } else {
                copy_bytes += delta.len();
            }
        }
        Self {
            deltas,
            literal_bytes,
            copy_bytes,
        }
    }

    /// Appends `delta`, merging adjacent copies.
    pub fn push(&mut self, delta: Delta) {
        if let Delta::Copy {
            old_offset,
            new_offset,
            len,
        } = delta
        {
            self.copy_bytes += u64::from(len);
            if let Some(Delta::Copy {
                old_offset: prev_old,
                new_offset: prev_new,
                len: prev_len,
            }) = self.deltas.last_mut()
            {
                let contiguous = *prev_old + u64::from(*prev_len) == old_offset
                    && *prev_new + u64::from(*prev_len) == new_offset;
                if let (true, Some(merged)) = (contiguous, prev_len.checked_add(len)) {
                    *prev_len = merged;
                    return;
                }
            }
            self.deltas.push(delta);
        } else {
            self.literal_bytes += delta.len();
            self.deltas.push(delta);
        }
    }

    /// Returns the deltas in emission order.
    #[must_use]
    pub fn deltas(&self) -> &[Delta] {
        &self.deltas
    }

    /// Consumes the script and returns its deltas.
    #[must_use]
    pub fn into_deltas(self) -> Vec<Delta> {
        self.deltas
    }

    /// Returns the number of deltas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    /// Returns `true` when the script holds no deltas.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Returns the total number of target bytes described by the script.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.literal_bytes + self.copy_bytes
    }

    /// Returns the number of bytes carried as literals.
    #[must_use]
    pub const fn literal_bytes(&self) -> u64 {
        self.literal_bytes
    }

    /// Returns the number of bytes copied from the basis.
    #[must_use]
    pub const fn copy_bytes(&self) -> u64 {
        self.copy_bytes
    }

    /// Returns the number of copy instructions.
    #[must_use]
    pub fn copy_count(&self) -> usize {
        self.deltas.iter().filter(|d| !d.is_literal()).count()
    }

    /// Checks that the deltas, ordered by write offset, cover
    /// `[0, target_len)` exactly once.
    ///
    /// # Errors
    ///
    /// Returns the first [`TilingError`] found.
    pub fn validate_tiling(&self, target_len: u64) -> Result<(), TilingError> {
        let mut ordered: Vec<&Delta> = self.deltas.iter().collect();
        ordered.sort_by_key(|delta| delta.write_offset());

        let mut covered = 0u64;
        for delta in ordered {
            let offset = delta.write_offset();
            if delta.is_empty() {
                return Err(TilingError::Empty { offset });
            }
            if offset > covered {
                return Err(TilingError::Gap {
                    start: covered,
                    end: offset,
                });
            }
            if offset < covered {
                return Err(TilingError::Overlap { offset, covered });
            }
            covered = delta.write_end();
        }

        match covered.cmp(&target_len) {
            std::cmp::Ordering::Less => Err(TilingError::Gap {
                start: covered,
                end: target_len,
            }),
            std::cmp::Ordering::Greater => Err(TilingError::Overrun {
                expected: target_len,
                covered,
            }),
            std::cmp::Ordering::Equal => Ok(()),
        }
    }

    /// Reassembles the target from an in-memory basis.
    ///
    /// Intended for small inputs and tests; the `engine` crate handles files.
    /// Returns `None` if a copy reaches past the end of `basis`.
    #[must_use]
    pub fn apply_to(&self, basis: &[u8]) -> Option<Vec<u8>> {
        let mut ordered: Vec<&Delta> = self.deltas.iter().collect();
        ordered.sort_by_key(|delta| delta.write_offset());

        let mut out = Vec::with_capacity(usize::try_from(self.total_bytes()).ok()?);
        for delta in ordered {
            match delta {
                Delta::Literal { data, .. } => out.extend_from_slice(data),
                Delta::Copy {
                    old_offset, len, ..
                } => {
                    let start = usize::try_from(*old_offset).ok()?;
                    let end = start.checked_add(*len as usize)?;
                    out.extend_from_slice(basis.get(start..end)?);
                }
            }
        }
        Some(out)
    }
}

impl Extend<Delta> for DeltaScript {
    fn extend<I: IntoIterator<Item = Delta>>(&mut self, iter: I) {
        for delta in iter {
            self.push(delta);
        }
    }
}

impl FromIterator<Delta> for DeltaScript {
    fn from_iter<I: IntoIterator<Item = Delta>>(iter: I) -> Self {
        let mut script = Self::new();
        script.extend(iter);
        script
    }
}
