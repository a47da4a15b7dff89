//! crates/engine/src/rebuild.rs
//!
//! Applies delta instructions to a basis.

use std::cmp::min;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

use logging::{trace_io, trace_recv};
use matching::{Delta, TilingError};

use crate::error::{RebuildError, RebuildResult};
use crate::schedule::{CopySpan, schedule_copies};

/// Default size of the copy buffer.
const DEFAULT_BUFFER_LEN: usize = 128 * 1024;

/// Totals describing one reconstruction.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RebuildReport {
    /// Bytes taken from the basis.
    pub copied_bytes: u64,
    /// Bytes written from literals.
    pub literal_bytes: u64,
    /// Copies that closed a dependency cycle and were buffered in memory.
    pub fallback_copies: usize,
    /// Length of the reconstructed target.
    pub target_len: u64,
}

/// Reconstructs targets from a basis and a list of deltas.
///
/// Deltas may arrive in any order; they are applied by write offset (stable,
/// so equal offsets keep their input order) and must tile the target.
/// All validation happens before the destination is touched.
#[derive(Clone, Debug)]
pub struct Rebuilder {
    buffer_len: usize,
}

impl Default for Rebuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Rebuilder {
    /// Creates a rebuilder with default buffering.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer_len: DEFAULT_BUFFER_LEN,
        }
    }

    /// Overrides the buffer length used when moving basis bytes.
    #[must_use]
    pub fn with_buffer_len(mut self, buffer_len: usize) -> Self {
        self.buffer_len = buffer_len.max(1);
        self
    }

    /// Writes the target to `sink`, reading copies from a seekable basis.
    ///
    /// # Errors
    ///
    /// [`RebuildError::Tiling`] or [`RebuildError::CopyOutOfRange`] before
    /// anything is written; [`RebuildError::Io`] while streaming.
    #[cfg_attr(feature = "tracing", instrument(skip_all, fields(deltas = deltas.len())))]
    pub fn rebuild_to<R, W>(
        &self,
        mut basis: R,
        deltas: &[Delta],
        mut sink: W,
    ) -> RebuildResult<RebuildReport>
    where
        R: Read + Seek,
        W: Write,
    {
        let plan = Plan::new(deltas)?;
        let basis_len = basis.seek(SeekFrom::End(0))?;
        plan.check_copies(basis_len)?;

        trace_recv!(
            deltas = deltas.len(),
            target_len = plan.target_len,
            "rebuilding into a fresh sink"
        );

        let mut buffer = vec![0u8; self.buffer_len];
        let mut basis_position: Option<u64> = None;
        for delta in &plan.ordered {
            match delta {
                Delta::Literal { data, .. } => sink.write_all(data)?,
                Delta::Copy {
                    old_offset, len, ..
                } => {
                    if basis_position != Some(*old_offset) {
                        basis.seek(SeekFrom::Start(*old_offset))?;
                    }
                    let mut remaining = u64::from(*len);
                    while remaining > 0 {
                        let chunk = min(remaining, buffer.len() as u64) as usize;
                        basis.read_exact(&mut buffer[..chunk])?;
                        sink.write_all(&buffer[..chunk])?;
                        remaining -= chunk as u64;
                    }
                    basis_position = Some(*old_offset + u64::from(*len));
                }
            }
        }
        sink.flush()?;
        Ok(plan.report())
    }

    /// Writes the target to `sink` using an in-memory basis.
    ///
    /// # Errors
    ///
    /// See [`rebuild_to`](Self::rebuild_to).
    pub fn rebuild_from_slice<W: Write>(
        &self,
        basis: &[u8],
        deltas: &[Delta],
        sink: W,
    ) -> RebuildResult<RebuildReport> {
        self.rebuild_to(Cursor::new(basis), deltas, sink)
    }

    /// Reconstructs into `destination`, a file distinct from `basis`.
    ///
    /// The destination is created or truncated.
    ///
    /// # Errors
    ///
    /// [`RebuildError::SamePath`] when both paths name the same file, checked
    /// before the destination is opened. Otherwise as
    /// [`rebuild_to`](Self::rebuild_to).
    pub fn rebuild_file(
        &self,
        basis: &Path,
        deltas: &[Delta],
        destination: &Path,
    ) -> RebuildResult<RebuildReport> {
        if same_file(basis, destination) {
            return Err(RebuildError::SamePath {
                path: destination.to_path_buf(),
            });
        }
        let plan = Plan::new(deltas)?;
        let basis_file = File::open(basis)?;
        plan.check_copies(basis_file.metadata()?.len())?;

        trace_io!(
            "rebuilding {} from {}",
            destination.display(),
            basis.display()
        );
        let output = BufWriter::with_capacity(self.buffer_len, File::create(destination)?);
        self.rebuild_to(basis_file, deltas, output)
    }

    /// Rewrites `path` in place so it holds the target.
    ///
    /// Copies whose sources another write would clobber are ordered so every
    /// source is read before it is overwritten; copies caught in a cycle are
    /// buffered in memory instead. When `path` does not exist it is created,
    /// which only works for literal-only deltas.
    ///
    /// # Errors
    ///
    /// [`RebuildError::CopyWithoutBasis`], [`RebuildError::CopyOutOfRange`]
    /// and [`RebuildError::Tiling`] before any write. An
    /// [`RebuildError::Io`] part way through leaves the file partially
    /// rewritten.
    #[cfg_attr(feature = "tracing", instrument(skip_all, fields(path = %path.display())))]
    pub fn rebuild_in_place(&self, path: &Path, deltas: &[Delta]) -> RebuildResult<RebuildReport> {
        let plan = Plan::new(deltas)?;
        let basis_len = match fs::metadata(path) {
            Ok(metadata) => Some(metadata.len()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => None,
            Err(error) => return Err(error.into()),
        };

        let Some(basis_len) = basis_len else {
            let first_copy = plan.ordered.iter().find(|delta| !delta.is_literal());
            if let Some(Delta::Copy { new_offset, .. }) = first_copy {
                return Err(RebuildError::CopyWithoutBasis {
                    new_offset: *new_offset,
                });
            }
            trace_recv!("{} does not exist; writing literals only", path.display());
            let mut file = File::create(path)?;
            let report = plan.report();
            write_literals(&mut file, &plan)?;
            file.set_len(plan.target_len)?;
            return Ok(report);
        };
        plan.check_copies(basis_len)?;

        let copies: Vec<CopySpan> = plan
            .ordered
            .iter()
            .filter_map(|delta| match delta {
                Delta::Copy {
                    old_offset,
                    new_offset,
                    len,
                } => Some(CopySpan {
                    old_offset: *old_offset,
                    new_offset: *new_offset,
                    len: u64::from(*len),
                }),
                Delta::Literal { .. } => None,
            })
            .collect();
        let schedule = schedule_copies(&copies);
        trace_recv!(
            copies = copies.len(),
            fallback = schedule.fallback.len(),
            target_len = plan.target_len,
            "rebuilding {} in place",
            path.display()
        );

        let mut file = OpenOptions::new().read(true).write(true).open(path)?;

        let mut buffered = Vec::with_capacity(schedule.fallback.len());
        for &slot in &schedule.fallback {
            let span = copies[slot];
            let mut data = vec![0u8; span.len as usize];
            file.seek(SeekFrom::Start(span.old_offset))?;
            file.read_exact(&mut data)?;
            buffered.push((span.new_offset, data));
        }

        let mut buffer = vec![0u8; self.buffer_len];
        for &slot in &schedule.order {
            move_within(&mut file, copies[slot], &mut buffer)?;
        }
        write_literals(&mut file, &plan)?;
        for (offset, data) in &buffered {
            file.seek(SeekFrom::Start(*offset))?;
            file.write_all(data)?;
        }
        file.set_len(plan.target_len)?;
        file.flush()?;

        let mut report = plan.report();
        report.fallback_copies = schedule.fallback.len();
        Ok(report)
    }
}

/// Deltas sorted by write offset and checked to tile the target.
struct Plan<'a> {
    ordered: Vec<&'a Delta>,
    target_len: u64,
}

impl<'a> Plan<'a> {
    fn new(deltas: &'a [Delta]) -> RebuildResult<Self> {
        let mut ordered: Vec<&Delta> = deltas.iter().filter(|d| !d.is_empty()).collect();
        ordered.sort_by_key(|delta| delta.write_offset());

        let mut covered = 0u64;
        for delta in &ordered {
            let offset = delta.write_offset();
            if offset > covered {
                return Err(TilingError::Gap {
                    start: covered,
                    end: offset,
                }
                .into());
            }
            if offset < covered {
                return Err(TilingError::Overlap { offset, covered }.into());
            }
            covered = offset
                .checked_add(delta.len())
                .ok_or(RebuildError::LengthOverflow { offset })?;
        }
        Ok(Self {
            ordered,
            target_len: covered,
        })
    }

    fn check_copies(&self, basis_len: u64) -> RebuildResult<()> {
        for delta in &self.ordered {
            if let Delta::Copy {
                old_offset, len, ..
            } = delta
            {
                let end = old_offset.checked_add(u64::from(*len));
                if end.is_none_or(|end| end > basis_len) {
                    return Err(RebuildError::CopyOutOfRange {
                        old_offset: *old_offset,
                        len: *len,
                        basis_len,
                    });
                }
            }
        }
        Ok(())
    }

    fn report(&self) -> RebuildReport {
        let mut report = RebuildReport {
            target_len: self.target_len,
            ..RebuildReport::default()
        };
        for delta in &self.ordered {
            if delta.is_literal() {
                report.literal_bytes += delta.len();
            } else {
                report.copied_bytes += delta.len();
            }
        }
        report
    }
}

fn write_literals(file: &mut File, plan: &Plan<'_>) -> io::Result<()> {
    for delta in &plan.ordered {
        if let Delta::Literal { offset, data } = delta {
            file.seek(SeekFrom::Start(*offset))?;
            file.write_all(data)?;
        }
    }
    Ok(())
}

/// Moves `span` inside `file`, choosing the chunk direction so a span whose
/// source and destination overlap never reads bytes it already wrote.
fn move_within(file: &mut File, span: CopySpan, buffer: &mut [u8]) -> io::Result<()> {
    if span.old_offset == span.new_offset || span.len == 0 {
        return Ok(());
    }
    let step = buffer.len() as u64;
    let forward = span.new_offset < span.old_offset;
    let mut done = 0u64;
    while done < span.len {
        let chunk = min(step, span.len - done);
        let at = if forward {
            done
        } else {
            span.len - done - chunk
        };
        let data = &mut buffer[..chunk as usize];
        file.seek(SeekFrom::Start(span.old_offset + at))?;
        file.read_exact(data)?;
        file.seek(SeekFrom::Start(span.new_offset + at))?;
        file.write_all(data)?;
        done += chunk;
    }
    Ok(())
}

/// Checks whether two paths name the same file.
///
/// Existing files are compared by identity, so hard links and aliased paths
/// match. A destination that does not exist yet falls back to comparing the
/// paths themselves.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(a_meta), Ok(b_meta)) => same_identity(&a_meta, &b_meta, a, b),
        _ => a == b,
    }
}

#[cfg(unix)]
fn same_identity(a: &fs::Metadata, b: &fs::Metadata, _: &Path, _: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    a.dev() == b.dev() && a.ino() == b.ino()
}

#[cfg(not(unix))]
fn same_identity(_: &fs::Metadata, _: &fs::Metadata, a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
