//! crates/match/src/stream.rs
//!
//! Incremental delta generation for targets that arrive in pieces.
//!
//! [`StreamMatcher`] applies the same greedy policy as
//! [`Matcher`](crate::Matcher) but is fed bytes or chunks and pushes each
//! delta to its listeners as soon as it is known. Only one block of target
//! data plus at most one literal's worth of unmatched bytes is buffered.
//!
//! Listener failures never interrupt matching: every listener sees every
//! delta, and the failures of one ingestion call are returned together once
//! the call has consumed all of its input.

use std::error::Error as StdError;
use std::fmt;
use std::io::{self, Read};
use std::num::NonZeroUsize;

use thiserror::Error;

use checksums::{RollingError, RollingWindow};
use logging::{trace_delta, trace_send};

use crate::generator::MatchOptions;
use crate::index::BlockIndex;
use crate::script::Delta;

/// Error type listeners report back to the matcher.
pub type ListenerError = Box<dyn StdError + Send + Sync + 'static>;

/// Receiver of delta events.
///
/// Implemented for any `FnMut(&Delta) -> Result<(), ListenerError>`.
pub trait DeltaListener {
    /// Observes one delta. Deltas arrive in target order.
    fn on_delta(&mut self, delta: &Delta) -> Result<(), ListenerError>;
}

impl<F> DeltaListener for F
where
    F: FnMut(&Delta) -> Result<(), ListenerError>,
{
    fn on_delta(&mut self, delta: &Delta) -> Result<(), ListenerError> {
        self(delta)
    }
}

/// One listener failure: the listener's registration index and its error.
#[derive(Debug)]
pub struct ListenerFailure {
    /// Position of the listener in registration order.
    pub listener: usize,
    /// Target offset of the delta being delivered.
    pub offset: u64,
    /// Error returned by the listener.
    pub error: ListenerError,
}

/// Listener failures collected during one ingestion call, in the order they
/// occurred.
#[derive(Debug, Default)]
pub struct ListenerErrors {
    failures: Vec<ListenerFailure>,
}

impl ListenerErrors {
    /// Returns the failures in occurrence order.
    #[must_use]
    pub fn failures(&self) -> &[ListenerFailure] {
        &self.failures
    }

    /// Number of failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Returns `true` when nothing failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Consumes the aggregate and returns its failures.
    #[must_use]
    pub fn into_failures(self) -> Vec<ListenerFailure> {
        self.failures
    }
}

impl fmt::Display for ListenerErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} listener failure(s)", self.failures.len())?;
        for failure in &self.failures {
            write!(
                f,
                "; listener {} at offset {}: {}",
                failure.listener, failure.offset, failure.error
            )?;
        }
        Ok(())
    }
}

impl StdError for ListenerErrors {}

/// Errors returned by [`StreamMatcher`] ingestion.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Input arrived after [`finalize`](StreamMatcher::finalize) without a
    /// [`reset`](StreamMatcher::reset).
    #[error("stream matcher is finalized; reset it before feeding more input")]
    Finalized,
    /// One or more listeners failed while the input was processed. Matching
    /// itself completed normally.
    #[error(transparent)]
    Listeners(ListenerErrors),
    /// Reading the target failed.
    #[error("reading target failed: {0}")]
    Io(#[from] io::Error),
    /// The rolling window rejected an update.
    #[error(transparent)]
    Rolling(#[from] RollingError),
}

/// Lifecycle of a [`StreamMatcher`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StreamState {
    /// Taking input. Initial and steady state.
    Accumulating,
    /// Delivering the deltas of a match to listeners.
    ///
    /// Transient: entered and left within a single ingestion call, so
    /// [`StreamMatcher::state`] never reports it once that call returns.
    MatchedFlush,
    /// Finished; only [`reset`](StreamMatcher::reset) leaves this state.
    Finalized,
}

/// Totals reported by [`StreamMatcher::finalize`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StreamSummary {
    /// Bytes of target consumed.
    pub target_len: u64,
    /// Bytes emitted as literals.
    pub literal_bytes: u64,
    /// Bytes emitted as copies.
    pub copy_bytes: u64,
    /// Number of deltas emitted.
    pub deltas: u64,
}

const READ_BUFFER_LEN: usize = 64 * 1024;

/// Byte-driven matcher that emits deltas to registered listeners.
pub struct StreamMatcher<'a> {
    index: &'a BlockIndex,
    options: MatchOptions,
    listeners: Vec<Box<dyn DeltaListener + 'a>>,
    window: RollingWindow,
    pending: Vec<u8>,
    emitted: u64,
    last_seq: Option<u32>,
    summary: StreamSummary,
    failures: Vec<ListenerFailure>,
    state: StreamState,
}

impl<'a> StreamMatcher<'a> {
    /// Creates a matcher over `index` with default options.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Rolling`] if the block length cannot be
    /// represented as a window on this platform.
    pub fn new(index: &'a BlockIndex) -> Result<Self, StreamError> {
        Self::with_options(index, MatchOptions::default())
    }

    /// Creates a matcher over `index` with explicit options.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn with_options(index: &'a BlockIndex, options: MatchOptions) -> Result<Self, StreamError> {
        let capacity = NonZeroUsize::new(index.block_length().get() as usize)
            .unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            index,
            options,
            listeners: Vec::new(),
            window: RollingWindow::new(capacity)?,
            pending: Vec::new(),
            emitted: 0,
            last_seq: None,
            summary: StreamSummary::default(),
            failures: Vec::new(),
            state: StreamState::Accumulating,
        })
    }

    /// Registers a listener. Listeners are notified in registration order.
    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: DeltaListener + 'a,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> StreamState {
        self.state
    }

    /// Bytes consumed since creation or the last reset.
    #[must_use]
    pub const fn consumed(&self) -> u64 {
        self.summary.target_len
    }

    /// Feeds a single byte.
    ///
    /// # Errors
    ///
    /// [`StreamError::Finalized`] after [`finalize`](Self::finalize);
    /// [`StreamError::Listeners`] if a listener failed on a delta emitted
    /// while processing the byte.
    pub fn update_byte(&mut self, byte: u8) -> Result<(), StreamError> {
        self.ensure_open()?;
        self.ingest(byte)?;
        self.take_failures()
    }

    /// Feeds a chunk of target bytes.
    ///
    /// # Errors
    ///
    /// As [`update_byte`](Self::update_byte); listener failures from the
    /// whole chunk are reported together.
    pub fn update(&mut self, chunk: &[u8]) -> Result<(), StreamError> {
        self.ensure_open()?;
        for &byte in chunk {
            self.ingest(byte)?;
        }
        self.take_failures()
    }

    /// Feeds everything `reader` produces, then returns the byte count read.
    ///
    /// Does not finalize.
    ///
    /// # Errors
    ///
    /// [`StreamError::Io`] when reading fails. Listener failures collected
    /// before the read error are discarded with it. Otherwise as
    /// [`update`](Self::update) over the whole input.
    pub fn consume_reader<R: Read>(&mut self, mut reader: R) -> Result<u64, StreamError> {
        self.ensure_open()?;
        let mut buffer = vec![0u8; READ_BUFFER_LEN];
        let mut total = 0u64;
        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => read,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => {
                    self.discard_failures();
                    return Err(error.into());
                }
            };
            for &byte in &buffer[..read] {
                self.ingest(byte)?;
            }
            total += read as u64;
        }
        self.take_failures()?;
        Ok(total)
    }

    /// Ends the target: checks the shrinking tail window for a final match,
    /// flushes the remaining bytes as literals and resets the buffers.
    ///
    /// The matcher stays [`Finalized`](StreamState::Finalized) until
    /// [`reset`](Self::reset).
    ///
    /// # Errors
    ///
    /// [`StreamError::Finalized`] when called twice;
    /// [`StreamError::Listeners`] when a listener failed on a tail delta.
    pub fn finalize(&mut self) -> Result<StreamSummary, StreamError> {
        self.ensure_open()?;

        let mut checked = self.window.is_full();
        while !self.window.is_empty() {
            if !checked && self.try_match() {
                break;
            }
            checked = false;
            if let Some(byte) = self.window.trim()? {
                self.push_pending(byte);
            }
        }
        self.flush_pending();

        let summary = self.summary;
        trace_delta!(
            deltas = summary.deltas,
            literal_bytes = summary.literal_bytes,
            copy_bytes = summary.copy_bytes,
            "stream finalized after {} bytes",
            summary.target_len
        );
        self.clear_buffers();
        self.state = StreamState::Finalized;
        self.take_failures()?;
        Ok(summary)
    }

    /// Returns to [`Accumulating`](StreamState::Accumulating) with empty
    /// buffers and zeroed totals. Listeners stay registered.
    pub fn reset(&mut self) {
        self.clear_buffers();
        self.summary = StreamSummary::default();
        self.failures.clear();
        self.state = StreamState::Accumulating;
    }

    fn ensure_open(&self) -> Result<(), StreamError> {
        if self.state == StreamState::Finalized {
            return Err(StreamError::Finalized);
        }
        Ok(())
    }

    fn clear_buffers(&mut self) {
        self.window.clear();
        self.pending.clear();
        self.emitted = 0;
        self.last_seq = None;
    }

    fn ingest(&mut self, byte: u8) -> Result<(), StreamError> {
        self.summary.target_len += 1;
        if let Some(evicted) = self.window.push(byte)? {
            self.push_pending(evicted);
        }
        if self.window.is_full() {
            self.try_match();
        }
        Ok(())
    }

    /// Moves an unmatched byte into the pending literal, flushing at the
    /// literal bound.
    fn push_pending(&mut self, byte: u8) {
        self.pending.push(byte);
        if self.pending.len() >= self.options.max_literal().get() {
            self.flush_pending();
        }
    }

    fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let data = std::mem::take(&mut self.pending);
        let delta = Delta::Literal {
            offset: self.emitted,
            data,
        };
        self.emit(&delta);
        if let Delta::Literal { mut data, .. } = delta {
            data.clear();
            self.pending = data;
        }
    }

    /// Looks the current window up in the index and emits on a hit.
    fn try_match(&mut self) -> bool {
        let index = self.index;
        let preferred = self.last_seq.and_then(|seq| seq.checked_add(1));
        let (front, back) = self.window.as_slices();
        let Some(block) = index.find_match(self.window.digest(), front, back, preferred) else {
            return false;
        };

        self.state = StreamState::MatchedFlush;
        self.flush_pending();
        let len = self.window.len() as u32;
        let copy = Delta::Copy {
            old_offset: block.offset(),
            new_offset: self.emitted,
            len,
        };
        self.emit(&copy);
        self.last_seq = Some(block.seq());
        self.window.clear();
        self.state = StreamState::Accumulating;
        true
    }

    fn emit(&mut self, delta: &Delta) {
        let offset = delta.write_offset();
        for (listener, sink) in self.listeners.iter_mut().enumerate() {
            if let Err(error) = sink.on_delta(delta) {
                trace_send!(listener, offset, "listener failed: {}", error);
                self.failures.push(ListenerFailure {
                    listener,
                    offset,
                    error,
                });
            }
        }

        let len = delta.len();
        self.emitted += len;
        self.summary.deltas += 1;
        if delta.is_literal() {
            self.summary.literal_bytes += len;
        } else {
            self.summary.copy_bytes += len;
        }
    }

    fn discard_failures(&mut self) {
        if !self.failures.is_empty() {
            trace_send!(
                "dropping {} listener failure(s) after a read error",
                self.failures.len()
            );
            self.failures.clear();
        }
    }

    fn take_failures(&mut self) -> Result<(), StreamError> {
        if self.failures.is_empty() {
            return Ok(());
        }
        Err(StreamError::Listeners(ListenerErrors {
            failures: std::mem::take(&mut self.failures),
        }))
    }
}

impl fmt::Debug for StreamMatcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamMatcher")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .field("window", &self.window.len())
            .field("pending", &self.pending.len())
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::num::NonZeroU32;
    use std::rc::Rc;

    use signature::{ChecksumSpec, SignatureGenerator};

    use super::*;
    use crate::generator::Matcher;
    use crate::script::DeltaScript;

    fn index(basis: &[u8], block: u32) -> BlockIndex {
        let generator =
            SignatureGenerator::new(NonZeroU32::new(block).expect("non-zero"), ChecksumSpec::default());
        BlockIndex::build(&generator.generate(basis, 0).expect("signature"))
    }

    fn collect(index: &BlockIndex, target: &[u8], chunk: usize) -> (Vec<Delta>, StreamSummary) {
        let seen = RefCell::new(Vec::new());
        let summary = {
            let mut matcher = StreamMatcher::new(index).expect("matcher");
            matcher.add_listener(|delta: &Delta| -> Result<(), ListenerError> {
                seen.borrow_mut().push(delta.clone());
                Ok(())
            });
            for piece in target.chunks(chunk.max(1)) {
                matcher.update(piece).expect("update");
            }
            matcher.finalize().expect("finalize")
        };
        (seen.into_inner(), summary)
    }

    #[test]
    fn stream_agrees_with_matcher() {
        let basis: Vec<u8> = (0..3_000u32).map(|i| (i * 13 % 241) as u8).collect();
        let mut target = basis[500..].to_vec();
        target.extend_from_slice(b"fresh bytes");
        target.extend_from_slice(&basis[..700]);

        let index = index(&basis, 50);
        let expected = Matcher::new(&index).match_target(&target);
        for chunk in [1, 7, 64, 4096] {
            let (deltas, summary) = collect(&index, &target, chunk);
            let script: DeltaScript = deltas.into_iter().collect();
            assert_eq!(script, expected, "chunk size {chunk}");
            assert_eq!(summary.target_len, target.len() as u64);
            assert_eq!(summary.copy_bytes, expected.copy_bytes());
        }
    }

    #[test]
    fn tail_shorter_than_block_is_matched_at_finalize() {
        let index = index(b"abcdefghij", 4);
        let (deltas, _) = collect(&index, b"xxij", 1);
        assert_eq!(
            deltas,
            vec![
                Delta::Literal {
                    offset: 0,
                    data: b"xx".to_vec()
                },
                Delta::Copy {
                    old_offset: 8,
                    new_offset: 2,
                    len: 2
                },
            ]
        );
    }

    #[test]
    fn copies_are_emitted_before_finalize() {
        let index = index(b"abcdefgh", 4);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut matcher = StreamMatcher::new(&index).expect("matcher");
        matcher.add_listener(move |delta: &Delta| -> Result<(), ListenerError> {
            sink.borrow_mut().push(delta.clone());
            Ok(())
        });

        matcher.update(b"zabc").expect("update");
        assert!(seen.borrow().is_empty());
        matcher.update_byte(b'd').expect("update");
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(matcher.state(), StreamState::Accumulating);
    }

    #[test]
    fn listener_failures_are_aggregated_after_full_fan_out() {
        let index = index(b"abcdefgh", 4);
        let order = RefCell::new(Vec::new());
        let mut matcher = StreamMatcher::new(&index).expect("matcher");
        matcher.add_listener(|_: &Delta| -> Result<(), ListenerError> {
            order.borrow_mut().push(0);
            Err("first".into())
        });
        matcher.add_listener(|_: &Delta| -> Result<(), ListenerError> {
            order.borrow_mut().push(1);
            Ok(())
        });
        matcher.add_listener(|_: &Delta| -> Result<(), ListenerError> {
            order.borrow_mut().push(2);
            Err("third".into())
        });

        let err = matcher.update(b"Qabcdefgh").expect_err("listeners fail");
        let errors = match err {
            StreamError::Listeners(errors) => errors,
            other => panic!("unexpected error {other:?}"),
        };
        // Literal "Q", then the coalescible copies of both blocks.
        assert_eq!(errors.len(), 6);
        let failed: Vec<usize> = errors.failures().iter().map(|f| f.listener).collect();
        assert_eq!(failed, vec![0, 2, 0, 2, 0, 2]);
        assert_eq!(errors.failures()[0].error.to_string(), "first");
        assert_eq!(errors.failures()[2].offset, 1);
        assert_eq!(*order.borrow(), vec![0, 1, 2, 0, 1, 2, 0, 1, 2]);

        // Matching state survived: nothing is left to flush.
        let summary = matcher.finalize().expect("no tail deltas");
        assert_eq!(summary.copy_bytes, 8);
        assert_eq!(summary.literal_bytes, 1);
    }

    #[test]
    fn finalized_matcher_rejects_input_until_reset() {
        let index = index(b"abcd", 4);
        let mut matcher = StreamMatcher::new(&index).expect("matcher");
        matcher.update(b"ab").expect("update");
        matcher.finalize().expect("finalize");
        assert_eq!(matcher.state(), StreamState::Finalized);
        assert!(matches!(matcher.update_byte(1), Err(StreamError::Finalized)));
        assert!(matches!(matcher.finalize(), Err(StreamError::Finalized)));

        matcher.reset();
        assert_eq!(matcher.state(), StreamState::Accumulating);
        assert_eq!(matcher.consumed(), 0);
        matcher.update(b"abcd").expect("update after reset");
        let summary = matcher.finalize().expect("finalize");
        assert_eq!(summary.copy_bytes, 4);
        assert_eq!(summary.deltas, 1);
    }

    #[test]
    fn literal_bound_splits_pending_bytes() {
        let index = index(b"abcd", 4);
        let options = MatchOptions::new().with_max_literal(NonZeroUsize::new(2).expect("non-zero"));
        let lens = RefCell::new(Vec::new());
        let mut matcher = StreamMatcher::with_options(&index, options).expect("matcher");
        matcher.add_listener(|delta: &Delta| -> Result<(), ListenerError> {
            lens.borrow_mut().push((delta.is_literal(), delta.len()));
            Ok(())
        });
        matcher.update(b"12345abcd6").expect("update");
        matcher.finalize().expect("finalize");
        assert_eq!(
            *lens.borrow(),
            vec![(true, 2), (true, 2), (true, 1), (false, 4), (true, 1)]
        );
    }

    #[test]
    fn consume_reader_reads_to_end() {
        let index = index(b"0123456789", 3);
        let mut matcher = StreamMatcher::new(&index).expect("matcher");
        let read = matcher
            .consume_reader(&b"9876543210"[..])
            .expect("consume");
        assert_eq!(read, 10);
        let summary = matcher.finalize().expect("finalize");
        assert_eq!(summary.target_len, 10);
        assert_eq!(summary.literal_bytes + summary.copy_bytes, 10);
    }

    struct FailingReader<'a> {
        data: &'a [u8],
    }

    impl Read for FailingReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::other("disk gone"));
            }
            let len = self.data.len().min(buf.len());
            buf[..len].copy_from_slice(&self.data[..len]);
            self.data = &self.data[len..];
            Ok(len)
        }
    }

    #[test]
    fn read_error_does_not_leak_listener_failures_into_later_calls() {
        let index = index(b"abcd", 4);
        let mut matcher = StreamMatcher::new(&index).expect("matcher");
        matcher.add_listener(|_: &Delta| -> Result<(), ListenerError> { Err("sink".into()) });

        let err = matcher
            .consume_reader(FailingReader { data: b"abcd" })
            .expect_err("read fails");
        assert!(matches!(err, StreamError::Io(_)), "{err:?}");

        matcher.update(b"").expect("no stale failures");
        assert_eq!(matcher.state(), StreamState::Accumulating);
    }
}
