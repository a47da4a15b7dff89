//! crates/logging/src/tracing_macros.rs
//! Convenience macros for subsystem tracing.
//!
//! These macros wrap the standard tracing macros with the targets that
//! [`VerbosityConfig`](crate::VerbosityConfig) filters on. The event level
//! may be given as a leading `trace:` to emit below the subsystem default.

/// Emit a signature generation trace.
///
/// # Example
/// ```ignore
/// trace_genr!("generated {} block checksums", count);
/// ```
#[macro_export]
macro_rules! trace_genr {
    (trace: $($arg:tt)*) => {
        $crate::tracing::trace!(target: "rdelta::genr", $($arg)*)
    };
    ($($arg:tt)*) => {
        $crate::tracing::debug!(target: "rdelta::genr", $($arg)*)
    };
}

/// Emit a delta computation trace.
///
/// # Example
/// ```ignore
/// trace_delta!("matched block {} at offset {}", seq, offset);
/// ```
#[macro_export]
macro_rules! trace_delta {
    (trace: $($arg:tt)*) => {
        $crate::tracing::trace!(target: "rdelta::delta", $($arg)*)
    };
    ($($arg:tt)*) => {
        $crate::tracing::debug!(target: "rdelta::delta", $($arg)*)
    };
}

/// Emit a delta emission trace.
///
/// # Example
/// ```ignore
/// trace_send!("listener {} rejected delta", index);
/// ```
#[macro_export]
macro_rules! trace_send {
    (trace: $($arg:tt)*) => {
        $crate::tracing::trace!(target: "rdelta::send", $($arg)*)
    };
    ($($arg:tt)*) => {
        $crate::tracing::debug!(target: "rdelta::send", $($arg)*)
    };
}

/// Emit a reconstruction trace.
///
/// # Example
/// ```ignore
/// trace_recv!("applying {} deltas", count);
/// ```
#[macro_export]
macro_rules! trace_recv {
    (trace: $($arg:tt)*) => {
        $crate::tracing::trace!(target: "rdelta::recv", $($arg)*)
    };
    ($($arg:tt)*) => {
        $crate::tracing::debug!(target: "rdelta::recv", $($arg)*)
    };
}

/// Emit an I/O operation trace.
///
/// # Example
/// ```ignore
/// trace_io!("read {} bytes from {}", count, path.display());
/// ```
#[macro_export]
macro_rules! trace_io {
    ($($arg:tt)*) => {
        $crate::tracing::trace!(target: "rdelta::io", $($arg)*)
    };
}
