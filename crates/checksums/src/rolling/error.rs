use thiserror::Error;

/// Errors that can occur while updating the rolling checksum state.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum RollingError {
    /// The checksum window is empty, preventing the rolling update from making progress.
    #[error("rolling checksum requires a non-empty window")]
    EmptyWindow,
    /// The checksum window length exceeds what can be represented in 32 bits,
    /// or what the window's ring buffer can hold.
    #[error("rolling checksum window of {len} bytes exceeds its limit of {limit}")]
    WindowTooLarge {
        /// Number of bytes requested for the rolling window.
        len: usize,
        /// Largest window the checksum can track.
        limit: usize,
    },
}
