use thiserror::Error;

use tether_serde::SerdeErr;

/// Errors that can occur while using a voice ring buffer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceError {
    /// Frame longer than the one-byte length field allows
    #[error("Voice frame of {len} bytes exceeds the maximum of {max} bytes")]
    FrameTooLong { len: usize, max: usize },

    /// Slot lock was poisoned by a panicking producer or consumer
    #[error("Voice ring buffer lock is poisoned")]
    LockPoisoned,

    /// Incoming voice message could not be decoded
    #[error("Malformed voice message: {0}")]
    Malformed(#[from] SerdeErr),
}
