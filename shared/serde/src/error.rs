use thiserror::Error;

/// Errors raised while reading a bit stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The stream ended before the value was complete
    #[error("Unexpected end of stream: needed {needed} more bit(s) at bit offset {offset}")]
    UnexpectedEnd { offset: usize, needed: u32 },

    /// A decoded value lies outside the range its encoding allows
    #[error("Decoded value {value} exceeds the maximum code {max} for this field")]
    ValueOutOfRange { value: u64, max: u64 },

    /// Whole bytes were left over after the declared layout was read
    #[error("{remaining_bits} bit(s) left unread after the declared layout")]
    TrailingData { remaining_bits: usize },
}
