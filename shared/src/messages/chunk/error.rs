use thiserror::Error;

use tether_serde::SerdeErr;

/// Errors that can occur while splitting or reassembling chunked updates
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// The list is longer than one update may carry
    #[error("Update of {count} units exceeds the limit of {max} units per update")]
    TooManyUnits { count: usize, max: u32 },

    /// Declared chunk count is zero or above the configured bound
    #[error("Chunk count {chunk_count} is outside 1..={max}")]
    ChunkCountOutOfRange { chunk_count: u16, max: u16 },

    /// Chunk index does not fall inside its declared chunk count
    #[error("Chunk index {chunk_index} is outside a {chunk_count}-chunk update")]
    ChunkIndexOutOfRange { chunk_index: u16, chunk_count: u16 },

    /// A chunk claims more units than a chunk may hold
    #[error("Chunk declares {unit_count} units but a chunk holds at most {max}")]
    UnitCountOutOfRange { unit_count: u16, max: u16 },

    /// Two chunks of the same generation disagree about the chunk count
    #[error("Chunk declares {found} chunks but generation {generation} started with {expected}")]
    InconsistentChunkCount {
        generation: u16,
        expected: u16,
        found: u16,
    },

    /// Payload longer than the envelope length field can describe
    #[error("Chunk payload of {len} bytes exceeds the envelope limit of {max} bytes")]
    PayloadTooLarge { len: usize, max: usize },

    /// The envelope bytes could not be decoded
    #[error("Malformed update envelope: {0}")]
    Malformed(#[from] SerdeErr),
}
