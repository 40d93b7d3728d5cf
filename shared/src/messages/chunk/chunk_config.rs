use tether_serde::bits_for_span;

use crate::constants::{DEFAULT_MAX_UNITS, DEFAULT_UNITS_PER_CHUNK};

/// Sizing of chunked list updates. Sender and receiver must agree on it,
/// since it also decides how many bits the chunk header fields take.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Capacity `C` of one chunk, in units
    pub units_per_chunk: u16,
    /// Largest list a single update may carry
    pub max_units: u32,
}

impl ChunkConfig {
    fn capacity(&self) -> u32 {
        u32::from(self.units_per_chunk.max(1))
    }

    /// `ceil(max_units / units_per_chunk)`, at least 1
    pub fn max_chunk_count(&self) -> u16 {
        let count = self.max_units.div_ceil(self.capacity()).max(1);
        count.min(u32::from(u16::MAX)) as u16
    }

    /// Number of chunks needed for `unit_count` units, at least 1
    pub fn chunk_count_for(&self, unit_count: usize) -> usize {
        unit_count.div_ceil(self.capacity() as usize).max(1)
    }

    /// Bits used for `chunkIndex` and `chunkCount - 1` on the wire
    pub fn chunk_index_bits(&self) -> u8 {
        bits_for_span(u64::from(self.max_chunk_count()) - 1)
    }

    /// Bits used for a chunk's `unitCount` on the wire
    pub fn unit_count_bits(&self) -> u8 {
        bits_for_span(u64::from(self.capacity()))
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            units_per_chunk: DEFAULT_UNITS_PER_CHUNK,
            max_units: DEFAULT_MAX_UNITS,
        }
    }
}
