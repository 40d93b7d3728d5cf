//! # `SyncConfig`
//!
//! Numeric knobs of one `SyncWorld`. Set once and cloned into the world;
//! both ends of a link must agree on `chunk`, since it sizes the envelope
//! header encoding.

use crate::{
    constants::{
        DEFAULT_AUDIT_INTERVAL_TICKS, DEFAULT_MAX_BYTES_PER_TICK,
        DEFAULT_REASSEMBLY_TIMEOUT_TICKS,
    },
    messages::chunk::chunk_config::ChunkConfig,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncConfig {
    pub chunk: ChunkConfig,
    /// Ticks an incomplete reassembly may sit idle before it is discarded
    pub reassembly_timeout_ticks: u16,
    /// Minimum ticks between two audit entries for the same field
    pub audit_interval_ticks: u16,
    /// Outbound bytes per tick. The tick loop stops producing once this is
    /// reached, so the last update of a tick may overshoot it.
    pub max_bytes_per_tick: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            chunk: ChunkConfig::default(),
            reassembly_timeout_ticks: DEFAULT_REASSEMBLY_TIMEOUT_TICKS,
            audit_interval_ticks: DEFAULT_AUDIT_INTERVAL_TICKS,
            max_bytes_per_tick: DEFAULT_MAX_BYTES_PER_TICK,
        }
    }
}
