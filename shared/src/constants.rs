/// Depth of the voice ring buffer in the reference tuning
pub const VOICE_RING_DEPTH: usize = 5;

/// Largest encoded voice frame; the wire length field is a single byte
pub const MAX_VOICE_FRAME_BYTES: usize = u8::MAX as usize;

/// Units carried by one chunk of a list update
pub const DEFAULT_UNITS_PER_CHUNK: u16 = 60;

/// Upper bound on units in one list update, sizes the chunk index encoding
pub const DEFAULT_MAX_UNITS: u32 = 1200;

/// Ticks a partially received update may sit idle before it is discarded
pub const DEFAULT_REASSEMBLY_TIMEOUT_TICKS: u16 = 60;

/// Minimum ticks between two audit log lines for the same field
pub const DEFAULT_AUDIT_INTERVAL_TICKS: u16 = 30;

/// Outbound bytes a world may emit per tick before deferring the rest
pub const DEFAULT_MAX_BYTES_PER_TICK: usize = 1200;
