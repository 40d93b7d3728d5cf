use crate::constants::{MAX_VOICE_FRAME_BYTES, VOICE_RING_DEPTH};

/// Tuning for a voice ring buffer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoiceConfig {
    /// Frames kept and resent with every message (`K`)
    pub depth: usize,
    /// Longest frame accepted by `enqueue`, capped at 255 by the wire format
    pub max_frame_length: usize,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            depth: VOICE_RING_DEPTH,
            max_frame_length: MAX_VOICE_FRAME_BYTES,
        }
    }
}
