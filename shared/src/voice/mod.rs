pub mod error;
pub mod voice_config;
pub mod voice_ring_buffer;
