pub mod assembled_payload;
pub mod chunk_config;
pub mod chunk_reassembler;
pub mod chunk_splitter;
pub mod error;
pub mod update_envelope;
