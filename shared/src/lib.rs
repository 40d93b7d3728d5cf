//! # Tether Shared
//! Authority-gated replication of bounded component state, chunked list
//! updates and redundant voice frame transport.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use tether_serde::{
    bits_for_span, BitReader, BitWrite, BitWriter, ConstBitLength, QuantizeError,
    QuantizedRange, Serde, SerdeErr,
};

mod audit;
mod constants;
mod messages;
mod types;
mod voice;
mod world;
mod wrapping_number;

pub use audit::blame_tracker::{AuditEntry, BlameTracker, FieldKey, AUDIT_LOG_TARGET};
pub use constants::{
    DEFAULT_AUDIT_INTERVAL_TICKS, DEFAULT_MAX_BYTES_PER_TICK, DEFAULT_MAX_UNITS,
    DEFAULT_REASSEMBLY_TIMEOUT_TICKS, DEFAULT_UNITS_PER_CHUNK, MAX_VOICE_FRAME_BYTES,
    VOICE_RING_DEPTH,
};
pub use messages::chunk::{
    assembled_payload::{AssembledPayload, ChunkPart},
    chunk_config::ChunkConfig,
    chunk_reassembler::{ChunkReassembler, ReassemblyKey, ReassemblyOutcome},
    chunk_splitter::ChunkSplitter,
    error::ChunkError,
    update_envelope::{UpdateEnvelope, MAX_ENVELOPE_PAYLOAD_BYTES},
};
pub use types::{ComponentIndex, EntityId, Generation, Role, SequenceId, Tick};
pub use voice::{
    error::VoiceError,
    voice_config::VoiceConfig,
    voice_ring_buffer::{VoiceRingBuffer, VoiceSnapshot},
};
pub use world::{
    authority::{
        actor::{Actor, ActorId, Capability, RecipientSet},
        authority_gate::{AllowAll, AuthorityGate, HostOnly},
        owner_table::OwnerTable,
    },
    component::{
        error::ComponentError,
        field_channel::FieldSyncChannel,
        list_channel::ListSyncChannel,
        net_component::{InboundOutcome, NetComponent, OutboundUpdate},
        synced_field::{ComponentLayout, FieldKind, FieldValue, SyncedField},
        synced_state::{SyncedList, SyncedState},
    },
    error::{AuthorityError, SyncError},
    sync::{
        config::SyncConfig,
        delivery::{DeliverySink, Outbox},
        sync_context::SyncContext,
        sync_world::{ReceiveOutcome, SyncWorld, TickReport},
    },
};
pub use wrapping_number::{sequence_greater_than, sequence_less_than, sequence_newer, wrapping_diff};
