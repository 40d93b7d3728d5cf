use std::collections::HashMap;

use log::{debug, trace};

use crate::{
    messages::chunk::{
        assembled_payload::{AssembledPayload, ChunkPart},
        chunk_config::ChunkConfig,
        error::ChunkError,
        update_envelope::UpdateEnvelope,
    },
    sequence_less_than, wrapping_diff, ActorId, ComponentIndex, EntityId, Generation, Tick,
};

/// Identifies one in-flight update from one sender
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReassemblyKey {
    pub source: ActorId,
    pub entity: EntityId,
    pub component: ComponentIndex,
    pub generation: Generation,
}

type StreamKey = (ActorId, EntityId, ComponentIndex);

impl ReassemblyKey {
    fn stream(&self) -> StreamKey {
        (self.source, self.entity, self.component)
    }
}

/// What happened to an accepted chunk
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReassemblyOutcome {
    /// This chunk completed its update
    Complete(AssembledPayload),
    /// Stored, more chunks are needed
    Pending,
    /// A newer generation has been seen for this stream
    Superseded,
    /// Already stored, or its update already completed
    Duplicate,
    /// The header contradicts the configuration or earlier chunks
    Rejected(ChunkError),
}

struct PendingReassembly {
    parts: Vec<Option<ChunkPart>>,
    received: u16,
    last_activity: Tick,
}

impl PendingReassembly {
    fn new(chunk_count: u16, tick: Tick) -> Self {
        Self {
            parts: vec![None; usize::from(chunk_count)],
            received: 0,
            last_activity: tick,
        }
    }

    fn chunk_count(&self) -> u16 {
        self.parts.len() as u16
    }
}

#[derive(Clone, Copy)]
struct LatestGeneration {
    generation: Generation,
    completed: bool,
}

/// Receiver side of chunked updates.
///
/// Chunks are stored by index until every index of their generation is
/// present, then handed out in index order. A newer generation on the same
/// stream discards older pending ones, and idle entries expire after
/// `timeout_ticks` without a new chunk. Nothing is ever re-requested.
pub struct ChunkReassembler {
    config: ChunkConfig,
    timeout_ticks: u16,
    pending: HashMap<ReassemblyKey, PendingReassembly>,
    latest: HashMap<StreamKey, LatestGeneration>,
}

impl ChunkReassembler {
    pub fn new(config: ChunkConfig, timeout_ticks: u16) -> Self {
        Self {
            config,
            timeout_ticks,
            pending: HashMap::new(),
            latest: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    pub fn accept(
        &mut self,
        source: ActorId,
        envelope: UpdateEnvelope,
        tick: Tick,
    ) -> ReassemblyOutcome {
        if let Err(err) = envelope.validate(&self.config) {
            debug!("rejecting chunk from {:?}: {}", source, err);
            return ReassemblyOutcome::Rejected(err);
        }

        let key = ReassemblyKey {
            source,
            entity: envelope.entity,
            component: envelope.component,
            generation: envelope.generation,
        };
        let stream = key.stream();

        match self.latest.get(&stream).copied() {
            Some(latest) if sequence_less_than(key.generation, latest.generation) => {
                debug!(
                    "dropping superseded generation {} (latest {}) of entity {} component {}",
                    key.generation,
                    latest.generation,
                    key.entity.to_u16(),
                    key.component
                );
                return ReassemblyOutcome::Superseded;
            }
            Some(latest) if latest.generation == key.generation && latest.completed => {
                return ReassemblyOutcome::Duplicate;
            }
            Some(latest) if latest.generation == key.generation => {}
            _ => {
                self.latest.insert(
                    stream,
                    LatestGeneration {
                        generation: key.generation,
                        completed: false,
                    },
                );
                let before = self.pending.len();
                self.pending.retain(|pending_key, _| {
                    pending_key.stream() != stream || pending_key.generation == key.generation
                });
                if self.pending.len() < before {
                    debug!(
                        "generation {} superseded {} pending update(s) for entity {} component {}",
                        key.generation,
                        before - self.pending.len(),
                        key.entity.to_u16(),
                        key.component
                    );
                }
            }
        }

        if envelope.is_single() {
            self.mark_completed(stream);
            return ReassemblyOutcome::Complete(AssembledPayload::from_single_envelope(
                source, envelope,
            ));
        }

        let entry = self
            .pending
            .entry(key)
            .or_insert_with(|| PendingReassembly::new(envelope.chunk_count, tick));

        if entry.chunk_count() != envelope.chunk_count {
            return ReassemblyOutcome::Rejected(ChunkError::InconsistentChunkCount {
                generation: key.generation,
                expected: entry.chunk_count(),
                found: envelope.chunk_count,
            });
        }

        let slot = &mut entry.parts[usize::from(envelope.chunk_index)];
        if slot.is_some() {
            return ReassemblyOutcome::Duplicate;
        }
        *slot = Some(ChunkPart {
            unit_count: envelope.unit_count,
            bytes: envelope.payload,
        });
        entry.received += 1;
        entry.last_activity = tick;

        trace!(
            "stored chunk {}/{} of generation {} for entity {} component {}",
            envelope.chunk_index + 1,
            entry.chunk_count(),
            key.generation,
            key.entity.to_u16(),
            key.component
        );

        if entry.received < entry.chunk_count() {
            return ReassemblyOutcome::Pending;
        }

        let Some(complete) = self.pending.remove(&key) else {
            return ReassemblyOutcome::Pending;
        };
        self.mark_completed(stream);
        let parts: Vec<ChunkPart> = complete.parts.into_iter().flatten().collect();
        ReassemblyOutcome::Complete(AssembledPayload::new(
            source,
            key.entity,
            key.component,
            key.generation,
            parts,
        ))
    }

    fn mark_completed(&mut self, stream: StreamKey) {
        if let Some(latest) = self.latest.get_mut(&stream) {
            latest.completed = true;
        }
    }

    /// Discards entries that have gone more than `timeout_ticks` without a
    /// new chunk. Returns how many were discarded.
    pub fn expire(&mut self, now: Tick) -> usize {
        let timeout = i32::from(self.timeout_ticks);
        let before = self.pending.len();
        self.pending.retain(|key, pending| {
            let idle = i32::from(wrapping_diff(pending.last_activity, now));
            let keep = idle <= timeout;
            if !keep {
                debug!(
                    "expiring generation {} of entity {} component {}: {} idle ticks, {}/{} chunks",
                    key.generation,
                    key.entity.to_u16(),
                    key.component,
                    idle,
                    pending.received,
                    pending.chunk_count()
                );
            }
            keep
        });
        before - self.pending.len()
    }

    pub fn is_pending(&self, key: &ReassemblyKey) -> bool {
        self.pending.contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Forgets everything received from `source`
    pub fn drop_source(&mut self, source: ActorId) {
        self.pending.retain(|key, _| key.source != source);
        self.latest.retain(|(stream_source, _, _), _| *stream_source != source);
    }

    pub fn forget_entity(&mut self, entity: EntityId) {
        self.pending.retain(|key, _| key.entity != entity);
        self.latest.retain(|(_, stream_entity, _), _| *stream_entity != entity);
    }
}
