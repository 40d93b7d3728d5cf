//! Attributes suspicious state transitions to whoever last asked for them.
//! Purely observational: nothing here feeds back into replication.

use std::collections::HashMap;

use log::warn;

use crate::{wrapping_diff, ActorId, ComponentIndex, EntityId, Tick};

pub const AUDIT_LOG_TARGET: &str = "tether::audit";

/// Addresses one scalar of one component
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldKey {
    pub entity: EntityId,
    pub component: ComponentIndex,
    pub field: u8,
}

impl FieldKey {
    pub fn new(entity: EntityId, component: ComponentIndex, field: u8) -> Self {
        Self {
            entity,
            component,
            field,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditEntry {
    pub tick: Tick,
    pub field: FieldKey,
    /// `None` when nobody has requested a change to this field yet
    pub actor: Option<ActorId>,
    pub message: String,
}

pub struct BlameTracker {
    min_interval_ticks: u16,
    last_requester: HashMap<FieldKey, ActorId>,
    last_logged: HashMap<FieldKey, Tick>,
    entries: Vec<AuditEntry>,
    suppressed: u64,
}

impl BlameTracker {
    pub fn new(min_interval_ticks: u16) -> Self {
        Self {
            min_interval_ticks,
            last_requester: HashMap::new(),
            last_logged: HashMap::new(),
            entries: Vec::new(),
            suppressed: 0,
        }
    }

    pub fn note_request(&mut self, field: FieldKey, actor: ActorId) {
        self.last_requester.insert(field, actor);
    }

    pub fn blame(&self, field: &FieldKey) -> Option<ActorId> {
        self.last_requester.get(field).copied()
    }

    /// Logs `message` against the most recent requester of `field`, unless
    /// that field was already logged less than `min_interval_ticks` ago.
    /// Returns whether an entry was emitted.
    pub fn record(&mut self, tick: Tick, field: FieldKey, message: impl Into<String>) -> bool {
        if let Some(last) = self.last_logged.get(&field) {
            let elapsed = i32::from(wrapping_diff(*last, tick));
            if elapsed >= 0 && elapsed < i32::from(self.min_interval_ticks) {
                self.suppressed += 1;
                return false;
            }
        }

        let actor = self.blame(&field);
        let message = message.into();
        warn!(
            target: AUDIT_LOG_TARGET,
            "entity {} component {} field {}: {} (requested by {:?})",
            field.entity.to_u16(),
            field.component,
            field.field,
            message,
            actor
        );

        self.last_logged.insert(field, tick);
        self.entries.push(AuditEntry {
            tick,
            field,
            actor,
            message,
        });
        true
    }

    pub fn drain_entries(&mut self) -> Vec<AuditEntry> {
        std::mem::take(&mut self.entries)
    }

    /// Entries swallowed by rate limiting since creation
    pub fn suppressed_count(&self) -> u64 {
        self.suppressed
    }

    pub fn forget_entity(&mut self, entity: EntityId) {
        self.last_requester.retain(|key, _| key.entity != entity);
        self.last_logged.retain(|key, _| key.entity != entity);
    }
}
