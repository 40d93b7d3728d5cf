use std::{any::Any, collections::BTreeSet};

use log::{trace, warn};
use tether_serde::{BitReader, BitWriter};

use crate::{
    audit::blame_tracker::FieldKey,
    messages::chunk::{assembled_payload::AssembledPayload, chunk_splitter::ChunkSplitter},
    world::{
        authority::actor::{Actor, ActorId, RecipientSet},
        component::{
            net_component::{admit_write, InboundOutcome, NetComponent, OutboundUpdate},
            synced_field::{ComponentLayout, FieldValue},
            synced_state::SyncedState,
        },
        sync::sync_context::SyncContext,
    },
    ComponentIndex, EntityId, Role,
};

/// Replicates a component of bounded scalars, packed into a single record.
///
/// An authoritative channel starts dirty so its first tick publishes the
/// initial state. An observer channel sends its own edits to the host as
/// requests and adopts whatever the host sends back, except for fields it
/// has edited and not yet sent.
pub struct FieldSyncChannel<S: SyncedState> {
    entity: EntityId,
    component: ComponentIndex,
    role: Role,
    layout: ComponentLayout,
    state: S,
    dirty: bool,
    // observer fields edited locally since the last request
    edited: BTreeSet<usize>,
    forced: BTreeSet<ActorId>,
    splitter: ChunkSplitter,
}

impl<S: SyncedState> FieldSyncChannel<S> {
    pub fn new(entity: EntityId, component: ComponentIndex, role: Role, state: S) -> Self {
        Self {
            entity,
            component,
            role,
            layout: S::layout(),
            state,
            dirty: role.is_authoritative(),
            edited: BTreeSet::new(),
            forced: BTreeSet::new(),
            splitter: ChunkSplitter::default(),
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn layout(&self) -> &ComponentLayout {
        &self.layout
    }

    /// Edit the live state. Marks the channel dirty if any field changed and
    /// returns whether one did. On an observer the edited fields are snapped
    /// to their quantized values, matching what the host will see.
    pub fn mutate(&mut self, edit: impl FnOnce(&mut S)) -> bool {
        let before = self.values();
        edit(&mut self.state);

        let mut changed = false;
        for (index, old) in before.into_iter().enumerate() {
            let mut value = self.state.field(index);
            if value == old {
                continue;
            }
            if self.role == Role::Observer {
                value = self.layout.fields()[index].quantize(value);
                self.state.set_field(index, value);
                self.edited.insert(index);
            }
            changed = true;
        }

        self.dirty |= changed;
        changed
    }

    /// Schedule a broadcast for a change made outside `mutate`
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn has_forced_resend(&self, actor: ActorId) -> bool {
        self.forced.contains(&actor)
    }

    /// Whether an observer holds a local edit of this field that the host
    /// has not been sent yet
    pub fn has_unsent_edit(&self, index: usize) -> bool {
        self.edited.contains(&index)
    }

    fn values(&self) -> Vec<FieldValue> {
        (0..self.layout.len())
            .map(|index| self.state.field(index))
            .collect()
    }

    fn decode(&self, payload: &AssembledPayload) -> Option<Vec<FieldValue>> {
        let Some(bytes) = payload.single_part() else {
            warn!(
                "field update for entity {} component {} spans {} chunks",
                self.entity.to_u16(),
                self.component,
                payload.parts().len()
            );
            return None;
        };

        let mut reader = BitReader::new(bytes);
        let decoded = self
            .layout
            .read(&mut reader)
            .and_then(|values| reader.finish().map(|_| values));
        match decoded {
            Ok(values) => Some(values),
            Err(err) => {
                warn!(
                    "discarding malformed update for entity {} component {}: {}",
                    self.entity.to_u16(),
                    self.component,
                    err
                );
                None
            }
        }
    }
}

impl<S: SyncedState> NetComponent for FieldSyncChannel<S> {
    fn entity(&self) -> EntityId {
        self.entity
    }

    fn component_index(&self) -> ComponentIndex {
        self.component
    }

    fn role(&self) -> Role {
        self.role
    }

    fn apply_inbound(
        &mut self,
        ctx: &mut SyncContext,
        actor: &Actor,
        payload: &AssembledPayload,
    ) -> InboundOutcome {
        let Some(values) = self.decode(payload) else {
            return InboundOutcome::Malformed;
        };
        if !admit_write(ctx, self.role, self.entity, actor, &mut self.forced) {
            return InboundOutcome::Denied;
        }

        let tick = ctx.tick();
        let mut changed = false;
        for (index, value) in values.into_iter().enumerate() {
            if self.edited.contains(&index) {
                continue;
            }
            let old = self.state.field(index);
            if old == value {
                continue;
            }
            changed = true;

            if self.role.is_authoritative() {
                let key = FieldKey::new(self.entity, self.component, index as u8);
                ctx.audit().note_request(key, actor.id());
                if let Some(message) = S::regression(index, old, value) {
                    ctx.audit().record(tick, key, message);
                }
            }
            self.state.set_field(index, value);
        }

        // an observer's pending request survives the host's copy
        if self.role.is_authoritative() {
            self.dirty |= changed;
        }

        if changed {
            InboundOutcome::Applied
        } else {
            InboundOutcome::Unchanged
        }
    }

    fn produce_outbound(&mut self, ctx: &mut SyncContext) -> Option<OutboundUpdate> {
        let recipients = if self.dirty {
            self.dirty = false;
            self.edited.clear();
            self.forced.clear();
            match self.role {
                Role::Authoritative => RecipientSet::All,
                Role::Observer => RecipientSet::single(ActorId::HOST),
            }
        } else if !self.forced.is_empty() {
            RecipientSet::Actors(std::mem::take(&mut self.forced))
        } else {
            return None;
        };

        let mut writer = BitWriter::with_capacity(self.layout.byte_length());
        if let Err(err) = self.layout.write(&mut writer, &self.values()) {
            warn!(
                "cannot encode entity {} component {}: {}",
                self.entity.to_u16(),
                self.component,
                err
            );
            return None;
        }

        let envelope = self
            .splitter
            .single(self.entity, self.component, writer.to_bytes());
        trace!(
            "tick {}: entity {} component {} generation {} to {:?}",
            ctx.tick(),
            self.entity.to_u16(),
            self.component,
            envelope.generation,
            recipients
        );
        Some(OutboundUpdate {
            recipients,
            envelopes: vec![envelope],
        })
    }

    fn has_outbound(&self) -> bool {
        self.dirty || !self.forced.is_empty()
    }

    fn drop_actor(&mut self, actor: ActorId) {
        self.forced.remove(&actor);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
