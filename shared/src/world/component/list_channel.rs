use std::{any::Any, collections::BTreeSet};

use log::{debug, warn};

use crate::{
    audit::blame_tracker::FieldKey,
    messages::chunk::{
        assembled_payload::AssembledPayload, chunk_config::ChunkConfig,
        chunk_splitter::ChunkSplitter,
    },
    world::{
        authority::actor::{Actor, ActorId, RecipientSet},
        component::{
            net_component::{admit_write, InboundOutcome, NetComponent, OutboundUpdate},
            synced_state::SyncedList,
        },
        sync::sync_context::SyncContext,
    },
    ComponentIndex, EntityId, Role,
};

/// Replicates a list of units, splitting it into as many chunks as it needs.
/// Every update carries the whole list under a fresh generation. An observer
/// with an unsent edit keeps its list over the host's until the request goes
/// out.
pub struct ListSyncChannel<S: SyncedList> {
    entity: EntityId,
    component: ComponentIndex,
    role: Role,
    state: S,
    dirty: bool,
    forced: BTreeSet<ActorId>,
    splitter: ChunkSplitter,
}

impl<S: SyncedList> ListSyncChannel<S> {
    pub fn new(entity: EntityId, component: ComponentIndex, role: Role, state: S) -> Self {
        Self {
            entity,
            component,
            role,
            state,
            dirty: role.is_authoritative(),
            forced: BTreeSet::new(),
            splitter: ChunkSplitter::default(),
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Edit the list. Marks the channel dirty and returns true if it changed.
    pub fn mutate(&mut self, edit: impl FnOnce(&mut S)) -> bool {
        let before = self.state.units().to_vec();
        edit(&mut self.state);
        let changed = self.state.units() != before.as_slice();
        self.dirty |= changed;
        changed
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn has_forced_resend(&self, actor: ActorId) -> bool {
        self.forced.contains(&actor)
    }
}

impl<S: SyncedList> NetComponent for ListSyncChannel<S> {
    fn entity(&self) -> EntityId {
        self.entity
    }

    fn component_index(&self) -> ComponentIndex {
        self.component
    }

    fn role(&self) -> Role {
        self.role
    }

    fn set_chunk_config(&mut self, config: &ChunkConfig) {
        self.splitter = ChunkSplitter::new(config.clone());
    }

    fn apply_inbound(
        &mut self,
        ctx: &mut SyncContext,
        actor: &Actor,
        payload: &AssembledPayload,
    ) -> InboundOutcome {
        let units = match payload.read_units::<S::Unit>() {
            Ok(units) => units,
            Err(err) => {
                warn!(
                    "discarding malformed list for entity {} component {}: {}",
                    self.entity.to_u16(),
                    self.component,
                    err
                );
                return InboundOutcome::Malformed;
            }
        };
        if !admit_write(ctx, self.role, self.entity, actor, &mut self.forced) {
            return InboundOutcome::Denied;
        }
        if self.role == Role::Observer && self.dirty {
            debug!(
                "entity {} component {} holds an unsent edit, host list ignored",
                self.entity.to_u16(),
                self.component
            );
            return InboundOutcome::Unchanged;
        }

        let changed = self.state.units() != units.as_slice();
        if changed {
            if self.role.is_authoritative() {
                let key = FieldKey::new(self.entity, self.component, 0);
                ctx.audit().note_request(key, actor.id());
            }
            self.state.set_units(units);
        }

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
        if !self.has_outbound() {
            return None;
        }
        let envelopes = match self
            .splitter
            .split(self.entity, self.component, self.state.units())
        {
            Ok(envelopes) => envelopes,
            Err(err) => {
                // actors owed a resend still get one once the list fits
                warn!(
                    "cannot send list for entity {} component {}: {}",
                    self.entity.to_u16(),
                    self.component,
                    err
                );
                self.dirty = false;
                return None;
            }
        };

        let recipients = if self.dirty {
            self.dirty = false;
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

        debug!(
            "tick {}: entity {} component {} sends {} unit(s) in {} chunk(s)",
            ctx.tick(),
            self.entity.to_u16(),
            self.component,
            self.state.units().len(),
            envelopes.len()
        );
        Some(OutboundUpdate {
            recipients,
            envelopes,
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
