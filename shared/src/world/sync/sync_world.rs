use std::collections::{BTreeMap, HashMap, VecDeque};

use log::{debug, trace, warn};

use crate::{
    audit::blame_tracker::{AuditEntry, BlameTracker},
    messages::chunk::{
        assembled_payload::AssembledPayload,
        chunk_reassembler::{ChunkReassembler, ReassemblyKey, ReassemblyOutcome},
        update_envelope::UpdateEnvelope,
    },
    world::{
        authority::{
            actor::{Actor, ActorId},
            authority_gate::AuthorityGate,
        },
        component::net_component::{InboundOutcome, NetComponent},
        error::SyncError,
        sync::{config::SyncConfig, delivery::DeliverySink, sync_context::SyncContext},
    },
    ComponentIndex, EntityId, Role, Tick,
};

/// What `receive` did with one message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// A complete update is queued for the next tick
    Queued,
    /// Stored as part of an incomplete update
    Pending,
    /// Malformed, stale, duplicate or addressed to an unknown entity
    Dropped,
}

/// Counters for one call to `SyncWorld::tick`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub applied: usize,
    pub unchanged: usize,
    pub denied: usize,
    pub malformed: usize,
    /// Inbound updates whose entity or component vanished before the tick
    pub orphaned: usize,
    pub expired: usize,
    pub updates_sent: usize,
    pub messages_sent: usize,
    pub bytes_sent: usize,
    /// Components still owing an update when the byte budget ran out
    pub deferred: usize,
}

struct EntitySlot {
    entity: EntityId,
    components: BTreeMap<ComponentIndex, Box<dyn NetComponent>>,
}

/// One side of a replication link.
///
/// Entities live in arena slots looked up by `EntityId`; components refer
/// back to their entity by id only. Each `tick` first applies every
/// reassembled inbound update, then asks dirty components for outbound
/// updates, rotating the starting point so a tight byte budget is shared.
pub struct SyncWorld {
    role: Role,
    config: SyncConfig,
    gate: Box<dyn AuthorityGate>,
    audit: BlameTracker,
    reassembler: ChunkReassembler,
    slots: Vec<Option<EntitySlot>>,
    slot_index: HashMap<EntityId, usize>,
    free_slots: Vec<usize>,
    inbound: VecDeque<(Actor, AssembledPayload)>,
    cursor: usize,
    tick: Tick,
}

impl SyncWorld {
    pub fn new(role: Role, config: SyncConfig, gate: impl AuthorityGate + 'static) -> Self {
        let reassembler =
            ChunkReassembler::new(config.chunk.clone(), config.reassembly_timeout_ticks);
        let audit = BlameTracker::new(config.audit_interval_ticks);
        Self {
            role,
            config,
            gate: Box::new(gate),
            audit,
            reassembler,
            slots: Vec::new(),
            slot_index: HashMap::new(),
            free_slots: Vec::new(),
            inbound: VecDeque::new(),
            cursor: 0,
            tick: 0,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The tick most recently passed to `tick`
    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    // Entities

    /// # Panics
    ///
    /// Panics if the entity already exists.
    /// Consider using `try_spawn` for non-panicking error handling.
    pub fn spawn(&mut self, entity: EntityId) {
        self.try_spawn(entity).expect("entity already exists");
    }

    pub fn try_spawn(&mut self, entity: EntityId) -> Result<(), SyncError> {
        if self.slot_index.contains_key(&entity) {
            return Err(SyncError::EntityAlreadyExists {
                entity: entity.to_u16(),
            });
        }

        let slot = EntitySlot {
            entity,
            components: BTreeMap::new(),
        };
        let index = match self.free_slots.pop() {
            Some(index) => {
                self.slots[index] = Some(slot);
                index
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };
        self.slot_index.insert(entity, index);
        Ok(())
    }

    /// Removes the entity with its components, queued updates and partial
    /// reassemblies. Returns false if it did not exist.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        let Some(index) = self.slot_index.remove(&entity) else {
            return false;
        };
        self.slots[index] = None;
        self.free_slots.push(index);

        self.inbound.retain(|(_, payload)| payload.entity != entity);
        self.reassembler.forget_entity(entity);
        self.audit.forget_entity(entity);
        true
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.slot_index.contains_key(&entity)
    }

    pub fn entity_count(&self) -> usize {
        self.slot_index.len()
    }

    // Components

    /// # Panics
    ///
    /// Panics if the component cannot be inserted.
    /// Consider using `try_insert_component` for non-panicking error handling.
    pub fn insert_component<C: NetComponent>(&mut self, component: C) {
        self.try_insert_component(component)
            .expect("cannot insert component");
    }

    pub fn try_insert_component<C: NetComponent>(
        &mut self,
        mut component: C,
    ) -> Result<(), SyncError> {
        if component.role() != self.role {
            return Err(SyncError::RoleMismatch {
                expected: self.role,
                found: component.role(),
            });
        }

        let entity = component.entity();
        let index = component.component_index();
        component.set_chunk_config(&self.config.chunk);

        let slot = self.slot_mut(entity)?;
        if slot.components.contains_key(&index) {
            return Err(SyncError::ComponentIndexTaken {
                entity: entity.to_u16(),
                component: index,
            });
        }
        slot.components.insert(index, Box::new(component));
        Ok(())
    }

    pub fn remove_component(&mut self, entity: EntityId, index: ComponentIndex) -> bool {
        let Ok(slot) = self.slot_mut(entity) else {
            return false;
        };
        let removed = slot.components.remove(&index).is_some();
        if removed {
            self.inbound
                .retain(|(_, payload)| !(payload.entity == entity && payload.component == index));
        }
        removed
    }

    pub fn component<C: NetComponent>(
        &self,
        entity: EntityId,
        index: ComponentIndex,
    ) -> Option<&C> {
        let slot = self.slot(entity)?;
        slot.components.get(&index)?.as_any().downcast_ref::<C>()
    }

    pub fn component_mut<C: NetComponent>(
        &mut self,
        entity: EntityId,
        index: ComponentIndex,
    ) -> Option<&mut C> {
        let slot = self.slot_mut(entity).ok()?;
        slot.components
            .get_mut(&index)?
            .as_any_mut()
            .downcast_mut::<C>()
    }

    fn slot(&self, entity: EntityId) -> Option<&EntitySlot> {
        let index = *self.slot_index.get(&entity)?;
        self.slots.get(index)?.as_ref()
    }

    fn slot_mut(&mut self, entity: EntityId) -> Result<&mut EntitySlot, SyncError> {
        let not_found = SyncError::EntityNotFound {
            entity: entity.to_u16(),
        };
        let Some(index) = self.slot_index.get(&entity).copied() else {
            return Err(not_found);
        };
        self.slots
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or(not_found)
    }

    // Inbound

    /// Decodes one message from `actor` and feeds it to reassembly. Complete
    /// updates are applied on the next `tick`.
    pub fn receive(&mut self, actor: &Actor, bytes: &[u8]) -> ReceiveOutcome {
        let envelope = match UpdateEnvelope::from_bytes(bytes, &self.config.chunk) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(
                    "dropping malformed message from actor {}: {}",
                    actor.id().to_u32(),
                    err
                );
                return ReceiveOutcome::Dropped;
            }
        };
        self.receive_envelope(actor, envelope)
    }

    pub fn receive_envelope(&mut self, actor: &Actor, envelope: UpdateEnvelope) -> ReceiveOutcome {
        if !self.contains(envelope.entity) {
            debug!(
                "dropping update for unknown entity {} from actor {}",
                envelope.entity.to_u16(),
                actor.id().to_u32()
            );
            return ReceiveOutcome::Dropped;
        }

        match self.reassembler.accept(actor.id(), envelope, self.tick) {
            ReassemblyOutcome::Complete(payload) => {
                self.inbound.push_back((actor.clone(), payload));
                ReceiveOutcome::Queued
            }
            ReassemblyOutcome::Pending => ReceiveOutcome::Pending,
            ReassemblyOutcome::Superseded | ReassemblyOutcome::Duplicate => {
                ReceiveOutcome::Dropped
            }
            ReassemblyOutcome::Rejected(err) => {
                warn!(
                    "rejecting chunk from actor {}: {}",
                    actor.id().to_u32(),
                    err
                );
                ReceiveOutcome::Dropped
            }
        }
    }

    pub fn queued_inbound(&self) -> usize {
        self.inbound.len()
    }

    pub fn is_pending(&self, key: &ReassemblyKey) -> bool {
        self.reassembler.is_pending(key)
    }

    pub fn pending_reassembly_count(&self) -> usize {
        self.reassembler.pending_count()
    }

    /// Discards everything queued for or owed to `actor`
    pub fn disconnect(&mut self, actor: ActorId) {
        self.inbound.retain(|(sender, _)| sender.id() != actor);
        self.reassembler.drop_source(actor);
        for slot in self.slots.iter_mut().flatten() {
            for component in slot.components.values_mut() {
                component.drop_actor(actor);
            }
        }
        debug!("actor {} disconnected", actor.to_u32());
    }

    // Tick

    /// Runs one simulation tick: apply inbound, expire stale reassemblies,
    /// then produce and deliver outbound updates within the byte budget.
    pub fn tick(&mut self, tick: Tick, sink: &mut dyn DeliverySink) -> TickReport {
        self.tick = tick;
        let mut report = TickReport::default();

        self.apply_inbound(&mut report);
        report.expired = self.reassembler.expire(tick);
        self.produce_outbound(sink, &mut report);

        report
    }

    fn apply_inbound(&mut self, report: &mut TickReport) {
        let mut ctx = SyncContext::new(self.tick, &*self.gate, &mut self.audit);

        while let Some((actor, payload)) = self.inbound.pop_front() {
            let component = self
                .slot_index
                .get(&payload.entity)
                .and_then(|index| self.slots.get_mut(*index))
                .and_then(Option::as_mut)
                .and_then(|slot| slot.components.get_mut(&payload.component));
            let Some(component) = component else {
                debug!(
                    "no component {} on entity {} for update from actor {}",
                    payload.component,
                    payload.entity.to_u16(),
                    actor.id().to_u32()
                );
                report.orphaned += 1;
                continue;
            };

            match component.apply_inbound(&mut ctx, &actor, &payload) {
                InboundOutcome::Applied => report.applied += 1,
                InboundOutcome::Unchanged => report.unchanged += 1,
                InboundOutcome::Denied => report.denied += 1,
                InboundOutcome::Malformed => report.malformed += 1,
            }
        }
    }

    fn produce_outbound(&mut self, sink: &mut dyn DeliverySink, report: &mut TickReport) {
        let order: Vec<(usize, ComponentIndex)> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|slot| (index, slot)))
            .flat_map(|(index, slot)| slot.components.keys().map(move |key| (index, *key)))
            .collect();
        if order.is_empty() {
            return;
        }

        let budget = self.config.max_bytes_per_tick;
        let start = self.cursor % order.len();
        let mut ctx = SyncContext::new(self.tick, &*self.gate, &mut self.audit);

        for step in 0..order.len() {
            let position = (start + step) % order.len();
            let (slot_index, component_index) = order[position];
            let Some(component) = self.slots[slot_index]
                .as_mut()
                .and_then(|slot| slot.components.get_mut(&component_index))
            else {
                continue;
            };
            if !component.has_outbound() {
                continue;
            }

            // always let at least one update through
            if report.updates_sent > 0 && report.bytes_sent >= budget {
                self.cursor = position;
                report.deferred = (step..order.len())
                    .map(|rest| order[(start + rest) % order.len()])
                    .filter(|(slot_index, component_index)| {
                        self.slots[*slot_index]
                            .as_ref()
                            .and_then(|slot| slot.components.get(component_index))
                            .is_some_and(|component| component.has_outbound())
                    })
                    .count();
                trace!(
                    "tick {}: byte budget spent, deferring {} component(s)",
                    self.tick,
                    report.deferred
                );
                return;
            }

            let Some(update) = component.produce_outbound(&mut ctx) else {
                continue;
            };
            report.updates_sent += 1;
            for envelope in update.envelopes {
                match envelope.to_bytes(&self.config.chunk) {
                    Ok(bytes) => {
                        report.messages_sent += 1;
                        report.bytes_sent += bytes.len();
                        sink.deliver(&update.recipients, bytes);
                    }
                    Err(err) => warn!(
                        "cannot encode update for entity {} component {}: {}",
                        envelope.entity.to_u16(),
                        envelope.component,
                        err
                    ),
                }
            }
        }
    }

    // Audit

    pub fn audit(&self) -> &BlameTracker {
        &self.audit
    }

    pub fn drain_audit_entries(&mut self) -> Vec<AuditEntry> {
        self.audit.drain_entries()
    }
}
