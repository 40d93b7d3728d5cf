use std::{any::Any, collections::BTreeSet};

use log::debug;

use crate::{
    messages::chunk::{
        assembled_payload::AssembledPayload, chunk_config::ChunkConfig,
        update_envelope::UpdateEnvelope,
    },
    world::{
        authority::actor::{Actor, ActorId, RecipientSet},
        sync::sync_context::SyncContext,
    },
    ComponentIndex, EntityId, Role,
};

/// Result of handing a reassembled payload to a component
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InboundOutcome {
    /// The write changed the live state
    Applied,
    /// The write was permitted but matched the live state
    Unchanged,
    /// The sender may not write here. An authoritative component has
    /// scheduled a forced resend to it.
    Denied,
    /// The payload does not decode against the component's layout
    Malformed,
}

/// What a component wants sent this tick
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundUpdate {
    pub recipients: RecipientSet,
    pub envelopes: Vec<UpdateEnvelope>,
}

/// One replicated component of one entity.
///
/// Implemented by `FieldSyncChannel` and `ListSyncChannel`; a `SyncWorld`
/// holds them as trait objects and drives them once per tick, inbound first.
pub trait NetComponent: Any {
    fn entity(&self) -> EntityId;

    fn component_index(&self) -> ComponentIndex;

    fn role(&self) -> Role;

    /// Called once when the component joins a world
    fn set_chunk_config(&mut self, _config: &ChunkConfig) {}

    fn apply_inbound(
        &mut self,
        ctx: &mut SyncContext,
        actor: &Actor,
        payload: &AssembledPayload,
    ) -> InboundOutcome;

    /// Encodes the live state if it is dirty or owed to someone. Clears the
    /// pending flags even if the caller later fails to deliver.
    fn produce_outbound(&mut self, ctx: &mut SyncContext) -> Option<OutboundUpdate>;

    fn has_outbound(&self) -> bool;

    /// Forget anything owed to a disconnected actor
    fn drop_actor(&mut self, actor: ActorId);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// The write check shared by every channel. An authoritative component asks
/// the gate and owes a denied actor its current state; an observer only
/// takes writes from the host.
pub(crate) fn admit_write(
    ctx: &SyncContext,
    role: Role,
    entity: EntityId,
    actor: &Actor,
    forced: &mut BTreeSet<ActorId>,
) -> bool {
    match role {
        Role::Authoritative => {
            if ctx.may_write(actor, entity) {
                return true;
            }
            debug!(
                "actor {} may not write entity {}, forcing resend",
                actor.id().to_u32(),
                entity.to_u16()
            );
            forced.insert(actor.id());
            false
        }
        Role::Observer => {
            if actor.is_host() {
                return true;
            }
            debug!(
                "observer copy of entity {} ignored write from actor {}",
                entity.to_u16(),
                actor.id().to_u32()
            );
            false
        }
    }
}
