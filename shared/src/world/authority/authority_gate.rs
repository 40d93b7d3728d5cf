use crate::{world::authority::actor::Actor, EntityId};

/// Decides whether an inbound write from `actor` may touch `entity`.
///
/// Ownership and selection rules belong to the simulation layer; the sync
/// channels only ever ask this yes/no question. Any
/// `Fn(&Actor, EntityId) -> bool` closure is a gate.
pub trait AuthorityGate {
    fn may_write(&self, actor: &Actor, entity: EntityId) -> bool;
}

impl<F> AuthorityGate for F
where
    F: Fn(&Actor, EntityId) -> bool,
{
    fn may_write(&self, actor: &Actor, entity: EntityId) -> bool {
        self(actor, entity)
    }
}

/// Only the host may write
#[derive(Clone, Copy, Debug, Default)]
pub struct HostOnly;

impl AuthorityGate for HostOnly {
    fn may_write(&self, actor: &Actor, _entity: EntityId) -> bool {
        actor.is_host()
    }
}

/// Everyone may write
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl AuthorityGate for AllowAll {
    fn may_write(&self, _actor: &Actor, _entity: EntityId) -> bool {
        true
    }
}
