use crate::{
    audit::blame_tracker::BlameTracker,
    world::authority::{actor::Actor, authority_gate::AuthorityGate},
    EntityId, Tick,
};

/// Everything a component may consult while applying or producing an
/// update. Built fresh by the tick loop and handed down explicitly.
pub struct SyncContext<'a> {
    tick: Tick,
    gate: &'a dyn AuthorityGate,
    audit: &'a mut BlameTracker,
}

impl<'a> SyncContext<'a> {
    pub fn new(tick: Tick, gate: &'a dyn AuthorityGate, audit: &'a mut BlameTracker) -> Self {
        Self { tick, gate, audit }
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn may_write(&self, actor: &Actor, entity: EntityId) -> bool {
        self.gate.may_write(actor, entity)
    }

    pub fn audit(&mut self) -> &mut BlameTracker {
        self.audit
    }
}
