use std::collections::HashMap;

use crate::{
    world::{
        authority::{actor::Actor, actor::ActorId, authority_gate::AuthorityGate},
        error::AuthorityError,
    },
    EntityId,
};

/// A minimal gate: the host may always write, and each entity may have one
/// remote owner who may write it too.
#[derive(Default)]
pub struct OwnerTable {
    owners: HashMap<EntityId, ActorId>,
}

impl OwnerTable {
    pub fn new() -> Self {
        Self {
            owners: HashMap::new(),
        }
    }

    /// Give `actor` write access to `entity`
    ///
    /// # Panics
    ///
    /// Panics if the entity already has an owner.
    /// Consider using `try_assign` for non-panicking error handling.
    pub fn assign(&mut self, entity: EntityId, actor: ActorId) {
        self.try_assign(entity, actor)
            .expect("Entity cannot be assigned to more than one owner!")
    }

    /// Give `actor` write access to `entity`
    ///
    /// Returns an error if the entity already has an owner.
    pub fn try_assign(&mut self, entity: EntityId, actor: ActorId) -> Result<(), AuthorityError> {
        if let Some(owner) = self.owners.get(&entity) {
            return Err(AuthorityError::AlreadyOwned {
                entity: entity.to_u16(),
                owner: owner.to_u32(),
            });
        }
        self.owners.insert(entity, actor);
        Ok(())
    }

    pub fn release(&mut self, entity: EntityId) -> Option<ActorId> {
        self.owners.remove(&entity)
    }

    /// Drops every entity owned by `actor`, returning how many were released
    pub fn release_actor(&mut self, actor: ActorId) -> usize {
        let before = self.owners.len();
        self.owners.retain(|_, owner| *owner != actor);
        before - self.owners.len()
    }

    pub fn owner(&self, entity: EntityId) -> Option<ActorId> {
        self.owners.get(&entity).copied()
    }
}

impl AuthorityGate for OwnerTable {
    fn may_write(&self, actor: &Actor, entity: EntityId) -> bool {
        actor.is_host() || self.owner(entity) == Some(actor.id())
    }
}
