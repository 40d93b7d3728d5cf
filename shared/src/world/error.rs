use thiserror::Error;

use crate::Role;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorityError {
    #[error("Entity {entity} is already owned by actor {owner}")]
    AlreadyOwned { entity: u16, owner: u32 },
}

/// Errors raised by the `SyncWorld` registry. Protocol failures on inbound
/// traffic never show up here; they are dropped and logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("Entity {entity} already exists")]
    EntityAlreadyExists { entity: u16 },

    #[error("Entity {entity} does not exist")]
    EntityNotFound { entity: u16 },

    #[error("Entity {entity} already has a component at index {component}")]
    ComponentIndexTaken { entity: u16, component: u8 },

    #[error("Component was built for a {found:?} world but this world is {expected:?}")]
    RoleMismatch { expected: Role, found: Role },
}
