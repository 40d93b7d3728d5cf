use std::collections::BTreeSet;

/// Identity of a participant. `ActorId::HOST` is reserved for the
/// authoritative host; remote participants use any other value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u32);

impl ActorId {
    pub const HOST: ActorId = ActorId(0);

    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn to_u32(self) -> u32 {
        self.0
    }

    pub fn is_host(self) -> bool {
        self == Self::HOST
    }
}

/// Opaque permission reference, only interpreted by an `AuthorityGate`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Capability(u64);

impl Capability {
    pub fn new(token: u64) -> Self {
        Self(token)
    }

    pub fn token(self) -> u64 {
        self.0
    }
}

/// A participant attempting a mutation
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Actor {
    id: ActorId,
    capability: Option<Capability>,
}

impl Actor {
    pub fn host() -> Self {
        Self {
            id: ActorId::HOST,
            capability: None,
        }
    }

    pub fn remote(id: ActorId) -> Self {
        Self {
            id,
            capability: None,
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capability = Some(capability);
        self
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn capability(&self) -> Option<Capability> {
        self.capability
    }

    pub fn is_host(&self) -> bool {
        self.id.is_host()
    }
}

/// Who an outbound update is addressed to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecipientSet {
    /// Every connected peer
    All,
    /// Only these peers
    Actors(BTreeSet<ActorId>),
}

impl RecipientSet {
    pub fn single(actor: ActorId) -> Self {
        let mut set = BTreeSet::new();
        set.insert(actor);
        RecipientSet::Actors(set)
    }

    pub fn contains(&self, actor: ActorId) -> bool {
        match self {
            RecipientSet::All => true,
            RecipientSet::Actors(set) => set.contains(&actor),
        }
    }
}
