use tether_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

pub type Tick = u16;
pub type Generation = u16;
pub type SequenceId = u16;
pub type ComponentIndex = u8;

/// Network-visible identity of a replicated entity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u16);

impl EntityId {
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    pub fn to_u16(self) -> u16 {
        self.0
    }
}

impl Serde for EntityId {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self(u16::de(reader)?))
    }

    fn bit_length(&self) -> u32 {
        u16::const_bit_length()
    }
}

/// Which half of the replication contract this process plays
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Owns the true value, gates inbound writes and corrects stale peers
    Authoritative,
    /// Mirrors the authoritative value and forwards its own local edits
    Observer,
}

impl Role {
    pub fn is_authoritative(self) -> bool {
        matches!(self, Role::Authoritative)
    }
}
