use tether_serde::{BitReader, Serde, SerdeErr};

use crate::{
    messages::chunk::update_envelope::UpdateEnvelope, ActorId, ComponentIndex, EntityId,
    Generation,
};

/// The units carried by one chunk, still encoded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkPart {
    pub unit_count: u16,
    pub bytes: Vec<u8>,
}

/// A complete update, with its chunks in index order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssembledPayload {
    pub source: ActorId,
    pub entity: EntityId,
    pub component: ComponentIndex,
    pub generation: Generation,
    parts: Vec<ChunkPart>,
}

impl AssembledPayload {
    pub fn new(
        source: ActorId,
        entity: EntityId,
        component: ComponentIndex,
        generation: Generation,
        parts: Vec<ChunkPart>,
    ) -> Self {
        Self {
            source,
            entity,
            component,
            generation,
            parts,
        }
    }

    /// Wraps one packed record, as produced by a field channel
    pub fn single(
        source: ActorId,
        entity: EntityId,
        component: ComponentIndex,
        generation: Generation,
        bytes: Vec<u8>,
    ) -> Self {
        Self::new(
            source,
            entity,
            component,
            generation,
            vec![ChunkPart {
                unit_count: 1,
                bytes,
            }],
        )
    }

    pub(crate) fn from_single_envelope(source: ActorId, envelope: UpdateEnvelope) -> Self {
        Self::new(
            source,
            envelope.entity,
            envelope.component,
            envelope.generation,
            vec![ChunkPart {
                unit_count: envelope.unit_count,
                bytes: envelope.payload,
            }],
        )
    }

    pub fn parts(&self) -> &[ChunkPart] {
        &self.parts
    }

    pub fn unit_count(&self) -> usize {
        self.parts.iter().map(|part| usize::from(part.unit_count)).sum()
    }

    /// The bytes of a one-chunk payload, `None` if it spans several chunks
    pub fn single_part(&self) -> Option<&[u8]> {
        match self.parts.as_slice() {
            [part] => Some(&part.bytes),
            _ => None,
        }
    }

    /// Decodes every unit, chunk by chunk in index order. Each chunk must
    /// hold exactly its declared unit count.
    pub fn read_units<U: Serde>(&self) -> Result<Vec<U>, SerdeErr> {
        let mut units = Vec::with_capacity(self.unit_count());
        for part in &self.parts {
            let mut reader = BitReader::new(&part.bytes);
            for _ in 0..part.unit_count {
                units.push(U::de(&mut reader)?);
            }
            reader.finish()?;
        }
        Ok(units)
    }
}
