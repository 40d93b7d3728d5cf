use tether_serde::{BitCounter, BitReader, BitWrite, BitWriter, Serde};

use crate::{
    messages::chunk::{chunk_config::ChunkConfig, error::ChunkError},
    ComponentIndex, EntityId, Generation,
};

/// Largest payload one envelope can describe with its 16-bit length field
pub const MAX_ENVELOPE_PAYLOAD_BYTES: usize = u16::MAX as usize;

/// One message of a (possibly chunked) component update.
///
/// `chunk_index` and `chunk_count - 1` are ranged integers sized by
/// `ChunkConfig::chunk_index_bits`, and `unit_count` by
/// `ChunkConfig::unit_count_bits`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateEnvelope {
    pub entity: EntityId,
    pub component: ComponentIndex,
    pub generation: Generation,
    pub chunk_index: u16,
    pub chunk_count: u16,
    pub unit_count: u16,
    pub payload: Vec<u8>,
}

impl UpdateEnvelope {
    pub fn is_single(&self) -> bool {
        self.chunk_count == 1
    }

    /// Checks the header against the bounds `config` allows
    pub fn validate(&self, config: &ChunkConfig) -> Result<(), ChunkError> {
        let max_chunks = config.max_chunk_count();
        if self.chunk_count == 0 || self.chunk_count > max_chunks {
            return Err(ChunkError::ChunkCountOutOfRange {
                chunk_count: self.chunk_count,
                max: max_chunks,
            });
        }
        if self.chunk_index >= self.chunk_count {
            return Err(ChunkError::ChunkIndexOutOfRange {
                chunk_index: self.chunk_index,
                chunk_count: self.chunk_count,
            });
        }
        if self.unit_count > config.units_per_chunk.max(1) {
            return Err(ChunkError::UnitCountOutOfRange {
                unit_count: self.unit_count,
                max: config.units_per_chunk.max(1),
            });
        }
        if self.payload.len() > MAX_ENVELOPE_PAYLOAD_BYTES {
            return Err(ChunkError::PayloadTooLarge {
                len: self.payload.len(),
                max: MAX_ENVELOPE_PAYLOAD_BYTES,
            });
        }
        Ok(())
    }

    pub fn write(
        &self,
        writer: &mut dyn BitWrite,
        config: &ChunkConfig,
    ) -> Result<(), ChunkError> {
        self.validate(config)?;
        self.write_fields(writer, config);
        Ok(())
    }

    /// Size of this envelope on the wire, header included
    pub fn bit_length(&self, config: &ChunkConfig) -> u32 {
        let mut counter = BitCounter::new();
        self.write_fields(&mut counter, config);
        counter.bits_needed()
    }

    pub fn to_bytes(&self, config: &ChunkConfig) -> Result<Vec<u8>, ChunkError> {
        self.validate(config)?;
        let mut writer = BitWriter::with_capacity(self.bit_length(config).div_ceil(8) as usize);
        self.write_fields(&mut writer, config);
        Ok(writer.to_bytes())
    }

    fn write_fields(&self, writer: &mut dyn BitWrite, config: &ChunkConfig) {
        let index_bits = config.chunk_index_bits();
        self.entity.ser(writer);
        self.component.ser(writer);
        self.generation.ser(writer);
        writer.write_bits(u64::from(self.chunk_index), index_bits);
        writer.write_bits(u64::from(self.chunk_count - 1), index_bits);
        writer.write_bits(u64::from(self.unit_count), config.unit_count_bits());
        (self.payload.len() as u16).ser(writer);
        writer.write_bytes(&self.payload);
    }

    pub fn read(reader: &mut BitReader, config: &ChunkConfig) -> Result<Self, ChunkError> {
        let index_bits = config.chunk_index_bits();
        let entity = EntityId::de(reader)?;
        let component = ComponentIndex::de(reader)?;
        let generation = Generation::de(reader)?;
        let chunk_index = reader.read_bits(index_bits)? as u16;
        let chunk_count = (reader.read_bits(index_bits)? as u16).saturating_add(1);
        let unit_count = reader.read_bits(config.unit_count_bits())? as u16;
        let payload_len = u16::de(reader)?;
        let payload = reader.read_bytes(usize::from(payload_len))?;

        let envelope = Self {
            entity,
            component,
            generation,
            chunk_index,
            chunk_count,
            unit_count,
            payload,
        };
        envelope.validate(config)?;
        Ok(envelope)
    }

    /// Decodes a whole message, rejecting trailing bytes
    pub fn from_bytes(bytes: &[u8], config: &ChunkConfig) -> Result<Self, ChunkError> {
        let mut reader = BitReader::new(bytes);
        let envelope = Self::read(&mut reader, config)?;
        reader.finish()?;
        Ok(envelope)
    }
}
