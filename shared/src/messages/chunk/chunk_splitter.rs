use log::trace;

use tether_serde::{BitWriter, Serde};

use crate::{
    messages::chunk::{
        chunk_config::ChunkConfig, error::ChunkError, update_envelope::UpdateEnvelope,
    },
    ComponentIndex, EntityId, Generation,
};

/// Source side of chunked updates for one entity/component.
///
/// Every logical update takes a fresh generation, whether it needs one
/// chunk or many, so a receiver never mixes chunks of two updates.
pub struct ChunkSplitter {
    config: ChunkConfig,
    generation: Generation,
}

impl ChunkSplitter {
    pub fn new(config: ChunkConfig) -> Self {
        Self {
            config,
            generation: 0,
        }
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Generation of the most recently produced update
    pub fn generation(&self) -> Generation {
        self.generation
    }

    fn next_generation(&mut self) -> Generation {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Splits `units` into `ceil(N / C)` envelopes (one envelope for an
    /// empty list), chunk `i` carrying units `[i*C, i*C + unitCount)`.
    pub fn split<U: Serde>(
        &mut self,
        entity: EntityId,
        component: ComponentIndex,
        units: &[U],
    ) -> Result<Vec<UpdateEnvelope>, ChunkError> {
        if units.len() > self.config.max_units as usize {
            return Err(ChunkError::TooManyUnits {
                count: units.len(),
                max: self.config.max_units,
            });
        }

        let capacity = usize::from(self.config.units_per_chunk.max(1));
        let chunk_count = self.config.chunk_count_for(units.len());
        let generation = self.next_generation();

        let mut envelopes = Vec::with_capacity(chunk_count);
        for chunk_index in 0..chunk_count {
            let start = chunk_index * capacity;
            let end = (start + capacity).min(units.len());
            let slice = &units[start..end];

            let mut writer = BitWriter::new();
            for unit in slice {
                unit.ser(&mut writer);
            }

            envelopes.push(UpdateEnvelope {
                entity,
                component,
                generation,
                chunk_index: chunk_index as u16,
                chunk_count: chunk_count as u16,
                unit_count: slice.len() as u16,
                payload: writer.to_bytes(),
            });
        }

        trace!(
            "split {} units of entity {} component {} into {} chunk(s), generation {}",
            units.len(),
            entity.to_u16(),
            component,
            chunk_count,
            generation
        );
        Ok(envelopes)
    }

    /// Wraps an already packed record as a one-chunk update
    pub fn single(
        &mut self,
        entity: EntityId,
        component: ComponentIndex,
        payload: Vec<u8>,
    ) -> UpdateEnvelope {
        UpdateEnvelope {
            entity,
            component,
            generation: self.next_generation(),
            chunk_index: 0,
            chunk_count: 1,
            unit_count: 1,
            payload,
        }
    }
}

impl Default for ChunkSplitter {
    fn default() -> Self {
        Self::new(ChunkConfig::default())
    }
}
