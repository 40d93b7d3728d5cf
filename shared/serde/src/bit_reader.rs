use crate::error::SerdeErr;

/// Reads a stream produced by [`BitWriter`](crate::BitWriter)
pub struct BitReader<'b> {
    buffer: &'b [u8],
    bit_index: usize,
}

impl<'b> BitReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            bit_index: 0,
        }
    }

    pub fn bits_read(&self) -> usize {
        self.bit_index
    }

    pub fn remaining_bits(&self) -> usize {
        (self.buffer.len() * 8).saturating_sub(self.bit_index)
    }

    fn ensure(&self, needed: u32) -> Result<(), SerdeErr> {
        if self.remaining_bits() < needed as usize {
            return Err(SerdeErr::UnexpectedEnd {
                offset: self.bit_index,
                needed,
            });
        }
        Ok(())
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        self.ensure(1)?;
        let byte = self.buffer[self.bit_index / 8];
        let bit = (byte >> (self.bit_index % 8)) & 1 != 0;
        self.bit_index += 1;
        Ok(bit)
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        Ok(self.read_bits(8)? as u8)
    }

    /// Reads `bits` bits, least significant first
    pub fn read_bits(&mut self, bits: u8) -> Result<u64, SerdeErr> {
        self.ensure(u32::from(bits))?;
        let mut output: u64 = 0;
        for i in 0..bits {
            if self.read_bit()? {
                output |= 1 << i;
            }
        }
        Ok(output)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, SerdeErr> {
        self.ensure((count * 8) as u32)?;
        let mut output = Vec::with_capacity(count);
        for _ in 0..count {
            output.push(self.read_byte()?);
        }
        Ok(output)
    }

    /// Fails if more than the final byte's padding remains unread.
    pub fn finish(&self) -> Result<(), SerdeErr> {
        let remaining_bits = self.remaining_bits();
        if remaining_bits >= 8 {
            return Err(SerdeErr::TrailingData { remaining_bits });
        }
        Ok(())
    }
}
