use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr};

/// A type that can be written to and read back from a bit stream
pub trait Serde: Sized + Clone + PartialEq {
    fn ser(&self, writer: &mut dyn BitWrite);

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr>;

    fn bit_length(&self) -> u32;
}

/// Types whose encoded length does not depend on their value
pub trait ConstBitLength {
    fn const_bit_length() -> u32;
}

impl Serde for bool {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_bit()
    }

    fn bit_length(&self) -> u32 {
        1
    }
}

impl ConstBitLength for bool {
    fn const_bit_length() -> u32 {
        1
    }
}

macro_rules! impl_serde_unsigned {
    ($type:ty) => {
        impl Serde for $type {
            fn ser(&self, writer: &mut dyn BitWrite) {
                writer.write_bits(u64::from(*self), <$type>::BITS as u8);
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                Ok(reader.read_bits(<$type>::BITS as u8)? as $type)
            }

            fn bit_length(&self) -> u32 {
                <$type>::BITS
            }
        }

        impl ConstBitLength for $type {
            fn const_bit_length() -> u32 {
                <$type>::BITS
            }
        }
    };
}

impl_serde_unsigned!(u8);
impl_serde_unsigned!(u16);
impl_serde_unsigned!(u32);

impl Serde for u64 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bits(*self, 64);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_bits(64)
    }

    fn bit_length(&self) -> u32 {
        64
    }
}

impl ConstBitLength for u64 {
    fn const_bit_length() -> u32 {
        64
    }
}

impl Serde for f32 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.to_bits().ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(f32::from_bits(u32::de(reader)?))
    }

    fn bit_length(&self) -> u32 {
        32
    }
}

impl<A: Serde, B: Serde> Serde for (A, B) {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
        self.1.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let a = A::de(reader)?;
        let b = B::de(reader)?;
        Ok((a, b))
    }

    fn bit_length(&self) -> u32 {
        self.0.bit_length() + self.1.bit_length()
    }
}
