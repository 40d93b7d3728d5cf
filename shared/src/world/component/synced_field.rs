use tether_serde::{BitReader, BitWrite, QuantizeError, QuantizedRange, SerdeErr};

use crate::world::component::error::ComponentError;

/// Live value of one synced scalar
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f32),
}

impl FieldValue {
    pub fn as_f64(self) -> f64 {
        match self {
            FieldValue::Integer(value) => value as f64,
            FieldValue::Float(value) => f64::from(value),
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            FieldValue::Integer(value) => value,
            FieldValue::Float(value) => value.round() as i64,
        }
    }

    pub fn as_f32(self) -> f32 {
        match self {
            FieldValue::Integer(value) => value as f32,
            FieldValue::Float(value) => value,
        }
    }

    pub fn as_bool(self) -> bool {
        self.as_i64() != 0
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        FieldValue::Float(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Float,
}

/// Declaration of one bounded scalar: a name, a closed range and its
/// encoding. Integer fields take the bit count their range implies; float
/// fields take an explicit bit depth.
#[derive(Clone, Debug, PartialEq)]
pub struct SyncedField {
    name: &'static str,
    kind: FieldKind,
    range: QuantizedRange,
}

impl SyncedField {
    /// # Panics
    ///
    /// Panics if `min >= max` or the range needs more than 32 bits.
    /// Consider using `try_ranged_integer` for non-panicking error handling.
    pub fn ranged_integer(name: &'static str, min: i64, max: i64) -> Self {
        Self::try_ranged_integer(name, min, max).expect("invalid ranged integer field")
    }

    pub fn try_ranged_integer(
        name: &'static str,
        min: i64,
        max: i64,
    ) -> Result<Self, QuantizeError> {
        Ok(Self {
            name,
            kind: FieldKind::Integer,
            range: QuantizedRange::try_integer(min, max)?,
        })
    }

    /// A `[0, 1]` integer
    pub fn flag(name: &'static str) -> Self {
        Self::ranged_integer(name, 0, 1)
    }

    /// # Panics
    ///
    /// Panics if the range or bit depth is invalid.
    /// Consider using `try_ranged_float` for non-panicking error handling.
    pub fn ranged_float(name: &'static str, min: f32, max: f32, bits: u8) -> Self {
        Self::try_ranged_float(name, min, max, bits).expect("invalid ranged float field")
    }

    pub fn try_ranged_float(
        name: &'static str,
        min: f32,
        max: f32,
        bits: u8,
    ) -> Result<Self, QuantizeError> {
        Ok(Self {
            name,
            kind: FieldKind::Float,
            range: QuantizedRange::try_float(f64::from(min), f64::from(max), bits)?,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn range(&self) -> &QuantizedRange {
        &self.range
    }

    pub fn bits(&self) -> u8 {
        self.range.bits()
    }

    pub fn encode(&self, value: FieldValue) -> u64 {
        match self.kind {
            FieldKind::Integer => self.range.encode_integer(value.as_i64()),
            FieldKind::Float => self.range.encode(value.as_f64()),
        }
    }

    pub fn decode(&self, code: u64) -> FieldValue {
        match self.kind {
            FieldKind::Integer => FieldValue::Integer(self.range.decode_integer(code)),
            FieldKind::Float => FieldValue::Float(self.range.decode(code) as f32),
        }
    }

    /// The value an observer will see after `value` crosses the wire
    pub fn quantize(&self, value: FieldValue) -> FieldValue {
        self.decode(self.encode(value))
    }

    pub fn write(&self, writer: &mut dyn BitWrite, value: FieldValue) {
        writer.write_bits(self.encode(value), self.bits());
    }

    pub fn read(&self, reader: &mut BitReader) -> Result<FieldValue, SerdeErr> {
        let code = self.range.read_code(reader)?;
        Ok(self.decode(code))
    }
}

/// The fixed packing order of a component's fields. Encode and decode walk
/// the fields in declaration order, so both ends must build the same layout.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ComponentLayout {
    fields: Vec<SyncedField>,
}

impl ComponentLayout {
    pub const MAX_FIELDS: usize = 256;

    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Append a field
    ///
    /// # Panics
    ///
    /// Panics if the layout already holds `MAX_FIELDS` fields.
    pub fn with(mut self, field: SyncedField) -> Self {
        self.try_push(field).expect("component layout is full");
        self
    }

    pub fn try_push(&mut self, field: SyncedField) -> Result<(), ComponentError> {
        if self.fields.len() >= Self::MAX_FIELDS {
            return Err(ComponentError::TooManyFields {
                max: Self::MAX_FIELDS,
            });
        }
        self.fields.push(field);
        Ok(())
    }

    pub fn fields(&self) -> &[SyncedField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn bit_length(&self) -> u32 {
        self.fields.iter().map(|field| u32::from(field.bits())).sum()
    }

    /// Bytes one packed record occupies on the wire
    pub fn byte_length(&self) -> usize {
        self.bit_length().div_ceil(8) as usize
    }

    pub fn write(
        &self,
        writer: &mut dyn BitWrite,
        values: &[FieldValue],
    ) -> Result<(), ComponentError> {
        if values.len() != self.fields.len() {
            return Err(ComponentError::LayoutMismatch {
                expected: self.fields.len(),
                found: values.len(),
            });
        }
        for (field, value) in self.fields.iter().zip(values) {
            field.write(writer, *value);
        }
        Ok(())
    }

    pub fn read(&self, reader: &mut BitReader) -> Result<Vec<FieldValue>, SerdeErr> {
        self.fields.iter().map(|field| field.read(reader)).collect()
    }
}
