//! # Range quantization
//!
//! Maps a scalar from a closed range `[min, max]` onto an integer code in
//! `[0, steps]` and back. Floats use `steps = 2^bits - 1` for an explicit bit
//! depth; integers use `steps = max - min` so every value in range has its
//! own code and the bit count is implied by the range width. Both are the
//! same affine map, so a decoded value is always within one step of the
//! clamped input and both endpoints are exact.

use thiserror::Error;

use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr};

/// Widest code a quantized range may use
pub const MAX_QUANTIZE_BITS: u8 = 32;

/// Errors that can occur when declaring a quantized range
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantizeError {
    /// Bit depth outside `1..=MAX_QUANTIZE_BITS`
    #[error("Bit depth {bits} is not supported, must be between 1 and {max}")]
    InvalidBitDepth { bits: u8, max: u8 },

    /// Range bounds are not finite or not strictly increasing
    #[error("Invalid range [{min}, {max}]: bounds must be finite with min < max")]
    InvalidRange { min: f64, max: f64 },

    /// Integer range needs more bits than a code may use
    #[error("Integer range spanning {span} values needs more than {max} bits")]
    SpanTooWide { span: u64, max: u8 },
}

/// Number of bits needed to hold every code in `0..=span`
pub fn bits_for_span(span: u64) -> u8 {
    (u64::BITS - span.leading_zeros()) as u8
}

/// A closed range plus the number of quantization steps across it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizedRange {
    min: f64,
    max: f64,
    steps: u64,
    bits: u8,
    // exact lower bound of an integer range
    origin: Option<i64>,
}

impl QuantizedRange {
    /// Declare a float range with an explicit bit depth
    ///
    /// # Panics
    ///
    /// Panics if the range or bit depth is invalid.
    /// Consider using `try_float` for non-panicking error handling.
    pub fn float(min: f64, max: f64, bits: u8) -> Self {
        Self::try_float(min, max, bits).expect("invalid quantized float range")
    }

    /// Try to declare a float range with an explicit bit depth
    pub fn try_float(min: f64, max: f64, bits: u8) -> Result<Self, QuantizeError> {
        if bits == 0 || bits > MAX_QUANTIZE_BITS {
            return Err(QuantizeError::InvalidBitDepth {
                bits,
                max: MAX_QUANTIZE_BITS,
            });
        }
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(QuantizeError::InvalidRange { min, max });
        }
        Ok(Self {
            min,
            max,
            steps: (1u64 << bits) - 1,
            bits,
            origin: None,
        })
    }

    /// Declare an integer range; the bit count follows from its width
    ///
    /// # Panics
    ///
    /// Panics if `min >= max` or the range is too wide.
    /// Consider using `try_integer` for non-panicking error handling.
    pub fn integer(min: i64, max: i64) -> Self {
        Self::try_integer(min, max).expect("invalid quantized integer range")
    }

    /// Try to declare an integer range
    pub fn try_integer(min: i64, max: i64) -> Result<Self, QuantizeError> {
        if min >= max {
            return Err(QuantizeError::InvalidRange {
                min: min as f64,
                max: max as f64,
            });
        }
        let span = (i128::from(max) - i128::from(min)) as u64;
        let bits = bits_for_span(span);
        if bits > MAX_QUANTIZE_BITS {
            return Err(QuantizeError::SpanTooWide {
                span,
                max: MAX_QUANTIZE_BITS,
            });
        }
        Ok(Self {
            min: min as f64,
            max: max as f64,
            steps: span,
            bits,
            origin: Some(min),
        })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Highest code this range produces
    pub fn max_code(&self) -> u64 {
        self.steps
    }

    /// Value distance between two adjacent codes
    pub fn step(&self) -> f64 {
        (self.max - self.min) / self.steps as f64
    }

    /// Clamps `value` into range and maps it to its nearest code.
    /// NaN is treated as `min`.
    pub fn encode(&self, value: f64) -> u64 {
        if value.is_nan() || value <= self.min {
            return 0;
        }
        if value >= self.max {
            return self.steps;
        }
        let scaled = (value - self.min) / (self.max - self.min) * self.steps as f64;
        (scaled.round() as u64).min(self.steps)
    }

    /// Inverse of `encode`. Codes above `max_code()` decode to `max`.
    pub fn decode(&self, code: u64) -> f64 {
        if code == 0 {
            return self.min;
        }
        if code >= self.steps {
            return self.max;
        }
        self.min + (code as f64 / self.steps as f64) * (self.max - self.min)
    }

    /// Integer ranges map `value` to `value - min` exactly, at any offset
    /// from zero. On a float range this rounds through `encode`.
    pub fn encode_integer(&self, value: i64) -> u64 {
        match self.origin {
            Some(min) => {
                let max = i128::from(min) + i128::from(self.steps);
                (i128::from(value).clamp(i128::from(min), max) - i128::from(min)) as u64
            }
            None => self.encode(value as f64),
        }
    }

    pub fn decode_integer(&self, code: u64) -> i64 {
        match self.origin {
            Some(min) => (i128::from(min) + i128::from(code.min(self.steps))) as i64,
            None => self.decode(code).round() as i64,
        }
    }

    /// Writes the code for `value` using exactly `bits()` bits
    pub fn write(&self, writer: &mut dyn BitWrite, value: f64) {
        writer.write_bits(self.encode(value), self.bits);
    }

    /// Reads a code and decodes it, rejecting codes above `max_code()`
    pub fn read(&self, reader: &mut BitReader) -> Result<f64, SerdeErr> {
        let code = self.read_code(reader)?;
        Ok(self.decode(code))
    }

    pub fn read_code(&self, reader: &mut BitReader) -> Result<u64, SerdeErr> {
        let code = reader.read_bits(self.bits)?;
        if code > self.steps {
            return Err(SerdeErr::ValueOutOfRange {
                value: code,
                max: self.steps,
            });
        }
        Ok(code)
    }
}

/// Quantize `value` over `[min, max]` at `bits` of depth.
/// A degenerate range or unsupported depth encodes everything to 0.
pub fn encode(value: f64, min: f64, max: f64, bits: u8) -> u64 {
    match QuantizedRange::try_float(min, max, bits) {
        Ok(range) => range.encode(value),
        Err(_) => 0,
    }
}

/// Inverse of [`encode`]. A degenerate range or unsupported depth decodes to `min`.
pub fn decode(code: u64, min: f64, max: f64, bits: u8) -> f64 {
    match QuantizedRange::try_float(min, max, bits) {
        Ok(range) => range.decode(code),
        Err(_) => min,
    }
}
