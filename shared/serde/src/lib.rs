//! # Tether Serde
//! Bit-level wire primitives and the range quantization codec used by
//! tether's replication and voice layers.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod bit_reader;
mod bit_writer;
mod error;
mod quantize;
mod serde;

pub use bit_reader::BitReader;
pub use bit_writer::{BitCounter, BitWrite, BitWriter};
pub use error::SerdeErr;
pub use quantize::{
    bits_for_span, decode, encode, QuantizeError, QuantizedRange, MAX_QUANTIZE_BITS,
};
pub use serde::{ConstBitLength, Serde};
