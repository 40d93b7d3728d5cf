/// PROPERTY-BASED TESTS: quantization error bound
///
/// For every value inside a declared range the decoded value lies within one
/// quantization step of the input, and both endpoints survive exactly.

use proptest::prelude::*;
use tether_shared::{FieldValue, QuantizedRange, SyncedField};

fn float_range() -> impl Strategy<Value = (f64, f64, u8)> {
    (-1000.0f64..1000.0, 0.001f64..1000.0, 1u8..=16)
        .prop_map(|(min, width, bits)| (min, min + width, bits))
}

proptest! {
    #[test]
    fn prop_float_error_within_one_step(
        (min, max, bits) in float_range(),
        t in 0.0f64..=1.0,
    ) {
        let range = QuantizedRange::float(min, max, bits);
        let value = min + t * (max - min);
        let decoded = range.decode(range.encode(value));

        let step = (max - min) / ((1u64 << bits) - 1) as f64;
        prop_assert!((decoded - value).abs() <= step + 1e-9 * (max - min));
        prop_assert!(range.encode(value) <= range.max_code());
    }

    #[test]
    fn prop_endpoints_are_exact((min, max, bits) in float_range()) {
        let range = QuantizedRange::float(min, max, bits);

        prop_assert_eq!(range.decode(range.encode(min)), min);
        prop_assert_eq!(range.decode(range.encode(max)), max);
    }

    #[test]
    fn prop_out_of_range_clamps((min, max, bits) in float_range(), overshoot in 0.001f64..1e6) {
        let range = QuantizedRange::float(min, max, bits);

        prop_assert_eq!(range.decode(range.encode(max + overshoot)), max);
        prop_assert_eq!(range.decode(range.encode(min - overshoot)), min);
    }

    #[test]
    fn prop_integer_fields_are_lossless(
        min in -5000i64..5000,
        width in 1i64..5000,
        pick in 0.0f64..=1.0,
    ) {
        let max = min + width;
        let field = SyncedField::ranged_integer("value", min, max);
        let value = min + (pick * width as f64).round() as i64;

        prop_assert_eq!(field.quantize(FieldValue::Integer(value)), FieldValue::Integer(value));
        prop_assert_eq!(field.range().max_code(), width as u64);
    }
}

#[test]
fn eight_bit_percentage_example() {
    let range = QuantizedRange::float(0.0, 100.0, 8);

    assert_eq!(range.encode(50.0), 128);
    assert_eq!(range.max_code(), 255);
    assert!((range.decode(128) - 50.196).abs() < 0.001);
}

#[test]
fn symmetric_integer_range_uses_five_bits() {
    let field = SyncedField::ranged_integer("stage", -10, 10);

    assert_eq!(field.bits(), 5);
    assert_eq!(field.encode(FieldValue::Integer(-10)), 0);
    assert_eq!(field.encode(FieldValue::Integer(10)), 20);
}
