//! Property-based and seed-scenario tests over the public encode/decode/plan
//! pipeline, exercised through the crate's public API only.

use bitschema::field::{DateResolution, FieldDef};
use bitschema::schema::{OrderedFieldMap, Schema, SchemaDef};
use bitschema::value::{Record, Value};
use bitschema::{codec, layout, EncodingError, SchemaError};
use proptest::prelude::*;

fn schema_of(fields: Vec<(&str, FieldDef)>) -> Schema {
    let raw = SchemaDef {
        name: "Props".to_string(),
        version: "1".to_string(),
        fields: OrderedFieldMap(
            fields
                .into_iter()
                .map(|(n, d)| (n.to_string(), d))
                .collect(),
        ),
    };
    Schema::compile(&raw).unwrap()
}

fn bounded_int(min: i64, max: i64, nullable: bool) -> FieldDef {
    FieldDef::Int {
        min,
        max,
        signed: true,
        nullable,
    }
}

proptest! {
    /// Layout determinism: planning the same schema twice yields identical layouts.
    #[test]
    fn layout_is_deterministic(min in -1000i64..1000, span in 1i64..5000) {
        let schema = schema_of(vec![("x", bounded_int(min, min + span, false))]);
        let a = layout::plan(&schema).unwrap();
        let b = layout::plan(&schema).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Bit-width minimality for integer fields: `bits == bit_length(max - min)`.
    #[test]
    fn integer_bit_width_is_minimal(min in -1000i64..1000, span in 0i64..5000) {
        let schema = schema_of(vec![("x", bounded_int(min, min + span, false))]);
        let layouts = layout::plan(&schema).unwrap();
        let expected = layout::bit_length(span as u64);
        prop_assert_eq!(layouts[0].bits as u32, expected);
    }

    /// Round-trip: decode(encode(r)) == r for integer fields across the whole range.
    #[test]
    fn integer_round_trips(min in -1000i64..1000, span in 1i64..5000, offset in 0i64..5000) {
        let max = min + span;
        let value = min + (offset % (span + 1));
        let schema = schema_of(vec![("x", bounded_int(min, max, false))]);
        let layouts = layout::plan(&schema).unwrap();

        let mut record = Record::new();
        record.insert("x".to_string(), Value::Int(value));

        let word = codec::encode(&record, &layouts).unwrap();
        let decoded = codec::decode(word, &layouts);
        prop_assert_eq!(decoded.get("x"), Some(&Value::Int(value)));
    }

    /// Encode totality: a value outside [min, max] is always rejected, never packed.
    #[test]
    fn out_of_range_integer_is_rejected(min in -1000i64..1000, span in 0i64..5000, delta in 1i64..1000) {
        let max = min + span;
        let schema = schema_of(vec![("x", bounded_int(min, max, false))]);
        let layouts = layout::plan(&schema).unwrap();

        let mut record = Record::new();
        record.insert("x".to_string(), Value::Int(max + delta));
        prop_assert!(matches!(
            codec::encode(&record, &layouts),
            Err(EncodingError::OutOfRange { .. })
        ));
    }

    /// Decode totality: every u64 produces a record, for any planned layout.
    #[test]
    fn decode_is_total(word in any::<u64>(), min in -1000i64..1000, span in 1i64..5000) {
        let schema = schema_of(vec![("x", bounded_int(min, min + span, true))]);
        let layouts = layout::plan(&schema).unwrap();
        let record = codec::decode(word, &layouts);
        prop_assert_eq!(record.len(), 1);
    }

    /// Null preservation: a nullable field's null and non-null values round-trip distinctly.
    #[test]
    fn nullable_integer_preserves_null(min in -1000i64..1000, span in 1i64..5000, offset in 0i64..5000) {
        let max = min + span;
        let value = min + (offset % (span + 1));
        let schema = schema_of(vec![("x", bounded_int(min, max, true))]);
        let layouts = layout::plan(&schema).unwrap();

        let mut null_record = Record::new();
        null_record.insert("x".to_string(), Value::Null);
        let null_word = codec::encode(&null_record, &layouts).unwrap();
        prop_assert_eq!(null_word, 0);
        prop_assert_eq!(codec::decode(null_word, &layouts).get("x"), Some(&Value::Null));

        let mut some_record = Record::new();
        some_record.insert("x".to_string(), Value::Int(value));
        let some_word = codec::encode(&some_record, &layouts).unwrap();
        prop_assert_ne!(some_word & 1, 0);
        prop_assert_eq!(
            codec::decode(some_word, &layouts).get("x"),
            Some(&Value::Int(value))
        );
    }
}

#[test]
fn s1_boolean_only() {
    let schema = schema_of(vec![
        ("a", FieldDef::Bool { nullable: false }),
        ("b", FieldDef::Bool { nullable: false }),
    ]);
    let layouts = layout::plan(&schema).unwrap();

    let mut record = Record::new();
    record.insert("a".to_string(), Value::Bool(true));
    record.insert("b".to_string(), Value::Bool(false));
    assert_eq!(codec::encode(&record, &layouts).unwrap(), 1);

    let decoded = codec::decode(0b11, &layouts);
    assert_eq!(decoded.get("a"), Some(&Value::Bool(true)));
    assert_eq!(decoded.get("b"), Some(&Value::Bool(true)));
}

#[test]
fn s2_bounded_integer() {
    let schema = schema_of(vec![("x", bounded_int(-8, 7, false))]);
    let layouts = layout::plan(&schema).unwrap();
    assert_eq!(layouts[0].bits, 4);

    let mut rec = Record::new();
    rec.insert("x".to_string(), Value::Int(8));
    assert!(matches!(
        codec::encode(&rec, &layouts),
        Err(EncodingError::OutOfRange { .. })
    ));
}

#[test]
fn s3_single_value_enum_uses_zero_bits() {
    let schema = schema_of(vec![(
        "k",
        FieldDef::Enum {
            values: vec!["only".to_string()],
            nullable: false,
        },
    )]);
    let layouts = layout::plan(&schema).unwrap();
    assert_eq!(layout::total_bits(&layouts), 0);
}

#[test]
fn s6_date_day_resolution() {
    let schema = schema_of(vec![(
        "d",
        FieldDef::Date {
            resolution: DateResolution::Day,
            min_date: "2020-01-01".to_string(),
            max_date: "2020-01-04".to_string(),
            nullable: false,
        },
    )]);
    let layouts = layout::plan(&schema).unwrap();
    assert_eq!(layouts[0].bits, 2);

    let date = |y, m, d| {
        time::Date::from_calendar_date(y, time::Month::try_from(m).unwrap(), d).unwrap()
    };

    let mut rec = Record::new();
    rec.insert("d".to_string(), Value::Date(date(2019, 12, 31)));
    assert!(matches!(
        codec::encode(&rec, &layouts),
        Err(EncodingError::OutOfRange { .. })
    ));
}

#[test]
fn s7_overflow_schema_reports_per_field_breakdown() {
    let mut fields: Vec<(&str, FieldDef)> = Vec::new();
    let names = ["a", "b", "c", "d", "e", "f", "g", "h", "i"];
    for name in names {
        fields.push((name, bounded_int(0, 127, false)));
    }
    fields.push(("j", FieldDef::Bool { nullable: false }));

    let raw = SchemaDef {
        name: "Overflow".to_string(),
        version: "1".to_string(),
        fields: OrderedFieldMap(
            fields
                .iter()
                .map(|(n, d)| (n.to_string(), d.clone()))
                .collect(),
        ),
    };
    let schema = Schema::compile(&raw).unwrap();
    let layouts = layout::plan(&schema).unwrap();
    assert_eq!(layout::total_bits(&layouts), 64);

    fields.push(("k", FieldDef::Bool { nullable: false }));
    let raw = SchemaDef {
        name: "Overflow".to_string(),
        version: "1".to_string(),
        fields: OrderedFieldMap(
            fields
                .into_iter()
                .map(|(n, d)| (n.to_string(), d))
                .collect(),
        ),
    };
    let schema = Schema::compile(&raw).unwrap();
    assert!(matches!(
        layout::plan(&schema),
        Err(SchemaError::SchemaTooLarge { .. })
    ));
}
