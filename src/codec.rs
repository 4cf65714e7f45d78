//! Encoder and decoder: bidirectional translation between a [`Record`] and a
//! packed `u64`, using a planned [`FieldLayout`] sequence.

use time::{Duration, PrimitiveDateTime, Time};

use crate::error::EncodingError;
use crate::field::FieldVariant;
use crate::layout::FieldLayout;
use crate::value::{Record, Value};

fn value_mask(bits: u8) -> u64 {
    match bits {
        0 => 0,
        64 => u64::MAX,
        n => (1u64 << n) - 1,
    }
}

fn as_datetime(field: &str, value: &Value) -> Result<PrimitiveDateTime, EncodingError> {
    match value {
        Value::Date(d) => Ok(PrimitiveDateTime::new(*d, Time::MIDNIGHT)),
        Value::DateTime(dt) => Ok(*dt),
        Value::Str(s) => crate::iso8601::parse(s)
            .ok_or_else(|| EncodingError::type_mismatch(field, value)),
        other => Err(EncodingError::type_mismatch(field, other)),
    }
}

/// Computes the normalized unsigned value `v` for one field, validating it
/// against its variant's constraints first (§4.3, §4.4).
fn normalize(field: &str, variant: &FieldVariant, value: &Value) -> Result<u64, EncodingError> {
    match variant {
        FieldVariant::Boolean => match value {
            Value::Bool(b) => Ok(if *b { 1 } else { 0 }),
            other => Err(EncodingError::type_mismatch(field, other)),
        },

        FieldVariant::Integer { min, max, .. } => match value {
            Value::Int(v) => {
                if v < min || v > max {
                    return Err(EncodingError::out_of_range(field, value));
                }
                Ok((*v - *min) as u64)
            }
            other => Err(EncodingError::type_mismatch(field, other)),
        },

        FieldVariant::Enum { values } => match value {
            Value::Str(s) => values
                .iter()
                .position(|v| v == s)
                .map(|pos| pos as u64)
                .ok_or_else(|| EncodingError::UnknownEnumValue {
                    field: field.to_string(),
                    value: s.clone(),
                }),
            other => Err(EncodingError::type_mismatch(field, other)),
        },

        FieldVariant::Date {
            resolution,
            min_date,
            max_date,
        } => {
            let dt = as_datetime(field, value)?;
            if dt < *min_date || dt > *max_date {
                return Err(EncodingError::out_of_range(field, value));
            }
            let elapsed_seconds = (dt - *min_date).whole_seconds();
            let units = elapsed_seconds / resolution.seconds_per_unit();
            Ok(units as u64)
        }

        FieldVariant::Bitmask { flags } => match value {
            Value::Bitmask(set) => {
                for key in set.keys() {
                    if !flags.contains_key(key) {
                        return Err(EncodingError::UnknownFlag {
                            field: field.to_string(),
                            flag: key.clone(),
                        });
                    }
                }
                let mut v = 0u64;
                for (name, position) in flags {
                    if set.get(name).copied().unwrap_or(false) {
                        v |= 1u64 << position;
                    }
                }
                Ok(v)
            }
            other => Err(EncodingError::type_mismatch(field, other)),
        },
    }
}

fn denormalize(variant: &FieldVariant, v: u64) -> Value {
    match variant {
        FieldVariant::Boolean => Value::Bool(v != 0),

        FieldVariant::Integer { min, .. } => Value::Int(min + v as i64),

        FieldVariant::Enum { values } => Value::Str(values[v as usize].clone()),

        FieldVariant::Date {
            resolution,
            min_date,
            ..
        } => {
            let dt = *min_date + Duration::seconds(v as i64 * resolution.seconds_per_unit());
            if matches!(resolution, crate::field::DateResolution::Day) {
                Value::Date(dt.date())
            } else {
                Value::DateTime(dt)
            }
        }

        FieldVariant::Bitmask { flags } => {
            let mut set = std::collections::BTreeMap::new();
            for (name, position) in flags {
                set.insert(name.clone(), (v >> position) & 1 == 1);
            }
            Value::Bitmask(set)
        }
    }
}

/// Packs `record` into a `u64` according to `layouts`. See §4.3.
///
/// Fails on the first field that violates its constraints (missing
/// non-nullable keys are reported together, listing every absent name).
/// Callers must zero-extend the result when transmitting it if `layouts`
/// use fewer than 64 bits; unused high bits are always zero on encode but
/// are not inspected on decode.
pub fn encode(record: &Record, layouts: &[FieldLayout]) -> Result<u64, EncodingError> {
    let missing: Vec<String> = layouts
        .iter()
        .filter(|l| !l.nullable)
        .filter(|l| !record.contains_key(&l.name))
        .map(|l| l.name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(EncodingError::MissingField { fields: missing });
    }

    let mut word: u64 = 0;

    for layout in layouts {
        let value = record.get(&layout.name);

        if layout.nullable {
            match value {
                None | Some(Value::Null) => continue,
                Some(v) => {
                    word |= 1u64 << layout.offset;
                    let normalized = normalize(&layout.name, &layout.variant, v)?;
                    word |= normalized << layout.value_offset();
                }
            }
        } else {
            let v = value.expect("presence checked above");
            if v.is_null() {
                return Err(EncodingError::NullNotAllowed {
                    field: layout.name.clone(),
                });
            }
            let normalized = normalize(&layout.name, &layout.variant, v)?;
            word |= normalized << layout.value_offset();
        }
    }

    Ok(word)
}

/// Unpacks `word` into a record according to `layouts`. Total: every `u64`
/// produces a record, whether or not it was ever produced by `encode`.
pub fn decode(word: u64, layouts: &[FieldLayout]) -> Record {
    let mut record = Record::new();

    for layout in layouts {
        if layout.nullable {
            let present = (word >> layout.offset) & 1 == 1;
            if !present {
                record.insert(layout.name.clone(), Value::Null);
                continue;
            }
        }

        let mask = value_mask(layout.value_bits());
        let v = (word >> layout.value_offset()) & mask;
        record.insert(layout.name.clone(), denormalize(&layout.variant, v));
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{DateResolution, Field, FieldDef, FieldVariant};
    use crate::layout;
    use crate::schema::{OrderedFieldMap, Schema, SchemaDef};
    use indexmap::IndexMap;

    fn compile(fields: Vec<(&str, FieldDef)>) -> Vec<FieldLayout> {
        let raw = SchemaDef {
            name: "Test".to_string(),
            version: "1".to_string(),
            fields: OrderedFieldMap(
                fields
                    .into_iter()
                    .map(|(n, d)| (n.to_string(), d))
                    .collect(),
            ),
        };
        let schema = Schema::compile(&raw).unwrap();
        layout::plan(&schema).unwrap()
    }

    #[test]
    fn s1_boolean_only() {
        let layouts = compile(vec![
            ("a", FieldDef::Bool { nullable: false }),
            ("b", FieldDef::Bool { nullable: false }),
        ]);

        let mut record = Record::new();
        record.insert("a".to_string(), Value::Bool(true));
        record.insert("b".to_string(), Value::Bool(false));
        assert_eq!(encode(&record, &layouts).unwrap(), 1);

        let decoded = decode(1, &layouts);
        assert_eq!(decoded.get("a"), Some(&Value::Bool(true)));
        assert_eq!(decoded.get("b"), Some(&Value::Bool(false)));

        let decoded = decode(0b11, &layouts);
        assert_eq!(decoded.get("a"), Some(&Value::Bool(true)));
        assert_eq!(decoded.get("b"), Some(&Value::Bool(true)));
    }

    #[test]
    fn s2_bounded_integer() {
        let layouts = compile(vec![(
            "x",
            FieldDef::Int {
                min: -8,
                max: 7,
                signed: true,
                nullable: false,
            },
        )]);

        let rec = |v: i64| {
            let mut r = Record::new();
            r.insert("x".to_string(), Value::Int(v));
            r
        };

        assert_eq!(encode(&rec(-8), &layouts).unwrap(), 0);
        assert_eq!(encode(&rec(7), &layouts).unwrap(), 15);
        assert!(matches!(
            encode(&rec(8), &layouts),
            Err(EncodingError::OutOfRange { .. })
        ));
    }

    #[test]
    fn s3_single_value_enum_is_zero_bits() {
        let layouts = compile(vec![(
            "k",
            FieldDef::Enum {
                values: vec!["only".to_string()],
                nullable: false,
            },
        )]);
        assert_eq!(layout::total_bits(&layouts), 0);

        let mut rec = Record::new();
        rec.insert("k".to_string(), Value::Str("only".to_string()));
        assert_eq!(encode(&rec, &layouts).unwrap(), 0);

        let decoded = decode(0, &layouts);
        assert_eq!(decoded.get("k"), Some(&Value::Str("only".to_string())));
    }

    #[test]
    fn s4_nullable_enum() {
        let layouts = compile(vec![(
            "k",
            FieldDef::Enum {
                values: vec!["a", "b", "c", "d"].into_iter().map(String::from).collect(),
                nullable: true,
            },
        )]);

        let mut null_rec = Record::new();
        null_rec.insert("k".to_string(), Value::Null);
        assert_eq!(encode(&null_rec, &layouts).unwrap(), 0b000);

        let mut a_rec = Record::new();
        a_rec.insert("k".to_string(), Value::Str("a".to_string()));
        assert_eq!(encode(&a_rec, &layouts).unwrap(), 0b001);

        let mut d_rec = Record::new();
        d_rec.insert("k".to_string(), Value::Str("d".to_string()));
        assert_eq!(encode(&d_rec, &layouts).unwrap(), 0b111);

        assert_eq!(decode(0b000, &layouts).get("k"), Some(&Value::Null));
        assert_eq!(
            decode(0b111, &layouts).get("k"),
            Some(&Value::Str("d".to_string()))
        );
    }

    #[test]
    fn s5_bitmask_sparse_positions() {
        let mut flags = IndexMap::new();
        flags.insert("read".to_string(), 0u8);
        flags.insert("admin".to_string(), 3u8);
        let layouts = compile(vec![(
            "p",
            FieldDef::Bitmask {
                flags,
                nullable: false,
            },
        )]);

        let mut rec = Record::new();
        let mut set = std::collections::BTreeMap::new();
        set.insert("read".to_string(), true);
        set.insert("admin".to_string(), true);
        rec.insert("p".to_string(), Value::Bitmask(set));
        assert_eq!(encode(&rec, &layouts).unwrap(), 0b1001);

        let mut rec2 = Record::new();
        let mut set2 = std::collections::BTreeMap::new();
        set2.insert("read".to_string(), false);
        rec2.insert("p".to_string(), Value::Bitmask(set2));
        assert_eq!(encode(&rec2, &layouts).unwrap(), 0b0000);

        let mut rec3 = Record::new();
        let mut set3 = std::collections::BTreeMap::new();
        set3.insert("write".to_string(), true);
        rec3.insert("p".to_string(), Value::Bitmask(set3));
        assert!(matches!(
            encode(&rec3, &layouts),
            Err(EncodingError::UnknownFlag { .. })
        ));
    }

    #[test]
    fn s6_date_day_resolution() {
        let layouts = compile(vec![(
            "d",
            FieldDef::Date {
                resolution: DateResolution::Day,
                min_date: "2020-01-01".to_string(),
                max_date: "2020-01-04".to_string(),
                nullable: false,
            },
        )]);

        let date = |y, m, d| time::Date::from_calendar_date(y, time::Month::try_from(m).unwrap(), d).unwrap();

        let mut rec = Record::new();
        rec.insert("d".to_string(), Value::Date(date(2020, 1, 1)));
        assert_eq!(encode(&rec, &layouts).unwrap(), 0);

        let mut rec2 = Record::new();
        rec2.insert("d".to_string(), Value::Date(date(2020, 1, 3)));
        assert_eq!(encode(&rec2, &layouts).unwrap(), 2);

        let mut rec3 = Record::new();
        rec3.insert("d".to_string(), Value::Date(date(2019, 12, 31)));
        assert!(matches!(
            encode(&rec3, &layouts),
            Err(EncodingError::OutOfRange { .. })
        ));
    }

    #[test]
    fn decode_is_total_over_all_u64() {
        let layouts = compile(vec![
            ("a", FieldDef::Bool { nullable: false }),
            (
                "x",
                FieldDef::Int {
                    min: 0,
                    max: 100,
                    signed: false,
                    nullable: true,
                },
            ),
        ]);
        for word in [0u64, 1, u64::MAX, 0xFFFF_0000, 42] {
            let record = decode(word, &layouts);
            assert_eq!(record.len(), 2);
        }
    }
}
