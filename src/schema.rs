//! Schema: the validated, closed-world set of fields that [`crate::layout::Planner`]
//! compiles into a bit layout.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SchemaError;
use crate::field::{Field, FieldDef, FieldVariant};

/// An ordered, duplicate-preserving `name -> field` mapping.
///
/// A plain `IndexMap` silently collapses a JSON object's duplicate keys
/// before this crate ever sees them; this type instead visits every entry a
/// deserializer hands it, so [`Schema::compile`] can reject duplicates per
/// §4.1 rather than silently keeping the last one.
#[derive(Debug, Clone, Default)]
pub struct OrderedFieldMap(pub Vec<(String, FieldDef)>);

impl OrderedFieldMap {
    pub fn iter(&self) -> impl Iterator<Item = &(String, FieldDef)> {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for OrderedFieldMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldMapVisitor;

        impl<'de> Visitor<'de> for FieldMapVisitor {
            type Value = OrderedFieldMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field name to field definition")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, def)) = map.next_entry::<String, FieldDef>()? {
                    entries.push((name, def));
                }
                Ok(OrderedFieldMap(entries))
            }
        }

        deserializer.deserialize_map(FieldMapVisitor)
    }
}

impl Serialize for OrderedFieldMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, def) in &self.0 {
            map.serialize_entry(name, def)?;
        }
        map.end()
    }
}

/// Raw, not-yet-validated schema as deserialized from a JSON or YAML document.
///
/// This is the type an external loader (out of scope for this crate) parses
/// a schema file into before handing it to [`Schema::compile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDef {
    pub name: String,
    pub version: String,
    pub fields: OrderedFieldMap,
}

/// A validated schema: an ordered, immutable set of named [`FieldVariant`]s.
///
/// Produced by [`Schema::compile`]. Field order is the schema's identity —
/// it determines bit offsets once [`crate::layout::Planner::plan`] runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub name: String,
    pub version: String,
    pub fields: IndexMap<String, Field>,
}

/// Conservative identifier rule: `[A-Za-z_][A-Za-z0-9_]*`.
fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_identifier(path: impl Into<String>, value: &str) -> Result<(), SchemaError> {
    if is_valid_identifier(value) {
        Ok(())
    } else {
        Err(SchemaError::invalid_identifier(path, value))
    }
}

fn parse_iso8601(field: &str, attribute: &str, value: &str) -> Result<time::PrimitiveDateTime, SchemaError> {
    crate::iso8601::parse(value).ok_or_else(|| SchemaError::DateParseError {
        field: field.to_string(),
        attribute: attribute.to_string(),
        value: value.to_string(),
    })
}

impl Schema {
    /// Validates a raw schema, rejecting anything malformed or internally
    /// inconsistent (§4.1). Does not yet assign bit offsets — see
    /// [`crate::layout::Planner::plan`].
    pub fn compile(raw: &SchemaDef) -> Result<Schema, SchemaError> {
        check_identifier("name", &raw.name)?;

        let mut seen = HashSet::new();
        let mut fields = IndexMap::with_capacity(raw.fields.0.len());

        for (name, def) in raw.fields.iter() {
            check_identifier(format!("fields.{name}"), name)?;

            if !seen.insert(name.clone()) {
                return Err(SchemaError::DuplicateFieldName {
                    field: name.clone(),
                });
            }

            let variant = compile_field(name, def)?;
            fields.insert(
                name.clone(),
                Field {
                    variant,
                    nullable: def.nullable(),
                },
            );
        }

        Ok(Schema {
            name: raw.name.clone(),
            version: raw.version.clone(),
            fields,
        })
    }
}

fn compile_field(name: &str, def: &FieldDef) -> Result<FieldVariant, SchemaError> {
    match def {
        FieldDef::Bool { .. } => Ok(FieldVariant::Boolean),

        FieldDef::Int { min, max, signed, .. } => {
            if min > max {
                return Err(SchemaError::IntegerRangeInverted {
                    field: name.to_string(),
                    min: *min,
                    max: *max,
                });
            }
            let range = (*max as i128) - (*min as i128);
            if (range as u128) >= (1u128 << 64) {
                return Err(SchemaError::IntegerRangeOverflow {
                    field: name.to_string(),
                    min: *min,
                    max: *max,
                });
            }
            Ok(FieldVariant::Integer {
                min: *min,
                max: *max,
                signed: *signed,
            })
        }

        FieldDef::Enum { values, .. } => {
            if values.is_empty() {
                return Err(SchemaError::EnumEmpty {
                    field: name.to_string(),
                });
            }
            if values.len() > 255 {
                return Err(SchemaError::EnumTooLarge {
                    field: name.to_string(),
                    count: values.len(),
                });
            }
            let mut seen = HashSet::new();
            for v in values {
                if v.is_empty() {
                    return Err(SchemaError::invalid_identifier(
                        format!("fields.{name}.values"),
                        v,
                    ));
                }
                if !seen.insert(v) {
                    return Err(SchemaError::EnumDuplicate {
                        field: name.to_string(),
                        value: v.clone(),
                    });
                }
            }
            Ok(FieldVariant::Enum {
                values: values.clone(),
            })
        }

        FieldDef::Date {
            resolution,
            min_date,
            max_date,
            ..
        } => {
            let min = parse_iso8601(name, "min_date", min_date)?;
            let max = parse_iso8601(name, "max_date", max_date)?;
            if min >= max {
                return Err(SchemaError::DateRangeInverted {
                    field: name.to_string(),
                    min_date: min_date.clone(),
                    max_date: max_date.clone(),
                });
            }
            Ok(FieldVariant::Date {
                resolution: *resolution,
                min_date: min,
                max_date: max,
            })
        }

        FieldDef::Bitmask { flags, .. } => {
            if flags.is_empty() {
                return Err(SchemaError::BitmaskEmpty {
                    field: name.to_string(),
                });
            }
            let mut seen_positions = HashSet::new();
            for (flag, position) in flags {
                check_identifier(format!("fields.{name}.flags.{flag}"), flag)?;
                if *position > 63 {
                    return Err(SchemaError::BitmaskPositionOutOfRange {
                        field: name.to_string(),
                        flag: flag.clone(),
                        position: *position,
                    });
                }
                if !seen_positions.insert(*position) {
                    return Err(SchemaError::BitmaskPositionDuplicate {
                        field: name.to_string(),
                        position: *position,
                    });
                }
            }
            Ok(FieldVariant::Bitmask {
                flags: flags.clone(),
            })
        }
    }
}
