//! JSON Schema (Draft 2020-12) emitter, describing the record shape a
//! schema's fields accept — not the packed bit layout.

use serde_json::{json, Map, Value as Json};

use crate::field::{DateResolution, FieldVariant};
use crate::layout::FieldLayout;
use crate::schema::Schema;

fn date_format(resolution: DateResolution) -> &'static str {
    match resolution {
        DateResolution::Day => "date",
        _ => "date-time",
    }
}

fn nullable_type(base: &str, nullable: bool) -> Json {
    if nullable {
        json!([base, "null"])
    } else {
        json!(base)
    }
}

fn field_schema(layout: &FieldLayout) -> Json {
    let mut node = match &layout.variant {
        FieldVariant::Boolean => json!({
            "type": nullable_type("boolean", layout.nullable),
        }),

        FieldVariant::Integer { min, max, .. } => json!({
            "type": nullable_type("integer", layout.nullable),
            "minimum": min,
            "maximum": max,
        }),

        FieldVariant::Enum { values } => json!({
            "type": nullable_type("string", layout.nullable),
            "enum": values,
        }),

        FieldVariant::Date {
            resolution,
            min_date,
            max_date,
        } => json!({
            "type": nullable_type("string", layout.nullable),
            "format": date_format(*resolution),
            "x-bitschema-resolution": format!("{resolution:?}").to_lowercase(),
            "x-bitschema-min-date": min_date.to_string(),
            "x-bitschema-max-date": max_date.to_string(),
        }),

        FieldVariant::Bitmask { flags } => {
            let mut properties = Map::new();
            let mut positions = Map::new();
            for (name, position) in flags {
                properties.insert(name.clone(), json!({"type": "boolean"}));
                positions.insert(name.clone(), json!(position));
            }
            json!({
                "type": nullable_type("object", layout.nullable),
                "properties": properties,
                "additionalProperties": false,
                "x-bitschema-flag-positions": positions,
            })
        }
    };

    if let Some(obj) = node.as_object_mut() {
        obj.insert("x-bitschema-offset".to_string(), json!(layout.offset));
        obj.insert("x-bitschema-bits".to_string(), json!(layout.bits));
    }

    node
}

/// Produces a JSON Schema describing the records `schema`'s layout accepts.
///
/// The schema itself is not serialized into the output beyond its name and
/// per-field vendor extensions; `layouts` supplies bit offsets and widths.
pub fn emit_json_schema(schema: &Schema, layouts: &[FieldLayout]) -> Json {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for layout in layouts {
        properties.insert(layout.name.clone(), field_schema(layout));
        if !layout.nullable {
            required.push(layout.name.clone());
        }
    }

    let total_bits: usize = layouts.iter().map(|l| l.bits as usize).sum();

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": schema.name,
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
        "x-bitschema-total-bits": total_bits,
    })
}
