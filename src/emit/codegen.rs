//! Generates Rust source for a native accessor `struct` whose `encode`/`decode`
//! re-express the runtime codec's arithmetic inline, per field, rather than
//! calling back into it. See [`crate::codec`] for the reference semantics
//! this must stay equivalent to.

use std::fmt::Write as _;

use crate::field::{DateResolution, FieldVariant};
use crate::layout::FieldLayout;
use crate::schema::Schema;

fn rust_identifier(name: &str) -> String {
    name.to_string()
}

fn value_mask_literal(bits: u8) -> String {
    match bits {
        0 => "0u64".to_string(),
        64 => "u64::MAX".to_string(),
        n => format!("((1u64 << {n}) - 1)"),
    }
}

fn field_type(variant: &FieldVariant, nullable: bool) -> String {
    let inner = match variant {
        FieldVariant::Boolean => "bool".to_string(),
        // `signed` is a schema-description attribute only; the runtime codec
        // always carries integer values as `i64` (min/max may be negative
        // regardless of `signed`), so the emitted field follows suit rather
        // than risk an unsigned type that can't hold a legal negative value.
        FieldVariant::Integer { .. } => "i64".to_string(),
        FieldVariant::Enum { .. } => "String".to_string(),
        FieldVariant::Date { resolution, .. } => {
            if matches!(resolution, DateResolution::Day) {
                "time::Date".to_string()
            } else {
                "time::PrimitiveDateTime".to_string()
            }
        }
        FieldVariant::Bitmask { .. } => "std::collections::BTreeMap<String, bool>".to_string(),
    };
    if nullable {
        format!("Option<{inner}>")
    } else {
        inner
    }
}

fn encode_expr(variant: &FieldVariant, binding: &str) -> String {
    match variant {
        FieldVariant::Boolean => format!("if {binding} {{ 1u64 }} else {{ 0u64 }}"),
        FieldVariant::Integer { min, .. } => format!("({binding} - ({min}i64)) as u64"),
        FieldVariant::Enum { values } => {
            let arms: String = values
                .iter()
                .enumerate()
                .map(|(i, v)| format!("            {v:?} => {i}u64,\n"))
                .collect();
            format!(
                "match {binding}.as_str() {{\n{arms}            other => panic!(\"unknown enum value: {{other}}\"),\n        }}"
            )
        }
        FieldVariant::Date {
            resolution,
            min_date,
            ..
        } => {
            let seconds_per_unit = resolution.seconds_per_unit();
            let base_epoch = min_date.assume_utc().unix_timestamp();
            let to_datetime = if matches!(resolution, DateResolution::Day) {
                format!("time::PrimitiveDateTime::new({binding}, time::Time::MIDNIGHT)")
            } else {
                binding.to_string()
            };
            format!(
                "((({to_datetime}).assume_utc().unix_timestamp() - {base_epoch}i64) / {seconds_per_unit}) as u64"
            )
        }
        FieldVariant::Bitmask { flags } => {
            let sets: String = flags
                .iter()
                .map(|(name, position)| {
                    format!(
                        "        if {binding}.get({name:?}).copied().unwrap_or(false) {{ v |= 1u64 << {position}; }}\n"
                    )
                })
                .collect();
            format!("{{\n        let mut v = 0u64;\n{sets}        v\n    }}")
        }
    }
}

fn decode_expr(variant: &FieldVariant, v: &str) -> String {
    match variant {
        FieldVariant::Boolean => format!("{v} != 0"),
        FieldVariant::Integer { min, .. } => format!("({min}i64) + {v} as i64"),
        FieldVariant::Enum { values } => {
            let arms: String = values
                .iter()
                .enumerate()
                .map(|(i, val)| format!("            {i} => {val:?}.to_string(),\n"))
                .collect();
            format!(
                "match {v} {{\n{arms}            other => unreachable!(\"decoded enum index {{other}} out of range\"),\n        }}"
            )
        }
        FieldVariant::Date {
            resolution,
            min_date,
            ..
        } => {
            let seconds_per_unit = resolution.seconds_per_unit();
            let base_epoch = min_date.assume_utc().unix_timestamp();
            let odt = format!(
                "time::OffsetDateTime::from_unix_timestamp({base_epoch}i64 + {v} as i64 * {seconds_per_unit}).unwrap()"
            );
            if matches!(resolution, DateResolution::Day) {
                format!("({odt}).date()")
            } else {
                format!("time::PrimitiveDateTime::new(({odt}).date(), ({odt}).time())")
            }
        }
        FieldVariant::Bitmask { flags } => {
            let inserts: String = flags
                .iter()
                .map(|(name, position)| {
                    format!(
                        "        m.insert({name:?}.to_string(), ({v} >> {position}) & 1 == 1);\n"
                    )
                })
                .collect();
            format!(
                "{{\n        let mut m = std::collections::BTreeMap::new();\n{inserts}        m\n    }}"
            )
        }
    }
}

/// Emits a standalone Rust source file defining a `struct` named after
/// `schema.name` with `encode`/`decode` inherent methods, re-expressing
/// §4.3's arithmetic per field rather than delegating to the runtime codec.
///
/// Returns `None` if the generated source fails a minimal well-formedness
/// check (unbalanced braces or parentheses) — this should never happen for a
/// validated schema, but the emitter refuses to hand back broken source.
pub fn emit_rust_accessor(schema: &Schema, layouts: &[FieldLayout]) -> Option<String> {
    let mut out = String::new();

    let _ = writeln!(out, "/// Generated accessor for schema `{}`.", schema.name);
    let _ = writeln!(out, "///");
    let _ = writeln!(out, "/// Bit layout ({} bits total):", layouts.iter().map(|l| l.bits as usize).sum::<usize>());
    for layout in layouts {
        let _ = writeln!(
            out,
            "/// - `{}`: offset {}, {} bits",
            layout.name, layout.offset, layout.bits
        );
    }
    let _ = writeln!(out, "#[derive(Debug, Clone, PartialEq)]");
    let _ = writeln!(out, "pub struct {} {{", schema.name);
    for layout in layouts {
        let _ = writeln!(
            out,
            "    pub {}: {},",
            rust_identifier(&layout.name),
            field_type(&layout.variant, layout.nullable)
        );
    }
    let _ = writeln!(out, "}}");
    let _ = writeln!(out);
    let _ = writeln!(out, "impl {} {{", schema.name);
    let _ = writeln!(out, "    pub fn encode(&self) -> u64 {{");
    let _ = writeln!(out, "        let mut word: u64 = 0;");
    for layout in layouts {
        let field = rust_identifier(&layout.name);
        if layout.nullable {
            let _ = writeln!(out, "        if let Some(inner) = self.{field}.clone() {{");
            let _ = writeln!(out, "            word |= 1u64 << {};", layout.offset);
            let expr = encode_expr(&layout.variant, "inner");
            let _ = writeln!(
                out,
                "            word |= ({expr}) << {};",
                layout.value_offset()
            );
            let _ = writeln!(out, "        }}");
        } else {
            let expr = encode_expr(&layout.variant, &format!("self.{field}"));
            let _ = writeln!(out, "        word |= ({expr}) << {};", layout.value_offset());
        }
    }
    let _ = writeln!(out, "        word");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out);
    let _ = writeln!(out, "    pub fn decode(word: u64) -> Self {{");
    for layout in layouts {
        let field = rust_identifier(&layout.name);
        let mask = value_mask_literal(layout.value_bits());
        if layout.nullable {
            let _ = writeln!(
                out,
                "        let {field}_present = (word >> {}) & 1 == 1;",
                layout.offset
            );
            let _ = writeln!(
                out,
                "        let {field}_bits = (word >> {}) & {mask};",
                layout.value_offset()
            );
            let decoded = decode_expr(&layout.variant, &format!("{field}_bits"));
            let _ = writeln!(
                out,
                "        let {field} = if {field}_present {{ Some({decoded}) }} else {{ None }};"
            );
        } else {
            let _ = writeln!(
                out,
                "        let {field}_bits = (word >> {}) & {mask};",
                layout.value_offset()
            );
            let decoded = decode_expr(&layout.variant, &format!("{field}_bits"));
            let _ = writeln!(out, "        let {field} = {decoded};");
        }
    }
    let _ = writeln!(out, "        {} {{", schema.name);
    for layout in layouts {
        let _ = writeln!(out, "            {}: {},", layout.name, layout.name);
    }
    let _ = writeln!(out, "        }}");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");

    if is_well_formed(&out) {
        Some(out)
    } else {
        None
    }
}

/// Minimal syntactic sanity check: braces and parens balance, and the source
/// is not empty. Not a parser — just enough to refuse visibly broken output.
fn is_well_formed(source: &str) -> bool {
    if source.trim().is_empty() {
        return false;
    }

    let mut braces = 0i32;
    let mut parens = 0i32;
    let mut in_string = false;
    let mut escape = false;

    for c in source.chars() {
        if in_string {
            if escape {
                escape = false;
            } else if c == '\\' {
                escape = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => braces += 1,
            '}' => braces -= 1,
            '(' => parens += 1,
            ')' => parens -= 1,
            _ => {}
        }
        if braces < 0 || parens < 0 {
            return false;
        }
    }

    braces == 0 && parens == 0 && !in_string
}
