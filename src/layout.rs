//! Layout planner: assigns each field of a validated [`Schema`] a
//! non-overlapping bit range within a single 64-bit word.

use crate::error::SchemaError;
use crate::field::FieldVariant;
use crate::schema::Schema;

/// Position of the highest set bit of `n`, or `0` for `n == 0`.
///
/// `bit_length(0) = 0`, `bit_length(n>0) = floor(log2(n)) + 1`. Computed with
/// an integer primitive, never a floating-point logarithm.
pub fn bit_length(n: u64) -> u32 {
    u64::BITS - n.leading_zeros()
}

/// A field's compiled position and width within the packed word.
///
/// `bits` includes the presence bit when `nullable` is true; the field's
/// value bits then start at `offset + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLayout {
    pub name: String,
    pub variant: FieldVariant,
    pub offset: u8,
    pub bits: u8,
    pub nullable: bool,
}

impl FieldLayout {
    /// The bit offset at which the field's value (as opposed to its presence
    /// bit, if any) begins.
    pub fn value_offset(&self) -> u8 {
        if self.nullable {
            self.offset + 1
        } else {
            self.offset
        }
    }

    /// Number of bits occupied by the value itself, excluding the presence bit.
    pub fn value_bits(&self) -> u8 {
        if self.nullable {
            self.bits - 1
        } else {
            self.bits
        }
    }
}

/// Bits needed to represent a field's domain, *before* accounting for a
/// presence bit (§4.2).
fn bits_needed(variant: &FieldVariant) -> u32 {
    match variant {
        FieldVariant::Boolean => 1,

        FieldVariant::Integer { min, max } => {
            let range = (*max as i128 - *min as i128) as u128;
            bit_length_u128(range)
        }

        FieldVariant::Enum { values } => bit_length((values.len() - 1) as u64),

        FieldVariant::Date {
            resolution,
            min_date,
            max_date,
        } => {
            let span_seconds = (*max_date - *min_date).whole_seconds();
            let units_span = span_seconds / resolution.seconds_per_unit();
            bit_length(units_span as u64)
        }

        FieldVariant::Bitmask { flags } => {
            let max_position = flags.values().copied().max().unwrap_or(0);
            (max_position as u32) + 1
        }
    }
}

fn bit_length_u128(n: u128) -> u32 {
    if n == 0 {
        0
    } else {
        128 - n.leading_zeros()
    }
}

/// Deterministically assigns bit offsets to every field of `schema`, in
/// declared order, LSB-first, with no padding or reordering.
pub fn plan(schema: &Schema) -> Result<Vec<FieldLayout>, SchemaError> {
    let mut layouts = Vec::with_capacity(schema.fields.len());
    let mut offset: u32 = 0;
    let mut per_field = Vec::with_capacity(schema.fields.len());

    for (name, field) in &schema.fields {
        let needed = bits_needed(&field.variant);
        let bits = if field.nullable { needed + 1 } else { needed };

        per_field.push((name.clone(), bits as usize));
        layouts.push(FieldLayout {
            name: name.clone(),
            variant: field.variant.clone(),
            offset: offset as u8,
            bits: bits as u8,
            nullable: field.nullable,
        });

        offset += bits;
        if offset > 64 {
            return Err(SchemaError::SchemaTooLarge {
                schema: schema.name.clone(),
                total_bits: offset as usize,
                per_field,
            });
        }
    }

    Ok(layouts)
}

/// Total bits used by a planned layout.
pub fn total_bits(layouts: &[FieldLayout]) -> usize {
    layouts.iter().map(|l| l.bits as usize).sum()
}
