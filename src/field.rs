//! Definition of the field variants that make up a [`crate::schema::Schema`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Granularity at which a [`FieldVariant::Date`] field is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateResolution {
    Day,
    Hour,
    Minute,
    Second,
}

impl DateResolution {
    /// Number of seconds in one resolution tick.
    pub(crate) fn seconds_per_unit(self) -> i64 {
        match self {
            DateResolution::Day => 86_400,
            DateResolution::Hour => 3_600,
            DateResolution::Minute => 60,
            DateResolution::Second => 1,
        }
    }
}

/// A single named field's type and constraints, independent of its bit layout.
///
/// This is the validated, closed form produced by [`crate::schema::Schema::compile`]
/// from a [`FieldDef`]. Every codec and emitter site matches on this exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldVariant {
    Boolean,
    Integer {
        min: i64,
        max: i64,
        /// Whether the emitted accessor's native field type should be signed.
        signed: bool,
    },
    Enum {
        values: Vec<String>,
    },
    Date {
        resolution: DateResolution,
        min_date: time::PrimitiveDateTime,
        max_date: time::PrimitiveDateTime,
    },
    Bitmask {
        /// Flag name -> bit position, insertion order preserved.
        flags: IndexMap<String, u8>,
    },
}

impl FieldVariant {
    pub fn tag(&self) -> &'static str {
        match self {
            FieldVariant::Boolean => "bool",
            FieldVariant::Integer { .. } => "int",
            FieldVariant::Enum { .. } => "enum",
            FieldVariant::Date { .. } => "date",
            FieldVariant::Bitmask { .. } => "bitmask",
        }
    }
}

/// A validated field: its variant plus the `nullable` flag every variant carries.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub variant: FieldVariant,
    pub nullable: bool,
}

/// Raw, not-yet-validated description of a field's type and constraints, as
/// deserialized from a JSON or YAML schema document.
///
/// This is the type an external loader (out of scope for this crate) parses
/// a file into; [`crate::schema::Schema::compile`] turns a map of these into
/// validated [`FieldVariant`]s.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldDef {
    Bool {
        #[serde(default)]
        nullable: bool,
    },
    Int {
        min: i64,
        max: i64,
        #[serde(default)]
        signed: bool,
        #[serde(default)]
        nullable: bool,
    },
    Enum {
        values: Vec<String>,
        #[serde(default)]
        nullable: bool,
    },
    Date {
        resolution: DateResolution,
        min_date: String,
        max_date: String,
        #[serde(default)]
        nullable: bool,
    },
    Bitmask {
        flags: IndexMap<String, u8>,
        #[serde(default)]
        nullable: bool,
    },
}

impl FieldDef {
    pub fn nullable(&self) -> bool {
        match self {
            FieldDef::Bool { nullable }
            | FieldDef::Int { nullable, .. }
            | FieldDef::Enum { nullable, .. }
            | FieldDef::Date { nullable, .. }
            | FieldDef::Bitmask { nullable, .. } => *nullable,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            FieldDef::Bool { .. } => "bool",
            FieldDef::Int { .. } => "int",
            FieldDef::Enum { .. } => "enum",
            FieldDef::Date { .. } => "date",
            FieldDef::Bitmask { .. } => "bitmask",
        }
    }
}
