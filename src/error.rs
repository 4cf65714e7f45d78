//! Error taxonomy for schema validation, layout planning, and encoding.
//!
//! Every variant carries enough context (field name, violated rule, and —
//! where relevant — the offending value) for a caller to build a useful
//! diagnostic without the core needing to format or log anything itself.

use thiserror::Error;

/// Clips a debug-formatted value to a length safe to echo back to a caller.
fn clip(value: impl std::fmt::Debug) -> String {
    let s = format!("{value:?}");
    const MAX: usize = 200;
    if s.len() > MAX {
        let mut s = s;
        s.truncate(MAX);
        s.push('…');
        s
    } else {
        s
    }
}

/// Errors raised while validating a raw schema and compiling its bit layout.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("field '{field}' has unknown variant tag '{tag}'")]
    UnknownVariant { field: String, tag: String },

    #[error("field '{field}' is missing required attribute '{attribute}'")]
    MissingAttribute { field: String, attribute: String },

    #[error("'{path}' is not a valid identifier: {value}")]
    InvalidIdentifier { path: String, value: String },

    #[error("duplicate field name '{field}'")]
    DuplicateFieldName { field: String },

    #[error("field '{field}': integer range is inverted (min={min}, max={max})")]
    IntegerRangeInverted { field: String, min: i64, max: i64 },

    #[error("field '{field}': integer range does not fit in 64 bits (min={min}, max={max})")]
    IntegerRangeOverflow { field: String, min: i64, max: i64 },

    #[error("field '{field}': enum has no values")]
    EnumEmpty { field: String },

    #[error("field '{field}': enum has {count} values, maximum is 255")]
    EnumTooLarge { field: String, count: usize },

    #[error("field '{field}': enum value '{value}' is duplicated")]
    EnumDuplicate { field: String, value: String },

    #[error("field '{field}': date range is inverted (min={min_date}, max={max_date})")]
    DateRangeInverted {
        field: String,
        min_date: String,
        max_date: String,
    },

    #[error("field '{field}': '{value}' is not a valid ISO 8601 date for attribute '{attribute}'")]
    DateParseError {
        field: String,
        attribute: String,
        value: String,
    },

    #[error("field '{field}': bitmask flag '{flag}' position {position} exceeds 63")]
    BitmaskPositionOutOfRange {
        field: String,
        flag: String,
        position: u8,
    },

    #[error("field '{field}': bitmask position {position} is used by more than one flag")]
    BitmaskPositionDuplicate { field: String, position: u8 },

    #[error("field '{field}': bitmask has no flags")]
    BitmaskEmpty { field: String },

    #[error("schema '{schema}' needs {total_bits} bits, which exceeds the 64-bit budget: {per_field:?}")]
    SchemaTooLarge {
        schema: String,
        total_bits: usize,
        per_field: Vec<(String, usize)>,
    },
}

impl SchemaError {
    pub fn invalid_identifier(path: impl Into<String>, value: impl std::fmt::Debug) -> Self {
        SchemaError::InvalidIdentifier {
            path: path.into(),
            value: clip(value),
        }
    }
}

/// Errors raised while encoding a record into a packed word.
#[derive(Debug, Error, PartialEq)]
pub enum EncodingError {
    #[error("record is missing required field(s): {fields:?}")]
    MissingField { fields: Vec<String> },

    #[error("field '{field}' expected a value of a different type, got {value}")]
    TypeMismatch { field: String, value: String },

    #[error("field '{field}' value {value} is out of range")]
    OutOfRange { field: String, value: String },

    #[error("field '{field}' value '{value}' is not one of the declared enum values")]
    UnknownEnumValue { field: String, value: String },

    #[error("field '{field}' has unknown bitmask flag '{flag}'")]
    UnknownFlag { field: String, flag: String },

    #[error("field '{field}' is not nullable but received null")]
    NullNotAllowed { field: String },
}

impl EncodingError {
    pub fn type_mismatch(field: impl Into<String>, value: impl std::fmt::Debug) -> Self {
        EncodingError::TypeMismatch {
            field: field.into(),
            value: clip(value),
        }
    }

    pub fn out_of_range(field: impl Into<String>, value: impl std::fmt::Debug) -> Self {
        EncodingError::OutOfRange {
            field: field.into(),
            value: clip(value),
        }
    }
}
