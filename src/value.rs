//! Host-language representation of record values, keyed by field name in a
//! [`Record`].

use std::collections::BTreeMap;

/// A single field's value as seen by [`crate::codec::encode`] and produced by
/// [`crate::codec::decode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
    Date(time::Date),
    DateTime(time::PrimitiveDateTime),
    /// Flag name -> whether it is set. Flags absent from the map are `false`.
    Bitmask(BTreeMap<String, bool>),
    /// A nullable field's absent value.
    Null,
}

/// A record: field name -> value, the unit of input to `encode` and output of `decode`.
pub type Record = BTreeMap<String, Value>;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bitmask(&self) -> Option<&BTreeMap<String, bool>> {
        match self {
            Value::Bitmask(m) => Some(m),
            _ => None,
        }
    }
}
