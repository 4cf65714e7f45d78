//! Compiles declarative field schemas into a deterministic bit layout packed
//! into a single 64-bit word, and provides the encoder, decoder, and derived
//! artifact generators (JSON Schema, human-readable layout tables, and Rust
//! accessor code) built on that layout.
//!
//! The pipeline is: a [`schema::SchemaDef`] is validated by
//! [`schema::Schema::compile`] into a [`schema::Schema`], [`layout::plan`]
//! assigns it bit offsets, and [`codec::encode`]/[`codec::decode`] translate
//! [`value::Record`]s to and from `u64` words against that layout. The
//! [`emit`] module derives artifacts from the same layout.

pub mod codec;
pub mod emit;
pub mod error;
pub mod field;
mod iso8601;
pub mod layout;
pub mod schema;
pub mod value;

pub use codec::{decode, encode};
pub use error::{EncodingError, SchemaError};
pub use field::{DateResolution, Field, FieldDef, FieldVariant};
pub use layout::{bit_length, plan, FieldLayout};
pub use schema::{Schema, SchemaDef};
pub use value::{Record, Value};
