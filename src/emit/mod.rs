//! Derived-artifact generators built from a planned [`crate::layout::FieldLayout`]
//! sequence: a JSON Schema description, human-readable bit-layout tables, and
//! generated Rust accessor source.

pub mod codegen;
pub mod json_schema;
pub mod layout_table;

pub use codegen::emit_rust_accessor;
pub use json_schema::emit_json_schema;
pub use layout_table::{emit_ascii_table, emit_markdown_table};
