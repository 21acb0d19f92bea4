//! Schema model: the typed tree and its parser.
//!
//! [`parse_schema`] turns Avro-style JSON schema text into a
//! [`SchemaDefinition`]; the tree types live in [`types`].

pub mod parse;
pub mod types;

pub use parse::parse_schema;
pub use types::{EnumType, Field, PrimitiveKind, RecordType, SchemaDefinition, SchemaType};
