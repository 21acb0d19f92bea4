//! Binary encoding seam.
//!
//! The pipeline hands validated records to a [`BinaryEncoder`] and stores the
//! returned bytes in the outcome. The shipped implementation is
//! [`AvroEncoder`]; anything else (a different container format, a test double
//! that counts calls) plugs in behind the same trait.

pub mod avro;

pub use avro::AvroEncoder;

use thiserror::Error;

use crate::schema::SchemaDefinition;
use crate::types::AssembledRecord;

/// Error type returned by binary encoders.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Backend failure (I/O into the container, malformed schema for the
    /// backend, serialization failure).
    #[error("avro error: {0}")]
    Avro(#[from] apache_avro::Error),

    /// A record's runtime shape cannot satisfy the schema. Validation upstream
    /// makes this unreachable for pipeline-produced records; seeing it means an
    /// internal invariant broke, so it is reported distinctly.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },
}

/// Encodes validated records into a binary artifact.
pub trait BinaryEncoder: Send + Sync {
    /// Encode `records` under `schema`, returning the artifact bytes.
    fn encode(
        &self,
        schema: &SchemaDefinition,
        records: &[AssembledRecord],
    ) -> Result<Vec<u8>, EncodeError>;
}
