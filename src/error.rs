use thiserror::Error;

use crate::encode::EncodeError;

/// Convenience result type for conversion operations.
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Error type returned by conversion functions.
///
/// This is the single fatal-error enum for the whole run: schema problems, request
/// problems, reader/sink I/O, and encoder failures. Per-row validation problems are
/// not errors; they are [`crate::types::Inconsistency`] values carried in the outcome.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The schema text is not a well-formed, supported schema description.
    #[error("schema parse error: {message}")]
    SchemaParse { message: String },

    /// The schema parsed but does not have the shape this engine requires
    /// (exactly one top-level array-of-record detail field).
    #[error("schema shape error: {message}")]
    SchemaShape { message: String },

    /// The conversion request references unknown fields or carries values that do
    /// not fit the declared metadata types. All problems are reported together.
    #[error("invalid conversion request: {}", .issues.join("; "))]
    RequestValidation { issues: Vec<String> },

    /// The binary encoder rejected records that passed validation.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
}
