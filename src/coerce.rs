//! Best-effort coercion of raw string cells to schema-declared types.
//!
//! Coercion is total: it always produces a [`Value`], never an error. Values
//! that cannot be read under the declared type become [`Value::Null`] and
//! surface later as validation inconsistencies, so one malformed cell can never
//! abort a run.

use crate::schema::{PrimitiveKind, SchemaType};
use crate::types::Value;

/// Coerce a raw cell to the declared type.
///
/// The declared type is null-stripped first, so a `["null", "int"]` field
/// coerces like an `int` field. Rules:
///
/// - `""` is always [`Value::Null`], whatever the declared type
/// - `int`/`long` parse as `i64` (surrounding whitespace tolerated);
///   unparseable text becomes null
/// - `float`/`double` parse as `f64` the same way
/// - `string` and `enum` keep the raw text (enum membership is the
///   validator's job, not coercion's)
/// - every other kind passes the raw text through unchanged
pub fn coerce(field_type: &SchemaType, raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }

    match field_type.unwrap_nullable() {
        SchemaType::Primitive(PrimitiveKind::Int) | SchemaType::Primitive(PrimitiveKind::Long) => {
            match raw.trim().parse::<i64>() {
                Ok(n) => Value::Int64(n),
                Err(_) => Value::Null,
            }
        }
        SchemaType::Primitive(PrimitiveKind::Float)
        | SchemaType::Primitive(PrimitiveKind::Double) => match raw.trim().parse::<f64>() {
            Ok(n) => Value::Float64(n),
            Err(_) => Value::Null,
        },
        // Strings, enums, and everything without a string-to-typed rule
        // (boolean, bytes, nested shapes) carry the raw text forward.
        _ => Value::Utf8(raw.to_string()),
    }
}
