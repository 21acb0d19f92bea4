//! Recursive validation of assembled records against the schema tree.
//!
//! Checks per field, in schema order, depth-first:
//!
//! 1. **Enum membership** — for a declared enum, and for every enum variant
//!    inside a declared union, a non-null, non-empty value must be one of the
//!    declared symbols. This runs independently of the shape check.
//! 2. **Required-ness** — null against a non-nullable declared type is an
//!    inconsistency; null against a nullable union is valid.
//! 3. **Shape** — `string` fields require string values and `int` fields
//!    require integer values; a union accepts a value any of its non-null
//!    variants accepts. All other kinds (`long`, `float`, `double`, `boolean`,
//!    `bytes`, `enum`, `record`, `array`) accept any non-null value. The
//!    pipeline's coercion step means typed values still reach those fields;
//!    the binary encoder is the backstop for anything else.
//!
//! Validation never stops early: every applicable check runs so one row can
//! report several independent problems, addressed by field path
//! (`Detail[0].amount` style).

use crate::schema::{EnumType, PrimitiveKind, SchemaDefinition, SchemaType};
use crate::types::{AssembledRecord, Inconsistency, InconsistencyKind, Value};

/// Validate one assembled record; returns every inconsistency found.
///
/// An empty result means the record belongs in the valid partition. Message
/// order is deterministic: schema field order, enum check before shape check
/// per field, depth-first recursion into records and arrays.
pub fn validate_record(schema: &SchemaDefinition, record: &AssembledRecord) -> Vec<Inconsistency> {
    let mut messages = Vec::new();
    for field in &schema.root.fields {
        let value = record.field(&field.name).unwrap_or(&Value::Null);
        check_value(&mut messages, record.row, value, &field.field_type, &field.name);
    }
    messages
}

fn check_value(
    messages: &mut Vec<Inconsistency>,
    row: usize,
    value: &Value,
    declared: &SchemaType,
    path: &str,
) {
    check_enum_membership(messages, row, value, declared, path);

    match value {
        Value::Null => {
            let accepts_null = declared.is_nullable() || matches!(declared, SchemaType::Null);
            if !accepts_null {
                messages.push(Inconsistency::new(
                    row,
                    path,
                    value,
                    InconsistencyKind::InvalidValue,
                ));
            }
            // Nothing to recurse into.
            return;
        }
        _ => {
            if !shape_ok(value, declared) {
                messages.push(Inconsistency::new(
                    row,
                    path,
                    value,
                    InconsistencyKind::InvalidValue,
                ));
            }
        }
    }

    match (declared.unwrap_nullable(), value) {
        (SchemaType::Record(record_type), Value::Record(fields)) => {
            for field in &record_type.fields {
                let sub = fields
                    .iter()
                    .find(|(name, _)| name == &field.name)
                    .map(|(_, v)| v)
                    .unwrap_or(&Value::Null);
                let sub_path = format!("{path}.{}", field.name);
                check_value(messages, row, sub, &field.field_type, &sub_path);
            }
        }
        (SchemaType::Array(item_type), Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{i}]");
                check_value(messages, row, item, item_type, &item_path);
            }
        }
        _ => {}
    }
}

/// Enum membership for a direct enum and for every enum variant of a union.
fn check_enum_membership(
    messages: &mut Vec<Inconsistency>,
    row: usize,
    value: &Value,
    declared: &SchemaType,
    path: &str,
) {
    match declared {
        SchemaType::Enum(e) => check_symbols(messages, row, value, e, path),
        SchemaType::Union(variants) => {
            for variant in variants {
                if let SchemaType::Enum(e) = variant {
                    check_symbols(messages, row, value, e, path);
                }
            }
        }
        _ => {}
    }
}

fn check_symbols(
    messages: &mut Vec<Inconsistency>,
    row: usize,
    value: &Value,
    declared: &EnumType,
    path: &str,
) {
    let ok = match value {
        Value::Null => true,
        Value::Utf8(s) => s.is_empty() || declared.contains(s),
        // A non-string value can never be a symbol.
        _ => false,
    };
    if !ok {
        messages.push(Inconsistency::new(
            row,
            path,
            value,
            InconsistencyKind::NotInEnum {
                enum_name: declared.name.clone(),
            },
        ));
    }
}

/// Whether a non-null value satisfies the declared type's shape.
fn shape_ok(value: &Value, declared: &SchemaType) -> bool {
    match declared {
        SchemaType::Union(variants) => variants
            .iter()
            .filter(|v| !matches!(v, SchemaType::Null))
            .any(|v| shape_ok(value, v)),
        SchemaType::Primitive(PrimitiveKind::Int) => matches!(value, Value::Int64(_)),
        SchemaType::Primitive(PrimitiveKind::String) => matches!(value, Value::Utf8(_)),
        _ => true,
    }
}
