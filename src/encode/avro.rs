//! Avro object-container encoding over the `apache-avro` crate.
//!
//! The caller's schema JSON is handed to the backend verbatim, and each
//! [`AssembledRecord`] is converted to an [`apache_avro::types::Value`] guided
//! by the declared type tree, so union branch indices and enum positions come
//! from the schema rather than from guessing at runtime shapes.

use apache_avro::types::Value as AvroValue;
use apache_avro::{Schema, Writer};

use crate::encode::{BinaryEncoder, EncodeError};
use crate::schema::{PrimitiveKind, RecordType, SchemaDefinition, SchemaType};
use crate::types::{AssembledRecord, Value};

/// The shipped [`BinaryEncoder`]: Avro object-container file bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvroEncoder;

impl BinaryEncoder for AvroEncoder {
    fn encode(
        &self,
        schema: &SchemaDefinition,
        records: &[AssembledRecord],
    ) -> Result<Vec<u8>, EncodeError> {
        let avro_schema = Schema::parse_str(&schema.json.to_string())?;
        let mut writer = Writer::new(&avro_schema, Vec::new());
        for record in records {
            let value = record_to_avro(&schema.root, &record.fields, "")?;
            writer.append(value)?;
        }
        Ok(writer.into_inner()?)
    }
}

fn record_to_avro(
    record_type: &RecordType,
    fields: &[(String, Value)],
    path: &str,
) -> Result<AvroValue, EncodeError> {
    let mut out = Vec::with_capacity(record_type.fields.len());
    for field in &record_type.fields {
        let value = fields
            .iter()
            .find(|(name, _)| name == &field.name)
            .map(|(_, v)| v)
            .unwrap_or(&Value::Null);
        let sub_path = if path.is_empty() {
            field.name.clone()
        } else {
            format!("{path}.{}", field.name)
        };
        out.push((
            field.name.clone(),
            to_avro(&field.field_type, value, &sub_path)?,
        ));
    }
    Ok(AvroValue::Record(out))
}

fn to_avro(declared: &SchemaType, value: &Value, path: &str) -> Result<AvroValue, EncodeError> {
    match declared {
        SchemaType::Union(variants) => {
            if value.is_null() {
                let null_pos = variants
                    .iter()
                    .position(|v| matches!(v, SchemaType::Null))
                    .ok_or_else(|| mismatch(path, value, "union has no null variant"))?;
                return Ok(AvroValue::Union(null_pos as u32, Box::new(AvroValue::Null)));
            }
            for (i, variant) in variants.iter().enumerate() {
                if matches!(variant, SchemaType::Null) {
                    continue;
                }
                if let Ok(converted) = to_avro(variant, value, path) {
                    return Ok(AvroValue::Union(i as u32, Box::new(converted)));
                }
            }
            Err(mismatch(path, value, "value fits no union variant"))
        }
        SchemaType::Null => {
            if value.is_null() {
                Ok(AvroValue::Null)
            } else {
                Err(mismatch(path, value, "declared type is null"))
            }
        }
        SchemaType::Primitive(kind) => primitive_to_avro(*kind, value, path),
        SchemaType::Enum(e) => match value {
            Value::Utf8(s) => {
                let pos = e
                    .symbols
                    .iter()
                    .position(|symbol| symbol == s)
                    .ok_or_else(|| {
                        mismatch(path, value, &format!("not a symbol of enum {}", e.name))
                    })?;
                Ok(AvroValue::Enum(pos as u32, s.clone()))
            }
            _ => Err(mismatch(
                path,
                value,
                &format!("enum {} requires a string symbol", e.name),
            )),
        },
        SchemaType::Record(record_type) => match value {
            Value::Record(fields) => record_to_avro(record_type, fields, path),
            _ => Err(mismatch(path, value, "declared type is a record")),
        },
        SchemaType::Array(item_type) => match value {
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(to_avro(item_type, item, &format!("{path}[{i}]"))?);
                }
                Ok(AvroValue::Array(out))
            }
            _ => Err(mismatch(path, value, "declared type is an array")),
        },
    }
}

fn primitive_to_avro(
    kind: PrimitiveKind,
    value: &Value,
    path: &str,
) -> Result<AvroValue, EncodeError> {
    if value.is_null() {
        return Err(mismatch(path, value, "declared type is not nullable"));
    }
    match (kind, value) {
        (PrimitiveKind::Boolean, Value::Bool(b)) => Ok(AvroValue::Boolean(*b)),
        (PrimitiveKind::Int, Value::Int64(n)) => i32::try_from(*n)
            .map(AvroValue::Int)
            .map_err(|_| mismatch(path, value, "out of range for int")),
        (PrimitiveKind::Long, Value::Int64(n)) => Ok(AvroValue::Long(*n)),
        // Numeric promotion mirrors Avro's int -> float/double rules.
        (PrimitiveKind::Float, Value::Float64(f)) => Ok(AvroValue::Float(*f as f32)),
        (PrimitiveKind::Float, Value::Int64(n)) => Ok(AvroValue::Float(*n as f32)),
        (PrimitiveKind::Double, Value::Float64(f)) => Ok(AvroValue::Double(*f)),
        (PrimitiveKind::Double, Value::Int64(n)) => Ok(AvroValue::Double(*n as f64)),
        (PrimitiveKind::Bytes, Value::Utf8(s)) => Ok(AvroValue::Bytes(s.clone().into_bytes())),
        (PrimitiveKind::String, Value::Utf8(s)) => Ok(AvroValue::String(s.clone())),
        (kind, value) => Err(mismatch(
            path,
            value,
            &format!("cannot encode as {}", kind.name()),
        )),
    }
}

fn mismatch(path: &str, value: &Value, reason: &str) -> EncodeError {
    EncodeError::SchemaMismatch {
        message: format!("value '{value}' at '{path}': {reason}"),
    }
}
