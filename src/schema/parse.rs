//! Schema parsing (Avro-style JSON text into a [`SchemaDefinition`]).
//!
//! Supported type forms:
//! - primitive names: `"null"`, `"boolean"`, `"int"`, `"long"`, `"float"`,
//!   `"double"`, `"bytes"`, `"string"`
//! - object forms: `{"type": "record", ...}`, `{"type": "enum", ...}`,
//!   `{"type": "array", "items": ...}`, and object-wrapped primitives such as
//!   `{"type": "int", "logicalType": "date"}` (attributes beyond the type are
//!   ignored)
//! - unions as JSON arrays: `["null", "string"]`
//! - references to previously defined record/enum names, bare or
//!   namespace-qualified
//!
//! `map` and `fixed` are rejected as unsupported. A named type becomes
//! referenceable only after its definition completes, so self-recursive records
//! report as unresolved references.

use crate::error::{ConversionError, ConversionResult};
use crate::schema::types::{
    EnumType, Field, PrimitiveKind, RecordType, SchemaDefinition, SchemaType,
};

/// Parse schema text into a [`SchemaDefinition`].
///
/// Fails with [`ConversionError::SchemaParse`] when the text is not well-formed
/// JSON, the root is not a record, a record repeats a field name, a type
/// reference cannot be resolved, or an unsupported composite (`map`, `fixed`)
/// appears anywhere in the tree.
pub fn parse_schema(input: &str) -> ConversionResult<SchemaDefinition> {
    let json: serde_json::Value =
        serde_json::from_str(input).map_err(|e| ConversionError::SchemaParse {
            message: format!("schema is not valid json: {e}"),
        })?;

    let mut registry = TypeRegistry::default();
    let root_type = parse_type(&json, &mut registry)?;
    match root_type {
        SchemaType::Record(root) => Ok(SchemaDefinition::new(root, json)),
        other => Err(ConversionError::SchemaParse {
            message: format!("schema root must be a record, got {}", other.kind_name()),
        }),
    }
}

/// Named types (records, enums) seen so far, referenceable by bare and
/// namespace-qualified name.
#[derive(Default)]
struct TypeRegistry {
    named: Vec<(String, SchemaType)>,
}

impl TypeRegistry {
    fn register(&mut self, name: &str, namespace: Option<&str>, ty: &SchemaType) {
        self.named.push((name.to_string(), ty.clone()));
        if let Some(ns) = namespace {
            self.named.push((format!("{ns}.{name}"), ty.clone()));
        }
    }

    fn resolve(&self, name: &str) -> Option<&SchemaType> {
        self.named.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }
}

fn parse_type(v: &serde_json::Value, registry: &mut TypeRegistry) -> ConversionResult<SchemaType> {
    match v {
        serde_json::Value::String(name) => parse_type_name(name, registry),
        serde_json::Value::Array(variants) => {
            let mut parsed = Vec::with_capacity(variants.len());
            for variant in variants {
                parsed.push(parse_type(variant, registry)?);
            }
            Ok(SchemaType::Union(parsed))
        }
        serde_json::Value::Object(obj) => parse_type_object(obj, registry),
        other => Err(ConversionError::SchemaParse {
            message: format!("expected a type, got {other}"),
        }),
    }
}

fn parse_type_name(name: &str, registry: &TypeRegistry) -> ConversionResult<SchemaType> {
    if let Some(primitive) = primitive_from_name(name) {
        return Ok(primitive);
    }
    registry
        .resolve(name)
        .cloned()
        .ok_or_else(|| ConversionError::SchemaParse {
            message: format!("unknown type reference '{name}'"),
        })
}

fn primitive_from_name(name: &str) -> Option<SchemaType> {
    let kind = match name {
        "null" => return Some(SchemaType::Null),
        "boolean" => PrimitiveKind::Boolean,
        "int" => PrimitiveKind::Int,
        "long" => PrimitiveKind::Long,
        "float" => PrimitiveKind::Float,
        "double" => PrimitiveKind::Double,
        "bytes" => PrimitiveKind::Bytes,
        "string" => PrimitiveKind::String,
        _ => return None,
    };
    Some(SchemaType::Primitive(kind))
}

fn parse_type_object(
    obj: &serde_json::Map<String, serde_json::Value>,
    registry: &mut TypeRegistry,
) -> ConversionResult<SchemaType> {
    let type_value = obj.get("type").ok_or_else(|| ConversionError::SchemaParse {
        message: "type object is missing 'type'".to_string(),
    })?;

    // Nested object/array forms recurse; only a string discriminator is
    // dispatched here.
    let Some(type_name) = type_value.as_str() else {
        return parse_type(type_value, registry);
    };

    match type_name {
        "record" => parse_record(obj, registry),
        "enum" => parse_enum(obj, registry),
        "array" => {
            let items = obj.get("items").ok_or_else(|| ConversionError::SchemaParse {
                message: "array type is missing 'items'".to_string(),
            })?;
            Ok(SchemaType::Array(Box::new(parse_type(items, registry)?)))
        }
        "map" | "fixed" => Err(ConversionError::SchemaParse {
            message: format!("unsupported type '{type_name}'"),
        }),
        // Object-wrapped primitive or reference; extra attributes such as
        // logicalType are ignored.
        other => parse_type_name(other, registry),
    }
}

fn parse_record(
    obj: &serde_json::Map<String, serde_json::Value>,
    registry: &mut TypeRegistry,
) -> ConversionResult<SchemaType> {
    let name = require_name(obj, "record")?;
    let namespace = obj.get("namespace").and_then(|v| v.as_str());

    let fields_value = obj
        .get("fields")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ConversionError::SchemaParse {
            message: format!("record '{name}' is missing its 'fields' array"),
        })?;

    let mut fields: Vec<Field> = Vec::with_capacity(fields_value.len());
    for field_value in fields_value {
        let field_obj = field_value
            .as_object()
            .ok_or_else(|| ConversionError::SchemaParse {
                message: format!("record '{name}' has a non-object field entry"),
            })?;
        let field_name = field_obj
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ConversionError::SchemaParse {
                message: format!("record '{name}' has a field without a name"),
            })?;
        if fields.iter().any(|f| f.name == field_name) {
            return Err(ConversionError::SchemaParse {
                message: format!("duplicate field '{field_name}' in record '{name}'"),
            });
        }
        let field_type_value =
            field_obj
                .get("type")
                .ok_or_else(|| ConversionError::SchemaParse {
                    message: format!("field '{field_name}' in record '{name}' has no type"),
                })?;
        let field_type = parse_type(field_type_value, registry)?;
        fields.push(Field::new(field_name, field_type));
    }

    let record = SchemaType::Record(RecordType {
        name: name.to_string(),
        fields,
    });
    registry.register(name, namespace, &record);
    Ok(record)
}

fn parse_enum(
    obj: &serde_json::Map<String, serde_json::Value>,
    registry: &mut TypeRegistry,
) -> ConversionResult<SchemaType> {
    let name = require_name(obj, "enum")?;
    let namespace = obj.get("namespace").and_then(|v| v.as_str());

    let symbols_value = obj
        .get("symbols")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ConversionError::SchemaParse {
            message: format!("enum '{name}' is missing its 'symbols' array"),
        })?;

    let mut symbols = Vec::with_capacity(symbols_value.len());
    for symbol in symbols_value {
        let s = symbol.as_str().ok_or_else(|| ConversionError::SchemaParse {
            message: format!("enum '{name}' has a non-string symbol"),
        })?;
        symbols.push(s.to_string());
    }

    let parsed = SchemaType::Enum(EnumType {
        name: name.to_string(),
        symbols,
    });
    registry.register(name, namespace, &parsed);
    Ok(parsed)
}

fn require_name<'a>(
    obj: &'a serde_json::Map<String, serde_json::Value>,
    kind: &str,
) -> ConversionResult<&'a str> {
    obj.get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ConversionError::SchemaParse {
            message: format!("{kind} type is missing 'name'"),
        })
}
