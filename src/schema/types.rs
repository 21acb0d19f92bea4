//! Schema type tree.
//!
//! A parsed schema is a recursive [`SchemaType`] tree rooted at a
//! [`RecordType`]. The engine requires a specific root shape: exactly one
//! top-level field whose (null-stripped) type is an array of records (the
//! *detail field*, filled per input row); every other top-level field is a
//! scalar *metadata field*, filled once per run from the request.

use crate::error::{ConversionError, ConversionResult};

/// Primitive schema kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// Boolean.
    Boolean,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit floating point number.
    Float,
    /// 64-bit floating point number.
    Double,
    /// Byte sequence.
    Bytes,
    /// UTF-8 string.
    String,
}

impl PrimitiveKind {
    /// Returns the schema-level name for messages.
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Bytes => "bytes",
            PrimitiveKind::String => "string",
        }
    }
}

/// A named enumeration with an ordered symbol list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    /// Enum type name.
    pub name: String,
    /// Declared symbols, in schema order.
    pub symbols: Vec<String>,
}

impl EnumType {
    /// Whether `symbol` is one of the declared symbols.
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }
}

/// A single named, typed field in a [`RecordType`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Field type.
    pub field_type: SchemaType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, field_type: SchemaType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// A named record with an ordered field list.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    /// Record type name.
    pub name: String,
    /// Ordered list of fields. Names are unique (parser-enforced).
    pub fields: Vec<Field>,
}

impl RecordType {
    /// Returns a field by name, if present.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// A node in the schema type tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaType {
    /// The union null marker.
    Null,
    /// A primitive type.
    Primitive(PrimitiveKind),
    /// A named enumeration.
    Enum(EnumType),
    /// A named record.
    Record(RecordType),
    /// A homogeneous array (item type boxed to allow recursion).
    Array(Box<SchemaType>),
    /// A union of variants; nullable iff one variant is [`SchemaType::Null`].
    Union(Vec<SchemaType>),
}

impl SchemaType {
    /// The effective type behind optionality: for a union, the first non-null
    /// variant; every other node (and an all-null union) is returned as is.
    pub fn unwrap_nullable(&self) -> &SchemaType {
        match self {
            SchemaType::Union(variants) => variants
                .iter()
                .find(|v| !matches!(v, SchemaType::Null))
                .unwrap_or(self),
            other => other,
        }
    }

    /// Whether null is an admissible value (a union with a null variant).
    pub fn is_nullable(&self) -> bool {
        match self {
            SchemaType::Union(variants) => variants.iter().any(|v| matches!(v, SchemaType::Null)),
            _ => false,
        }
    }

    /// Returns the kind name for messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SchemaType::Null => "null",
            SchemaType::Primitive(kind) => kind.name(),
            SchemaType::Enum(_) => "enum",
            SchemaType::Record(_) => "record",
            SchemaType::Array(_) => "array",
            SchemaType::Union(_) => "union",
        }
    }
}

/// A fully parsed schema: the root record tree plus the retained source JSON.
///
/// The JSON is kept verbatim so the binary encoder can hand the exact caller
/// schema to its backend instead of re-rendering the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDefinition {
    /// Root record (the output record shape).
    pub root: RecordType,
    /// The schema source, as parsed JSON.
    pub json: serde_json::Value,
}

impl SchemaDefinition {
    /// Create a definition from an already-built tree and its source JSON.
    pub fn new(root: RecordType, json: serde_json::Value) -> Self {
        Self { root, json }
    }

    /// Locates the unique top-level field holding an array of records.
    ///
    /// Returns the field name and the array's item record. Fails with
    /// [`ConversionError::SchemaShape`] when no top-level field (or more than
    /// one) has that shape.
    pub fn detail_field(&self) -> ConversionResult<(&str, &RecordType)> {
        let mut found: Option<(&str, &RecordType)> = None;
        for field in &self.root.fields {
            let SchemaType::Array(item) = field.field_type.unwrap_nullable() else {
                continue;
            };
            let SchemaType::Record(record) = item.unwrap_nullable() else {
                continue;
            };
            if let Some((first, _)) = found {
                return Err(ConversionError::SchemaShape {
                    message: format!(
                        "expected exactly one array-of-record field, found at least two: '{first}' and '{}'",
                        field.name
                    ),
                });
            }
            found = Some((field.name.as_str(), record));
        }
        found.ok_or_else(|| ConversionError::SchemaShape {
            message: format!(
                "record '{}' has no top-level array-of-record field",
                self.root.name
            ),
        })
    }

    /// Top-level fields other than the detail field, in schema order.
    ///
    /// Callers that already resolved the detail field pass its name to avoid a
    /// second shape scan.
    pub fn metadata_fields<'a>(&'a self, detail_name: &'a str) -> impl Iterator<Item = &'a Field> {
        self.root.fields.iter().filter(move |f| f.name != detail_name)
    }
}
