//! Core data model types for conversion.
//!
//! A conversion run turns raw tabular rows ([`RawRow`]) plus caller-supplied
//! run constants ([`ConversionRequest`]) into schema-shaped records
//! ([`AssembledRecord`]), then partitions them into valid and rejected sets
//! ([`ConversionOutcome`]) with per-row diagnostics ([`Inconsistency`]).

use std::fmt;

use serde::Serialize;

/// A single typed value inside an assembled record.
///
/// Scalar variants mirror what string coercion can produce; `Array` and `Record`
/// carry the nested structure that schema-shaped records need.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Ordered list of values.
    Array(Vec<Value>),
    /// Ordered named fields.
    Record(Vec<(String, Value)>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    /// Renders the value the way diagnostics quote it: `Null` as `null`,
    /// strings bare (the message supplies the quotes), containers compactly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(v) => write!(f, "{v}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Record(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// One raw input row: a 1-based source row index plus positional string cells.
///
/// Column names live once in the source's header, not per row. Reading past the
/// end of a ragged row yields `""`, the same normalization the readers apply to
/// missing cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based row position in the source (header excluded).
    pub index: usize,
    /// Raw cell values in header order.
    pub values: Vec<String>,
}

impl RawRow {
    /// Create a raw row.
    pub fn new(index: usize, values: Vec<String>) -> Self {
        Self { index, values }
    }

    /// Cell at `column`, or `""` when the row is shorter than the header.
    pub fn get(&self, column: usize) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }
}

/// Caller-supplied constants for one conversion run.
///
/// `metadata` values fill the schema's top-level scalar fields (the same value
/// on every output record). `constant_columns` are injected into every row
/// before field mapping and take precedence over same-named source columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionRequest {
    /// Metadata field name → raw string value, in insertion order.
    pub metadata: Vec<(String, String)>,
    /// Column name → raw string value, in insertion order.
    pub constant_columns: Vec<(String, String)>,
}

impl ConversionRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a metadata field value (builder style).
    pub fn with_metadata(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((name.into(), value.into()));
        self
    }

    /// Add a constant column (builder style).
    pub fn with_constant_column(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.constant_columns.push((name.into(), value.into()));
        self
    }

    /// Raw metadata value for `name`, if supplied.
    pub fn metadata_value(&self, name: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Raw constant-column value for `name`, if supplied.
    pub fn constant_column_value(&self, name: &str) -> Option<&str> {
        self.constant_columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// One schema-shaped output record built from one input row.
///
/// `fields` follows the schema's top-level field order: coerced metadata
/// scalars plus the detail field holding a one-element [`Value::Array`] of one
/// [`Value::Record`].
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledRecord {
    /// 1-based source row this record was built from.
    pub row: usize,
    /// Top-level fields in schema order.
    pub fields: Vec<(String, Value)>,
}

impl AssembledRecord {
    /// Value of a top-level field by name, if present.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Why a value failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InconsistencyKind {
    /// The value is not one of the enum's declared symbols.
    NotInEnum {
        /// Name of the enum type the field declares.
        enum_name: String,
    },
    /// The value does not satisfy the declared type (wrong shape, or null for a
    /// non-nullable field).
    InvalidValue,
}

/// A row- and path-scoped validation failure.
///
/// Inconsistencies exclude their row from the valid set but never abort the
/// run. `Display` renders the stable message format downstream consumers parse:
///
/// ```text
/// Row 3: Field 'Detail[0].amount' invalid value 'abc'
/// Row 3: Field 'Detail[0].currency' value 'XXX' not valid for enum Currency
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inconsistency {
    /// 1-based source row.
    pub row: usize,
    /// Dotted/bracketed path to the offending value, e.g. `Detail[0].amount`.
    pub field_path: String,
    /// Offending value rendered as text (`null` for missing).
    pub value: String,
    /// Failure category.
    pub kind: InconsistencyKind,
}

impl Inconsistency {
    /// Create an inconsistency for `value` at `field_path` in `row`.
    pub fn new(row: usize, field_path: impl Into<String>, value: &Value, kind: InconsistencyKind) -> Self {
        Self {
            row,
            field_path: field_path.into(),
            value: value.to_string(),
            kind,
        }
    }
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            InconsistencyKind::NotInEnum { enum_name } => write!(
                f,
                "Row {}: Field '{}' value '{}' not valid for enum {}",
                self.row, self.field_path, self.value, enum_name
            ),
            InconsistencyKind::InvalidValue => write!(
                f,
                "Row {}: Field '{}' invalid value '{}'",
                self.row, self.field_path, self.value
            ),
        }
    }
}

/// A rejected input row with every inconsistency found in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    /// 1-based source row.
    pub row: usize,
    /// All inconsistencies for this row, in field order.
    pub messages: Vec<Inconsistency>,
}

/// Result of a complete conversion run.
///
/// `artifact` is `Some` iff at least one record was valid; a run where every
/// row was rejected is still a successful run with an empty artifact slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutcome {
    /// Records that passed validation, in source order.
    pub valid: Vec<AssembledRecord>,
    /// Rejected rows with diagnostics, in source order.
    pub rejected: Vec<RejectedRow>,
    /// Encoded binary artifact, when any record was valid.
    pub artifact: Option<Vec<u8>>,
}

impl ConversionOutcome {
    /// All diagnostic messages, row-major (row order, then field order inside
    /// each row), rendered in the stable message format.
    pub fn diagnostics(&self) -> Vec<String> {
        self.rejected
            .iter()
            .flat_map(|r| r.messages.iter().map(ToString::to_string))
            .collect()
    }

    /// Summary counters for this run.
    pub fn stats(&self) -> ConversionStats {
        ConversionStats {
            input_rows: self.valid.len() + self.rejected.len(),
            valid_rows: self.valid.len(),
            rejected_rows: self.rejected.len(),
            artifact_bytes: self.artifact.as_ref().map(Vec::len),
        }
    }
}

/// Summary counters for one conversion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Rows read from the source.
    pub input_rows: usize,
    /// Rows that produced a valid record.
    pub valid_rows: usize,
    /// Rows excluded by validation.
    pub rejected_rows: usize,
    /// Size of the encoded artifact, when one was produced.
    pub artifact_bytes: Option<usize>,
}
