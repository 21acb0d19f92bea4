//! Record assembly: one schema-shaped record per input row.
//!
//! All name resolution happens once, up front: metadata fields are coerced from
//! the request into a reusable template, and every detail field is bound to a
//! constant-column value, a header index, or nothing. Per-row work is then a
//! template clone plus positional cell coercion, with no name lookups.

use crate::coerce::coerce;
use crate::error::ConversionResult;
use crate::schema::{RecordType, SchemaDefinition};
use crate::types::{AssembledRecord, ConversionRequest, RawRow, Value};

/// Where a detail field's value comes from for every row.
#[derive(Debug, Clone)]
enum ColumnBinding {
    /// Caller-supplied constant, coerced once.
    Constant(Value),
    /// Source column at this header index.
    Column(usize),
    /// No constant and no matching header; always null.
    Missing,
}

/// One top-level output field in schema order.
#[derive(Debug, Clone)]
enum TemplateSlot {
    /// Metadata field with its pre-coerced run-constant value.
    Metadata(String, Value),
    /// The detail field, filled per row.
    Detail(String),
}

/// Builds [`AssembledRecord`]s for one run.
///
/// Construction resolves the schema's detail field, coerces the request
/// metadata against the declared types (fields absent from the request become
/// null), and binds each detail field by name. Constant columns take precedence
/// over same-named source columns.
#[derive(Debug)]
pub struct RecordAssembler<'a> {
    detail_record: &'a RecordType,
    template: Vec<TemplateSlot>,
    bindings: Vec<ColumnBinding>,
}

impl<'a> RecordAssembler<'a> {
    /// Resolve bindings for `schema`, `request`, and the source's `headers`.
    ///
    /// Fails with [`crate::error::ConversionError::SchemaShape`] when the
    /// schema has no unique detail field.
    pub fn new(
        schema: &'a SchemaDefinition,
        request: &ConversionRequest,
        headers: &[String],
    ) -> ConversionResult<Self> {
        let (detail_name, detail_record) = schema.detail_field()?;

        let template = schema
            .root
            .fields
            .iter()
            .map(|field| {
                if field.name == detail_name {
                    TemplateSlot::Detail(field.name.clone())
                } else {
                    let raw = request.metadata_value(&field.name).unwrap_or("");
                    TemplateSlot::Metadata(field.name.clone(), coerce(&field.field_type, raw))
                }
            })
            .collect();

        let bindings = detail_record
            .fields
            .iter()
            .map(|field| {
                if let Some(raw) = request.constant_column_value(&field.name) {
                    ColumnBinding::Constant(coerce(&field.field_type, raw))
                } else if let Some(idx) = headers.iter().position(|h| h == &field.name) {
                    ColumnBinding::Column(idx)
                } else {
                    ColumnBinding::Missing
                }
            })
            .collect();

        Ok(Self {
            detail_record,
            template,
            bindings,
        })
    }

    /// Assemble the record for one row.
    ///
    /// Total: coercion failures become nulls inside the record, and the
    /// validator decides their fate. The detail field always holds a
    /// one-element array with one item record (one row, one detail element).
    pub fn assemble(&self, row: &RawRow) -> AssembledRecord {
        let fields = self
            .template
            .iter()
            .map(|slot| match slot {
                TemplateSlot::Metadata(name, value) => (name.clone(), value.clone()),
                TemplateSlot::Detail(name) => {
                    let item = self.assemble_detail_item(row);
                    (name.clone(), Value::Array(vec![item]))
                }
            })
            .collect();

        AssembledRecord {
            row: row.index,
            fields,
        }
    }

    fn assemble_detail_item(&self, row: &RawRow) -> Value {
        let fields = self
            .detail_record
            .fields
            .iter()
            .zip(&self.bindings)
            .map(|(field, binding)| {
                let value = match binding {
                    ColumnBinding::Constant(value) => value.clone(),
                    ColumnBinding::Column(idx) => coerce(&field.field_type, row.get(*idx)),
                    ColumnBinding::Missing => Value::Null,
                };
                (field.name.clone(), value)
            })
            .collect();
        Value::Record(fields)
    }
}
