//! `csv2avro` is a small library for converting delimited tabular data into a schema-validated
//! Avro container, using a user-provided Avro record schema.
//!
//! The primary entrypoint is [`pipeline::ConversionPipeline`], which runs one source of rows
//! through assembly, validation, partitioning, and encoding in a single call, producing a
//! [`types::ConversionOutcome`].
//!
//! ## What a conversion does
//!
//! The schema must be a record with exactly one array-of-records field (the **detail** field);
//! every source row becomes one detail element, and the remaining top-level fields are filled
//! from per-run metadata supplied in a [`types::ConversionRequest`]:
//!
//! - **Coercion** is total: each cell is parsed under its declared type, and anything that
//!   cannot parse becomes [`types::Value::Null`]. Empty cells are always `Null`.
//! - **Validation** walks each assembled record against the schema and collects one
//!   path-qualified message per problem (`Row 3: Field 'Detail[0].amount' invalid value 'null'`).
//! - **Partitioning** splits rows into valid and rejected sets, both in source order. Rejected
//!   rows never abort a run; schema, request, reader, sink, and encoder problems do.
//! - **Encoding** writes the valid records into an Avro object container file
//!   ([`encode::AvroEncoder`]), skipped entirely when no row survived.
//!
//! Schema trees are parsed from Avro JSON by [`schema::parse_schema`] and support `null`,
//! the seven standard primitives, enums, records, arrays, and unions.
//!
//! ## Quick example: convert in-memory rows
//!
//! ```
//! use csv2avro::pipeline::ConversionPipeline;
//! use csv2avro::schema::parse_schema;
//! use csv2avro::tabular::MemorySource;
//! use csv2avro::types::ConversionRequest;
//!
//! # fn main() -> Result<(), csv2avro::ConversionError> {
//! let schema = parse_schema(r#"{
//!     "type": "record",
//!     "name": "Report",
//!     "fields": [
//!         {"name": "period", "type": ["null", "string"]},
//!         {"name": "Detail", "type": {"type": "array", "items": {
//!             "type": "record",
//!             "name": "Movement",
//!             "fields": [
//!                 {"name": "code", "type": "string"},
//!                 {"name": "amount", "type": ["null", "long"]}
//!             ]
//!         }}}
//!     ]
//! }"#)?;
//!
//! let request = ConversionRequest::new().with_metadata("period", "2024-09");
//! let rows = MemorySource::new(
//!     ["code", "amount"],
//!     vec![
//!         vec!["A-1".to_string(), "125".to_string()],
//!         vec!["".to_string(), "40".to_string()],
//!     ],
//! );
//!
//! let outcome = ConversionPipeline::new(schema).run(&request, rows)?;
//! assert_eq!(outcome.valid.len(), 1);
//! assert!(outcome.artifact.is_some());
//! assert_eq!(
//!     outcome.diagnostics(),
//!     vec!["Row 2: Field 'Detail[0].code' invalid value 'null'"]
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Converting files
//!
//! CSV input reads through [`tabular::CsvRowReader`] with a `;` delimiter by default, and a
//! [`sink::FileSink`] persists rejected-row diagnostics before the artifact is encoded:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use csv2avro::pipeline::ConversionPipeline;
//! use csv2avro::schema::parse_schema;
//! use csv2avro::sink::FileSink;
//! use csv2avro::tabular::CsvRowReader;
//! use csv2avro::types::ConversionRequest;
//!
//! # fn main() -> Result<(), csv2avro::ConversionError> {
//! let schema = parse_schema(&std::fs::read_to_string("report.avsc")?)?;
//! let reader = CsvRowReader::from_path("movements.csv")?;
//!
//! let pipeline =
//!     ConversionPipeline::new(schema).with_sink(Arc::new(FileSink::new("movements.log")));
//! let outcome = pipeline.run(&ConversionRequest::new(), reader)?;
//!
//! if let Some(bytes) = &outcome.artifact {
//!     std::fs::write("movements.avro", bytes)?;
//! }
//! println!("valid={} rejected={}", outcome.valid.len(), outcome.rejected.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`pipeline`]: the conversion engine, execution modes, and run observers
//! - [`schema`]: Avro JSON parsing and the schema type tree
//! - [`tabular`]: row sources (CSV files, in-memory rows)
//! - [`coerce`]: text-to-typed-value coercion
//! - [`assemble`]: row-to-record assembly against a schema and request
//! - [`validate`]: schema conformance checks with path-qualified messages
//! - [`encode`]: binary encoders ([`encode::AvroEncoder`])
//! - [`sink`]: diagnostics destinations (file, stderr, in-memory)
//! - [`types`]: values, requests, rows, outcomes, and inconsistency messages
//! - [`error`]: error types used across conversion

pub mod assemble;
pub mod coerce;
pub mod encode;
pub mod error;
pub mod pipeline;
pub mod schema;
pub mod sink;
pub mod tabular;
pub mod types;
pub mod validate;

pub use error::{ConversionError, ConversionResult};
