//! Conversion pipeline: load, assemble, validate, partition, encode, log.
//!
//! [`ConversionPipeline::run`] is the whole engine in one call:
//!
//! 1. validate the request against the schema (fatal on any problem)
//! 2. assemble one record per source row, coercing cells to declared types
//! 3. validate every record, collecting path-qualified inconsistencies
//! 4. partition into valid and rejected sets, preserving source order
//! 5. persist diagnostics through the configured sink (rejected rows only)
//! 6. encode valid records into the binary artifact (skipped when none)
//!
//! Schema, shape, request, reader, sink, and encoder problems abort the run
//! with exactly one error; per-row problems only exclude their row.

mod observer;

use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

pub use observer::{
    CompositeObserver, ConversionContext, ConversionObserver, ConversionSeverity, StdErrObserver,
};

use crate::assemble::RecordAssembler;
use crate::encode::{AvroEncoder, BinaryEncoder};
use crate::error::{ConversionError, ConversionResult};
use crate::schema::{PrimitiveKind, SchemaDefinition, SchemaType};
use crate::sink::DiagnosticsSink;
use crate::tabular::RowSource;
use crate::types::{
    AssembledRecord, ConversionOutcome, ConversionRequest, Inconsistency, RawRow, RejectedRow,
};
use crate::validate::validate_record;

/// How rows are processed within one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Stream rows one at a time on the calling thread (default).
    Sequential,
    /// Collect rows, then process fixed-size chunks on a rayon pool. Chunk
    /// outputs are merged back in range order, so outcomes are identical to
    /// sequential runs.
    Parallel {
        /// Worker threads; `None` uses the platform's available parallelism.
        num_threads: Option<usize>,
        /// Rows per chunk.
        chunk_size: usize,
    },
}

impl Default for ExecutionMode {
    fn default() -> Self {
        Self::Sequential
    }
}

/// Options controlling pipeline behavior.
///
/// Use [`Default`] for common cases: sequential execution, no observer, no
/// sink, alerts at `Critical`.
#[derive(Clone)]
pub struct ConversionOptions {
    /// Row processing strategy.
    pub execution: ExecutionMode,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ConversionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ConversionSeverity,
    /// Optional destination for rejected-row diagnostics.
    pub sink: Option<Arc<dyn DiagnosticsSink>>,
}

impl fmt::Debug for ConversionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionOptions")
            .field("execution", &self.execution)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .field("sink_set", &self.sink.is_some())
            .finish()
    }
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            execution: ExecutionMode::Sequential,
            observer: None,
            alert_at_or_above: ConversionSeverity::Critical,
            sink: None,
        }
    }
}

/// The conversion engine for one schema.
///
/// A pipeline is immutable and reusable: each [`run`](Self::run) consumes one
/// row source and produces one [`ConversionOutcome`], with no state carried
/// between runs.
///
/// # Examples
///
/// ```
/// use csv2avro::pipeline::ConversionPipeline;
/// use csv2avro::schema::parse_schema;
/// use csv2avro::tabular::MemorySource;
/// use csv2avro::types::ConversionRequest;
///
/// # fn main() -> Result<(), csv2avro::ConversionError> {
/// let schema = parse_schema(r#"{
///     "type": "record",
///     "name": "Report",
///     "fields": [
///         {"name": "period", "type": ["null", "string"]},
///         {"name": "Detail", "type": {"type": "array", "items": {
///             "type": "record",
///             "name": "Movement",
///             "fields": [
///                 {"name": "code", "type": "string"},
///                 {"name": "amount", "type": "int"}
///             ]
///         }}}
///     ]
/// }"#)?;
///
/// let request = ConversionRequest::new().with_metadata("period", "2024-09");
/// let source = MemorySource::new(
///     ["code", "amount"],
///     vec![
///         vec!["A-1".to_string(), "10".to_string()],
///         vec!["A-2".to_string(), "not a number".to_string()],
///     ],
/// );
///
/// let outcome = ConversionPipeline::new(schema).run(&request, source)?;
/// assert_eq!(outcome.valid.len(), 1);
/// assert_eq!(outcome.rejected.len(), 1);
/// assert!(outcome.artifact.is_some());
/// assert_eq!(
///     outcome.diagnostics(),
///     vec!["Row 2: Field 'Detail[0].amount' invalid value 'null'"]
/// );
/// # Ok(())
/// # }
/// ```
pub struct ConversionPipeline {
    schema: SchemaDefinition,
    encoder: Arc<dyn BinaryEncoder>,
    options: ConversionOptions,
}

impl fmt::Debug for ConversionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionPipeline")
            .field("schema", &self.schema.root.name)
            .field("options", &self.options)
            .finish()
    }
}

impl ConversionPipeline {
    /// Create a pipeline with the default [`AvroEncoder`] and default options.
    pub fn new(schema: SchemaDefinition) -> Self {
        Self {
            schema,
            encoder: Arc::new(AvroEncoder),
            options: ConversionOptions::default(),
        }
    }

    /// Replace the binary encoder.
    pub fn with_encoder(mut self, encoder: Arc<dyn BinaryEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    /// Replace the options wholesale.
    ///
    /// # Panics
    ///
    /// Panics if `options.execution` is [`ExecutionMode::Parallel`] with
    /// `chunk_size == 0` or `num_threads == Some(0)`.
    pub fn with_options(mut self, options: ConversionOptions) -> Self {
        if let ExecutionMode::Parallel {
            num_threads,
            chunk_size,
        } = &options.execution
        {
            assert!(*chunk_size > 0, "chunk_size must be > 0");
            if let Some(n) = num_threads {
                assert!(*n > 0, "num_threads must be > 0 when set");
            }
        }
        self.options = options;
        self
    }

    /// Attach an observer for run outcomes (logging/alerts).
    pub fn with_observer(mut self, observer: Arc<dyn ConversionObserver>) -> Self {
        self.options.observer = Some(observer);
        self
    }

    /// Attach a diagnostics sink for rejected-row messages.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.options.sink = Some(sink);
        self
    }

    /// The schema this pipeline converts into.
    pub fn schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    /// Run one conversion over `source` with the run constants in `request`.
    ///
    /// When an observer is configured, this reports:
    ///
    /// - `on_success` with partition counters after a complete outcome
    /// - `on_failure` with a computed severity on a fatal error
    /// - `on_alert` on failure when the severity is >= `alert_at_or_above`
    pub fn run<S: RowSource>(
        &self,
        request: &ConversionRequest,
        source: S,
    ) -> ConversionResult<ConversionOutcome> {
        let ctx = ConversionContext {
            schema: self.schema.root.name.clone(),
        };

        let result = self.run_inner(request, source);

        if let Some(obs) = self.options.observer.as_ref() {
            match &result {
                Ok(outcome) => obs.on_success(&ctx, outcome.stats()),
                Err(e) => {
                    let sev = severity_for_error(e);
                    obs.on_failure(&ctx, sev, e);
                    if sev >= self.options.alert_at_or_above {
                        obs.on_alert(&ctx, sev, e);
                    }
                }
            }
        }

        result
    }

    fn run_inner<S: RowSource>(
        &self,
        request: &ConversionRequest,
        source: S,
    ) -> ConversionResult<ConversionOutcome> {
        self.validate_request(request)?;
        let assembler = RecordAssembler::new(&self.schema, request, source.headers())?;

        let processed = match &self.options.execution {
            ExecutionMode::Sequential => {
                let mut out = Vec::new();
                for row in source {
                    let row = row?;
                    out.push(self.process_row(&assembler, &row));
                }
                out
            }
            ExecutionMode::Parallel {
                num_threads,
                chunk_size,
            } => {
                let rows: Vec<RawRow> = source.collect::<Result<_, _>>()?;
                self.process_parallel(&assembler, &rows, *num_threads, *chunk_size)
            }
        };

        let mut valid = Vec::new();
        let mut rejected = Vec::new();
        for (record, messages) in processed {
            if messages.is_empty() {
                valid.push(record);
            } else {
                rejected.push(RejectedRow {
                    row: record.row,
                    messages,
                });
            }
        }

        let mut outcome = ConversionOutcome {
            valid,
            rejected,
            artifact: None,
        };

        // Diagnostics are persisted before encoding, and only when there is
        // something to persist.
        if let Some(sink) = self.options.sink.as_ref() {
            if !outcome.rejected.is_empty() {
                sink.write_lines(&outcome.diagnostics())?;
            }
        }

        if !outcome.valid.is_empty() {
            outcome.artifact = Some(self.encoder.encode(&self.schema, &outcome.valid)?);
        }

        Ok(outcome)
    }

    fn process_row(
        &self,
        assembler: &RecordAssembler<'_>,
        row: &RawRow,
    ) -> (AssembledRecord, Vec<Inconsistency>) {
        let record = assembler.assemble(row);
        let messages = validate_record(&self.schema, &record);
        (record, messages)
    }

    fn process_parallel(
        &self,
        assembler: &RecordAssembler<'_>,
        rows: &[RawRow],
        num_threads: Option<usize>,
        chunk_size: usize,
    ) -> Vec<(AssembledRecord, Vec<Inconsistency>)> {
        let n_threads = num_threads
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1);

        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .expect("failed to build rayon thread pool");

        let ranges = chunk_ranges(rows.len(), chunk_size);
        pool.install(|| {
            let per_chunk: Vec<Vec<(AssembledRecord, Vec<Inconsistency>)>> = ranges
                .into_par_iter()
                .map(|range| {
                    let mut out = Vec::with_capacity(range.end - range.start);
                    for row in &rows[range] {
                        out.push(self.process_row(assembler, row));
                    }
                    out
                })
                .collect();
            // Chunk outputs concatenate in range order, restoring source order.
            per_chunk.into_iter().flatten().collect()
        })
    }

    /// Every supplied metadata entry must name a top-level non-detail field and
    /// its raw value must parse under the declared kind. All problems are
    /// collected and reported together.
    fn validate_request(&self, request: &ConversionRequest) -> ConversionResult<()> {
        let (detail_name, _) = self.schema.detail_field()?;

        let mut issues = Vec::new();
        for (name, raw) in &request.metadata {
            if name == detail_name {
                issues.push(format!("metadata cannot target the detail field '{name}'"));
                continue;
            }
            let Some(field) = self.schema.root.field(name) else {
                issues.push(format!("unknown metadata field '{name}'"));
                continue;
            };
            if let Some(problem) = metadata_value_problem(&field.field_type, raw) {
                issues.push(format!("metadata field '{name}': {problem}"));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConversionError::RequestValidation { issues })
        }
    }
}

/// A raw metadata value that cannot parse under the declared kind, if any.
fn metadata_value_problem(declared: &SchemaType, raw: &str) -> Option<String> {
    match declared.unwrap_nullable() {
        SchemaType::Primitive(kind @ (PrimitiveKind::Int | PrimitiveKind::Long)) => {
            match raw.trim().parse::<i64>() {
                Ok(_) => None,
                Err(_) => Some(format!("value '{raw}' is not a valid {}", kind.name())),
            }
        }
        SchemaType::Primitive(kind @ (PrimitiveKind::Float | PrimitiveKind::Double)) => {
            match raw.trim().parse::<f64>() {
                Ok(_) => None,
                Err(_) => Some(format!("value '{raw}' is not a valid {}", kind.name())),
            }
        }
        _ => None,
    }
}

fn severity_for_error(e: &ConversionError) -> ConversionSeverity {
    match e {
        ConversionError::Io(_) => ConversionSeverity::Critical,
        ConversionError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => ConversionSeverity::Critical,
            _ => ConversionSeverity::Error,
        },
        // Encoder failures mean validated records could not be written;
        // that is an infrastructure or invariant problem, not a data problem.
        ConversionError::Encode(_) => ConversionSeverity::Critical,
        ConversionError::SchemaParse { .. }
        | ConversionError::SchemaShape { .. }
        | ConversionError::RequestValidation { .. } => ConversionSeverity::Error,
    }
}

fn chunk_ranges(row_count: usize, chunk_size: usize) -> Vec<std::ops::Range<usize>> {
    if row_count == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(row_count.div_ceil(chunk_size));
    let mut start = 0usize;
    while start < row_count {
        let end = (start + chunk_size).min(row_count);
        out.push(start..end);
        start = end;
    }
    out
}
