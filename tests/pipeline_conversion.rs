use std::env;
use std::fs;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use csv2avro::pipeline::ConversionPipeline;
use csv2avro::schema::parse_schema;
use csv2avro::sink::FileSink;
use csv2avro::tabular::MemorySource;
use csv2avro::types::{AssembledRecord, ConversionRequest, Value};
use csv2avro::ConversionError;

const REPORT_SCHEMA: &str = r#"{
    "type": "record",
    "name": "Report",
    "fields": [
        {"name": "period", "type": ["null", "string"]},
        {"name": "sequence", "type": ["null", "int"]},
        {"name": "Detail", "type": {"type": "array", "items": {
            "type": "record",
            "name": "Movement",
            "fields": [
                {"name": "code", "type": "string"},
                {"name": "amount", "type": ["null", "long"]},
                {"name": "currency", "type": ["null", {
                    "type": "enum",
                    "name": "Currency",
                    "symbols": ["USD", "EUR", "PEN"]
                }]},
                {"name": "cutoff_date", "type": ["null", "string"]}
            ]
        }}}
    ]
}"#;

fn report_pipeline() -> ConversionPipeline {
    ConversionPipeline::new(parse_schema(REPORT_SCHEMA).unwrap())
}

fn source(rows: &[&[&str]]) -> MemorySource {
    MemorySource::new(
        ["code", "amount", "currency"],
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect(),
    )
}

fn detail_value<'a>(record: &'a AssembledRecord, name: &str) -> &'a Value {
    let Some(Value::Array(items)) = record.field("Detail") else {
        panic!("record has no detail array");
    };
    let Value::Record(fields) = &items[0] else {
        panic!("detail element is not a record");
    };
    &fields.iter().find(|(n, _)| n == name).unwrap().1
}

fn tmp_file(name: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    env::temp_dir().join(format!("csv2avro_pipeline_{nanos}_{name}"))
}

#[test]
fn all_valid_rows_convert_and_encode() {
    let request = ConversionRequest::new()
        .with_metadata("period", "2024-09")
        .with_metadata("sequence", "7");
    let outcome = report_pipeline()
        .run(
            &request,
            source(&[&["A-1", "125", "USD"], &["A-2", "40", "EUR"]]),
        )
        .unwrap();

    assert_eq!(outcome.valid.len(), 2);
    assert!(outcome.rejected.is_empty());
    assert!(outcome.diagnostics().is_empty());
    assert!(outcome.artifact.is_some());

    let first = &outcome.valid[0];
    assert_eq!(first.row, 1);
    assert_eq!(first.field("period"), Some(&Value::Utf8("2024-09".into())));
    assert_eq!(first.field("sequence"), Some(&Value::Int64(7)));
    assert_eq!(detail_value(first, "code"), &Value::Utf8("A-1".into()));
    assert_eq!(detail_value(first, "amount"), &Value::Int64(125));
}

#[test]
fn mixed_rows_partition_with_stable_messages() {
    let request = ConversionRequest::new().with_metadata("period", "2024-09");
    let outcome = report_pipeline()
        .run(
            &request,
            source(&[
                &["A-1", "125", "USD"],
                &["", "not a number", "USD"],
                &["A-3", "40", "GBP"],
                &["", "90", "JPY"],
            ]),
        )
        .unwrap();

    let valid_rows: Vec<usize> = outcome.valid.iter().map(|r| r.row).collect();
    let rejected_rows: Vec<usize> = outcome.rejected.iter().map(|r| r.row).collect();
    assert_eq!(valid_rows, vec![1]);
    assert_eq!(rejected_rows, vec![2, 3, 4]);
    assert!(outcome.artifact.is_some());

    assert_eq!(
        outcome.diagnostics(),
        vec![
            "Row 2: Field 'Detail[0].code' invalid value 'null'",
            "Row 3: Field 'Detail[0].currency' value 'GBP' not valid for enum Currency",
            "Row 4: Field 'Detail[0].code' invalid value 'null'",
            "Row 4: Field 'Detail[0].currency' value 'JPY' not valid for enum Currency",
        ]
    );
}

#[test]
fn unparseable_numbers_in_nullable_fields_stay_valid() {
    // Coercion is total: text that fails to parse under a nullable type
    // becomes null, and a null in a nullable field is not a rejection.
    let request = ConversionRequest::new().with_metadata("period", "2024-09");
    let outcome = report_pipeline()
        .run(&request, source(&[&["A-1", "12,5", "USD"]]))
        .unwrap();

    assert_eq!(outcome.valid.len(), 1);
    assert!(outcome.rejected.is_empty());
    assert_eq!(detail_value(&outcome.valid[0], "amount"), &Value::Null);
}

#[test]
fn all_rejected_rows_skip_the_artifact() {
    let outcome = report_pipeline()
        .run(
            &ConversionRequest::new(),
            source(&[&["", "10", "USD"], &["", "20", "EUR"]]),
        )
        .unwrap();

    assert!(outcome.valid.is_empty());
    assert_eq!(outcome.rejected.len(), 2);
    assert!(outcome.artifact.is_none());
}

#[test]
fn empty_sources_produce_empty_outcomes() {
    let outcome = report_pipeline()
        .run(&ConversionRequest::new(), source(&[]))
        .unwrap();

    assert!(outcome.valid.is_empty());
    assert!(outcome.rejected.is_empty());
    assert!(outcome.artifact.is_none());
    assert!(outcome.diagnostics().is_empty());
}

#[test]
fn row_counts_are_conserved_and_partitions_stay_ordered() {
    let rows: Vec<Vec<String>> = (1..=50)
        .map(|i| {
            let code = if i % 9 == 0 {
                String::new()
            } else {
                format!("A-{i}")
            };
            vec![code, i.to_string(), "PEN".to_string()]
        })
        .collect();
    let outcome = report_pipeline()
        .run(
            &ConversionRequest::new(),
            MemorySource::new(["code", "amount", "currency"], rows),
        )
        .unwrap();

    assert_eq!(outcome.valid.len() + outcome.rejected.len(), 50);
    assert!(outcome.valid.windows(2).all(|w| w[0].row < w[1].row));
    assert!(outcome.rejected.windows(2).all(|w| w[0].row < w[1].row));

    let stats = outcome.stats();
    assert_eq!(stats.input_rows, 50);
    assert_eq!(stats.valid_rows, outcome.valid.len());
    assert_eq!(stats.rejected_rows, outcome.rejected.len());
}

#[test]
fn reruns_yield_identical_partitions() {
    let pipeline = report_pipeline();
    let request = ConversionRequest::new().with_metadata("period", "2024-09");
    let rows: &[&[&str]] = &[&["A-1", "125", "USD"], &["", "40", "GBP"]];

    let first = pipeline.run(&request, source(rows)).unwrap();
    let second = pipeline.run(&request, source(rows)).unwrap();

    assert_eq!(first.valid, second.valid);
    assert_eq!(first.rejected, second.rejected);
    assert_eq!(first.diagnostics(), second.diagnostics());
}

#[test]
fn unknown_metadata_keys_fail_the_whole_run() {
    let request = ConversionRequest::new()
        .with_metadata("period", "2024-09")
        .with_metadata("nope", "x");

    let err = report_pipeline()
        .run(&request, source(&[&["A-1", "10", "USD"]]))
        .unwrap_err();
    assert!(matches!(err, ConversionError::RequestValidation { .. }));

    let msg = err.to_string();
    assert!(msg.contains("invalid conversion request"));
    assert!(msg.contains("unknown metadata field 'nope'"));
}

#[test]
fn unparseable_metadata_values_fail_the_whole_run() {
    let request = ConversionRequest::new().with_metadata("sequence", "seven");

    let err = report_pipeline()
        .run(&request, source(&[&["A-1", "10", "USD"]]))
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("metadata field 'sequence'"));
    assert!(msg.contains("not a valid int"));
}

#[test]
fn absent_metadata_fields_default_to_null() {
    let outcome = report_pipeline()
        .run(&ConversionRequest::new(), source(&[&["A-1", "10", "USD"]]))
        .unwrap();

    assert_eq!(outcome.valid[0].field("period"), Some(&Value::Null));
    assert_eq!(outcome.valid[0].field("sequence"), Some(&Value::Null));
}

#[test]
fn constant_columns_override_source_cells() {
    let request = ConversionRequest::new().with_constant_column("cutoff_date", "2024-09-30");
    let rows = vec![
        vec!["A-1".into(), "10".into(), "USD".into(), "garbage".into()],
        vec!["A-2".into(), "20".into(), "EUR".into(), "".into()],
    ];
    let outcome = report_pipeline()
        .run(
            &request,
            MemorySource::new(["code", "amount", "currency", "cutoff_date"], rows),
        )
        .unwrap();

    assert_eq!(outcome.valid.len(), 2);
    for record in &outcome.valid {
        assert_eq!(
            detail_value(record, "cutoff_date"),
            &Value::Utf8("2024-09-30".into())
        );
    }
}

#[test]
fn diagnostics_log_is_written_only_for_runs_with_rejections() {
    let path = tmp_file("rejections.log");
    let pipeline = report_pipeline().with_sink(Arc::new(FileSink::new(&path)));
    let request = ConversionRequest::new().with_metadata("period", "2024-09");

    pipeline
        .run(&request, source(&[&["A-1", "10", "USD"]]))
        .unwrap();
    assert!(!path.exists());

    pipeline
        .run(&request, source(&[&["A-1", "10", "USD"], &["", "20", "EUR"]]))
        .unwrap();
    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, "Row 2: Field 'Detail[0].code' invalid value 'null'\n");

    fs::remove_file(&path).ok();
}
