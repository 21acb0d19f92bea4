use apache_avro::types::Value as AvroValue;
use apache_avro::Reader;

use csv2avro::pipeline::ConversionPipeline;
use csv2avro::schema::parse_schema;
use csv2avro::tabular::MemorySource;
use csv2avro::types::ConversionRequest;

const SCHEMA: &str = r#"{
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

fn convert(rows: &[&[&str]]) -> Vec<u8> {
    let pipeline = ConversionPipeline::new(parse_schema(SCHEMA).unwrap());
    let request = ConversionRequest::new()
        .with_metadata("period", "2024-09")
        .with_metadata("sequence", "7");
    let source = MemorySource::new(
        ["code", "amount", "currency"],
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect(),
    );
    let outcome = pipeline.run(&request, source).unwrap();
    outcome.artifact.expect("conversion produced no artifact")
}

fn decode(bytes: &[u8]) -> Vec<AvroValue> {
    Reader::new(bytes)
        .unwrap()
        .map(|value| value.unwrap())
        .collect()
}

fn record_field<'a>(value: &'a AvroValue, name: &str) -> &'a AvroValue {
    let AvroValue::Record(fields) = value else {
        panic!("not a record: {value:?}");
    };
    &fields.iter().find(|(n, _)| n == name).unwrap().1
}

#[test]
fn artifact_decodes_back_to_the_assembled_records() {
    let bytes = convert(&[&["A-1", "125", "USD"], &["A-2", "40", "EUR"]]);
    let decoded = decode(&bytes);
    assert_eq!(decoded.len(), 2);

    let first = &decoded[0];
    assert_eq!(
        record_field(first, "period"),
        &AvroValue::Union(1, Box::new(AvroValue::String("2024-09".into())))
    );
    assert_eq!(
        record_field(first, "sequence"),
        &AvroValue::Union(1, Box::new(AvroValue::Int(7)))
    );

    let AvroValue::Array(items) = record_field(first, "Detail") else {
        panic!("detail did not decode to an array");
    };
    assert_eq!(items.len(), 1);
    assert_eq!(
        record_field(&items[0], "code"),
        &AvroValue::String("A-1".into())
    );
    assert_eq!(
        record_field(&items[0], "amount"),
        &AvroValue::Union(1, Box::new(AvroValue::Long(125)))
    );
    assert_eq!(
        record_field(&items[0], "currency"),
        &AvroValue::Union(1, Box::new(AvroValue::Enum(0, "USD".into())))
    );
    assert_eq!(
        record_field(&items[0], "cutoff_date"),
        &AvroValue::Union(0, Box::new(AvroValue::Null))
    );
}

#[test]
fn enum_symbols_round_trip_in_symbol_order() {
    let bytes = convert(&[&["A-1", "1", "USD"], &["A-2", "2", "EUR"], &["A-3", "3", "PEN"]]);
    let decoded = decode(&bytes);

    let currencies: Vec<&AvroValue> = decoded
        .iter()
        .map(|record| {
            let AvroValue::Array(items) = record_field(record, "Detail") else {
                panic!("detail did not decode to an array");
            };
            record_field(&items[0], "currency")
        })
        .collect();

    assert_eq!(
        currencies,
        vec![
            &AvroValue::Union(1, Box::new(AvroValue::Enum(0, "USD".into()))),
            &AvroValue::Union(1, Box::new(AvroValue::Enum(1, "EUR".into()))),
            &AvroValue::Union(1, Box::new(AvroValue::Enum(2, "PEN".into()))),
        ]
    );
}

#[test]
fn separate_runs_decode_to_identical_records() {
    // Container bytes differ between runs (random sync marker); the decoded
    // records must not.
    let rows: &[&[&str]] = &[&["A-1", "125", "USD"], &["A-2", "40", "EUR"]];
    let first = decode(&convert(rows));
    let second = decode(&convert(rows));
    assert_eq!(first, second);
}

#[test]
fn the_artifact_embeds_the_writer_schema() {
    let bytes = convert(&[&["A-1", "125", "USD"]]);
    let reader = Reader::new(&bytes[..]).unwrap();

    let apache_avro::Schema::Record(record) = reader.writer_schema() else {
        panic!("writer schema is not a record");
    };
    assert_eq!(record.name.name, "Report");
}
