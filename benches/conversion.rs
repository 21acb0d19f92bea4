use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use csv2avro::pipeline::{ConversionOptions, ConversionPipeline, ExecutionMode};
use csv2avro::schema::parse_schema;
use csv2avro::tabular::MemorySource;
use csv2avro::types::ConversionRequest;

const SCHEMA: &str = r#"{
    "type": "record",
    "name": "Report",
    "fields": [
        {"name": "period", "type": ["null", "string"]},
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
                }]}
            ]
        }}}
    ]
}"#;

// Roughly 1% of rows reject (empty required code) so partitioning and
// diagnostics formatting stay on the measured path.
fn rows(n: usize) -> Vec<Vec<String>> {
    (1..=n)
        .map(|i| {
            let code = if i % 100 == 0 {
                String::new()
            } else {
                format!("A-{i}")
            };
            let currency = match i % 3 {
                0 => "USD",
                1 => "EUR",
                _ => "PEN",
            };
            vec![code, (i as i64 % 5000).to_string(), currency.to_string()]
        })
        .collect()
}

fn bench_sequential(c: &mut Criterion) {
    let pipeline = ConversionPipeline::new(parse_schema(SCHEMA).unwrap());
    let request = ConversionRequest::new().with_metadata("period", "2024-09");

    let mut group = c.benchmark_group("convert_sequential");
    for &n in &[100usize, 1_000, 10_000] {
        let data = rows(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| {
                let source = MemorySource::new(["code", "amount", "currency"], data.clone());
                pipeline.run(&request, source).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_parallel(c: &mut Criterion) {
    let request = ConversionRequest::new().with_metadata("period", "2024-09");
    let data = rows(10_000);

    let mut group = c.benchmark_group("convert_10k_rows");
    group.throughput(Throughput::Elements(10_000));

    let sequential = ConversionPipeline::new(parse_schema(SCHEMA).unwrap());
    group.bench_function("sequential", |b| {
        b.iter(|| {
            let source = MemorySource::new(["code", "amount", "currency"], data.clone());
            sequential.run(&request, source).unwrap()
        })
    });

    for &threads in &[2usize, 4] {
        let pipeline =
            ConversionPipeline::new(parse_schema(SCHEMA).unwrap()).with_options(ConversionOptions {
                execution: ExecutionMode::Parallel {
                    num_threads: Some(threads),
                    chunk_size: 1_024,
                },
                ..Default::default()
            });
        group.bench_with_input(
            BenchmarkId::new("parallel", threads),
            &threads,
            |b, _threads| {
                b.iter(|| {
                    let source = MemorySource::new(["code", "amount", "currency"], data.clone());
                    pipeline.run(&request, source).unwrap()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_sequential, bench_parallel);
criterion_main!(benches);
