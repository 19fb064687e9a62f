use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use queryframe::transform::{DataTransformerConfig, TransformPipeline};
use queryframe::*;
use serde_json::json;

fn metrics_frame(size: usize) -> DataFrame {
    DataFrame::new(vec![
        Field::times("Time", (0..size).map(|i| (i * 1000) as f64)),
        Field::numbers("value", (0..size).map(|i| ((i * 7919) % 1000) as f64 / 7.0)),
        Field::strings("host", (0..size).map(|i| format!("host-{}", i % 17))),
    ])
    .unwrap()
}

fn bench_sort_numeric(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_numeric");

    for size in [100, 1000, 10000].iter() {
        let frame = metrics_frame(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| sort_data_frame(black_box(&frame), 1, false));
        });
    }
    group.finish();
}

fn bench_sort_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_strings");

    for size in [100, 1000, 10000].iter() {
        let frame = metrics_frame(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| sort_data_frame(black_box(&frame), 2, true));
        });
    }
    group.finish();
}

fn bench_sorted_random_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("sorted_random_access");

    for size in [100, 1000, 10000].iter() {
        let sorted = sort_data_frame(&metrics_frame(*size), 1, false);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let idx = black_box(size / 2);
                sorted.fields[1].get(idx).cloned()
            });
        });
    }
    group.finish();
}

fn bench_display_numbers(c: &mut Criterion) {
    let mut group = c.benchmark_group("display_numbers");

    let config = FieldConfig::default()
        .with_unit("percent")
        .with_thresholds(vec![Threshold::base("green"), Threshold::new(80.0, "red")]);
    let display = get_display_processor(Some(&DisplayProcessorOptions::for_field(FieldType::Number, config)));

    for size in [100, 1000, 10000].iter() {
        let values: Vec<FieldValue> = (0..*size).map(|i| FieldValue::Number(i as f64 / 3.0)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                for value in &values {
                    black_box(display(value));
                }
            });
        });
    }
    group.finish();
}

fn bench_convert_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_table");

    for size in [100, 1000, 10000].iter() {
        let rows: Vec<_> = (0..*size)
            .map(|i| json!([i * 1000, format!("host-{}", i % 17), i as f64 / 3.0]))
            .collect();
        let payload = json!({
            "columns": [{"text": "Time"}, {"text": "host"}, {"text": "value"}],
            "rows": rows,
        });

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| to_data_frame(black_box(payload.clone())).unwrap());
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    let pipeline = TransformPipeline::new(&[
        DataTransformerConfig::new("filterFields", json!({"include": {"id": "numeric"}})),
        DataTransformerConfig::new("reduce", json!({"reducers": ["mean", "max", "min", "last"]})),
    ])
    .unwrap();

    for size in [100, 1000, 10000].iter() {
        let frames = vec![metrics_frame(*size), metrics_frame(*size)];
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| pipeline.apply(black_box(frames.clone())));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_sort_numeric,
    bench_sort_strings,
    bench_sorted_random_access,
    bench_display_numbers,
    bench_convert_table,
    bench_pipeline,
);

criterion_main!(benches);
