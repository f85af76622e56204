use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spaten::{Feature, SpatenDeframer, SpatenFramer, SpatenReader, SpatenWriter, StreamOptions, Wkb};
use std::io::{sink, Cursor};

// Benchmark configuration
const POINT_COUNT: usize = 1000;
const TAGGED_COUNT: usize = 1000;

fn create_points(count: usize) -> Vec<Feature> {
    (0..count)
        .map(|_| Feature::from_geometry(Wkb::point(10.0, 10.0)))
        .collect()
}

fn create_tagged_features(count: usize) -> Vec<Feature> {
    (0..count as u64)
        .map(|i| {
            Feature::from_geometry(Wkb::point(i as f64 * 0.001, -(i as f64) * 0.001))
                .with_property("id", i)
                .with_property("name", format!("feature number {i}"))
                .with_property("elevation", i as f64 * 1.25)
        })
        .collect()
}

fn encode_stream(features: &[Feature], block_size: usize) -> Vec<u8> {
    let options = StreamOptions::new().with_block_size(block_size);
    let mut writer = SpatenWriter::new(Vec::new(), SpatenFramer)
        .unwrap()
        .with_options(&options);
    writer.append_all(features.iter().cloned()).unwrap();
    writer.close().unwrap()
}

fn benchmark_inmemory_write(c: &mut Criterion) {
    let points = create_points(POINT_COUNT);
    let mut group = c.benchmark_group("Write");
    group.throughput(Throughput::Elements(POINT_COUNT as u64));

    group.bench_function("1000 points to memory", |b| {
        b.iter(|| {
            let mut writer = SpatenWriter::new(Cursor::new(Vec::new()), SpatenFramer).unwrap();
            writer.append_all(black_box(&points).iter().cloned()).unwrap();
            black_box(writer.close().unwrap());
        });
    });

    group.bench_function("1000 points to sink", |b| {
        b.iter(|| {
            let mut writer = SpatenWriter::new(sink(), SpatenFramer).unwrap();
            writer.append_all(black_box(&points).iter().cloned()).unwrap();
            writer.close().unwrap();
        });
    });
    group.finish();
}

fn benchmark_read(c: &mut Criterion) {
    let features = create_tagged_features(TAGGED_COUNT);
    let mut group = c.benchmark_group("Read");
    group.throughput(Throughput::Elements(TAGGED_COUNT as u64));

    for block_size in [10usize, 100, 1000] {
        let data = encode_stream(&features, block_size);
        group.bench_with_input(
            BenchmarkId::new("iterate tagged features", block_size),
            &data,
            |b, data| {
                b.iter(|| {
                    let reader =
                        SpatenReader::new(Cursor::new(black_box(data.as_slice())), SpatenDeframer)
                            .unwrap();
                    let mut count = 0;
                    for feature in reader {
                        black_box(feature.unwrap());
                        count += 1;
                    }
                    assert_eq!(count, TAGGED_COUNT);
                });
            },
        );
    }
    group.finish();
}

fn benchmark_write_read_cycle(c: &mut Criterion) {
    let features = create_tagged_features(TAGGED_COUNT);
    c.bench_function("Write+Read cycle (tagged)", |b| {
        b.iter(|| {
            let data = encode_stream(black_box(&features), 100);
            let mut reader = SpatenReader::new(Cursor::new(data), SpatenDeframer).unwrap();
            reader.process_all(|f| {
                black_box(f);
                Ok(())
            })
            .unwrap();
        });
    });
}

criterion_group!(
    benches,
    benchmark_inmemory_write,
    benchmark_read,
    benchmark_write_read_cycle
);
criterion_main!(benches);
