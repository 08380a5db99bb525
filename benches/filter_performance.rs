use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use logscope::{FilterOptions, LineIndexedFile, PatternFilter};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::runtime::Runtime;

fn create_log_file(size_kb: usize, seed: u64) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let target_size = size_kb * 1024;
    let mut current_size = 0;
    let mut line_num: usize = 0;

    let log_levels = ["DEBUG", "INFO", "INFO", "INFO", "WARN", "ERROR"];
    let services = ["auth", "database", "cache", "payment", "notification"];
    let failures = ["timeout", "connection_failed", "null_pointer", "out_of_memory"];

    while current_size < target_size {
        let level = log_levels[rng.gen_range(0..log_levels.len())];
        let service = services[rng.gen_range(0..services.len())];

        // Roughly one line in fifty carries a failure
        let log_line = if rng.gen_ratio(1, 50) {
            format!(
                "[2024-09-02T10:{:02}:{:02}] {} {}: Request {} failed with {} from 192.168.1.{}\n",
                (line_num / 60) % 60,
                line_num % 60,
                level,
                service,
                line_num,
                failures[rng.gen_range(0..failures.len())],
                rng.gen_range(1..255)
            )
        } else {
            format!(
                "[2024-09-02T10:{:02}:{:02}] {} {}: Request {} processed successfully user_{}\n",
                (line_num / 60) % 60,
                line_num % 60,
                level,
                service,
                line_num,
                rng.gen_range(0..1000)
            )
        };

        temp_file.write_all(log_line.as_bytes()).unwrap();
        current_size += log_line.len();
        line_num += 1;
    }

    temp_file.flush().unwrap();
    temp_file
}

fn size_label(size_kb: usize) -> String {
    if size_kb < 1024 {
        format!("{}KB", size_kb)
    } else {
        format!("{}MB", size_kb / 1024)
    }
}

fn bench_filter_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_patterns");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));

    let sizes_kb = [100, 5000, 60000];
    let cases = [
        ("literal", "timeout", FilterOptions::default()),
        (
            "regex",
            r"failed with \w+ from 192\.168\.1\.\d{1,3}",
            FilterOptions::default(),
        ),
        (
            "case_insensitive",
            "error",
            FilterOptions {
                case_insensitive: true,
                ..FilterOptions::default()
            },
        ),
        (
            "whole_word",
            "auth",
            FilterOptions {
                whole_word: true,
                ..FilterOptions::default()
            },
        ),
        (
            "fixed_strings",
            "192.168.1.",
            FilterOptions {
                regex_mode: false,
                ..FilterOptions::default()
            },
        ),
    ];

    for &size_kb in &sizes_kb {
        let temp_file = create_log_file(size_kb, 42);
        let file = LineIndexedFile::open_path(temp_file.path()).unwrap();
        let label = size_label(size_kb);

        for (name, pattern, options) in &cases {
            let filter = PatternFilter::with_options(options.clone());
            filter.set_pattern(pattern).unwrap();

            group.bench_with_input(BenchmarkId::new(*name, &label), &file, |b, file| {
                b.iter(|| black_box(filter.filter(file).len()));
            });
        }
    }

    group.finish();
}

fn bench_background_filter(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("background_filter");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));

    let size_kb = 20000;
    let temp_file = create_log_file(size_kb, 43);
    let file = Arc::new(LineIndexedFile::open_path(temp_file.path()).unwrap());

    let filter = PatternFilter::new();
    filter.set_pattern("ERROR|WARN").unwrap();

    group.bench_function("sync", |b| {
        b.iter(|| black_box(filter.filter(file.as_ref()).len()));
    });

    group.bench_function("async", |b| {
        b.iter(|| {
            let result = rt.block_on(filter.filter_async(Arc::clone(&file))).unwrap();
            black_box(result.len())
        });
    });

    group.finish();
}

fn bench_pattern_changes(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_changes");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(3));

    let temp_file = create_log_file(5000, 44);
    let file = LineIndexedFile::open_path(temp_file.path()).unwrap();
    let filter = PatternFilter::new();

    // Simulates a user typing a new pattern: compile, then filter
    group.bench_function("set_and_filter", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(45);
        b.iter(|| {
            let pattern = format!("user_{}", rng.gen_range(0..1000));
            filter.set_pattern(&pattern).unwrap();
            black_box(filter.filter(&file).len())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_filter_patterns,
    bench_background_filter,
    bench_pattern_changes
);
criterion_main!(benches);
