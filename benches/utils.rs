//! 短码生成与存在性过滤器基准测试

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use linkpress::cache::{BloomExistenceFilter, ExistenceFilter};
use linkpress::utils::{decode_base62, encode_base62, normalize_url};

// ============== base62 基准测试 ==============

fn bench_base62(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/base62");

    for value in [1u64, 1234, 56_800_235_583, u64::MAX] {
        group.bench_with_input(BenchmarkId::new("encode", value), &value, |b, &v| {
            b.iter(|| encode_base62(black_box(v)));
        });
    }

    let encoded = encode_base62(56_800_235_583);
    group.bench_function("decode", |b| {
        b.iter(|| decode_base62(black_box(&encoded)));
    });

    group.finish();
}

// ============== URL 规范化基准测试 ==============

fn bench_normalize_url(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/normalize_url");

    group.bench_function("bare_host", |b| {
        b.iter(|| normalize_url(black_box("google.com")));
    });

    group.bench_function("full_url", |b| {
        b.iter(|| normalize_url(black_box("https://www.example.com/path?q=1#frag")));
    });

    group.bench_function("rejected", |b| {
        b.iter(|| normalize_url(black_box("http://localhost")));
    });

    group.finish();
}

// ============== Bloom Filter 基准测试 ==============

fn bench_bloom(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache/bloom");

    let filter = BloomExistenceFilter::new(1_000_000, 3).expect("bloom filter");
    let keys: Vec<String> = (0..100_000)
        .map(|i| format!("https://www.example{}.com", i))
        .collect();
    filter.add_all(&keys);

    group.bench_function("add", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            filter.add(black_box(&format!("https://www.bench{}.com", i)));
        });
    });

    group.bench_function("contains_hit", |b| {
        b.iter(|| filter.contains(black_box(&keys[4242])));
    });

    group.bench_function("contains_miss", |b| {
        b.iter(|| filter.contains(black_box("https://www.never-added.com")));
    });

    group.finish();
}

criterion_group!(benches, bench_base62, bench_normalize_url, bench_bloom);
criterion_main!(benches);
