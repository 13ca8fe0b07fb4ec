use bloomy_rs::{BloomFilter, expand};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use std::collections::HashSet;
use std::hint::black_box;

// Helper to create random 100-byte elements, as the throughput driver does
fn generate_test_data(count: usize) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| {
            let mut item = vec![0u8; 100];
            rng.fill_bytes(&mut item);
            item
        })
        .collect()
}

fn bench_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_expansion");
    let item = vec![7u8; 100];

    for k in [1, 7, 14] {
        group.bench_with_input(BenchmarkId::new("expand", k), &k, |b, &k| {
            b.iter(|| expand(black_box(&item), k).sum::<u32>())
        });
    }
    group.finish();
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_operations");

    for capacity in [1_000, 10_000, 100_000] {
        let test_data = generate_test_data(capacity);

        group.bench_with_input(
            BenchmarkId::new("bloom", capacity),
            &test_data,
            |b, data| {
                b.iter_batched(
                    || {
                        BloomFilter::with_false_positive_rate(0.01, capacity)
                            .expect("Failed to create filter")
                    },
                    |mut filter| {
                        for item in data {
                            filter.add(black_box(item));
                        }
                        filter
                    },
                    criterion::BatchSize::LargeInput,
                );
            },
        );

        group.bench_with_input(
            BenchmarkId::new("hashset", capacity),
            &test_data,
            |b, data| {
                b.iter_batched(
                    || HashSet::with_capacity(capacity),
                    |mut set| {
                        for item in data {
                            set.insert(black_box(item.as_slice()));
                        }
                        set
                    },
                    criterion::BatchSize::LargeInput,
                );
            },
        );
    }
    group.finish();
}

fn bench_contains(c: &mut Criterion) {
    let mut group = c.benchmark_group("contains_operations");

    for capacity in [1_000, 10_000, 100_000] {
        let test_data = generate_test_data(capacity);
        let mut filter = BloomFilter::with_false_positive_rate(0.01, capacity)
            .expect("Failed to create filter");
        let set: HashSet<&[u8]> =
            test_data.iter().map(|item| item.as_slice()).collect();
        for item in &test_data {
            filter.add(item);
        }

        group.bench_with_input(
            BenchmarkId::new("bloom_existing", capacity),
            &test_data,
            |b, data| {
                b.iter(|| {
                    data.iter()
                        .filter(|item| filter.contains(black_box(item)))
                        .count()
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("hashset_existing", capacity),
            &test_data,
            |b, data| {
                b.iter(|| {
                    data.iter()
                        .filter(|item| set.contains(black_box(item.as_slice())))
                        .count()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_expand, bench_insert, bench_contains);
criterion_main!(benches);
