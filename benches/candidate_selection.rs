//! Benchmarks for rank-based candidate selection.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gamekins::services::candidate_selector::rank_table;
use gamekins::{eligible_candidates, CandidateSelector, FileDetails};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn files(n: usize) -> Vec<FileDetails> {
    (0..n)
        .map(|i| {
            let coverage = (i % 97) as f64 / 100.0;
            let user = if i % 3 == 0 { "bob" } else { "alice" };
            FileDetails::source("org.example", format!("C{i}"), format!("C{i}.java"), coverage)
                .changed_by(user)
        })
        .collect()
}

fn bench_rank_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_table");
    for n in [10usize, 100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| rank_table(black_box(n), black_box(1.5)));
        });
    }
    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let selector = CandidateSelector::new();
    let mut group = c.benchmark_group("select_index");
    for n in [10usize, 100, 1_000] {
        let mut rng = StdRng::seed_from_u64(7);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| selector.select_index(black_box(n), &mut rng));
        });
    }
    group.finish();
}

fn bench_eligible_candidates(c: &mut Criterion) {
    let mut group = c.benchmark_group("eligible_candidates");
    for n in [100usize, 1_000] {
        let pool = files(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &pool, |b, pool| {
            b.iter(|| eligible_candidates(black_box(pool), "alice"));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_rank_table,
    bench_select,
    bench_eligible_candidates
);
criterion_main!(benches);
