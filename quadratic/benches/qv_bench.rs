use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::HashMap;

use nestfest_quadratic::{
    calculate_cost, calculate_max_votes, detect_anomalies, generate_insights, optimize_allocation,
    validate_budget, AnomalyThresholds, Preference, VoteRecord,
};
use nestfest_types::{SubmissionId, Timestamp, VoterId};

fn make_votes(n: usize) -> Vec<VoteRecord> {
    (0..n)
        .map(|i| {
            let count = (i % 7) as i64;
            VoteRecord {
                competition_id: None,
                submission_id: SubmissionId::new(format!("sub_{}", i % 50)),
                voter_id: VoterId::new(format!("voter_{}", i % 500)),
                vote_count: count,
                credits_spent: calculate_cost(count),
                timestamp: Timestamp::new(1_700_000_000 + i as u64 * 7),
                ip_address: Some(format!("10.0.{}.{}", (i / 256) % 256, i % 256).parse().unwrap()),
            }
        })
        .collect()
}

fn bench_max_votes(c: &mut Criterion) {
    c.bench_function("calculate_max_votes", |b| {
        b.iter(|| black_box(calculate_max_votes(black_box(u128::MAX / 3))))
    });
}

fn bench_validate_budget(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_budget");
    for size in [10, 100, 1000] {
        let allocation: HashMap<_, _> = (0..size)
            .map(|i| (SubmissionId::new(format!("sub_{i}")), (i % 10) as i64))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &allocation, |b, alloc| {
            b.iter(|| black_box(validate_budget(black_box(alloc), 1_000_000)))
        });
    }
    group.finish();
}

fn bench_optimize_allocation(c: &mut Criterion) {
    let prefs: Vec<_> = (0..200)
        .map(|i| Preference::new(format!("sub_{i}"), (i % 11) as f64))
        .collect();
    c.bench_function("optimize_allocation_200", |b| {
        b.iter(|| black_box(optimize_allocation(black_box(&prefs), 10_000, 10.0)))
    });
}

fn bench_detect_anomalies(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_anomalies");
    let thresholds = AnomalyThresholds::default();
    for size in [100, 1_000, 10_000] {
        let votes = make_votes(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &votes, |b, votes| {
            b.iter(|| black_box(detect_anomalies(black_box(votes), &thresholds)))
        });
    }
    group.finish();
}

fn bench_generate_insights(c: &mut Criterion) {
    let votes = make_votes(10_000);
    c.bench_function("generate_insights_10000", |b| {
        b.iter(|| black_box(generate_insights(black_box(&votes), 5)))
    });
}

criterion_group!(
    benches,
    bench_max_votes,
    bench_validate_budget,
    bench_optimize_allocation,
    bench_detect_anomalies,
    bench_generate_insights
);
criterion_main!(benches);
