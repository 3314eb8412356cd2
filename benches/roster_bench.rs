//! Criterion benchmarks for roster building and solving.
//!
//! Uses synthetic parishes with a few blocked dates per lector so the
//! numbers reflect the search, not input parsing.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lector_schedule::roster::{
    Day, Lector, Reading, RosterConfig, RosterModel, RosterRunner, ScheduleInput,
};

// ===========================================================================
// Synthetic input
// ===========================================================================

/// `lectors` lectors, `readings` readings, `days` days; lector `l` is
/// blocked on day `l % days`.
fn parish(lectors: usize, readings: usize, days: usize) -> ScheduleInput {
    let day_ids: Vec<Day> = (1..=days).map(|d| Day::new(format!("d{d}"))).collect();
    let people = (0..lectors)
        .map(|l| Lector::new(format!("lector{l}")).with_blocked([day_ids[l % days].clone()]))
        .collect();
    let readings = (1..=readings)
        .map(|r| Reading::new(format!("reading{r}")))
        .collect();
    ScheduleInput::new(people, readings, day_ids).expect("synthetic input is well formed")
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("roster_build");
    group.sample_size(10);

    for (lectors, readings, days) in [(4usize, 2usize, 8usize), (8, 3, 16), (12, 3, 24)] {
        let input = parish(lectors, readings, days);
        let config = RosterConfig::default();
        group.bench_with_input(
            BenchmarkId::new(format!("l{}_r{}_d{}", lectors, readings, days), lectors),
            &(input, config),
            |b, (i, c)| {
                b.iter(|| {
                    let model = RosterModel::build(black_box(i), black_box(c));
                    black_box(model.cp_model().var_count())
                })
            },
        );
    }
    group.finish();
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("roster_solve");
    group.sample_size(10);

    for (lectors, readings, days) in [(3usize, 2usize, 6usize), (5, 2, 10), (6, 3, 12)] {
        let input = parish(lectors, readings, days);
        let config = RosterConfig::default()
            .with_time_limit_secs(10)
            .with_seed(42);
        group.bench_with_input(
            BenchmarkId::new(format!("l{}_r{}_d{}", lectors, readings, days), lectors),
            &(input, config),
            |b, (i, c)| {
                b.iter(|| {
                    let result = RosterRunner::run(black_box(i), black_box(c));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_solve);
criterion_main!(benches);
