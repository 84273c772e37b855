//! # Growth Benchmarks
//!
//! Aggregation and CAGR ranking over generated datasets.
//!
//! Run with: `cargo bench -p evgrowth-metrics`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use evgrowth_data::{DemoConfig, FISCAL_YEAR_START_MONTH, Period, PeriodBasis, generate_demo};
use evgrowth_metrics::GrowthMetricsEngine;
use std::hint::black_box;

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_by_period");
    let engine = GrowthMetricsEngine::new();

    for entities in [10, 100, 1000] {
        let config = DemoConfig {
            entities,
            ..DemoConfig::default()
        };
        let dataset = generate_demo(&config, PeriodBasis::Fiscal, FISCAL_YEAR_START_MONTH);
        group.bench_with_input(
            BenchmarkId::from_parameter(entities),
            &dataset,
            |b, dataset| b.iter(|| black_box(engine.aggregate(dataset.records()))),
        );
    }
    group.finish();
}

fn bench_cagr_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("cagr_top_n");
    let engine = GrowthMetricsEngine::new();

    for entities in [10, 100, 1000] {
        let config = DemoConfig {
            entities,
            ..DemoConfig::default()
        };
        let dataset = generate_demo(&config, PeriodBasis::Fiscal, FISCAL_YEAR_START_MONTH);
        let Ok(aggregates) = engine.aggregate(dataset.records()) else {
            continue;
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(entities),
            &aggregates,
            |b, aggregates| {
                b.iter(|| {
                    let growth = engine.cagr(aggregates, Period::Year(2022), Period::Year(2024));
                    black_box(growth.and_then(|g| engine.top_n(&g, 10)))
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_aggregate, bench_cagr_ranking);
criterion_main!(benches);
