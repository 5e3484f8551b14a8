//! Benchmarks for single games and aggregated batches.
//!
//! Run with: cargo bench --bench sim_benchmark

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use soulsim::catalog::Catalog;
use soulsim::deck::Decklist;
use soulsim::game::GameLogger;
use soulsim::sim::{run_batch, run_single, SimConfig};

/// One full ten-turn game, silent, fixed seed.
fn bench_single_game(c: &mut Criterion) {
    let config = SimConfig {
        turns: 10,
        runs: 1,
        seed: Some(42),
        ..SimConfig::default()
    };
    let deck = Decklist::default_list();
    let catalog = Arc::new(Catalog::new(&config.chances));

    c.bench_function("single_game_10_turns", |b| {
        b.iter(|| {
            let outcome = run_single(
                black_box(&config),
                &catalog,
                &deck,
                42,
                0,
                GameLogger::silent(),
            )
            .unwrap();
            black_box(outcome)
        })
    });
}

/// Whole batches through the rayon fan-out, at a few sizes.
fn bench_batch(c: &mut Criterion) {
    let deck = Decklist::default_list();
    let mut group = c.benchmark_group("batch");
    group.sample_size(10);

    for runs in [10u64, 100] {
        let config = SimConfig {
            turns: 10,
            runs,
            seed: Some(42),
            ..SimConfig::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(runs), &config, |b, config| {
            b.iter(|| {
                let report = run_batch(black_box(config), &deck).unwrap();
                black_box(report)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_game, bench_batch);
criterion_main!(benches);
