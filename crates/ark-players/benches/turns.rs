//! Turn throughput benchmarks

use ark_logic::{RunConfig, Simulation};
use ark_players::StrategyRegistry;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn config(helpers: u32, parallel: bool) -> RunConfig {
    RunConfig {
        num_helpers: helpers,
        turns: 1_000_000,
        early_termination: false,
        seed: 42,
        parallel,
        ..RunConfig::default()
    }
    .with_populations(&[6; 40])
}

fn benchmark_turn(c: &mut Criterion) {
    let registry = StrategyRegistry::default();
    let mut group = c.benchmark_group("turn");

    for player in ["random", "greedy"] {
        for helpers in [10u32, 50, 200] {
            let factory = registry.factory(player).expect("registered player");
            let mut sim = Simulation::new(config(helpers, false), factory).expect("valid config");

            // Warm up
            for _ in 0..10 {
                sim.step();
            }

            group.bench_with_input(
                BenchmarkId::new(player, helpers),
                &helpers,
                |b, _| {
                    b.iter(|| sim.step());
                },
            );
        }
    }

    group.finish();
}

fn benchmark_parallel_decisions(c: &mut Criterion) {
    let registry = StrategyRegistry::default();
    let mut group = c.benchmark_group("decisions");

    for parallel in [false, true] {
        let factory = registry.factory("greedy").expect("registered player");
        let mut sim = Simulation::new(config(400, parallel), factory).expect("valid config");
        let label = if parallel { "rayon" } else { "sequential" };
        group.bench_function(label, |b| {
            b.iter(|| sim.step());
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_turn, benchmark_parallel_decisions);
criterion_main!(benches);
