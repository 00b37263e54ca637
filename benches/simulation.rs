//! Benchmarks for the colony simulation loop.

use std::sync::atomic::AtomicBool;

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

use colony_rl::{
    compute::{Simulation, ValueTable},
    schema::SimulationConfig,
};

fn bench_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("hundred_steps");

    for size in [10, 32, 64] {
        let config = SimulationConfig {
            width: size,
            height: size,
            food_count: size * size * 3 / 10,
            initial_agents: 3,
            ..Default::default()
        };
        let mut table = ValueTable::new();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &size,
            |b, _| {
                b.iter_batched(
                    || Simulation::new(config.clone(), StdRng::seed_from_u64(42)).unwrap(),
                    |mut sim| {
                        for _ in 0..100 {
                            black_box(sim.step(&mut table));
                        }
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

fn bench_full_run(c: &mut Criterion) {
    let config = SimulationConfig {
        max_steps: Some(5_000),
        ..Default::default()
    };
    let stop = AtomicBool::new(false);

    c.bench_function("full_run_10x10", |b| {
        b.iter_batched(
            || {
                (
                    Simulation::new(config.clone(), StdRng::seed_from_u64(7)).unwrap(),
                    ValueTable::new(),
                )
            },
            |(mut sim, mut table)| black_box(sim.run(&mut table, &stop)),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_steps, bench_full_run);
criterion_main!(benches);
