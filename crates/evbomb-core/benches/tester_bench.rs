//! Benchmarks for tester circuit construction and execution
//!
//! Run with: cargo bench -p evbomb-core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use evbomb_adapter_sim::SimulatorBackend;
use evbomb_core::{Bomb, TesterParams, classify, test_bombs, tester_circuit};

fn bench_circuit_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("tester_circuit");

    for steps in &[1u32, 10, 100] {
        let params = TesterParams::new(*steps, None).unwrap();
        group.bench_with_input(BenchmarkId::new("live", steps), &params, |b, params| {
            b.iter(|| tester_circuit(black_box(&Bomb::live(0)), params).unwrap());
        });
    }

    group.finish();
}

fn bench_batch_execution(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let backend = SimulatorBackend::with_seed(1);
    let bombs: Vec<Bomb> = (0..100)
        .map(|i| if i % 2 == 0 { Bomb::live(i) } else { Bomb::dud(i) })
        .collect();

    let mut group = c.benchmark_group("test_bombs");
    group.sample_size(20);

    for steps in &[1u32, 10, 50] {
        let params = TesterParams::new(*steps, None).unwrap();
        group.bench_with_input(BenchmarkId::new("100_bombs", steps), &params, |b, params| {
            b.iter(|| {
                let registers = runtime
                    .block_on(test_bombs(&backend, black_box(&bombs), params))
                    .unwrap();
                registers.iter().map(classify).count()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_circuit_construction, bench_batch_execution);
criterion_main!(benches);
