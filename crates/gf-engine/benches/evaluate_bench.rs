//! Evaluator and cascade benchmarks

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use gf_engine::{GameConfig, GemEngine, Grid, GridSpec, PayTable, generate_grid};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn sample_grids(spec: GridSpec, table: &PayTable, count: u64) -> Vec<Grid> {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    (0..count)
        .map(|_| generate_grid(spec, table.alphabet(), &mut rng))
        .collect()
}

fn bench_evaluate_paylines(c: &mut Criterion) {
    let table = PayTable::standard();
    let grids = sample_grids(GridSpec::cascade_4x5(), &table, 256);

    c.bench_function("evaluate_4x5_x256", |b| {
        b.iter(|| {
            for grid in &grids {
                black_box(table.evaluate(black_box(grid)));
            }
        })
    });
}

fn bench_evaluate_tally(c: &mut Criterion) {
    let table = PayTable::classic();
    let rules = GameConfig::classic().classic;
    let grids = sample_grids(GridSpec::classic_row(), &table, 256);

    c.bench_function("evaluate_tally_1x3_x256", |b| {
        b.iter(|| {
            for grid in &grids {
                black_box(table.evaluate_tally(black_box(grid), &rules));
            }
        })
    });
}

fn bench_resolve_cascade(c: &mut Criterion) {
    let mut engine = GemEngine::cascade().with_seed(42);

    c.bench_function("resolve_cascade_4x5", |b| {
        b.iter(|| {
            let grid = engine.generate_grid();
            black_box(engine.resolve_cascade(grid, 1));
        })
    });
}

criterion_group!(
    benches,
    bench_evaluate_paylines,
    bench_evaluate_tally,
    bench_resolve_cascade
);
criterion_main!(benches);
