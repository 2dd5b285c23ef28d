//! Cascade resolver integration tests
//!
//! Verifies:
//! - every chain terminates on a dead evaluation
//! - gravity keeps surviving symbols in column order
//! - scatter triggers grant free spins independent of line pay
//! - lazy stepping and eager resolution agree

use gf_engine::{
    CascadeRules, CellId, GemEngine, Grid, PayTable, RUBY, SAPPHIRE, SCATTER, TOPAZ,
    apply_gravity, clear_cells, resolve_cascade,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeSet;

#[test]
fn chains_terminate_on_dead_evaluation() {
    let mut engine = GemEngine::cascade().with_seed(2024);
    for _ in 0..300 {
        let grid = engine.generate_grid();
        let steps = engine.resolve_cascade(grid, 1);

        let (last, rest) = steps.split_last().unwrap();
        assert!(last.is_terminal());
        assert_eq!(last.evaluation.total_win, 0);
        assert_eq!(last.evaluation.scatter_count, 0);
        assert!(rest.iter().all(|s| !s.is_terminal()));
    }
}

#[test]
fn steps_feed_refilled_grid_forward() {
    let mut engine = GemEngine::cascade().with_seed(77);
    for _ in 0..100 {
        let grid = engine.generate_grid();
        let steps = engine.resolve_cascade(grid, 1);
        for pair in steps.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            // Cells never cleared keep their column order after the fall
            for col in 0..prev.grid.cols() {
                let survivors: Vec<_> = (0..prev.grid.rows())
                    .map(|row| CellId::new(row, col))
                    .filter(|cell| !prev.evaluation.winning.contains(cell))
                    .filter_map(|cell| prev.grid.get(cell))
                    .collect();
                let column = next.grid.column(col);
                let bottom: Vec<_> = column[column.len() - survivors.len()..]
                    .iter()
                    .map(|s| s.unwrap())
                    .collect();
                assert_eq!(bottom, survivors);
            }
            assert!(next.grid.is_complete());
        }
    }
}

#[test]
fn gravity_is_a_stable_partition() {
    let mut grid = Grid::from_rows(vec![
        vec![RUBY, TOPAZ, RUBY],
        vec![SAPPHIRE, RUBY, TOPAZ],
        vec![TOPAZ, SAPPHIRE, RUBY],
        vec![RUBY, TOPAZ, SAPPHIRE],
    ])
    .unwrap();
    let cleared = BTreeSet::from([
        CellId::new(3, 0),
        CellId::new(1, 0),
        CellId::new(0, 2),
        CellId::new(2, 2),
    ]);

    clear_cells(&mut grid, &cleared);
    apply_gravity(&mut grid);

    assert_eq!(grid.column(0), vec![None, None, Some(RUBY), Some(TOPAZ)]);
    assert_eq!(grid.column(1), vec![Some(TOPAZ), Some(RUBY), Some(SAPPHIRE), Some(TOPAZ)]);
    assert_eq!(grid.column(2), vec![None, None, Some(TOPAZ), Some(SAPPHIRE)]);
}

#[test]
fn three_scatters_grant_ten_free_spins() {
    let table = PayTable::standard();
    let rules = CascadeRules::default();
    let grid = Grid::from_rows(vec![
        vec![RUBY, RUBY, RUBY, TOPAZ, SCATTER],
        vec![TOPAZ, SCATTER, RUBY, TOPAZ, RUBY],
        vec![SAPPHIRE, TOPAZ, SCATTER, RUBY, TOPAZ],
        vec![TOPAZ, RUBY, TOPAZ, SAPPHIRE, RUBY],
    ])
    .unwrap();
    let mut rng = StdRng::seed_from_u64(8);

    let steps = resolve_cascade(grid, &table, &rules, 1, &mut rng);
    let first = &steps[0];
    assert_eq!(first.evaluation.scatter_count, 3);
    assert_eq!(first.free_spins_awarded, 10);
    assert_eq!(first.payout, table.pay(RUBY, 3));
}

#[test]
fn two_scatters_keep_chain_alive_without_award() {
    let table = PayTable::standard();
    let rules = CascadeRules::default();
    let grid = Grid::from_rows(vec![vec![SCATTER, RUBY, TOPAZ, SCATTER, RUBY]]).unwrap();
    let mut rng = StdRng::seed_from_u64(3);

    let steps = resolve_cascade(grid, &table, &rules, 1, &mut rng);
    assert!(steps.len() >= 2);
    assert_eq!(steps[0].free_spins_awarded, 0);
    assert_eq!(steps[0].payout, 0);
    assert_eq!(steps[1].multiplier, 2);
}

#[test]
fn lazy_and_eager_resolution_agree() {
    let mut eager = GemEngine::cascade().with_seed(5);
    let mut lazy = GemEngine::cascade().with_seed(5);

    for _ in 0..50 {
        let grid = eager.generate_grid();
        assert_eq!(lazy.generate_grid(), grid);

        let expected = eager.resolve_cascade(grid.clone(), 2);
        let mut resolver = lazy.cascade_resolver(grid, 2);
        let mut stepped = Vec::new();
        while let Some(step) = lazy.step(&mut resolver) {
            stepped.push(step);
        }
        assert_eq!(stepped, expected);
        assert!(resolver.is_finished());
    }
}
