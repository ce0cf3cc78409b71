use std::collections::VecDeque;

use tracing::{event, Level};

use crate::grid::{EnergyGrid, Position, RESTING_MAX};

/// Holds the cells which may be due to flash.  The same cell can be
/// pushed more than once; `resolve_flashes_with` discards repeats.
pub trait Worklist {
    fn push(&mut self, pos: Position);
    fn pop(&mut self) -> Option<Position>;
}

impl Worklist for Vec<Position> {
    fn push(&mut self, pos: Position) {
        Vec::push(self, pos)
    }

    fn pop(&mut self) -> Option<Position> {
        Vec::pop(self)
    }
}

impl Worklist for VecDeque<Position> {
    fn push(&mut self, pos: Position) {
        self.push_back(pos)
    }

    fn pop(&mut self) -> Option<Position> {
        self.pop_front()
    }
}

fn is_due(grid: &EnergyGrid, pos: Position) -> bool {
    grid.energy(pos) > RESTING_MAX && !grid.has_flashed(pos)
}

/// Runs the chain reaction for one step on a grid whose cells have
/// just been incremented, returning the number of cells that flashed.
///
/// Flashed cells keep their marker (and their over-threshold energy)
/// so the caller can look at them before calling
/// `EnergyGrid::reset_flashed_to_zero`.
pub fn resolve_flashes(grid: &mut EnergyGrid) -> usize {
    let mut pending: VecDeque<Position> = VecDeque::with_capacity(grid.cell_count());
    resolve_flashes_with(grid, &mut pending)
}

/// As `resolve_flashes`, but takes candidates from `pending` in
/// whatever order it hands them out.  The outcome does not depend on
/// that order.
pub fn resolve_flashes_with<W: Worklist>(grid: &mut EnergyGrid, pending: &mut W) -> usize {
    let seeds: Vec<Position> = grid.positions().filter(|&pos| is_due(grid, pos)).collect();
    for pos in seeds {
        pending.push(pos);
    }

    let mut flashes: usize = 0;
    while let Some(pos) = pending.pop() {
        if grid.has_flashed(pos) {
            continue;
        }
        event!(Level::TRACE, "cell {} flashes with energy {}", pos, grid.energy(pos));
        grid.mark_flashed(pos);
        flashes += 1;
        for n in grid.neighbours(pos) {
            grid.bump(n);
            if is_due(grid, n) {
                pending.push(n);
            }
        }
    }
    event!(Level::DEBUG, "cascade finished after {} flashes", flashes);
    flashes
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    /// Hands out pending cells in a random (but seeded) order.
    struct ShuffledWorklist {
        items: Vec<Position>,
        rng: ChaCha8Rng,
    }

    impl ShuffledWorklist {
        fn new(seed: u64) -> ShuffledWorklist {
            ShuffledWorklist {
                items: Vec::new(),
                rng: ChaCha8Rng::seed_from_u64(seed),
            }
        }
    }

    impl Worklist for ShuffledWorklist {
        fn push(&mut self, pos: Position) {
            self.items.push(pos);
        }

        fn pop(&mut self) -> Option<Position> {
            if self.items.is_empty() {
                None
            } else {
                let i = self.rng.gen_range(0..self.items.len());
                Some(self.items.swap_remove(i))
            }
        }
    }

    fn make_grid(energy: Array2<u8>) -> EnergyGrid {
        EnergyGrid::try_from(energy).expect("valid test grid")
    }

    fn flashed_cells(grid: &EnergyGrid) -> Vec<Position> {
        grid.positions().filter(|&p| grid.has_flashed(p)).collect()
    }

    #[test]
    fn test_no_flashes_below_threshold() {
        let mut grid = make_grid(array![[1, 2], [8, 9]]);
        let before = grid.clone();
        assert_eq!(resolve_flashes(&mut grid), 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_small_cascade() {
        // The example from the puzzle text: the ring of 9s around the
        // middle flashes, and the centre is pushed over too.
        let mut grid = make_grid(array![
            [1, 1, 1, 1, 1],
            [1, 9, 9, 9, 1],
            [1, 9, 1, 9, 1],
            [1, 9, 9, 9, 1],
            [1, 1, 1, 1, 1],
        ]);
        grid.increment_all();
        assert_eq!(resolve_flashes(&mut grid), 9);
        grid.reset_flashed_to_zero();
        assert_eq!(
            grid.energies(),
            array![
                [3u8, 4, 5, 4, 3],
                [4, 0, 0, 0, 4],
                [5, 0, 0, 0, 5],
                [4, 0, 0, 0, 4],
                [3, 4, 5, 4, 3],
            ]
        );
    }

    #[test]
    fn test_cascade_crosses_the_grid() {
        // A single flash at one end tips over a whole row of 9s.
        let mut grid = make_grid(array![[9, 8, 8, 8, 8, 8]]);
        grid.increment_all();
        assert_eq!(resolve_flashes(&mut grid), 6);
        assert!(grid.all_flashed_this_step());
    }

    #[test]
    fn test_markers_survive_until_reset() {
        let mut grid = make_grid(array![[9, 0], [0, 0]]);
        grid.increment_all();
        assert_eq!(resolve_flashes(&mut grid), 1);
        assert_eq!(flashed_cells(&grid), vec![Position::new(0, 0)]);
        assert_eq!(grid.energy(Position::new(1, 1)), 2);
    }

    fn arb_grid() -> impl Strategy<Value = EnergyGrid> {
        (1usize..7, 1usize..7)
            .prop_flat_map(|(rows, cols)| {
                (
                    Just(rows),
                    Just(cols),
                    prop::collection::vec(0u8..=RESTING_MAX, rows * cols),
                )
            })
            .prop_map(|(rows, cols, cells)| {
                make_grid(Array2::from_shape_vec((rows, cols), cells).expect("shape matches"))
            })
    }

    proptest! {
        #[test]
        fn flash_count_is_bounded(mut grid in arb_grid()) {
            grid.increment_all();
            let flashes = resolve_flashes(&mut grid);
            prop_assert!(flashes <= grid.cell_count());
            prop_assert_eq!(flashes, grid.flashed_count());
        }

        #[test]
        fn outcome_ignores_worklist_order(grid in arb_grid(), seed in any::<u64>()) {
            let mut fifo = grid.clone();
            fifo.increment_all();
            let mut lifo = fifo.clone();
            let mut shuffled = fifo.clone();

            let fifo_flashes = resolve_flashes(&mut fifo);
            let lifo_flashes = resolve_flashes_with(&mut lifo, &mut Vec::<Position>::new());
            let shuffled_flashes = resolve_flashes_with(&mut shuffled, &mut ShuffledWorklist::new(seed));

            prop_assert_eq!(fifo_flashes, lifo_flashes);
            prop_assert_eq!(fifo_flashes, shuffled_flashes);
            prop_assert_eq!(flashed_cells(&fifo), flashed_cells(&lifo));
            prop_assert_eq!(flashed_cells(&fifo), flashed_cells(&shuffled));

            for g in [&mut fifo, &mut lifo, &mut shuffled] {
                g.reset_flashed_to_zero();
            }
            prop_assert_eq!(&fifo, &lifo);
            prop_assert_eq!(&fifo, &shuffled);
        }

        #[test]
        fn every_due_cell_flashes(mut grid in arb_grid()) {
            grid.increment_all();
            resolve_flashes(&mut grid);
            for pos in grid.positions() {
                prop_assert!(grid.has_flashed(pos) || grid.energy(pos) <= RESTING_MAX);
            }
        }
    }
}
