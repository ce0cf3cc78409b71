use std::fmt::{self, Display, Formatter};

use ndarray::prelude::*;

use crate::error::GridError;

/// Highest energy a cell can hold between steps.  A cell whose energy
/// goes above this flashes.
pub const RESTING_MAX: u8 = 9;

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Position {
        Position { row, col }
    }

    fn index(&self) -> (usize, usize) {
        (self.row, self.col)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// A rectangular grid of cell energies, plus a marker per cell saying
/// whether it has flashed during the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnergyGrid {
    energy: Array2<u8>,
    flashed: Array2<bool>,
}

impl TryFrom<Array2<u8>> for EnergyGrid {
    type Error = GridError;
    fn try_from(energy: Array2<u8>) -> Result<EnergyGrid, GridError> {
        if energy.is_empty() {
            return Err(GridError::Empty);
        }
        if let Some(((row, col), &e)) = energy.indexed_iter().find(|(_, e)| **e > RESTING_MAX) {
            return Err(GridError::EnergyOutOfRange {
                row,
                col,
                energy: e,
            });
        }
        let flashed = Array2::from_elem(energy.raw_dim(), false);
        Ok(EnergyGrid { energy, flashed })
    }
}

fn clamp_range(val: usize, limit: usize) -> Option<usize> {
    if val < limit {
        Some(val)
    } else {
        None
    }
}

impl EnergyGrid {
    pub fn rows(&self) -> usize {
        self.energy.nrows()
    }

    pub fn cols(&self) -> usize {
        self.energy.ncols()
    }

    pub fn cell_count(&self) -> usize {
        self.energy.len()
    }

    pub fn energies(&self) -> ArrayView2<'_, u8> {
        self.energy.view()
    }

    pub fn energy(&self, pos: Position) -> u8 {
        self.energy[pos.index()]
    }

    /// Every position in the grid, in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let cols = self.cols();
        (0..self.rows()).flat_map(move |r| (0..cols).map(move |c| Position::new(r, c)))
    }

    pub fn increment_all(&mut self) {
        self.energy.mapv_inplace(|e| e.saturating_add(1));
    }

    /// Adds one to the energy of a single cell and returns the new value.
    pub fn bump(&mut self, pos: Position) -> u8 {
        let cell = &mut self.energy[pos.index()];
        *cell = cell.saturating_add(1);
        *cell
    }

    /// The in-bounds cells surrounding `pos`, diagonals included.
    pub fn neighbours(&self, pos: Position) -> Vec<Position> {
        let (r, c) = pos.index();
        let mut result: Vec<Position> = Vec::with_capacity(8);
        let prev_col: Option<usize> = c.checked_sub(1);
        let next_col: Option<usize> = c.checked_add(1).and_then(|val| clamp_range(val, self.cols()));
        let prev_row: Option<usize> = r.checked_sub(1);
        let next_row: Option<usize> = r.checked_add(1).and_then(|val| clamp_range(val, self.rows()));

        // NW, N, NE; then W, E; then SW, S, SE.
        for row in [prev_row, Some(r), next_row].into_iter().flatten() {
            for col in [prev_col, Some(c), next_col].into_iter().flatten() {
                if (row, col) != (r, c) {
                    result.push(Position::new(row, col));
                }
            }
        }
        result
    }

    pub fn mark_flashed(&mut self, pos: Position) {
        self.flashed[pos.index()] = true;
    }

    pub fn has_flashed(&self, pos: Position) -> bool {
        self.flashed[pos.index()]
    }

    pub fn flashed_count(&self) -> usize {
        self.flashed.iter().filter(|&&f| f).count()
    }

    pub fn all_flashed_this_step(&self) -> bool {
        self.flashed.iter().all(|&f| f)
    }

    /// Drains every flashed cell back to zero and clears the markers
    /// ready for the next step.
    pub fn reset_flashed_to_zero(&mut self) {
        ndarray::Zip::from(&mut self.energy)
            .and(&mut self.flashed)
            .for_each(|e, f| {
                if *f {
                    *e = 0;
                    *f = false;
                }
            });
    }
}

impl Display for EnergyGrid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for row in self.energy.rows() {
            for &e in row {
                let ch = char::from_digit(u32::from(e), 10).unwrap_or('*');
                write!(f, "{}", ch)?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
fn grid_of(rows: usize, cols: usize, energy: u8) -> EnergyGrid {
    EnergyGrid::try_from(Array2::from_elem((rows, cols), energy)).expect("valid test grid")
}

#[test]
fn test_try_from_rejects_bad_grids() {
    let empty: Array2<u8> = Array2::zeros((0, 4));
    assert_eq!(EnergyGrid::try_from(empty), Err(GridError::Empty));
    let hot = ndarray::array![[1, 2], [3, 12]];
    assert_eq!(
        EnergyGrid::try_from(hot),
        Err(GridError::EnergyOutOfRange {
            row: 1,
            col: 1,
            energy: 12
        })
    );
}

#[test]
fn test_neighbours() {
    let grid = grid_of(5, 5, 0);
    assert_eq!(grid.neighbours(Position::new(2, 2)).len(), 8);
    assert_eq!(grid.neighbours(Position::new(0, 2)).len(), 5);
    assert_eq!(grid.neighbours(Position::new(4, 0)).len(), 3);
    let mut corner = grid.neighbours(Position::new(0, 0));
    corner.sort();
    assert_eq!(
        corner,
        vec![
            Position::new(0, 1),
            Position::new(1, 0),
            Position::new(1, 1)
        ]
    );

    assert!(grid_of(1, 1, 0).neighbours(Position::new(0, 0)).is_empty());
    let strip = grid_of(1, 4, 0);
    assert_eq!(strip.neighbours(Position::new(0, 1)).len(), 2);
    assert_eq!(strip.neighbours(Position::new(0, 3)), vec![Position::new(0, 2)]);
}

#[test]
fn test_neighbours_stay_in_bounds() {
    for (rows, cols) in [(1, 1), (1, 7), (6, 1), (2, 2), (3, 8)] {
        let grid = grid_of(rows, cols, 0);
        for pos in grid.positions() {
            for n in grid.neighbours(pos) {
                assert!(n.row < rows && n.col < cols, "{} is outside {}x{}", n, rows, cols);
                assert_ne!(n, pos);
            }
        }
    }
}

#[test]
fn test_flash_markers_and_reset() {
    let mut grid = grid_of(2, 3, 4);
    grid.increment_all();
    assert!(grid.positions().all(|p| grid.energy(p) == 5));

    let a = Position::new(0, 1);
    let b = Position::new(1, 2);
    assert_eq!(grid.bump(a), 6);
    grid.mark_flashed(a);
    grid.mark_flashed(b);
    assert!(grid.has_flashed(a));
    assert!(!grid.has_flashed(Position::new(0, 0)));
    assert_eq!(grid.flashed_count(), 2);
    assert!(!grid.all_flashed_this_step());

    grid.reset_flashed_to_zero();
    assert_eq!(grid.energy(a), 0);
    assert_eq!(grid.energy(b), 0);
    assert_eq!(grid.energy(Position::new(1, 1)), 5);
    assert_eq!(grid.flashed_count(), 0);
}

#[test]
fn test_all_flashed() {
    let mut grid = grid_of(2, 2, 0);
    let positions: Vec<Position> = grid.positions().collect();
    for p in positions {
        grid.mark_flashed(p);
    }
    assert!(grid.all_flashed_this_step());
}

#[test]
fn test_display() {
    let mut grid =
        EnergyGrid::try_from(ndarray::array![[1, 2, 3], [9, 0, 5]]).expect("valid test grid");
    assert_eq!(grid.to_string(), "123\n905\n");
    grid.increment_all();
    assert_eq!(grid.to_string(), "234\n*16\n");
}
