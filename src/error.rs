use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Reasons a block of input cannot become an `EnergyGrid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    Empty,
    BadCharacter {
        row: usize,
        col: usize,
        ch: char,
    },
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    EnergyOutOfRange {
        row: usize,
        col: usize,
        energy: u8,
    },
}

impl Display for GridError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GridError::Empty => f.write_str("grid has no cells"),
            GridError::BadCharacter { row, col, ch } => {
                write!(
                    f,
                    "line {}, column {}: expected a digit but found {:?}",
                    row + 1,
                    col + 1,
                    ch
                )
            }
            GridError::RaggedRow {
                row,
                expected,
                found,
            } => {
                write!(
                    f,
                    "line {} has {} cells but earlier lines have {}",
                    row + 1,
                    found,
                    expected
                )
            }
            GridError::EnergyOutOfRange { row, col, energy } => {
                write!(
                    f,
                    "line {}, column {}: energy {} is above the resting maximum",
                    row + 1,
                    col + 1,
                    energy
                )
            }
        }
    }
}

impl Error for GridError {}

/// The synchronization search ran out of steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonConvergence {
    /// How many steps the search was allowed to take.
    pub steps: usize,
    /// Index of the last step taken (counted from construction of the simulation).
    pub last_step: usize,
}

impl Display for NonConvergence {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no synchronized flash within {} steps (stopped after step {})",
            self.steps, self.last_step
        )
    }
}

impl Error for NonConvergence {}

#[test]
fn test_error_messages() {
    assert_eq!(
        GridError::BadCharacter {
            row: 0,
            col: 3,
            ch: 'x'
        }
        .to_string(),
        "line 1, column 4: expected a digit but found 'x'"
    );
    assert_eq!(
        GridError::RaggedRow {
            row: 2,
            expected: 10,
            found: 9
        }
        .to_string(),
        "line 3 has 9 cells but earlier lines have 10"
    );
    assert_eq!(
        GridError::EnergyOutOfRange {
            row: 1,
            col: 0,
            energy: 12
        }
        .to_string(),
        "line 2, column 1: energy 12 is above the resting maximum"
    );
    assert_eq!(GridError::Empty.to_string(), "grid has no cells");
    assert_eq!(
        NonConvergence {
            steps: 5,
            last_step: 5
        }
        .to_string(),
        "no synchronized flash within 5 steps (stopped after step 5)"
    );
}
