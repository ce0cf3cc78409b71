use std::str::FromStr;

use ndarray::prelude::*;
use nom::{
    character::complete::{line_ending, satisfy},
    combinator::{all_consuming, map, opt},
    multi::{many1, separated_list1},
    sequence::terminated,
    IResult,
};

use crate::error::GridError;
use crate::grid::EnergyGrid;

fn energy_digit(input: &str) -> IResult<&str, u8> {
    map(satisfy(|ch: char| ch.is_ascii_digit()), |ch: char| ch as u8 - b'0')(input)
}

fn grid_rows(input: &str) -> IResult<&str, Vec<Vec<u8>>> {
    all_consuming(terminated(
        separated_list1(line_ending, many1(energy_digit)),
        opt(line_ending),
    ))(input)
}

/// Works out the (0-based) row and column in `input` of the start of
/// `rest`, which is a suffix of `body`.  `body` is `input` with
/// surrounding whitespace trimmed.
fn locate(input: &str, body: &str, rest: &str) -> (usize, usize) {
    let leading = input.len() - input.trim_start().len();
    let consumed = &input[..leading + body.len() - rest.len()];
    let row = consumed.matches('\n').count();
    let line_start = consumed.rfind('\n').map_or(0, |i| i + 1);
    (row, consumed[line_start..].chars().count())
}

/// Reads a block of digits, one row of the grid per line.
pub fn parse_grid(input: &str) -> Result<EnergyGrid, GridError> {
    let body = input.trim();
    if body.is_empty() {
        return Err(GridError::Empty);
    }
    let rows = match grid_rows(body) {
        Ok((_, rows)) => rows,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(match e.input.chars().next() {
                None => unreachable!("parse of non-empty input failed at end of input"),
                Some(ch) => {
                    let (row, col) = locate(input, body, e.input);
                    GridError::BadCharacter { row, col, ch }
                }
            });
        }
        Err(nom::Err::Incomplete(_)) => unreachable!("complete parsers never ask for more input"),
    };

    let skipped_lines = input[..input.len() - input.trim_start().len()]
        .matches('\n')
        .count();
    let width = rows[0].len();
    if let Some((row, found)) = rows
        .iter()
        .map(|r| r.len())
        .enumerate()
        .find(|(_, len)| *len != width)
    {
        return Err(GridError::RaggedRow {
            row: row + skipped_lines,
            expected: width,
            found,
        });
    }
    let energy = Array::from_shape_fn((rows.len(), width), |(r, c)| rows[r][c]);
    EnergyGrid::try_from(energy)
}

impl FromStr for EnergyGrid {
    type Err = GridError;
    fn from_str(s: &str) -> Result<EnergyGrid, GridError> {
        parse_grid(s)
    }
}

#[test]
fn test_parse_grid() {
    let grid = parse_grid("123\n456\n").expect("valid grid");
    assert_eq!(grid.rows(), 2);
    assert_eq!(grid.cols(), 3);
    assert_eq!(grid.energies(), ndarray::array![[1u8, 2, 3], [4, 5, 6]]);

    let no_trailing_newline: EnergyGrid = "123\n456".parse().expect("valid grid");
    assert_eq!(no_trailing_newline, grid);
    let crlf: EnergyGrid = "123\r\n456\r\n".parse().expect("valid grid");
    assert_eq!(crlf, grid);

    let surrounded: EnergyGrid = "\n123\n456\n\n".parse().expect("valid grid");
    assert_eq!(surrounded, grid);
    let blank_after: EnergyGrid = "123\n456\n\n\n".parse().expect("valid grid");
    assert_eq!(blank_after, grid);

    let single = parse_grid("9").expect("valid grid");
    assert_eq!(single.cell_count(), 1);
}

#[test]
fn test_parse_grid_errors() {
    assert_eq!(parse_grid(""), Err(GridError::Empty));
    assert_eq!(parse_grid("\n"), Err(GridError::Empty));
    assert_eq!(parse_grid("\n\n \n"), Err(GridError::Empty));
    // Positions count the blank lines skipped at the start.
    assert_eq!(
        parse_grid("\n123\n45\n"),
        Err(GridError::RaggedRow {
            row: 2,
            expected: 3,
            found: 2
        })
    );
    assert_eq!(
        parse_grid("\n\n123\n4x6\n"),
        Err(GridError::BadCharacter {
            row: 3,
            col: 1,
            ch: 'x'
        })
    );
    assert_eq!(
        parse_grid("123\n4x6\n"),
        Err(GridError::BadCharacter {
            row: 1,
            col: 1,
            ch: 'x'
        })
    );
    assert_eq!(
        parse_grid("12 \n456\n"),
        Err(GridError::BadCharacter {
            row: 0,
            col: 2,
            ch: ' '
        })
    );
    assert_eq!(
        parse_grid("123\n\n456\n"),
        Err(GridError::BadCharacter {
            row: 1,
            col: 0,
            ch: '\n'
        })
    );
    assert_eq!(
        parse_grid("123\n45\n789\n"),
        Err(GridError::RaggedRow {
            row: 1,
            expected: 3,
            found: 2
        })
    );
}
