use std::io;
use std::io::prelude::*;

use tracing_subscriber::prelude::*;

use flashgrid::{EnergyGrid, Simulation};

const PART1_STEPS: usize = 100;
const SYNC_SEARCH_LIMIT: usize = 1_000_000;

fn part1(grid: &EnergyGrid) {
    let flashes = Simulation::new(grid.clone()).run(PART1_STEPS);
    println!(
        "Day 11 part 1: after {} steps there were {} flashes",
        PART1_STEPS, flashes
    );
}

fn part2(grid: &EnergyGrid) {
    match Simulation::new(grid.clone()).first_synchronized_step(SYNC_SEARCH_LIMIT) {
        Ok(step) => {
            println!("Day 11 part 2: first synchronized flash at step {}", step);
        }
        Err(e) => {
            println!("Day 11 part 2: {}", e);
        }
    }
}

fn main() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);
    let filter_layer = match tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
    {
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Ok(layer) => layer,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        eprintln!("failed to read input: {}", e);
        std::process::exit(1);
    }
    match input.parse::<EnergyGrid>() {
        Ok(grid) => {
            part1(&grid);
            part2(&grid);
        }
        Err(e) => {
            eprintln!("fail: {}", e);
            std::process::exit(1);
        }
    }
}
