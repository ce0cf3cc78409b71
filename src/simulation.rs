use tracing::{event, span, Level};

use crate::cascade::resolve_flashes;
use crate::error::NonConvergence;
use crate::grid::EnergyGrid;

/// What happened during one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    /// 1-based index of the step, counted from when the simulation was created.
    pub step: usize,
    pub flashes: usize,
    /// True if every cell flashed during this step.
    pub synchronized: bool,
}

/// Owns an `EnergyGrid` and moves it forward one step at a time.
#[derive(Debug, Clone)]
pub struct Simulation {
    grid: EnergyGrid,
    steps_taken: usize,
}

impl Simulation {
    pub fn new(grid: EnergyGrid) -> Simulation {
        Simulation {
            grid,
            steps_taken: 0,
        }
    }

    pub fn grid(&self) -> &EnergyGrid {
        &self.grid
    }

    pub fn into_grid(self) -> EnergyGrid {
        self.grid
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    pub fn step(&mut self) -> StepReport {
        self.steps_taken += 1;
        self.grid.increment_all();
        let flashes = resolve_flashes(&mut self.grid);
        // This has to be checked before the markers are cleared.
        let synchronized = self.grid.all_flashed_this_step();
        self.grid.reset_flashed_to_zero();
        event!(
            Level::DEBUG,
            "after step {}: {} flashes{}\n{}",
            self.steps_taken,
            flashes,
            if synchronized { " (synchronized)" } else { "" },
            &self.grid
        );
        StepReport {
            step: self.steps_taken,
            flashes,
            synchronized,
        }
    }

    /// Runs exactly `steps` steps and returns the total number of flashes.
    pub fn run(&mut self, steps: usize) -> usize {
        let span = span!(Level::INFO, "run", steps = steps);
        let _enter = span.enter();
        (0..steps).map(|_| self.step().flashes).sum()
    }

    /// Steps until every cell flashes at once, returning the index of
    /// that step.  Gives up after `max_steps` steps.
    pub fn first_synchronized_step(&mut self, max_steps: usize) -> Result<usize, NonConvergence> {
        let span = span!(Level::INFO, "first_synchronized_step", max_steps = max_steps);
        let _enter = span.enter();
        for _ in 0..max_steps {
            let report = self.step();
            if report.synchronized {
                event!(Level::INFO, "every cell flashed in step {}", report.step);
                return Ok(report.step);
            }
        }
        event!(
            Level::WARN,
            "no synchronized flash within {} steps",
            max_steps
        );
        Err(NonConvergence {
            steps: max_steps,
            last_step: self.steps_taken,
        })
    }
}
