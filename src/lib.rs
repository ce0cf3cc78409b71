//! A grid of cells whose energy rises each step; cells that go over the
//! resting maximum flash, pushing up their neighbours' energy and
//! possibly making them flash too.

pub mod cascade;
pub mod error;
pub mod grid;
pub mod parse;
pub mod simulation;

pub use error::{GridError, NonConvergence};
pub use grid::{EnergyGrid, Position, RESTING_MAX};
pub use simulation::{Simulation, StepReport};
