//! Compute module - World, agents, learning and the run loop.

mod agent;
mod population;
mod qtable;
mod runner;
mod state;
mod world;

pub use agent::*;
pub use population::*;
pub use qtable::*;
pub use runner::*;
pub use state::*;
pub use world::*;
