//! Colony RL - Grid agents learning cooperative survival.
//!
//! Agents on a small food grid learn, through tabular Q-learning, to balance
//! their own energy against rewards tied to the size and health of the group.
//! Agents starve at zero energy and divide into parent and child above the
//! birth threshold, so the population the reward depends on keeps changing.
//!
//! # Architecture
//!
//! - `schema`: Configuration and persisted record types
//! - `compute`: World, agents, value table, population lifecycle, run loop
//! - `storage`: JSON persistence of value table, high scores and history
//! - `session`: Repeated runs sharing one value table
//! - `viewer`: Launching the history viewer beside the CLI
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::atomic::AtomicBool;
//!
//! use colony_rl::{
//!     compute::{Simulation, ValueTable},
//!     schema::SimulationConfig,
//! };
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let config = SimulationConfig::default();
//! let mut table = ValueTable::new();
//! let mut simulation = Simulation::new(config, StdRng::seed_from_u64(7))?;
//!
//! let outcome = simulation.run(&mut table, &AtomicBool::new(false));
//! println!(
//!     "{} steps, {} births, mean max-Q {:.3}",
//!     outcome.record.steps, outcome.record.births, outcome.record.max_q
//! );
//! # Ok::<(), colony_rl::schema::ConfigError>(())
//! ```

pub mod compute;
pub mod schema;
pub mod session;
pub mod storage;
pub mod viewer;

// Re-export commonly used types
pub use compute::{Simulation, SimulationSnapshot, StepReport, ValueTable};
pub use schema::{HighScores, RunRecord, SimulationConfig};
pub use session::{Session, SessionError};
pub use storage::Storage;
