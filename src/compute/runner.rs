//! One run of the simulation: initialize, step until extinction or stop, summarize.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::agent::{AgentId, Color};
use super::population::Population;
use super::qtable::ValueTable;
use super::world::{Cell, World};
use crate::schema::{ConfigError, RunRecord, SimulationConfig};

/// Phase of the run state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    Initializing,
    Stepping,
    Finalizing,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The last agent died.
    Extinct,
    /// A stop was requested through the cancel handle.
    Cancelled,
    /// The configured step limit was hit.
    StepLimit,
}

/// Counters after one step, for display and logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub step: u64,
    pub living: usize,
    pub births_total: u64,
    pub deaths: usize,
    pub born: usize,
    pub food: usize,
    pub table_size: usize,
    pub mean_max_q: f64,
}

impl StepReport {
    /// One-line overlay text for this step.
    pub fn summary(&self) -> String {
        format!(
            "Step {}: {} agents, {} births, {} food, {} states, mean max-Q {:.2}",
            self.step, self.living, self.births_total, self.food, self.table_size, self.mean_max_q
        )
    }
}

/// Renderable view of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: u64,
    pub name: String,
    pub color: Color,
    pub position: Cell,
    pub energy: i32,
    pub energy_bucket: u8,
}

impl AgentView {
    /// Overlay label, e.g. `A1: E=100 Bin=9`.
    pub fn label(&self) -> String {
        format!("{}: E={} Bin={}", self.name, self.energy, self.energy_bucket)
    }
}

/// Everything a renderer needs to draw the grid and its overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub width: usize,
    pub height: usize,
    pub step: u64,
    pub births: u64,
    pub agents: Vec<AgentView>,
    pub food: Vec<Cell>,
}

/// Result of a completed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOutcome {
    pub record: RunRecord,
    pub stop_reason: StopReason,
}

/// A single run, borrowing the shared value table for every step.
pub struct Simulation {
    config: SimulationConfig,
    world: World,
    population: Population,
    rng: StdRng,
    step: u64,
    births: u64,
    phase: RunPhase,
}

impl Simulation {
    /// Validate the configuration, then build the world and the founders.
    pub fn new(config: SimulationConfig, mut rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let world = World::seeded(&config, &mut rng);
        let population = Population::spawn_founders(&config, &mut rng);
        Ok(Self {
            config,
            world,
            population,
            rng,
            step: 0,
            births: 0,
            phase: RunPhase::Initializing,
        })
    }

    /// Replace the initial state. Counters are reset.
    pub fn with_state(mut self, world: World, population: Population) -> Self {
        self.world = world;
        self.population = population;
        self.step = 0;
        self.births = 0;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn births(&self) -> u64 {
        self.births
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_extinct(&self) -> bool {
        self.population.is_empty()
    }

    /// Advance one step: act, regrow, deaths with correction, births.
    pub fn step(&mut self, table: &mut ValueTable) -> StepReport {
        self.phase = RunPhase::Stepping;

        self.population
            .act_all(&mut self.world, table, &self.config, &mut self.rng);
        self.world.regrow(&mut self.rng);
        let dead: Vec<AgentId> = self.population.resolve_deaths(table, &self.config.reward);
        let born = self.population.resolve_births(&self.config);
        self.births += born.len() as u64;
        self.step += 1;

        let report = StepReport {
            step: self.step,
            living: self.population.len(),
            births_total: self.births,
            deaths: dead.len(),
            born: born.len(),
            food: self.world.food_count(),
            table_size: table.len(),
            mean_max_q: table.mean_max(),
        };
        log::debug!(
            "step {}: {} alive, {} died, {} born, {} food, {} states, mean max-Q {:.3}",
            report.step,
            report.living,
            report.deaths,
            report.born,
            report.food,
            report.table_size,
            report.mean_max_q
        );
        report
    }

    fn should_stop(&self, stop: &AtomicBool) -> Option<StopReason> {
        if stop.load(Ordering::Relaxed) {
            return Some(StopReason::Cancelled);
        }
        if self.is_extinct() {
            return Some(StopReason::Extinct);
        }
        if let Some(limit) = self.config.max_steps
            && self.step >= limit
        {
            return Some(StopReason::StepLimit);
        }
        None
    }

    /// Step until extinction, stop request or step limit.
    pub fn run(&mut self, table: &mut ValueTable, stop: &AtomicBool) -> RunOutcome {
        self.run_with_callback(table, stop, |_, _| {})
    }

    /// Step until done, reporting after every step.
    pub fn run_with_callback<F>(
        &mut self,
        table: &mut ValueTable,
        stop: &AtomicBool,
        mut callback: F,
    ) -> RunOutcome
    where
        F: FnMut(&StepReport, &Simulation),
    {
        let stop_reason = loop {
            if let Some(reason) = self.should_stop(stop) {
                break reason;
            }
            let report = self.step(table);
            callback(&report, self);
        };

        self.phase = RunPhase::Finalizing;
        RunOutcome {
            record: self.stats(table),
            stop_reason,
        }
    }

    /// Run statistics as of now.
    pub fn stats(&self, table: &ValueTable) -> RunRecord {
        RunRecord {
            steps: self.step,
            births: self.births,
            max_q: table.mean_max(),
        }
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            width: self.world.width(),
            height: self.world.height(),
            step: self.step,
            births: self.births,
            agents: self
                .population
                .agents()
                .iter()
                .map(|a| AgentView {
                    id: a.id.0,
                    name: a.name.clone(),
                    color: a.color,
                    position: a.position(),
                    energy: a.energy,
                    energy_bucket: a.energy_bucket(),
                })
                .collect(),
            food: self.world.food().collect(),
        }
    }
}
