//! Configuration types for colony simulation parameters.

use serde::{Deserialize, Serialize};

/// Founder lineages are lettered A-Z.
pub const MAX_FOUNDERS: usize = 26;

/// Top-level simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Food cells placed at run start, and the regrowth ceiling.
    pub food_count: usize,
    /// Probability per step that one empty cell regrows food.
    #[serde(default = "default_regrow_prob")]
    pub regrow_prob: f64,
    /// Founders spawned at run start.
    pub initial_agents: usize,
    /// Energy each freshly spawned founder starts with.
    #[serde(default = "default_initial_energy")]
    pub initial_energy: i32,
    /// Energy spent by every movement action.
    pub move_cost: i32,
    /// Energy gained by eating one food cell.
    pub food_energy: i32,
    /// Agents below this energy count as needy.
    pub needy_threshold: i32,
    /// Agents above this energy split into parent and child.
    pub birth_threshold: i32,
    /// Reward shaping terms.
    #[serde(default)]
    pub reward: RewardConfig,
    /// Q-learning parameters.
    #[serde(default)]
    pub learning: LearningConfig,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Step limit per run (None = until extinction).
    #[serde(default)]
    pub max_steps: Option<u64>,
}

fn default_regrow_prob() -> f64 {
    0.1
}

fn default_initial_energy() -> i32 {
    100
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            food_count: 30,
            regrow_prob: default_regrow_prob(),
            initial_agents: 3,
            initial_energy: default_initial_energy(),
            move_cost: 1,
            food_energy: 30,
            needy_threshold: 50,
            birth_threshold: 100,
            reward: RewardConfig::default(),
            learning: LearningConfig::default(),
            random_seed: None,
            max_steps: None,
        }
    }
}

/// Additive reward terms applied after every action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Granted for simply still existing.
    pub alive: f64,
    /// Granted while the population equals the founder count.
    pub community: f64,
    /// Granted when food was eaten this step.
    pub food: f64,
    /// Granted at or above the needy threshold, subtracted below it.
    pub sated: f64,
    /// Subtracted once per needy peer.
    pub needy_peer: f64,
    /// Subtracted when the acting agent is the only one alive.
    pub lone_survivor: f64,
    /// Death correction magnitude, multiplied by deaths in the step.
    pub death: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            alive: 1.0,
            community: 5.0,
            food: 20.0,
            sated: 5.0,
            needy_peer: 1.0,
            lone_survivor: 50.0,
            death: 10.0,
        }
    }
}

/// Epsilon-greedy tabular learning parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningConfig {
    /// Exploration rate of a newly created agent.
    pub epsilon_start: f64,
    /// Exploration floor.
    pub epsilon_min: f64,
    /// Multiplicative decay applied after each action.
    pub epsilon_decay: f64,
    /// Learning rate.
    pub alpha: f64,
    /// Discount factor.
    pub gamma: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            epsilon_start: 0.3,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            alpha: 0.6,
            gamma: 0.9,
        }
    }
}

impl SimulationConfig {
    /// Number of cells in the grid.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.food_count > self.cell_count() {
            return Err(ConfigError::TooMuchFood {
                food: self.food_count,
                cells: self.cell_count(),
            });
        }
        if self.initial_agents == 0 {
            return Err(ConfigError::NoAgents);
        }
        if self.initial_agents > MAX_FOUNDERS {
            return Err(ConfigError::TooManyFounders(self.initial_agents));
        }
        if !(0.0..=1.0).contains(&self.regrow_prob) {
            return Err(ConfigError::InvalidProbability {
                name: "regrow_prob",
                value: self.regrow_prob,
            });
        }
        self.learning.validate()
    }
}

impl LearningConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("epsilon_start", self.epsilon_start),
            ("epsilon_min", self.epsilon_min),
            ("gamma", self.gamma),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }
        if self.epsilon_decay <= 0.0 || self.epsilon_decay > 1.0 {
            return Err(ConfigError::InvalidDecay(self.epsilon_decay));
        }
        if self.alpha <= 0.0 || self.alpha > 1.0 {
            return Err(ConfigError::InvalidLearningRate(self.alpha));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid dimensions (width, height) must be non-zero")]
    InvalidDimensions,
    #[error("Food count {food} exceeds the {cells} cells of the grid")]
    TooMuchFood { food: usize, cells: usize },
    #[error("At least one initial agent is required")]
    NoAgents,
    #[error("At most {MAX_FOUNDERS} initial agents are supported, got {0}")]
    TooManyFounders(usize),
    #[error("{name} must lie in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("Epsilon decay must lie in (0, 1], got {0}")]
    InvalidDecay(f64),
    #[error("Learning rate must lie in (0, 1], got {0}")]
    InvalidLearningRate(f64),
}
