//! Learning agents: observation, epsilon-greedy choice, action effects and reward shaping.

use rand::Rng;
use rand::seq::SliceRandom;

use super::qtable::ValueTable;
use super::state::{Action, StateKey, energy_bucket};
use super::world::World;
use crate::schema::{LearningConfig, RewardConfig, SimulationConfig};

/// Stable identifier assigned by the population at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u64);

/// RGB color, inherited from the lineage founder.
pub type Color = [u8; 3];

/// What an agent sees of the rest of the population when it acts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crowd {
    /// Living agents, the actor included.
    pub living: usize,
    /// Living peers below the needy threshold, the actor excluded.
    pub needy_peers: usize,
}

/// Result of one [`Agent::act`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionOutcome {
    pub state: StateKey,
    pub action: Action,
    pub next_state: StateKey,
    pub reward: f64,
    pub ate: bool,
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    /// Lineage letter followed by the per-lineage sequence number.
    pub name: String,
    pub lineage: char,
    pub color: Color,
    pub x: usize,
    pub y: usize,
    pub energy: i32,
    pub epsilon: f64,
    epsilon_min: f64,
    epsilon_decay: f64,
    alpha: f64,
    gamma: f64,
    pub(crate) last: Option<(StateKey, Action)>,
}

impl Agent {
    pub fn new(
        id: AgentId,
        lineage: char,
        sequence: u32,
        color: Color,
        position: (usize, usize),
        energy: i32,
        learning: &LearningConfig,
    ) -> Self {
        Self {
            id,
            name: format!("{lineage}{sequence}"),
            lineage,
            color,
            x: position.0,
            y: position.1,
            energy,
            epsilon: learning.epsilon_start,
            epsilon_min: learning.epsilon_min,
            epsilon_decay: learning.epsilon_decay,
            alpha: learning.alpha,
            gamma: learning.gamma,
            last: None,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.energy > 0
    }

    #[inline]
    pub fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    #[inline]
    pub fn energy_bucket(&self) -> u8 {
        energy_bucket(self.energy)
    }

    /// The most recent state-action pair this agent acted on.
    pub fn last_transition(&self) -> Option<(StateKey, Action)> {
        self.last
    }

    pub fn state_key(&self, crowd: Crowd, world: &World) -> StateKey {
        StateKey::observe(self.energy, self.position(), crowd.needy_peers, world)
    }

    /// Epsilon-greedy choice. The state's row exists afterwards either way.
    pub fn choose_action<R: Rng + ?Sized>(
        &self,
        state: StateKey,
        table: &mut ValueTable,
        rng: &mut R,
    ) -> Action {
        let greedy = table.best_action(state);
        if rng.gen_bool(self.epsilon.clamp(0.0, 1.0)) {
            *Action::ALL.choose(rng).unwrap_or(&greedy)
        } else {
            greedy
        }
    }

    /// Learning update with this agent's rate and discount.
    pub fn update_value(
        &self,
        table: &mut ValueTable,
        state: StateKey,
        action: Action,
        reward: f64,
        next_state: StateKey,
    ) -> f64 {
        table.update(state, action, reward, next_state, self.alpha, self.gamma)
    }

    /// Observe, choose, apply the action, learn from its reward, decay epsilon.
    pub fn act<R: Rng + ?Sized>(
        &mut self,
        world: &mut World,
        crowd: Crowd,
        table: &mut ValueTable,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> ActionOutcome {
        let state = self.state_key(crowd, world);
        let action = self.choose_action(state, table, rng);
        self.last = Some((state, action));

        let ate = self.apply(action, world, config);
        let reward = shape_reward(&config.reward, config, crowd, self.energy, ate);
        let next_state = self.state_key(crowd, world);
        self.update_value(table, state, action, reward, next_state);

        self.epsilon = (self.epsilon * self.epsilon_decay).max(self.epsilon_min);

        ActionOutcome {
            state,
            action,
            next_state,
            reward,
            ate,
        }
    }

    /// Apply an action's effect on position, energy and food. Returns true if food was eaten.
    fn apply(&mut self, action: Action, world: &mut World, config: &SimulationConfig) -> bool {
        if !action.is_move() {
            if world.remove_food(self.x, self.y) {
                self.energy += config.food_energy;
                return true;
            }
            return false;
        }
        let (dx, dy) = action.delta();
        (self.x, self.y) = world.clamp(self.x as i64 + dx, self.y as i64 + dy);
        self.energy -= config.move_cost;
        false
    }

    /// Terminal-style correction after peers died: re-learn the last transition
    /// against itself with reward `-death * deaths`.
    ///
    /// Returns false if the agent has not acted yet.
    pub fn apply_death_correction(
        &self,
        table: &mut ValueTable,
        deaths: usize,
        reward: &RewardConfig,
    ) -> bool {
        let Some((state, action)) = self.last else {
            return false;
        };
        let penalty = -reward.death * deaths as f64;
        self.update_value(table, state, action, penalty, state);
        true
    }
}

/// Reward for one action, given the energy after the action.
pub fn shape_reward(
    reward: &RewardConfig,
    config: &SimulationConfig,
    crowd: Crowd,
    energy: i32,
    ate: bool,
) -> f64 {
    let mut total = reward.alive;
    if crowd.living == config.initial_agents {
        total += reward.community;
    }
    if ate {
        total += reward.food;
    }
    if energy >= config.needy_threshold {
        total += reward.sated;
    } else {
        total -= reward.sated;
    }
    total -= reward.needy_peer * crowd.needy_peers as f64;
    if crowd.living == 1 {
        total -= reward.lone_survivor;
    }
    total
}
