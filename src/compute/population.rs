//! Population lifecycle: founders, deaths with the shared correction, and births by division.

use std::collections::BTreeMap;

use rand::Rng;

use super::agent::{Agent, AgentId, Color, Crowd};
use super::qtable::ValueTable;
use super::world::World;
use crate::schema::{LearningConfig, MAX_FOUNDERS, RewardConfig, SimulationConfig};

/// Founder colors, assigned cyclically by founder index.
pub const FOUNDER_COLORS: [Color; 5] = [
    [100, 250, 100],
    [250, 100, 100],
    [100, 100, 250],
    [250, 250, 100],
    [100, 250, 250],
];

/// Lineage letter of the `index`-th founder: A, B, C, ...
///
/// `None` past Z; configurations with more founders fail validation.
pub fn founder_letter(index: usize) -> Option<char> {
    if index >= MAX_FOUNDERS {
        return None;
    }
    Some((b'A' + index as u8) as char)
}

/// The set of living agents of one run.
#[derive(Debug, Clone, Default)]
pub struct Population {
    agents: Vec<Agent>,
    lineage_counts: BTreeMap<char, u32>,
    next_id: u64,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `initial_agents` founders at uniformly random cells.
    ///
    /// Expects a validated configuration; founders past Z are not spawned.
    pub fn spawn_founders<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Self {
        let mut population = Self::new();
        for i in 0..config.initial_agents {
            let Some(letter) = founder_letter(i) else {
                break;
            };
            let position = (rng.gen_range(0..config.width), rng.gen_range(0..config.height));
            let founder = population.create(
                letter,
                FOUNDER_COLORS[i % FOUNDER_COLORS.len()],
                position,
                config.initial_energy,
                &config.learning,
            );
            population.agents.push(founder);
        }
        population
    }

    /// Build an agent with the next id and the next sequence number of its lineage.
    fn create(
        &mut self,
        lineage: char,
        color: Color,
        position: (usize, usize),
        energy: i32,
        learning: &LearningConfig,
    ) -> Agent {
        let sequence = self.lineage_counts.entry(lineage).or_insert(0);
        *sequence += 1;
        let id = AgentId(self.next_id);
        self.next_id += 1;
        Agent::new(id, lineage, *sequence, color, position, energy, learning)
    }

    /// Add a founder-like agent of the given lineage. Mostly useful for scripted setups.
    pub fn spawn(
        &mut self,
        lineage: char,
        color: Color,
        position: (usize, usize),
        energy: i32,
        learning: &LearningConfig,
    ) -> AgentId {
        let agent = self.create(lineage, color, position, energy, learning);
        let id = agent.id;
        self.agents.push(agent);
        id
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// How the population looks from agent `index`'s position in it.
    pub fn crowd_for(&self, index: usize, needy_threshold: i32) -> Crowd {
        let mut crowd = Crowd::default();
        for (i, other) in self.agents.iter().enumerate() {
            if !other.is_alive() {
                continue;
            }
            crowd.living += 1;
            if i != index && other.energy < needy_threshold {
                crowd.needy_peers += 1;
            }
        }
        crowd
    }

    /// Let every living agent act once, in order. Returns the number that acted.
    pub fn act_all<R: Rng + ?Sized>(
        &mut self,
        world: &mut World,
        table: &mut ValueTable,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> usize {
        let mut acted = 0;
        for i in 0..self.agents.len() {
            if !self.agents[i].is_alive() {
                continue;
            }
            let crowd = self.crowd_for(i, config.needy_threshold);
            let outcome = self.agents[i].act(world, crowd, table, config, rng);
            log::trace!(
                "{} {:?} in {} -> reward {:.1}",
                self.agents[i].name,
                outcome.action,
                outcome.state,
                outcome.reward
            );
            acted += 1;
        }
        acted
    }

    /// Remove agents with energy at or below zero.
    ///
    /// If any died, every survivor relearns its last transition with the death penalty.
    /// Returns the ids of the removed agents.
    pub fn resolve_deaths(&mut self, table: &mut ValueTable, reward: &RewardConfig) -> Vec<AgentId> {
        let (dead, alive): (Vec<Agent>, Vec<Agent>) = std::mem::take(&mut self.agents)
            .into_iter()
            .partition(|a| !a.is_alive());
        self.agents = alive;

        if !dead.is_empty() {
            for agent in &dead {
                log::debug!("{} starved", agent.name);
            }
            for survivor in &self.agents {
                survivor.apply_death_correction(table, dead.len(), reward);
            }
        }

        dead.into_iter().map(|a| a.id).collect()
    }

    /// Split every agent above the birth threshold into parent and child.
    ///
    /// The child takes half the parent's energy (rounded down) and its cell;
    /// the parent keeps the rest. Children join after all splits and do not
    /// act until the next step. Returns the ids of the newborns.
    pub fn resolve_births(&mut self, config: &SimulationConfig) -> Vec<AgentId> {
        let mut newborns = Vec::new();
        for i in 0..self.agents.len() {
            let parent = &mut self.agents[i];
            if parent.energy <= config.birth_threshold {
                continue;
            }
            let child_energy = parent.energy / 2;
            parent.energy -= child_energy;
            let (lineage, color, position) = (parent.lineage, parent.color, parent.position());
            let parent_name = parent.name.clone();

            let child = self.create(lineage, color, position, child_energy, &config.learning);
            log::debug!("{} born to {}", child.name, parent_name);
            newborns.push(child);
        }

        let ids = newborns.iter().map(|a| a.id).collect();
        self.agents.extend(newborns);
        ids
    }
}
