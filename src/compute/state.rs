//! State discretization and the fixed action set.

use std::fmt;
use std::str::FromStr;

use super::world::World;

/// Number of energy buckets (0-9).
pub const ENERGY_BUCKETS: u8 = 10;
/// Number of needy-peer buckets (0-4).
pub const NEED_BUCKETS: u8 = 5;
/// Number of food-distance buckets (0-5).
pub const DISTANCE_BUCKETS: u8 = 6;

/// Energy bucket: `min(energy div 10, 9)`, with negative energy in bucket 0.
#[inline]
pub fn energy_bucket(energy: i32) -> u8 {
    (energy.max(0) / 10).min(ENERGY_BUCKETS as i32 - 1) as u8
}

/// Needy-peer bucket: the peer count saturated at 4.
#[inline]
pub fn need_bucket(needy_peers: usize) -> u8 {
    needy_peers.min(NEED_BUCKETS as usize - 1) as u8
}

/// Distance bucket: `min(distance div 2, 5)`.
#[inline]
pub fn distance_bucket(distance: usize) -> u8 {
    (distance / 2).min(DISTANCE_BUCKETS as usize - 1) as u8
}

/// Discretized situation of one agent, used to index the value table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey {
    pub energy: u8,
    pub need: u8,
    pub distance: u8,
}

impl StateKey {
    /// Total number of distinct keys.
    pub const SPACE: usize =
        ENERGY_BUCKETS as usize * NEED_BUCKETS as usize * DISTANCE_BUCKETS as usize;

    /// Discretize an agent's situation.
    ///
    /// With no food on the grid the distance is taken as `width + height`.
    pub fn observe(energy: i32, position: (usize, usize), needy_peers: usize, world: &World) -> Self {
        let distance = world
            .nearest_food_distance(position.0, position.1)
            .unwrap_or(world.width() + world.height());
        Self {
            energy: energy_bucket(energy),
            need: need_bucket(needy_peers),
            distance: distance_bucket(distance),
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.energy, self.need, self.distance)
    }
}

/// Error parsing a persisted `"energy,need,distance"` key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid state key {0:?}")]
pub struct ParseStateKeyError(pub String);

impl FromStr for StateKey {
    type Err = ParseStateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseStateKeyError(s.to_string());
        let mut parts = s.split(',').map(|p| p.trim().parse::<u8>());
        let (Some(Ok(energy)), Some(Ok(need)), Some(Ok(distance)), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(err());
        };
        if energy >= ENERGY_BUCKETS || need >= NEED_BUCKETS || distance >= DISTANCE_BUCKETS {
            return Err(err());
        }
        Ok(Self {
            energy,
            need,
            distance,
        })
    }
}

/// Number of actions.
pub const ACTION_COUNT: usize = 5;

/// The five agent actions, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Stay,
}

impl Action {
    pub const ALL: [Action; ACTION_COUNT] = [
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::Stay,
    ];

    /// Column of this action in a table row.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Grid displacement; `Stay` does not move.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Action::Up => (0, -1),
            Action::Down => (0, 1),
            Action::Left => (-1, 0),
            Action::Right => (1, 0),
            Action::Stay => (0, 0),
        }
    }

    #[inline]
    pub fn is_move(self) -> bool {
        self != Action::Stay
    }
}
