//! Bounded grid holding food, with stochastic regrowth.

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::schema::SimulationConfig;

/// Integer grid coordinate `(x, y)`.
pub type Cell = (usize, usize);

/// The food grid for one run.
#[derive(Debug, Clone)]
pub struct World {
    width: usize,
    height: usize,
    max_food: usize,
    regrow_prob: f64,
    food: BTreeSet<Cell>,
}

impl World {
    /// Create an empty world sized from the configuration.
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            max_food: config.food_count,
            regrow_prob: config.regrow_prob,
            food: BTreeSet::new(),
        }
    }

    /// Create a world and place its initial food.
    pub fn seeded<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Self {
        let mut world = Self::new(config);
        world.spawn_food(config.food_count, rng);
        world
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.width).flat_map(move |x| (0..self.height).map(move |y| (x, y)))
    }

    /// Replace the food set with `count` distinct cells chosen uniformly.
    pub fn spawn_food<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        let cells: Vec<Cell> = self.cells().collect();
        self.food = cells.choose_multiple(rng, count).copied().collect();
    }

    /// With `regrow_prob`, add one uniformly chosen empty cell while below the cap.
    ///
    /// Returns the cell that regrew, if any.
    pub fn regrow<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Cell> {
        if !rng.gen_bool(self.regrow_prob) || self.food.len() >= self.max_food {
            return None;
        }
        let empties: Vec<Cell> = self.cells().filter(|c| !self.food.contains(c)).collect();
        let cell = *empties.choose(rng)?;
        self.food.insert(cell);
        Some(cell)
    }

    pub fn has_food(&self, x: usize, y: usize) -> bool {
        self.food.contains(&(x, y))
    }

    /// Place food on a cell, ignoring out-of-bounds coordinates.
    pub fn place_food(&mut self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.food.insert((x, y))
    }

    /// Remove all food.
    pub fn clear_food(&mut self) {
        self.food.clear();
    }

    /// Remove food at a cell. Removing from an empty cell is a no-op.
    pub fn remove_food(&mut self, x: usize, y: usize) -> bool {
        self.food.remove(&(x, y))
    }

    pub fn food(&self) -> impl Iterator<Item = Cell> + '_ {
        self.food.iter().copied()
    }

    pub fn food_count(&self) -> usize {
        self.food.len()
    }

    /// Manhattan distance from `(x, y)` to the nearest food cell.
    pub fn nearest_food_distance(&self, x: usize, y: usize) -> Option<usize> {
        self.food
            .iter()
            .map(|&(fx, fy)| fx.abs_diff(x) + fy.abs_diff(y))
            .min()
    }

    /// Clamp a signed position onto the grid.
    pub fn clamp(&self, x: i64, y: i64) -> Cell {
        let max_x = self.width as i64 - 1;
        let max_y = self.height as i64 - 1;
        (x.clamp(0, max_x) as usize, y.clamp(0, max_y) as usize)
    }
}
