//! Shared tabular action-value store.

use std::collections::{BTreeMap, HashMap};

use super::state::{ACTION_COUNT, Action, StateKey};

/// One table row: an action value per action, in [`Action::ALL`] order.
pub type ActionValues = [f64; ACTION_COUNT];

/// Mapping from discretized state to action values.
///
/// Rows are created zeroed on first access, so lookups never fail.
#[derive(Debug, Clone, Default)]
pub struct ValueTable {
    rows: HashMap<StateKey, ActionValues>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a row, creating it zeroed if absent.
    pub fn row_mut(&mut self, key: StateKey) -> &mut ActionValues {
        self.rows.entry(key).or_insert([0.0; ACTION_COUNT])
    }

    /// Read a row without creating it.
    pub fn get(&self, key: &StateKey) -> Option<&ActionValues> {
        self.rows.get(key)
    }

    /// Overwrite a row.
    pub fn insert(&mut self, key: StateKey, values: ActionValues) {
        self.rows.insert(key, values);
    }

    /// Greedy action for a state; ties go to the earliest action.
    pub fn best_action(&mut self, key: StateKey) -> Action {
        let row = self.row_mut(key);
        let mut best = 0;
        for (i, &value) in row.iter().enumerate().skip(1) {
            if value > row[best] {
                best = i;
            }
        }
        Action::ALL[best]
    }

    /// Largest value in a state's row.
    pub fn max_value(&mut self, key: StateKey) -> f64 {
        row_max(self.row_mut(key))
    }

    /// One-step Q-learning update.
    ///
    /// `Q[s,a] += alpha * (reward + gamma * max(Q[s']) - Q[s,a])`. Returns the new value.
    pub fn update(
        &mut self,
        state: StateKey,
        action: Action,
        reward: f64,
        next_state: StateKey,
        alpha: f64,
        gamma: f64,
    ) -> f64 {
        let next_max = self.max_value(next_state);
        let cell = &mut self.row_mut(state)[action.index()];
        *cell += alpha * (reward + gamma * next_max - *cell);
        *cell
    }

    /// Mean over all rows of the row maximum; 0.0 for an empty table.
    pub fn mean_max(&self) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        self.rows.values().map(row_max).sum::<f64>() / self.rows.len() as f64
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &ActionValues)> {
        self.rows.iter()
    }

    /// Rows keyed by their `"energy,need,distance"` text form, in key order.
    pub fn to_text_rows(&self) -> BTreeMap<String, Vec<f64>> {
        let mut sorted: Vec<_> = self.rows.iter().collect();
        sorted.sort_by_key(|(key, _)| **key);
        sorted
            .into_iter()
            .map(|(key, values)| (key.to_string(), values.to_vec()))
            .collect()
    }

    /// Build a table from text-keyed rows.
    ///
    /// Rows with an unparsable key or a wrong length are returned as rejected keys.
    pub fn from_text_rows(rows: BTreeMap<String, Vec<f64>>) -> (Self, Vec<String>) {
        let mut table = Self::new();
        let mut rejected = Vec::new();
        for (text, values) in rows {
            let parsed = text
                .parse::<StateKey>()
                .ok()
                .zip(ActionValues::try_from(values.as_slice()).ok());
            match parsed {
                Some((key, values)) => table.insert(key, values),
                None => rejected.push(text),
            }
        }
        (table, rejected)
    }
}

fn row_max(row: &ActionValues) -> f64 {
    row.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn key(energy: u8, need: u8, distance: u8) -> StateKey {
        StateKey {
            energy,
            need,
            distance,
        }
    }

    #[test]
    fn test_rows_zero_initialized() {
        let mut table = ValueTable::new();
        assert!(table.get(&key(1, 0, 0)).is_none());
        assert_eq!(*table.row_mut(key(1, 0, 0)), [0.0; 5]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_best_action_ties_go_first() {
        let mut table = ValueTable::new();
        assert_eq!(table.best_action(key(0, 0, 0)), Action::Up);

        table.insert(key(0, 0, 0), [0.0, 2.0, 2.0, -1.0, 1.0]);
        assert_eq!(table.best_action(key(0, 0, 0)), Action::Down);

        table.insert(key(0, 0, 0), [-3.0, -2.0, -2.5, -1.0, -1.0]);
        assert_eq!(table.best_action(key(0, 0, 0)), Action::Right);
    }

    #[test]
    fn test_update_creates_both_rows() {
        let mut table = ValueTable::new();
        let value = table.update(key(5, 0, 0), Action::Stay, 10.0, key(6, 0, 0), 0.6, 0.9);
        assert!((value - 6.0).abs() < 1e-12);
        assert_eq!(table.len(), 2);
        assert_eq!(table.best_action(key(5, 0, 0)), Action::Stay);
    }

    #[test]
    fn test_mean_max() {
        let mut table = ValueTable::new();
        assert_eq!(table.mean_max(), 0.0);
        table.insert(key(0, 0, 0), [1.0, 3.0, 0.0, 0.0, 0.0]);
        table.insert(key(1, 0, 0), [-1.0, -2.0, -4.0, -1.5, -3.0]);
        assert!((table.mean_max() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_text_rows_skip_invalid() {
        let mut rows = BTreeMap::new();
        rows.insert("1,2,3".to_string(), vec![0.5, 0.0, 0.0, 0.0, 1.0]);
        rows.insert("bogus".to_string(), vec![0.0; 5]);
        rows.insert("1,1,1".to_string(), vec![0.0; 4]);

        let (table, rejected) = ValueTable::from_text_rows(rows);
        assert_eq!(table.len(), 1);
        assert_eq!(rejected.len(), 2);
        assert_eq!(table.get(&key(1, 2, 3)).unwrap()[4], 1.0);

        let text = table.to_text_rows();
        assert_eq!(text.get("1,2,3").unwrap().len(), 5);
    }

    proptest! {
        #[test]
        fn update_moves_alpha_of_the_gap(
            old in -100.0f64..100.0,
            next in proptest::array::uniform5(-100.0f64..100.0),
            reward in -100.0f64..100.0,
            alpha in 0.01f64..1.0,
            gamma in 0.0f64..1.0,
        ) {
            let s = key(2, 1, 0);
            let s_next = key(3, 1, 1);
            let mut table = ValueTable::new();
            let mut row = [0.0; 5];
            row[Action::Left.index()] = old;
            table.insert(s, row);
            table.insert(s_next, next);

            let target = reward + gamma * next.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let new = table.update(s, Action::Left, reward, s_next, alpha, gamma);
            prop_assert!((new - (old + alpha * (target - old))).abs() < 1e-9);
            prop_assert!((target - new).abs() <= (target - old).abs() + 1e-9);
        }

        #[test]
        fn greedy_choice_is_argmax(values in proptest::array::uniform5(-50i32..50)) {
            let row = values.map(f64::from);
            let mut table = ValueTable::new();
            table.insert(key(0, 0, 0), row);
            let chosen = table.best_action(key(0, 0, 0)).index();
            let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert_eq!(row[chosen], max);
            prop_assert!(row[..chosen].iter().all(|&v| v < max));
        }
    }
}
