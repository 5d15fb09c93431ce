use std::collections::HashMap;

use super::observation::Observation;
use crate::game::Direction;

/// Learned values keyed by (observation, action index)
///
/// Unseen pairs resolve to the configured default instead of failing.
/// Entries are never evicted.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: HashMap<(Observation, usize), f64>,
    default_value: f64,
}

impl QTable {
    pub fn new(default_value: f64) -> Self {
        Self {
            values: HashMap::new(),
            default_value,
        }
    }

    pub fn default_value(&self) -> f64 {
        self.default_value
    }

    /// Stored value, or the default for an unseen pair
    pub fn get(&self, state: &Observation, action: usize) -> f64 {
        self.values
            .get(&(*state, action))
            .copied()
            .unwrap_or(self.default_value)
    }

    pub fn set(&mut self, state: Observation, action: usize, value: f64) {
        self.values.insert((state, action), value);
    }

    /// Action with the highest value; ties go to the lowest index
    pub fn best_action(&self, state: &Observation) -> usize {
        let mut best = 0;
        let mut best_value = self.get(state, 0);

        for action in 1..Direction::COUNT {
            let value = self.get(state, action);
            if value > best_value {
                best = action;
                best_value = value;
            }
        }

        best
    }

    /// Highest value over all actions for `state`
    pub fn max_value(&self, state: &Observation) -> f64 {
        self.get(state, self.best_action(state))
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Observation, usize, f64)> {
        self.values
            .iter()
            .map(|((state, action), value)| (state, *action, *value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(n: usize) -> Observation {
        let mut flags = [false; 12];
        flags[n % 12] = true;
        Observation::from_flags(flags)
    }

    #[test]
    fn test_unseen_pairs_return_default() {
        let table = QTable::new(10.0);
        for action in 0..Direction::COUNT {
            assert_eq!(table.get(&state(0), action), 10.0);
        }
        assert!(table.is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let mut table = QTable::new(0.0);
        table.set(state(1), 2, 3.5);

        assert_eq!(table.get(&state(1), 2), 3.5);
        assert_eq!(table.get(&state(1), 1), 0.0);
        assert_eq!(table.get(&state(2), 2), 0.0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_best_action() {
        let mut table = QTable::new(0.0);
        table.set(state(0), 3, 1.0);
        table.set(state(0), 1, 0.5);

        assert_eq!(table.best_action(&state(0)), 3);
        assert_eq!(table.max_value(&state(0)), 1.0);
    }

    #[test]
    fn test_ties_go_to_first_action() {
        let mut table = QTable::new(0.0);
        assert_eq!(table.best_action(&state(0)), 0);

        table.set(state(0), 0, -1.0);
        table.set(state(0), 2, 4.0);
        table.set(state(0), 3, 4.0);
        assert_eq!(table.best_action(&state(0)), 2);
    }
}
