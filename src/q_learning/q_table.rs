//! Dense Q-table for the 4 x 144 evader state space

use super::state::StateId;
use crate::types::Action;

/// Load status of the table contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableStatus {
    /// Values are initialised or fully loaded
    #[default]
    Ready,
    /// A load stopped at a malformed field; contents are partial
    Invalid { line: usize, field: usize },
}

/// Q-table mapping (action, state) pairs to Q-values
///
/// Rows are actions, columns are state ids. Both are closed-form indices so
/// every read and write is a direct array access.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: [[f64; StateId::COUNT]; Action::COUNT],
    status: TableStatus,
}

impl Default for QTable {
    fn default() -> Self {
        Self::new()
    }
}

impl QTable {
    /// Create a table with every value set to 0
    pub fn new() -> Self {
        Self {
            values: [[0.0; StateId::COUNT]; Action::COUNT],
            status: TableStatus::Ready,
        }
    }

    /// Reset every value to 0 and clear any invalid flag
    pub fn initialize(&mut self) {
        for row in &mut self.values {
            row.fill(0.0);
        }
        self.status = TableStatus::Ready;
    }

    /// Get the Q-value for a state-action pair
    pub fn value(&self, action: Action, state: StateId) -> f64 {
        self.values[action.index()][state.index()]
    }

    /// Greedy action for a state; ties go to the lowest action index
    pub fn best_action(&self, state: StateId) -> Action {
        let mut best = Action::North;
        let mut best_value = self.value(best, state);
        for &action in &Action::ALL[1..] {
            let value = self.value(action, state);
            if value > best_value {
                best = action;
                best_value = value;
            }
        }
        best
    }

    /// Maximum Q-value over actions for a state
    pub fn best_value(&self, state: StateId) -> f64 {
        Action::ALL
            .iter()
            .map(|&action| self.value(action, state))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Actions ordered from best to worst, ties in index order
    pub fn ranked_actions(&self, state: StateId) -> [Action; Action::COUNT] {
        let mut ranked = Action::ALL;
        // stable sort keeps index order among equal values
        ranked.sort_by(|a, b| self.value(*b, state).total_cmp(&self.value(*a, state)));
        ranked
    }

    /// Overwrite the Q-value for a state-action pair
    ///
    /// # Panics
    ///
    /// Panics if `value` is NaN or infinite.
    pub fn update(&mut self, action: Action, state: StateId, value: f64) {
        assert!(
            value.is_finite(),
            "non-finite Q-value {value} for ({action}, {state})"
        );
        self.values[action.index()][state.index()] = value;
    }

    /// Values of one action row in state-id order
    pub fn row(&self, action: Action) -> &[f64; StateId::COUNT] {
        &self.values[action.index()]
    }

    pub fn status(&self) -> TableStatus {
        self.status
    }

    pub fn is_valid(&self) -> bool {
        self.status == TableStatus::Ready
    }

    pub(crate) fn mark_invalid(&mut self, line: usize, field: usize) {
        self.status = TableStatus::Invalid { line, field };
    }

    /// Number of cells holding a non-zero value
    pub fn visited(&self) -> usize {
        self.values
            .iter()
            .flat_map(|row| row.iter())
            .filter(|value| **value != 0.0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(index: usize) -> StateId {
        StateId::new(index).unwrap()
    }

    #[test]
    fn test_qtable_initialization() {
        let table = QTable::new();
        for action in Action::ALL {
            assert!(table.row(action).iter().all(|v| *v == 0.0));
        }
        assert!(table.is_valid());
        assert_eq!(table.visited(), 0);
    }

    #[test]
    fn test_read_after_write() {
        let mut table = QTable::new();
        table.update(Action::South, state(77), -3.25);
        assert_eq!(table.value(Action::South, state(77)), -3.25);
        assert_eq!(table.value(Action::North, state(77)), 0.0);
        assert_eq!(table.visited(), 1);
    }

    #[test]
    fn test_best_action_and_value() {
        let mut table = QTable::new();
        let s = state(10);
        table.update(Action::North, s, 0.5);
        table.update(Action::East, s, 1.5);
        table.update(Action::South, s, 0.8);
        table.update(Action::West, s, -2.0);
        assert_eq!(table.best_action(s), Action::East);
        assert_eq!(table.best_value(s), 1.5);
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        let mut table = QTable::new();
        let s = state(42);
        table.update(Action::North, s, -1.0);
        table.update(Action::East, s, 2.0);
        table.update(Action::West, s, 2.0);
        assert_eq!(table.best_action(s), Action::East);

        let fresh = QTable::new();
        assert_eq!(fresh.best_action(s), Action::North);
    }

    #[test]
    fn test_ranked_actions() {
        let mut table = QTable::new();
        let s = state(3);
        table.update(Action::North, s, -5.0);
        table.update(Action::West, s, 4.0);
        assert_eq!(
            table.ranked_actions(s),
            [Action::West, Action::East, Action::South, Action::North]
        );
    }

    #[test]
    fn test_initialize_resets_values_and_status() {
        let mut table = QTable::new();
        table.update(Action::West, state(143), 9.0);
        table.mark_invalid(2, 5);
        assert!(!table.is_valid());

        table.initialize();
        assert_eq!(table.value(Action::West, state(143)), 0.0);
        assert_eq!(table.status(), TableStatus::Ready);
    }

    #[test]
    #[should_panic(expected = "non-finite")]
    fn test_rejects_nan() {
        let mut table = QTable::new();
        table.update(Action::North, state(0), f64::NAN);
    }
}
