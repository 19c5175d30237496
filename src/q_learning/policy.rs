//! Inference-only greedy policy for a trained table

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{
    q_table::{QTable, TableStatus},
    state::{StateEncoder, StateId},
};
use crate::{
    Error, Result,
    ports::World,
    types::{Action, Cell},
};

/// Decision taken by [`GreedyPolicy::next_step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyStep {
    pub state: StateId,
    pub action: Action,
    pub destination: Cell,
    /// Higher-ranked actions skipped because they were blocked
    pub blocked_attempts: usize,
    /// The ranked attempts ran out and a random walkable move was taken
    pub fallback: bool,
}

/// Greedy evader that never writes to its table
///
/// Blocked moves are skipped in rank order for at most `max_attempts`
/// actions before a random walkable direction is taken.
#[derive(Debug, Clone)]
pub struct GreedyPolicy {
    table: QTable,
    max_attempts: usize,
    rng: StdRng,
}

impl GreedyPolicy {
    pub const DEFAULT_ATTEMPTS: usize = 3;

    /// # Errors
    ///
    /// Returns [`Error::InvalidTable`] for a table flagged by a failed load.
    pub fn new(table: QTable) -> Result<Self> {
        if let TableStatus::Invalid { line, field } = table.status() {
            return Err(Error::InvalidTable { line, field });
        }
        Ok(Self {
            table,
            max_attempts: Self::DEFAULT_ATTEMPTS,
            rng: StdRng::from_rng(&mut rand::rng()),
        })
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    /// Best action for the current observation, resolved to a cell.
    pub fn next_step<W: World + ?Sized>(
        &mut self,
        world: &W,
        learner: Cell,
        pursuer: Cell,
    ) -> PolicyStep {
        let state = StateEncoder::encode(world, learner, pursuer);

        let mut blocked_attempts = 0;
        for action in self.table.ranked_actions(state).into_iter().take(self.max_attempts) {
            let dest = world.resolve_move(learner, action);
            if dest.walkable {
                return PolicyStep {
                    state,
                    action,
                    destination: dest.cell,
                    blocked_attempts,
                    fallback: false,
                };
            }
            blocked_attempts += 1;
        }

        let walkable: Vec<(Action, Cell)> = Action::ALL
            .iter()
            .map(|&action| (action, world.resolve_move(learner, action)))
            .filter(|(_, dest)| dest.walkable)
            .map(|(action, dest)| (action, dest.cell))
            .collect();
        let (action, destination) = if walkable.is_empty() {
            (self.table.best_action(state), learner)
        } else {
            walkable[self.rng.random_range(0..walkable.len())]
        };
        PolicyStep {
            state,
            action,
            destination,
            blocked_attempts,
            fallback: true,
        }
    }
}
