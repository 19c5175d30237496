//! Navigator port - the pursuer's movement policy
//!
//! The pursuer follows an external navigation algorithm that is opaque to
//! the learning engine.

use super::World;
use crate::types::Cell;

/// Pursuer navigation policy
pub trait Navigator {
    /// Next cell for the pursuer chasing `target`.
    ///
    /// Returns `None` when the pursuer has no defined position any more
    /// (for example when the target is unreachable). The training loop
    /// treats that as the end of the episode.
    fn next_step(&mut self, world: &dyn World, pursuer: Cell, target: Cell) -> Option<Cell>;

    /// Name used in logs and summaries
    fn name(&self) -> &str;
}

impl<N: Navigator + ?Sized> Navigator for Box<N> {
    fn next_step(&mut self, world: &dyn World, pursuer: Cell, target: Cell) -> Option<Cell> {
        (**self).next_step(world, pursuer, target)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
