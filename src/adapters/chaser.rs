//! Breadth-first pursuer.

use std::collections::{HashMap, VecDeque};

use crate::{
    ports::{Navigator, World},
    types::{Action, Cell},
};

/// Pursuer that takes one step along a shortest path to its target.
///
/// Neighbours are expanded in action order, so among equally short paths
/// the one whose first step comes earliest in N, E, S, W order wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct BfsChaser;

impl BfsChaser {
    pub fn new() -> Self {
        Self
    }

    /// Full shortest path from `from` to `to`, excluding `from`.
    pub fn path(world: &dyn World, from: Cell, to: Cell) -> Option<Vec<Cell>> {
        if from == to {
            return Some(Vec::new());
        }
        if !world.is_walkable(to) {
            return None;
        }

        let mut parents: HashMap<Cell, Cell> = HashMap::new();
        let mut frontier = VecDeque::from([from]);
        while let Some(cell) = frontier.pop_front() {
            for action in Action::ALL {
                let dest = world.resolve_move(cell, action);
                if !dest.walkable || dest.cell == from || parents.contains_key(&dest.cell) {
                    continue;
                }
                parents.insert(dest.cell, cell);
                if dest.cell == to {
                    let mut path = vec![to];
                    let mut current = to;
                    while let Some(&parent) = parents.get(&current) {
                        if parent == from {
                            break;
                        }
                        path.push(parent);
                        current = parent;
                    }
                    path.reverse();
                    return Some(path);
                }
                frontier.push_back(dest.cell);
            }
        }
        None
    }
}

impl Navigator for BfsChaser {
    fn next_step(&mut self, world: &dyn World, pursuer: Cell, target: Cell) -> Option<Cell> {
        let path = Self::path(world, pursuer, target)?;
        Some(path.first().copied().unwrap_or(pursuer))
    }

    fn name(&self) -> &str {
        "bfs"
    }
}
