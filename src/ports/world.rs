//! World port - the grid the two agents move on
//!
//! The engine never owns a map representation. It only asks this port
//! whether cells can be entered, where a move leads and for random start
//! cells, so any grid back-end can drive training.

use rand::RngCore;

use crate::types::{Action, Cell};

/// Result of resolving a move against the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destination {
    /// Cell the move leads to (may lie outside the world)
    pub cell: Cell,
    /// Whether the agent may enter `cell`
    pub walkable: bool,
}

/// Queryable grid world
///
/// Only [`World::bounds`], [`World::is_walkable`] and
/// [`World::random_walkable_cell`] are required. The remaining queries have
/// grid defaults that implementations may override.
///
/// # Examples
///
/// ```
/// use evader::{adapters::GridWorld, ports::World, types::{Action, Cell}};
///
/// let world = GridWorld::open(3, 3);
/// let dest = world.resolve_move(Cell::new(0, 0), Action::West);
/// assert!(!dest.walkable);
/// ```
pub trait World {
    /// World size as `(width, height)`; valid cells satisfy
    /// `0 <= x < width` and `0 <= y < height`.
    fn bounds(&self) -> (i32, i32);

    /// Whether a cell may be entered. Cells outside the bounds are never
    /// walkable.
    fn is_walkable(&self, cell: Cell) -> bool;

    /// Draw a uniformly random walkable cell, or `None` if there is none.
    fn random_walkable_cell(&self, rng: &mut dyn RngCore) -> Option<Cell>;

    /// Resolve an attempted move from `from`.
    fn resolve_move(&self, from: Cell, action: Action) -> Destination {
        let cell = from.step(action);
        Destination {
            cell,
            walkable: self.is_walkable(cell),
        }
    }

    fn in_bounds(&self, cell: Cell) -> bool {
        let (width, height) = self.bounds();
        (0..width).contains(&cell.x) && (0..height).contains(&cell.y)
    }

    fn distance(&self, a: Cell, b: Cell) -> u32 {
        a.manhattan(b)
    }

    /// Whether the straight line between two cells is free of walls.
    ///
    /// Walks the Bresenham line from `from` to `to`; endpoints are not
    /// checked.
    fn has_line_of_sight(&self, from: Cell, to: Cell) -> bool {
        let dx = (to.x - from.x).abs();
        let dy = -(to.y - from.y).abs();
        let sx = if from.x < to.x { 1 } else { -1 };
        let sy = if from.y < to.y { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (from.x, from.y);

        loop {
            if x == to.x && y == to.y {
                return true;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
            let cell = Cell::new(x, y);
            if cell != to && !self.is_walkable(cell) {
                return false;
            }
        }
    }

    /// A corner is a cell blocked (wall or world edge) on two adjacent sides.
    fn is_corner(&self, cell: Cell) -> bool {
        Action::ALL.iter().any(|&side| {
            !self.resolve_move(cell, side).walkable
                && !self.resolve_move(cell, side.clockwise()).walkable
        })
    }
}
