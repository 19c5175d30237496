//! Core grid types shared by the engine and its collaborators

use std::fmt;

use serde::{Deserialize, Serialize};

/// A grid cell position. `y` grows towards the north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell in the given direction (no bounds check).
    pub fn step(self, action: Action) -> Self {
        let (dx, dy) = action.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance between two cells
    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four cardinal moves.
///
/// The discriminants are the action indices used by the Q-table rows and by
/// the persisted table file, so the order must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Action {
    /// Number of actions (rows of the Q-table)
    pub const COUNT: usize = 4;

    /// All actions in index order
    pub const ALL: [Action; Action::COUNT] =
        [Action::North, Action::East, Action::South, Action::West];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Unit displacement `(dx, dy)` of this move
    pub fn delta(self) -> (i32, i32) {
        match self {
            Action::North => (0, 1),
            Action::East => (1, 0),
            Action::South => (0, -1),
            Action::West => (-1, 0),
        }
    }

    /// The direction 90 degrees clockwise from this one
    pub fn clockwise(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::COUNT]
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::North => "N",
            Action::East => "E",
            Action::South => "S",
            Action::West => "W",
        };
        f.write_str(name)
    }
}
