//! Discrete state encoding
//!
//! An observation is the walkability of the four neighbouring cells plus the
//! pursuer's position relative to the learner on each axis. The state id is
//! computed in closed form and is used directly as the Q-table column:
//!
//! ```text
//! bitmask = n*1 + s*2 + e*4 + w*8          (0..=15)
//! id      = bitmask*9 + vertical*3 + horizontal   (0..=143)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    ports::World,
    types::{Action, Cell},
};

/// Pursuer position relative to the learner on the north/south axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vertical {
    Above = 0,
    Below = 1,
    Level = 2,
}

/// Pursuer position relative to the learner on the east/west axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizontal {
    Right = 0,
    Left = 1,
    Level = 2,
}

impl Vertical {
    pub const ALL: [Vertical; 3] = [Vertical::Above, Vertical::Below, Vertical::Level];

    fn between(learner: Cell, pursuer: Cell) -> Self {
        match pursuer.y.cmp(&learner.y) {
            std::cmp::Ordering::Greater => Vertical::Above,
            std::cmp::Ordering::Less => Vertical::Below,
            std::cmp::Ordering::Equal => Vertical::Level,
        }
    }
}

impl Horizontal {
    pub const ALL: [Horizontal; 3] = [Horizontal::Right, Horizontal::Left, Horizontal::Level];

    fn between(learner: Cell, pursuer: Cell) -> Self {
        match pursuer.x.cmp(&learner.x) {
            std::cmp::Ordering::Greater => Horizontal::Right,
            std::cmp::Ordering::Less => Horizontal::Left,
            std::cmp::Ordering::Equal => Horizontal::Level,
        }
    }
}

/// Bijective address of an [`Observation`]; always in `0..StateId::COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(u8);

impl StateId {
    /// Number of distinct states (columns of the Q-table)
    pub const COUNT: usize = 16 * 9;

    /// Checked constructor
    pub fn new(index: usize) -> Option<Self> {
        (index < Self::COUNT).then_some(Self(index as u8))
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Every state id in ascending order
    pub fn all() -> impl Iterator<Item = StateId> {
        (0..Self::COUNT as u8).map(StateId)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Raw discretised observation of the learner's surroundings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observation {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
    pub vertical: Vertical,
    pub horizontal: Horizontal,
}

impl Observation {
    /// Observe the world from the learner's cell.
    pub fn observe<W: World + ?Sized>(world: &W, learner: Cell, pursuer: Cell) -> Self {
        let open = |action| world.resolve_move(learner, action).walkable;
        Self {
            north: open(Action::North),
            south: open(Action::South),
            east: open(Action::East),
            west: open(Action::West),
            vertical: Vertical::between(learner, pursuer),
            horizontal: Horizontal::between(learner, pursuer),
        }
    }

    /// Walkability bitmask `n*1 + s*2 + e*4 + w*8`
    pub fn bitmask(&self) -> u8 {
        u8::from(self.north)
            | u8::from(self.south) << 1
            | u8::from(self.east) << 2
            | u8::from(self.west) << 3
    }

    pub fn state_id(&self) -> StateId {
        let id = usize::from(self.bitmask()) * 9
            + self.vertical as usize * 3
            + self.horizontal as usize;
        assert!(id < StateId::COUNT, "state id {id} outside the domain");
        StateId(id as u8)
    }

    /// Closed-form inverse of [`Observation::state_id`]
    pub fn from_state_id(id: StateId) -> Self {
        let index = id.index();
        let bitmask = index / 9;
        let rest = index % 9;
        Self {
            north: bitmask & 1 != 0,
            south: bitmask & 2 != 0,
            east: bitmask & 4 != 0,
            west: bitmask & 8 != 0,
            vertical: Vertical::ALL[rest / 3],
            horizontal: Horizontal::ALL[rest % 3],
        }
    }
}

/// Stateless encoder from positions to [`StateId`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StateEncoder;

impl StateEncoder {
    pub fn encode<W: World + ?Sized>(world: &W, learner: Cell, pursuer: Cell) -> StateId {
        Observation::observe(world, learner, pursuer).state_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(n: bool, s: bool, e: bool, w: bool, v: Vertical, h: Horizontal) -> Observation {
        Observation {
            north: n,
            south: s,
            east: e,
            west: w,
            vertical: v,
            horizontal: h,
        }
    }

    #[test]
    fn test_all_open_pursuer_above_right() {
        let o = obs(true, true, true, true, Vertical::Above, Horizontal::Right);
        assert_eq!(o.bitmask(), 15);
        assert_eq!(o.state_id().index(), 135);
    }

    #[test]
    fn test_bit_weights() {
        let base = obs(false, false, false, false, Vertical::Above, Horizontal::Right);
        assert_eq!(base.state_id().index(), 0);
        assert_eq!(obs(true, false, false, false, Vertical::Above, Horizontal::Right).bitmask(), 1);
        assert_eq!(obs(false, true, false, false, Vertical::Above, Horizontal::Right).bitmask(), 2);
        assert_eq!(obs(false, false, true, false, Vertical::Above, Horizontal::Right).bitmask(), 4);
        assert_eq!(obs(false, false, false, true, Vertical::Above, Horizontal::Right).bitmask(), 8);
        let last = obs(true, true, true, true, Vertical::Level, Horizontal::Level);
        assert_eq!(last.state_id().index(), 143);
    }

    #[test]
    fn test_decode_every_id() {
        for id in StateId::all() {
            assert_eq!(Observation::from_state_id(id).state_id(), id);
        }
    }

    #[test]
    fn test_checked_constructor() {
        assert!(StateId::new(143).is_some());
        assert!(StateId::new(144).is_none());
    }

    #[test]
    fn test_relative_position() {
        let learner = Cell::new(5, 5);
        assert_eq!(Vertical::between(learner, Cell::new(5, 9)), Vertical::Above);
        assert_eq!(Vertical::between(learner, Cell::new(0, 1)), Vertical::Below);
        assert_eq!(Vertical::between(learner, Cell::new(0, 5)), Vertical::Level);
        assert_eq!(Horizontal::between(learner, Cell::new(6, 0)), Horizontal::Right);
        assert_eq!(Horizontal::between(learner, Cell::new(4, 0)), Horizontal::Left);
        assert_eq!(Horizontal::between(learner, Cell::new(5, 0)), Horizontal::Level);
    }
}
