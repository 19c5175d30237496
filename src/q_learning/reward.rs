//! Reward shaping for the evader
//!
//! All constants are tunable through [`RewardConfig`]; the defaults favour
//! gaining distance and breaking line of sight while punishing corners and
//! the pursuer's immediate neighbourhood.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, ports::World, types::Cell};

/// Reward shaping constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Reward for stepping onto the pursuer's cell; overrides every other term
    pub capture: f64,
    /// Reward per cell of Manhattan distance gained
    pub per_cell_gained: f64,
    /// Added when the distance did not increase
    pub no_gain: f64,
    /// Distance at or below which the danger penalty applies
    pub danger_radius: u32,
    /// Added when the distance did not increase and ended inside the danger radius
    pub danger: f64,
    /// Added when a wall blocks the line between learner and pursuer after the move
    pub line_of_sight_broken: f64,
    /// Added when the destination is a corner
    pub corner: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            capture: -100.0,
            per_cell_gained: 100.0,
            no_gain: -10.0,
            danger_radius: 2,
            danger: -100.0,
            line_of_sight_broken: 20.0,
            corner: -50.0,
        }
    }
}

impl RewardConfig {
    /// Reward for moving the learner from `from` to `to` while the pursuer
    /// stands on `pursuer`.
    pub fn shape<W: World + ?Sized>(&self, world: &W, from: Cell, to: Cell, pursuer: Cell) -> f64 {
        if to == pursuer {
            return self.capture;
        }

        let before = world.distance(from, pursuer);
        let after = world.distance(to, pursuer);

        let mut reward = if after > before {
            self.per_cell_gained * f64::from(after - before)
        } else if after <= self.danger_radius {
            self.no_gain + self.danger
        } else {
            self.no_gain
        };

        if !world.has_line_of_sight(to, pursuer) {
            reward += self.line_of_sight_broken;
        }
        if world.is_corner(to) {
            reward += self.corner;
        }
        reward
    }

    pub fn validate(&self) -> Result<()> {
        let terms = [
            ("capture", self.capture),
            ("per_cell_gained", self.per_cell_gained),
            ("no_gain", self.no_gain),
            ("danger", self.danger),
            ("line_of_sight_broken", self.line_of_sight_broken),
            ("corner", self.corner),
        ];
        for (name, value) in terms {
            if !value.is_finite() {
                return Err(Error::config(format!(
                    "reward term '{name}' must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}
