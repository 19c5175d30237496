//! Trainer parameters
//!
//! Constructed once and validated before any training step runs. Only the
//! exploration rate changes afterwards, and only through
//! [`TrainerParams::decay_epsilon`].

use serde::{Deserialize, Serialize};

use super::reward::RewardConfig;
use crate::{Error, Result};

/// Configuration of the Q-learning trainer
///
/// # Examples
///
/// ```
/// use evader::q_learning::TrainerParams;
///
/// let params = TrainerParams::default()
///     .with_alpha(0.2)
///     .with_epsilon(0.3)
///     .with_max_steps(500);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerParams {
    /// Learning rate α in (0, 1]
    pub alpha: f64,
    /// Discount factor γ in [0, 1]
    pub gamma: f64,
    /// Exploration rate ε in [0, 1]
    epsilon: f64,
    /// Lower bound applied by every epsilon decay
    pub min_epsilon: f64,
    /// Episode step limit
    pub max_steps: usize,
    /// Persist the table whenever the episode counter is a multiple of this
    pub episodes_between_saves: usize,
    /// Factor applied to ε when the learner is detected stuck
    pub stuck_decay: f64,
    /// Factor applied to ε at every episode boundary (1.0 disables it)
    pub episode_decay: f64,
    /// Value written straight into the table for a move into a blocked cell
    pub blocked_penalty: f64,
    /// Selection attempts before falling back to a random walkable move
    pub max_move_attempts: usize,
    /// Number of identical trailing positions that counts as stuck
    pub stuck_window: usize,
    /// Length of the recent-position history
    pub history_len: usize,
    pub rewards: RewardConfig,
}

impl Default for TrainerParams {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            gamma: 0.9,
            epsilon: 0.5,
            min_epsilon: 0.0,
            max_steps: 1000,
            episodes_between_saves: 100,
            stuck_decay: 0.99,
            episode_decay: 1.0,
            blocked_penalty: -10_000.0,
            max_move_attempts: 3,
            stuck_window: 3,
            history_len: 10,
            rewards: RewardConfig::default(),
        }
    }
}

impl TrainerParams {
    pub fn new(alpha: f64, gamma: f64, epsilon: f64) -> Self {
        Self {
            alpha,
            gamma,
            epsilon,
            ..Self::default()
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_episodes_between_saves(mut self, episodes: usize) -> Self {
        self.episodes_between_saves = episodes;
        self
    }

    pub fn with_rewards(mut self, rewards: RewardConfig) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Multiply ε by `factor`, never going below `min_epsilon`.
    pub fn decay_epsilon(&mut self, factor: f64) {
        self.epsilon = (self.epsilon * factor).max(self.min_epsilon.min(self.epsilon));
    }

    /// Bellman blend `(1-α)·Q(s,a) + α·(r + γ·maxQ(s'))`
    pub fn blend(&self, current: f64, reward: f64, best_next: f64) -> f64 {
        (1.0 - self.alpha) * current + self.alpha * (reward + self.gamma * best_next)
    }

    /// Reject any parameter outside its domain.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(Error::config(format!(
                "alpha must be in (0, 1], got {}",
                self.alpha
            )));
        }
        unit_interval("gamma", self.gamma)?;
        unit_interval("epsilon", self.epsilon)?;
        unit_interval("min_epsilon", self.min_epsilon)?;
        if self.max_steps == 0 {
            return Err(Error::config("max_steps must be positive"));
        }
        if self.episodes_between_saves == 0 {
            return Err(Error::config("episodes_between_saves must be positive"));
        }
        decay_factor("stuck_decay", self.stuck_decay)?;
        decay_factor("episode_decay", self.episode_decay)?;
        if !self.blocked_penalty.is_finite() {
            return Err(Error::config("blocked_penalty must be finite"));
        }
        if self.max_move_attempts == 0 {
            return Err(Error::config("max_move_attempts must be positive"));
        }
        if self.stuck_window < 2 || self.stuck_window > self.history_len {
            return Err(Error::config(format!(
                "stuck_window must be in 2..={}, got {}",
                self.history_len, self.stuck_window
            )));
        }
        self.rewards.validate()
    }
}

fn unit_interval(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::config(format!("{name} must be in [0, 1], got {value}")))
    }
}

fn decay_factor(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(Error::config(format!("{name} must be in (0, 1], got {value}")))
    }
}
