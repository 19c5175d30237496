//! Evaluation of a trained table with the greedy policy

use std::{fs::File, path::Path};

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::{Navigator, World},
    q_learning::{EpisodeEnd, GreedyPolicy, trainer::random_placement},
};

/// Evaluation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub episodes: usize,
    /// Steps after which the evader counts as escaped
    pub max_steps: usize,
    /// Seed for start placement
    pub seed: Option<u64>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            episodes: 100,
            max_steps: 1000,
            seed: None,
        }
    }
}

/// Outcome tallies of an evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub navigator: String,
    pub episodes: usize,
    pub captures: usize,
    pub escapes: usize,
    pub pursuer_lost: usize,
    /// Mean number of steps survived per episode
    pub mean_survival_steps: f64,
    /// Moves taken by the random fallback instead of the ranked actions
    pub fallback_moves: usize,
}

impl EvaluationSummary {
    pub fn escape_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.escapes as f64 / self.episodes as f64
        }
    }

    /// Save summary to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create evaluation {}", path.display()),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

/// Play `config.episodes` episodes with `policy` against `navigator`.
///
/// Episodes end the same way training episodes do: capture, a lost
/// pursuer, or `config.max_steps` steps survived (an escape). The policy's
/// table is never written.
pub fn evaluate<W: World, N: Navigator>(
    policy: &mut GreedyPolicy,
    world: &W,
    navigator: &mut N,
    config: &EvaluationConfig,
) -> Result<EvaluationSummary> {
    if config.max_steps == 0 {
        return Err(Error::config("evaluation max_steps must be positive"));
    }
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let mut summary = EvaluationSummary {
        navigator: navigator.name().to_string(),
        episodes: 0,
        captures: 0,
        escapes: 0,
        pursuer_lost: 0,
        mean_survival_steps: 0.0,
        fallback_moves: 0,
    };
    let mut survived = 0usize;

    for episode in 0..config.episodes {
        let (mut learner, mut pursuer) = random_placement(world, &mut rng)?;
        let mut steps = 0;
        let end = loop {
            let decision = policy.next_step(world, learner, pursuer);
            if decision.fallback {
                summary.fallback_moves += 1;
            }
            learner = decision.destination;
            steps += 1;

            match navigator.next_step(world, pursuer, learner) {
                None => break EpisodeEnd::PursuerLost,
                Some(cell) if cell == learner => break EpisodeEnd::Captured,
                Some(cell) => pursuer = cell,
            }
            if steps >= config.max_steps {
                break EpisodeEnd::StepLimit;
            }
        };

        log::debug!("Evaluation episode {} ended ({end:?}) after {steps} steps", episode + 1);
        match end {
            EpisodeEnd::Captured => summary.captures += 1,
            EpisodeEnd::StepLimit => summary.escapes += 1,
            EpisodeEnd::PursuerLost => summary.pursuer_lost += 1,
        }
        summary.episodes += 1;
        survived += steps;
    }

    if summary.episodes > 0 {
        summary.mean_survival_steps = survived as f64 / summary.episodes as f64;
    }
    Ok(summary)
}
