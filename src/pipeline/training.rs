//! Episode-count driven training runs

use std::{fs::File, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::{Navigator, World},
    q_learning::{EpisodeEnd, Trainer},
};

/// Training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of episodes to complete
    pub episodes: usize,

    /// Persist the table once the run finishes, on top of the periodic saves
    pub save_on_finish: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 500,
            save_on_finish: true,
        }
    }
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub episodes: usize,
    pub steps: usize,
    pub captures: usize,
    /// Episodes that reached the step limit
    pub escapes: usize,
    pub pursuer_lost: usize,
    pub average_return: f64,
    pub best_return: f64,
    pub worst_return: f64,
    pub average_length: f64,
    pub final_epsilon: f64,
    /// Table cells holding a non-zero value after the run
    pub visited_cells: usize,
}

impl TrainingSummary {
    pub fn capture_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.captures as f64 / self.episodes as f64
        }
    }

    /// Save summary to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create summary {}", path.display()),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load summary from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open summary {}", path.display()),
            source,
        })?;
        Ok(serde_json::from_reader(file)?)
    }
}

/// Drives a [`Trainer`] until a number of episodes have completed.
///
/// # Examples
///
/// ```no_run
/// use evader::{
///     adapters::{BfsChaser, GridWorld},
///     pipeline::{TrainingConfig, TrainingPipeline},
///     q_learning::{Trainer, TrainerParams},
/// };
///
/// let mut trainer = Trainer::new(TrainerParams::default(), GridWorld::open(20, 20), BfsChaser::new())?;
/// let summary = TrainingPipeline::new(TrainingConfig {
///     episodes: 200,
///     save_on_finish: false,
/// })
/// .run(&mut trainer)?;
/// println!("captured in {:.0}% of episodes", summary.capture_rate() * 100.0);
/// # Ok::<(), evader::Error>(())
/// ```
pub struct TrainingPipeline {
    config: TrainingConfig,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Step the trainer until `config.episodes` more episodes have ended.
    pub fn run<W: World, N: Navigator>(
        &self,
        trainer: &mut Trainer<W, N>,
    ) -> Result<TrainingSummary> {
        let first_episode = trainer.episode().returns().len();
        let mut captures = 0;
        let mut escapes = 0;
        let mut pursuer_lost = 0;
        let mut steps = 0;
        let mut completed = 0;

        log::info!(
            "Training {} episodes with {} pursuer",
            self.config.episodes,
            trainer.navigator().name()
        );

        while completed < self.config.episodes {
            let report = trainer.step()?;
            steps += 1;
            let Some(end) = report.outcome else {
                continue;
            };
            match end {
                EpisodeEnd::Captured => captures += 1,
                EpisodeEnd::StepLimit => escapes += 1,
                EpisodeEnd::PursuerLost => pursuer_lost += 1,
            }
            completed += 1;
        }

        if self.config.save_on_finish {
            trainer.save_table()?;
        }

        let returns = &trainer.episode().returns()[first_episode..];
        let (best_return, worst_return, average_return) = if returns.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                returns.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                returns.iter().copied().fold(f64::INFINITY, f64::min),
                returns.iter().sum::<f64>() / returns.len() as f64,
            )
        };
        let average_length = if completed == 0 {
            0.0
        } else {
            steps as f64 / completed as f64
        };

        Ok(TrainingSummary {
            episodes: completed,
            steps,
            captures,
            escapes,
            pursuer_lost,
            average_return,
            best_return,
            worst_return,
            average_length,
            final_epsilon: trainer.params().epsilon(),
            visited_cells: trainer.table().visited(),
        })
    }
}
