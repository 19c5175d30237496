//! Episode observers for training runs
//!
//! Observers allow composable data collection during training without coupling
//! the trainer to specific output formats.

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::EpisodeObserver,
    q_learning::{EpisodeEnd, EpisodeState},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Tally {
    captures: usize,
    escapes: usize,
    pursuer_lost: usize,
}

impl Tally {
    fn record(&mut self, end: Option<EpisodeEnd>) {
        match end {
            Some(EpisodeEnd::Captured) => self.captures += 1,
            Some(EpisodeEnd::StepLimit) => self.escapes += 1,
            Some(EpisodeEnd::PursuerLost) => self.pursuer_lost += 1,
            None => {}
        }
    }
}

/// Progress bar observer - Shows training progress over episodes
pub struct ProgressObserver {
    progress_bar: ProgressBar,
    tally: Tally,
}

impl ProgressObserver {
    /// # Errors
    ///
    /// Returns [`Error::ProgressBarTemplate`] if the bar style is rejected.
    pub fn new(total_episodes: usize) -> Result<Self> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        Ok(Self {
            progress_bar: pb,
            tally: Tally::default(),
        })
    }

    pub fn finish(&self) {
        self.progress_bar.finish_with_message(self.message());
    }

    fn message(&self) -> String {
        format!(
            "caught:{} escaped:{} lost:{}",
            self.tally.captures, self.tally.escapes, self.tally.pursuer_lost
        )
    }
}

impl EpisodeObserver for ProgressObserver {
    fn on_episode_finished(&mut self, episode: &EpisodeState) -> Result<()> {
        self.tally.record(episode.last_end());
        self.progress_bar.inc(1);
        self.progress_bar.set_message(self.message());
        Ok(())
    }
}

/// Metrics observer - Tracks outcome and return statistics
#[derive(Debug, Clone, Default)]
pub struct MetricsObserver {
    tally: Tally,
    returns: Vec<f64>,
    lengths: Vec<usize>,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn episodes(&self) -> usize {
        self.returns.len()
    }

    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    pub fn capture_rate(&self) -> f64 {
        if self.returns.is_empty() {
            0.0
        } else {
            self.tally.captures as f64 / self.returns.len() as f64
        }
    }

    pub fn average_return(&self) -> f64 {
        if self.returns.is_empty() {
            0.0
        } else {
            self.returns.iter().sum::<f64>() / self.returns.len() as f64
        }
    }

    pub fn average_length(&self) -> f64 {
        if self.lengths.is_empty() {
            0.0
        } else {
            self.lengths.iter().sum::<usize>() as f64 / self.lengths.len() as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            episodes: self.episodes(),
            captures: self.tally.captures,
            escapes: self.tally.escapes,
            pursuer_lost: self.tally.pursuer_lost,
            capture_rate: self.capture_rate(),
            average_return: self.average_return(),
            best_return: self.returns.iter().copied().reduce(f64::max),
            worst_return: self.returns.iter().copied().reduce(f64::min),
            average_length: self.average_length(),
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub captures: usize,
    pub escapes: usize,
    pub pursuer_lost: usize,
    pub capture_rate: f64,
    pub average_return: f64,
    pub best_return: Option<f64>,
    pub worst_return: Option<f64>,
    pub average_length: f64,
}

impl EpisodeObserver for MetricsObserver {
    fn on_episode_finished(&mut self, episode: &EpisodeState) -> Result<()> {
        self.tally.record(episode.last_end());
        self.returns.push(episode.episode_return());
        self.lengths.push(episode.step());
        Ok(())
    }
}

/// Logs a line every `every` finished episodes
#[derive(Debug, Clone)]
pub struct LoggingObserver {
    every: usize,
}

impl LoggingObserver {
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl EpisodeObserver for LoggingObserver {
    fn on_episode_finished(&mut self, episode: &EpisodeState) -> Result<()> {
        let number = episode.index() + 1;
        if number.is_multiple_of(self.every) {
            log::info!(
                "Episode {number}: {:?} after {} steps, return {:.1}, running average {:.1}",
                episode.last_end(),
                episode.step(),
                episode.episode_return(),
                episode.average_return()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{
        adapters::{BfsChaser, GridWorld},
        q_learning::{Trainer, TrainerParams},
    };

    #[test]
    fn test_metrics_observer() {
        let metrics = Arc::new(Mutex::new(MetricsObserver::new()));
        let params = TrainerParams::default().with_max_steps(20);
        let mut trainer = Trainer::new(params, GridWorld::open(5, 5), BfsChaser::new())
            .unwrap()
            .with_seed(11)
            .with_observer(Box::new(metrics.clone()));

        while trainer.episode().index() < 5 {
            trainer.step().unwrap();
        }

        let summary = metrics.lock().unwrap().summary();
        assert_eq!(summary.episodes, 5);
        assert_eq!(summary.captures + summary.escapes + summary.pursuer_lost, 5);
        assert!(summary.average_length >= 1.0 && summary.average_length <= 20.0);
        assert_eq!(
            metrics.lock().unwrap().returns(),
            trainer.episode().returns()
        );
    }

    #[test]
    fn test_empty_metrics() {
        let summary = MetricsObserver::new().summary();
        assert_eq!(summary.episodes, 0);
        assert_eq!(summary.capture_rate, 0.0);
        assert!(summary.best_return.is_none());
    }

    #[test]
    fn test_progress_observer_builds() {
        let observer = ProgressObserver::new(10).unwrap();
        observer.finish();
    }
}
