//! Observer port - episode lifecycle notifications
//!
//! The training loop fires these hooks synchronously inside the step that
//! crosses an episode boundary. They carry no payload of their own: the
//! observer reads counters and returns from the [`EpisodeState`] it is
//! handed.

use std::sync::{Arc, Mutex, PoisonError};

use crate::{Result, q_learning::EpisodeState};

/// Observer trait for monitoring training episodes
///
/// # Event Sequence
///
/// 1. `on_episode_started` - when training starts and after every reset
/// 2. `on_episode_finished` - when a terminal condition is met, before the
///    episode bookkeeping is reset, so `episode.episode_return()` is still
///    the return of the finished episode
///
/// # Examples
///
/// ```no_run
/// use evader::{ports::EpisodeObserver, q_learning::EpisodeState};
///
/// struct Counter {
///     finished: usize,
/// }
///
/// impl EpisodeObserver for Counter {
///     fn on_episode_finished(&mut self, _episode: &EpisodeState) -> evader::Result<()> {
///         self.finished += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait EpisodeObserver: Send {
    /// Called when an episode starts.
    ///
    /// # Default Implementation
    ///
    /// Does nothing.
    fn on_episode_started(&mut self, _episode: &EpisodeState) -> Result<()> {
        Ok(())
    }

    /// Called when an episode reaches a terminal condition.
    ///
    /// # Default Implementation
    ///
    /// Does nothing.
    fn on_episode_finished(&mut self, _episode: &EpisodeState) -> Result<()> {
        Ok(())
    }
}

/// Shared observers let the caller keep a handle and read it after training.
impl<T: EpisodeObserver> EpisodeObserver for Arc<Mutex<T>> {
    fn on_episode_started(&mut self, episode: &EpisodeState) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_episode_started(episode)
    }

    fn on_episode_finished(&mut self, episode: &EpisodeState) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_episode_finished(episode)
    }
}
