//! Common test fixtures for the evader test suite.
//!
//! The mock world implements the `World` port directly, so these fixtures
//! do not depend on the grid adapter.

#![allow(dead_code)]

use std::{
    collections::{HashSet, VecDeque},
    sync::{Arc, Mutex},
};

use evader::{
    Error, Result,
    ports::{EpisodeObserver, Navigator, World},
    q_learning::{EpisodeEnd, EpisodeState},
    types::Cell,
};
use rand::{Rng, RngCore};

/// Grid world defined by a set of wall cells.
#[derive(Debug, Clone)]
pub struct MockWorld {
    pub width: i32,
    pub height: i32,
    pub walls: HashSet<Cell>,
}

impl MockWorld {
    pub fn open(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            walls: HashSet::new(),
        }
    }

    /// Build from text rows, top row first (`#` wall, anything else floor).
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |row| row.len() as i32);
        let mut walls = HashSet::new();
        for (row_idx, row) in rows.iter().enumerate() {
            let y = height - 1 - row_idx as i32;
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    walls.insert(Cell::new(x as i32, y));
                }
            }
        }
        Self {
            width,
            height,
            walls,
        }
    }

    pub fn open_cells(&self) -> Vec<Cell> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Cell::new(x, y)))
            .filter(|cell| !self.walls.contains(cell))
            .collect()
    }
}

impl World for MockWorld {
    fn bounds(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn is_walkable(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && !self.walls.contains(&cell)
    }

    fn random_walkable_cell(&self, rng: &mut dyn RngCore) -> Option<Cell> {
        let cells = self.open_cells();
        if cells.is_empty() {
            return None;
        }
        Some(cells[rng.random_range(0..cells.len())])
    }
}

/// Navigator replaying scripted answers, then repeating a default.
#[derive(Debug, Clone)]
pub struct StaticNavigator {
    script: VecDeque<Option<Cell>>,
    /// Answer once the script is exhausted; `None` keeps the pursuer in place
    pub then: Option<Option<Cell>>,
}

impl StaticNavigator {
    /// Pursuer never moves.
    pub fn standing() -> Self {
        Self {
            script: VecDeque::new(),
            then: None,
        }
    }

    pub fn scripted(script: impl IntoIterator<Item = Option<Cell>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            then: None,
        }
    }

    /// Pursuer always disappears.
    pub fn lost() -> Self {
        Self {
            script: VecDeque::new(),
            then: Some(None),
        }
    }
}

impl Navigator for StaticNavigator {
    fn next_step(&mut self, _world: &dyn World, pursuer: Cell, _target: Cell) -> Option<Cell> {
        if let Some(answer) = self.script.pop_front() {
            return answer;
        }
        self.then.unwrap_or(Some(pursuer))
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Started {
        index: usize,
        learner: Cell,
        pursuer: Cell,
    },
    Finished {
        index: usize,
        steps: usize,
        episode_return: f64,
        end: Option<EpisodeEnd>,
    },
}

/// Observer recording every lifecycle event.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub events: Vec<Event>,
}

impl RecordingObserver {
    pub fn shared() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::default()))
    }

    pub fn finished(&self) -> Vec<Event> {
        self.events
            .iter()
            .copied()
            .filter(|event| matches!(event, Event::Finished { .. }))
            .collect()
    }
}

impl EpisodeObserver for RecordingObserver {
    fn on_episode_started(&mut self, episode: &EpisodeState) -> Result<()> {
        self.events.push(Event::Started {
            index: episode.index(),
            learner: episode.learner(),
            pursuer: episode.pursuer(),
        });
        Ok(())
    }

    fn on_episode_finished(&mut self, episode: &EpisodeState) -> Result<()> {
        self.events.push(Event::Finished {
            index: episode.index(),
            steps: episode.step(),
            episode_return: episode.episode_return(),
            end: episode.last_end(),
        });
        Ok(())
    }
}

/// Observer whose first `failures` finish notifications return an error.
#[derive(Debug)]
pub struct FailingObserver {
    pub failures: usize,
}

impl EpisodeObserver for FailingObserver {
    fn on_episode_finished(&mut self, _episode: &EpisodeState) -> Result<()> {
        if self.failures == 0 {
            return Ok(());
        }
        self.failures -= 1;
        Err(Error::InvalidConfiguration {
            message: "observer unavailable".to_string(),
        })
    }
}
