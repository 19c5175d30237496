//! Step-driven Q-learning trainer for the evader
//!
//! The trainer performs exactly one decision per [`Trainer::step`] call:
//! encode the state, pick an action, resolve it against the world, shape a
//! reward, apply the Bellman update and advance both agents. Episode
//! boundaries (capture, lost pursuer, step limit) are handled inside the
//! step that reaches them.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::{
    params::TrainerParams,
    q_table::{QTable, TableStatus},
    state::{StateEncoder, StateId},
};
use crate::{
    Error, Result,
    ports::{EpisodeObserver, LoadStatus, Navigator, TableRepository, World},
    types::{Action, Cell},
};

/// Attempts at drawing a pursuer start cell distinct from the learner's
const PLACEMENT_ATTEMPTS: usize = 8;

/// Why an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeEnd {
    /// Pursuer and learner share a cell
    Captured,
    /// The navigator could not place the pursuer
    PursuerLost,
    /// `max_steps` reached
    StepLimit,
}

/// How the executed action was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSource {
    /// Only one open direction that does not step onto the pursuer
    Forced,
    /// ε-greedy exploration draw
    Explore,
    /// Random move because the learner is stuck
    Stuck,
    /// Highest Q-value
    Greedy,
    /// Random walkable move after the attempt budget ran out
    Fallback,
}

/// Everything that happened during one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub state: StateId,
    pub next_state: StateId,
    pub action: Action,
    pub source: ActionSource,
    pub from: Cell,
    pub to: Cell,
    pub pursuer_before: Cell,
    pub pursuer_after: Option<Cell>,
    pub reward: f64,
    /// Selections rejected because they led into a blocked cell
    pub blocked_attempts: usize,
    pub outcome: Option<EpisodeEnd>,
}

/// Episode bookkeeping owned by the trainer
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeState {
    index: usize,
    step: usize,
    total_steps: usize,
    episode_return: f64,
    learner: Cell,
    pursuer: Cell,
    recent: VecDeque<Cell>,
    history_len: usize,
    returns: Vec<f64>,
    average_return: f64,
    last_end: Option<EpisodeEnd>,
}

impl EpisodeState {
    fn new(history_len: usize) -> Self {
        Self {
            index: 0,
            step: 0,
            total_steps: 0,
            episode_return: 0.0,
            learner: Cell::default(),
            pursuer: Cell::default(),
            recent: VecDeque::with_capacity(history_len),
            history_len,
            returns: Vec::new(),
            average_return: 0.0,
            last_end: None,
        }
    }

    /// Number of completed episodes
    pub fn index(&self) -> usize {
        self.index
    }

    /// Steps taken in the current episode
    pub fn step(&self) -> usize {
        self.step
    }

    /// Steps taken since training started
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Accumulated reward of the current episode
    pub fn episode_return(&self) -> f64 {
        self.episode_return
    }

    pub fn learner(&self) -> Cell {
        self.learner
    }

    pub fn pursuer(&self) -> Cell {
        self.pursuer
    }

    /// Most recent learner positions, oldest first
    pub fn recent_positions(&self) -> &VecDeque<Cell> {
        &self.recent
    }

    /// Returns of all completed episodes
    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    /// Mean of [`EpisodeState::returns`]
    pub fn average_return(&self) -> f64 {
        self.average_return
    }

    pub fn last_end(&self) -> Option<EpisodeEnd> {
        self.last_end
    }

    fn record_position(&mut self, cell: Cell) {
        if self.recent.len() == self.history_len {
            self.recent.pop_front();
        }
        self.recent.push_back(cell);
    }

    /// The last `window` recorded positions are all the same cell
    fn is_stuck(&self, window: usize) -> bool {
        if self.recent.len() < window {
            return false;
        }
        let mut tail = self.recent.iter().rev().take(window);
        match tail.next() {
            Some(first) => tail.all(|cell| cell == first),
            None => false,
        }
    }

    fn close(&mut self, end: EpisodeEnd) {
        self.last_end = Some(end);
        self.returns.push(self.episode_return);
        self.average_return = self.returns.iter().sum::<f64>() / self.returns.len() as f64;
        self.episode_return = 0.0;
        self.recent.clear();
        self.step = 0;
        self.index += 1;
    }
}

/// Chosen move after blocked-cell handling
struct ResolvedMove {
    action: Action,
    source: ActionSource,
    destination: Cell,
    blocked_attempts: usize,
}

/// Q-learning trainer for the evading agent
///
/// # Examples
///
/// ```no_run
/// use evader::{
///     adapters::{BfsChaser, GridWorld},
///     q_learning::{Trainer, TrainerParams},
/// };
///
/// let mut trainer = Trainer::new(TrainerParams::default(), GridWorld::open(20, 20), BfsChaser::new())?
///     .with_seed(7);
/// for _ in 0..1_000 {
///     trainer.step()?;
/// }
/// println!("average return {:.1}", trainer.episode().average_return());
/// # Ok::<(), evader::Error>(())
/// ```
pub struct Trainer<W, N> {
    params: TrainerParams,
    world: W,
    navigator: N,
    table: QTable,
    rng: StdRng,
    episode: EpisodeState,
    observers: Vec<Box<dyn EpisodeObserver>>,
    repository: Option<Box<dyn TableRepository>>,
    started: bool,
}

impl<W: World, N: Navigator> Trainer<W, N> {
    /// Create a trainer with a zero table and an entropy-seeded rng.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `params` fail validation.
    pub fn new(params: TrainerParams, world: W, navigator: N) -> Result<Self> {
        params.validate()?;
        let history_len = params.history_len;
        Ok(Self {
            params,
            world,
            navigator,
            table: QTable::new(),
            rng: StdRng::from_rng(&mut rand::rng()),
            episode: EpisodeState::new(history_len),
            observers: Vec::new(),
            repository: None,
            started: false,
        })
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Replace the table, e.g. with one loaded earlier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTable`] if the table was flagged by a failed load.
    pub fn with_table(mut self, table: QTable) -> Result<Self> {
        ensure_valid(&table)?;
        self.table = table;
        Ok(self)
    }

    pub fn with_repository(mut self, repository: Box<dyn TableRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn EpisodeObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn EpisodeObserver>) {
        self.observers.push(observer);
    }

    pub fn params(&self) -> &TrainerParams {
        &self.params
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn into_table(self) -> QTable {
        self.table
    }

    pub fn episode(&self) -> &EpisodeState {
        &self.episode
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Load the table from the configured repository.
    ///
    /// A missing file keeps the current values. A malformed file is fatal
    /// and leaves the table flagged invalid, which blocks further steps.
    pub fn load_table(&mut self) -> Result<LoadStatus> {
        let Some(repository) = &self.repository else {
            return Ok(LoadStatus::Missing);
        };
        let status = repository.load(&mut self.table)?;
        match status {
            LoadStatus::Loaded { rows, cells } => {
                log::info!("Loaded Q-table: {rows} rows, {cells} values");
            }
            LoadStatus::Missing => {
                log::warn!("No stored Q-table, training from scratch");
            }
        }
        Ok(status)
    }

    /// Persist the table to the configured repository, if any.
    pub fn save_table(&self) -> Result<()> {
        if let Some(repository) = &self.repository {
            repository.save(&self.table)?;
            log::info!(
                "Saved Q-table after {} episodes ({} non-zero values)",
                self.episode.index,
                self.table.visited()
            );
        }
        Ok(())
    }

    /// Place both agents on random walkable cells and start the first episode.
    pub fn start(&mut self) -> Result<()> {
        let (learner, pursuer) = self.random_placement()?;
        self.begin(learner, pursuer)
    }

    /// Start the first episode with both agents at fixed cells.
    pub fn start_at(&mut self, learner: Cell, pursuer: Cell) -> Result<()> {
        for cell in [learner, pursuer] {
            if !self.world.is_walkable(cell) {
                return Err(Error::UnwalkableCell {
                    x: cell.x,
                    y: cell.y,
                });
            }
        }
        self.begin(learner, pursuer)
    }

    fn begin(&mut self, learner: Cell, pursuer: Cell) -> Result<()> {
        ensure_valid(&self.table)?;
        self.episode.learner = learner;
        self.episode.pursuer = pursuer;
        self.episode.recent.clear();
        self.started = true;
        log::debug!("Training started: learner {learner}, pursuer {pursuer}");
        self.notify_started()
    }

    /// Advance training by one decision.
    ///
    /// # Errors
    ///
    /// Fails if the table is flagged invalid, an observer fails, or the
    /// periodic save fails.
    pub fn step(&mut self) -> Result<StepReport> {
        if !self.is_started() {
            self.start()?;
        }
        ensure_valid(&self.table)?;

        let learner = self.episode.learner;
        let pursuer = self.episode.pursuer;
        let state = StateEncoder::encode(&self.world, learner, pursuer);

        let chosen = self.choose_move(state, learner, pursuer);
        let destination = chosen.destination;
        let reward = self
            .params
            .rewards
            .shape(&self.world, learner, destination, pursuer);

        let next_pursuer = self.navigator.next_step(&self.world, pursuer, destination);
        let next_state =
            StateEncoder::encode(&self.world, destination, next_pursuer.unwrap_or(pursuer));
        let current = self.table.value(chosen.action, state);
        let updated = self
            .params
            .blend(current, reward, self.table.best_value(next_state));
        self.table.update(chosen.action, state, updated);

        self.episode.learner = destination;
        if let Some(cell) = next_pursuer {
            self.episode.pursuer = cell;
        }
        self.episode.episode_return += reward;
        self.episode.record_position(destination);
        self.episode.step += 1;
        self.episode.total_steps += 1;

        log::trace!(
            "step {} {state} {} via {:?}: {learner} -> {destination}, reward {reward}",
            self.episode.step,
            chosen.action,
            chosen.source
        );

        let outcome = match next_pursuer {
            None => Some(EpisodeEnd::PursuerLost),
            Some(cell) if cell == destination => Some(EpisodeEnd::Captured),
            Some(_) if self.episode.step >= self.params.max_steps => Some(EpisodeEnd::StepLimit),
            Some(_) => None,
        };

        if let Some(end) = outcome {
            self.finish_episode(end)?;
        }

        Ok(StepReport {
            state,
            next_state,
            action: chosen.action,
            source: chosen.source,
            from: learner,
            to: destination,
            pursuer_before: pursuer,
            pursuer_after: next_pursuer,
            reward,
            blocked_attempts: chosen.blocked_attempts,
            outcome,
        })
    }

    fn choose_move(&mut self, state: StateId, learner: Cell, pursuer: Cell) -> ResolvedMove {
        let open: Vec<(Action, Cell)> = Action::ALL
            .iter()
            .map(|&action| (action, self.world.resolve_move(learner, action)))
            .filter(|(_, dest)| dest.walkable && dest.cell != pursuer)
            .map(|(action, dest)| (action, dest.cell))
            .collect();
        if let [(action, destination)] = open[..] {
            return ResolvedMove {
                action,
                source: ActionSource::Forced,
                destination,
                blocked_attempts: 0,
            };
        }

        let stuck = self.episode.is_stuck(self.params.stuck_window);
        if stuck {
            self.params.decay_epsilon(self.params.stuck_decay);
            log::debug!(
                "Learner stuck at {learner}, epsilon now {:.4}",
                self.params.epsilon()
            );
        }

        let mut blocked_attempts = 0;
        for _ in 0..self.params.max_move_attempts {
            let (action, source) = self.select_action(state, stuck);
            let dest = self.world.resolve_move(learner, action);
            if dest.walkable {
                return ResolvedMove {
                    action,
                    source,
                    destination: dest.cell,
                    blocked_attempts,
                };
            }
            log::trace!("Blocked move {action} from {learner}, penalising {state}");
            self.table
                .update(action, state, self.params.blocked_penalty);
            blocked_attempts += 1;
        }

        let walkable: Vec<(Action, Cell)> = Action::ALL
            .iter()
            .map(|&action| (action, self.world.resolve_move(learner, action)))
            .filter(|(_, dest)| dest.walkable)
            .map(|(action, dest)| (action, dest.cell))
            .collect();
        let (action, destination) = if walkable.is_empty() {
            (self.random_action(), learner)
        } else {
            walkable[self.rng.random_range(0..walkable.len())]
        };
        ResolvedMove {
            action,
            source: ActionSource::Fallback,
            destination,
            blocked_attempts,
        }
    }

    fn select_action(&mut self, state: StateId, stuck: bool) -> (Action, ActionSource) {
        let draw: f64 = self.rng.random();
        if stuck {
            (self.random_action(), ActionSource::Stuck)
        } else if draw < self.params.epsilon() {
            (self.random_action(), ActionSource::Explore)
        } else {
            (self.table.best_action(state), ActionSource::Greedy)
        }
    }

    fn random_action(&mut self) -> Action {
        Action::ALL[self.rng.random_range(0..Action::COUNT)]
    }

    fn finish_episode(&mut self, end: EpisodeEnd) -> Result<()> {
        self.episode.last_end = Some(end);
        let notified = self
            .observers
            .iter_mut()
            .try_for_each(|observer| observer.on_episode_finished(&self.episode));

        log::debug!(
            "Episode {} ended ({end:?}) after {} steps, return {:.1}",
            self.episode.index + 1,
            self.episode.step,
            self.episode.episode_return
        );

        self.episode.close(end);
        let (learner, pursuer) = self.random_placement()?;
        self.episode.learner = learner;
        self.episode.pursuer = pursuer;

        if self.params.episode_decay < 1.0 {
            self.params.decay_epsilon(self.params.episode_decay);
        }

        if self
            .episode
            .index
            .is_multiple_of(self.params.episodes_between_saves)
        {
            self.save_table()?;
        }

        notified?;
        self.notify_started()
    }

    fn notify_started(&mut self) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_episode_started(&self.episode)?;
        }
        Ok(())
    }

    fn random_placement(&mut self) -> Result<(Cell, Cell)> {
        random_placement(&self.world, &mut self.rng)
    }
}

/// Draw start cells for both agents, re-drawing the pursuer a few times so
/// it does not share the learner's cell.
pub(crate) fn random_placement<W: World + ?Sized>(
    world: &W,
    rng: &mut StdRng,
) -> Result<(Cell, Cell)> {
    let learner = world
        .random_walkable_cell(rng)
        .ok_or(Error::NoWalkableCells)?;
    let mut pursuer = learner;
    for _ in 0..PLACEMENT_ATTEMPTS {
        pursuer = world
            .random_walkable_cell(rng)
            .ok_or(Error::NoWalkableCells)?;
        if pursuer != learner {
            break;
        }
    }
    Ok((learner, pursuer))
}

fn ensure_valid(table: &QTable) -> Result<()> {
    match table.status() {
        TableStatus::Ready => Ok(()),
        TableStatus::Invalid { line, field } => Err(Error::InvalidTable { line, field }),
    }
}
