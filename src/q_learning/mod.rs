//! Tabular Q-learning for the evading agent
//!
//! The state space is a fixed enumeration of 144 discretised observations
//! and four cardinal actions, so the value function is a dense 4 x 144
//! matrix addressed in closed form.
//!
//! ## Components
//!
//! | Module | Role |
//! |--------|------|
//! | [`state`] | Observation and closed-form [`StateId`] encoding |
//! | [`q_table`] | Dense value matrix with greedy queries |
//! | [`reward`] | Distance, line-of-sight and corner reward shaping |
//! | [`trainer`] | ε-greedy step loop, Bellman update, episode lifecycle |
//! | [`policy`] | Inference-only greedy policy |
//! | [`serialization`] | `;`-delimited text format of the table |
//!
//! ## Usage Example
//!
//! ```no_run
//! use evader::{
//!     adapters::{BfsChaser, GridWorld, TextFileRepository},
//!     q_learning::{Trainer, TrainerParams},
//! };
//!
//! let params = TrainerParams::new(
//!     0.5, // alpha
//!     0.9, // gamma
//!     0.3, // epsilon
//! );
//! let mut trainer = Trainer::new(params, GridWorld::open(20, 20), BfsChaser::new())?
//!     .with_repository(Box::new(TextFileRepository::new("q_table.csv")))
//!     .with_seed(42);
//! trainer.load_table()?;
//! while trainer.episode().index() < 500 {
//!     trainer.step()?;
//! }
//! # Ok::<(), evader::Error>(())
//! ```

pub mod params;
pub mod policy;
pub mod q_table;
pub mod reward;
pub mod serialization;
pub mod state;
pub mod trainer;

// Public re-exports
pub use params::TrainerParams;
pub use policy::{GreedyPolicy, PolicyStep};
pub use q_table::{QTable, TableStatus};
pub use reward::RewardConfig;
pub use state::{Horizontal, Observation, StateEncoder, StateId, Vertical};
pub use trainer::{ActionSource, EpisodeEnd, EpisodeState, StepReport, Trainer};
