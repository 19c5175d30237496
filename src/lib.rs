//! Tabular Q-learning evader
//!
//! This crate provides:
//! - A closed-form encoding of the evader's view into 144 discrete states
//! - A dense 4 x 144 Q-table with `;`-delimited text persistence
//! - A step-driven ε-greedy trainer with shaped rewards
//! - A greedy inference policy and evaluation pipeline
//! - Grid world and BFS pursuer adapters plus a CLI

pub mod adapters;
pub mod cli;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod types;

pub use error::{Error, Result};
pub use q_learning::{GreedyPolicy, QTable, StateEncoder, StateId, Trainer, TrainerParams};
pub use types::{Action, Cell};
