//! Training and evaluation pipeline abstractions
//!
//! This module provides:
//! - Episode-count driven training runs with a JSON summary
//! - Evaluation of a trained table with the greedy policy
//! - Observers recording episode outcomes during training

pub mod evaluation;
pub mod observers;
pub mod training;

pub use evaluation::{EvaluationConfig, EvaluationSummary, evaluate};
pub use observers::{LoggingObserver, MetricsObserver, MetricsSummary, ProgressObserver};
pub use training::{TrainingConfig, TrainingPipeline, TrainingSummary};

pub use crate::ports::EpisodeObserver;
