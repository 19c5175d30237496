//! CLI infrastructure for the evader toolkit
//!
//! This module provides the command-line interface for training and
//! evaluating the Q-learning evader.

pub mod commands;
pub mod config;
pub mod output;
