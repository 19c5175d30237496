//! Evader CLI - train and evaluate a tabular Q-learning evader
//!
//! This CLI provides a unified interface for:
//! - Training the evader against a shortest-path pursuer
//! - Evaluating a trained Q-table greedily
//!
//! Set `RUST_LOG` (e.g. `RUST_LOG=evader=debug`) for library logs.

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "evader")]
#[command(version, about = "Tabular Q-learning evader on a grid world", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the evader and persist its Q-table
    Train(Box<evader::cli::commands::train::TrainArgs>),

    /// Evaluate a trained Q-table
    Evaluate(evader::cli::commands::evaluate::EvaluateArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => evader::cli::commands::train::execute(*args),
        Commands::Evaluate(args) => evader::cli::commands::evaluate::execute(args),
    }
}
