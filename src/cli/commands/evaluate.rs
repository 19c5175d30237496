//! Evaluate command - Play a trained table greedily against the pursuer

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::{
    adapters::{BfsChaser, TextFileRepository},
    cli::{
        config::load_world,
        output::{format_number, format_rate, print_section, print_stats_table},
    },
    pipeline::{EvaluationConfig, evaluate},
    ports::{LoadStatus, TableRepository},
    q_learning::{GreedyPolicy, QTable},
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained Q-table")]
pub struct EvaluateArgs {
    /// Map file; defaults to an open 20x20 arena
    #[arg(long, short = 'm')]
    pub map: Option<PathBuf>,

    /// Q-table file to evaluate
    #[arg(long, short = 't', default_value = "q_table.csv")]
    pub table: PathBuf,

    /// Number of evaluation episodes
    #[arg(long, short = 'e', default_value_t = 100)]
    pub episodes: usize,

    /// Steps survived that count as an escape
    #[arg(long, default_value_t = 1000)]
    pub max_steps: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Export results to a JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let world = load_world(args.map.as_deref())?;

    let mut table = QTable::new();
    let status = TextFileRepository::new(&args.table)
        .load(&mut table)
        .with_context(|| format!("Failed to load Q-table {}", args.table.display()))?;
    if status == LoadStatus::Missing {
        bail!("Q-table {} does not exist", args.table.display());
    }

    let mut policy = GreedyPolicy::new(table)?;
    if let Some(seed) = args.seed {
        policy = policy.with_seed(seed.wrapping_add(1));
    }
    let config = EvaluationConfig {
        episodes: args.episodes,
        max_steps: args.max_steps,
        seed: args.seed,
    };
    let summary = evaluate(&mut policy, &world, &mut BfsChaser::new(), &config)
        .context("Evaluation failed")?;

    print_section("Evaluation Results");
    print_stats_table(&[
        ("Pursuer", summary.navigator.clone()),
        ("Episodes", format_number(summary.episodes)),
        ("Captured", format_rate(summary.captures, summary.episodes)),
        ("Escaped", format_rate(summary.escapes, summary.episodes)),
        ("Pursuer lost", format_rate(summary.pursuer_lost, summary.episodes)),
        ("Mean survival", format!("{:.1} steps", summary.mean_survival_steps)),
        ("Fallback moves", format_number(summary.fallback_moves)),
    ]);

    if let Some(path) = &args.export {
        summary
            .save(path)
            .with_context(|| format!("Failed to write results {}", path.display()))?;
        println!("\nResults exported to {}", path.display());
    }

    Ok(())
}
