//! Train command - Train the evader against the BFS pursuer

use std::{
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    adapters::{BfsChaser, TextFileRepository},
    cli::{
        config::{ParamOverrides, load_params, load_world},
        output::{format_number, format_rate, print_section, print_stats_table},
    },
    pipeline::{LoggingObserver, ProgressObserver, TrainingConfig, TrainingPipeline},
    ports::LoadStatus,
    q_learning::Trainer,
};

/// Episodes between progress log lines when no progress bar is shown
const LOG_EVERY: usize = 100;

#[derive(Parser, Debug)]
#[command(about = "Train the evader", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// Map file (`#` wall, `.` floor); defaults to an open 20x20 arena
    #[arg(long, short = 'm')]
    pub map: Option<PathBuf>,

    /// Q-table file, loaded at start and saved during training
    #[arg(long, short = 't', default_value = "q_table.csv")]
    pub table: PathBuf,

    /// Number of training episodes
    #[arg(long, short = 'e', default_value_t = 500)]
    pub episodes: usize,

    /// JSON file with training parameters
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub params: ParamOverrides,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Ignore any stored table and start from zeros
    #[arg(long, default_value_t = false)]
    pub fresh: bool,

    /// Show progress bar
    #[arg(long, default_value_t = false)]
    pub progress: bool,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let params = load_params(args.config.as_deref(), &args.params)?;
    let world = load_world(args.map.as_deref())?;

    let mut trainer = Trainer::new(params, world, BfsChaser::new())?
        .with_repository(Box::new(TextFileRepository::new(&args.table)));
    if let Some(seed) = args.seed {
        trainer = trainer.with_seed(seed);
    }

    if args.fresh {
        log::info!("Starting from a zero table");
    } else {
        let status = trainer
            .load_table()
            .with_context(|| format!("Failed to load Q-table {}", args.table.display()))?;
        if let LoadStatus::Loaded { cells, .. } = status {
            println!("Loaded {} values from {}", format_number(cells), args.table.display());
        }
    }

    let progress = if args.progress {
        let observer = Arc::new(Mutex::new(ProgressObserver::new(args.episodes)?));
        trainer.add_observer(Box::new(observer.clone()));
        Some(observer)
    } else {
        trainer.add_observer(Box::new(LoggingObserver::new(LOG_EVERY)));
        None
    };

    let pipeline = TrainingPipeline::new(TrainingConfig {
        episodes: args.episodes,
        save_on_finish: true,
    });
    let summary = pipeline
        .run(&mut trainer)
        .context("Training failed")?;

    if let Some(progress) = progress {
        progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .finish();
    }

    print_section("Training Summary");
    print_stats_table(&[
        ("Episodes", format_number(summary.episodes)),
        ("Steps", format_number(summary.steps)),
        ("Captured", format_rate(summary.captures, summary.episodes)),
        ("Escaped", format_rate(summary.escapes, summary.episodes)),
        ("Pursuer lost", format_rate(summary.pursuer_lost, summary.episodes)),
        ("Average return", format!("{:.2}", summary.average_return)),
        ("Best return", format!("{:.2}", summary.best_return)),
        ("Worst return", format!("{:.2}", summary.worst_return)),
        ("Average length", format!("{:.1}", summary.average_length)),
        ("Final epsilon", format!("{:.4}", summary.final_epsilon)),
        ("Visited cells", format_number(summary.visited_cells)),
    ]);
    println!("\nQ-table saved to {}", args.table.display());

    if let Some(path) = &args.summary {
        summary
            .save(path)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
        println!("Summary written to {}", path.display());
    }

    Ok(())
}
