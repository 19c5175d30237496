//! Shared configuration types for CLI commands

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use clap::Args;

use crate::{adapters::GridWorld, q_learning::TrainerParams};

/// Side length of the arena used when no map file is given
pub const DEFAULT_ARENA: i32 = 20;

/// Flags overriding individual [`TrainerParams`] fields
#[derive(Args, Debug, Clone, Default)]
pub struct ParamOverrides {
    /// Learning rate in [0, 1]
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Discount factor in [0, 1]
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Initial exploration rate in [0, 1]
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Step limit per episode
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Episodes between periodic table saves
    #[arg(long = "save-every")]
    pub save_every: Option<usize>,
}

impl ParamOverrides {
    pub fn apply(&self, mut params: TrainerParams) -> TrainerParams {
        if let Some(alpha) = self.alpha {
            params = params.with_alpha(alpha);
        }
        if let Some(gamma) = self.gamma {
            params = params.with_gamma(gamma);
        }
        if let Some(epsilon) = self.epsilon {
            params = params.with_epsilon(epsilon);
        }
        if let Some(max_steps) = self.max_steps {
            params = params.with_max_steps(max_steps);
        }
        if let Some(episodes) = self.save_every {
            params = params.with_episodes_between_saves(episodes);
        }
        params
    }
}

/// Read params from an optional JSON file, apply flag overrides and validate.
pub fn load_params(path: Option<&Path>, overrides: &ParamOverrides) -> Result<TrainerParams> {
    let base = match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config {}", path.display()))?;
            serde_json::from_reader(file)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => TrainerParams::default(),
    };
    let params = overrides.apply(base);
    params.validate().context("Invalid training parameters")?;
    Ok(params)
}

/// Load the map file, or the default open arena.
pub fn load_world(path: Option<&Path>) -> Result<GridWorld> {
    match path {
        Some(path) => GridWorld::from_file(path)
            .with_context(|| format!("Failed to load map {}", path.display())),
        None => Ok(GridWorld::open(DEFAULT_ARENA, DEFAULT_ARENA)),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_overrides_win_over_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"alpha": 0.2, "max_steps": 50}}"#).unwrap();

        let overrides = ParamOverrides {
            alpha: Some(0.7),
            ..Default::default()
        };
        let params = load_params(Some(file.path()), &overrides).unwrap();
        assert_eq!(params.alpha, 0.7);
        assert_eq!(params.max_steps, 50);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let overrides = ParamOverrides {
            gamma: Some(1.5),
            ..Default::default()
        };
        assert!(load_params(None, &overrides).is_err());
    }

    #[test]
    fn test_default_world() {
        use crate::ports::World;
        assert_eq!(load_world(None).unwrap().bounds(), (20, 20));
    }
}
