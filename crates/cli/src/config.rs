use anyhow::{Context, Result};
use planner_graph::EffortRules;
use planner_recommend::NbaWeights;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "FEATURE_PLANNER_CONFIG";

/// Tunables for the planner, read from an optional TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// Effort estimator signal tables
    pub effort: EffortRules,

    /// Next-best-action component weights
    pub recommend: NbaWeights,
}

impl PlannerConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input).context("Invalid planner config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let input = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml_str(&input).with_context(|| format!("Config {}", path.display()))
    }

    /// Load from `--config`, then the environment, else defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));

        match path {
            Some(path) => {
                log::debug!("Loading planner config from {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.effort.validate().context("[effort]")?;
        self.recommend.validate().context("[recommend]")?;
        Ok(())
    }
}
