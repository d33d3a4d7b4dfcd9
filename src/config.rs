use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::ranker::{DEFAULT_PARALLEL_MIN_POOL, SimilarityStrategy};
use crate::weights::{WeightTable, bundled_table};

pub const DEFAULT_TOP_K: usize = 10;
pub const MAX_TOP_K: usize = 500;

/// Runtime knobs read from the environment. CLI flags override these.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoutConfig {
    pub weights_path: Option<PathBuf>,
    pub pool_path: Option<PathBuf>,
    pub strategy: SimilarityStrategy,
    pub top_k: usize,
    pub parallel_min_pool: usize,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            weights_path: None,
            pool_path: None,
            strategy: SimilarityStrategy::default(),
            top_k: DEFAULT_TOP_K,
            parallel_min_pool: DEFAULT_PARALLEL_MIN_POOL,
        }
    }
}

impl ScoutConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };

        let strategy = match lookup("SCOUT_STRATEGY") {
            Some(raw) if !raw.trim().is_empty() => raw.parse().unwrap_or_else(|err| {
                warn!(value = %raw, error = %err, "ignoring SCOUT_STRATEGY");
                SimilarityStrategy::default()
            }),
            _ => SimilarityStrategy::default(),
        };
        let top_k = lookup("SCOUT_TOP_K")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_TOP_K)
            .clamp(1, MAX_TOP_K);
        let parallel_min_pool = lookup("SCOUT_PARALLEL_MIN_POOL")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_PARALLEL_MIN_POOL)
            .max(1);

        Self {
            weights_path: path("SCOUT_WEIGHTS_PATH"),
            pool_path: path("SCOUT_POOL_PATH"),
            strategy,
            top_k,
            parallel_min_pool,
        }
    }

    /// The external table when one is configured, otherwise the bundled one.
    pub fn load_weight_table(&self) -> Result<WeightTable> {
        match &self.weights_path {
            Some(path) => {
                let table = WeightTable::load(path)?;
                info!(
                    path = %path.display(),
                    source = ?table.source,
                    "using external weight table"
                );
                Ok(table)
            }
            None => {
                let table = bundled_table().context("load bundled weight table")?;
                info!(version = table.version, "using bundled weight table");
                Ok(table.clone())
            }
        }
    }
}
