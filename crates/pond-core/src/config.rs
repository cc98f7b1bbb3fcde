//! Configuration types for the simulation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// How a crowded pool picks among several outgoing streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamSelection {
    /// Draws from `[0, count - 1)`, so the last candidate stream is never
    /// chosen when a pool has several. Kept as the default to reproduce
    /// historical runs.
    #[default]
    Legacy,
    /// Draws uniformly from every candidate.
    Uniform,
}

impl std::str::FromStr for StreamSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(StreamSelection::Legacy),
            "uniform" => Ok(StreamSelection::Uniform),
            other => Err(Error::InvalidArgument(format!(
                "unknown stream selection '{}'",
                other
            ))),
        }
    }
}

/// Simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Outgoing stream choice for crowded pools
    pub stream_selection: StreamSelection,
    /// Emit a population summary every N weeks (0 disables)
    pub report_interval: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            stream_selection: StreamSelection::default(),
            report_interval: 10,
        }
    }
}

impl SimulationConfig {
    /// Read a JSON configuration file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&raw)?;
        debug!(path = %path.display(), seed = config.seed, "Loaded simulation config");
        Ok(config)
    }
}
