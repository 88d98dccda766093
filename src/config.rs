//! Tunables of the KPI engines.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Thresholds used by the set report and the rollup.
///
/// Stored as a plain JSON object on disk; missing keys take their defaults:
/// ```json
/// { "clutch_threshold": 20, "min_rotation_attempts": 2, "top_n": 3 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiConfig {
    /// Pre-point score from which a rally counts as clutch.
    pub clutch_threshold: u32,
    /// Sideout attempts a rotation needs before it can be the worst one.
    pub min_rotation_attempts: u32,
    /// Length of the top attacker/server lists.
    pub top_n: usize,
    /// Attacks a player needs to enter the attack efficiency ranking.
    pub min_ranked_attacks: u32,
    /// Receptions a player needs to enter the reception ranking.
    pub min_ranked_receptions: u32,
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            clutch_threshold: 20,
            min_rotation_attempts: 2,
            top_n: 3,
            min_ranked_attacks: 5,
            min_ranked_receptions: 5,
        }
    }
}

impl KpiConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{path}'"))?;
        let config: KpiConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file '{path}'"))?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}
