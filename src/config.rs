use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level Nimbus configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct NimbusConfig {
    /// ECC conversion settings.
    #[serde(default)]
    pub ecc: EccToml,

    /// Extra or replacement ECC bounds, keyed by variable name.
    #[serde(default)]
    pub bounds: BTreeMap<String, BoundsToml>,
}

impl NimbusConfig {
    /// Reads and parses a TOML file, or returns defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&toml_str).context("failed to parse TOML config")
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EccToml {
    #[serde(default)]
    pub realizations_count: Option<usize>,
    #[serde(default)]
    pub random_seed: Option<u64>,
    #[serde(default = "default_tie_break")]
    pub tie_break: String,
    #[serde(default)]
    pub ignore_ecc_bounds_exceedance: bool,
    #[serde(default)]
    pub skip_ecc_bounds: bool,
    #[serde(default = "default_sampling")]
    pub sampling: String,
}

impl Default for EccToml {
    fn default() -> Self {
        Self {
            realizations_count: None,
            random_seed: None,
            tie_break: default_tie_break(),
            ignore_ecc_bounds_exceedance: false,
            skip_ecc_bounds: false,
            sampling: default_sampling(),
        }
    }
}

fn default_tie_break() -> String {
    "random".to_string()
}
fn default_sampling() -> String {
    "quantile".to_string()
}

/// One `[bounds.<variable>]` table.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundsToml {
    pub lower: f64,
    pub upper: f64,
    pub units: String,
}
