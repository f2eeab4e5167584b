//! Service configuration

use anyhow::Result;
use serde::Deserialize;

/// Service configuration, loadable from `FOREMAN_`-prefixed environment
/// variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// HTTP port for health, metrics, and engine endpoints.
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Rows generated per synthetic training set during warm-up.
    #[serde(default = "default_synthetic_rows")]
    pub synthetic_rows: usize,

    /// Seed for the engine's random number generators.
    #[serde(default = "default_rng_seed")]
    pub rng_seed: u64,

    /// Seed the in-memory store with demo data on startup.
    #[serde(default = "default_demo_data")]
    pub demo_data: bool,
}

fn default_api_port() -> u16 {
    8080
}

fn default_synthetic_rows() -> usize {
    1000
}

fn default_rng_seed() -> u64 {
    7
}

fn default_demo_data() -> bool {
    true
}

impl ServiceConfig {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("FOREMAN"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| ServiceConfig {
            api_port: default_api_port(),
            synthetic_rows: default_synthetic_rows(),
            rng_seed: default_rng_seed(),
            demo_data: default_demo_data(),
        }))
    }
}
