use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub marketplace: MarketplaceConfig,
    pub collections: CollectionsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

fn default_max_connections() -> u32 { 5 }
fn default_acquire_timeout() -> u64 { 3 }

/// Row caps for the auxiliary marketplace sets.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct MarketplaceConfig {
    pub featured_limit: i64,
    pub trending_limit: i64,
    pub creators_limit: i64,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            featured_limit: 5,
            trending_limit: 10,
            creators_limit: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectionsConfig {
    pub default_cover_image: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Untracked local overrides
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `ROAM_DATABASE__URL=postgres://...` sets `database.url`
            .add_source(config::Environment::with_prefix("ROAM").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
