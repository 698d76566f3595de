use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub listings: ListingsConfig,
    pub recent: RecentConfig,
    pub deals: DealsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingsBackend {
    Postgres,
    Fixture,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListingsConfig {
    pub backend: ListingsBackend,
    pub fixture_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecentBackend {
    Redis,
    File,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecentConfig {
    pub backend: RecentBackend,
    pub redis_url: String,
    /// Redis key holding the serialized ledger
    pub key: String,
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DealsConfig {
    pub limit: usize,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with(Self::environment())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("WAYFARE")
            .prefix_separator("__")
            .separator("__")
    }

    fn load_with(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .set_default("database.url", "postgres://localhost/wayfare")?
            .set_default("database.max_connections", 5)?
            .set_default("listings.backend", "fixture")?
            .set_default("listings.fixture_path", "data/offers.json")?
            .set_default("recent.backend", "file")?
            .set_default("recent.redis_url", "redis://127.0.0.1/")?
            .set_default("recent.key", "wayfare:recent_searches")?
            .set_default("recent.path", ".wayfare/recent_searches.json")?
            .set_default("deals.limit", 12)?
            // Checked-in defaults, then the run mode, then an untracked local override
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `WAYFARE__RECENT__BACKEND=redis` sets `recent.backend`
            .add_source(environment)
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_vars(vars: &[(&str, &str)]) -> config::Environment {
        let source: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::environment().source(Some(source))
    }

    #[test]
    fn test_defaults_without_files_or_env() {
        let config = Config::load_with(with_vars(&[])).unwrap();
        assert_eq!(config.listings.backend, ListingsBackend::Fixture);
        assert_eq!(config.recent.backend, RecentBackend::File);
        assert_eq!(config.recent.key, "wayfare:recent_searches");
        assert_eq!(config.deals.limit, 12);
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let config = Config::load_with(with_vars(&[
            ("WAYFARE__RECENT__BACKEND", "redis"),
            ("WAYFARE__RECENT__REDIS_URL", "redis://cache:6379/"),
            ("WAYFARE__DEALS__LIMIT", "20"),
            ("WAYFARE__LISTINGS__BACKEND", "postgres"),
        ]))
        .unwrap();

        assert_eq!(config.recent.backend, RecentBackend::Redis);
        assert_eq!(config.recent.redis_url, "redis://cache:6379/");
        assert_eq!(config.deals.limit, 20);
        assert_eq!(config.listings.backend, ListingsBackend::Postgres);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result = Config::load_with(with_vars(&[("WAYFARE__RECENT__BACKEND", "floppy")]));
        assert!(result.is_err());
    }
}
