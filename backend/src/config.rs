//! Configuration management for the CaneMap server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with CANEMAP_ prefix

use std::collections::BTreeMap;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{LockoutPolicy, VarietyTable};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Growth engine configuration
    pub growth: GrowthConfig,

    /// Login lockout configuration
    pub lockout: LockoutConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GrowthConfig {
    /// Version tag reported with the variety table
    pub table_version: Option<String>,

    /// Harvest days for varieties missing from the table
    pub default_harvest_days: u32,

    /// Per-variety harvest days layered over the built-in table
    #[serde(default)]
    pub varieties: BTreeMap<String, u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LockoutConfig {
    /// Failed sign-ins allowed before locking
    pub max_attempts: u32,

    /// Lock duration in seconds
    pub lock_seconds: i64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("CANEMAP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("growth.default_harvest_days", i64::from(shared::DEFAULT_HARVEST_DAYS))?
            .set_default("lockout.max_attempts", i64::from(shared::DEFAULT_MAX_ATTEMPTS))?
            .set_default("lockout.lock_seconds", shared::DEFAULT_LOCK_SECONDS)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (CANEMAP_ prefix)
            .add_source(
                Environment::with_prefix("CANEMAP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.lockout.validate()?;
        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

impl GrowthConfig {
    /// Built-in variety table with the configured overrides applied
    pub fn variety_table(&self) -> VarietyTable {
        let mut table = VarietyTable::standard().with_default_harvest_days(self.default_harvest_days);
        if let Some(version) = &self.table_version {
            table = table.with_version(version.clone());
        }
        for (label, days) in &self.varieties {
            table.insert(label, *days);
        }
        table
    }
}

impl LockoutConfig {
    /// Reject lock lengths outside `0..=MAX_LOCK_SECONDS`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=shared::MAX_LOCK_SECONDS).contains(&self.lock_seconds) {
            return Err(ConfigError::Message(format!(
                "lockout.lock_seconds must be between 0 and {}, got {}",
                shared::MAX_LOCK_SECONDS,
                self.lock_seconds
            )));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Message(
                "lockout.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn policy(&self) -> LockoutPolicy {
        LockoutPolicy {
            max_attempts: self.max_attempts,
            lock_seconds: self.lock_seconds,
        }
    }
}
