//! Tracer configuration

use eyre::{eyre, Result, WrapErr};
use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Main configuration for the denom tracer
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub batch: BatchConfig,
    pub server: ServerConfig,
}

/// Database configuration
#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Custom Debug that redacts the database URL (may contain credentials).
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .finish()
    }
}

/// Batch cycle configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Delay between cycles
    pub interval_ms: u64,
    /// Maximum pending packets fetched per cycle
    pub batch_size: u32,
    /// Packets resolved concurrently within a cycle
    pub concurrency: usize,
}

impl BatchConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
        }
    }
}

/// Health/metrics server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

const MAX_CONCURRENCY: usize = 1024;

fn default_interval_ms() -> u64 {
    60_000
}

fn default_batch_size() -> u32 {
    500
}

fn default_concurrency() -> usize {
    16
}

fn default_health_port() -> u16 {
    9100
}

/// Parse an optional env var, falling back to `default` when unset or invalid
fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    /// Loads .env file if present, then reads from environment
    pub fn load() -> Result<Self> {
        Self::load_from_file(".env")
    }

    /// Load from a specific .env file path
    pub fn load_from_file(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            dotenvy::from_filename(path)
                .wrap_err_with(|| format!("Failed to load .env file from {}", path))?;
        }
        Self::load_from_env()
    }

    /// Load configuration from environment variables
    pub fn load_from_env() -> Result<Self> {
        let database = DatabaseConfig {
            url: env::var("DATABASE_URL")
                .map_err(|_| eyre!("DATABASE_URL environment variable is required"))?,
        };

        let batch = BatchConfig {
            interval_ms: env_or("BATCH_INTERVAL_MS", default_interval_ms()),
            batch_size: env_or("BATCH_SIZE", default_batch_size()),
            concurrency: env_or("BATCH_CONCURRENCY", default_concurrency()),
        };

        let server = ServerConfig {
            bind_address: env::var("HEALTH_BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("HEALTH_PORT", default_health_port()),
        };

        let config = Config {
            database,
            batch,
            server,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            return Err(eyre!("database.url cannot be empty"));
        }

        if self.batch.interval_ms == 0 {
            return Err(eyre!("batch.interval_ms must be greater than 0"));
        }

        if self.batch.batch_size == 0 {
            return Err(eyre!("batch.batch_size must be greater than 0"));
        }

        if self.batch.concurrency == 0 || self.batch.concurrency > MAX_CONCURRENCY {
            return Err(eyre!(
                "batch.concurrency must be between 1 and {}",
                MAX_CONCURRENCY
            ));
        }

        Ok(())
    }
}
