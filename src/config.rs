use std::net::SocketAddr;
use std::path::PathBuf;

use kartpicker_core::DEFAULT_BASE_KART_WEIGHT;

/// Server configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub database_url: String,
    /// JSON catalog imported at startup, if set.
    pub seed_path: Option<PathBuf>,
    /// Read requests per second per client IP.
    pub read_limit: u32,
    pub base_kart_weight: f64,
}

impl Config {
    /// Load configuration from environment variables.
    /// DATABASE_URL defaults to "sqlite://kartpicker.db"
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://kartpicker.db".to_string());

        let listen_addr = lookup("KARTPICKER_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("KARTPICKER_LISTEN_ADDR", "must be a valid socket address")
            })?;

        let seed_path = lookup("KARTPICKER_SEED_PATH")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let read_limit = match lookup("KARTPICKER_READ_LIMIT") {
            Some(s) => s
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid(
                    "KARTPICKER_READ_LIMIT",
                    "must be a positive integer",
                ))?,
            None => 20,
        };

        let base_kart_weight = match lookup("KARTPICKER_BASE_KART_WEIGHT") {
            Some(s) => s
                .parse::<f64>()
                .ok()
                .filter(|w| w.is_finite() && *w > 0.0)
                .ok_or(ConfigError::Invalid(
                    "KARTPICKER_BASE_KART_WEIGHT",
                    "must be a positive number of pounds",
                ))?,
            None => DEFAULT_BASE_KART_WEIGHT,
        };

        Ok(Config {
            listen_addr,
            database_url,
            seed_path,
            read_limit,
            base_kart_weight,
        })
    }

    /// In-memory configuration for tests.
    pub fn for_testing() -> Self {
        Config {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url: "sqlite::memory:".to_string(),
            seed_path: None,
            read_limit: 1000,
            base_kart_weight: DEFAULT_BASE_KART_WEIGHT,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str, &'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid(var, msg) => write!(f, "Invalid value for {}: {}", var, msg),
        }
    }
}

impl std::error::Error for ConfigError {}
