//! Configuration for the DCIS core services.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub registration: RegistrationConfig,
}

/// Storage backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: String,
}

/// Account registration and token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// Lifetime of a registration confirmation token, in minutes.
    pub confirmation_ttl_minutes: u64,
    /// Lifetime of a password reset token, in minutes.
    pub reset_ttl_minutes: u64,
}

impl Config {
    #[cfg(feature = "toml-config")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            database: DatabaseConfig {
                path: "data/dcis.db".to_string(),
            },
            registration: RegistrationConfig {
                confirmation_ttl_minutes: 24 * 60,
                reset_ttl_minutes: 60,
            },
        }
    }
}

impl RegistrationConfig {
    /// Confirmation token lifetime in milliseconds.
    pub fn confirmation_ttl_ms(&self) -> u64 {
        self.confirmation_ttl_minutes * 60_000
    }

    /// Reset token lifetime in milliseconds.
    pub fn reset_ttl_ms(&self) -> u64 {
        self.reset_ttl_minutes * 60_000
    }
}
