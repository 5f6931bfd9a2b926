//! Application configuration management.
//!
//! Configuration is passed explicitly into the repositories that need it;
//! nothing in the ledger reads ambient globals.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Wallet ledger configuration.
    #[serde(default)]
    pub wallet: WalletConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Wallet ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// Default hold time-to-live in seconds, applied when the caller supplies
    /// none (or a non-positive value).
    #[serde(default = "default_hold_ttl")]
    pub default_hold_ttl_secs: u64,
    /// Maximum number of expired holds released per sweep invocation.
    #[serde(default = "default_sweep_batch")]
    pub sweep_batch_size: u64,
}

fn default_hold_ttl() -> u64 {
    604800 // 7 days
}

fn default_sweep_batch() -> u64 {
    100
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            default_hold_ttl_secs: default_hold_ttl(),
            sweep_batch_size: default_sweep_batch(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_config_defaults() {
        let cfg = WalletConfig::default();
        assert_eq!(cfg.default_hold_ttl_secs, 604800);
        assert_eq!(cfg.sweep_batch_size, 100);
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [("TALLY__DATABASE__URL", Some("postgres://localhost/tally"))],
            || {
                let cfg = AppConfig::load().unwrap();
                assert_eq!(cfg.database.url, "postgres://localhost/tally");
                assert_eq!(cfg.database.max_connections, 10);
                assert_eq!(cfg.wallet.default_hold_ttl_secs, 604800);
            },
        );
    }
}
