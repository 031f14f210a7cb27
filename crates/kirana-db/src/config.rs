//! # POS Configuration
//!
//! Configuration for a shop's checkout core: database, shop identity, tax.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     KIRANA_DB_PATH=/var/lib/kirana/pos.db                              │
//! │     KIRANA_SHOP_ID=shop-a1b2                                           │
//! │     KIRANA_DEFAULT_TAX_PERCENT=12                                      │
//! │                                                                         │
//! │  2. TOML Config File (kirana.toml)                                     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     ./kirana.db, 5 connections, 5s busy timeout, 18% GST               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "./kirana.db"
//! max_connections = 5
//! busy_timeout_secs = 5
//!
//! [shop]
//! id = "shop-a1b2"
//! name = "Sharma General Store"
//!
//! [tax]
//! default_rate_percent = 18.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use kirana_core::{TaxPolicy, TaxRate};

use crate::pool::DbConfig;

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// Maximum pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a writer waits for the SQLite write lock before giving up.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./kirana.db")
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout() -> u64 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
            busy_timeout_secs: default_busy_timeout(),
        }
    }
}

/// `[shop]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopSettings {
    /// Shop identifier; its last four alphanumerics appear in bill numbers.
    pub id: String,

    #[serde(default)]
    pub name: String,
}

impl Default for ShopSettings {
    fn default() -> Self {
        ShopSettings {
            id: "default-shop".to_string(),
            name: "Default Shop".to_string(),
        }
    }
}

/// `[tax]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxSettings {
    /// GST applied when neither the line nor the product names a rate.
    #[serde(default = "default_tax_percent")]
    pub default_rate_percent: f64,
}

fn default_tax_percent() -> f64 {
    18.0
}

impl Default for TaxSettings {
    fn default() -> Self {
        TaxSettings {
            default_rate_percent: default_tax_percent(),
        }
    }
}

// =============================================================================
// PosConfig
// =============================================================================

/// Complete configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PosConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub shop: ShopSettings,

    #[serde(default)]
    pub tax: TaxSettings,
}

impl PosConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file, if given and present
    /// 3. Environment variables
    pub fn load(config_path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) if path.exists() => {
                info!(?path, "Loading POS config from file");
                Self::from_toml_str(&std::fs::read_to_string(path)?)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document without touching the environment.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.shop.id.trim().is_empty() {
            return Err(ConfigError::Invalid("shop.id must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        self.tax_policy()?;

        Ok(())
    }

    /// Builds the shop's tax policy from `[tax]`.
    pub fn tax_policy(&self) -> ConfigResult<TaxPolicy> {
        let rate = TaxRate::try_from_percentage(self.tax.default_rate_percent)
            .map_err(|e| ConfigError::Invalid(format!("tax.default_rate_percent: {}", e)))?;
        Ok(TaxPolicy::new(rate))
    }

    /// Builds the pool configuration from `[database]`.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .busy_timeout(Duration::from_secs(self.database.busy_timeout_secs))
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("KIRANA_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(max) = std::env::var("KIRANA_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring invalid KIRANA_DB_MAX_CONNECTIONS"),
            }
        }

        if let Ok(secs) = std::env::var("KIRANA_DB_BUSY_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(n) => self.database.busy_timeout_secs = n,
                Err(_) => warn!(value = %secs, "Ignoring invalid KIRANA_DB_BUSY_TIMEOUT_SECS"),
            }
        }

        if let Ok(id) = std::env::var("KIRANA_SHOP_ID") {
            debug!(shop_id = %id, "Overriding shop ID from environment");
            self.shop.id = id;
        }

        if let Ok(name) = std::env::var("KIRANA_SHOP_NAME") {
            self.shop.name = name;
        }

        if let Ok(pct) = std::env::var("KIRANA_DEFAULT_TAX_PERCENT") {
            match pct.parse::<f64>() {
                Ok(p) => self.tax.default_rate_percent = p,
                Err(_) => warn!(value = %pct, "Ignoring invalid KIRANA_DEFAULT_TAX_PERCENT"),
            }
        }
    }

    /// Returns the shop ID.
    pub fn shop_id(&self) -> &str {
        &self.shop.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PosConfig::default();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.busy_timeout_secs, 5);
        assert_eq!(config.tax_policy().unwrap(), TaxPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_file() {
        let config = PosConfig::from_toml_str(
            r#"
            [shop]
            id = "shop-a1b2"
            name = "Sharma General Store"

            [tax]
            default_rate_percent = 12.0
            "#,
        )
        .unwrap();

        assert_eq!(config.shop_id(), "shop-a1b2");
        assert_eq!(config.tax_policy().unwrap().default_rate.bps(), 1200);
        // Missing section falls back to defaults
        assert_eq!(config.database.path, PathBuf::from("./kirana.db"));
    }

    #[test]
    fn test_validation() {
        let mut config = PosConfig::default();

        config.shop.id = "  ".into();
        assert!(config.validate().is_err());

        config.shop.id = "shop-1".into();
        config.tax.default_rate_percent = 120.0;
        assert!(config.validate().is_err());

        config.tax.default_rate_percent = f64::NAN;
        assert!(config.validate().is_err());

        config.tax.default_rate_percent = 5.0;
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            PosConfig::from_toml_str("[database\npath = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_db_config_carries_settings() {
        let mut config = PosConfig::default();
        config.database.max_connections = 3;
        config.database.busy_timeout_secs = 9;

        let db = config.db_config();
        assert_eq!(db.max_connections, 3);
        assert_eq!(db.busy_timeout, Duration::from_secs(9));
    }
}
