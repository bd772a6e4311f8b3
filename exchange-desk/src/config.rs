//! Configuration for the exchange desk

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Exchange desk configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Core book data directory
    pub core_data_dir: PathBuf,

    /// Pricing configuration
    pub pricing: PricingConfig,

    /// Administrator directory configuration
    pub directory: DirectoryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "exchange-desk".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            core_data_dir: PathBuf::from("./data/desk"),
            pricing: PricingConfig::default(),
            directory: DirectoryConfig::default(),
        }
    }
}

/// Pricing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Absolute XAF-per-USDT spread added on the sell side and taken
    /// off the buy side, on top of the daily rates
    pub margin_xaf: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            margin_xaf: Decimal::ZERO,
        }
    }
}

/// Administrator directory configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Client IDs allowed to decide transactions; they also receive
    /// new-transaction announcements
    pub admins: Vec<String>,
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.core_data_dir.as_os_str().is_empty() {
            return Err(crate::Error::Config("Data directory is required".to_string()));
        }

        if self.pricing.margin_xaf < Decimal::ZERO {
            return Err(crate::Error::Config(format!(
                "Margin cannot be negative: {}",
                self.pricing.margin_xaf
            )));
        }

        Ok(())
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(dir) = std::env::var("EXCHANGE_DATA_DIR") {
            config.core_data_dir = PathBuf::from(dir);
        }

        if let Ok(margin) = std::env::var("EXCHANGE_MARGIN_XAF") {
            config.pricing.margin_xaf = margin
                .parse()
                .map_err(|_| crate::Error::Config(format!("Invalid margin: {}", margin)))?;
        }

        if let Ok(admins) = std::env::var("EXCHANGE_ADMINS") {
            config.directory.admins = admins
                .split(',')
                .map(|admin| admin.trim().to_string())
                .filter(|admin| !admin.is_empty())
                .collect();
        }

        Ok(config)
    }
}
