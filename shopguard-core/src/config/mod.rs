//! Configuration system for Shopguard
//!
//! Configuration values are resolved in the following order (highest priority wins):
//!
//! 1. **Environment Variables** (`SHOPGUARD_*`)
//! 2. **Config File** (shopguard.toml)
//! 3. **Defaults**
//!
//! # Example
//!
//! ```no_run
//! use shopguard_core::config::ShopguardConfig;
//!
//! let config = ShopguardConfig::load()?;
//! config.validate()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cache;
pub mod logging;
pub mod source;

pub use cache::CacheConfig;
pub use logging::LogSettings;
pub use source::SourceConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "shopguard.toml";

/// Complete Shopguard configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopguardConfig {
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub logging: LogSettings,
}

impl ShopguardConfig {
    /// Load with full supersedence chain from `shopguard.toml`
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load defaults, then `path` if it exists, then environment variables
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = Self::default();

        if path.exists() {
            let file_config = Self::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.merge(file_config);
        }

        config.apply_env_vars();

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.as_ref().display()))
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        self.source.merge(other.source);
        self.cache.merge(other.cache);
        self.logging.merge(other.logging);
    }

    pub fn apply_env_vars(&mut self) {
        self.source.apply_env_vars();
        self.cache.apply_env_vars();
        self.logging.apply_env_vars();
    }

    pub fn validate(&self) -> Result<()> {
        self.source.validate().context("Invalid [source] section")?;
        self.cache.validate().context("Invalid [cache] section")?;
        self.logging.validate().context("Invalid [logging] section")?;
        Ok(())
    }
}
