//! Evaluation cache configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Memoize decisions per snapshot version
    /// Env: SHOPGUARD_CACHE_ENABLED
    /// Default: true
    pub enabled: bool,

    /// Decisions kept per session before LRU eviction
    /// Env: SHOPGUARD_CACHE_MAX_ENTRIES
    /// Default: 1024
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true, max_entries: crate::cache::evaluation::DEFAULT_MAX_ENTRIES }
    }
}

/// Boolean environment value: true/false, 1/0, yes/no, on/off
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl CacheConfig {
    pub fn merge(&mut self, other: Self) {
        self.enabled = other.enabled;
        self.max_entries = other.max_entries;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(enabled) = env::var("SHOPGUARD_CACHE_ENABLED") {
            match parse_flag(&enabled) {
                Some(flag) => self.enabled = flag,
                None => log::warn!(
                    "Ignoring SHOPGUARD_CACHE_ENABLED={:?}: expected true or false",
                    enabled
                ),
            }
        }
        if let Ok(max) = env::var("SHOPGUARD_CACHE_MAX_ENTRIES") {
            if let Ok(m) = max.parse() {
                self.max_entries = m;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            bail!("Invalid max_entries: must be greater than 0");
        }
        Ok(())
    }
}
