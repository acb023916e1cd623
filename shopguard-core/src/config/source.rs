//! Permission source configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Where actor snapshots are fetched from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// "http" or "file"
    /// Env: SHOPGUARD_SOURCE_KIND
    /// Default: "http"
    pub kind: String,

    /// Permission service root
    /// Env: SHOPGUARD_SOURCE_URL
    pub base_url: String,

    /// Request path, `{actor}` is replaced by the actor id
    /// Default: "/actors/{actor}/permissions"
    pub path_template: String,

    /// Bearer token for the permission service
    /// Env: SHOPGUARD_SOURCE_TOKEN
    pub token: Option<String>,

    /// Request timeout in seconds
    /// Env: SHOPGUARD_SOURCE_TIMEOUT
    /// Default: 10
    pub timeout_secs: u64,

    /// Snapshot file for the "file" kind
    /// Env: SHOPGUARD_SOURCE_FILE
    pub file_path: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: "http".to_string(),
            base_url: String::new(),
            path_template: crate::sources::http::DEFAULT_PATH_TEMPLATE.to_string(),
            token: None,
            timeout_secs: 10,
            file_path: String::new(),
        }
    }
}

impl SourceConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(kind) = env::var("SHOPGUARD_SOURCE_KIND") {
            self.kind = kind.to_lowercase();
        }
        if let Ok(url) = env::var("SHOPGUARD_SOURCE_URL") {
            self.base_url = url;
        }
        if let Ok(token) = env::var("SHOPGUARD_SOURCE_TOKEN") {
            self.token = Some(token);
        }
        if let Ok(timeout) = env::var("SHOPGUARD_SOURCE_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.timeout_secs = t;
            }
        }
        if let Ok(path) = env::var("SHOPGUARD_SOURCE_FILE") {
            self.file_path = path;
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.kind.as_str() {
            "http" => {
                if self.base_url.is_empty() {
                    bail!("Invalid base_url: required for the http source");
                }
                if !self.path_template.contains("{actor}") {
                    bail!("Invalid path_template: must contain {{actor}}");
                }
                if self.timeout_secs == 0 {
                    bail!("Invalid timeout_secs: must be greater than 0");
                }
            }
            "file" => {
                if self.file_path.is_empty() {
                    bail!("Invalid file_path: required for the file source");
                }
            }
            other => bail!("Invalid kind '{}': must be http or file", other),
        }
        Ok(())
    }
}
