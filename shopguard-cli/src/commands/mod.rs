//! Subcommands and the session setup they share

pub mod check;
pub mod inspect;
pub mod routes;

use anyhow::{bail, Context, Result};
use shopguard_core::config::ShopguardConfig;
use shopguard_core::permissions::PermissionGuard;
use shopguard_core::sources::{self, PermissionSource};
use std::path::PathBuf;

/// Options every subcommand takes
#[derive(clap::Args, Debug, Clone)]
pub struct SessionArgs {
    /// Actor whose permissions are evaluated
    #[arg(long)]
    pub actor: String,

    /// Config file [default: ./shopguard.toml when present]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Read snapshots from this JSON file instead of the permission service
    #[arg(long)]
    pub file: Option<PathBuf>,
}

pub type CliGuard = PermissionGuard<Box<dyn PermissionSource>>;

/// Resolve configuration: defaults, config file, environment, then flags
pub fn load_config(args: &SessionArgs) -> Result<ShopguardConfig> {
    let mut config = match &args.config {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            ShopguardConfig::load_from(path)?
        }
        None => ShopguardConfig::load()?,
    };

    if let Some(file) = &args.file {
        config.source.kind = "file".to_string();
        config.source.file_path = file.display().to_string();
    }

    config.validate()?;
    Ok(config)
}

/// Build the guard for `args.actor` and load its snapshot
pub async fn open_session(args: &SessionArgs, config: &ShopguardConfig) -> Result<CliGuard> {
    let source =
        sources::from_config(&config.source).context("Failed to set up permission source")?;
    let guard = PermissionGuard::from_config(source, args.actor.as_str(), &config.cache);

    let version = guard
        .refresh()
        .await
        .with_context(|| format!("Failed to load permissions for {}", args.actor))?;
    log::debug!(
        "Session for {} opened from {} source at version {}",
        args.actor,
        guard.store().source().name(),
        version
    );
    Ok(guard)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Snapshot file with a fulfilment clerk, an owner and a deactivated account
    pub fn fixture() -> NamedTempFile {
        let actors = serde_json::json!([
            {
                "id": "act_clerk",
                "roles": [
                    {
                        "name": "Fulfilment",
                        "isActive": true,
                        "permissions": [
                            { "resource": "orders", "actions": ["read", "update"] },
                            { "resource": "returns", "actions": ["read"] }
                        ]
                    },
                    {
                        "name": "Marketing",
                        "isActive": false,
                        "permissions": [{ "resource": "campaigns", "actions": ["*"] }]
                    }
                ]
            },
            { "id": "act_owner", "legacyRole": "owner", "roles": [] }
        ]);

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", actors).unwrap();
        file
    }

    pub fn session(actor: &str, file: &NamedTempFile) -> (SessionArgs, ShopguardConfig) {
        let args = SessionArgs {
            actor: actor.to_string(),
            config: None,
            file: Some(file.path().to_path_buf()),
        };
        let mut config = ShopguardConfig::default();
        config.source.kind = "file".to_string();
        config.source.file_path = file.path().display().to_string();
        (args, config)
    }
}
