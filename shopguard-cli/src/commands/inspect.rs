//! `shopguard inspect`

use super::{open_session, SessionArgs};
use anyhow::{Context, Result};
use shopguard_core::config::ShopguardConfig;
use std::io::Write;

/// Print the loaded snapshot: legacy role, then each role with its grants
pub async fn run(args: &SessionArgs, config: &ShopguardConfig, out: &mut impl Write) -> Result<()> {
    let guard = open_session(args, config).await?;
    let snapshot = guard.store().current().context("Snapshot was invalidated during load")?;

    writeln!(out, "actor:   {}", snapshot.id)?;
    match &snapshot.legacy_role {
        Some(role) if snapshot.is_owner() => writeln!(out, "legacy:  {} (all permissions)", role)?,
        Some(role) => writeln!(out, "legacy:  {}", role)?,
        None => writeln!(out, "legacy:  -")?,
    }
    writeln!(out, "version: {}", guard.store().version())?;

    for role in &snapshot.roles {
        let status = if role.is_active { "" } else { " (inactive)" };
        writeln!(out, "role {}{}", role.name, status)?;

        for grant in &role.grants {
            let actions: Vec<&str> = grant.actions.iter().map(|a| a.as_str()).collect();
            match &grant.resource {
                Some(resource) => writeln!(out, "  {}: {}", resource, actions.join(", "))?,
                None => writeln!(out, "  <no resource>")?,
            }
        }
    }

    Ok(())
}
