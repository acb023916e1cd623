//! `shopguard routes`

use super::{open_session, SessionArgs};
use anyhow::Result;
use shopguard_core::config::ShopguardConfig;
use shopguard_core::permissions::{authorize_route, dashboard_routes, RouteRequirement};
use std::io::Write;

/// Print every dashboard route with its requirement and the actor's decision
pub async fn run(args: &SessionArgs, config: &ShopguardConfig, out: &mut impl Write) -> Result<()> {
    let guard = open_session(args, config).await?;

    for entry in dashboard_routes() {
        let requirement = match &entry.requirement {
            RouteRequirement::Public => "public".to_string(),
            RouteRequirement::Protected(query) => query.to_string(),
        };
        let decision = authorize_route(&guard, &entry.requirement);
        writeln!(out, "{:<6} {:<16} {:<32} {}", decision, entry.path, requirement, entry.label)?;
    }

    Ok(())
}
