//! `shopguard check`

use super::{open_session, SessionArgs};
use anyhow::Result;
use shopguard_core::config::ShopguardConfig;
use shopguard_core::permissions::RouteDecision;
use std::io::Write;

/// Print `allow` or `deny` for `action` on any of `resources`
pub async fn run(
    args: &SessionArgs,
    config: &ShopguardConfig,
    resources: &[String],
    action: &str,
    out: &mut impl Write,
) -> Result<RouteDecision> {
    let guard = open_session(args, config).await?;

    let decision =
        if guard.check(resources, action) { RouteDecision::Allow } else { RouteDecision::Deny };
    writeln!(out, "{}", decision)?;

    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{fixture, session};

    async fn check(actor: &str, resources: &[&str], action: &str) -> (RouteDecision, String) {
        let file = fixture();
        let (args, config) = session(actor, &file);
        let resources: Vec<String> = resources.iter().map(|r| r.to_string()).collect();

        let mut out = Vec::new();
        let decision = run(&args, &config, &resources, action, &mut out).await.unwrap();
        (decision, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_allow_prints_allow() {
        let (decision, printed) = check("act_clerk", &["returns", "orders"], "update").await;
        assert_eq!(decision, RouteDecision::Allow);
        assert_eq!(printed, "allow\n");
    }

    #[tokio::test]
    async fn test_inactive_role_grants_nothing() {
        let (decision, printed) = check("act_clerk", &["campaigns"], "read").await;
        assert_eq!(decision, RouteDecision::Deny);
        assert_eq!(printed, "deny\n");
    }

    #[tokio::test]
    async fn test_owner_is_allowed() {
        let (decision, _) = check("act_owner", &["settings"], "delete").await;
        assert_eq!(decision, RouteDecision::Allow);
    }
}
