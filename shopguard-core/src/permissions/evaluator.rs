//! Permission evaluation
//!
//! A query asks: may this actor perform `action` on ANY of `resources`? The
//! caller passes a set of interchangeable resource names (a route protected by
//! either "orders" or "returns", say) and one matching grant is enough.
//!
//! Evaluation is a pure function of the snapshot and the query. Order across
//! roles and grants does not matter: grants are not weighted and the first
//! match wins.

use super::model::{Action, ActorSnapshot, Grant, Resource};

/// Normalized (resources, action) pair
///
/// Resources are sorted and deduplicated so equivalent queries compare and
/// hash equal, which is what the evaluation cache keys on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PermissionQuery {
    resources: Vec<Resource>,
    action: Action,
}

impl PermissionQuery {
    pub fn new<I, R>(resources: I, action: impl Into<Action>) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Resource>,
    {
        let mut resources: Vec<Resource> = resources.into_iter().map(Into::into).collect();
        resources.sort();
        resources.dedup();
        Self { resources, action: action.into() }
    }

    /// Build a query from raw strings
    pub fn parse<R: AsRef<str>>(resources: &[R], action: &str) -> Self {
        Self::new(resources.iter().map(|r| Resource::parse(r.as_ref())), Action::parse(action))
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn action(&self) -> &Action {
        &self.action
    }
}

impl std::fmt::Display for PermissionQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.resources.iter().map(Resource::as_str).collect();
        write!(f, "{} on [{}]", self.action, names.join(", "))
    }
}

/// Decide whether `snapshot` allows `action` on any of `resources`
///
/// Fails closed: an absent snapshot denies everything. An owner is allowed
/// everything without looking at roles. An empty resource list can only be
/// satisfied by a grant on `all`.
pub fn evaluate(snapshot: Option<&ActorSnapshot>, resources: &[Resource], action: &Action) -> bool {
    let Some(actor) = snapshot else {
        return false;
    };

    if actor.is_owner() {
        return true;
    }

    actor
        .active_roles()
        .flat_map(|role| role.grants.iter())
        .any(|grant| grant_allows(grant, resources, action))
}

/// [`evaluate`] over raw strings, normalizing them first
pub fn evaluate_str<R: AsRef<str>>(
    snapshot: Option<&ActorSnapshot>,
    resources: &[R],
    action: &str,
) -> bool {
    let query = PermissionQuery::parse(resources, action);
    evaluate(snapshot, query.resources(), query.action())
}

/// Whether a single grant covers the request
pub fn grant_allows(grant: &Grant, resources: &[Resource], action: &Action) -> bool {
    let Some(granted) = &grant.resource else {
        return false;
    };

    let resource_match = granted.is_wildcard() || resources.iter().any(|r| r == granted);
    resource_match && grant.actions.iter().any(|a| a.is_wildcard() || a == action)
}

/// Seam for the grant scan
///
/// The permission guard goes through this trait so embedders can wrap or
/// replace evaluation (auditing, counting) without touching the cache.
pub trait PermissionEvaluator: Send + Sync {
    /// Evaluate `query` against `snapshot`
    fn evaluate(&self, snapshot: Option<&ActorSnapshot>, query: &PermissionQuery) -> bool;

    /// Evaluator name for logging
    fn name(&self) -> &str {
        "grant-scan"
    }
}

/// Default evaluator: linear scan over active roles and their grants
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantEvaluator;

impl PermissionEvaluator for GrantEvaluator {
    fn evaluate(&self, snapshot: Option<&ActorSnapshot>, query: &PermissionQuery) -> bool {
        evaluate(snapshot, query.resources(), query.action())
    }
}
