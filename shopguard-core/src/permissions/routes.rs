//! Route guards and navigation filtering for the admin dashboard
//!
//! Public routes are declared with [`RouteRequirement::Public`]. A protected
//! requirement with an empty resource list is NOT a bypass: it goes through
//! evaluation like any other query, so only an owner or a grant on `all`
//! passes it. A route whose resource list was left empty by mistake stays
//! locked instead of silently opening up.

use super::evaluator::{evaluate, PermissionQuery};
use super::guard::PermissionGuard;
use super::model::ActorSnapshot;
use crate::sources::PermissionSource;

/// Anything that can answer a permission query
pub trait Authorizer {
    fn is_allowed(&self, query: &PermissionQuery) -> bool;
}

impl<S: PermissionSource> Authorizer for PermissionGuard<S> {
    fn is_allowed(&self, query: &PermissionQuery) -> bool {
        self.check_query(query)
    }
}

/// Uncached evaluation straight against a snapshot
impl Authorizer for ActorSnapshot {
    fn is_allowed(&self, query: &PermissionQuery) -> bool {
        evaluate(Some(self), query.resources(), query.action())
    }
}

/// What a route demands of the actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteRequirement {
    /// Reachable without any permission
    Public,
    /// Requires the action on any one of the resources
    Protected(PermissionQuery),
}

impl RouteRequirement {
    pub fn protected<R: AsRef<str>>(resources: &[R], action: &str) -> Self {
        RouteRequirement::Protected(PermissionQuery::parse(resources, action))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Deny,
}

impl RouteDecision {
    pub fn is_allowed(self) -> bool {
        self == RouteDecision::Allow
    }
}

impl std::fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteDecision::Allow => f.pad("allow"),
            RouteDecision::Deny => f.pad("deny"),
        }
    }
}

/// Decide whether a route may be entered
pub fn authorize_route<A: Authorizer + ?Sized>(
    authorizer: &A,
    requirement: &RouteRequirement,
) -> RouteDecision {
    match requirement {
        RouteRequirement::Public => RouteDecision::Allow,
        RouteRequirement::Protected(query) => {
            if query.resources().is_empty() {
                log::warn!("Protected route has no resources; only owners and 'all' grants pass");
            }
            if authorizer.is_allowed(query) {
                RouteDecision::Allow
            } else {
                RouteDecision::Deny
            }
        }
    }
}

/// Navigation menu entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub label: String,
    pub path: String,
    pub requirement: RouteRequirement,
}

impl NavEntry {
    pub fn new(
        label: impl Into<String>,
        path: impl Into<String>,
        requirement: RouteRequirement,
    ) -> Self {
        Self { label: label.into(), path: path.into(), requirement }
    }
}

/// Entries the actor may see, in menu order
pub fn visible_entries<'a, A: Authorizer + ?Sized>(
    authorizer: &A,
    entries: &'a [NavEntry],
) -> Vec<&'a NavEntry> {
    entries
        .iter()
        .filter(|entry| authorize_route(authorizer, &entry.requirement).is_allowed())
        .collect()
}

/// The admin dashboard's route table
pub fn dashboard_routes() -> Vec<NavEntry> {
    vec![
        NavEntry::new("Overview", "/", RouteRequirement::Public),
        NavEntry::new("Orders", "/orders", RouteRequirement::protected(&["orders"], "read")),
        NavEntry::new("Products", "/products", RouteRequirement::protected(&["products"], "read")),
        NavEntry::new("Coupons", "/coupons", RouteRequirement::protected(&["coupons"], "read")),
        NavEntry::new(
            "Campaigns",
            "/campaigns",
            RouteRequirement::protected(&["campaigns"], "read"),
        ),
        NavEntry::new(
            "Shipments",
            "/shipments",
            RouteRequirement::protected(&["shipments", "orders"], "read"),
        ),
        NavEntry::new(
            "Returns",
            "/returns",
            RouteRequirement::protected(&["returns", "orders"], "read"),
        ),
        NavEntry::new(
            "Transactions",
            "/transactions",
            RouteRequirement::protected(&["transactions"], "read"),
        ),
        NavEntry::new(
            "Customers",
            "/customers",
            RouteRequirement::protected(&["customers"], "read"),
        ),
        NavEntry::new("Roles", "/settings/roles", RouteRequirement::protected(&["roles"], "read")),
        NavEntry::new("Settings", "/settings", RouteRequirement::protected(&["settings"], "read")),
    ]
}
