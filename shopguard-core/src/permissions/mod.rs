//! Shopguard permissions module
//!
//! Role-based permission evaluation for the store admin dashboard.
//!
//! # Model
//! - An actor holds roles; each active role holds grants of actions on resources
//! - `"all"` as a resource and `"*"`/`"all"` as an action are wildcards
//! - An actor whose legacy role is `owner` passes every check
//! - Matching is case-insensitive and fails closed without a snapshot
//!
//! # Example
//! ```rust,ignore
//! let guard = PermissionGuard::new(HttpPermissionSource::new(url)?, "act_42");
//! guard.refresh().await?;
//!
//! if guard.check(&["orders", "returns"], "update") {
//!     // show the "Approve return" button
//! }
//! ```

mod evaluator;
mod guard;
mod model;
mod routes;

// Public exports
pub use evaluator::{
    evaluate, evaluate_str, grant_allows, GrantEvaluator, PermissionEvaluator, PermissionQuery,
};
pub use guard::PermissionGuard;
pub use model::{Action, ActorSnapshot, Grant, LegacyRole, Resource, Role};
pub use routes::{
    authorize_route, dashboard_routes, visible_entries, Authorizer, NavEntry, RouteDecision,
    RouteRequirement,
};
