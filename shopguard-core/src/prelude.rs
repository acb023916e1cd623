//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use shopguard_core::prelude::*;
//! ```

// === Permission model and evaluation ===
pub use crate::permissions::{
    evaluate, evaluate_str, Action, ActorSnapshot, Grant, GrantEvaluator, LegacyRole,
    PermissionEvaluator, PermissionQuery, Resource, Role,
};

// === Session guard ===
pub use crate::permissions::PermissionGuard;
pub use crate::store::{LoadedSnapshot, PermissionStore};

// === Route guards ===
pub use crate::permissions::{
    authorize_route, dashboard_routes, visible_entries, Authorizer, NavEntry, RouteDecision,
    RouteRequirement,
};

// === Sources ===
pub use crate::sources::{
    FilePermissionSource, HttpPermissionSource, PermissionSource, StaticPermissionSource,
};

// === Configuration ===
pub use crate::config::ShopguardConfig;
pub use crate::logging::{init_logging, LoggingConfig};

// === Errors ===
pub use crate::error::FetchError;
