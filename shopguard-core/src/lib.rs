//! Shopguard - Core
//!
//! Role-based permission evaluation for a store administration dashboard.
//!
//! # Overview
//!
//! An actor (a staff member signed into the dashboard) holds roles, and each
//! role grants actions on resources. Shopguard fetches that snapshot from a
//! permission service, keeps it per session, and answers "may this actor do
//! X on any of these resources?" locally, with memoized decisions.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use shopguard_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let source = HttpPermissionSource::new("https://api.example.com")?;
//!     let guard = PermissionGuard::new(source, "act_42");
//!     guard.refresh().await?;
//!
//!     if guard.check(&["returns", "orders"], "update") {
//!         println!("may approve returns");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`permissions`] - Model, evaluator, session guard and route guards
//! - [`store`] - Versioned snapshot holder with last-write-wins loads
//! - [`cache`] - Decision memoization keyed by snapshot version
//! - [`sources`] - Where snapshots come from (HTTP, file, in-memory)
//! - [`config`] - TOML + environment configuration
//! - [`logging`] - Structured logger for the standard `log` crate

pub mod cache;
pub mod config; // Configuration system with TOML support
pub mod error;
pub mod logging; // Structured logging with standard log crate integration
pub mod permissions;
pub mod sources;
pub mod store;

// Prelude module for convenient imports
pub mod prelude;

// Re-exports of main types and traits
pub use error::FetchError;
pub use permissions::{
    evaluate, Action, ActorSnapshot, Grant, LegacyRole, PermissionEvaluator, PermissionGuard,
    PermissionQuery, Resource, Role,
};
pub use sources::PermissionSource;
pub use store::{LoadedSnapshot, PermissionStore};

/// Result type for snapshot loading
pub type Result<T> = std::result::Result<T, FetchError>;
