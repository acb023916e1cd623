//! Caching module for Shopguard
//!
//! Memoizes permission decisions for one actor session. Entries are tied to
//! the snapshot version they were computed against and never outlive it.

pub mod evaluation;

pub use evaluation::{CacheKey, CacheStats, CachedDecision, EvaluationCache};
