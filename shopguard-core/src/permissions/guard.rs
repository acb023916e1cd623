//! Permission guard: one actor session's store, cache and evaluator

use super::evaluator::{GrantEvaluator, PermissionEvaluator, PermissionQuery};
use crate::cache::{CacheKey, CacheStats, EvaluationCache};
use crate::config::CacheConfig;
use crate::error::FetchError;
use crate::sources::PermissionSource;
use crate::store::{LoadedSnapshot, PermissionStore};
use std::sync::Arc;

/// Answers permission checks for a single actor
///
/// Checks never block on the network: they evaluate against the last usable
/// snapshot and fail closed when there is none. Use [`refresh`](Self::refresh)
/// to load, or [`authorize`](Self::authorize) to load on demand first.
pub struct PermissionGuard<S> {
    actor_id: String,
    store: PermissionStore<S>,
    evaluator: Arc<dyn PermissionEvaluator>,
    cache_enabled: bool,
}

impl<S: PermissionSource> PermissionGuard<S> {
    /// Create a guard with the default evaluator and cache
    pub fn new(source: S, actor_id: impl Into<String>) -> Self {
        Self::from_config(source, actor_id, &CacheConfig::default())
    }

    /// Create a guard whose cache follows `config`
    pub fn from_config(source: S, actor_id: impl Into<String>, config: &CacheConfig) -> Self {
        Self {
            actor_id: actor_id.into(),
            store: PermissionStore::with_cache(source, EvaluationCache::new(config.max_entries)),
            evaluator: Arc::new(GrantEvaluator),
            cache_enabled: config.enabled,
        }
    }

    /// Replace the evaluator
    pub fn with_evaluator(mut self, evaluator: Arc<dyn PermissionEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn actor_id(&self) -> &str {
        &self.actor_id
    }

    /// Load a fresh snapshot, returning its version
    pub async fn refresh(&self) -> Result<u64, FetchError> {
        self.store.load(&self.actor_id).await.map(|loaded| loaded.version)
    }

    /// Return the usable snapshot, loading one if there is none
    pub async fn ensure_loaded(&self) -> Result<LoadedSnapshot, FetchError> {
        if let Some(loaded) = self.store.usable() {
            return Ok(loaded);
        }
        self.store.load(&self.actor_id).await
    }

    /// Drop the snapshot and cached decisions
    pub fn invalidate(&self) {
        self.store.invalidate();
    }

    /// May the actor perform `action` on any of `resources`?
    pub fn check<R: AsRef<str>>(&self, resources: &[R], action: &str) -> bool {
        self.check_query(&PermissionQuery::parse(resources, action))
    }

    /// Single-resource shorthand for [`check`](Self::check)
    pub fn can(&self, resource: &str, action: &str) -> bool {
        self.check(&[resource], action)
    }

    pub fn check_query(&self, query: &PermissionQuery) -> bool {
        let Some(loaded) = self.store.usable() else {
            log::debug!("Denied {} for {}: no usable permission snapshot", query, self.actor_id);
            return false;
        };

        let evaluate = || self.evaluator.evaluate(Some(&loaded.snapshot), query);
        let allowed = if self.cache_enabled {
            let key = CacheKey::new(self.actor_id.as_str(), loaded.version, query.clone());
            self.store.cache().get_or_compute(key, evaluate)
        } else {
            evaluate()
        };

        if !allowed {
            log::debug!("Denied {} for {} (version {})", query, self.actor_id, loaded.version);
        }
        allowed
    }

    /// Load on demand, then check
    ///
    /// A failed load denies; the error is logged, not returned. If the
    /// on-demand load is superseded, the newer snapshot is used once it is in.
    pub async fn authorize<R: AsRef<str>>(&self, resources: &[R], action: &str) -> bool {
        let loaded = match self.ensure_loaded().await {
            Err(err) if err.is_superseded() => {
                log::debug!("On-demand load for {} superseded, retrying", self.actor_id);
                self.ensure_loaded().await
            }
            other => other,
        };
        if let Err(err) = loaded {
            log::warn!("Denying {} for {}: {}", action, self.actor_id, err);
            return false;
        }
        self.check(resources, action)
    }

    /// Version of the usable snapshot, if any
    pub fn snapshot_version(&self) -> Option<u64> {
        self.store.usable().map(|loaded| loaded.version)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.store.cache().stats()
    }

    pub fn store(&self) -> &PermissionStore<S> {
        &self.store
    }
}
