//! Per-session evaluation cache
//!
//! Keys carry the actor id and the snapshot version, so a decision computed
//! against version N is never served once version N+1 is loaded. Seeing a
//! newer version in a key clears the whole map; a key with an older version
//! is computed but not stored.
//!
//! The cache is bounded; when full, the least recently used entry goes.

use crate::permissions::PermissionQuery;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default bound on cached decisions per session
pub const DEFAULT_MAX_ENTRIES: usize = 1024;

/// Composite cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub actor_id: String,
    pub version: u64,
    pub query: PermissionQuery,
}

impl CacheKey {
    pub fn new(actor_id: impl Into<String>, version: u64, query: PermissionQuery) -> Self {
        Self { actor_id: actor_id.into(), version, query }
    }
}

/// A cached decision with access metadata
#[derive(Debug, Clone)]
pub struct CachedDecision {
    pub allowed: bool,

    /// When the decision was computed
    pub computed_at: DateTime<Utc>,

    /// Logical clock value of the last read, used for LRU eviction
    last_used: u64,

    /// Number of times this decision was served from cache
    pub hits: u64,
}

/// Counters since the cache was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub clears: u64,
    pub entries: usize,
    pub version: u64,
}

struct CacheState {
    version: u64,
    entries: HashMap<CacheKey, CachedDecision>,
    clock: u64,
    stats: CacheStats,
}

impl CacheState {
    fn reset(&mut self, version: u64) {
        if !self.entries.is_empty() {
            self.stats.clears += 1;
        }
        self.entries.clear();
        self.version = version;
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, decision)| decision.last_used)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            log::debug!("Evicting cached decision for {} (actor {})", key.query, key.actor_id);
            self.entries.remove(&key);
            self.stats.evictions += 1;
        }
    }
}

/// Explicitly scoped decision cache for one actor session
pub struct EvaluationCache {
    max_entries: usize,
    state: Mutex<CacheState>,
}

impl EvaluationCache {
    /// Create a cache holding at most `max_entries` decisions
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            state: Mutex::new(CacheState {
                version: 0,
                entries: HashMap::new(),
                clock: 0,
                stats: CacheStats::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached decision for `key`, or compute and remember it
    ///
    /// `compute` runs without the lock held.
    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        {
            let mut state = self.lock();

            if key.version > state.version {
                state.reset(key.version);
            }

            let now = state.tick();
            if let Some(decision) = state.entries.get_mut(&key) {
                decision.last_used = now;
                decision.hits += 1;
                let allowed = decision.allowed;
                state.stats.hits += 1;
                return allowed;
            }
            state.stats.misses += 1;
        }

        let allowed = compute();

        let mut state = self.lock();
        if key.version != state.version {
            // Computed against a snapshot that is no longer current
            return allowed;
        }

        if !state.entries.contains_key(&key) && state.entries.len() >= self.max_entries {
            state.evict_lru();
        }

        let now = state.tick();
        state.entries.insert(
            key,
            CachedDecision { allowed, computed_at: Utc::now(), last_used: now, hits: 0 },
        );
        allowed
    }

    /// Peek at a cached decision without computing
    pub fn get(&self, key: &CacheKey) -> Option<CachedDecision> {
        let state = self.lock();
        if key.version != state.version {
            return None;
        }
        state.entries.get(key).cloned()
    }

    /// Drop every entry and move to `version`
    ///
    /// Called when a new snapshot version is loaded.
    pub fn advance_to(&self, version: u64) {
        let mut state = self.lock();
        if state.version != version || !state.entries.is_empty() {
            log::debug!("Evaluation cache moving to snapshot version {}", version);
        }
        let version = version.max(state.version);
        state.reset(version);
    }

    /// Drop every entry, keeping the current version
    pub fn clear(&self) {
        let mut state = self.lock();
        let version = state.version;
        state.reset(version);
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    pub fn version(&self) -> u64 {
        self.lock().version
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats { entries: state.entries.len(), version: state.version, ..state.stats }
    }
}

impl Default for EvaluationCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}
