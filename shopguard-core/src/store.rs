//! Permission store
//!
//! Holds the most recently fetched actor snapshot and the evaluation cache
//! tied to it. The store owns no business logic; it only decides which
//! snapshot is current.
//!
//! - Every successful load bumps the snapshot version.
//! - A failed load keeps the previous snapshot for [`PermissionStore::current`]
//!   but marks the store degraded, and [`PermissionStore::usable`] returns
//!   nothing until a load succeeds. Evaluation fails closed meanwhile.
//! - Loads are last-write-wins: each takes a ticket when issued, and a result
//!   whose ticket is no longer the newest is discarded.
//! - No lock is held across the fetch, so readers keep using the previous
//!   snapshot while a load is in flight.

use crate::cache::EvaluationCache;
use crate::error::FetchError;
use crate::permissions::ActorSnapshot;
use crate::sources::PermissionSource;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A snapshot together with the version it was loaded as
#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub snapshot: Arc<ActorSnapshot>,
    pub version: u64,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Default)]
struct StoreState {
    current: Option<LoadedSnapshot>,

    /// Monotonic, bumped on every successful load and never reused
    version: u64,

    /// Message of the last failed load, cleared by a successful one
    last_error: Option<String>,
}

/// Snapshot holder for one actor session
pub struct PermissionStore<S> {
    source: S,
    state: RwLock<StoreState>,
    cache: EvaluationCache,

    /// Ticket of the most recently issued load or invalidation
    issued: AtomicU64,
}

impl<S: PermissionSource> PermissionStore<S> {
    pub fn new(source: S) -> Self {
        Self::with_cache(source, EvaluationCache::default())
    }

    pub fn with_cache(source: S, cache: EvaluationCache) -> Self {
        Self {
            source,
            state: RwLock::new(StoreState::default()),
            cache,
            issued: AtomicU64::new(0),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Fetch the current roles and grants for `actor_id`
    ///
    /// On success the snapshot becomes current under a new version and the
    /// evaluation cache is cleared. On failure the error is returned, the
    /// previous snapshot is kept and the store is degraded. If another load or
    /// an invalidation was issued while this one was in flight, the result is
    /// dropped and [`FetchError::Superseded`] is returned.
    pub async fn load(&self, actor_id: &str) -> Result<LoadedSnapshot, FetchError> {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!(
            "Loading permissions for {} from {} source (ticket {})",
            actor_id,
            self.source.name(),
            ticket
        );

        let fetched = self.source.fetch(actor_id).await;

        let mut state = self.write_state();
        if self.issued.load(Ordering::SeqCst) != ticket {
            log::info!("Discarding permissions load #{} for {}: superseded", ticket, actor_id);
            return Err(FetchError::Superseded { ticket });
        }

        match fetched {
            Ok(snapshot) => {
                state.version += 1;
                let loaded = LoadedSnapshot {
                    snapshot: Arc::new(snapshot),
                    version: state.version,
                    loaded_at: Utc::now(),
                };
                state.current = Some(loaded.clone());
                state.last_error = None;
                self.cache.advance_to(loaded.version);

                log::info!(
                    "Loaded permissions for {}: {} role(s), version {}",
                    actor_id,
                    loaded.snapshot.roles.len(),
                    loaded.version
                );
                Ok(loaded)
            }
            Err(err) => {
                log::warn!("Failed to load permissions for {}: {}", actor_id, err);
                state.last_error = Some(err.to_string());
                self.cache.clear();
                Err(err)
            }
        }
    }

    /// Discard the snapshot and every cached decision
    ///
    /// Loads still in flight are superseded; the next evaluation fails closed
    /// until a fresh load completes.
    pub fn invalidate(&self) {
        let mut state = self.write_state();
        self.issued.fetch_add(1, Ordering::SeqCst);
        state.current = None;
        state.last_error = None;
        self.cache.clear();
        log::debug!("Permission snapshot invalidated (version {})", state.version);
    }

    /// Latest good snapshot, even while degraded
    pub fn current(&self) -> Option<Arc<ActorSnapshot>> {
        self.read_state().current.as_ref().map(|loaded| Arc::clone(&loaded.snapshot))
    }

    /// Snapshot evaluation may use: `None` when never loaded, invalidated, or degraded
    pub fn usable(&self) -> Option<LoadedSnapshot> {
        let state = self.read_state();
        if state.last_error.is_some() {
            return None;
        }
        state.current.clone()
    }

    /// Whether the last load failed
    pub fn is_degraded(&self) -> bool {
        self.read_state().last_error.is_some()
    }

    pub fn last_error(&self) -> Option<String> {
        self.read_state().last_error.clone()
    }

    /// Version of the latest successful load, 0 before the first
    pub fn version(&self) -> u64 {
        self.read_state().version
    }

    pub fn cache(&self) -> &EvaluationCache {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
