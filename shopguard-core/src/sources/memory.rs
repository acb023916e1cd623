//! In-memory permission source
//!
//! Holds snapshots in a map. Used for embedding fixed permission sets and as
//! the fixture source in tests; `upsert` stands in for an administrator
//! editing roles on the permission service.

use super::PermissionSource;
use crate::error::FetchError;
use crate::permissions::ActorSnapshot;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Static, in-memory permission source
#[derive(Clone, Default)]
pub struct StaticPermissionSource {
    actors: Arc<RwLock<HashMap<String, ActorSnapshot>>>,
}

impl StaticPermissionSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`upsert`](Self::upsert)
    pub fn with_actor(self, snapshot: ActorSnapshot) -> Self {
        self.upsert(snapshot);
        self
    }

    /// Insert or replace the snapshot for `snapshot.id`
    pub fn upsert(&self, snapshot: ActorSnapshot) {
        let mut actors = self.actors.write().unwrap_or_else(|e| e.into_inner());
        actors.insert(snapshot.id.clone(), snapshot);
    }

    pub fn remove(&self, actor_id: &str) -> Option<ActorSnapshot> {
        let mut actors = self.actors.write().unwrap_or_else(|e| e.into_inner());
        actors.remove(actor_id)
    }

    pub fn actor_count(&self) -> usize {
        self.actors.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait::async_trait]
impl PermissionSource for StaticPermissionSource {
    async fn fetch(&self, actor_id: &str) -> Result<ActorSnapshot, FetchError> {
        let actors = self.actors.read().unwrap_or_else(|e| e.into_inner());
        actors.get(actor_id).cloned().ok_or_else(|| FetchError::NotFound(actor_id.to_string()))
    }

    fn name(&self) -> &str {
        "static"
    }
}
