//! File-backed permission source
//!
//! Reads a JSON document holding either one actor snapshot or an array of
//! them. The file is re-read on every fetch so edits show up on refresh.

use super::{snapshot_from_value, unwrap_envelope, PermissionSource};
use crate::error::FetchError;
use crate::permissions::ActorSnapshot;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// JSON file permission source
#[derive(Debug, Clone)]
pub struct FilePermissionSource {
    path: PathBuf,
}

impl FilePermissionSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn id_of(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

#[async_trait::async_trait]
impl PermissionSource for FilePermissionSource {
    async fn fetch(&self, actor_id: &str) -> Result<ActorSnapshot, FetchError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let document: Value = serde_json::from_str(&content)?;

        match unwrap_envelope(document) {
            Value::Array(actors) => actors
                .into_iter()
                .find(|actor| id_of(actor).as_deref() == Some(actor_id))
                .map(|actor| snapshot_from_value(actor, actor_id))
                .unwrap_or_else(|| Err(FetchError::NotFound(actor_id.to_string()))),
            single => match id_of(&single) {
                Some(id) if id != actor_id => Err(FetchError::NotFound(actor_id.to_string())),
                _ => snapshot_from_value(single, actor_id),
            },
        }
    }

    fn name(&self) -> &str {
        "file"
    }
}
