//! Permission sources
//!
//! A source performs the single outbound read of this crate: fetch an actor's
//! current roles and grants. Implement [`PermissionSource`] to plug in a new
//! backend (HTTP service, file, in-memory fixture).

pub mod file;
pub mod http;
pub mod memory;

pub use file::FilePermissionSource;
pub use http::HttpPermissionSource;
pub use memory::StaticPermissionSource;

use crate::config::SourceConfig;
use crate::error::FetchError;
use crate::permissions::ActorSnapshot;
use serde_json::Value;

/// Where actor snapshots come from
#[async_trait::async_trait]
pub trait PermissionSource: Send + Sync {
    /// Fetch the current snapshot for `actor_id`
    async fn fetch(&self, actor_id: &str) -> Result<ActorSnapshot, FetchError>;

    /// Source name for logging and identification
    fn name(&self) -> &str;
}

#[async_trait::async_trait]
impl<S: PermissionSource + ?Sized> PermissionSource for std::sync::Arc<S> {
    async fn fetch(&self, actor_id: &str) -> Result<ActorSnapshot, FetchError> {
        (**self).fetch(actor_id).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait::async_trait]
impl<S: PermissionSource + ?Sized> PermissionSource for Box<S> {
    async fn fetch(&self, actor_id: &str) -> Result<ActorSnapshot, FetchError> {
        (**self).fetch(actor_id).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Build the source described by `config`
pub fn from_config(config: &SourceConfig) -> Result<Box<dyn PermissionSource>, FetchError> {
    match config.kind.as_str() {
        "file" => Ok(Box::new(FilePermissionSource::new(&config.file_path))),
        _ => Ok(Box::new(HttpPermissionSource::from_config(config)?)),
    }
}

/// Decode a snapshot document as served by the permission service
///
/// Accepts the bare snapshot or the API client's `{"data": {...}}` envelope.
/// An empty `id` is filled in with the requested actor id.
pub fn decode_snapshot(body: &str, actor_id: &str) -> Result<ActorSnapshot, FetchError> {
    let value: Value = serde_json::from_str(body)?;
    snapshot_from_value(unwrap_envelope(value), actor_id)
}

pub(crate) fn snapshot_from_value(
    value: Value,
    actor_id: &str,
) -> Result<ActorSnapshot, FetchError> {
    if !value.is_object() {
        return Err(FetchError::Decode("snapshot must be a JSON object".to_string()));
    }

    let mut snapshot: ActorSnapshot = serde_json::from_value(value)?;
    if snapshot.id.is_empty() {
        snapshot.id = actor_id.to_string();
    } else if snapshot.id != actor_id {
        return Err(FetchError::Decode(format!(
            "snapshot is for actor {}, requested {}",
            snapshot.id, actor_id
        )));
    }
    Ok(snapshot)
}

pub(crate) fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut fields)
            if !fields.contains_key("roles") && fields.contains_key("data") =>
        {
            fields.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_bare_snapshot() {
        let snapshot = decode_snapshot(r#"{"id": "act_9", "roles": []}"#, "act_9").unwrap();
        assert_eq!(snapshot.id, "act_9");
        assert!(snapshot.roles.is_empty());
    }

    #[test]
    fn test_decode_enveloped_snapshot_fills_id() {
        let body = r#"{"data": {"legacyRole": "owner", "roles": []}}"#;
        let snapshot = decode_snapshot(body, "act_3").unwrap();

        assert_eq!(snapshot.id, "act_3");
        assert!(snapshot.is_owner());
    }

    #[test]
    fn test_decode_rejects_snapshot_for_another_actor() {
        let body = r#"{"id": "act_owner", "legacyRole": "owner", "roles": []}"#;

        let err = decode_snapshot(body, "act_clerk").unwrap_err();
        assert!(matches!(err, FetchError::Decode(ref msg) if msg.contains("act_owner")));
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        assert!(matches!(decode_snapshot("[1, 2]", "act_1"), Err(FetchError::Decode(_))));
        assert!(matches!(decode_snapshot("nope", "act_1"), Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_from_config_picks_file_source() {
        let config = SourceConfig {
            kind: "file".to_string(),
            file_path: "./permissions.json".to_string(),
            ..SourceConfig::default()
        };
        let source = from_config(&config).unwrap();
        assert_eq!(source.name(), "file");
    }
}
