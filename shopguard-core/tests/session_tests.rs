//! Session-level tests: loads racing each other, reloads and fail-closed checks

use async_trait::async_trait;
use shopguard_core::prelude::*;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

/// Source whose fetches block until the test releases them, in call order
struct GatedSource {
    calls: AtomicUsize,
    gates: Mutex<Vec<Option<(oneshot::Receiver<()>, ActorSnapshot)>>>,
    started: mpsc::UnboundedSender<usize>,
}

impl GatedSource {
    fn new(
        snapshots: Vec<ActorSnapshot>,
    ) -> (Self, Vec<oneshot::Sender<()>>, mpsc::UnboundedReceiver<usize>) {
        let mut gates = Vec::new();
        let mut releases = Vec::new();
        for snapshot in snapshots {
            let (tx, rx) = oneshot::channel();
            gates.push(Some((rx, snapshot)));
            releases.push(tx);
        }
        let (started, started_rx) = mpsc::unbounded_channel();
        let source = Self { calls: AtomicUsize::new(0), gates: Mutex::new(gates), started };
        (source, releases, started_rx)
    }
}

#[async_trait]
impl PermissionSource for GatedSource {
    async fn fetch(&self, _actor_id: &str) -> Result<ActorSnapshot, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap()[call].take();
        let (release, snapshot) = gate.expect("fetch called more often than gated");

        self.started.send(call).unwrap();
        release.await.map_err(|_| FetchError::Transport("gate dropped".to_string()))?;
        Ok(snapshot)
    }

    fn name(&self) -> &str {
        "gated"
    }
}

fn with_grant(resource: &str, actions: &[&str]) -> ActorSnapshot {
    ActorSnapshot::new("act_1")
        .with_role(Role::new("Staff").with_grant(Grant::new(resource, actions.to_vec())))
}

#[tokio::test]
async fn test_newer_load_wins_even_if_older_finishes_last() {
    let (source, mut releases, mut started) =
        GatedSource::new(vec![with_grant("orders", &["read"]), with_grant("coupons", &["read"])]);
    let guard = Arc::new(PermissionGuard::new(source, "act_1"));

    let first = tokio::spawn({
        let guard = Arc::clone(&guard);
        async move { guard.refresh().await }
    });
    assert_eq!(started.recv().await, Some(0));

    let second = tokio::spawn({
        let guard = Arc::clone(&guard);
        async move { guard.refresh().await }
    });
    assert_eq!(started.recv().await, Some(1));

    // Second finishes first, then the older response arrives
    releases.remove(1).send(()).unwrap();
    assert_eq!(second.await.unwrap().unwrap(), 1);

    releases.remove(0).send(()).unwrap();
    let stale = first.await.unwrap().unwrap_err();
    assert!(stale.is_superseded());

    assert!(guard.can("coupons", "read"));
    assert!(!guard.can("orders", "read"));
    assert_eq!(guard.snapshot_version(), Some(1));
    assert!(!guard.store().is_degraded());
}

#[tokio::test]
async fn test_older_load_finishing_first_is_still_discarded() {
    let (source, mut releases, mut started) =
        GatedSource::new(vec![with_grant("orders", &["read"]), with_grant("coupons", &["read"])]);
    let guard = Arc::new(PermissionGuard::new(source, "act_1"));

    let first = tokio::spawn({
        let guard = Arc::clone(&guard);
        async move { guard.refresh().await }
    });
    started.recv().await;
    let second = tokio::spawn({
        let guard = Arc::clone(&guard);
        async move { guard.refresh().await }
    });
    started.recv().await;

    releases.remove(0).send(()).unwrap();
    assert!(first.await.unwrap().unwrap_err().is_superseded());
    assert!(guard.store().current().is_none());

    releases.remove(0).send(()).unwrap();
    second.await.unwrap().unwrap();
    assert!(guard.can("coupons", "read"));
}

#[tokio::test]
async fn test_checks_use_previous_snapshot_while_loading() {
    let (source, mut releases, mut started) =
        GatedSource::new(vec![with_grant("orders", &["read"]), with_grant("returns", &["read"])]);
    let guard = Arc::new(PermissionGuard::new(source, "act_1"));

    releases.remove(0).send(()).unwrap();
    guard.refresh().await.unwrap();
    started.recv().await;

    let reload = tokio::spawn({
        let guard = Arc::clone(&guard);
        async move { guard.refresh().await }
    });
    started.recv().await;

    // In flight: previous grants still answer
    assert!(guard.can("orders", "read"));
    assert!(!guard.can("returns", "read"));

    releases.remove(0).send(()).unwrap();
    assert_eq!(reload.await.unwrap().unwrap(), 2);

    assert!(!guard.can("orders", "read"));
    assert!(guard.can("returns", "read"));
}

#[tokio::test]
async fn test_invalidate_supersedes_in_flight_load() {
    let (source, mut releases, mut started) = GatedSource::new(vec![with_grant("orders", &["read"])]);
    let guard = Arc::new(PermissionGuard::new(source, "act_1"));

    let load = tokio::spawn({
        let guard = Arc::clone(&guard);
        async move { guard.refresh().await }
    });
    started.recv().await;

    guard.invalidate();
    releases.remove(0).send(()).unwrap();

    assert!(load.await.unwrap().unwrap_err().is_superseded());
    assert!(!guard.can("orders", "read"));
    assert_eq!(guard.snapshot_version(), None);
}

#[tokio::test]
async fn test_authorize_uses_newer_snapshot_when_its_load_is_superseded() {
    let (source, mut releases, mut started) =
        GatedSource::new(vec![with_grant("orders", &["read"]), with_grant("orders", &["read"])]);
    let guard = Arc::new(PermissionGuard::new(source, "act_1"));

    let on_demand = tokio::spawn({
        let guard = Arc::clone(&guard);
        async move { guard.authorize(&["orders"], "read").await }
    });
    started.recv().await;

    let refresh = tokio::spawn({
        let guard = Arc::clone(&guard);
        async move { guard.refresh().await }
    });
    started.recv().await;

    releases.remove(1).send(()).unwrap();
    assert_eq!(refresh.await.unwrap().unwrap(), 1);

    releases.remove(0).send(()).unwrap();
    assert!(on_demand.await.unwrap());
    assert_eq!(guard.snapshot_version(), Some(1));
}

#[tokio::test]
async fn test_reload_after_invalidate_recomputes_decisions() {
    let source = StaticPermissionSource::new().with_actor(with_grant("orders", &["read"]));
    let guard = PermissionGuard::new(source.clone(), "act_1");

    guard.refresh().await.unwrap();
    assert!(guard.can("orders", "read"));
    assert!(guard.can("orders", "read"));
    assert_eq!(guard.cache_stats().hits, 1);

    // Grant revoked server-side
    source.upsert(with_grant("orders", &["update"]));
    guard.invalidate();
    assert!(!guard.can("orders", "read"));

    assert_eq!(guard.refresh().await.unwrap(), 2);
    assert!(!guard.can("orders", "read"));
    assert!(guard.can("orders", "update"));
}

#[tokio::test]
async fn test_failed_reload_fails_closed_until_next_success() {
    let source = StaticPermissionSource::new().with_actor(with_grant("orders", &["read"]));
    let guard = PermissionGuard::new(source.clone(), "act_1");
    guard.refresh().await.unwrap();

    source.remove("act_1");
    assert!(matches!(guard.refresh().await, Err(FetchError::NotFound(_))));

    assert!(guard.store().current().is_some());
    assert!(!guard.can("orders", "read"));

    source.upsert(with_grant("orders", &["read"]));
    guard.refresh().await.unwrap();
    assert!(guard.can("orders", "read"));
}

#[tokio::test]
async fn test_concurrent_checks_agree() {
    let source = StaticPermissionSource::new().with_actor(with_grant("orders", &["read"]));
    let guard = Arc::new(PermissionGuard::new(source, "act_1"));
    guard.refresh().await.unwrap();

    let checks = (0..16).map(|i| {
        let guard = Arc::clone(&guard);
        tokio::spawn(async move {
            let action = if i % 2 == 0 { "read" } else { "delete" };
            (action, guard.can("orders", action))
        })
    });

    for result in futures::future::join_all(checks).await {
        let (action, allowed) = result.unwrap();
        assert_eq!(allowed, action == "read");
    }
    assert!(guard.cache_stats().entries <= 2);
}

#[tokio::test]
async fn test_owner_from_file_passes_everything() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"data": {{"id": "act_7", "legacyRole": "OWNER", "roles": []}}}}"#
    )
    .unwrap();

    let guard = PermissionGuard::new(FilePermissionSource::new(file.path()), "act_7");
    guard.refresh().await.unwrap();

    assert!(guard.check(&["settings", "roles"], "delete"));
    assert!(guard.can("anything", "whatever"));
    assert_eq!(visible_entries(&guard, &dashboard_routes()).len(), dashboard_routes().len());
}
