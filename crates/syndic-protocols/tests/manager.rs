//! Manager coordination tests over in-process mock adapters.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use syndic_protocols::{
    helpers, Ctx, ManagerError, ProtocolAdapter, ProtocolError, ProtocolKind, ProtocolManager,
    ProtocolResult, ProtocolStats, SyncOptions,
};

/// Mock adapter: counts lifecycle calls, tracks synced sites, and can be
/// told to fail loading or to stall inside sync.
struct MockAdapter {
    kind: ProtocolKind,
    fail_load: bool,
    sync_delay: Duration,
    loads: AtomicUsize,
    unloads: AtomicUsize,
    synced: AtomicBool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockAdapter {
    fn new(kind: ProtocolKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            fail_load: false,
            sync_delay: Duration::ZERO,
            loads: AtomicUsize::new(0),
            unloads: AtomicUsize::new(0),
            synced: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    fn failing_load(kind: ProtocolKind) -> Arc<Self> {
        let mut adapter = Self::new(kind);
        Arc::get_mut(&mut adapter).unwrap().fail_load = true;
        adapter
    }

    fn slow_sync(kind: ProtocolKind, delay: Duration) -> Arc<Self> {
        let mut adapter = Self::new(kind);
        Arc::get_mut(&mut adapter).unwrap().sync_delay = delay;
        adapter
    }

    fn result_for(&self, site_id: &str) -> ProtocolResult {
        match self.kind {
            ProtocolKind::Mirror => ProtocolResult::Mirror {
                enabled: true,
                link: format!("https://mirror.example/{site_id}"),
            },
            ProtocolKind::ContentAddressed => ProtocolResult::ContentAddressed {
                enabled: true,
                link: format!("ca://{site_id}"),
                gateway: format!("https://gateway.example/ca/{site_id}"),
                content_id: "example-cid".into(),
                public_key: "ca://example-pubkey".into(),
                name_alias: format!("/ca/{site_id}"),
            },
            ProtocolKind::PeerDiscovery => ProtocolResult::PeerDiscovery {
                enabled: true,
                link: format!("swarm://{site_id}"),
                gateway: format!("https://gateway.example/swarm/{site_id}"),
                discovery_key: "example-discovery-key".into(),
                name_alias: format!("/swarm/{site_id}"),
            },
        }
    }
}

#[async_trait]
impl ProtocolAdapter for MockAdapter {
    fn kind(&self) -> ProtocolKind {
        self.kind
    }

    async fn load(&self) -> Result<(), ProtocolError> {
        if self.fail_load {
            return Err(ProtocolError::load(
                self.kind,
                anyhow::anyhow!("network bootstrap refused"),
            ));
        }
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn unload(&self) -> Result<(), ProtocolError> {
        self.unloads.fetch_add(1, Ordering::SeqCst);
        helpers::noop().await
    }

    async fn sync(
        &self,
        site_id: &str,
        _content: &Path,
        _options: &SyncOptions,
        _ctx: &Ctx,
    ) -> Result<ProtocolResult, ProtocolError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if !self.sync_delay.is_zero() {
            tokio::time::sleep(self.sync_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.synced.store(true, Ordering::SeqCst);
        Ok(self.result_for(site_id))
    }

    async fn unsync(
        &self,
        _site_id: &str,
        _last_known: Option<&ProtocolResult>,
        _ctx: &Ctx,
    ) -> Result<(), ProtocolError> {
        // Idempotent by construction: clearing twice is still cleared.
        self.synced.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn stats(&self, _site_id: &str) -> ProtocolStats {
        if self.synced.load(Ordering::SeqCst) {
            ProtocolStats { peer_count: 4 }
        } else {
            helpers::no_peers()
        }
    }
}

/// Adapter whose sync always fails; lifecycle is fine.
struct BrokenSyncAdapter(ProtocolKind);

#[async_trait]
impl ProtocolAdapter for BrokenSyncAdapter {
    fn kind(&self) -> ProtocolKind {
        self.0
    }

    async fn load(&self) -> Result<(), ProtocolError> {
        helpers::noop().await
    }

    async fn unload(&self) -> Result<(), ProtocolError> {
        helpers::noop().await
    }

    async fn sync(
        &self,
        site_id: &str,
        _content: &Path,
        _options: &SyncOptions,
        _ctx: &Ctx,
    ) -> Result<ProtocolResult, ProtocolError> {
        Err(ProtocolError::sync(
            self.0,
            site_id,
            anyhow::anyhow!("gateway unreachable"),
        ))
    }

    async fn unsync(
        &self,
        _site_id: &str,
        _last_known: Option<&ProtocolResult>,
        _ctx: &Ctx,
    ) -> Result<(), ProtocolError> {
        Ok(())
    }

    async fn stats(&self, _site_id: &str) -> ProtocolStats {
        helpers::no_peers()
    }
}

fn full_manager() -> (ProtocolManager, Arc<MockAdapter>, Arc<MockAdapter>, Arc<MockAdapter>) {
    let mirror = MockAdapter::new(ProtocolKind::Mirror);
    let content = MockAdapter::new(ProtocolKind::ContentAddressed);
    let swarm = MockAdapter::new(ProtocolKind::PeerDiscovery);
    let manager = ProtocolManager::new([
        mirror.clone() as Arc<dyn ProtocolAdapter>,
        content.clone() as Arc<dyn ProtocolAdapter>,
        swarm.clone() as Arc<dyn ProtocolAdapter>,
    ]);
    (manager, mirror, content, swarm)
}

#[tokio::test]
async fn load_unload_load_restarts_cleanly() {
    let (manager, mirror, content, swarm) = full_manager();

    manager.load().await.expect("first load");
    manager.unload().await.expect("unload");
    manager.load().await.expect("reload");

    for adapter in [&mirror, &content, &swarm] {
        assert_eq!(adapter.loads.load(Ordering::SeqCst), 2);
        assert_eq!(adapter.unloads.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test]
async fn failed_load_names_the_culprit_and_rolls_back_survivors() {
    // The content-addressed adapter refuses to load while mirror and
    // peer-discovery come up fine.
    let mirror = MockAdapter::new(ProtocolKind::Mirror);
    let content = MockAdapter::failing_load(ProtocolKind::ContentAddressed);
    let swarm = MockAdapter::new(ProtocolKind::PeerDiscovery);
    let manager = ProtocolManager::new([
        mirror.clone() as Arc<dyn ProtocolAdapter>,
        content.clone() as Arc<dyn ProtocolAdapter>,
        swarm.clone() as Arc<dyn ProtocolAdapter>,
    ]);

    let err = manager.load().await.unwrap_err();
    match &err {
        ManagerError::LoadFailed { failures } => {
            let kinds: Vec<_> = failures.iter().map(|(kind, _)| *kind).collect();
            assert_eq!(kinds, vec![ProtocolKind::ContentAddressed]);
        }
        other => panic!("expected LoadFailed, got {other:?}"),
    }
    assert!(err.to_string().contains("content-addressed"));

    // Rollback policy: the survivors were unloaded again.
    assert_eq!(mirror.unloads.load(Ordering::SeqCst), 1);
    assert_eq!(swarm.unloads.load(Ordering::SeqCst), 1);
    assert_eq!(content.unloads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn content_sync_returns_the_full_variant() {
    let (manager, _, _, _) = full_manager();
    manager.load().await.unwrap();

    let result = manager
        .sync(
            ProtocolKind::ContentAddressed,
            "site-1",
            Path::new("/srv/sites/site-1"),
            &SyncOptions::default(),
            &Ctx::default(),
        )
        .await
        .unwrap();

    let value = serde_json::to_value(&result).unwrap();
    for field in [
        "enabled",
        "link",
        "gateway",
        "contentId",
        "publicKey",
        "nameAlias",
    ] {
        assert!(value.get(field).is_some(), "missing field {field}");
    }
}

#[tokio::test]
async fn stats_for_never_synced_site_are_zero() {
    let (manager, _, _, swarm) = full_manager();
    manager.load().await.unwrap();

    let stats = manager.stats(ProtocolKind::PeerDiscovery, "site-1").await;
    assert_eq!(stats, ProtocolStats { peer_count: 0 });

    manager
        .sync(
            ProtocolKind::PeerDiscovery,
            "site-1",
            Path::new("/srv/sites/site-1"),
            &SyncOptions::default(),
            &Ctx::default(),
        )
        .await
        .unwrap();
    assert_eq!(
        manager.stats(ProtocolKind::PeerDiscovery, "site-1").await,
        ProtocolStats { peer_count: 4 }
    );
    assert!(swarm.synced.load(Ordering::SeqCst));
}

#[tokio::test]
async fn same_site_syncs_serialize_different_sites_do_not() {
    let slow = MockAdapter::slow_sync(ProtocolKind::Mirror, Duration::from_millis(30));
    let manager = ProtocolManager::new([slow.clone() as Arc<dyn ProtocolAdapter>]);
    manager.load().await.unwrap();

    let content = Path::new("/srv/sites/site-1");
    let options = SyncOptions::default();
    let ctx = Ctx::default();

    let (a, b) = tokio::join!(
        manager.sync(ProtocolKind::Mirror, "site-1", content, &options, &ctx),
        manager.sync(ProtocolKind::Mirror, "site-1", content, &options, &ctx),
    );
    a.unwrap();
    b.unwrap();
    assert_eq!(slow.max_in_flight.load(Ordering::SeqCst), 1);

    let (c, d) = tokio::join!(
        manager.sync(ProtocolKind::Mirror, "site-2", content, &options, &ctx),
        manager.sync(ProtocolKind::Mirror, "site-3", content, &options, &ctx),
    );
    c.unwrap();
    d.unwrap();
    assert_eq!(slow.max_in_flight.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn sync_many_isolates_failures_per_protocol() {
    let mirror = MockAdapter::new(ProtocolKind::Mirror);
    let broken = Arc::new(BrokenSyncAdapter(ProtocolKind::ContentAddressed));
    let swarm = MockAdapter::new(ProtocolKind::PeerDiscovery);
    let manager = ProtocolManager::new([
        mirror as Arc<dyn ProtocolAdapter>,
        broken as Arc<dyn ProtocolAdapter>,
        swarm as Arc<dyn ProtocolAdapter>,
    ]);
    manager.load().await.unwrap();

    let outcomes = manager
        .sync_many(
            &ProtocolKind::ALL,
            "site-1",
            Path::new("/srv/sites/site-1"),
            &SyncOptions::default(),
            &Ctx::default(),
        )
        .await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[&ProtocolKind::Mirror].is_ok());
    assert!(outcomes[&ProtocolKind::PeerDiscovery].is_ok());
    let err = outcomes[&ProtocolKind::ContentAddressed].as_ref().unwrap_err();
    assert_eq!(err.kind(), ProtocolKind::ContentAddressed);
}

#[tokio::test]
async fn unsync_is_idempotent_and_unsync_many_reports_per_protocol() {
    let (manager, _, _, _) = full_manager();
    manager.load().await.unwrap();

    let ctx = Ctx::default();
    manager
        .unsync(ProtocolKind::Mirror, "site-1", None, &ctx)
        .await
        .expect("unsync of a never-synced site succeeds");
    manager
        .unsync(ProtocolKind::Mirror, "site-1", None, &ctx)
        .await
        .expect("repeat unsync succeeds");

    let outcomes = manager
        .unsync_many(&ProtocolKind::ALL, "site-1", &BTreeMap::new(), &ctx)
        .await;
    assert!(outcomes.values().all(Result::is_ok));
}

#[tokio::test]
async fn sync_respects_the_context_deadline() {
    let slow = MockAdapter::slow_sync(ProtocolKind::Mirror, Duration::from_millis(200));
    let manager = ProtocolManager::new([slow as Arc<dyn ProtocolAdapter>]);
    manager.load().await.unwrap();

    let err = manager
        .sync(
            ProtocolKind::Mirror,
            "site-1",
            Path::new("/srv/sites/site-1"),
            &SyncOptions::default(),
            &Ctx::with_timeout(Duration::from_millis(20)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::Sync { .. }));
    assert_eq!(err.kind(), ProtocolKind::Mirror);
}

#[tokio::test]
async fn deadline_covers_the_site_lock_wait() {
    let slow = MockAdapter::slow_sync(ProtocolKind::Mirror, Duration::from_millis(300));
    let manager = Arc::new(ProtocolManager::new([slow as Arc<dyn ProtocolAdapter>]));
    manager.load().await.unwrap();

    // Park a deadline-less sync on the (mirror, site-1) lock.
    let background = {
        let manager = manager.clone();
        tokio::spawn(async move {
            manager
                .sync(
                    ProtocolKind::Mirror,
                    "site-1",
                    Path::new("/srv/sites/site-1"),
                    &SyncOptions::default(),
                    &Ctx::default(),
                )
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;

    // A caller with a budget must get its deadline error promptly, not
    // after the sibling releases the lock.
    let started = tokio::time::Instant::now();
    let err = manager
        .sync(
            ProtocolKind::Mirror,
            "site-1",
            Path::new("/srv/sites/site-1"),
            &SyncOptions::default(),
            &Ctx::with_timeout(Duration::from_millis(20)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::Sync { .. }));
    let waited = started.elapsed();
    assert!(
        waited < Duration::from_millis(150),
        "deadline did not cut the lock wait short: {waited:?}"
    );

    background.await.unwrap().unwrap();
}

#[tokio::test]
async fn sync_without_a_registered_adapter_is_a_scoped_error() {
    let manager = ProtocolManager::new([]);
    let err = manager
        .sync(
            ProtocolKind::Mirror,
            "site-1",
            Path::new("/srv/sites/site-1"),
            &SyncOptions::default(),
            &Ctx::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ProtocolKind::Mirror);
    assert_eq!(
        manager.stats(ProtocolKind::Mirror, "site-1").await,
        ProtocolStats::default()
    );
}
