use crate::adapter::{Ctx, ProtocolAdapter, SyncOptions};
use crate::error::{ManagerError, ProtocolError};
use crate::kind::ProtocolKind;
use crate::result::{ProtocolResult, ProtocolStats};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Clamp an adapter call to the context deadline.
async fn bounded<T>(
    ctx: &Ctx,
    fut: impl Future<Output = Result<T, ProtocolError>>,
    on_deadline: impl FnOnce() -> ProtocolError,
) -> Result<T, ProtocolError> {
    match ctx.deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, fut)
            .await
            .unwrap_or_else(|_| Err(on_deadline())),
        None => fut.await,
    }
}

/// Coordinates a fixed, injected collection of protocol adapters.
///
/// Lifecycle calls fan out to every adapter concurrently and every outcome
/// is awaited; the aggregate policy is all-or-nothing. Per-site operations
/// are delegated one adapter at a time — protocol selection for a site is
/// the caller's policy, read from the site configuration — and concurrent
/// syncs for the same (protocol, site) pair serialize through a per-key
/// lock. Adapters own their network state exclusively; the manager never
/// reaches inside them.
pub struct ProtocolManager {
    adapters: BTreeMap<ProtocolKind, Arc<dyn ProtocolAdapter>>,
    site_locks: DashMap<(ProtocolKind, String), Arc<Mutex<()>>>,
}

impl ProtocolManager {
    /// Build a manager over the given adapters. A later adapter for the
    /// same kind replaces an earlier one.
    pub fn new(adapters: impl IntoIterator<Item = Arc<dyn ProtocolAdapter>>) -> Self {
        Self {
            adapters: adapters
                .into_iter()
                .map(|adapter| (adapter.kind(), adapter))
                .collect(),
            site_locks: DashMap::new(),
        }
    }

    /// Kinds with a registered adapter, in stable order.
    pub fn kinds(&self) -> impl Iterator<Item = ProtocolKind> + '_ {
        self.adapters.keys().copied()
    }

    pub fn adapter(&self, kind: ProtocolKind) -> Option<Arc<dyn ProtocolAdapter>> {
        self.adapters.get(&kind).cloned()
    }

    /// Start every adapter concurrently and await all outcomes.
    ///
    /// All-or-nothing with rollback: if any adapter fails to load, the ones
    /// that succeeded are unloaded (best effort, errors logged) before the
    /// aggregate error reports every failing protocol. A failed `load`
    /// therefore leaves the manager restartable.
    pub async fn load(&self) -> Result<(), ManagerError> {
        let mut handles = Vec::with_capacity(self.adapters.len());
        for (kind, adapter) in &self.adapters {
            let kind = *kind;
            let adapter = Arc::clone(adapter);
            handles.push((kind, tokio::spawn(async move { adapter.load().await })));
        }

        let mut loaded = Vec::new();
        let mut failures = Vec::new();
        for (kind, handle) in handles {
            match handle.await {
                Ok(Ok(())) => loaded.push(kind),
                Ok(Err(err)) => failures.push((kind, err)),
                Err(join_err) => failures.push((kind, ProtocolError::load(kind, join_err))),
            }
        }

        if failures.is_empty() {
            tracing::info!(adapters = self.adapters.len(), "protocol adapters loaded");
            return Ok(());
        }

        for kind in loaded {
            if let Some(adapter) = self.adapter(kind) {
                if let Err(err) = adapter.unload().await {
                    tracing::warn!(%kind, error = %err, "rollback unload failed");
                }
            }
        }
        Err(ManagerError::LoadFailed { failures })
    }

    /// Concurrent teardown of every adapter; all outcomes are awaited and
    /// every failure is reported.
    pub async fn unload(&self) -> Result<(), ManagerError> {
        let mut handles = Vec::with_capacity(self.adapters.len());
        for (kind, adapter) in &self.adapters {
            let kind = *kind;
            let adapter = Arc::clone(adapter);
            handles.push((kind, tokio::spawn(async move { adapter.unload().await })));
        }

        let mut failures = Vec::new();
        for (kind, handle) in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => failures.push((kind, err)),
                Err(join_err) => failures.push((kind, ProtocolError::unload(kind, join_err))),
            }
        }

        if failures.is_empty() {
            tracing::info!("protocol adapters unloaded");
            Ok(())
        } else {
            Err(ManagerError::UnloadFailed { failures })
        }
    }

    fn site_lock(&self, kind: ProtocolKind, site_id: &str) -> Arc<Mutex<()>> {
        self.site_locks
            .entry((kind, site_id.to_string()))
            .or_default()
            .clone()
    }

    /// Drop the lock entry once no call holds or awaits it, so the map
    /// tracks in-flight pairs rather than every pair ever touched.
    fn release_site_lock(&self, kind: ProtocolKind, site_id: &str) {
        self.site_locks
            .remove_if(&(kind, site_id.to_string()), |_, lock| {
                Arc::strong_count(lock) == 1
            });
    }

    /// Publish `content` for `site_id` on one protocol. Concurrent syncs
    /// for the same (protocol, site) pair run one at a time; different
    /// pairs are independent.
    pub async fn sync(
        &self,
        kind: ProtocolKind,
        site_id: &str,
        content: &Path,
        options: &SyncOptions,
        ctx: &Ctx,
    ) -> Result<ProtocolResult, ProtocolError> {
        let adapter = self
            .adapter(kind)
            .ok_or_else(|| ProtocolError::sync(kind, site_id, no_adapter(kind)))?;
        let lock = self.site_lock(kind, site_id);
        // The deadline covers the lock wait as well as the adapter call: a
        // stalled sibling sync cannot pin this caller past its budget.
        let outcome = bounded(
            ctx,
            async {
                let _guard = lock.lock().await;
                adapter.sync(site_id, content, options, ctx).await
            },
            || ProtocolError::sync(kind, site_id, deadline_exceeded()),
        )
        .await;
        drop(lock);
        self.release_site_lock(kind, site_id);
        outcome
    }

    /// Reverse a publication on one protocol. Safe to repeat.
    pub async fn unsync(
        &self,
        kind: ProtocolKind,
        site_id: &str,
        last_known: Option<&ProtocolResult>,
        ctx: &Ctx,
    ) -> Result<(), ProtocolError> {
        let adapter = self
            .adapter(kind)
            .ok_or_else(|| ProtocolError::unsync(kind, site_id, no_adapter(kind)))?;
        let lock = self.site_lock(kind, site_id);
        let outcome = bounded(
            ctx,
            async {
                let _guard = lock.lock().await;
                adapter.unsync(site_id, last_known, ctx).await
            },
            || ProtocolError::unsync(kind, site_id, deadline_exceeded()),
        )
        .await;
        drop(lock);
        self.release_site_lock(kind, site_id);
        outcome
    }

    /// Live metrics for one (protocol, site) pair. Zero values when the
    /// protocol has no adapter or no session for the site.
    pub async fn stats(&self, kind: ProtocolKind, site_id: &str) -> ProtocolStats {
        match self.adapter(kind) {
            Some(adapter) => adapter.stats(site_id).await,
            None => ProtocolStats::default(),
        }
    }

    /// Publish on several protocols, reporting each outcome separately so
    /// one protocol's failure never masks a sibling's success.
    pub async fn sync_many(
        &self,
        kinds: &[ProtocolKind],
        site_id: &str,
        content: &Path,
        options: &SyncOptions,
        ctx: &Ctx,
    ) -> BTreeMap<ProtocolKind, Result<ProtocolResult, ProtocolError>> {
        let mut outcomes = BTreeMap::new();
        for &kind in kinds {
            let outcome = self.sync(kind, site_id, content, options, ctx).await;
            outcomes.insert(kind, outcome);
        }
        outcomes
    }

    /// Unpublish from several protocols, one outcome per protocol.
    pub async fn unsync_many(
        &self,
        kinds: &[ProtocolKind],
        site_id: &str,
        last_known: &BTreeMap<ProtocolKind, ProtocolResult>,
        ctx: &Ctx,
    ) -> BTreeMap<ProtocolKind, Result<(), ProtocolError>> {
        let mut outcomes = BTreeMap::new();
        for &kind in kinds {
            let outcome = self
                .unsync(kind, site_id, last_known.get(&kind), ctx)
                .await;
            outcomes.insert(kind, outcome);
        }
        outcomes
    }
}

fn no_adapter(kind: ProtocolKind) -> anyhow::Error {
    anyhow::anyhow!("no adapter registered for {kind}")
}

fn deadline_exceeded() -> anyhow::Error {
    anyhow::anyhow!("deadline exceeded")
}
