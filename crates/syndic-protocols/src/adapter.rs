use crate::error::ProtocolError;
use crate::kind::ProtocolKind;
use crate::result::{ProtocolResult, ProtocolStats};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;

/// Call-scoped context threaded through network operations.
///
/// The only field today is an optional deadline; the manager clamps every
/// adapter call it relays to it so a stuck network client cannot block a
/// request indefinitely.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ctx {
    pub deadline: Option<Instant>,
}

impl Ctx {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
        }
    }
}

/// Per-sync knobs shared by all protocols.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOptions {
    /// DNS-style alias to publish alongside the raw protocol link.
    pub name_alias: Option<String>,
}

/// The uniform contract every distribution protocol implements.
///
/// Uniformity is the point: the manager treats adapters polymorphically and
/// protocols differ only in their [`ProtocolResult`] variant and in what
/// "enabled" means operationally. There is no base type; adapters without a
/// real lifecycle opt into the no-ops in [`helpers`].
#[async_trait]
pub trait ProtocolAdapter: Send + Sync {
    /// Which protocol this adapter speaks.
    fn kind(&self) -> ProtocolKind;

    /// Initialize protocol resources (connections, key material, discovery
    /// networks). Calling again after a successful load must not corrupt
    /// state.
    async fn load(&self) -> Result<(), ProtocolError>;

    /// Release resources acquired by `load`. Safe to call when `load` never
    /// ran.
    async fn unload(&self) -> Result<(), ProtocolError>;

    /// Publish the content at `content` for `site_id`. Repeatable: calling
    /// again for the same site re-publishes.
    async fn sync(
        &self,
        site_id: &str,
        content: &Path,
        options: &SyncOptions,
        ctx: &Ctx,
    ) -> Result<ProtocolResult, ProtocolError>;

    /// Reverse a publication. Idempotent: unsyncing an already-unsynced
    /// site succeeds.
    async fn unsync(
        &self,
        site_id: &str,
        last_known: Option<&ProtocolResult>,
        ctx: &Ctx,
    ) -> Result<(), ProtocolError>;

    /// Live metrics. Returns zero values, never an error, when the site has
    /// no active session on this protocol.
    async fn stats(&self, site_id: &str) -> ProtocolStats;
}

/// Shared default behaviors adapters opt into explicitly.
pub mod helpers {
    use super::{ProtocolError, ProtocolStats};

    /// No-op lifecycle step for adapters without global resources.
    pub async fn noop() -> Result<(), ProtocolError> {
        Ok(())
    }

    /// Zero-valued stats for protocols with no peer concept.
    pub fn no_peers() -> ProtocolStats {
        ProtocolStats::default()
    }
}
