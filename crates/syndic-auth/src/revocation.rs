use crate::token::TokenPayload;
use async_trait::async_trait;
use dashmap::DashSet;

/// Lookup interface for explicitly invalidated tokens.
///
/// The store is externally owned; this crate only consults it. An `Err`
/// answer means the status is unknown and callers must reject the request
/// (fail closed) rather than read it as "not revoked".
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn is_revoked(&self, payload: &TokenPayload) -> anyhow::Result<bool>;
}

/// In-memory revocation set keyed by `token_id`.
///
/// Record creation stays with the surrounding issuer, which calls
/// [`MemoryRevocationStore::revoke`]; the gate only ever asks.
#[derive(Debug, Default)]
pub struct MemoryRevocationStore {
    revoked: DashSet<String>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate the token with the given identifier.
    pub fn revoke(&self, token_id: impl Into<String>) {
        self.revoked.insert(token_id.into());
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn is_revoked(&self, payload: &TokenPayload) -> anyhow::Result<bool> {
        Ok(self.revoked.contains(&payload.token_id))
    }
}
