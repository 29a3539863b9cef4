use crate::capability::{subset, Capability};
use serde::{Deserialize, Serialize};

/// The claims a signed bearer token carries, as consumed by the gate.
///
/// Produced by the external issuer; the gate reads it and never mutates or
/// persists it. Extra claims on the wire (issued-at and the like) are ignored,
/// but the fields below must be present and well-typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    /// Granted capability set. Duplicates collapse under set semantics.
    pub capabilities: Vec<Capability>,
    /// Expiry as an epoch-millisecond timestamp, or [`Self::NEVER_EXPIRES`].
    pub expires: i64,
    /// Unique identifier minted at issuance; revocation is keyed by it.
    pub token_id: String,
}

impl TokenPayload {
    /// Sentinel expiry meaning the token has no time-based expiration.
    pub const NEVER_EXPIRES: i64 = -1;

    /// True when the token carries the never-expire sentinel.
    pub fn never_expires(&self) -> bool {
        self.expires == Self::NEVER_EXPIRES
    }

    /// True when the token is expired at `now_ms` (epoch milliseconds).
    /// Always false for never-expiring tokens.
    pub fn expired_at(&self, now_ms: i64) -> bool {
        !self.never_expires() && self.expires < now_ms
    }

    /// True when this token's capabilities cover the whole `required` set.
    pub fn grants(&self, required: &[Capability]) -> bool {
        subset(required, &self.capabilities)
    }
}
