//! Authorization failure taxonomy.
//!
//! Display text is what untrusted callers may see: verification and
//! store internals stay behind the `source` chain for operators.

use crate::capability::{list, Capability};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer credential was attached to the request. Checked first,
    /// before any decoding.
    #[error("missing token header")]
    MissingToken,

    /// Signature or token structure failed verification.
    #[error("cannot verify access token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    /// The token verified but its claims do not match the payload shape.
    #[error("malformed token payload")]
    MalformedPayload(#[source] serde_json::Error),

    /// The granted capability set does not cover the required one.
    #[error("mismatched capabilities: got {}, wanted {}", list(.granted), list(.required))]
    InsufficientCapabilities {
        granted: Vec<Capability>,
        required: Vec<Capability>,
    },

    /// The token's expiry timestamp is in the past.
    #[error("token has expired, please refresh it")]
    TokenExpired,

    /// The token was explicitly invalidated.
    #[error("token has been revoked")]
    TokenRevoked,

    /// The revocation store could not answer. Treated as a rejection, never
    /// as "not revoked".
    #[error("revocation status unavailable")]
    RevocationUnavailable(#[source] anyhow::Error),
}
