use crate::capability::{list, Capability};
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::keys::Keypair;
use crate::revocation::RevocationStore;
use crate::token::TokenPayload;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as i64)
}

/// The six-step authorization pipeline.
///
/// Steps run strictly in order and the first failure wins:
/// presence, signature, schema, capabilities, expiry, revocation.
/// The gate holds no per-request state; concurrent authorizations are
/// fully independent.
pub struct AuthorizationGate {
    decoding: DecodingKey,
    revocations: Arc<dyn RevocationStore>,
    clock_skew_leeway: Duration,
    revocation_timeout: Duration,
}

impl AuthorizationGate {
    pub fn new(keys: &Keypair, revocations: Arc<dyn RevocationStore>, config: &AuthConfig) -> Self {
        Self {
            decoding: keys.decoding.clone(),
            revocations,
            clock_skew_leeway: config.clock_skew_leeway,
            revocation_timeout: config.revocation_timeout,
        }
    }

    /// Resolve one request: `bearer` is the raw authorization credential if
    /// the request carried one. Returns the validated payload on success.
    pub async fn authorize(
        &self,
        required: &[Capability],
        bearer: Option<&str>,
    ) -> Result<TokenPayload, AuthError> {
        // 1. Presence, before any decoding is attempted.
        let token = bearer.ok_or(AuthError::MissingToken)?;
        let token = token.strip_prefix("Bearer ").unwrap_or(token);

        // 2. Signature and structure. RS256 only; an HS256 or alg-confused
        // header fails inside decode before any claim is trusted.
        let mut validation = Validation::new(Algorithm::RS256);
        // Expiry is step 5 of this pipeline; the standard `exp` claim cannot
        // express the -1 sentinel, so the library check stays off.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        let claims = decode::<serde_json::Value>(token, &self.decoding, &validation)
            .map_err(AuthError::InvalidToken)?
            .claims;

        // 3. Schema: the closed capability enum rejects unknown tags here.
        let payload: TokenPayload =
            serde_json::from_value(claims).map_err(AuthError::MalformedPayload)?;

        // 4. Capability subset.
        if !payload.grants(required) {
            tracing::warn!(
                reason = "W_AUTH_CAPS",
                granted = %list(&payload.capabilities),
                required = %list(required),
                "capability check failed"
            );
            return Err(AuthError::InsufficientCapabilities {
                granted: payload.capabilities.clone(),
                required: required.to_vec(),
            });
        }

        // 5. Expiry, skipped entirely for the never-expire sentinel.
        if !payload.never_expires() {
            let leeway = self.clock_skew_leeway.as_millis() as i64;
            if payload.expired_at(now_millis() - leeway) {
                return Err(AuthError::TokenExpired);
            }
        }

        // 6. Revocation. External I/O, bounded by the configured timeout;
        // a store error or timeout rejects the request (fail closed).
        let lookup =
            tokio::time::timeout(self.revocation_timeout, self.revocations.is_revoked(&payload));
        let revoked = match lookup.await {
            Ok(Ok(revoked)) => revoked,
            Ok(Err(err)) => {
                tracing::warn!(reason = "W_AUTH_REVOKE_STORE", error = %err, "revocation lookup failed");
                return Err(AuthError::RevocationUnavailable(err));
            }
            Err(_) => {
                tracing::warn!(reason = "W_AUTH_REVOKE_STORE", "revocation lookup timed out");
                return Err(AuthError::RevocationUnavailable(anyhow::anyhow!(
                    "revocation lookup timed out"
                )));
            }
        };
        if revoked {
            return Err(AuthError::TokenRevoked);
        }

        Ok(payload)
    }
}

/// A gate pre-bound to the capability set one class of operations requires.
///
/// The three stock scopes mirror the protected route classes: site
/// administration, publishing, and token refresh.
#[derive(Clone)]
pub struct ScopedGate {
    gate: Arc<AuthorizationGate>,
    required: Vec<Capability>,
}

impl ScopedGate {
    pub fn new(gate: Arc<AuthorizationGate>, required: impl Into<Vec<Capability>>) -> Self {
        Self {
            gate,
            required: required.into(),
        }
    }

    pub fn admin(gate: Arc<AuthorizationGate>) -> Self {
        Self::new(gate, [Capability::Admin])
    }

    pub fn publisher(gate: Arc<AuthorizationGate>) -> Self {
        Self::new(gate, [Capability::Publisher])
    }

    pub fn refresh(gate: Arc<AuthorizationGate>) -> Self {
        Self::new(gate, [Capability::Refresh])
    }

    pub fn required(&self) -> &[Capability] {
        &self.required
    }

    pub async fn authorize(&self, bearer: Option<&str>) -> Result<TokenPayload, AuthError> {
        self.gate.authorize(&self.required, bearer).await
    }
}
