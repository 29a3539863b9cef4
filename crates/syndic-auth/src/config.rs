use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Gate configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Storage root holding the `keys/` directory.
    pub storage: PathBuf,
    /// Grace applied to the expiry comparison to absorb clock drift between
    /// issuer and verifier. Zero by default: an expired token is rejected
    /// strictly unless an operator opts into a window.
    pub clock_skew_leeway: Duration,
    /// Upper bound on one revocation-store lookup. Hitting it rejects the
    /// request with `RevocationUnavailable`.
    pub revocation_timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            storage: PathBuf::from("data"),
            clock_skew_leeway: Duration::ZERO,
            revocation_timeout: Duration::from_secs(5),
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = env::var("SYNDIC_STORAGE") {
            cfg.storage = PathBuf::from(v);
        }

        if let Ok(v) = env::var("SYNDIC_AUTH_LEEWAY_MS") {
            if let Ok(ms) = v.parse::<u64>() {
                cfg.clock_skew_leeway = Duration::from_millis(ms);
            }
        }

        if let Ok(v) = env::var("SYNDIC_AUTH_REVOCATION_TIMEOUT_MS") {
            if let Ok(ms) = v.parse::<u64>() {
                cfg.revocation_timeout = Duration::from_millis(ms);
            }
        }

        cfg
    }
}
