//! Capability-scoped token authorization for syndic.
//!
//! Every protected operation runs through [`AuthorizationGate::authorize`], a
//! strict fail-fast pipeline: token presence, RS256 signature verification,
//! payload schema, capability subset, expiry, revocation. The first failing
//! step short-circuits the rest, and a revocation-store error is a rejection,
//! never an approval.
//!
//! Collaborators (the issuer keypair and the [`RevocationStore`]) are injected
//! at construction; the gate itself is stateless across requests.

pub mod capability;
pub mod config;
pub mod error;
pub mod gate;
pub mod keys;
pub mod revocation;
pub mod token;

pub use capability::{subset, Capability};
pub use config::AuthConfig;
pub use error::AuthError;
pub use gate::{AuthorizationGate, ScopedGate};
pub use keys::Keypair;
pub use revocation::{MemoryRevocationStore, RevocationStore};
pub use token::TokenPayload;
