use anyhow::{Context, Result};
use jsonwebtoken::{DecodingKey, EncodingKey};
use std::fs;
use std::path::Path;

/// The issuer's RS256 keypair, loaded once at startup.
///
/// An unreadable or malformed pair is a startup-fatal condition; nothing here
/// is recoverable per-request. The encoding half belongs to the surrounding
/// issuer (and to tests); the gate only ever uses the decoding half.
#[derive(Clone)]
pub struct Keypair {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl Keypair {
    /// Read `<storage>/keys/private.key` and `<storage>/keys/public.key`
    /// (PEM) and build the signing/verification keys.
    pub fn load(storage: &Path) -> Result<Self> {
        let dir = storage.join("keys");
        let private = fs::read(dir.join("private.key"))
            .with_context(|| format!("cannot read private key in {}", dir.display()))?;
        let public = fs::read(dir.join("public.key"))
            .with_context(|| format!("cannot read public key in {}", dir.display()))?;
        Self::from_pem(&private, &public)
    }

    /// Build a keypair from in-memory PEM text.
    pub fn from_pem(private_pem: &[u8], public_pem: &[u8]) -> Result<Self> {
        let encoding =
            EncodingKey::from_rsa_pem(private_pem).context("invalid RSA private key PEM")?;
        let decoding =
            DecodingKey::from_rsa_pem(public_pem).context("invalid RSA public key PEM")?;
        Ok(Self { encoding, decoding })
    }
}
