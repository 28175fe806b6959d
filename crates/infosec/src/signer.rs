use std::future::Future;

use ed25519_dalek::{Signer as _, SigningKey};
use originals_codec::{KeyType, Multikey};
use rand::rngs::OsRng;

/// Signature algorithms a [`Signer`] may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Pure EdDSA over Curve25519 (Ed25519). The only algorithm the proof
    /// engine currently verifies.
    EdDSA,
    /// ECDSA over secp256k1.
    Es256k,
}

/// Capability contract for producing signatures and identifying the
/// verification method a proof should carry.
///
/// Implementations may be backed by an in-memory key (as [`EphemeralSigner`]
/// is), a hardware key store, or a remote custodial signing service; the
/// proof engine depends only on this trait, never on a concrete key type.
pub trait Signer: Send + Sync {
    /// The algorithm this signer uses.
    fn algorithm(&self) -> Algorithm;

    /// The DID URL (or other verification method reference) a verifier
    /// should use to resolve this signer's public key.
    fn verification_method(&self) -> impl Future<Output = anyhow::Result<String>> + Send;

    /// Sign `payload`, returning a raw signature.
    fn try_sign(&self, payload: &[u8]) -> impl Future<Output = anyhow::Result<Vec<u8>>> + Send;

    /// The signer's public key, multibase/multikey encoded.
    fn multikey(&self) -> anyhow::Result<Multikey>;
}

/// An in-memory Ed25519 signer, useful for tests and for the CLI's
/// generate-a-fresh-keypair path.
pub struct EphemeralSigner {
    signing_key: SigningKey,
    verification_method: String,
}

impl EphemeralSigner {
    /// Generate a fresh Ed25519 keypair and derive a `did:key` verification
    /// method from its public key.
    #[must_use]
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self::from_signing_key(signing_key)
    }

    /// Build a signer from an existing Ed25519 signing key.
    #[must_use]
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let multikey = Multikey::encode(KeyType::Ed25519, signing_key.verifying_key().as_bytes());
        let verification_method = format!("did:key:{multikey}#{multikey}");
        Self { signing_key, verification_method }
    }

    /// Parse a raw 32-byte Ed25519 private key.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(bytes))
    }

    /// The raw private key bytes, for persistence by the caller (e.g. the
    /// CLI's `create` command printing a key file).
    #[must_use]
    pub fn private_key_multikey(&self) -> Multikey {
        Multikey::encode(KeyType::Ed25519Private, self.signing_key.to_bytes().as_slice())
    }

    /// The raw public key bytes.
    #[must_use]
    pub fn public_key_multikey(&self) -> Multikey {
        Multikey::encode(KeyType::Ed25519, self.signing_key.verifying_key().as_bytes())
    }
}

impl Signer for EphemeralSigner {
    fn algorithm(&self) -> Algorithm {
        Algorithm::EdDSA
    }

    async fn verification_method(&self) -> anyhow::Result<String> {
        Ok(self.verification_method.clone())
    }

    async fn try_sign(&self, payload: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(self.signing_key.sign(payload).to_bytes().to_vec())
    }

    fn multikey(&self) -> anyhow::Result<Multikey> {
        Ok(self.public_key_multikey())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signs_and_reports_verification_method() {
        let signer = EphemeralSigner::generate();
        let sig = signer.try_sign(b"hello").await.unwrap();
        assert_eq!(sig.len(), 64);
        let vm = signer.verification_method().await.unwrap();
        assert!(vm.starts_with("did:key:z"));
    }
}
