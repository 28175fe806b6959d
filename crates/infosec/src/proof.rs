use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, VerifyingKey};
use originals_codec::{encode_json, KeyType, Multikey};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{Algorithm, Signer};

/// Errors raised while constructing or verifying a [`Proof`].
#[derive(Debug, Error)]
pub enum ProofError {
    /// The signer's algorithm is not supported by this cryptosuite.
    #[error("signing algorithm must be EdDSA (pure Ed25519)")]
    UnsupportedAlgorithm,

    /// A proof field required for verification was missing.
    #[error("proof is missing required field: {0}")]
    MissingField(&'static str),

    /// The `proofValue` was not valid multibase or had the wrong length.
    #[error("malformed proof value: {0}")]
    MalformedProofValue(String),

    /// The verification method could not be resolved to a usable key.
    #[error("could not resolve verification method {0:?}: {1}")]
    KeyResolutionFailed(String, String),

    /// Signature verification failed.
    #[error("signature is invalid")]
    SignatureInvalid,

    /// Canonicalization failed.
    #[error(transparent)]
    Codec(#[from] originals_codec::CodecError),
}

/// The reason a proof was produced; safeguards against cross-purpose replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProofPurpose {
    /// The proof asserts the truth of the secured data.
    AssertionMethod,
    /// The proof authenticates the controller.
    Authentication,
}

impl Default for ProofPurpose {
    fn default() -> Self {
        Self::AssertionMethod
    }
}

/// A W3C Data Integrity Proof using the `eddsa-jcs-2022` cryptosuite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Proof {
    /// URN identifying this proof instance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Always `"DataIntegrityProof"`.
    #[serde(rename = "type")]
    pub type_: String,

    /// The cryptosuite identifier, e.g. `"eddsa-jcs-2022"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cryptosuite: Option<String>,

    /// Why the proof was produced.
    pub proof_purpose: ProofPurpose,

    /// DID URL identifying the key used to produce this proof.
    pub verification_method: String,

    /// When the proof was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// When the proof expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,

    /// Multibase-encoded signature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
}

/// A [`Proof`] with an additional mandatory timestamp, used by third-party
/// witnesses to attest that a digest existed at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WitnessProof {
    /// The underlying data integrity proof fields.
    #[serde(flatten)]
    pub proof: Proof,

    /// The moment the witness observed the digest.
    pub witnessed_at: DateTime<Utc>,
}

/// Options controlling proof construction.
#[derive(Debug, Clone, Default)]
pub struct SignOptions {
    /// Override the default `assertionMethod` purpose.
    pub proof_purpose: Option<ProofPurpose>,
    /// Override the proof's `created` timestamp (primarily for tests).
    pub created: Option<DateTime<Utc>>,
}

/// Canonical JSON of `payload` with any top-level `proof`/`proofValue` field
/// removed, via round-tripping through `serde_json::Value`.
fn payload_without_proof<T: Serialize>(payload: &T) -> Result<String, ProofError> {
    let mut value = serde_json::to_value(payload).map_err(|e| {
        ProofError::MalformedProofValue(format!("payload is not a JSON object: {e}"))
    })?;
    if let Some(obj) = value.as_object_mut() {
        obj.remove("proof");
    }
    Ok(originals_codec::encode_json(&value)?)
}

/// Produce a `DataIntegrityProof` over `payload` using `signer`.
///
/// `payload` must canonicalize to a JSON object; any `proof` field present is
/// excluded from the signed content, matching the two-hash construction:
/// `sign(SHA256(canonical(config_without_proofValue)) || SHA256(canonical(payload_without_proof)))`.
pub async fn sign<T: Serialize>(
    payload: &T,
    signer: &impl Signer,
    opts: &SignOptions,
) -> Result<Proof, ProofError> {
    if signer.algorithm() != Algorithm::EdDSA {
        return Err(ProofError::UnsupportedAlgorithm);
    }
    let verification_method =
        signer.verification_method().await.map_err(|e| ProofError::KeyResolutionFailed(
            String::new(),
            e.to_string(),
        ))?;

    let config = Proof {
        id: Some(format!("urn:uuid:{}", Uuid::new_v4())),
        type_: "DataIntegrityProof".to_string(),
        cryptosuite: Some("eddsa-jcs-2022".to_string()),
        proof_purpose: opts.proof_purpose.unwrap_or_default(),
        verification_method,
        created: Some(opts.created.unwrap_or_else(Utc::now)),
        expires: None,
        proof_value: None,
    };

    let config_hash = sha2::Sha256::digest_str(&encode_json(&config)?);
    let data_hash = sha2::Sha256::digest_str(&payload_without_proof(payload)?);

    let mut to_sign = Vec::with_capacity(64);
    to_sign.extend_from_slice(&config_hash);
    to_sign.extend_from_slice(&data_hash);

    let signature =
        signer.try_sign(&to_sign).await.map_err(|e| ProofError::KeyResolutionFailed(
            config.verification_method.clone(),
            e.to_string(),
        ))?;
    let proof_value = multibase::encode(multibase::Base::Base58Btc, signature);

    Ok(Proof { proof_value: Some(proof_value), ..config })
}

/// Verify `proof` was produced over `payload` by the key identified in
/// `public_key`. Offline callers resolve `public_key` themselves (e.g. by
/// parsing a `did:key:` verification method); the proof engine does no
/// network resolution.
pub fn verify<T: Serialize>(
    payload: &T,
    proof: &Proof,
    public_key: &Multikey,
) -> Result<(), ProofError> {
    let proof_value =
        proof.proof_value.as_ref().ok_or(ProofError::MissingField("proofValue"))?;
    let (_, sig_bytes) = multibase::decode(proof_value)
        .map_err(|e| ProofError::MalformedProofValue(e.to_string()))?;
    let sig_bytes: [u8; 64] = sig_bytes
        .try_into()
        .map_err(|_| ProofError::MalformedProofValue("expected 64-byte Ed25519 signature".into()))?;
    let signature = Signature::from_bytes(&sig_bytes);

    let raw_key = public_key
        .decode(KeyType::Ed25519)
        .map_err(|e| ProofError::KeyResolutionFailed(public_key.to_string(), e.to_string()))?;
    let key_bytes: [u8; 32] = raw_key
        .try_into()
        .map_err(|_| ProofError::KeyResolutionFailed(public_key.to_string(), "wrong key length".into()))?;
    let verifying_key = VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| ProofError::KeyResolutionFailed(public_key.to_string(), e.to_string()))?;

    let config = Proof { proof_value: None, ..proof.clone() };
    let config_hash = sha2::Sha256::digest_str(&encode_json(&config)?);
    let data_hash = sha2::Sha256::digest_str(&payload_without_proof(payload)?);

    let mut signed = Vec::with_capacity(64);
    signed.extend_from_slice(&config_hash);
    signed.extend_from_slice(&data_hash);

    verifying_key
        .verify_strict(&signed, &signature)
        .map_err(|_| ProofError::SignatureInvalid)
}

/// Tiny helper so `sign`/`verify` read as "hash of the canonical string" at
/// the call site instead of repeating `sha2::Sha256::digest(s.as_bytes())`.
trait DigestStrExt {
    fn digest_str(s: &str) -> [u8; 32];
}

impl DigestStrExt for sha2::Sha256 {
    fn digest_str(s: &str) -> [u8; 32] {
        use sha2::Digest as _;
        Self::digest(s.as_bytes()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EphemeralSigner;

    #[tokio::test]
    async fn signs_and_verifies() {
        let signer = EphemeralSigner::generate();
        let payload = serde_json::json!({"hello": "world"});
        let proof = sign(&payload, &signer, &SignOptions::default()).await.unwrap();
        assert_eq!(proof.cryptosuite.as_deref(), Some("eddsa-jcs-2022"));

        let public_key = signer.public_key_multikey();
        verify(&payload, &proof, &public_key).expect("signature must verify");
    }

    #[tokio::test]
    async fn rejects_tampered_payload() {
        let signer = EphemeralSigner::generate();
        let payload = serde_json::json!({"hello": "world"});
        let proof = sign(&payload, &signer, &SignOptions::default()).await.unwrap();

        let tampered = serde_json::json!({"hello": "mars"});
        let public_key = signer.public_key_multikey();
        assert!(verify(&tampered, &proof, &public_key).is_err());
    }
}
