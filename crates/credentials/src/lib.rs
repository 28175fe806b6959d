//! Verifiable credential issuance and chain verification.
//!
//! Four credential kinds are issued over an asset's lifetime
//! (`ResourceCreated`, `ResourceUpdated`, `MigrationCompleted`,
//! `OwnershipTransferred`); consecutive credentials may be chained by
//! embedding the previous credential's id and content hash in the next
//! credential's subject.

mod chain;
mod disclosure;
mod subject;

pub use chain::{compute_credential_hash, verify_credential_chain, ChainError};
pub use disclosure::{partition_pointers, DisclosureError, DisclosurePartition};
pub use subject::{
    MigrationCompleted, OwnershipTransferred, PreviousCredential, ResourceCreated,
    ResourceUpdated, Subject,
};

use chrono::Utc;
use originals_infosec::{sign, Proof, SignOptions, Signer};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while issuing a credential.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Proof construction failed.
    #[error(transparent)]
    Proof(#[from] originals_infosec::ProofError),

    /// Canonicalization failed.
    #[error(transparent)]
    Codec(#[from] originals_codec::CodecError),
}

/// A verifiable credential: a signed, typed attestation about a subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    /// JSON-LD context.
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    /// `urn:uuid:<id>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Credential type array, e.g. `["VerifiableCredential", "ResourceCreated"]`.
    #[serde(rename = "type")]
    pub type_: Vec<String>,
    /// Issuer DID.
    pub issuer: String,
    /// Issuance timestamp.
    pub issuance_date: chrono::DateTime<Utc>,
    /// The typed subject.
    pub credential_subject: Subject,
    /// Proof over the credential, once signed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

/// Options controlling credential issuance, primarily chaining.
#[derive(Debug, Clone, Default)]
pub struct IssueOptions {
    /// Id and hash of the credential this one continues from, if any.
    pub previous_credential: Option<PreviousCredential>,
}

/// Issue and sign a credential over `subject`, as `issuer`.
pub async fn issue(
    issuer: &str,
    mut subject: Subject,
    opts: &IssueOptions,
    signer: &impl Signer,
) -> Result<VerifiableCredential, CredentialError> {
    if let Some(previous) = &opts.previous_credential {
        subject.set_previous_credential(previous.clone());
    }

    let mut credential = VerifiableCredential {
        context: vec![
            "https://www.w3.org/ns/credentials/v2".to_string(),
            "https://originals.dev/contexts/cel/v1".to_string(),
        ],
        id: Some(format!("urn:uuid:{}", Uuid::new_v4())),
        type_: vec!["VerifiableCredential".to_string(), subject.type_name().to_string()],
        issuer: issuer.to_string(),
        issuance_date: Utc::now(),
        credential_subject: subject,
        proof: None,
    };

    let proof = sign(&credential, signer, &SignOptions::default()).await?;
    credential.proof = Some(proof);
    Ok(credential)
}
