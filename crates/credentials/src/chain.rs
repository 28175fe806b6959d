use originals_codec::{digest, CodecError};
use thiserror::Error;

use crate::VerifiableCredential;

/// Errors raised while verifying a credential chain.
#[derive(Debug, Error)]
pub enum ChainError {
    /// A credential past the first in the chain had no `previousCredential`.
    #[error("credential {0:?} does not reference a previous credential")]
    MissingLink(Option<String>),

    /// `previousCredential.id` did not match the prior credential's `id`.
    #[error("credential {curr:?} references previous id {referenced:?}, but the prior credential's id is {actual:?}")]
    IdMismatch {
        /// The referencing credential's id.
        curr: Option<String>,
        /// The id it referenced.
        referenced: String,
        /// The prior credential's actual id.
        actual: Option<String>,
    },

    /// `previousCredential.hash` did not match the prior credential's digest.
    #[error("credential {0:?} references a previous-credential hash that does not match")]
    HashMismatch(Option<String>),

    /// Canonicalization of a credential failed.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// `SHA-256(canonical(credential))`, multibase-encoded — the value stored in
/// a chained credential's `credentialSubject.previousCredential.hash`.
pub fn compute_credential_hash(
    credential: &VerifiableCredential,
) -> Result<originals_codec::DigestMultibase, CodecError> {
    digest(credential)
}

/// Verify that `credentials` form a valid hash chain: each credential after
/// the first must reference the immediately preceding credential's `id` and
/// digest in its subject's `previousCredential` field.
///
/// An empty or single-element slice trivially verifies. This checks chain
/// linkage only; signature verification over each credential's `proof` is a
/// separate concern (see [`originals_infosec::verify`]).
pub fn verify_credential_chain(credentials: &[VerifiableCredential]) -> Result<(), ChainError> {
    for pair in credentials.windows(2) {
        let [prev, curr] = pair else { unreachable!("windows(2) yields 2-element slices") };

        let link = curr
            .credential_subject
            .previous_credential()
            .ok_or_else(|| ChainError::MissingLink(curr.id.clone()))?;

        if Some(link.id.as_str()) != prev.id.as_deref() {
            return Err(ChainError::IdMismatch {
                curr: curr.id.clone(),
                referenced: link.id.clone(),
                actual: prev.id.clone(),
            });
        }

        let expected = compute_credential_hash(prev)?;
        if link.hash != expected {
            return Err(ChainError::HashMismatch(curr.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IssueOptions, PreviousCredential, ResourceCreated, Subject};
    use originals_infosec::EphemeralSigner;

    async fn issued(signer: &EphemeralSigner, opts: &IssueOptions) -> VerifiableCredential {
        let subject = Subject::ResourceCreated(ResourceCreated {
            id: "did:peer:abc".into(),
            resource_id: "res-1".into(),
            resource_type: "image".into(),
            content_hash: originals_codec::digest(&"content").unwrap(),
            content_type: "image/png".into(),
            creator: "did:key:zC".into(),
            created_at: chrono::Utc::now(),
            previous_credential: None,
        });
        crate::issue("did:key:zC", subject, opts, signer).await.unwrap()
    }

    #[tokio::test]
    async fn chain_of_one_verifies() {
        let signer = EphemeralSigner::generate();
        let vc = issued(&signer, &IssueOptions::default()).await;
        verify_credential_chain(std::slice::from_ref(&vc)).unwrap();
    }

    #[tokio::test]
    async fn two_linked_credentials_verify() {
        let signer = EphemeralSigner::generate();
        let first = issued(&signer, &IssueOptions::default()).await;
        let previous = PreviousCredential {
            id: first.id.clone().unwrap(),
            hash: compute_credential_hash(&first).unwrap(),
        };
        let second =
            issued(&signer, &IssueOptions { previous_credential: Some(previous) }).await;

        verify_credential_chain(&[first, second]).unwrap();
    }

    #[tokio::test]
    async fn tampered_hash_is_rejected() {
        let signer = EphemeralSigner::generate();
        let first = issued(&signer, &IssueOptions::default()).await;
        let bogus = PreviousCredential {
            id: first.id.clone().unwrap(),
            hash: originals_codec::digest(&"not the real credential").unwrap(),
        };
        let second = issued(&signer, &IssueOptions { previous_credential: Some(bogus) }).await;

        let err = verify_credential_chain(&[first, second]).unwrap_err();
        assert!(matches!(err, ChainError::HashMismatch(_)));
    }

    #[tokio::test]
    async fn missing_link_is_rejected() {
        let signer = EphemeralSigner::generate();
        let first = issued(&signer, &IssueOptions::default()).await;
        let second = issued(&signer, &IssueOptions::default()).await;

        let err = verify_credential_chain(&[first, second]).unwrap_err();
        assert!(matches!(err, ChainError::MissingLink(_)));
    }
}
