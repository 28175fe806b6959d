use originals_codec::digest;
use originals_infosec::verify as verify_proof;

use crate::{EventLog, EventType};

/// Per-event breakdown produced by [`verify`].
#[derive(Debug, Clone)]
pub struct EventVerification {
    /// Position of this event within the log.
    pub index: usize,
    /// The event's type.
    pub event_type: EventType,
    /// Whether every proof on this event verified.
    pub proof_valid: bool,
    /// Whether `previousEvent` matches the digest of the prior entry (or is
    /// correctly absent, for the first event).
    pub chain_valid: bool,
    /// Human-readable reasons for any failure above.
    pub errors: Vec<String>,
}

/// Aggregated result of verifying an entire [`EventLog`].
#[derive(Debug, Clone)]
pub struct VerificationResult {
    /// `true` only if every event's proofs and chain linkage are valid and
    /// no event follows a `deactivate`.
    pub verified: bool,
    /// Per-event breakdown, in log order.
    pub events: Vec<EventVerification>,
    /// Log-level errors not attributable to a single event (e.g. an event
    /// appearing after deactivation).
    pub errors: Vec<String>,
}

/// Resolve the public key that should have produced `proof.verification_method`.
///
/// Offline verification supports `did:key:<multikey>#<multikey>` references
/// directly, since the key material is embedded in the identifier itself.
/// Any other verification method requires a resolver this crate does not
/// provide, and is reported as a chain/proof failure rather than panicking.
fn resolve_did_key(verification_method: &str) -> Option<originals_codec::Multikey> {
    let rest = verification_method.strip_prefix("did:key:")?;
    let (method_specific, _fragment) = rest.split_once('#').unwrap_or((rest, rest));
    Some(originals_codec::Multikey::from(method_specific.to_string()))
}

/// Verify every proof and hash-chain link in `log`.
///
/// Unlike construction, this never short-circuits on the first problem: it
/// walks the whole log and returns every failure it finds so a reporter (the
/// `inspect`/`verify` CLI commands) can show a complete breakdown.
pub fn verify(log: &EventLog) -> crate::Result<VerificationResult> {
    let mut events = Vec::with_capacity(log.events.len());
    let mut log_errors = Vec::new();
    let mut seen_deactivate = false;

    for (index, entry) in log.events.iter().enumerate() {
        let mut errors = Vec::new();

        if seen_deactivate {
            log_errors.push(format!(
                "event {index} follows a deactivate event; no further events are permitted"
            ));
        }
        if entry.event_type == EventType::Deactivate {
            seen_deactivate = true;
        }

        let chain_valid = if index == 0 {
            if entry.previous_event.is_some() {
                errors.push("first event must not have previousEvent".to_string());
                false
            } else {
                true
            }
        } else {
            let expected = digest(&log.events[index - 1])?;
            match &entry.previous_event {
                Some(actual) if *actual == expected => true,
                Some(_) => {
                    errors.push("hash chain broken: previousEvent does not match digest of prior event".to_string());
                    false
                }
                None => {
                    errors.push("missing previousEvent on non-first event".to_string());
                    false
                }
            }
        };

        let mut proof_valid = !entry.proof.is_empty();
        if entry.proof.is_empty() {
            errors.push("event has no proofs".to_string());
        }
        for proof in &entry.proof {
            let Some(public_key) = resolve_did_key(&proof.verification_method) else {
                errors.push(format!(
                    "cannot resolve verification method offline: {}",
                    proof.verification_method
                ));
                proof_valid = false;
                continue;
            };
            if let Err(e) = verify_proof(&entry.data, proof, &public_key) {
                errors.push(format!("proof invalid: {e}"));
                proof_valid = false;
            }
        }

        events.push(EventVerification {
            index,
            event_type: entry.event_type,
            proof_valid,
            chain_valid,
            errors,
        });
    }

    let verified = log_errors.is_empty()
        && events.iter().all(|e| e.proof_valid && e.chain_valid);

    Ok(VerificationResult { verified, events, errors: log_errors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create, update, CelOptions};
    use originals_infosec::EphemeralSigner;

    #[tokio::test]
    async fn detects_tampered_chain() {
        let signer = EphemeralSigner::generate();
        let log = create(serde_json::json!({"n": 1}), &signer, &CelOptions::default())
            .await
            .unwrap();
        let log = update(&log, serde_json::json!({"n": 2}), &signer, &CelOptions::default())
            .await
            .unwrap();
        let mut log = update(&log, serde_json::json!({"n": 3}), &signer, &CelOptions::default())
            .await
            .unwrap();

        log.events[2].previous_event =
            Some(originals_codec::DigestMultibase::parse(
                multibase::encode(multibase::Base::Base64Url, [9u8; 32]),
            ).unwrap());

        let result = verify(&log).unwrap();
        assert!(!result.verified);
        assert!(!result.events[2].chain_valid);
    }

    #[tokio::test]
    async fn first_event_must_not_have_previous() {
        let signer = EphemeralSigner::generate();
        let mut log = create(serde_json::json!({}), &signer, &CelOptions::default()).await.unwrap();
        log.events[0].previous_event = Some(originals_codec::digest(&"x").unwrap());
        let result = verify(&log).unwrap();
        assert!(!result.verified);
        assert!(!result.events[0].chain_valid);
    }
}
