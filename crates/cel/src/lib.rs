//! The Cryptographic Event Log (CEL): an append-only, hash-chained,
//! per-event-signed description of an asset's lifecycle.
//!
//! An [`EventLog`] is produced by [`create`], extended by [`update`] and
//! [`deactivate`], and independently checked by [`verify`]. [`current_state`]
//! folds a log into the [`AssetState`] it currently describes.

mod entry;
mod state;
mod verify;

pub use entry::{EventLog, EventType, LogEntry};
pub use state::{current_state, AssetState, Layer};
pub use verify::{verify, EventVerification, VerificationResult};

use chrono::Utc;
use originals_codec::digest;
use originals_infosec::{sign, Proof, SignOptions, Signer};
use thiserror::Error;

/// Errors raised by CEL construction operations (not raised by [`verify`],
/// which aggregates failures into its result instead).
#[derive(Debug, Error)]
pub enum CelError {
    /// An `update`/`deactivate` was attempted on a log whose last event is a
    /// `deactivate`.
    #[error("log is closed: no further events may be appended after deactivation")]
    LogClosed,

    /// `update`/`deactivate` was called on an empty log.
    #[error("log has no events to extend")]
    EmptyLog,

    /// Canonicalization or digesting failed.
    #[error(transparent)]
    Codec(#[from] originals_codec::CodecError),

    /// Proof construction failed.
    #[error(transparent)]
    Proof(#[from] originals_infosec::ProofError),
}

/// Result alias for CEL construction operations.
pub type Result<T> = std::result::Result<T, CelError>;

/// Options accepted by the construction operations. Currently only exposes a
/// proof-options pass-through; reserved for future signer/witness knobs.
#[derive(Debug, Clone, Default)]
pub struct CelOptions {
    /// Options forwarded to the proof engine.
    pub sign_options: SignOptions,
}

/// Begin a new log with a single `create` event over `data`.
///
/// The returned log always has exactly one event and no `previousEvent`.
pub async fn create(
    data: serde_json::Value,
    signer: &impl Signer,
    opts: &CelOptions,
) -> Result<EventLog> {
    let proof = sign(&data, signer, &opts.sign_options).await?;
    let entry = LogEntry {
        event_type: EventType::Create,
        data,
        previous_event: None,
        proof: vec![proof],
    };
    Ok(EventLog { events: vec![entry], previous_log: None })
}

/// Append an `update` event carrying `data`, chained to the log's last entry.
///
/// # Errors
/// Returns [`CelError::EmptyLog`] if `log` has no events, or
/// [`CelError::LogClosed`] if the last event is a `deactivate`.
pub async fn update(
    log: &EventLog,
    data: serde_json::Value,
    signer: &impl Signer,
    opts: &CelOptions,
) -> Result<EventLog> {
    append(log, EventType::Update, data, signer, opts).await
}

/// Append a terminal `deactivate` event. No further events may be appended
/// afterward.
pub async fn deactivate(
    log: &EventLog,
    reason: Option<String>,
    signer: &impl Signer,
    opts: &CelOptions,
) -> Result<EventLog> {
    let data = serde_json::json!({
        "reason": reason,
        "deactivatedAt": Utc::now().to_rfc3339(),
    });
    append(log, EventType::Deactivate, data, signer, opts).await
}

async fn append(
    log: &EventLog,
    event_type: EventType,
    data: serde_json::Value,
    signer: &impl Signer,
    opts: &CelOptions,
) -> Result<EventLog> {
    let last = log.events.last().ok_or(CelError::EmptyLog)?;
    if last.event_type == EventType::Deactivate {
        return Err(CelError::LogClosed);
    }
    let previous_event = digest(last)?;
    let proof = sign(&data, signer, &opts.sign_options).await?;

    let entry = LogEntry {
        event_type,
        data,
        previous_event: Some(previous_event),
        proof: vec![proof],
    };

    let mut events = log.events.clone();
    events.push(entry);
    Ok(EventLog { events, previous_log: log.previous_log.clone() })
}

/// Attach an additional proof (e.g. a witness attestation) to the most recent
/// event without altering the chain.
pub fn attach_proof(log: &mut EventLog, proof: Proof) -> Result<()> {
    let last = log.events.last_mut().ok_or(CelError::EmptyLog)?;
    last.proof.push(proof);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use originals_infosec::EphemeralSigner;

    #[tokio::test]
    async fn create_then_update_chains_and_verifies() {
        let signer = EphemeralSigner::generate();
        let log = create(serde_json::json!({"name": "A"}), &signer, &CelOptions::default())
            .await
            .unwrap();
        assert!(log.events[0].previous_event.is_none());

        let log =
            update(&log, serde_json::json!({"name": "B"}), &signer, &CelOptions::default())
                .await
                .unwrap();
        assert!(log.events[1].previous_event.is_some());

        let result = verify(&log).unwrap();
        assert!(result.verified);
    }

    #[tokio::test]
    async fn update_after_deactivate_fails() {
        let signer = EphemeralSigner::generate();
        let log = create(serde_json::json!({}), &signer, &CelOptions::default()).await.unwrap();
        let log = deactivate(&log, None, &signer, &CelOptions::default()).await.unwrap();
        let err = update(&log, serde_json::json!({}), &signer, &CelOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CelError::LogClosed));
    }

    #[tokio::test]
    async fn update_on_empty_log_fails() {
        let signer = EphemeralSigner::generate();
        let empty = EventLog { events: vec![], previous_log: None };
        let err = update(&empty, serde_json::json!({}), &signer, &CelOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CelError::EmptyLog));
    }
}
