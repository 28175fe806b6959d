//! Facade over the codec, proof, CEL, DID, credential, storage, bitcoin,
//! witness, batch, and telemetry crates.
//!
//! [`Config`] is the single object an integrator builds: it owns a
//! [`Logger`], a [`MetricsCollector`], a signer, and a storage adapter, and
//! its methods are thin, timed, logged wrappers over the library crates'
//! free functions. No module-level mutable state exists outside the
//! `Config` the caller constructs and passes around explicitly.
//!
//! Batch and witness operations don't fit `Config`'s single-signer,
//! single-storage shape as cleanly (batch needs `Arc<S>`/`Arc<T>` for
//! concurrent dispatch; witness needs no signer or storage at all), so
//! they're re-exported here rather than wrapped, giving one crate as the
//! entry point for every operation in the system.

pub use originals_batch::{
    batch_create, batch_inscribe, batch_publish, batch_transfer, BatchFailure, BatchOptions,
    BatchResult, CostSavings, InscribeOptions, TransferPair, TransferRecord,
};
pub use originals_bitcoin::{BitcoinInscriber, InscriptionRequest, InscriptionResult, Network, Utxo};
pub use originals_cel::{current_state, verify, AssetState, EventLog, Layer, VerificationResult};
pub use originals_codec::{digest, digest_bytes, DigestMultibase, KeyType, Multikey};
pub use originals_credentials::{issue, CredentialError, IssueOptions, VerifiableCredential};
pub use originals_did::LayerError;
pub use originals_infosec::{EphemeralSigner, Signer};
pub use originals_storage::{MemoryStorage, Storage};
pub use originals_telemetry::{Logger, MetricsCollector};
pub use originals_witness::{witness, HttpWitnessError, WitnessOptions};

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by `Config`'s facade methods, wrapping each library
/// crate's own error type with the taxonomy `sdk` adds no new variants to.
#[derive(Debug, Error)]
pub enum SdkError {
    /// A CEL construction operation failed.
    #[error(transparent)]
    Cel(#[from] originals_cel::CelError),

    /// A layer migration failed.
    #[error(transparent)]
    Layer(#[from] originals_did::LayerError),
}

/// Result alias for `Config`'s facade methods.
pub type Result<T> = std::result::Result<T, SdkError>;

/// Everything a caller needs to exercise the asset lifecycle: a signer, a
/// storage adapter, and the logging/metrics context every operation reports
/// through.
///
/// Generic over the signer and storage implementations so integrators can
/// substitute their own (an HSM-backed signer, an HTTPS storage adapter)
/// without the facade depending on a trait object.
pub struct Config<S: Signer, T: Storage> {
    signer: S,
    storage: T,
    logger: Logger,
    metrics: Arc<MetricsCollector>,
}

impl<S: Signer, T: Storage> Config<S, T> {
    /// Build a config rooted at `context` (the top-level logging context,
    /// e.g. `"originals"`).
    #[must_use]
    pub fn new(context: impl Into<String>, signer: S, storage: T) -> Self {
        Self { signer, storage, logger: Logger::new(context), metrics: Arc::new(MetricsCollector::new()) }
    }

    /// The logging context shared by every operation this config performs.
    #[must_use]
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Process-wide counters accumulated by this config's operations.
    #[must_use]
    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    /// The configured signer, for callers that need to pass it to a batch or
    /// witness operation directly.
    #[must_use]
    pub fn signer(&self) -> &S {
        &self.signer
    }

    /// The configured storage adapter.
    #[must_use]
    pub fn storage(&self) -> &T {
        &self.storage
    }

    async fn timed<R>(
        &self, operation: &str, fut: impl std::future::Future<Output = Result<R>>,
    ) -> Result<R> {
        let timer = self.logger.start_timer(operation);
        let outcome = fut.await;
        let elapsed = timer.finish();
        self.metrics.record(operation, elapsed.as_millis() as u64, outcome.is_err());
        if let Err(ref e) = outcome {
            self.metrics.record_error(operation);
            self.logger.error(&format!("{operation} failed"), &serde_json::json!({"error": e.to_string()}));
        }
        outcome
    }

    /// Begin a new peer-layer asset log.
    pub async fn create_asset(
        &self, name: &str, resources: Vec<Value>, creator: &str,
    ) -> Result<EventLog> {
        self.timed("sdk:createAsset", async {
            let log = originals_did::peer::create(name, resources, creator, &self.signer).await?;
            self.metrics.record_asset_created();
            Ok(log)
        })
        .await
    }

    /// Append an update to an asset's log.
    pub async fn update_asset(&self, log: &EventLog, data: Value) -> Result<EventLog> {
        self.timed("sdk:updateAsset", async {
            Ok(originals_did::peer::update(log, data, &self.signer).await?)
        })
        .await
    }

    /// Publish a peer-layer log to `domain`, migrating it to `webvh`.
    pub async fn publish(&self, log: &EventLog, domain: &str) -> Result<EventLog> {
        self.timed("sdk:publish", async {
            let migrated =
                originals_did::webvh::migrate(log, domain, &self.storage, &self.signer).await?;
            self.metrics.record_migration("peer", "webvh");
            Ok(migrated)
        })
        .await
    }

    /// Verify every proof and hash-chain link in `log`. Never fails on a bad
    /// log — failures are reported inside the returned [`VerificationResult`].
    ///
    /// # Errors
    /// Only if canonicalizing an event for digesting fails, which indicates
    /// a malformed `data` payload rather than a verification failure.
    pub fn verify_log(&self, log: &EventLog) -> Result<VerificationResult> {
        let timer = self.logger.start_timer("sdk:verify");
        let result = originals_cel::verify(log).map_err(SdkError::from);
        let elapsed = timer.finish();
        self.metrics.record("sdk:verify", elapsed.as_millis() as u64, result.is_err());
        result
    }

    /// Summarize a log for the CLI's `inspect` command: current state plus
    /// the verification breakdown, as a single JSON value.
    ///
    /// # Errors
    /// Propagates [`Self::verify_log`]'s errors.
    pub fn inspect(&self, log: &EventLog) -> Result<Value> {
        let state = current_state(log);
        let verification = self.verify_log(log)?;
        Ok(serde_json::json!({
            "state": state,
            "verified": verification.verified,
            "eventCount": log.events.len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config<EphemeralSigner, MemoryStorage> {
        Config::new("test", EphemeralSigner::generate(), MemoryStorage::new())
    }

    #[tokio::test]
    async fn create_then_verify_round_trips() {
        let cfg = config();
        let resources = vec![serde_json::json!({"digest": "uAAAA", "mediaType": "text/plain"})];
        let log = cfg.create_asset("asset", resources, "did:key:zC").await.unwrap();
        let result = cfg.verify_log(&log).unwrap();
        assert!(result.verified);
        assert_eq!(cfg.metrics().operation("sdk:createAsset").unwrap().count, 1);
    }

    #[tokio::test]
    async fn publish_migrates_to_webvh() {
        let cfg = config();
        let log = cfg.create_asset("asset", vec![], "did:key:zC").await.unwrap();
        let log = cfg.publish(&log, "example.com").await.unwrap();
        assert_eq!(current_state(&log).layer, Layer::WebVh);
    }

    #[tokio::test]
    async fn inspect_reports_verified_and_event_count() {
        let cfg = config();
        let log = cfg.create_asset("asset", vec![], "did:key:zC").await.unwrap();
        let summary = cfg.inspect(&log).unwrap();
        assert_eq!(summary["verified"], true);
        assert_eq!(summary["eventCount"], 1);
    }
}
