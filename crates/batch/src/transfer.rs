use std::time::Instant;

use originals_cel::{current_state, EventLog, Layer};
use originals_telemetry::Logger;
use serde::Serialize;

use crate::{new_batch_id, BatchFailure, BatchOptions, BatchResult};

/// One `(asset, destination)` pair to transfer.
#[derive(Debug, Clone)]
pub struct TransferPair {
    /// The btco-layer asset log being transferred.
    pub asset: EventLog,
    /// The destination Bitcoin address.
    pub destination: String,
}

/// A validated transfer, ready for a caller to actually move on-chain.
#[derive(Debug, Clone, Serialize)]
pub struct TransferRecord {
    /// The asset's current DID.
    pub did: String,
    /// The destination address.
    pub destination: String,
}

const VALID_PREFIXES: &[&str] = &["bc1", "tb1", "bcrt1"];

fn validate_address(address: &str) -> Result<(), String> {
    if !VALID_PREFIXES.iter().any(|prefix| address.starts_with(prefix)) {
        return Err(format!(
            "{address:?} does not start with a recognized bech32(m) prefix ({VALID_PREFIXES:?})"
        ));
    }
    // bech32(m) addresses are at minimum ~14 data characters beyond the hrp
    // separator; reject anything implausibly short without fully decoding.
    if address.len() < 14 {
        return Err(format!("{address:?} is too short to be a valid bech32(m) address"));
    }
    Ok(())
}

fn validate_pair(pair: &TransferPair) -> Result<TransferRecord, String> {
    let state = current_state(&pair.asset);
    if state.layer != Layer::Btco {
        return Err(format!("asset {} must be at the btco layer to transfer, found {:?}", state.did, state.layer));
    }
    validate_address(&pair.destination)?;
    Ok(TransferRecord { did: state.did, destination: pair.destination.clone() })
}

/// Validate a batch of ownership transfers: each source asset must be at the
/// `btco` layer and each destination must be a well-formed bech32(m)
/// address. This only validates and records intent — broadcasting the
/// transfer transaction is delegated to the caller's own wallet/RPC client,
/// the same Non-goal boundary `originals-bitcoin`'s `BitcoinInscriber`
/// observes.
pub fn batch_transfer(
    pairs: Vec<TransferPair>,
    opts: &BatchOptions,
    logger: &Logger,
) -> BatchResult<TransferRecord> {
    let started = Instant::now();
    let batch_id = new_batch_id();
    let total = pairs.len();
    logger.info(
        "batch:started",
        &serde_json::json!({"operation": "batchTransfer", "itemCount": total, "batchId": batch_id}),
    );

    if opts.validate_first {
        let failures: Vec<BatchFailure> = pairs
            .iter()
            .enumerate()
            .filter_map(|(index, pair)| validate_pair(pair).err().map(|error| BatchFailure { index, error }))
            .collect();
        if !failures.is_empty() {
            logger.info(
                "batch:completed",
                &serde_json::json!({"operation": "batchTransfer", "itemCount": total, "batchId": batch_id, "failed": failures.len()}),
            );
            return BatchResult {
                successful: Vec::new(),
                failed: failures,
                total_processed: total,
                batch_id,
                total_duration: started.elapsed(),
            };
        }
    }

    let mut successful = Vec::with_capacity(total);
    let mut failed = Vec::new();
    for (index, pair) in pairs.iter().enumerate() {
        match validate_pair(pair) {
            Ok(record) => successful.push(record),
            Err(error) => failed.push(BatchFailure { index, error }),
        }
    }

    logger.info(
        "batch:completed",
        &serde_json::json!({"operation": "batchTransfer", "itemCount": total, "batchId": batch_id, "succeeded": successful.len(), "failed": failed.len()}),
    );
    BatchResult { successful, failed, total_processed: total, batch_id, total_duration: started.elapsed() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use originals_infosec::EphemeralSigner;

    async fn btco_log(signer: &EphemeralSigner) -> EventLog {
        use originals_bitcoin::{InscriptionRequest, InscriptionResult, Network, Utxo};
        use originals_storage::MemoryStorage;

        struct FakeInscriber;
        impl originals_bitcoin::BitcoinInscriber for FakeInscriber {
            async fn inscribe(&self, _r: InscriptionRequest) -> anyhow::Result<InscriptionResult> {
                Ok(InscriptionResult {
                    commit_txid: "c".repeat(64),
                    reveal_txid: "r".repeat(64),
                    inscription_id: format!("{}i0", "r".repeat(64)),
                    satoshi: 546,
                })
            }
        }

        let resources = vec![serde_json::json!({"digest": "uAAAA", "mediaType": "text/plain"})];
        let log = originals_did::peer::create("a", resources, "did:key:zC", signer).await.unwrap();
        let log = originals_did::webvh::migrate(&log, "example.com", &MemoryStorage::new(), signer).await.unwrap();
        let request = InscriptionRequest {
            content: vec![],
            content_type: String::new(),
            metadata: None,
            utxos: vec![Utxo { txid: "a".into(), vout: 0, value_sats: 1_000_000 }],
            change_address: "tb1qchange".into(),
            fee_rate: 10,
            network: Network::Signet,
        };
        originals_did::btco::migrate(&log, &FakeInscriber, request, signer).await.unwrap()
    }

    #[tokio::test]
    async fn valid_transfer_is_accepted() {
        let signer = EphemeralSigner::generate();
        let pairs = vec![TransferPair {
            asset: btco_log(&signer).await,
            destination: "tb1qexampledestinationaddress".into(),
        }];
        let logger = Logger::new("batch");
        let result = batch_transfer(pairs, &BatchOptions::default(), &logger);
        assert_eq!(result.successful.len(), 1);
    }

    #[tokio::test]
    async fn non_btco_asset_is_rejected() {
        let signer = EphemeralSigner::generate();
        let resources = vec![serde_json::json!({"digest": "uAAAA", "mediaType": "text/plain"})];
        let asset = originals_did::peer::create("a", resources, "did:key:zC", &signer).await.unwrap();
        let pairs =
            vec![TransferPair { asset, destination: "tb1qexampledestinationaddress".into() }];
        let logger = Logger::new("batch");
        let result = batch_transfer(pairs, &BatchOptions::default(), &logger);
        assert!(result.successful.is_empty());
        assert_eq!(result.failed.len(), 1);
    }

    #[tokio::test]
    async fn malformed_address_is_rejected() {
        let signer = EphemeralSigner::generate();
        let pairs =
            vec![TransferPair { asset: btco_log(&signer).await, destination: "notbech32".into() }];
        let logger = Logger::new("batch");
        let result = batch_transfer(pairs, &BatchOptions::default(), &logger);
        assert!(result.successful.is_empty());
    }
}
