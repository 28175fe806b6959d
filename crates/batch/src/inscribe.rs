use std::sync::Arc;
use std::time::Instant;

use originals_bitcoin::{estimate_fee, BitcoinInscriber, InscriptionRequest, InscriptionResult, Utxo};
use originals_cel::EventLog;
use originals_codec::encode_cbor;
use originals_infosec::Signer;
use originals_telemetry::Logger;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::{new_batch_id, BatchFailure, BatchOptions, BatchResult};

/// Options controlling `batch_inscribe`.
#[derive(Debug, Clone)]
pub struct InscribeOptions {
    /// Aggregate every asset into a single reveal transaction rather than
    /// inscribing each independently. Success is then atomic: either every
    /// asset gets the same `{txid, batchId}`, or none do.
    pub single_transaction: bool,
    /// Fee rate in sat/vB applied to the constructed transaction(s).
    pub fee_rate: u64,
    /// Funding UTXOs. For `single_transaction`, these fund the one combined
    /// commit; otherwise they are shared across the independent per-asset
    /// commits, each drawing from whatever remains available to it.
    pub utxos: Vec<Utxo>,
    /// Change address for commit transactions.
    pub change_address: String,
    /// Network the transactions target.
    pub network: originals_bitcoin::Network,
    /// Concurrency bound for the non-`single_transaction` path.
    pub max_concurrent: usize,
}

/// The savings a single combined inscription realized over inscribing every
/// asset independently.
#[derive(Debug, Clone, Serialize)]
pub struct CostSavings {
    /// `sum(individual fees) - batch fee`, in satoshis.
    pub amount_sats: i64,
    /// `amount_sats / sum(individual fees)`, as a fraction in `[0, 1]`.
    pub percentage: f64,
}

fn asset_payload(log: &EventLog) -> Result<Vec<u8>, String> {
    encode_cbor(log).map_err(|e| e.to_string())
}

/// Inscribe many webvh-layer logs on Bitcoin.
///
/// With `opts.single_transaction`, every asset's CBOR payload is concatenated
/// into one inscription and a single fee is computed and apportioned across
/// assets proportionally to each payload's byte length; either every asset
/// receives the resulting `{txid, batchId}` migration event, or (on failure)
/// none do. Without it, each asset is inscribed independently with
/// `opts.max_concurrent` bounding concurrency.
pub async fn batch_inscribe<S, I>(
    assets: Vec<EventLog>,
    signer: Arc<S>,
    inscriber: Arc<I>,
    opts: &InscribeOptions,
    logger: &Logger,
) -> (BatchResult<EventLog>, Option<CostSavings>)
where
    S: Signer + Send + Sync + 'static,
    I: BitcoinInscriber + Send + Sync + 'static,
{
    let started = Instant::now();
    let batch_id = new_batch_id();
    logger.info(
        "batch:started",
        &serde_json::json!({"operation": "batchInscribe", "itemCount": assets.len(), "batchId": batch_id}),
    );

    if opts.single_transaction {
        let outcome = batch_inscribe_single(assets, &signer, &inscriber, opts, batch_id.clone(), started).await;
        logger.info(
            "batch:completed",
            &serde_json::json!({
                "operation": "batchInscribe",
                "batchId": batch_id,
                "succeeded": outcome.0.successful.len(),
                "failed": outcome.0.failed.len(),
                "costSavings": outcome.1,
            }),
        );
        return outcome;
    }

    let semaphore = Arc::new(Semaphore::new(opts.max_concurrent.max(1)));
    let mut tasks = JoinSet::new();

    for (index, log) in assets.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore);
        let signer = Arc::clone(&signer);
        let inscriber = Arc::clone(&inscriber);
        let request = InscriptionRequest {
            content: Vec::new(),
            content_type: "application/cel+cbor".to_string(),
            metadata: None,
            utxos: opts.utxos.clone(),
            change_address: opts.change_address.clone(),
            fee_rate: opts.fee_rate,
            network: opts.network,
        };
        tasks.spawn(async move {
            let _permit = permit.acquire_owned().await.expect("semaphore is never closed");
            let result = inscribe_one(&log, request, &*inscriber, &*signer).await;
            (index, result)
        });
    }

    let mut successful = Vec::new();
    let mut failed = Vec::new();
    let mut total_processed = 0usize;
    while let Some(outcome) = tasks.join_next().await {
        total_processed += 1;
        let (index, result) = outcome.expect("batch_inscribe task panicked");
        match result {
            Ok(log) => successful.push(log),
            Err(error) => failed.push(BatchFailure { index, error }),
        }
    }

    logger.info(
        "batch:completed",
        &serde_json::json!({"operation": "batchInscribe", "batchId": batch_id, "succeeded": successful.len(), "failed": failed.len()}),
    );
    (
        BatchResult { successful, failed, total_processed, batch_id, total_duration: started.elapsed() },
        None,
    )
}

async fn inscribe_one<S: Signer, I: BitcoinInscriber>(
    log: &EventLog,
    request: InscriptionRequest,
    inscriber: &I,
    signer: &S,
) -> Result<EventLog, String> {
    originals_did::btco::migrate(log, inscriber, request, signer).await.map_err(|e| e.to_string())
}

fn ineligible_for_single_transaction(log: &EventLog) -> Option<String> {
    use originals_cel::{current_state, Layer};
    let layer = current_state(log).layer;
    (layer != Layer::WebVh)
        .then(|| format!("asset must be at the webvh layer to inscribe, found {layer:?}"))
}

async fn append_migration<S: Signer>(
    log: &EventLog,
    result: &InscriptionResult,
    signer: &S,
) -> Result<EventLog, String> {
    use originals_cel::{current_state, update, CelOptions};

    let state = current_state(log);
    let target_did = format!("did:btco:{}", result.inscription_id);
    let data = serde_json::json!({
        "sourceDid": state.did,
        "targetDid": target_did,
        "layer": "btco",
        "txid": result.reveal_txid,
        "inscriptionId": result.inscription_id,
        "satoshi": result.satoshi,
        "migratedAt": chrono::Utc::now().to_rfc3339(),
    });
    update(log, data, signer, &CelOptions::default()).await.map_err(|e| e.to_string())
}

async fn batch_inscribe_single<S, I>(
    assets: Vec<EventLog>,
    signer: &S,
    inscriber: &I,
    opts: &InscribeOptions,
    batch_id: String,
    started: Instant,
) -> (BatchResult<EventLog>, Option<CostSavings>)
where
    S: Signer,
    I: BitcoinInscriber,
{
    let total = assets.len();

    if let Some(ineligible) = assets.iter().enumerate().find_map(|(index, log)| {
        ineligible_for_single_transaction(log).map(|error| BatchFailure { index, error })
    }) {
        return (
            BatchResult {
                successful: Vec::new(),
                failed: vec![ineligible],
                total_processed: total,
                batch_id,
                total_duration: started.elapsed(),
            },
            None,
        );
    }

    let payloads: Vec<Result<Vec<u8>, String>> = assets.iter().map(asset_payload).collect();
    if let Some((index, error)) = payloads.iter().enumerate().find_map(|(i, r)| r.as_ref().err().map(|e| (i, e.clone()))) {
        return (
            BatchResult {
                successful: Vec::new(),
                failed: vec![BatchFailure { index, error }],
                total_processed: total,
                batch_id,
                total_duration: started.elapsed(),
            },
            None,
        );
    }
    let payloads: Vec<Vec<u8>> = payloads.into_iter().map(Result::unwrap).collect();

    let combined: Vec<u8> = payloads.iter().flat_map(|p| p.iter().copied()).collect();
    let content_too_large = combined.len() > originals_bitcoin::MAX_INSCRIPTION_CONTENT_BYTES;
    if content_too_large {
        return (
            BatchResult {
                successful: Vec::new(),
                failed: (0..total)
                    .map(|index| BatchFailure {
                        index,
                        error: "combined batch payload exceeds the inscription size limit".to_string(),
                    })
                    .collect(),
                total_processed: total,
                batch_id,
                total_duration: started.elapsed(),
            },
            None,
        );
    }

    let request = InscriptionRequest {
        content: combined,
        content_type: "application/cel+cbor-batch".to_string(),
        metadata: None,
        utxos: opts.utxos.clone(),
        change_address: opts.change_address.clone(),
        fee_rate: opts.fee_rate,
        network: opts.network,
    };

    let result = match inscriber.inscribe(request).await {
        Ok(r) => r,
        Err(e) => {
            let error = e.to_string();
            return (
                BatchResult {
                    successful: Vec::new(),
                    failed: (0..total).map(|index| BatchFailure { index, error: error.clone() }).collect(),
                    total_processed: total,
                    batch_id,
                    total_duration: started.elapsed(),
                },
                None,
            );
        }
    };

    let mut successful = Vec::with_capacity(total);
    let mut failed = Vec::new();
    for (index, log) in assets.iter().enumerate() {
        match append_migration(log, &result, signer).await {
            Ok(updated) => successful.push(updated),
            Err(error) => failed.push(BatchFailure { index, error }),
        }
    }

    let savings = compute_cost_savings(&payloads, opts.fee_rate);

    (
        BatchResult {
            successful,
            failed,
            total_processed: total,
            batch_id,
            total_duration: started.elapsed(),
        },
        Some(savings),
    )
}

/// Fee this batch paid, versus the sum of what inscribing each payload
/// independently would have cost at the same fee rate, apportioned
/// proportionally to each payload's byte length.
fn compute_cost_savings(payloads: &[Vec<u8>], fee_rate: u64) -> CostSavings {
    let witness_size = |len: usize| len + 64;

    let batch_witness_size: usize = payloads.iter().map(|p| p.len()).sum::<usize>() + 64;
    let batch_fee = estimate_fee(0, &[batch_witness_size], 1, 0, fee_rate)
        .map(|a| a.to_sat())
        .unwrap_or(0);

    let individual_total: u64 = payloads
        .iter()
        .map(|p| {
            estimate_fee(0, &[witness_size(p.len())], 1, 0, fee_rate)
                .map(|a| a.to_sat())
                .unwrap_or(0)
        })
        .sum();

    let amount_sats = individual_total as i64 - batch_fee as i64;
    let percentage = if individual_total == 0 {
        0.0
    } else {
        amount_sats as f64 / individual_total as f64
    };

    CostSavings { amount_sats, percentage }
}

#[cfg(test)]
mod tests {
    use super::*;
    use originals_infosec::EphemeralSigner;

    struct FakeInscriber;

    impl BitcoinInscriber for FakeInscriber {
        async fn inscribe(&self, _request: InscriptionRequest) -> anyhow::Result<InscriptionResult> {
            Ok(InscriptionResult {
                commit_txid: "c".repeat(64),
                reveal_txid: "r".repeat(64),
                inscription_id: format!("{}i0", "r".repeat(64)),
                satoshi: 546,
            })
        }
    }

    fn opts() -> InscribeOptions {
        InscribeOptions {
            single_transaction: true,
            fee_rate: 10,
            utxos: vec![Utxo { txid: "a".into(), vout: 0, value_sats: 1_000_000 }],
            change_address: "tb1qchange".into(),
            network: originals_bitcoin::Network::Signet,
            max_concurrent: 4,
        }
    }

    async fn webvh_log(signer: &EphemeralSigner, name: &str) -> EventLog {
        use originals_storage::MemoryStorage;
        let resources = vec![serde_json::json!({"digest": "uAAAA", "mediaType": "text/plain"})];
        let log = originals_did::peer::create(name, resources, "did:key:zC", signer).await.unwrap();
        originals_did::webvh::migrate(&log, "example.com", &MemoryStorage::new(), signer).await.unwrap()
    }

    #[tokio::test]
    async fn single_transaction_yields_savings_for_five_assets() {
        let signer = Arc::new(EphemeralSigner::generate());
        let inscriber = Arc::new(FakeInscriber);
        let mut assets = Vec::new();
        for i in 0..5 {
            assets.push(webvh_log(&signer, &format!("asset-{i}")).await);
        }

        let logger = Logger::new("batch");
        let (result, savings) = batch_inscribe(assets, signer, inscriber, &opts(), &logger).await;
        assert_eq!(result.successful.len(), 5);
        assert!(result.failed.is_empty());
        let savings = savings.expect("single_transaction always reports savings");
        assert!(savings.percentage >= 0.30, "expected >=30% savings for a 5-asset batch, got {}", savings.percentage);
    }

    #[tokio::test]
    async fn independent_inscription_succeeds_per_asset() {
        let signer = Arc::new(EphemeralSigner::generate());
        let inscriber = Arc::new(FakeInscriber);
        let assets = vec![webvh_log(&signer, "solo").await];
        let mut independent = opts();
        independent.single_transaction = false;

        let logger = Logger::new("batch");
        let (result, savings) = batch_inscribe(assets, signer, inscriber, &independent, &logger).await;
        assert_eq!(result.successful.len(), 1);
        assert!(savings.is_none());
    }
}
