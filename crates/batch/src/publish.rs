use std::sync::Arc;
use std::time::Instant;

use originals_cel::EventLog;
use originals_infosec::Signer;
use originals_storage::Storage;
use originals_telemetry::Logger;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::{new_batch_id, BatchFailure, BatchOptions, BatchResult};

fn validate_domain(domain: &str) -> Result<(), String> {
    if domain.is_empty() || domain.contains('/') || domain.contains(' ') {
        return Err(format!("{domain:?} is not a well-formed domain"));
    }
    if !domain.contains('.') {
        return Err(format!("{domain:?} is not a well-formed domain"));
    }
    Ok(())
}

/// Migrate many peer-layer logs to `domain`'s webvh layer concurrently.
pub async fn batch_publish<S, T>(
    assets: Vec<EventLog>,
    domain: &str,
    storage: Arc<T>,
    signer: Arc<S>,
    opts: &BatchOptions,
    logger: &Logger,
) -> BatchResult<EventLog>
where
    S: Signer + Send + Sync + 'static,
    T: Storage + Send + Sync + 'static,
{
    let started = Instant::now();
    let batch_id = new_batch_id();
    logger.info(
        "batch:started",
        &serde_json::json!({"operation": "batchPublish", "itemCount": assets.len(), "batchId": batch_id}),
    );

    if opts.validate_first {
        if let Err(error) = validate_domain(domain) {
            let total = assets.len();
            logger.info(
                "batch:completed",
                &serde_json::json!({"operation": "batchPublish", "itemCount": total, "batchId": batch_id, "failed": total}),
            );
            return BatchResult {
                successful: Vec::new(),
                failed: (0..total).map(|index| BatchFailure { index, error: error.clone() }).collect(),
                total_processed: total,
                batch_id,
                total_duration: started.elapsed(),
            };
        }
    }

    let semaphore = Arc::new(Semaphore::new(opts.max_concurrent.max(1)));
    let mut tasks = JoinSet::new();

    for (index, log) in assets.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore);
        let signer = Arc::clone(&signer);
        let storage = Arc::clone(&storage);
        let domain = domain.to_string();
        tasks.spawn(async move {
            let _permit = permit.acquire_owned().await.expect("semaphore is never closed");
            let result = originals_did::webvh::migrate(&log, &domain, &*storage, &*signer)
                .await
                .map_err(|e| e.to_string());
            (index, result)
        });
    }

    let mut successful = Vec::new();
    let mut failed = Vec::new();
    let mut total_processed = 0usize;
    while let Some(outcome) = tasks.join_next().await {
        total_processed += 1;
        let (index, result) = outcome.expect("batch_publish task panicked");
        match result {
            Ok(log) => successful.push(log),
            Err(error) => failed.push(BatchFailure { index, error }),
        }
    }

    logger.info(
        "batch:completed",
        &serde_json::json!({"operation": "batchPublish", "itemCount": total_processed, "batchId": batch_id, "succeeded": successful.len(), "failed": failed.len()}),
    );
    BatchResult { successful, failed, total_processed, batch_id, total_duration: started.elapsed() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use originals_infosec::EphemeralSigner;
    use originals_storage::MemoryStorage;

    async fn peer_log(signer: &EphemeralSigner, name: &str) -> EventLog {
        let resources = vec![serde_json::json!({"digest": "uAAAA", "mediaType": "text/plain"})];
        originals_did::peer::create(name, resources, "did:key:zC", signer).await.unwrap()
    }

    #[tokio::test]
    async fn publishes_all_assets() {
        let signer = Arc::new(EphemeralSigner::generate());
        let storage = Arc::new(MemoryStorage::new());
        let assets = vec![peer_log(&signer, "a").await, peer_log(&signer, "b").await];

        let logger = Logger::new("batch");
        let result =
            batch_publish(assets, "example.com", storage, signer, &BatchOptions::default(), &logger).await;
        assert_eq!(result.successful.len(), 2);
        assert!(result.failed.is_empty());
    }

    #[tokio::test]
    async fn rejects_malformed_domain_up_front() {
        let signer = Arc::new(EphemeralSigner::generate());
        let storage = Arc::new(MemoryStorage::new());
        let assets = vec![peer_log(&signer, "a").await];

        let logger = Logger::new("batch");
        let result =
            batch_publish(assets, "not a domain", storage, signer, &BatchOptions::default(), &logger).await;
        assert!(result.successful.is_empty());
        assert_eq!(result.failed.len(), 1);
    }
}
