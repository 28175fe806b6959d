use std::sync::Arc;
use std::time::Instant;

use originals_cel::EventLog;
use originals_infosec::Signer;
use serde_json::Value;
use originals_telemetry::Logger;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::{new_batch_id, BatchFailure, BatchOptions, BatchResult};

/// One asset's `(name, resources)` pair, the input shape `batchCreate` takes
/// per item.
#[derive(Debug, Clone)]
pub struct ResourceList {
    /// Display name for the new asset.
    pub name: String,
    /// External resources to bind, as `{digest, mediaType, ...}` objects.
    pub resources: Vec<Value>,
}

fn validate(item: &ResourceList) -> Result<(), String> {
    if item.resources.is_empty() {
        return Err("resource list must contain at least one resource".to_string());
    }
    for (i, resource) in item.resources.iter().enumerate() {
        if resource.get("digest").and_then(Value::as_str).is_none() {
            return Err(format!("resource {i} is missing a required `digest` field"));
        }
        if resource.get("mediaType").and_then(Value::as_str).is_none() {
            return Err(format!("resource {i} is missing a required `mediaType` field"));
        }
    }
    Ok(())
}

/// Create many peer-layer asset logs concurrently.
///
/// If `opts.validate_first`, every item is validated before any dispatch
/// runs; a single invalid item fails the whole batch with every offending
/// index reported, and nothing is created.
pub async fn batch_create<S>(
    resource_lists: Vec<ResourceList>,
    creator: &str,
    signer: Arc<S>,
    opts: &BatchOptions,
    logger: &Logger,
) -> BatchResult<EventLog>
where
    S: Signer + Send + Sync + 'static,
{
    let started = Instant::now();
    let batch_id = new_batch_id();
    logger.info(
        "batch:started",
        &serde_json::json!({"operation": "batchCreate", "itemCount": resource_lists.len(), "batchId": batch_id}),
    );

    if opts.validate_first {
        let failures: Vec<BatchFailure> = resource_lists
            .iter()
            .enumerate()
            .filter_map(|(index, item)| validate(item).err().map(|error| BatchFailure { index, error }))
            .collect();
        if !failures.is_empty() {
            let total = resource_lists.len();
            logger.info(
                "batch:completed",
                &serde_json::json!({"operation": "batchCreate", "itemCount": total, "batchId": batch_id, "failed": failures.len()}),
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

    let semaphore = Arc::new(Semaphore::new(opts.max_concurrent.max(1)));
    let mut tasks = JoinSet::new();

    for (index, item) in resource_lists.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore);
        let signer = Arc::clone(&signer);
        let creator = creator.to_string();
        tasks.spawn(async move {
            let _permit = permit.acquire_owned().await.expect("semaphore is never closed");
            let result = originals_did::peer::create(&item.name, item.resources, &creator, &*signer)
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
        let (index, result) = outcome.expect("batch_create task panicked");
        match result {
            Ok(log) => successful.push(log),
            Err(error) => failed.push(BatchFailure { index, error }),
        }
    }

    logger.info(
        "batch:completed",
        &serde_json::json!({"operation": "batchCreate", "itemCount": total_processed, "batchId": batch_id, "succeeded": successful.len(), "failed": failed.len()}),
    );
    BatchResult { successful, failed, total_processed, batch_id, total_duration: started.elapsed() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use originals_infosec::EphemeralSigner;

    fn resources() -> Vec<Value> {
        vec![serde_json::json!({"digest": "uAAAA", "mediaType": "text/plain"})]
    }

    #[tokio::test]
    async fn creates_all_items_concurrently() {
        let signer = Arc::new(EphemeralSigner::generate());
        let items = vec![
            ResourceList { name: "a".into(), resources: resources() },
            ResourceList { name: "b".into(), resources: resources() },
        ];
        let logger = Logger::new("batch");
        let result = batch_create(items, "did:key:zC", signer, &BatchOptions::default(), &logger).await;
        assert_eq!(result.successful.len(), 2);
        assert!(result.failed.is_empty());
        assert_eq!(result.total_processed, 2);
    }

    #[tokio::test]
    async fn validate_first_rejects_whole_batch_on_bad_item() {
        let signer = Arc::new(EphemeralSigner::generate());
        let items = vec![
            ResourceList { name: "a".into(), resources: resources() },
            ResourceList { name: "bad".into(), resources: vec![] },
        ];
        let logger = Logger::new("batch");
        let result = batch_create(items, "did:key:zC", signer, &BatchOptions::default(), &logger).await;
        assert!(result.successful.is_empty());
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].index, 1);
    }
}
