//! Bounded-concurrency batch operations: create, publish, inscribe, and
//! transfer many assets with a single call, aggregating successes, failures,
//! and (for single-transaction inscription) fee savings.

mod create;
mod inscribe;
mod publish;
mod transfer;

pub use create::batch_create;
pub use inscribe::{batch_inscribe, CostSavings, InscribeOptions};
pub use publish::batch_publish;
pub use transfer::{batch_transfer, TransferPair, TransferRecord};

use std::time::Duration;

use serde::Serialize;

/// A single failed item in a batch, by index into the original input.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    /// Index of the failing item in the input slice.
    pub index: usize,
    /// What went wrong.
    pub error: String,
}

/// The outcome of a batch operation.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult<T> {
    /// Items that completed successfully, in no particular order.
    pub successful: Vec<T>,
    /// Items that failed, with their original index and error.
    pub failed: Vec<BatchFailure>,
    /// `successful.len() + failed.len()`.
    pub total_processed: usize,
    /// Identifier for this batch run, for telemetry correlation.
    pub batch_id: String,
    /// Wall-clock time the batch took end to end.
    pub total_duration: Duration,
}

/// Options shared by every batch operation.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Maximum number of items dispatched concurrently.
    pub max_concurrent: usize,
    /// Validate every item before dispatching any, failing the whole batch
    /// up front if any item is malformed.
    pub validate_first: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { max_concurrent: 8, validate_first: true }
    }
}

pub(crate) fn new_batch_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
