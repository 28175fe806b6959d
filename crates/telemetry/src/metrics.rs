use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

/// Accumulated statistics for a single named operation.
#[derive(Debug, Default, Clone, Copy, serde::Serialize)]
pub struct OperationStats {
    /// Number of times the operation was recorded.
    pub count: u64,
    /// Sum of all recorded durations, in milliseconds.
    pub total_time_ms: u64,
    /// Smallest recorded duration, in milliseconds.
    pub min_time_ms: u64,
    /// Largest recorded duration, in milliseconds.
    pub max_time_ms: u64,
    /// Number of times the operation was recorded as an error.
    pub error_count: u64,
}

#[derive(Default)]
struct AtomicStats {
    count: AtomicU64,
    total_time_ms: AtomicU64,
    min_time_ms: AtomicU64,
    max_time_ms: AtomicU64,
    error_count: AtomicU64,
}

impl AtomicStats {
    fn snapshot(&self) -> OperationStats {
        OperationStats {
            count: self.count.load(Ordering::Relaxed),
            total_time_ms: self.total_time_ms.load(Ordering::Relaxed),
            min_time_ms: self.min_time_ms.load(Ordering::Relaxed),
            max_time_ms: self.max_time_ms.load(Ordering::Relaxed),
            error_count: self.error_count.load(Ordering::Relaxed),
        }
    }
}

/// Process-wide operation metrics, exposed behind narrow atomic-update
/// methods rather than ambient mutable module state.
///
/// Construct one per application (or per `Config`, per the SDK facade) and
/// pass it through explicitly; do not reach for a hidden global.
#[derive(Default)]
pub struct MetricsCollector {
    operations: DashMap<String, AtomicStats>,
    assets_created: AtomicU64,
    assets_transferred: AtomicU64,
    migrations: DashMap<String, AtomicU64>,
    errors: DashMap<String, AtomicU64>,
}

impl MetricsCollector {
    /// Construct an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `operation` taking `duration_ms`,
    /// optionally as an error.
    pub fn record(&self, operation: &str, duration_ms: u64, is_error: bool) {
        let entry = self.operations.entry(operation.to_string()).or_default();
        entry.count.fetch_add(1, Ordering::Relaxed);
        entry.total_time_ms.fetch_add(duration_ms, Ordering::Relaxed);
        entry.min_time_ms.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |m| {
            Some(if m == 0 { duration_ms } else { m.min(duration_ms) })
        }).ok();
        entry.max_time_ms.fetch_max(duration_ms, Ordering::Relaxed);
        if is_error {
            entry.error_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Increment the asset-created counter.
    pub fn record_asset_created(&self) {
        self.assets_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the asset-transferred counter.
    pub fn record_asset_transferred(&self) {
        self.assets_transferred.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the migration counter for `from -> to` (short layer names,
    /// e.g. `"peer"` / `"webvh"` / `"btco"`).
    pub fn record_migration(&self, from: &str, to: &str) {
        let key = format!("{from}->{to}");
        self.migrations.entry(key).or_default().fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the error counter for `code`.
    pub fn record_error(&self, code: &str) {
        self.errors.entry(code.to_string()).or_default().fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot stats for `operation`, if any were recorded.
    #[must_use]
    pub fn operation(&self, operation: &str) -> Option<OperationStats> {
        self.operations.get(operation).map(|s| s.snapshot())
    }

    /// Export a pretty-printed JSON snapshot of all counters.
    #[must_use]
    pub fn export_json(&self) -> serde_json::Value {
        let operations: serde_json::Map<String, serde_json::Value> = self
            .operations
            .iter()
            .map(|e| (e.key().clone(), serde_json::to_value(e.value().snapshot()).unwrap()))
            .collect();
        let migrations: serde_json::Map<String, serde_json::Value> = self
            .migrations
            .iter()
            .map(|e| (e.key().clone(), serde_json::json!(e.value().load(Ordering::Relaxed))))
            .collect();
        let errors: serde_json::Map<String, serde_json::Value> = self
            .errors
            .iter()
            .map(|e| (e.key().clone(), serde_json::json!(e.value().load(Ordering::Relaxed))))
            .collect();

        serde_json::json!({
            "operations": operations,
            "assetsCreated": self.assets_created.load(Ordering::Relaxed),
            "assetsTransferred": self.assets_transferred.load(Ordering::Relaxed),
            "assetsMigrated": migrations,
            "errors": errors,
        })
    }

    /// Export counters as Prometheus text exposition format.
    #[must_use]
    pub fn export_prometheus(&self) -> String {
        let mut out = String::new();
        out.push_str("# TYPE originals_assets_created counter\n");
        out.push_str(&format!(
            "originals_assets_created {}\n",
            self.assets_created.load(Ordering::Relaxed)
        ));
        out.push_str("# TYPE originals_assets_transferred counter\n");
        out.push_str(&format!(
            "originals_assets_transferred {}\n",
            self.assets_transferred.load(Ordering::Relaxed)
        ));
        for e in &self.operations {
            let stats = e.value().snapshot();
            let op = e.key();
            out.push_str(&format!(
                "originals_operation_duration_ms_sum{{operation=\"{op}\"}} {}\n",
                stats.total_time_ms
            ));
            out.push_str(&format!(
                "originals_operation_count{{operation=\"{op}\"}} {}\n",
                stats.count
            ));
            out.push_str(&format!(
                "originals_operation_errors{{operation=\"{op}\"}} {}\n",
                stats.error_count
            ));
        }
        out
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.operations.clear();
        self.migrations.clear();
        self.errors.clear();
        self.assets_created.store(0, Ordering::Relaxed);
        self.assets_transferred.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_min_max_and_count() {
        let metrics = MetricsCollector::new();
        metrics.record("create", 10, false);
        metrics.record("create", 30, false);
        metrics.record("create", 5, true);
        let stats = metrics.operation("create").unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min_time_ms, 5);
        assert_eq!(stats.max_time_ms, 30);
        assert_eq!(stats.error_count, 1);
    }

    #[test]
    fn reset_clears_counters() {
        let metrics = MetricsCollector::new();
        metrics.record_asset_created();
        metrics.reset();
        assert_eq!(metrics.export_json()["assetsCreated"], 0);
    }

    #[test]
    fn prometheus_export_contains_counters() {
        let metrics = MetricsCollector::new();
        metrics.record("verify", 2, false);
        let text = metrics.export_prometheus();
        assert!(text.contains("originals_operation_count{operation=\"verify\"} 1"));
    }
}
