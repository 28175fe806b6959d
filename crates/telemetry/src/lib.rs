//! Logging context, sanitization, and metrics, layered on `tracing` rather
//! than a bespoke logging facade.
//!
//! A [`Logger`] wraps a colon-joined `tracing` span context; [`sanitize`]
//! walks a JSON value and redacts anything keyed like a secret before it
//! reaches a log sink; [`MetricsCollector`] tracks per-operation counters
//! exportable as JSON or Prometheus text.

mod logger;
mod metrics;
mod sanitize;

pub use logger::{Logger, Timer};
pub use metrics::{MetricsCollector, OperationStats};
pub use sanitize::sanitize;
