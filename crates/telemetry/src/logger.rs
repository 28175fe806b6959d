use std::time::Instant;

use tracing::{span, Level, Span};

/// A logging context identified by a colon-joined path (e.g.
/// `"batch:inscribe"`), backed by a `tracing` [`Span`].
///
/// Child loggers extend the parent's context rather than replacing it, so a
/// log line from deep in the batch engine still carries its ancestry.
#[derive(Debug, Clone)]
pub struct Logger {
    context: String,
    span: Span,
}

impl Logger {
    /// Create a root logger under `context`.
    #[must_use]
    pub fn new(context: impl Into<String>) -> Self {
        let context = context.into();
        let span = span!(Level::INFO, "originals", context = %context);
        Self { context, span }
    }

    /// Create a child logger whose context is `"{self}:{name}"`.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        let context = format!("{}:{name}", self.context);
        let span = span!(parent: &self.span, Level::INFO, "originals", context = %context);
        Self { context, span }
    }

    /// The full colon-joined context path.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Log at debug level, sanitizing `fields` first.
    pub fn debug(&self, message: &str, fields: &serde_json::Value) {
        let _enter = self.span.enter();
        tracing::debug!(context = %self.context, fields = %crate::sanitize(fields), "{message}");
    }

    /// Log at info level, sanitizing `fields` first.
    pub fn info(&self, message: &str, fields: &serde_json::Value) {
        let _enter = self.span.enter();
        tracing::info!(context = %self.context, fields = %crate::sanitize(fields), "{message}");
    }

    /// Log at warn level, sanitizing `fields` first.
    pub fn warn(&self, message: &str, fields: &serde_json::Value) {
        let _enter = self.span.enter();
        tracing::warn!(context = %self.context, fields = %crate::sanitize(fields), "{message}");
    }

    /// Log at error level, sanitizing `fields` first.
    pub fn error(&self, message: &str, fields: &serde_json::Value) {
        let _enter = self.span.enter();
        tracing::error!(context = %self.context, fields = %crate::sanitize(fields), "{message}");
    }

    /// Start timing an operation; dropping or calling [`Timer::finish`] logs
    /// its duration at debug level.
    #[must_use]
    pub fn start_timer(&self, operation: &str) -> Timer {
        Timer { logger: self.clone(), operation: operation.to_string(), started: Instant::now() }
    }
}

/// A running timer produced by [`Logger::start_timer`].
pub struct Timer {
    logger: Logger,
    operation: String,
    started: Instant,
}

impl Timer {
    /// Log the elapsed duration at debug level and return it.
    pub fn finish(self) -> std::time::Duration {
        let elapsed = self.started.elapsed();
        self.logger.debug(
            &format!("{} completed", self.operation),
            &serde_json::json!({"duration_ms": elapsed.as_millis()}),
        );
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_extends_context() {
        let root = Logger::new("batch");
        let child = root.child("inscribe");
        assert_eq!(child.context(), "batch:inscribe");
    }

    #[test]
    fn timer_reports_elapsed() {
        let logger = Logger::new("test");
        let timer = logger.start_timer("op");
        std::thread::sleep(std::time::Duration::from_millis(1));
        let elapsed = timer.finish();
        assert!(elapsed.as_millis() >= 1);
    }
}
