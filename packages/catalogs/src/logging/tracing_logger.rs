// Tracing Logger
//
// Logger that forwards to the `tracing` macros. Filtering happens in the
// subscriber the binary installs, so every level is enabled here.

use super::logger::{LogLevel, Logger};

#[derive(Debug, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn level(&self) -> LogLevel {
        LogLevel::Debug
    }

    fn debug(&self, msg: &str) {
        tracing::debug!(target: "pod_catalogs", "{}", msg);
    }

    fn info(&self, msg: &str) {
        tracing::info!(target: "pod_catalogs", "{}", msg);
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(target: "pod_catalogs", "{}", msg);
    }

    fn error(&self, msg: &str) {
        tracing::error!(target: "pod_catalogs", "{}", msg);
    }
}
