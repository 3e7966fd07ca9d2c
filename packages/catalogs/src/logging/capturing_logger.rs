// Capturing Logger
//
// Keeps every record in memory. Used by tests and by embedders that want to
// show the log after a run.

use super::logger::{LogLevel, Logger};
use std::sync::Mutex;

#[derive(Debug)]
pub struct CapturingLogger {
    level: LogLevel,
    records: Mutex<Vec<(LogLevel, String)>>,
}

impl CapturingLogger {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<(LogLevel, String)> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Messages logged at exactly `level`.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, msg)| msg)
            .collect()
    }

    fn push(&self, level: LogLevel, msg: &str) {
        if !self.is_enabled(level) {
            return;
        }
        let mut records = match self.records.lock() {
            Ok(records) => records,
            Err(poisoned) => poisoned.into_inner(),
        };
        records.push((level, msg.to_string()));
    }
}

impl Default for CapturingLogger {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

impl Logger for CapturingLogger {
    fn level(&self) -> LogLevel {
        self.level
    }

    fn debug(&self, msg: &str) {
        self.push(LogLevel::Debug, msg);
    }

    fn info(&self, msg: &str) {
        self.push(LogLevel::Info, msg);
    }

    fn warn(&self, msg: &str) {
        self.push(LogLevel::Warn, msg);
    }

    fn error(&self, msg: &str) {
        self.push(LogLevel::Error, msg);
    }
}
