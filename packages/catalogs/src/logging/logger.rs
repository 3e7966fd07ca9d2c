// Catalog Engine Logger
//
// The sink for progress lines such as `Extracting: /views/home.html`,
// per-locale untranslated counts, and skipped files.

/// Severity of a progress line. Ordered so that a logger set to `Warn`
/// still receives `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

/// Where `Catalogs` and the extraction pipeline report what they did.
///
/// Shared across extraction workers, hence `Send + Sync`.
pub trait Logger: Send + Sync {
    /// Lowest level this logger keeps.
    fn level(&self) -> LogLevel;
    fn debug(&self, msg: &str);
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
    fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.level()
    }
}

/// Discards everything. For embedders that only want the returned results.
#[derive(Debug, Default)]
pub struct NullLogger;

impl NullLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for NullLogger {
    fn level(&self) -> LogLevel {
        LogLevel::Error
    }
    fn debug(&self, _msg: &str) {}
    fn info(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
}
