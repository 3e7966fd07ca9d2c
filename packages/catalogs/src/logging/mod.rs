//! Logging
//!
//! The engine reports progress through the `Logger` trait so embedders can
//! route or silence it. `TracingLogger` is the default.

pub mod capturing_logger;
pub mod logger;
pub mod tracing_logger;

pub use capturing_logger::CapturingLogger;
pub use logger::{LogLevel, Logger, NullLogger};
pub use tracing_logger::TracingLogger;
