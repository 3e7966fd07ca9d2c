#![deny(clippy::all)]

/**
 * Pod Catalogs CLI
 *
 * Command line front end for the catalog engine
 */
pub use pod_catalogs as catalogs;

pub mod commands;

/// CLI version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
