#![deny(clippy::all)]

/**
 * Pod Catalogs
 *
 * Localization catalog engine for pods: extraction, merging, filtering and
 * gettext serialization.
 */

pub mod catalogs;
pub mod config;
pub mod error;
pub mod file_system;
pub mod i18n;
pub mod locale;
pub mod logging;
pub mod parse_util;
pub mod providers;

// Re-exports
pub use catalogs::{Catalogs, Extraction, ExtractOptions, FilterOptions, UpdateReport};
pub use config::{CatalogsOptions, Podspec};
pub use error::{CatalogError, Result};
pub use i18n::{Catalog, Message};
pub use locale::{Locale, LocaleSet};

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
