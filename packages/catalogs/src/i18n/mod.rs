//! I18n Module
//!
//! Message extraction, catalog model, merging, filtering and the gettext
//! storage formats.

pub mod catalog;
pub mod catalog_filter;
pub mod catalog_merger;
pub mod extraction;
pub mod extractors;
pub mod locale_resolver;
pub mod message;
pub mod message_bundle;
pub mod serializers;
pub mod source_scanner;

pub use catalog::{Catalog, Header};
pub use catalog_filter::PathFilter;
pub use catalog_merger::merge;
pub use extraction::{ExtractionOutput, ExtractionPipeline};
pub use locale_resolver::LocaleResolver;
pub use message::{Location, Message, MessageFlags};
pub use message_bundle::MessageBundle;
pub use serializers::{Mo, Po, Serializer};
pub use source_scanner::{SourceFile, SourceKind, SourceScanner};
