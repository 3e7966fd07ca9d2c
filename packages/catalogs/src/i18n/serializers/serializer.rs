//! Serializer Module
//!
//! Base trait for catalog storage formats.

use crate::i18n::catalog::Catalog;
use crate::parse_util::ParseError;

/// A catalog file format.
pub trait Serializer {
    /// Serialize a catalog. Output depends only on the catalog, so writing
    /// the same catalog twice yields the same bytes.
    fn write(&self, catalog: &Catalog) -> Vec<u8>;

    /// Load a catalog from serialized content. `url` is used in error
    /// locations only.
    fn load(&self, content: &[u8], url: &str) -> Result<Catalog, ParseError>;

    /// File extension, without the dot.
    fn extension(&self) -> &'static str;
}
