//! Serializers Module
//!
//! Catalog storage formats: gettext PO (text, read/write) and MO (binary,
//! produced by `compile`).

pub mod mo;
pub mod po;
pub mod serializer;

pub use mo::Mo;
pub use po::Po;
pub use serializer::Serializer;
