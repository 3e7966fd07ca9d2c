//! Error types for the catalog engine.

use crate::parse_util::ParseError;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {0}")]
    Parse(#[from] ParseError),

    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("cannot write JSON to {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid locale identifier {0:?}")]
    Locale(String),

    #[error("{0}")]
    Usage(String),

    #[error("extraction cancelled")]
    Cancelled,
}

impl CatalogError {
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        CatalogError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        CatalogError::Usage(msg.into())
    }
}
