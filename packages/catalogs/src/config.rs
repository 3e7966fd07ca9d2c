//! Pod configuration.
//!
//! `podspec.yaml` declares the project's nominal locale set and extraction
//! defaults:
//!
//! ```yaml
//! localization:
//!   default_locale: en
//!   locales: [de, fr, en, it, ja]
//!   extract:
//!     include_obsolete: false
//!     localized: false
//!     exclude: ["/content/drafts/**"]
//! title@: Tagged field in podspec
//! ```
//!
//! The raw YAML tree is kept as well, since tagged fields may live anywhere
//! in the file.

use crate::error::{CatalogError, Result};
use crate::file_system::{PodPath, ReadonlyFileSystem};
use crate::locale::{Locale, LocaleSet};
use serde::Deserialize;

pub const PODSPEC_PATH: &str = "/podspec.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalizationConfig {
    pub default_locale: Option<Locale>,
    #[serde(default)]
    pub locales: Vec<Locale>,
    #[serde(default)]
    pub extract: ExtractConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractConfig {
    #[serde(default)]
    pub include_obsolete: bool,
    #[serde(default)]
    pub localized: bool,
    /// Glob patterns over pod paths that are never scanned.
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Podspec {
    pub localization: LocalizationConfig,
    pub project: Option<String>,
    pub raw: serde_yaml::Value,
}

impl Podspec {
    pub fn load(fs: &dyn ReadonlyFileSystem) -> Result<Self> {
        let path = PodPath::new(PODSPEC_PATH);
        let content = fs
            .read_file(&path)
            .map_err(|e| CatalogError::io(PODSPEC_PATH, e))?;
        Podspec::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let yaml_err = |source: serde_yaml::Error| CatalogError::Yaml {
            path: PODSPEC_PATH.to_string(),
            source,
        };
        let raw: serde_yaml::Value = if content.trim().is_empty() {
            serde_yaml::Value::Mapping(Default::default())
        } else {
            serde_yaml::from_str(content).map_err(yaml_err)?
        };
        let localization = match raw.get("localization") {
            Some(value) => serde_yaml::from_value(value.clone()).map_err(yaml_err)?,
            None => LocalizationConfig::default(),
        };
        let project = raw
            .get("project")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        Ok(Podspec {
            localization,
            project,
            raw,
        })
    }

    /// The nominal locale set, in declaration order.
    pub fn locales(&self) -> LocaleSet {
        self.localization.locales.iter().cloned().collect()
    }
}

/// Where catalogs live inside the pod and how they are labelled.
#[derive(Debug, Clone)]
pub struct CatalogsOptions {
    pub translations_dir: String,
    pub template_basename: String,
    pub catalog_basename: String,
    pub project_name: String,
}

impl Default for CatalogsOptions {
    fn default() -> Self {
        CatalogsOptions {
            translations_dir: "/translations".to_string(),
            template_basename: "messages.pot".to_string(),
            catalog_basename: "messages.po".to_string(),
            project_name: "pod".to_string(),
        }
    }
}

impl CatalogsOptions {
    pub fn template_path(&self) -> PodPath {
        PodPath::new(&self.translations_dir).join(&self.template_basename)
    }

    pub fn named_template_path(&self, basename: &str) -> PodPath {
        PodPath::new(&self.translations_dir).join(basename)
    }

    pub fn catalog_path(&self, locale: &Locale) -> PodPath {
        catalog_path_in(&self.translations_dir, locale, &self.catalog_basename)
    }
}

/// `<dir>/<locale>/LC_MESSAGES/<basename>`
pub fn catalog_path_in(dir: &str, locale: &Locale, basename: &str) -> PodPath {
    PodPath::new(dir)
        .join(locale.as_str())
        .join("LC_MESSAGES")
        .join(basename)
}
