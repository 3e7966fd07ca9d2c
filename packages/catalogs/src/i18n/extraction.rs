//! Extraction pipeline.
//!
//! scan → read and parse (parallel) → resolve locales → extract (parallel)
//! → fold into a [`MessageBundle`] in scan order.
//!
//! Parallel stages collect into vectors indexed like the scan, so the fold
//! and therefore the template are identical from run to run.

use crate::config::Podspec;
use crate::error::{CatalogError, Result};
use crate::file_system::{read_with_retry, PodPath, ReadonlyFileSystem};
use crate::i18n::extractors::ParsedSource;
use crate::i18n::locale_resolver::LocaleResolver;
use crate::i18n::message_bundle::MessageBundle;
use crate::i18n::source_scanner::{SourceFile, SourceScanner, BLUEPRINT_BASENAME};
use crate::locale::LocaleSet;
use crate::logging::Logger;
use crate::parse_util::{ParseError, ParseLocation};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

const CONTENT_ROOT: &str = "/content";

/// Result of one pipeline run.
#[derive(Debug)]
pub struct ExtractionOutput {
    pub bundle: MessageBundle,
    pub resolver: LocaleResolver,
    pub files: usize,
}

struct LoadedSource {
    file: SourceFile,
    parsed: Option<ParsedSource>,
    warnings: Vec<ParseError>,
}

pub struct ExtractionPipeline<'a> {
    fs: &'a dyn ReadonlyFileSystem,
    podspec: &'a Podspec,
    logger: &'a dyn Logger,
    cancelled: &'a AtomicBool,
}

impl<'a> ExtractionPipeline<'a> {
    pub fn new(
        fs: &'a dyn ReadonlyFileSystem,
        podspec: &'a Podspec,
        logger: &'a dyn Logger,
        cancelled: &'a AtomicBool,
    ) -> Self {
        ExtractionPipeline {
            fs,
            podspec,
            logger,
            cancelled,
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancelled.load(Ordering::SeqCst) {
            Err(CatalogError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub fn run(&self) -> Result<ExtractionOutput> {
        let scanner = SourceScanner::new(self.fs, &self.podspec.localization.extract.exclude)?;
        let files = scanner.scan().collect::<Result<Vec<_>>>()?;
        self.check_cancelled()?;

        let loaded: Vec<LoadedSource> = files.into_par_iter().map(|file| self.load(file)).collect();
        self.check_cancelled()?;

        let resolver = LocaleResolver::new(
            self.podspec.locales(),
            loaded
                .iter()
                .filter_map(|l| l.parsed.as_ref())
                .flat_map(|p| p.declarations().into_iter().cloned().collect::<Vec<_>>()),
        );
        let blueprints: HashMap<PodPath, Option<LocaleSet>> = loaded
            .iter()
            .filter(|l| l.file.is_blueprint())
            .map(|l| {
                let locales = l.parsed.as_ref().and_then(|p| p.localization()).cloned();
                (l.file.path.dirname(), locales)
            })
            .collect();

        let scopes: Vec<LocaleSet> = loaded
            .iter()
            .map(|l| self.effective_locales(l, &resolver, &blueprints))
            .collect();

        let extractions: Vec<_> = loaded
            .par_iter()
            .zip(scopes.par_iter())
            .map(|(source, scope)| {
                if self.cancelled.load(Ordering::SeqCst) {
                    return None;
                }
                source
                    .parsed
                    .as_ref()
                    .map(|parsed| parsed.extract(&source.file.path, scope))
            })
            .collect();
        self.check_cancelled()?;

        let mut bundle = MessageBundle::new();
        let files = loaded.len();
        for (source, extraction) in loaded.into_iter().zip(extractions) {
            self.logger.info(&format!("Extracting: {}", source.file.path));
            for warning in &source.warnings {
                self.logger.warn(&warning.to_string());
            }
            bundle.add_warnings(source.warnings);
            if let Some(extraction) = extraction {
                for warning in &extraction.warnings {
                    self.logger.warn(&warning.to_string());
                }
                bundle.update_from_extraction(extraction);
            }
        }
        for warning in bundle.warnings().iter().filter(|w| w.msg.starts_with("plural form")) {
            self.logger.warn(&warning.to_string());
        }

        Ok(ExtractionOutput {
            bundle,
            resolver,
            files,
        })
    }

    fn load(&self, file: SourceFile) -> LoadedSource {
        if self.cancelled.load(Ordering::SeqCst) {
            return LoadedSource {
                file,
                parsed: None,
                warnings: Vec::new(),
            };
        }
        match read_with_retry(self.fs, &file.path) {
            Ok(content) => match ParsedSource::parse(&file, &content) {
                Some((parsed, warnings)) => LoadedSource {
                    file,
                    parsed: Some(parsed),
                    warnings,
                },
                None => LoadedSource {
                    file,
                    parsed: None,
                    warnings: Vec::new(),
                },
            },
            Err(e) => {
                let warning = ParseError::warning(
                    ParseLocation::start_of(file.path.as_str()),
                    format!("could not read file: {}", e),
                );
                LoadedSource {
                    file,
                    parsed: None,
                    warnings: vec![warning],
                }
            }
        }
    }

    fn effective_locales(
        &self,
        source: &LoadedSource,
        resolver: &LocaleResolver,
        blueprints: &HashMap<PodPath, Option<LocaleSet>>,
    ) -> LocaleSet {
        if source.file.is_global() {
            return resolver.global().clone();
        }
        let blueprint = nearest_blueprint(&source.file.path, blueprints);
        if source.file.is_blueprint() {
            return resolver.resolve(None, blueprint);
        }
        let document = source.parsed.as_ref().and_then(|p| p.localization());
        resolver.resolve(document, blueprint)
    }
}

/// Locale declaration of the blueprint governing `path`: the one in its
/// directory or the closest ancestor under `/content`.
fn nearest_blueprint<'b>(
    path: &PodPath,
    blueprints: &'b HashMap<PodPath, Option<LocaleSet>>,
) -> Option<&'b LocaleSet> {
    let mut dir = path.dirname();
    loop {
        if let Some(locales) = blueprints.get(&dir) {
            return locales.as_ref();
        }
        if dir.as_str() == CONTENT_ROOT || !dir.starts_with_dir(CONTENT_ROOT) {
            return None;
        }
        dir = dir.dirname();
    }
}

/// Path of the blueprint file in `dir`.
pub fn blueprint_path(dir: &PodPath) -> PodPath {
    dir.join(BLUEPRINT_BASENAME)
}
