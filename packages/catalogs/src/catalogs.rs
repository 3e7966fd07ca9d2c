//! Catalogs
//!
//! The operation surface of the engine. A `Catalogs` value is bound to one
//! pod: its storage, its `podspec.yaml` and the layout of its translations
//! directory. Every operation reads what it needs from storage, so values
//! are cheap to create and hold no catalog state between calls.

use crate::config::{catalog_path_in, CatalogsOptions, Podspec};
use crate::error::{CatalogError, Result};
use crate::file_system::{AsReadonly, FileSystem, PodPath};
use crate::i18n::catalog::{header_timestamp, Catalog, Header, CREATION_DATE, REVISION_DATE};
use crate::i18n::catalog_filter::{self, PathFilter};
use crate::i18n::catalog_merger::merge;
use crate::i18n::extraction::ExtractionPipeline;
use crate::i18n::serializers::{Mo, Po, Serializer};
use crate::locale::{parse_locales, Locale};
use crate::logging::{Logger, TracingLogger};
use crate::parse_util::ParseError;
use crate::providers::ContentProvider;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Options for [`Catalogs::extract`]. Unset flags fall back to the
/// `localization.extract` block of the podspec.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Keep messages of the previous template that were not found again,
    /// as obsolete template entries.
    pub include_obsolete: Option<bool>,
    /// Write one catalog per locale instead of the template.
    pub localized: Option<bool>,
    /// Restrict localized output to these locales.
    pub locales: Option<Vec<String>>,
    /// Delete locale catalog entries that are no longer extracted. Without
    /// it they stay in the catalog as obsolete (`#~`) entries.
    pub purge_obsolete: bool,
}

/// Result of [`Catalogs::extract`].
#[derive(Debug)]
pub struct Extraction {
    pub template: Catalog,
    pub warnings: Vec<ParseError>,
    /// Number of source files visited.
    pub files: usize,
    /// Catalog files that were (re)written.
    pub written: Vec<PodPath>,
}

/// Options for [`Catalogs::filter`].
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub locales: Vec<String>,
    pub paths: Option<Vec<String>>,
    /// Destination of the shared catalog.
    pub out_path: Option<String>,
    /// Root of the per-locale catalogs.
    pub out_dir: Option<String>,
    pub localized: bool,
}

/// Per-locale outcome of [`Catalogs::update`].
#[derive(Debug, Default)]
pub struct UpdateReport {
    pub updated: Vec<Locale>,
    pub failures: Vec<(Locale, CatalogError)>,
}

impl UpdateReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Catalogs {
    fs: Arc<dyn FileSystem>,
    podspec: Podspec,
    options: CatalogsOptions,
    logger: Arc<dyn Logger>,
    cancelled: Arc<AtomicBool>,
    providers: Vec<Box<dyn ContentProvider>>,
}

impl Catalogs {
    /// Bind to the pod stored in `fs`. Fails when `podspec.yaml` is missing
    /// or invalid.
    pub fn new(fs: Arc<dyn FileSystem>) -> Result<Self> {
        let podspec = Podspec::load(fs.as_readonly())?;
        let mut options = CatalogsOptions::default();
        if let Some(project) = &podspec.project {
            options.project_name = project.clone();
        }
        Ok(Catalogs {
            fs,
            podspec,
            options,
            logger: Arc::new(TracingLogger::new()),
            cancelled: Arc::new(AtomicBool::new(false)),
            providers: Vec::new(),
        })
    }

    pub fn with_options(mut self, options: CatalogsOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_provider(mut self, provider: Box<dyn ContentProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Setting the returned flag stops a running extraction. The run ends
    /// with [`CatalogError::Cancelled`] and writes nothing.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn podspec(&self) -> &Podspec {
        &self.podspec
    }

    pub fn options(&self) -> &CatalogsOptions {
        &self.options
    }

    /// The locales the project declares, in podspec order.
    pub fn list_locales(&self) -> Vec<Locale> {
        self.podspec.locales().into_iter().collect()
    }

    pub fn template_path(&self) -> PodPath {
        self.options.template_path()
    }

    pub fn catalog_path(&self, locale: &Locale) -> PodPath {
        self.options.catalog_path(locale)
    }

    // ------------------------------------------------------------------
    // Reading

    /// The catalog of `locale`. A missing file yields an empty catalog with
    /// `exists == false`.
    pub fn get(&self, locale: &str) -> Result<Catalog> {
        let locale = Locale::parse(locale)?;
        self.get_locale(&locale)
    }

    fn get_locale(&self, locale: &Locale) -> Result<Catalog> {
        let path = self.catalog_path(locale);
        if !self.fs.exists(&path) {
            return Ok(Catalog::for_locale(locale, &self.options.project_name, None));
        }
        let mut catalog = self.read(&path)?;
        if catalog.locale.is_none() {
            catalog.locale = Some(locale.clone());
        }
        Ok(catalog)
    }

    /// The template, or the template file named `basename` in the
    /// translations directory.
    pub fn get_template(&self, basename: Option<&str>) -> Result<Catalog> {
        let path = match basename {
            Some(basename) => self.options.named_template_path(basename),
            None => self.template_path(),
        };
        if !self.fs.exists(&path) {
            return Ok(Catalog::template(&self.options.project_name));
        }
        self.read(&path)
    }

    fn read(&self, path: &PodPath) -> Result<Catalog> {
        let content = self
            .fs
            .read_file_buffer(path)
            .map_err(|e| CatalogError::io(path.as_str(), e))?;
        let mut catalog = Po::new().load(&content, path.as_str())?;
        catalog.exists = true;
        Ok(catalog)
    }

    /// Existing locale catalogs, in locale directory order.
    pub fn iter(&self) -> Result<impl Iterator<Item = Result<Catalog>> + '_> {
        let root = PodPath::new(&self.options.translations_dir);
        let mut names = if self.fs.exists(&root) {
            self.fs
                .readdir(&root)
                .map_err(|e| CatalogError::io(root.as_str(), e))?
        } else {
            Vec::new()
        };
        names.retain(|name| !name.starts_with('.'));
        names.sort();
        let locales: Vec<Locale> = names
            .iter()
            .filter_map(|name| Locale::parse(name).ok())
            .filter(|locale| self.fs.exists(&self.catalog_path(locale)))
            .collect();
        Ok(locales.into_iter().map(move |locale| self.get_locale(&locale)))
    }

    /// All existing locale catalogs.
    pub fn catalogs(&self) -> Result<Vec<Catalog>> {
        self.iter()?.collect()
    }

    // ------------------------------------------------------------------
    // Writing

    /// Write the template unconditionally.
    pub fn write_template(&self, catalog: &Catalog) -> Result<()> {
        self.save(&self.template_path(), catalog)
    }

    /// Write a locale catalog to its place in the translations directory.
    pub fn write_catalog(&self, catalog: &Catalog) -> Result<()> {
        let locale = catalog
            .locale
            .as_ref()
            .ok_or_else(|| CatalogError::usage("cannot write a catalog without a locale"))?;
        self.save(&self.catalog_path(locale), catalog)
    }

    fn save(&self, path: &PodPath, catalog: &Catalog) -> Result<()> {
        self.fs
            .ensure_dir(&path.dirname())
            .map_err(|e| CatalogError::io(path.dirname().as_str(), e))?;
        self.fs
            .write_file(path, &Po::new().write(catalog))
            .map_err(|e| CatalogError::io(path.as_str(), e))?;
        self.logger.info(&format!(
            "Saved: {} ({}/{})",
            path,
            catalog.num_translated(),
            catalog.live().count()
        ));
        Ok(())
    }

    /// Write `catalog` unless its entries equal those of `previous`. The
    /// stored header is kept in that case, which keeps repeated runs
    /// byte-identical. Returns whether the file was written.
    fn save_if_changed(&self, path: &PodPath, catalog: &mut Catalog, previous: &Catalog) -> Result<bool> {
        let po = Po::new();
        if previous.exists && po.write_entries(previous) == po.write_entries(catalog) {
            catalog.header = previous.header.clone();
            self.logger.debug(&format!("Unchanged: {}", path));
            return Ok(false);
        }
        if previous.exists && catalog.locale.is_some() {
            catalog.header.set(REVISION_DATE, header_timestamp());
        }
        self.save(path, catalog)?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Operations

    /// Extract messages from the pod.
    ///
    /// Without `localized` the template is rebuilt and written. With
    /// `localized` the template is only returned, and each locale catalog
    /// is merged with the messages scoped to its locale.
    pub fn extract(&self, options: ExtractOptions) -> Result<Extraction> {
        let defaults = &self.podspec.localization.extract;
        let include_obsolete = options.include_obsolete.unwrap_or(defaults.include_obsolete);
        let localized = options.localized.unwrap_or(defaults.localized);

        let pipeline = ExtractionPipeline::new(
            self.fs.as_readonly(),
            &self.podspec,
            self.logger.as_ref(),
            &self.cancelled,
        );
        let output = pipeline.run()?;

        let previous = self.get_template(None)?;
        let header = Header::for_template(&self.options.project_name, &header_timestamp());
        let mut template = output
            .bundle
            .build_template(header, Some(&previous), include_obsolete);
        let warnings = output.bundle.warnings().to_vec();
        let mut written = Vec::new();

        if !localized {
            let path = self.template_path();
            if self.save_if_changed(&path, &mut template, &previous)? {
                written.push(path);
            }
        } else {
            let locales = match &options.locales {
                Some(requested) => parse_locales(requested)?,
                None => output.resolver.global().clone(),
            };
            for locale in &locales {
                let scoped = template.scoped_to(locale);
                let existing = self.get_locale(locale)?;
                let mut catalog =
                    self.merged(&existing, &scoped, options.purge_obsolete, &template);
                let path = self.catalog_path(locale);
                if self.save_if_changed(&path, &mut catalog, &existing)? {
                    written.push(path);
                }
                self.report_untranslated(&catalog);
            }
        }

        Ok(Extraction {
            template,
            warnings,
            files: output.files,
            written,
        })
    }

    /// Merge `template` into `existing`. A catalog that does not exist yet
    /// takes its creation date from `origin`.
    fn merged(&self, existing: &Catalog, template: &Catalog, purge: bool, origin: &Catalog) -> Catalog {
        let mut catalog = merge(existing, template, purge);
        if !existing.exists {
            if let Some(locale) = &existing.locale {
                catalog.header = Header::for_locale(
                    locale,
                    &self.options.project_name,
                    origin.header.get(CREATION_DATE).unwrap_or_default(),
                    &header_timestamp(),
                );
            }
        }
        catalog
    }

    fn report_untranslated(&self, catalog: &Catalog) {
        if let Some(locale) = &catalog.locale {
            self.logger.info(&format!(
                "{}: {} untranslated / {} total",
                locale,
                catalog.untranslated().count(),
                catalog.live().count()
            ));
        }
    }

    fn require_template(&self) -> Result<Catalog> {
        let template = self.get_template(None)?;
        if !template.exists {
            return Err(CatalogError::usage(format!(
                "{} does not exist; run extract first",
                self.template_path()
            )));
        }
        Ok(template)
    }

    /// Compile every existing locale catalog to `messages.mo` next to its
    /// `.po` file.
    pub fn compile(&self) -> Result<Vec<PodPath>> {
        let mo = Mo::new();
        let mut compiled = Vec::new();
        for catalog in self.iter()? {
            let catalog = catalog?;
            let Some(locale) = &catalog.locale else {
                continue;
            };
            let po_path = self.catalog_path(locale);
            let mo_path = po_path.dirname().join(&format!(
                "{}.{}",
                po_path.basename().trim_end_matches(".po"),
                mo.extension()
            ));
            self.fs
                .write_file(&mo_path, &mo.write(&catalog))
                .map_err(|e| CatalogError::io(mo_path.as_str(), e))?;
            self.logger.info(&format!(
                "Compiled: {} ({}/{})",
                mo_path,
                catalog.num_translated(),
                catalog.live().count()
            ));
            compiled.push(mo_path);
        }
        Ok(compiled)
    }

    /// Create catalogs for `locales` from the template. Existing catalogs
    /// are left alone. Returns the locales that were created.
    pub fn init<S: AsRef<str>>(&self, locales: &[S]) -> Result<Vec<Locale>> {
        let template = self.require_template()?;
        let mut created = Vec::new();
        for locale in parse_locales(locales)? {
            let path = self.catalog_path(&locale);
            if self.fs.exists(&path) {
                self.logger
                    .warn(&format!("Skipped: {} already exists", path));
                continue;
            }
            let empty = Catalog::for_locale(&locale, &self.options.project_name, None);
            let catalog = self.merged(&empty, &template, true, &template);
            self.save(&path, &catalog)?;
            created.push(locale);
        }
        Ok(created)
    }

    /// Merge the template into the catalogs of `locales` (all project
    /// locales when `None`). Entries missing from the template become
    /// obsolete, or are deleted with `purge_obsolete`. A failing locale does
    /// not stop the others.
    pub fn update<S: AsRef<str>>(
        &self,
        locales: Option<&[S]>,
        purge_obsolete: bool,
    ) -> Result<UpdateReport> {
        let template = self.require_template()?;
        let locales: Vec<Locale> = match locales {
            Some(requested) => parse_locales(requested)?.into_iter().collect(),
            None => self.list_locales(),
        };
        let mut report = UpdateReport::default();
        for locale in locales {
            match self.update_locale(&locale, &template, purge_obsolete) {
                Ok(()) => report.updated.push(locale),
                Err(e) => {
                    self.logger.error(&format!("{}: {}", locale, e));
                    report.failures.push((locale, e));
                }
            }
        }
        Ok(report)
    }

    fn update_locale(&self, locale: &Locale, template: &Catalog, purge: bool) -> Result<()> {
        let existing = self.get_locale(locale)?;
        let mut catalog = self.merged(&existing, template, purge, template);
        self.save_if_changed(&self.catalog_path(locale), &mut catalog, &existing)?;
        self.report_untranslated(&catalog);
        Ok(())
    }

    /// Reduced catalogs holding what still needs translation.
    ///
    /// Localized filtering writes one catalog per locale under `out_dir`;
    /// shared filtering writes one locale-less catalog to `out_path`.
    /// Results follow the order of `locales`.
    pub fn filter(&self, options: FilterOptions) -> Result<Vec<Catalog>> {
        let locales = parse_locales(&options.locales)?;
        let paths = PathFilter::new(options.paths.as_deref());

        if options.localized {
            let out_dir = options
                .out_dir
                .as_deref()
                .ok_or_else(|| CatalogError::usage("localized filtering needs an output directory"))?;
            let mut filtered = Vec::new();
            for locale in &locales {
                let catalog = catalog_filter::localized(&self.get_locale(locale)?, &paths);
                let path = catalog_path_in(out_dir, locale, &self.options.catalog_basename);
                self.save(&path, &catalog)?;
                self.report_untranslated(&catalog);
                filtered.push(catalog);
            }
            Ok(filtered)
        } else {
            let out_path = options
                .out_path
                .as_deref()
                .ok_or_else(|| CatalogError::usage("shared filtering needs an output path"))?;
            let catalogs = locales
                .iter()
                .map(|locale| self.get_locale(locale))
                .collect::<Result<Vec<_>>>()?;
            let header = Header::for_template(&self.options.project_name, &header_timestamp());
            let shared = catalog_filter::shared(&catalogs, &paths, header);
            self.save(&PodPath::new(out_path), &shared)?;
            Ok(vec![shared])
        }
    }

    /// Run the registered content providers, in registration order.
    pub fn run_providers(&self) -> Result<Vec<PodPath>> {
        let mut deposited = Vec::new();
        for provider in &self.providers {
            self.logger.info(&format!("Running provider: {}", provider.name()));
            deposited.extend(provider.run(self.fs.as_ref(), self.logger.as_ref())?);
        }
        Ok(deposited)
    }
}
