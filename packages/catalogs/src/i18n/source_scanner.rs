//! Source Scanner Module
//!
//! Walks the pod and yields every file that can carry translatable strings,
//! classified by kind.
//!
//! | area        | pattern                               | kind           |
//! |-------------|---------------------------------------|----------------|
//! | root        | `/podspec.yaml`                       | specification  |
//! | `/content/` | `*.yaml *.yml *.md *.html *.htm`      | document       |
//! | `/content/`, `/data/` | `*.csv`                     | tabular        |
//! | `/data/`    | `*.yaml *.yml`                        | document       |
//! | `/views/`   | `*.html *.htm *.jinja *.j2 *.txt *.xml` | template     |
//!
//! Everything else is skipped silently. Order is deterministic: areas in
//! the order root, content, data, views; within a directory entries are
//! sorted, with `_blueprint.yaml` first.

use crate::config::PODSPEC_PATH;
use crate::error::{CatalogError, Result};
use crate::file_system::{PodPath, ReadonlyFileSystem};

pub const BLUEPRINT_BASENAME: &str = "_blueprint.yaml";

const AREA_DIRS: [(&str, Area); 3] = [
    ("/content", Area::Content),
    ("/data", Area::Data),
    ("/views", Area::Views),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Template,
    Document,
    Tabular,
    Specification,
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    Root,
    Content,
    Data,
    Views,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PodPath,
    pub kind: SourceKind,
    pub area: Area,
}

impl SourceFile {
    pub fn is_blueprint(&self) -> bool {
        self.area == Area::Content && self.path.basename() == BLUEPRINT_BASENAME
    }

    /// Sources whose messages are scoped to every locale declared anywhere.
    pub fn is_global(&self) -> bool {
        match self.kind {
            SourceKind::Tabular | SourceKind::Specification | SourceKind::Template => true,
            SourceKind::Document => self.area == Area::Data,
            SourceKind::Unsupported => false,
        }
    }
}

/// Classify a pod path. Returns `None` outside the scanned areas.
pub fn classify(path: &PodPath) -> Option<(SourceKind, Area)> {
    if path.as_str() == PODSPEC_PATH {
        return Some((SourceKind::Specification, Area::Root));
    }
    let (_, area) = AREA_DIRS
        .iter()
        .find(|(dir, _)| path.starts_with_dir(dir))?;
    let extension = path.extension().unwrap_or_default();
    let kind = match (area, extension.as_str()) {
        (Area::Content, "yaml" | "yml" | "md" | "html" | "htm") => SourceKind::Document,
        (Area::Content | Area::Data, "csv") => SourceKind::Tabular,
        (Area::Data, "yaml" | "yml") => SourceKind::Document,
        (Area::Views, "html" | "htm" | "jinja" | "j2" | "txt" | "xml") => SourceKind::Template,
        _ => SourceKind::Unsupported,
    };
    Some((kind, *area))
}

pub struct SourceScanner<'a> {
    fs: &'a dyn ReadonlyFileSystem,
    excludes: Vec<glob::Pattern>,
}

impl<'a> SourceScanner<'a> {
    /// `exclude` holds glob patterns over pod paths (`/content/drafts/**`).
    pub fn new(fs: &'a dyn ReadonlyFileSystem, exclude: &[String]) -> Result<Self> {
        let excludes = exclude
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern).map_err(|e| {
                    CatalogError::usage(format!("invalid exclude pattern {:?}: {}", pattern, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SourceScanner { fs, excludes })
    }

    /// A fresh walk over the pod. Each call starts from the beginning.
    pub fn scan(&self) -> Scan<'_, 'a> {
        Scan {
            scanner: self,
            next_area: 0,
            root_done: false,
            stack: Vec::new(),
        }
    }

    fn is_excluded(&self, path: &PodPath) -> bool {
        self.excludes.iter().any(|p| p.matches(path.as_str()))
    }

    fn list(&self, dir: &PodPath) -> Result<std::vec::IntoIter<PodPath>> {
        let mut names = self
            .fs
            .readdir(dir)
            .map_err(|e| CatalogError::io(dir.as_str(), e))?;
        names.retain(|name| !name.starts_with('.'));
        names.sort_by(|a, b| {
            (a != BLUEPRINT_BASENAME)
                .cmp(&(b != BLUEPRINT_BASENAME))
                .then_with(|| a.cmp(b))
        });
        Ok(names
            .into_iter()
            .map(|name| dir.join(&name))
            .collect::<Vec<_>>()
            .into_iter())
    }
}

/// Lazy depth-first walk produced by [`SourceScanner::scan`]. An unreadable
/// directory yields one error and ends the walk.
pub struct Scan<'s, 'a> {
    scanner: &'s SourceScanner<'a>,
    next_area: usize,
    root_done: bool,
    stack: Vec<std::vec::IntoIter<PodPath>>,
}

impl Iterator for Scan<'_, '_> {
    type Item = Result<SourceFile>;

    fn next(&mut self) -> Option<Self::Item> {
        let fs = self.scanner.fs;
        if !self.root_done {
            self.root_done = true;
            let podspec = PodPath::new(PODSPEC_PATH);
            if fs.exists(&podspec) {
                return Some(Ok(SourceFile {
                    path: podspec,
                    kind: SourceKind::Specification,
                    area: Area::Root,
                }));
            }
        }

        loop {
            if self.stack.is_empty() {
                let (dir, _) = AREA_DIRS.get(self.next_area)?;
                self.next_area += 1;
                let dir = PodPath::new(dir);
                if !fs.exists(&dir) {
                    continue;
                }
                match self.scanner.list(&dir) {
                    Ok(entries) => self.stack.push(entries),
                    Err(e) => {
                        self.next_area = AREA_DIRS.len();
                        return Some(Err(e));
                    }
                }
                continue;
            }

            let Some(path) = self.stack.last_mut().and_then(|entries| entries.next()) else {
                self.stack.pop();
                continue;
            };
            if self.scanner.is_excluded(&path) {
                continue;
            }

            let is_directory = fs.stat(&path).map(|s| s.is_directory()).unwrap_or(false);
            if is_directory {
                match self.scanner.list(&path) {
                    Ok(children) => self.stack.push(children),
                    Err(e) => {
                        self.stack.clear();
                        self.next_area = AREA_DIRS.len();
                        return Some(Err(e));
                    }
                }
                continue;
            }

            match classify(&path) {
                Some((SourceKind::Unsupported, _)) | None => continue,
                Some((kind, area)) => return Some(Ok(SourceFile { path, kind, area })),
            }
        }
    }
}
