//! Locale Resolver Module
//!
//! Decides which locales a message belongs to. Documents inherit from their
//! blueprint, blueprints from the project. Global content (templates,
//! tabular data, `/data` documents and the podspec) goes to every locale
//! declared anywhere in the pod.

use crate::locale::{Locale, LocaleSet};
use once_cell::sync::OnceCell;

/// Effective locales of a document: its own declaration, else its
/// blueprint's, else the project's.
pub fn resolve(
    document: Option<&LocaleSet>,
    blueprint: Option<&LocaleSet>,
    project: &LocaleSet,
) -> LocaleSet {
    document.or(blueprint).unwrap_or(project).clone()
}

#[derive(Debug)]
pub struct LocaleResolver {
    project: LocaleSet,
    declarations: Vec<LocaleSet>,
    global: OnceCell<LocaleSet>,
}

impl LocaleResolver {
    /// `declarations` are all document, part and blueprint declarations of
    /// the run, in scan order.
    pub fn new(project: LocaleSet, declarations: impl IntoIterator<Item = LocaleSet>) -> Self {
        LocaleResolver {
            project,
            declarations: declarations.into_iter().collect(),
            global: OnceCell::new(),
        }
    }

    pub fn project_locales(&self) -> &LocaleSet {
        &self.project
    }

    pub fn resolve(&self, document: Option<&LocaleSet>, blueprint: Option<&LocaleSet>) -> LocaleSet {
        resolve(document, blueprint, &self.project)
    }

    /// Union of all declared locales: project first, then first-seen order.
    /// Computed on first use.
    pub fn global(&self) -> &LocaleSet {
        self.global.get_or_init(|| {
            let mut all = self.project.clone();
            for declared in &self.declarations {
                all.extend(declared.iter().cloned());
            }
            all
        })
    }

    pub fn is_declared(&self, locale: &Locale) -> bool {
        self.global().contains(locale)
    }
}
