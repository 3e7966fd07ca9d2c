//! Catalog Filter Module
//!
//! Reduced catalogs for partial translation workflows: the live entries of
//! a locale catalog that still need a translator (untranslated or fuzzy),
//! optionally restricted to messages found in certain files.

use crate::file_system::PodPath;
use crate::i18n::catalog::{Catalog, Header};
use crate::i18n::message::Message;

/// Normalized path restriction. `None` keeps every message.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    paths: Option<Vec<String>>,
}

impl PathFilter {
    pub fn new<S: AsRef<str>>(paths: Option<&[S]>) -> Self {
        PathFilter {
            paths: paths.map(|paths| {
                paths
                    .iter()
                    .map(|p| PodPath::new(p.as_ref()).into_string())
                    .collect()
            }),
        }
    }

    pub fn accepts(&self, message: &Message) -> bool {
        match &self.paths {
            Some(paths) => message.has_location_in(paths.as_slice()),
            None => true,
        }
    }
}

/// Entries of `catalog` that need translation and pass `paths`.
pub fn select_untranslated<'c>(catalog: &'c Catalog, paths: &PathFilter) -> Vec<&'c Message> {
    catalog.untranslated().filter(|m| paths.accepts(m)).collect()
}

/// A catalog with the same locale and header as `catalog`, holding only
/// the selected entries.
pub fn localized(catalog: &Catalog, paths: &PathFilter) -> Catalog {
    let mut filtered = Catalog::new(catalog.locale.clone(), catalog.header.clone());
    for message in select_untranslated(catalog, paths) {
        filtered.insert(message.clone());
    }
    filtered
}

/// One locale-less catalog holding the union of the selections of every
/// catalog, without duplicates. Each entry's scope lists the locales that
/// need it.
pub fn shared(catalogs: &[Catalog], paths: &PathFilter, header: Header) -> Catalog {
    let mut union = Catalog::new(None, header);
    for catalog in catalogs {
        for message in select_untranslated(catalog, paths) {
            match union.find_mut(message) {
                Some(existing) => {
                    for location in &message.locations {
                        existing.add_location(location.clone());
                    }
                    existing.locales.extend(catalog.locale.iter().cloned());
                }
                None => {
                    let mut entry = Message {
                        id: message.id.clone(),
                        plural: message.plural.clone(),
                        context: message.context.clone(),
                        locations: message.locations.clone(),
                        auto_comments: message.auto_comments.clone(),
                        extra_flags: message.extra_flags.clone(),
                        ..Default::default()
                    };
                    entry.strings = match &entry.plural {
                        Some(_) => smallvec::smallvec![String::new(), String::new()],
                        None => smallvec::smallvec![String::new()],
                    };
                    entry.locales.extend(catalog.locale.iter().cloned());
                    union.insert(entry);
                }
            }
        }
    }
    union
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::message::Location;
    use crate::locale::Locale;

    fn catalog(locale: &str, entries: &[(&str, &str, &str)]) -> Catalog {
        let locale = Locale::parse(locale).unwrap();
        let mut catalog = Catalog::for_locale(&locale, "pod", Some("2024-01-01 00:00+0000"));
        for (id, translation, path) in entries {
            let mut message = Message::new(*id).with_translation(*translation);
            message.locations.push(Location::new(*path, None));
            catalog.insert(message);
        }
        catalog
    }

    #[test]
    fn should_select_untranslated_live_entries() {
        let mut de = catalog(
            "de",
            &[("Hello", "Hallo", "/views/a.html"), ("Bye", "", "/views/a.html"), ("Page", "", "/content/p.yaml")],
        );
        let mut gone = Message::new("Gone");
        gone.set_obsolete(true);
        de.insert(gone);

        let all = select_untranslated(&de, &PathFilter::default());
        assert_eq!(all.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(), vec!["Bye", "Page"]);

        let only = PathFilter::new(Some(&["content/p.yaml"][..]));
        assert_eq!(localized(&de, &only).len(), 1);
    }

    #[test]
    fn should_union_without_duplicates() {
        let de = catalog("de", &[("Bye", "", "/views/a.html"), ("Page", "", "/content/p.yaml")]);
        let fr = catalog("fr", &[("Bye", "", "/views/b.html"), ("Other", "", "/views/b.html")]);

        let union = shared(&[de, fr], &PathFilter::default(), Header::default());
        assert!(union.locale.is_none());
        assert_eq!(union.ids().collect::<Vec<_>>(), vec!["Bye", "Page", "Other"]);
        let bye = union.get("Bye").unwrap();
        assert_eq!(bye.locations.len(), 2);
        assert_eq!(bye.locales.len(), 2);
    }
}
