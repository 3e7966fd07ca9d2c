//! Catalog Module
//!
//! An ordered set of messages for one locale (or none, for the template)
//! together with the gettext header.

use crate::i18n::message::{entry_key, Message};
use crate::locale::{Locale, PluralForms};
use indexmap::IndexMap;
use time::OffsetDateTime;

pub const CREATION_DATE: &str = "POT-Creation-Date";
pub const REVISION_DATE: &str = "PO-Revision-Date";
pub const PLURAL_FORMS: &str = "Plural-Forms";
pub const LANGUAGE: &str = "Language";

/// Header of a catalog. Comment lines are kept exactly as read; fields keep
/// their file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub comments: Vec<String>,
    pub fields: IndexMap<String, String>,
}

impl Header {
    pub fn for_template(project: &str, now: &str) -> Self {
        let comments = vec![
            format!("# Translations template for {}.", project),
            format!(
                "# This file is distributed under the same license as the {} project.",
                project
            ),
            "#".to_string(),
            "#, fuzzy".to_string(),
        ];
        let fields = [
            ("Project-Id-Version", project.to_string()),
            ("Report-Msgid-Bugs-To", String::new()),
            (CREATION_DATE, now.to_string()),
            (REVISION_DATE, "YEAR-MO-DA HO:MI+ZONE".to_string()),
            ("Last-Translator", "FULL NAME <EMAIL@ADDRESS>".to_string()),
            ("Language-Team", "LANGUAGE <LL@li.org>".to_string()),
            ("MIME-Version", "1.0".to_string()),
            ("Content-Type", "text/plain; charset=utf-8".to_string()),
            ("Content-Transfer-Encoding", "8bit".to_string()),
            ("Generated-By", generated_by()),
        ];
        Header {
            comments,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    pub fn for_locale(locale: &Locale, project: &str, creation_date: &str, now: &str) -> Self {
        let comments = vec![
            format!("# {} translations for {}.", locale, project),
            format!(
                "# This file is distributed under the same license as the {} project.",
                project
            ),
            "#".to_string(),
        ];
        let fields = [
            ("Project-Id-Version", project.to_string()),
            ("Report-Msgid-Bugs-To", String::new()),
            (CREATION_DATE, creation_date.to_string()),
            (REVISION_DATE, now.to_string()),
            ("Last-Translator", "FULL NAME <EMAIL@ADDRESS>".to_string()),
            (LANGUAGE, locale.to_string()),
            ("Language-Team", format!("{} <LL@li.org>", locale)),
            (PLURAL_FORMS, locale.plural_forms().to_string()),
            ("MIME-Version", "1.0".to_string()),
            ("Content-Type", "text/plain; charset=utf-8".to_string()),
            ("Content-Transfer-Encoding", "8bit".to_string()),
            ("Generated-By", generated_by()),
        ];
        Header {
            comments,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Overwrite an existing field in place, or append a new one.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        match self.fields.get_mut(key) {
            Some(slot) => *slot = value.into(),
            None => {
                self.fields.insert(key.to_string(), value.into());
            }
        }
    }

    /// The header msgstr (`Key: value\n` per field).
    pub fn to_msgstr(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}: {}\n", k, v))
            .collect()
    }

    /// Rebuild fields from a header msgstr. Lines without a colon are
    /// ignored.
    pub fn parse_fields(msgstr: &str) -> IndexMap<String, String> {
        msgstr
            .split('\n')
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| {
                let value = value.strip_prefix(' ').unwrap_or(value);
                (key.trim().to_string(), value.to_string())
            })
            .collect()
    }
}

fn generated_by() -> String {
    format!("pod-catalogs {}", env!("CARGO_PKG_VERSION"))
}

/// Timestamp in the gettext header format, e.g. `2024-05-01 13:37+0000`.
pub fn header_timestamp() -> String {
    let now = OffsetDateTime::now_utc();
    let format = time::format_description::parse("[year]-[month]-[day] [hour]:[minute]+0000");
    match format.ok().and_then(|f| now.format(&f).ok()) {
        Some(formatted) => formatted,
        None => format!(
            "{:04}-{:02}-{:02} {:02}:{:02}+0000",
            now.year(),
            u8::from(now.month()),
            now.day(),
            now.hour(),
            now.minute()
        ),
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub locale: Option<Locale>,
    pub header: Header,
    messages: IndexMap<String, Message>,
    /// Whether the catalog was read from storage.
    pub exists: bool,
}

impl Catalog {
    pub fn new(locale: Option<Locale>, header: Header) -> Self {
        Catalog {
            locale,
            header,
            messages: IndexMap::new(),
            exists: false,
        }
    }

    pub fn template(project: &str) -> Self {
        Catalog::new(None, Header::for_template(project, &header_timestamp()))
    }

    pub fn for_locale(locale: &Locale, project: &str, creation_date: Option<&str>) -> Self {
        let now = header_timestamp();
        let header = Header::for_locale(locale, project, creation_date.unwrap_or(&now), &now);
        Catalog::new(Some(locale.clone()), header)
    }

    pub fn is_template(&self) -> bool {
        self.locale.is_none()
    }

    /// Number of plural slots for plural entries of this catalog.
    pub fn nplurals(&self) -> usize {
        self.header
            .get(PLURAL_FORMS)
            .and_then(PluralForms::parse_nplurals)
            .or_else(|| self.locale.as_ref().map(|l| l.plural_forms().nplurals))
            .unwrap_or(2)
    }

    /// Insert a message, replacing any entry with the same context and
    /// msgid in place.
    pub fn insert(&mut self, message: Message) {
        self.messages.insert(message.key(), message);
    }

    /// The entry for `id` without a context.
    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.get(id)
    }

    pub fn get_in(&self, context: Option<&str>, id: &str) -> Option<&Message> {
        self.messages.get(&entry_key(context, id))
    }

    /// The entry with the same context and msgid as `message`.
    pub fn find(&self, message: &Message) -> Option<&Message> {
        self.messages.get(&message.key())
    }

    pub fn find_mut(&mut self, message: &Message) -> Option<&mut Message> {
        self.messages.get_mut(&message.key())
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.messages.get_mut(id)
    }

    /// Whether an entry (live or obsolete) without a context exists for `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.messages.contains_key(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Message> {
        self.messages.shift_remove(id)
    }

    /// Entries, live and obsolete.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.values()
    }

    pub fn live(&self) -> impl Iterator<Item = &Message> {
        self.messages.values().filter(|m| !m.is_obsolete())
    }

    pub fn obsolete(&self) -> impl Iterator<Item = &Message> {
        self.messages.values().filter(|m| m.is_obsolete())
    }

    /// Msgids in catalog order. Entries that differ only in context
    /// repeat their msgid.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.messages.values().map(|m| m.id.as_str())
    }

    /// Live entries with a complete translation.
    pub fn num_translated(&self) -> usize {
        self.live().filter(|m| m.is_translated()).count()
    }

    /// Live entries a translator still has to look at.
    pub fn untranslated(&self) -> impl Iterator<Item = &Message> {
        self.live().filter(|m| !m.is_translated() || m.is_fuzzy())
    }

    /// The subset of live messages whose extraction scope contains `locale`.
    pub fn scoped_to(&self, locale: &Locale) -> Catalog {
        let mut scoped = Catalog::new(None, self.header.clone());
        for message in self.live().filter(|m| m.locales.contains(locale)) {
            scoped.insert(message.clone());
        }
        scoped
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Message;
    type IntoIter = indexmap::map::Values<'a, String, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.values()
    }
}
