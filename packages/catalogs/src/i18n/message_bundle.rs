//! Message Bundle Module
//!
//! A container for messages extracted from pod sources. Extractions are
//! folded in scan order; the bundle deduplicates by msgid, merging
//! locations, scopes and extracted comments, and finally builds the
//! template catalog.

use crate::i18n::catalog::{Catalog, Header};
use crate::i18n::extractors::{ExtractedMessage, FileExtraction};
use crate::i18n::message::Message;
use crate::locale::PluralForms;
use crate::parse_util::{ParseError, ParseLocation};
use indexmap::IndexMap;

#[derive(Debug, Default)]
pub struct MessageBundle {
    messages: IndexMap<String, Message>,
    warnings: Vec<ParseError>,
}

impl MessageBundle {
    pub fn new() -> Self {
        MessageBundle::default()
    }

    pub fn update_from_extraction(&mut self, extraction: FileExtraction) {
        self.warnings.extend(extraction.warnings);
        for message in extraction.messages {
            self.add(message);
        }
    }

    pub fn add_warnings(&mut self, warnings: impl IntoIterator<Item = ParseError>) {
        self.warnings.extend(warnings);
    }

    /// Add one occurrence. The first occurrence of a msgid fixes its plural
    /// form; a later disagreement is reported and ignored.
    pub fn add(&mut self, extracted: ExtractedMessage) {
        let ExtractedMessage {
            id,
            plural,
            location,
            locales,
            auto_comments,
        } = extracted;

        match self.messages.get_mut(&id) {
            Some(message) => {
                if message.plural != plural {
                    self.warnings.push(ParseError::warning(
                        ParseLocation::new(location.path.clone(), 0, location.line.unwrap_or(1), 1),
                        format!("plural form of {:?} differs from its first occurrence", id),
                    ));
                }
                message.add_location(location);
                message.locales.extend(locales);
                for comment in &auto_comments {
                    message.add_auto_comment(comment);
                }
            }
            None => {
                let mut message = match plural {
                    Some(plural) => Message::new_plural(id.clone(), plural, PluralForms::template().nplurals),
                    None => Message::new(id.clone()),
                };
                message.add_location(location);
                message.locales = locales;
                for comment in &auto_comments {
                    message.add_auto_comment(comment);
                }
                self.messages.insert(id, message);
            }
        }
    }

    pub fn get_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.values()
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.get(id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn warnings(&self) -> &[ParseError] {
        &self.warnings
    }

    /// Build the template. Messages of `previous` that were not extracted
    /// again are kept as obsolete entries when `include_obsolete` is set and
    /// dropped otherwise.
    pub fn build_template(&self, header: Header, previous: Option<&Catalog>, include_obsolete: bool) -> Catalog {
        let mut template = Catalog::new(None, header);
        for message in self.messages.values() {
            template.insert(message.clone());
        }
        if include_obsolete {
            for old in previous.into_iter().flat_map(|p| p.iter()) {
                if template.find(old).is_some() {
                    continue;
                }
                let mut message = old.clone();
                message.set_obsolete(true);
                message.locales.clear();
                template.insert(message);
            }
        }
        template
    }
}
