//! Catalog Merger Module
//!
//! Brings an existing locale catalog up to date with a template. Entries
//! take their source facts (locations, extracted comments, plural msgid)
//! from the template and their translator facts (translation, fuzzy state,
//! translator comments, extra flags) from the existing catalog.

use crate::i18n::catalog::Catalog;
use crate::i18n::message::{Message, MessageFlags};

/// Merge `template` into `existing`.
///
/// Existing entries missing from the template become obsolete, or are
/// dropped when `purge_obsolete` is set. Template order comes first, then
/// the remaining obsolete entries in their previous order.
pub fn merge(existing: &Catalog, template: &Catalog, purge_obsolete: bool) -> Catalog {
    let nplurals = existing.nplurals();
    let mut merged = Catalog::new(existing.locale.clone(), existing.header.clone());
    merged.exists = existing.exists;

    for source in template.live() {
        let message = match existing.find(source) {
            Some(old) => carry_forward(old, source, nplurals),
            None => fresh(source, nplurals),
        };
        merged.insert(message);
    }

    if !purge_obsolete {
        for old in existing.iter() {
            if merged.find(old).is_some() {
                continue;
            }
            let mut message = old.clone();
            message.set_obsolete(true);
            merged.insert(message);
        }
    }
    merged
}

fn fresh(source: &Message, nplurals: usize) -> Message {
    let mut message = match &source.plural {
        Some(plural) => Message::new_plural(source.id.clone(), plural.clone(), nplurals),
        None => Message::new(source.id.clone()),
    };
    message.context = source.context.clone();
    message.locations = source.locations.clone();
    message.auto_comments = source.auto_comments.clone();
    message.extra_flags = source.extra_flags.clone();
    message.locales = source.locales.clone();
    message
}

fn carry_forward(old: &Message, source: &Message, nplurals: usize) -> Message {
    let mut message = fresh(source, nplurals);
    message.flags = old.flags - MessageFlags::OBSOLETE;
    message.user_comments = old.user_comments.clone();
    message.previous_id = old.previous_id.clone();

    let mut extra_flags = old.extra_flags.clone();
    for flag in &source.extra_flags {
        if !extra_flags.contains(flag) {
            extra_flags.push(flag.clone());
        }
    }
    message.extra_flags = extra_flags;

    match (old.is_plural(), source.is_plural()) {
        (true, true) | (false, false) => {
            message.strings = old.strings.clone();
            if source.is_plural() && message.strings.len() < nplurals {
                message.strings.resize(nplurals, String::new());
            }
        }
        (false, true) => {
            message.strings[0] = old.strings.first().cloned().unwrap_or_default();
            if old.has_translation_text() {
                message.set_fuzzy(true);
            }
        }
        (true, false) => {
            let mut forms = old.strings.iter();
            message.strings[0] = forms.next().cloned().unwrap_or_default();
            for form in forms.filter(|f| !f.is_empty()) {
                message
                    .user_comments
                    .push(format!("previous plural translation: {}", form));
            }
            if old.has_translation_text() {
                message.set_fuzzy(true);
            }
        }
    }
    message
}
