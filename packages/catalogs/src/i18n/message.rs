//! Message Module
//!
//! A single translatable entry of a catalog, identified by its normalized
//! msgid.

use crate::locale::LocaleSet;
use bitflags::bitflags;
use smallvec::SmallVec;
use std::fmt;

bitflags! {
    /// State flags of a catalog entry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MessageFlags: u8 {
        const FUZZY = 1 << 0;
        const OBSOLETE = 1 << 1;
    }
}

/// Translated values: one slot for a singular message, one per plural form
/// otherwise.
pub type Translation = SmallVec<[String; 2]>;

/// Where a message was found. `line` is `None` for structured fields that
/// carry no meaningful line number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub path: String,
    pub line: Option<usize>,
}

impl Location {
    pub fn new(path: impl Into<String>, line: Option<usize>) -> Self {
        Location {
            path: path.into(),
            line,
        }
    }

    /// Parse a reference token (`/views/home.html:12` or `/content/a.yaml`).
    pub fn parse(token: &str) -> Self {
        if let Some((path, line)) = token.rsplit_once(':') {
            if !path.is_empty() && !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(line) = line.parse::<usize>() {
                    return Location::new(path, (line > 0).then_some(line));
                }
            }
        }
        Location::new(token, None)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.path, line),
            None => f.write_str(&self.path),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Message {
    pub id: String,
    pub plural: Option<String>,
    pub context: Option<String>,
    pub strings: Translation,
    pub locations: Vec<Location>,
    pub flags: MessageFlags,
    /// Flags other than `fuzzy`, e.g. `python-format`, in file order.
    pub extra_flags: Vec<String>,
    /// `#.` comments, produced by extraction.
    pub auto_comments: Vec<String>,
    /// `# ` comments, owned by translators.
    pub user_comments: Vec<String>,
    pub previous_id: Option<String>,
    /// Extraction scope. Not serialized.
    pub locales: LocaleSet,
}

impl Message {
    pub fn new(id: impl Into<String>) -> Self {
        Message {
            id: id.into(),
            strings: smallvec::smallvec![String::new()],
            ..Default::default()
        }
    }

    pub fn new_plural(id: impl Into<String>, plural: impl Into<String>, nplurals: usize) -> Self {
        Message {
            id: id.into(),
            plural: Some(plural.into()),
            strings: std::iter::repeat(String::new()).take(nplurals.max(1)).collect(),
            ..Default::default()
        }
    }

    pub fn with_translation(mut self, value: impl Into<String>) -> Self {
        self.strings = smallvec::smallvec![value.into()];
        self
    }

    pub fn is_plural(&self) -> bool {
        self.plural.is_some()
    }

    /// Catalog key: the msgid, qualified by the context when there is one.
    pub fn key(&self) -> String {
        entry_key(self.context.as_deref(), &self.id)
    }

    pub fn is_fuzzy(&self) -> bool {
        self.flags.contains(MessageFlags::FUZZY)
    }

    pub fn is_obsolete(&self) -> bool {
        self.flags.contains(MessageFlags::OBSOLETE)
    }

    pub fn set_obsolete(&mut self, obsolete: bool) {
        self.flags.set(MessageFlags::OBSOLETE, obsolete);
    }

    pub fn set_fuzzy(&mut self, fuzzy: bool) {
        self.flags.set(MessageFlags::FUZZY, fuzzy);
    }

    /// Singular translation, if any text was entered.
    pub fn translation(&self) -> Option<&str> {
        self.strings
            .first()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Every slot holds text.
    pub fn is_translated(&self) -> bool {
        !self.strings.is_empty() && self.strings.iter().all(|s| !s.is_empty())
    }

    /// Any slot holds text.
    pub fn has_translation_text(&self) -> bool {
        self.strings.iter().any(|s| !s.is_empty())
    }

    /// Append a location unless it is already recorded.
    pub fn add_location(&mut self, location: Location) {
        if !self.locations.contains(&location) {
            self.locations.push(location);
        }
    }

    pub fn add_auto_comment(&mut self, comment: &str) {
        if !self.auto_comments.iter().any(|c| c == comment) {
            self.auto_comments.push(comment.to_string());
        }
    }

    pub fn has_location_in<S: AsRef<str>>(&self, paths: &[S]) -> bool {
        self.locations
            .iter()
            .any(|loc| paths.iter().any(|p| p.as_ref() == loc.path))
    }
}

/// `context EOT id` for entries with a context, the bare msgid otherwise.
/// The separator is the one gettext uses in compiled catalogs.
pub fn entry_key(context: Option<&str>, id: &str) -> String {
    match context {
        Some(context) => format!("{}\u{4}{}", context, id),
        None => id.to_string(),
    }
}

/// Trim and collapse whitespace runs so differently formatted sources
/// produce the same msgid.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
