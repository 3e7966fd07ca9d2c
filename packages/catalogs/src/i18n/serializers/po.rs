//! PO Serializer Module
//!
//! gettext PO reader and writer.
//!
//! The writer never wraps strings except after an embedded `\n`, writes one
//! location per `#:` line and puts obsolete entries (`#~`) after the live
//! ones. The reader accepts everything the writer produces plus the common
//! variations found in hand-edited files: several locations on one `#:`
//! line, wrapped strings, `msgctxt`, `#|` previous msgids and plural blocks.
//! Entries are keyed by context and msgid, so one msgid may appear under
//! several contexts.
//!
//! Reading a file this writer produced and writing it again reproduces the
//! input bytes. Other files come back in the writer's layout: one location
//! per `#:` line, strings unwrapped except after `\n`, and `# ` before
//! translator comments.

use crate::i18n::catalog::{Catalog, Header, LANGUAGE};
use crate::i18n::message::{Location, Message, MessageFlags};
use crate::i18n::serializers::serializer::Serializer;
use crate::locale::Locale;
use crate::parse_util::{ParseError, ParseLocation};
use smallvec::SmallVec;

const OBSOLETE_PREFIX: &str = "#~ ";

#[derive(Debug, Default, Clone, Copy)]
pub struct Po;

impl Po {
    pub fn new() -> Self {
        Po
    }

    /// Serialize the entries of a catalog without its header. Two catalogs
    /// with equal bodies differ at most in header metadata.
    pub fn write_entries(&self, catalog: &Catalog) -> String {
        let mut out = String::new();
        for message in catalog.live().chain(catalog.obsolete()) {
            out.push('\n');
            write_message(&mut out, message);
        }
        out
    }
}

impl Serializer for Po {
    fn write(&self, catalog: &Catalog) -> Vec<u8> {
        let mut out = String::new();
        write_header(&mut out, &catalog.header);
        out.push_str(&self.write_entries(catalog));
        out.into_bytes()
    }

    fn load(&self, content: &[u8], url: &str) -> Result<Catalog, ParseError> {
        let content = std::str::from_utf8(content).map_err(|e| {
            ParseError::new(
                ParseLocation::from_offset(url, "", 0),
                format!("catalog is not valid UTF-8 (byte {})", e.valid_up_to()),
            )
        })?;
        PoParser::new(url).parse(content.strip_prefix('\u{feff}').unwrap_or(content))
    }

    fn extension(&self) -> &'static str {
        "po"
    }
}

fn write_header(out: &mut String, header: &Header) {
    for line in &header.comments {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("msgid \"\"\nmsgstr \"\"\n");
    for line in header.to_msgstr().split_inclusive('\n') {
        out.push('"');
        out.push_str(&escape(line));
        out.push_str("\"\n");
    }
}

fn write_message(out: &mut String, message: &Message) {
    let obsolete = message.is_obsolete();
    let prefix = if obsolete { OBSOLETE_PREFIX } else { "" };

    for comment in &message.user_comments {
        if comment.is_empty() {
            out.push_str("#\n");
        } else {
            out.push_str("# ");
            out.push_str(comment);
            out.push('\n');
        }
    }
    for comment in &message.auto_comments {
        out.push_str("#. ");
        out.push_str(comment);
        out.push('\n');
    }
    for location in &message.locations {
        out.push_str("#: ");
        out.push_str(&location.to_string());
        out.push('\n');
    }

    let mut flags: Vec<&str> = Vec::new();
    if message.is_fuzzy() {
        flags.push("fuzzy");
    }
    flags.extend(message.extra_flags.iter().map(String::as_str));
    if !flags.is_empty() {
        out.push_str("#, ");
        out.push_str(&flags.join(", "));
        out.push('\n');
    }

    if let Some(previous) = &message.previous_id {
        let previous_prefix = if obsolete { "#~| " } else { "#| " };
        write_string(out, previous_prefix, "msgid", previous);
    }
    if let Some(context) = &message.context {
        write_string(out, prefix, "msgctxt", context);
    }
    write_string(out, prefix, "msgid", &message.id);
    match &message.plural {
        Some(plural) => {
            write_string(out, prefix, "msgid_plural", plural);
            for (i, value) in message.strings.iter().enumerate() {
                write_string(out, prefix, &format!("msgstr[{}]", i), value);
            }
        }
        None => {
            let value = message.strings.first().map(String::as_str).unwrap_or("");
            write_string(out, prefix, "msgstr", value);
        }
    }
}

fn write_string(out: &mut String, prefix: &str, keyword: &str, value: &str) {
    let chunks: Vec<&str> = value.split_inclusive('\n').collect();
    if chunks.len() > 1 {
        out.push_str(&format!("{}{} \"\"\n", prefix, keyword));
        for chunk in chunks {
            out.push_str(&format!("{}\"{}\"\n", prefix, escape(chunk)));
        }
    } else {
        out.push_str(&format!("{}{} \"{}\"\n", prefix, keyword, escape(value)));
    }
}

pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    None,
    Previous,
    Context,
    Id,
    Plural,
    Str(usize),
}

#[derive(Debug, Default)]
struct PendingEntry {
    raw_comments: Vec<String>,
    user_comments: Vec<String>,
    auto_comments: Vec<String>,
    locations: Vec<Location>,
    flags: Vec<String>,
    previous: Option<String>,
    context: Option<String>,
    id: Option<String>,
    plural: Option<String>,
    strings: Vec<Option<String>>,
    obsolete: bool,
    location: Option<ParseLocation>,
}

impl PendingEntry {
    fn is_started(&self) -> bool {
        self.id.is_some() || self.context.is_some()
    }
}

struct PoParser<'a> {
    url: &'a str,
    catalog: Catalog,
    header_seen: bool,
    entry: PendingEntry,
    field: Field,
}

impl<'a> PoParser<'a> {
    fn new(url: &'a str) -> Self {
        PoParser {
            url,
            catalog: Catalog::new(None, Header::default()),
            header_seen: false,
            entry: PendingEntry::default(),
            field: Field::None,
        }
    }

    fn parse(mut self, content: &str) -> Result<Catalog, ParseError> {
        let mut offset = 0;
        for (index, raw) in content.split_inclusive('\n').enumerate() {
            let line_start = offset;
            offset += raw.len();
            let raw = raw.trim_end_matches(['\n', '\r']);
            let location = ParseLocation::new(self.url, line_start, index + 1, 1);
            self.parse_line(raw, location)?;
        }
        self.flush()?;
        self.catalog.exists = true;
        Ok(self.catalog)
    }

    fn parse_line(&mut self, raw: &str, location: ParseLocation) -> Result<(), ParseError> {
        let line = raw.trim();
        if line.is_empty() {
            return self.flush();
        }

        if let Some(rest) = line.strip_prefix("#~|").or_else(|| line.strip_prefix("#|")) {
            if self.entry.is_started() {
                self.flush()?;
            }
            self.entry.obsolete |= line.starts_with("#~");
            return self.parse_previous(rest.trim_start(), location);
        }

        if let Some(rest) = line.strip_prefix("#~") {
            return self.parse_keyword(rest.trim_start(), true, location);
        }

        if line.starts_with('#') {
            if self.entry.is_started() {
                self.flush()?;
            }
            self.parse_comment(line, raw);
            return Ok(());
        }

        self.parse_keyword(line, false, location)
    }

    fn parse_comment(&mut self, line: &str, raw: &str) {
        self.entry.raw_comments.push(raw.trim_end().to_string());
        let text = |rest: &str| rest.strip_prefix(' ').unwrap_or(rest).to_string();
        if let Some(rest) = line.strip_prefix("#:") {
            self.entry
                .locations
                .extend(rest.split_whitespace().map(Location::parse));
        } else if let Some(rest) = line.strip_prefix("#.") {
            self.entry.auto_comments.push(text(rest));
        } else if let Some(rest) = line.strip_prefix("#,") {
            self.entry.flags.extend(
                rest.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string),
            );
        } else {
            self.entry.user_comments.push(text(&line[1..]));
        }
    }

    fn parse_previous(&mut self, rest: &str, location: ParseLocation) -> Result<(), ParseError> {
        if rest.starts_with('"') {
            if self.field == Field::Previous {
                let value = unquote(rest, &location)?;
                if let Some(previous) = self.entry.previous.as_mut() {
                    previous.push_str(&value);
                }
            }
            return Ok(());
        }
        match rest.split_once(char::is_whitespace) {
            Some(("msgid", value)) => {
                self.entry.previous = Some(unquote(value.trim(), &location)?);
                self.field = Field::Previous;
            }
            // Previous context and plural are not kept.
            _ => self.field = Field::None,
        }
        Ok(())
    }

    fn parse_keyword(
        &mut self,
        line: &str,
        obsolete: bool,
        location: ParseLocation,
    ) -> Result<(), ParseError> {
        if line.starts_with('"') {
            let value = unquote(line, &location)?;
            return self.append(value, location);
        }

        let (keyword, rest) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));
        let value = unquote(rest.trim(), &location)?;
        match keyword {
            "msgctxt" => {
                if self.entry.is_started() {
                    self.flush()?;
                }
                self.entry.context = Some(value);
                self.field = Field::Context;
            }
            "msgid" => {
                if self.entry.id.is_some() {
                    self.flush()?;
                }
                self.entry.id = Some(value);
                self.field = Field::Id;
            }
            "msgid_plural" => {
                self.entry.plural = Some(value);
                self.field = Field::Plural;
            }
            "msgstr" => self.set_string(0, value),
            _ => {
                let index = keyword
                    .strip_prefix("msgstr[")
                    .and_then(|k| k.strip_suffix(']'))
                    .and_then(|k| k.parse::<usize>().ok())
                    .ok_or_else(|| {
                        ParseError::new(location.clone(), format!("unknown keyword {:?}", keyword))
                    })?;
                self.set_string(index, value);
            }
        }
        self.entry.obsolete |= obsolete;
        if self.entry.location.is_none() {
            self.entry.location = Some(location);
        }
        Ok(())
    }

    fn set_string(&mut self, index: usize, value: String) {
        if self.entry.strings.len() <= index {
            self.entry.strings.resize(index + 1, None);
        }
        self.entry.strings[index] = Some(value);
        self.field = Field::Str(index);
    }

    fn append(&mut self, value: String, location: ParseLocation) -> Result<(), ParseError> {
        let target = match self.field {
            Field::None => None,
            Field::Previous => self.entry.previous.as_mut(),
            Field::Context => self.entry.context.as_mut(),
            Field::Id => self.entry.id.as_mut(),
            Field::Plural => self.entry.plural.as_mut(),
            Field::Str(i) => self.entry.strings.get_mut(i).and_then(Option::as_mut),
        };
        match target {
            Some(target) => {
                target.push_str(&value);
                Ok(())
            }
            None => Err(ParseError::new(location, "string continuation without a keyword")),
        }
    }

    fn flush(&mut self) -> Result<(), ParseError> {
        self.field = Field::None;
        if !self.entry.is_started() {
            // Comments attach to the next entry, across blank lines.
            return Ok(());
        }

        let entry = std::mem::take(&mut self.entry);
        let location = entry
            .location
            .clone()
            .unwrap_or_else(|| ParseLocation::start_of(self.url));
        let id = entry.id.ok_or_else(|| ParseError::new(location.clone(), "msgctxt without msgid"))?;
        if entry.strings.is_empty() {
            return Err(ParseError::new(location, format!("missing msgstr for {:?}", id)));
        }

        if id.is_empty()
            && entry.context.is_none()
            && entry.plural.is_none()
            && !self.header_seen && self.catalog.is_empty() {
            let msgstr = entry.strings.into_iter().next().flatten().unwrap_or_default();
            self.catalog.header = Header {
                comments: entry.raw_comments,
                fields: Header::parse_fields(&msgstr),
            };
            self.catalog.locale = self
                .catalog
                .header
                .get(LANGUAGE)
                .and_then(|l| Locale::parse(l).ok());
            self.header_seen = true;
            return Ok(());
        }

        if self.catalog.get_in(entry.context.as_deref(), &id).is_some() {
            return Err(ParseError::new(
                location,
                format!("duplicate message definition for {:?}", id),
            ));
        }

        let mut flags = MessageFlags::empty();
        let mut extra_flags = Vec::new();
        for flag in entry.flags {
            if flag == "fuzzy" {
                flags |= MessageFlags::FUZZY;
            } else {
                extra_flags.push(flag);
            }
        }
        if entry.obsolete {
            flags |= MessageFlags::OBSOLETE;
        }
        let strings: SmallVec<[String; 2]> = entry
            .strings
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();

        self.catalog.insert(Message {
            id,
            plural: entry.plural,
            context: entry.context,
            strings,
            locations: entry.locations,
            flags,
            extra_flags,
            auto_comments: entry.auto_comments,
            user_comments: entry.user_comments,
            previous_id: entry.previous,
            locales: Default::default(),
        });
        Ok(())
    }
}

fn unquote(token: &str, location: &ParseLocation) -> Result<String, ParseError> {
    let inner = token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .filter(|_| token.len() >= 2)
        .ok_or_else(|| ParseError::new(location.clone(), format!("expected a quoted string, got {:?}", token)))?;

    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some('r') => value.push('\r'),
                Some('\\') => value.push('\\'),
                Some('"') => value.push('"'),
                Some('a') => value.push('\u{7}'),
                Some('b') => value.push('\u{8}'),
                Some('f') => value.push('\u{c}'),
                Some('v') => value.push('\u{b}'),
                other => {
                    return Err(ParseError::new(
                        location.clone(),
                        format!("invalid escape sequence \\{}", other.map(String::from).unwrap_or_default()),
                    ))
                }
            },
            '"' => {
                return Err(ParseError::new(location.clone(), "unescaped quote inside string"));
            }
            _ => value.push(c),
        }
    }
    Ok(value)
}
