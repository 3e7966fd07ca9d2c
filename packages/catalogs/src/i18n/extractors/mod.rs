//! Extractors Module
//!
//! One extractor per source kind. Every source is parsed once into a
//! [`ParsedSource`]; the parsed form exposes the locale declarations the
//! resolver needs and then produces messages for a given set of effective
//! locales.

pub mod document;
pub mod specification;
pub mod tabular;
pub mod template;

use crate::file_system::PodPath;
use crate::i18n::message::{normalize_whitespace, Location};
use crate::i18n::source_scanner::{SourceFile, SourceKind};
use crate::locale::LocaleSet;
use crate::parse_util::{ParseError, ParseLocation};
use serde_yaml::Value;

pub use document::{DocumentPart, ParsedDocument};
pub use tabular::{parse_csv, Table};

/// One occurrence of a translatable string.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedMessage {
    pub id: String,
    pub plural: Option<String>,
    pub location: Location,
    pub locales: LocaleSet,
    pub auto_comments: Vec<String>,
}

impl ExtractedMessage {
    pub fn new(id: String, location: Location, locales: LocaleSet) -> Self {
        ExtractedMessage {
            id,
            plural: None,
            location,
            locales,
            auto_comments: Vec::new(),
        }
    }
}

/// Messages and diagnostics produced by one file.
#[derive(Debug, Clone, Default)]
pub struct FileExtraction {
    pub path: String,
    pub messages: Vec<ExtractedMessage>,
    pub warnings: Vec<ParseError>,
}

/// A source file after parsing, ready for extraction.
#[derive(Debug, Clone)]
pub enum ParsedSource {
    Template(String),
    Document(ParsedDocument),
    Tabular(Table),
    Specification(Value),
}

impl ParsedSource {
    /// Parse `content` according to the file's kind. Diagnostics are
    /// returned alongside whatever could be recovered.
    pub fn parse(file: &SourceFile, content: &str) -> Option<(ParsedSource, Vec<ParseError>)> {
        let url = file.path.as_str();
        let parsed = match file.kind {
            SourceKind::Template => (ParsedSource::Template(content.to_string()), Vec::new()),
            SourceKind::Document => {
                let (document, warnings) = ParsedDocument::parse(&file.path, content, file.is_blueprint());
                (ParsedSource::Document(document), warnings)
            }
            SourceKind::Tabular => {
                let (table, warnings) = parse_csv(url, content);
                (ParsedSource::Tabular(table), warnings)
            }
            SourceKind::Specification => match parse_yaml(url, content, 1) {
                Ok(value) => (ParsedSource::Specification(value.unwrap_or(Value::Null)), Vec::new()),
                Err(warning) => (ParsedSource::Specification(Value::Null), vec![warning]),
            },
            SourceKind::Unsupported => return None,
        };
        Some(parsed)
    }

    /// The document-level locale declaration, if any.
    pub fn localization(&self) -> Option<&LocaleSet> {
        match self {
            ParsedSource::Document(document) => document.localization.as_ref(),
            _ => None,
        }
    }

    /// Every locale declaration in this source, document-level first.
    pub fn declarations(&self) -> Vec<&LocaleSet> {
        match self {
            ParsedSource::Document(document) => document.declarations().collect(),
            _ => Vec::new(),
        }
    }

    pub fn extract(&self, path: &PodPath, effective: &LocaleSet) -> FileExtraction {
        let (messages, warnings) = match self {
            ParsedSource::Template(source) => template::extract_template(path, source, 1, effective),
            ParsedSource::Document(document) => document::extract_document(path, document, effective),
            ParsedSource::Tabular(table) => (tabular::extract_table(path, table, effective), Vec::new()),
            ParsedSource::Specification(value) => (
                specification::extract_specification(path, value, effective),
                Vec::new(),
            ),
        };
        FileExtraction {
            path: path.as_str().to_string(),
            messages,
            warnings,
        }
    }
}

/// A tagged string found in a YAML tree, with its optional `<key>#`
/// comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedString {
    pub text: String,
    pub comment: Option<String>,
}

/// Collect the values of tagged keys (`title@`) anywhere in `value`, in
/// document order. Lists under a tagged key contribute each string item.
pub fn tagged_strings(value: &Value) -> Vec<TaggedString> {
    let mut out = Vec::new();
    collect_tagged(value, &mut out);
    out
}

fn collect_tagged(value: &Value, out: &mut Vec<TaggedString>) {
    match value {
        Value::Mapping(mapping) => {
            for (key, item) in mapping {
                let tagged_key = key.as_str().filter(|k| k.len() > 1 && k.ends_with('@'));
                match tagged_key {
                    Some(key) => {
                        let comment = mapping
                            .get(format!("{}#", key).as_str())
                            .and_then(Value::as_str)
                            .map(normalize_whitespace)
                            .filter(|c| !c.is_empty());
                        collect_tagged_value(item, &comment, out);
                    }
                    None => collect_tagged(item, out),
                }
            }
        }
        Value::Sequence(items) => {
            for item in items {
                collect_tagged(item, out);
            }
        }
        Value::Tagged(tagged) => collect_tagged(&tagged.value, out),
        _ => {}
    }
}

fn collect_tagged_value(value: &Value, comment: &Option<String>, out: &mut Vec<TaggedString>) {
    match value {
        Value::String(text) => out.push(TaggedString {
            text: text.clone(),
            comment: comment.clone(),
        }),
        Value::Sequence(items) => {
            for item in items {
                collect_tagged_value(item, comment, out);
            }
        }
        other => collect_tagged(other, out),
    }
}

/// Turn tagged YAML strings into messages at `path` with no line.
pub fn tagged_messages(path: &PodPath, value: &Value, locales: &LocaleSet) -> Vec<ExtractedMessage> {
    tagged_strings(value)
        .into_iter()
        .filter_map(|tagged| {
            let id = normalize_whitespace(&tagged.text);
            if id.is_empty() {
                return None;
            }
            let mut message = ExtractedMessage::new(id, Location::new(path.as_str(), None), locales.clone());
            message.auto_comments.extend(tagged.comment);
            Some(message)
        })
        .collect()
}

/// Parse a YAML fragment that starts at `first_line` of its file. Blank
/// input parses as `None`.
pub fn parse_yaml(url: &str, text: &str, first_line: usize) -> Result<Option<Value>, ParseError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    match serde_yaml::from_str::<Value>(text) {
        Ok(Value::Null) => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            let (line, col, offset) = e
                .location()
                .map(|l| (l.line(), l.column(), l.index()))
                .unwrap_or((1, 1, 0));
            let location = ParseLocation::new(url, offset, first_line + line.saturating_sub(1), col);
            Err(ParseError::warning(location, format!("invalid YAML: {}", yaml_message(&e))))
        }
    }
}

fn yaml_message(error: &serde_yaml::Error) -> String {
    let message = error.to_string();
    match message.find(" at line ") {
        Some(i) => message[..i].to_string(),
        None => message,
    }
}
