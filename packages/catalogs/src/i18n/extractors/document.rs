//! Structured documents.
//!
//! YAML documents hold one or more `---` separated parts. Markup documents
//! (`.html`, `.htm`, `.md`) hold `---` fenced front matter followed by a
//! body, optionally repeated:
//!
//! ```text
//! ---
//! $title@: About
//! ---
//! {{ _('General body content') }}
//! ---
//! $locale: de
//! $title@: AboutDE
//! ---
//! {{ _('DE body content') }}
//! ```
//!
//! A part declaring `$locale` or `$locales` scopes its messages to those
//! locales. The first part's `$localization.locales` is the document's own
//! declaration (blueprints also accept a bare `localization`).

use crate::file_system::PodPath;
use crate::i18n::extractors::template::extract_template;
use crate::i18n::extractors::{parse_yaml, tagged_messages, ExtractedMessage};
use crate::locale::{Locale, LocaleSet};
use crate::parse_util::{ParseError, ParseLocation};
use serde_yaml::Value;

const SEPARATOR: &str = "---";

/// Markup body of a part, with the file line it starts on.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub text: String,
    pub first_line: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPart {
    pub fields: Option<Value>,
    pub body: Option<Body>,
    pub locales: Option<LocaleSet>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    pub parts: Vec<DocumentPart>,
    pub localization: Option<LocaleSet>,
}

struct Segment {
    text: String,
    first_line: usize,
}

fn split_segments(content: &str) -> Vec<Segment> {
    let mut segments = vec![Segment {
        text: String::new(),
        first_line: 1,
    }];
    for (index, line) in content.split_inclusive('\n').enumerate() {
        if line.trim_end() == SEPARATOR {
            segments.push(Segment {
                text: String::new(),
                first_line: index + 2,
            });
        } else if let Some(current) = segments.last_mut() {
            current.text.push_str(line);
        }
    }
    segments
}

fn is_markup(path: &PodPath) -> bool {
    matches!(path.extension().as_deref(), Some("html" | "htm" | "md"))
}

impl ParsedDocument {
    pub fn parse(path: &PodPath, content: &str, is_blueprint: bool) -> (ParsedDocument, Vec<ParseError>) {
        let url = path.as_str();
        let mut warnings = Vec::new();
        let segments = split_segments(content);

        let mut parts = Vec::new();
        if is_markup(path) {
            let starts_with_front_matter = content
                .lines()
                .next()
                .map(|l| l.trim_end() == SEPARATOR)
                .unwrap_or(false);
            if starts_with_front_matter {
                let mut rest = segments.into_iter().skip(1);
                while let Some(front_matter) = rest.next() {
                    let fields = parse_fields(url, &front_matter, &mut warnings);
                    let body = rest.next().map(|s| Body {
                        text: s.text,
                        first_line: s.first_line,
                    });
                    parts.push(DocumentPart {
                        locales: part_locales(url, fields.as_ref(), front_matter.first_line, &mut warnings),
                        fields,
                        body,
                    });
                }
            } else {
                parts.push(DocumentPart {
                    fields: None,
                    body: Some(Body {
                        text: content.to_string(),
                        first_line: 1,
                    }),
                    locales: None,
                });
            }
        } else {
            for segment in segments {
                let fields = parse_fields(url, &segment, &mut warnings);
                if fields.is_none() {
                    continue;
                }
                parts.push(DocumentPart {
                    locales: part_locales(url, fields.as_ref(), segment.first_line, &mut warnings),
                    fields,
                    body: None,
                });
            }
        }

        let localization = parts
            .first()
            .and_then(|p| p.fields.as_ref())
            .and_then(|fields| {
                let block = fields
                    .get("$localization")
                    .or_else(|| is_blueprint.then(|| fields.get("localization")).flatten())?;
                block.get("locales")
            })
            .map(|locales| locale_list(url, locales, 1, &mut warnings));

        (ParsedDocument { parts, localization }, warnings)
    }

    /// Document-level declaration first, then part declarations.
    pub fn declarations(&self) -> impl Iterator<Item = &LocaleSet> {
        self.localization
            .iter()
            .chain(self.parts.iter().filter_map(|p| p.locales.as_ref()))
    }
}

fn parse_fields(url: &str, segment: &Segment, warnings: &mut Vec<ParseError>) -> Option<Value> {
    match parse_yaml(url, &segment.text, segment.first_line) {
        Ok(Some(value @ Value::Mapping(_))) => Some(value),
        Ok(Some(_)) => {
            warnings.push(ParseError::warning(
                ParseLocation::new(url, 0, segment.first_line, 1),
                "document part is not a mapping",
            ));
            None
        }
        Ok(None) => None,
        Err(warning) => {
            warnings.push(warning);
            None
        }
    }
}

fn part_locales(
    url: &str,
    fields: Option<&Value>,
    line: usize,
    warnings: &mut Vec<ParseError>,
) -> Option<LocaleSet> {
    let fields = fields?;
    fields
        .get("$locales")
        .or_else(|| fields.get("$locale"))
        .map(|value| locale_list(url, value, line, warnings))
}

/// Locales from a string or a list of strings. Invalid identifiers are
/// reported and skipped.
fn locale_list(url: &str, value: &Value, line: usize, warnings: &mut Vec<ParseError>) -> LocaleSet {
    let items: Vec<&Value> = match value {
        Value::Sequence(items) => items.iter().collect(),
        other => vec![other],
    };
    let mut locales = LocaleSet::new();
    for item in items {
        match item.as_str().map(Locale::parse) {
            Some(Ok(locale)) => {
                locales.insert(locale);
            }
            _ => warnings.push(ParseError::warning(
                ParseLocation::new(url, 0, line, 1),
                format!("invalid locale {:?}", item.as_str().unwrap_or("<non-string>")),
            )),
        }
    }
    locales
}

/// Extract tagged fields and markup bodies of every part. A part's own
/// locale declaration replaces `effective` for that part.
pub fn extract_document(
    path: &PodPath,
    document: &ParsedDocument,
    effective: &LocaleSet,
) -> (Vec<ExtractedMessage>, Vec<ParseError>) {
    let mut messages = Vec::new();
    let mut warnings = Vec::new();
    for part in &document.parts {
        let locales = part.locales.as_ref().unwrap_or(effective);
        if let Some(fields) = &part.fields {
            messages.extend(tagged_messages(path, fields, locales));
        }
        if let Some(body) = &part.body {
            let (body_messages, body_warnings) = extract_template(path, &body.text, body.first_line, locales);
            messages.extend(body_messages);
            warnings.extend(body_warnings);
        }
    }
    (messages, warnings)
}
