//! Template extractor.
//!
//! Finds gettext calls in template source:
//!
//! ```text
//! {{ _('Hello World!') }}
//! {{ gettext("Hello") }}
//! {{ ngettext('%(num)s new message', '%(num)s new messages', num) }}
//! {{ _('Greeting for German readers', locales=['de']) }}
//! {#: Shown on the landing page. #}
//! ```
//!
//! Only string literal arguments produce messages; calls with computed
//! arguments are skipped. A `{#: ... #}` comment is attached to calls on
//! the same or the following line.

use crate::file_system::PodPath;
use crate::i18n::extractors::ExtractedMessage;
use crate::i18n::message::{normalize_whitespace, Location};
use crate::locale::{Locale, LocaleSet};
use crate::parse_util::{ParseError, ParseLocation};
use once_cell::sync::Lazy;
use regex::Regex;

static CALL_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(ngettext|gettext|_)\s*\(").unwrap());
static TRANSLATOR_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{#:(.*?)#\}").unwrap());

const LOCALES_KEYWORD: &str = "locales";

#[derive(Debug, Clone, PartialEq)]
enum Arg {
    Str(String),
    List(Vec<Arg>),
    Other,
}

#[derive(Debug, Default)]
struct Call {
    positional: Vec<Arg>,
    keywords: Vec<(String, Arg)>,
}

#[derive(Debug)]
struct SyntaxError {
    offset: usize,
    msg: String,
}

/// Recursive-descent reader over the argument list of one call.
struct ArgReader<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> ArgReader<'s> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, char::is_whitespace) {
            self.bump();
        }
    }

    fn error(&self, offset: usize, msg: &str) -> SyntaxError {
        SyntaxError {
            offset,
            msg: msg.to_string(),
        }
    }

    /// Read arguments up to and including the closing parenthesis.
    fn read_call(&mut self, call_start: usize) -> Result<Call, SyntaxError> {
        let mut call = Call::default();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error(call_start, "unterminated gettext call")),
                Some(')') => {
                    self.bump();
                    return Ok(call);
                }
                Some(',' | ']') => {
                    self.bump();
                }
                Some(_) => {
                    if let Some(keyword) = self.read_keyword() {
                        let value = self.read_value(call_start)?;
                        call.keywords.push((keyword, value));
                    } else {
                        let value = self.read_value(call_start)?;
                        call.positional.push(value);
                    }
                }
            }
        }
    }

    /// `name=` (but not `name==`). Leaves the position untouched otherwise.
    fn read_keyword(&mut self) -> Option<String> {
        let start = self.pos;
        let rest = &self.src[start..];
        let len = rest
            .char_indices()
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        if len == 0 || rest.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        let name = &rest[..len];
        let after = rest[len..].trim_start();
        if after.starts_with('=') && !after.starts_with("==") {
            self.pos = start + len + (rest[len..].len() - after.len()) + 1;
            Some(name.to_string())
        } else {
            None
        }
    }

    fn read_value(&mut self, call_start: usize) -> Result<Arg, SyntaxError> {
        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('\'' | '"')) => {
                self.bump();
                Arg::Str(self.read_string(quote)?)
            }
            Some('[') => {
                self.bump();
                let mut items = Vec::new();
                loop {
                    self.skip_whitespace();
                    match self.peek() {
                        None => return Err(self.error(call_start, "unterminated list")),
                        Some(']') => {
                            self.bump();
                            break;
                        }
                        Some(',') => {
                            self.bump();
                        }
                        Some(')') => return Err(self.error(call_start, "unbalanced brackets")),
                        Some(_) => items.push(self.read_value(call_start)?),
                    }
                }
                Arg::List(items)
            }
            _ => {
                self.skip_expression(call_start)?;
                return Ok(Arg::Other);
            }
        };
        // `'a' ~ name`, `'a' | upper` and similar are computed values.
        self.skip_whitespace();
        match self.peek() {
            Some(',' | ')' | ']') | None => Ok(value),
            Some(_) => {
                self.skip_expression(call_start)?;
                Ok(Arg::Other)
            }
        }
    }

    fn read_string(&mut self, quote: char) -> Result<String, SyntaxError> {
        let start = self.pos.saturating_sub(1);
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error(start, "unterminated string literal")),
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(c) => value.push(c),
                    None => return Err(self.error(start, "unterminated string literal")),
                },
                Some(c) if c == quote => return Ok(value),
                Some(c) => value.push(c),
            }
        }
    }

    /// Skip an arbitrary expression up to the next top-level `,`, `)` or
    /// `]`.
    fn skip_expression(&mut self, call_start: usize) -> Result<(), SyntaxError> {
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None => return Err(self.error(call_start, "unterminated gettext call")),
                Some(',' | ')' | ']') if depth == 0 => return Ok(()),
                Some(quote @ ('\'' | '"')) => {
                    self.bump();
                    self.read_string(quote)?;
                }
                Some('(' | '[' | '{') => {
                    depth += 1;
                    self.bump();
                }
                Some(')' | ']' | '}') => {
                    depth = depth.saturating_sub(1);
                    self.bump();
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }
}

fn line_of(source: &str, offset: usize, first_line: usize) -> usize {
    source[..offset].matches('\n').count() + first_line
}

/// Extract gettext calls from `source`, which begins at `first_line` of
/// the file at `path`.
pub fn extract_template(
    path: &PodPath,
    source: &str,
    first_line: usize,
    locales: &LocaleSet,
) -> (Vec<ExtractedMessage>, Vec<ParseError>) {
    let url = path.as_str();
    let mut messages = Vec::new();
    let mut warnings = Vec::new();
    let warn = |offset: usize, msg: String| {
        let mut location = ParseLocation::from_offset(url, source, offset);
        location.line += first_line - 1;
        ParseError::warning(location, msg)
    };

    let comments: Vec<(usize, String)> = TRANSLATOR_COMMENT
        .captures_iter(source)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let text = normalize_whitespace(captures.get(1)?.as_str());
            (!text.is_empty()).then(|| (line_of(source, whole.end(), first_line), text))
        })
        .collect();

    let mut resume_at = 0;
    for found in CALL_START.captures_iter(source) {
        let (Some(whole), Some(function)) = (found.get(0), found.get(1)) else {
            continue;
        };
        if whole.start() < resume_at {
            continue;
        }
        let mut reader = ArgReader {
            src: source,
            pos: whole.end(),
        };
        let call = match reader.read_call(whole.start()) {
            Ok(call) => {
                resume_at = reader.pos;
                call
            }
            Err(e) => {
                warnings.push(warn(e.offset, e.msg));
                continue;
            }
        };

        let plural = function.as_str() == "ngettext";
        let (id, plural_id) = match (plural, call.positional.first(), call.positional.get(1)) {
            (false, Some(Arg::Str(id)), _) => (normalize_whitespace(id), None),
            (true, Some(Arg::Str(id)), Some(Arg::Str(plural_id))) => {
                (normalize_whitespace(id), Some(normalize_whitespace(plural_id)))
            }
            _ => continue,
        };
        if id.is_empty() {
            continue;
        }

        let mut scope = locales.clone();
        if let Some((_, value)) = call.keywords.iter().find(|(k, _)| k == LOCALES_KEYWORD) {
            match value {
                Arg::List(items) => {
                    scope = LocaleSet::new();
                    for item in items {
                        match item {
                            Arg::Str(identifier) => match Locale::parse(identifier) {
                                Ok(locale) => {
                                    scope.insert(locale);
                                }
                                Err(_) => warnings.push(warn(
                                    whole.start(),
                                    format!("invalid locale {:?} in locales=", identifier),
                                )),
                            },
                            _ => warnings.push(warn(whole.start(), "locales= must list string literals".to_string())),
                        }
                    }
                }
                _ => warnings.push(warn(whole.start(), "locales= must be a list".to_string())),
            }
        }

        let line = line_of(source, whole.start(), first_line);
        let mut message = ExtractedMessage::new(id, Location::new(url, Some(line)), scope);
        message.plural = plural_id;
        message.auto_comments = comments
            .iter()
            .filter(|(comment_line, _)| *comment_line == line || comment_line + 1 == line)
            .map(|(_, text)| text.clone())
            .collect();
        messages.push(message);
    }

    (messages, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::parse_locales;

    fn extract(source: &str) -> (Vec<ExtractedMessage>, Vec<ParseError>) {
        let locales = parse_locales(["de", "fr"]).unwrap();
        extract_template(&PodPath::new("/views/home.html"), source, 1, &locales)
    }

    #[test]
    fn should_find_quoted_calls_with_lines() {
        let (messages, warnings) = extract("<h1>{{ _('Hello World!') }}</h1>\n<p>{{ gettext(\"Hello \\\"you\\\"\") }}</p>\n");
        assert!(warnings.is_empty());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, "Hello World!");
        assert_eq!(messages[0].location, Location::new("/views/home.html", Some(1)));
        assert_eq!(messages[1].id, "Hello \"you\"");
        assert_eq!(messages[1].location.line, Some(2));
    }

    #[test]
    fn should_read_plural_calls() {
        let (messages, _) = extract("{{ ngettext('%(num)s new message', '%(num)s new messages', num) }}");
        assert_eq!(messages[0].id, "%(num)s new message");
        assert_eq!(messages[0].plural.as_deref(), Some("%(num)s new messages"));
    }

    #[test]
    fn should_restrict_scope_with_locales_keyword() {
        let (messages, _) = extract("{{ _('Only German', locales=['de']) }} {{ _('Everyone', name=user.name) }}");
        assert_eq!(messages[0].locales, parse_locales(["de"]).unwrap());
        assert_eq!(messages[1].locales.len(), 2);
    }

    #[test]
    fn should_skip_computed_arguments_and_lookalikes() {
        let (messages, warnings) = extract("{{ _(title) }} {{ _('a' ~ b) }} {{ my_(x) }} {{ ungettext }}");
        assert!(messages.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn should_normalize_whitespace() {
        let (messages, _) = extract("{{ _('  Hello\n   World!  ') }}");
        assert_eq!(messages[0].id, "Hello World!");
    }

    #[test]
    fn should_attach_translator_comments() {
        let (messages, _) = extract("{#: Main greeting. #}\n{{ _('Hello') }}\n\n{{ _('Bye') }}\n");
        assert_eq!(messages[0].auto_comments, vec!["Main greeting.".to_string()]);
        assert!(messages[1].auto_comments.is_empty());
    }

    #[test]
    fn should_warn_on_unterminated_calls() {
        let (messages, warnings) = extract("line one\n{{ _('Hello) }}\n");
        assert!(messages.is_empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].location.line, 2);
    }

    #[test]
    fn should_offset_lines_for_document_bodies() {
        let locales = LocaleSet::new();
        let (messages, _) = extract_template(&PodPath::new("/content/a.md"), "\n{{ _('x') }}", 10, &locales);
        assert_eq!(messages[0].location.line, Some(11));
    }
}
