//! Parse Utilities
//!
//! Source positions and diagnostics reported while reading pod files.
//! Diagnostics never abort a run on their own; callers collect them and
//! surface them at the end of an extraction.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseLocation {
    pub url: String,
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in chars.
    pub col: usize,
}

impl ParseLocation {
    pub fn new(url: impl Into<String>, offset: usize, line: usize, col: usize) -> Self {
        ParseLocation {
            url: url.into(),
            offset,
            line,
            col,
        }
    }

    /// Location of the start of a file.
    pub fn start_of(url: impl Into<String>) -> Self {
        ParseLocation::new(url, 0, 1, 1)
    }

    /// Compute the line and column of a byte `offset` into `content`.
    pub fn from_offset(url: impl Into<String>, content: &str, offset: usize) -> Self {
        let mut offset = offset.min(content.len());
        while !content.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &content[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let col = content[line_start..offset].chars().count() + 1;
        ParseLocation::new(url, offset, line, col)
    }

    /// Return the source around the location, up to `max_chars` on each side
    /// without crossing more than `max_lines` line breaks.
    pub fn get_context(
        &self,
        content: &str,
        max_chars: usize,
        max_lines: usize,
    ) -> Option<(String, String)> {
        if content.is_empty() || self.offset > content.len() {
            return None;
        }
        let (before, after) = content.split_at(self.offset);

        let mut lines = 0;
        let before: String = before
            .chars()
            .rev()
            .take(max_chars)
            .take_while(|c| {
                if *c == '\n' {
                    lines += 1;
                }
                lines < max_lines
            })
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        lines = 0;
        let after: String = after
            .chars()
            .take(max_chars)
            .take_while(|c| {
                if *c == '\n' {
                    lines += 1;
                }
                lines < max_lines
            })
            .collect();

        Some((before, after))
    }
}

impl fmt::Display for ParseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.url, self.line, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseErrorLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseError {
    pub location: ParseLocation,
    pub msg: String,
    pub level: ParseErrorLevel,
}

impl ParseError {
    pub fn new(location: ParseLocation, msg: impl Into<String>) -> Self {
        ParseError {
            location,
            msg: msg.into(),
            level: ParseErrorLevel::Error,
        }
    }

    pub fn warning(location: ParseLocation, msg: impl Into<String>) -> Self {
        ParseError {
            location,
            msg: msg.into(),
            level: ParseErrorLevel::Warning,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.level == ParseErrorLevel::Warning
    }

    /// Message decorated with the source text around the location.
    pub fn contextual_message(&self, content: &str) -> String {
        match self.location.get_context(content, 100, 3) {
            Some((before, after)) => {
                let level_str = match self.level {
                    ParseErrorLevel::Warning => "WARNING",
                    ParseErrorLevel::Error => "ERROR",
                };
                format!("{} (\"{}[{} ->]{}\")", self.msg, before, level_str, after)
            }
            None => self.msg.clone(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.msg, self.location)
    }
}

impl std::error::Error for ParseError {}
