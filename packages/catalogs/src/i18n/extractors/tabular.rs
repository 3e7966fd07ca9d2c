//! Tabular (CSV) sources.
//!
//! The first row is the header. Columns whose header ends with `@` are
//! translatable; every non-empty cell in them is a message located at the
//! line its row starts on. Fields may be quoted, with `""` as an escaped
//! quote and embedded newlines.

use crate::file_system::PodPath;
use crate::i18n::extractors::ExtractedMessage;
use crate::i18n::message::{normalize_whitespace, Location};
use crate::locale::LocaleSet;
use crate::parse_util::{ParseError, ParseLocation};

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// File line the row starts on.
    pub line: usize,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn tagged_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.header
            .iter()
            .enumerate()
            .filter(|(_, name)| {
                let name = name.trim();
                name.len() > 1 && name.ends_with('@')
            })
            .map(|(i, _)| i)
    }

    /// Rows as (column, cell) pairs in header order. Missing trailing cells
    /// read as empty strings.
    pub fn records(&self) -> impl Iterator<Item = Vec<(&str, &str)>> + '_ {
        self.rows.iter().map(|row| {
            self.header
                .iter()
                .enumerate()
                .map(|(i, name)| (name.as_str(), row.cells.get(i).map(String::as_str).unwrap_or("")))
                .collect()
        })
    }
}

/// Parse CSV content. Malformed input is reported and parsed as far as
/// possible.
pub fn parse_csv(url: &str, content: &str) -> (Table, Vec<ParseError>) {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut warnings = Vec::new();
    let mut records: Vec<Row> = Vec::new();

    let mut cells: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quote_start = 0;
    let mut line = 1;
    let mut row_line = 1;
    let mut row_has_content = false;

    let mut chars = content.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek().map(|(_, n)| *n) == Some('"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                quote_start = offset;
                row_has_content = true;
            }
            ',' => {
                cells.push(std::mem::take(&mut field));
                row_has_content = true;
            }
            '\r' if chars.peek().map(|(_, n)| *n) == Some('\n') => {}
            '\n' => {
                if row_has_content || !field.is_empty() {
                    cells.push(std::mem::take(&mut field));
                    records.push(Row {
                        line: row_line,
                        cells: std::mem::take(&mut cells),
                    });
                }
                row_has_content = false;
                line += 1;
                row_line = line;
            }
            _ => {
                field.push(c);
                row_has_content = true;
            }
        }
    }
    if in_quotes {
        warnings.push(ParseError::warning(
            ParseLocation::from_offset(url, content, quote_start),
            "unterminated quoted field",
        ));
    }
    if row_has_content || !field.is_empty() {
        cells.push(field);
        records.push(Row {
            line: row_line,
            cells,
        });
    }

    let mut rows = records.into_iter();
    let header = rows.next().map(|r| r.cells).unwrap_or_default();
    let rows: Vec<Row> = rows.collect();
    for row in rows.iter().filter(|r| r.cells.len() > header.len()) {
        warnings.push(ParseError::warning(
            ParseLocation::new(url, 0, row.line, 1),
            format!("row has {} fields, header has {}", row.cells.len(), header.len()),
        ));
    }

    (Table { header, rows }, warnings)
}

pub fn extract_table(path: &PodPath, table: &Table, locales: &LocaleSet) -> Vec<ExtractedMessage> {
    let columns: Vec<usize> = table.tagged_columns().collect();
    let mut messages = Vec::new();
    for row in &table.rows {
        for &column in &columns {
            let Some(cell) = row.cells.get(column) else {
                continue;
            };
            let id = normalize_whitespace(cell);
            if id.is_empty() {
                continue;
            }
            messages.push(ExtractedMessage::new(
                id,
                Location::new(path.as_str(), Some(row.line)),
                locales.clone(),
            ));
        }
    }
    messages
}
