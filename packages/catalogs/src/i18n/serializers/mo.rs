//! MO Serializer Module
//!
//! GNU binary catalogs, as loaded by gettext runtimes.
//!
//! Layout (all integers little-endian on write):
//!
//! ```text
//! 0   magic 0x950412de
//! 4   revision 0
//! 8   N, number of strings
//! 12  offset of original-string table
//! 16  offset of translation table
//! 20  hash table size (0)
//! 24  hash table offset
//! 28  N (length, offset) pairs for originals, then N for translations,
//!     then the NUL-terminated strings
//! ```
//!
//! Only live, translated, non-fuzzy entries are written; the header entry
//! (empty msgid) always comes first because keys are sorted bytewise.

use crate::i18n::catalog::{Catalog, Header, LANGUAGE};
use crate::i18n::message::Message;
use crate::i18n::serializers::serializer::Serializer;
use crate::locale::Locale;
use crate::parse_util::{ParseError, ParseLocation};

pub const MO_MAGIC: u32 = 0x950412de;
const HEADER_SIZE: u32 = 28;
const CONTEXT_SEPARATOR: char = '\u{4}';

#[derive(Debug, Default, Clone, Copy)]
pub struct Mo;

impl Mo {
    pub fn new() -> Self {
        Mo
    }
}

fn key_of(message: &Message) -> String {
    let mut key = message.key();
    if let Some(plural) = &message.plural {
        key.push('\0');
        key.push_str(plural);
    }
    key
}

impl Serializer for Mo {
    fn write(&self, catalog: &Catalog) -> Vec<u8> {
        let mut entries: Vec<(String, String)> = vec![(String::new(), catalog.header.to_msgstr())];
        entries.extend(
            catalog
                .live()
                .filter(|m| !m.id.is_empty() && m.is_translated() && !m.is_fuzzy())
                .map(|m| (key_of(m), m.strings.join("\0"))),
        );
        entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

        let count = entries.len() as u32;
        let originals_offset = HEADER_SIZE;
        let translations_offset = originals_offset + count * 8;
        let strings_offset = translations_offset + count * 8;

        let mut originals: Vec<(u32, u32)> = Vec::with_capacity(entries.len());
        let mut translations: Vec<(u32, u32)> = Vec::with_capacity(entries.len());
        let mut strings: Vec<u8> = Vec::new();
        for (key, _) in &entries {
            originals.push((key.len() as u32, strings_offset + strings.len() as u32));
            strings.extend_from_slice(key.as_bytes());
            strings.push(0);
        }
        for (_, value) in &entries {
            translations.push((value.len() as u32, strings_offset + strings.len() as u32));
            strings.extend_from_slice(value.as_bytes());
            strings.push(0);
        }

        let mut out = Vec::with_capacity(strings_offset as usize + strings.len());
        for word in [
            MO_MAGIC,
            0,
            count,
            originals_offset,
            translations_offset,
            0,
            strings_offset,
        ] {
            out.extend_from_slice(&word.to_le_bytes());
        }
        for (len, offset) in originals.iter().chain(translations.iter()) {
            out.extend_from_slice(&len.to_le_bytes());
            out.extend_from_slice(&offset.to_le_bytes());
        }
        out.extend_from_slice(&strings);
        out
    }

    fn load(&self, content: &[u8], url: &str) -> Result<Catalog, ParseError> {
        let reader = MoReader::new(content, url)?;
        let mut catalog = Catalog::new(None, Header::default());

        for index in 0..reader.count {
            let key = reader.string(reader.originals + index * 8)?;
            let value = reader.string(reader.translations + index * 8)?;

            if key.is_empty() {
                catalog.header.fields = Header::parse_fields(&value);
                catalog.locale = catalog.header.get(LANGUAGE).and_then(|l| Locale::parse(l).ok());
                continue;
            }

            let (context, rest) = match key.split_once(CONTEXT_SEPARATOR) {
                Some((context, rest)) => (Some(context.to_string()), rest),
                None => (None, key.as_str()),
            };
            let mut message = match rest.split_once('\0') {
                Some((id, plural)) => {
                    let mut message = Message::new_plural(id, plural, 1);
                    message.strings = value.split('\0').map(str::to_string).collect();
                    message
                }
                None => Message::new(rest).with_translation(value.as_str()),
            };
            message.context = context;
            catalog.insert(message);
        }
        catalog.exists = true;
        Ok(catalog)
    }

    fn extension(&self) -> &'static str {
        "mo"
    }
}

struct MoReader<'a> {
    data: &'a [u8],
    url: &'a str,
    big_endian: bool,
    count: usize,
    originals: usize,
    translations: usize,
}

impl<'a> MoReader<'a> {
    fn new(data: &'a [u8], url: &'a str) -> Result<Self, ParseError> {
        let mut reader = MoReader {
            data,
            url,
            big_endian: false,
            count: 0,
            originals: 0,
            translations: 0,
        };
        let magic = reader.word(0)?;
        if magic == MO_MAGIC.swap_bytes() {
            reader.big_endian = true;
        } else if magic != MO_MAGIC {
            return Err(reader.error(0, format!("bad magic number {:#010x}", magic)));
        }
        reader.count = reader.word(8)? as usize;
        reader.originals = reader.word(12)? as usize;
        reader.translations = reader.word(16)? as usize;
        Ok(reader)
    }

    fn error(&self, offset: usize, msg: String) -> ParseError {
        ParseError::new(ParseLocation::new(self.url, offset, 1, offset + 1), msg)
    }

    fn word(&self, offset: usize) -> Result<u32, ParseError> {
        let bytes: [u8; 4] = self
            .data
            .get(offset..offset + 4)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| self.error(offset, "truncated MO file".to_string()))?;
        Ok(if self.big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        })
    }

    /// Read the string described by the (length, offset) pair at `descriptor`.
    fn string(&self, descriptor: usize) -> Result<String, ParseError> {
        let len = self.word(descriptor)? as usize;
        let offset = self.word(descriptor + 4)? as usize;
        let bytes = self
            .data
            .get(offset..offset + len)
            .ok_or_else(|| self.error(descriptor, "string points outside the file".to_string()))?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| self.error(offset, "string is not valid UTF-8".to_string()))
    }
}
