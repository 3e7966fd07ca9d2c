//! Locale identifiers.
//!
//! Locales are normalized to `language[_Script][_REGION]` so that `de-de`,
//! `de_DE` and `DE-de` all name the same catalog directory.

use crate::error::{CatalogError, Result};
use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Ordered set of locales. Order is first-declared order.
pub type LocaleSet = IndexSet<Locale>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale(String);

impl Locale {
    pub fn parse(identifier: &str) -> Result<Self> {
        let mut parts = identifier.trim().split(['_', '-']);
        let language = parts.next().unwrap_or_default();
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CatalogError::Locale(identifier.to_string()));
        }

        let mut normalized = language.to_ascii_lowercase();
        for part in parts {
            let is_alpha = part.chars().all(|c| c.is_ascii_alphabetic());
            let is_digit = part.chars().all(|c| c.is_ascii_digit());
            normalized.push('_');
            match part.len() {
                2 if is_alpha => normalized.push_str(&part.to_ascii_uppercase()),
                3 if is_digit => normalized.push_str(part),
                4 if is_alpha => {
                    let (head, tail) = part.split_at(1);
                    normalized.push_str(&head.to_ascii_uppercase());
                    normalized.push_str(&tail.to_ascii_lowercase());
                }
                _ => return Err(CatalogError::Locale(identifier.to_string())),
            }
        }
        Ok(Locale(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn language(&self) -> &str {
        self.0.split('_').next().unwrap_or(&self.0)
    }

    /// `Plural-Forms` rule used when creating a catalog for this locale.
    pub fn plural_forms(&self) -> PluralForms {
        PluralForms::for_locale(self)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        Locale::parse(s)
    }
}

impl AsRef<str> for Locale {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Locale::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Parse a list of identifiers, failing on the first invalid one.
pub fn parse_locales<I, S>(identifiers: I) -> Result<LocaleSet>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    identifiers
        .into_iter()
        .map(|s| Locale::parse(s.as_ref()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluralForms {
    pub nplurals: usize,
    pub expression: &'static str,
}

const TWO_FORMS: PluralForms = PluralForms {
    nplurals: 2,
    expression: "(n != 1)",
};

impl PluralForms {
    pub fn for_locale(locale: &Locale) -> PluralForms {
        if locale.as_str() == "pt_BR" {
            return PluralForms {
                nplurals: 2,
                expression: "(n > 1)",
            };
        }
        match locale.language() {
            "ja" | "ko" | "zh" | "vi" | "th" | "id" | "ms" => PluralForms {
                nplurals: 1,
                expression: "0",
            },
            "fr" => PluralForms {
                nplurals: 2,
                expression: "(n > 1)",
            },
            "ru" | "uk" | "be" => PluralForms {
                nplurals: 3,
                expression: "(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2)",
            },
            "pl" => PluralForms {
                nplurals: 3,
                expression: "(n==1 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2)",
            },
            "cs" | "sk" => PluralForms {
                nplurals: 3,
                expression: "((n==1) ? 0 : (n>=2 && n<=4) ? 1 : 2)",
            },
            "ar" => PluralForms {
                nplurals: 6,
                expression: "(n==0 ? 0 : n==1 ? 1 : n==2 ? 2 : n%100>=3 && n%100<=10 ? 3 : n%100>=11 ? 4 : 5)",
            },
            _ => TWO_FORMS,
        }
    }

    /// Rule used by the locale-less template.
    pub fn template() -> PluralForms {
        TWO_FORMS
    }

    /// Read the `nplurals` count out of a `Plural-Forms` header value.
    pub fn parse_nplurals(header_value: &str) -> Option<usize> {
        header_value
            .split(';')
            .filter_map(|part| part.trim().strip_prefix("nplurals="))
            .find_map(|n| n.trim().parse().ok())
    }
}

impl fmt::Display for PluralForms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nplurals={}; plural={};", self.nplurals, self.expression)
    }
}
