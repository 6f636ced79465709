//! Locale value type.
//!
//! Names are always qualified by a locale: a lowercase language code plus an
//! optional uppercase region code (`fr_CA`, `en_GB`, `en`).

use std::fmt;

/// A language with an optional region.
///
/// # Examples
///
/// ```
/// use dictionary_types::Locale;
///
/// let canadian_french = Locale::new("FR", "ca");
/// assert_eq!(canadian_french.to_string(), "fr_CA");
/// assert!(canadian_french.matches(&Locale::from_language("fr")));
/// assert!(!canadian_french.matches(&Locale::new("fr", "FR")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Locale {
    language: String,
    country: Option<String>,
}

impl Locale {
    /// Creates a locale with both language and region.
    ///
    /// The language is lowercased and the region uppercased. An empty region
    /// is treated as absent.
    pub fn new(language: impl AsRef<str>, country: impl AsRef<str>) -> Self {
        let country = country.as_ref().trim();
        Self {
            language: language.as_ref().trim().to_ascii_lowercase(),
            country: if country.is_empty() {
                None
            } else {
                Some(country.to_ascii_uppercase())
            },
        }
    }

    /// Creates a language-only locale.
    pub fn from_language(language: impl AsRef<str>) -> Self {
        Self {
            language: language.as_ref().trim().to_ascii_lowercase(),
            country: None,
        }
    }

    /// Returns the lowercase language code.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the uppercase region code, if any.
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// Returns true if both locales share a language and their regions do not
    /// conflict.
    ///
    /// A locale without a region matches every region of the same language.
    pub fn matches(&self, other: &Locale) -> bool {
        if self.language != other.language {
            return false;
        }
        match (&self.country, &other.country) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) => write!(f, "{}_{}", self.language, country),
            None => f.write_str(&self.language),
        }
    }
}
