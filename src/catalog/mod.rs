//! Catalog module: labels, locales and localized diagnostic content
//!
//! This module provides:
//! - `LabelCatalog`: the ordered label list aligned with model outputs
//! - `ContentCatalog`: disease records and UI strings keyed by locale
//! - `ContentResolver`: the lookup from a confident label to its record
//!
//! Every catalog is built once at startup, validated, and never mutated.

pub mod content;
pub mod labels;
pub mod resolver;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::error::PlantDocError;

// Re-export main types for convenience
pub use content::{ContentCatalog, DiseaseRecord, UiKey, UiStrings};
pub use labels::{ClassLabel, LabelCatalog};
pub use resolver::{ContentLookup, ContentResolver};

/// Supported display languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Locale {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "mr")]
    Marathi,
}

impl Locale {
    /// Every supported locale, in selector order
    pub const ALL: [Locale; 3] = [Locale::English, Locale::Hindi, Locale::Marathi];

    /// Short language code
    pub fn code(&self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Hindi => "hi",
            Locale::Marathi => "mr",
        }
    }

    /// Position in `Locale::ALL`
    pub fn index(&self) -> usize {
        match self {
            Locale::English => 0,
            Locale::Hindi => 1,
            Locale::Marathi => 2,
        }
    }

    /// Name of the language in its own script
    pub fn native_name(&self) -> &'static str {
        match self {
            Locale::English => "English",
            Locale::Hindi => "हिंदी",
            Locale::Marathi => "मराठी",
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::English
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.native_name())
    }
}

impl FromStr for Locale {
    type Err = PlantDocError;

    /// Accepts a code (`en`, case-insensitive) or the native name (`मराठी`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Locale::ALL
            .into_iter()
            .find(|locale| {
                locale.code().eq_ignore_ascii_case(trimmed)
                    || locale.native_name().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| PlantDocError::UnsupportedLocale(s.to_string()))
    }
}
