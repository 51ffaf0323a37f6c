//! Resolve a confident label and a locale to display content.
//!
//! There is no locale fallback. A label with an English record but no
//! Marathi record resolves to `Omitted` for Marathi, exactly like a label
//! with no content at all; the caller hides the information panel in both
//! cases and cannot tell them apart.

use serde::Serialize;

use super::content::{ContentCatalog, DiseaseRecord};
use super::labels::ClassLabel;
use super::Locale;

/// Outcome of a content lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "record", rename_all = "snake_case")]
pub enum ContentLookup<'a> {
    /// A record exists for exactly this (label, locale)
    Available(&'a DiseaseRecord),
    /// No record for this (label, locale); show nothing
    Omitted,
}

impl<'a> ContentLookup<'a> {
    pub fn record(self) -> Option<&'a DiseaseRecord> {
        match self {
            ContentLookup::Available(record) => Some(record),
            ContentLookup::Omitted => None,
        }
    }

    pub fn is_omitted(&self) -> bool {
        matches!(self, ContentLookup::Omitted)
    }
}

/// Pure lookup over an immutable `ContentCatalog`
#[derive(Debug, Clone, Copy)]
pub struct ContentResolver<'a> {
    catalog: &'a ContentCatalog,
}

impl<'a> ContentResolver<'a> {
    pub fn new(catalog: &'a ContentCatalog) -> Self {
        Self { catalog }
    }

    pub fn resolve(&self, label: &ClassLabel, locale: Locale) -> ContentLookup<'a> {
        match self.catalog.get(label, locale) {
            Some(record) => ContentLookup::Available(record),
            None => ContentLookup::Omitted,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn label(name: &str) -> ClassLabel {
        ClassLabel::new(name).unwrap()
    }

    fn english_only_catalog() -> ContentCatalog {
        let builtin = ContentCatalog::builtin().unwrap();
        let mut records = HashMap::new();
        records.insert(
            (label("Apple_healthy"), Locale::English),
            DiseaseRecord::new(
                "The plant is healthy and shows no visible disease symptoms.",
                "✅ Maintain proper watering, sunlight, and regular care.",
            ),
        );
        ContentCatalog::new(records, builtin.ui_bundles().to_vec()).unwrap()
    }

    #[test]
    fn test_resolves_exact_pair() {
        let catalog = english_only_catalog();
        let resolver = ContentResolver::new(&catalog);

        let lookup = resolver.resolve(&label("Apple_healthy"), Locale::English);
        let record = lookup.record().unwrap();
        assert!(record.description.contains("healthy"));
    }

    #[test]
    fn test_missing_locale_is_omitted_without_fallback() {
        let catalog = english_only_catalog();
        let resolver = ContentResolver::new(&catalog);

        let lookup = resolver.resolve(&label("Apple_healthy"), Locale::Marathi);
        assert!(lookup.is_omitted());
        assert_eq!(lookup.record(), None);
    }

    #[test]
    fn test_missing_label_and_missing_locale_look_the_same() {
        let catalog = english_only_catalog();
        let resolver = ContentResolver::new(&catalog);

        let missing_locale = resolver.resolve(&label("Apple_healthy"), Locale::Hindi);
        let missing_label = resolver.resolve(&label("Apple_Black_rot"), Locale::Hindi);
        assert_eq!(missing_locale, missing_label);
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let catalog = ContentCatalog::builtin().unwrap();
        let resolver = ContentResolver::new(&catalog);
        let scab = label("Apple_Apple_scab");

        for locale in Locale::ALL {
            assert_eq!(resolver.resolve(&scab, locale), resolver.resolve(&scab, locale));
        }
    }

    #[test]
    fn test_lookup_serializes_with_status() {
        let omitted = serde_json::to_value(ContentLookup::Omitted).unwrap();
        assert_eq!(omitted["status"], "omitted");
    }
}
