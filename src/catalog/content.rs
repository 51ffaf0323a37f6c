//! Localized disease records and UI string bundles.
//!
//! Content is authored independently of the model: a label may have records
//! in some locales, in none, or the catalog may describe labels the current
//! model never predicts. All of that is legal. What is not legal is a
//! malformed key, which is rejected here at load time instead of turning
//! into a silent miss at request time.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::labels::{ClassLabel, LabelCatalog};
use super::Locale;
use crate::utils::error::{PlantDocError, Result};

const BUILTIN_CONTENT: &str = include_str!("../../resources/content.json");

const UI_KEY_COUNT: usize = 9;

/// Description and treatment text for one (label, locale) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseRecord {
    /// What the disease is and how it presents
    pub description: String,
    /// Treatment and prevention guidance; may be a short affirmation for
    /// healthy classes
    #[serde(default)]
    pub treatment: String,
}

impl DiseaseRecord {
    pub fn new(description: impl Into<String>, treatment: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            treatment: treatment.into(),
        }
    }
}

/// Keys of the per-locale UI string bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiKey {
    Upload,
    ChooseSource,
    UploadImage,
    UseCamera,
    LowConfidence,
    InfoTitle,
    About,
    Cure,
    Complete,
}

impl UiKey {
    pub const ALL: [UiKey; UI_KEY_COUNT] = [
        UiKey::Upload,
        UiKey::ChooseSource,
        UiKey::UploadImage,
        UiKey::UseCamera,
        UiKey::LowConfidence,
        UiKey::InfoTitle,
        UiKey::About,
        UiKey::Cure,
        UiKey::Complete,
    ];

    /// Key as written in content files
    pub fn as_str(&self) -> &'static str {
        match self {
            UiKey::Upload => "upload",
            UiKey::ChooseSource => "choose_source",
            UiKey::UploadImage => "upload_image",
            UiKey::UseCamera => "use_camera",
            UiKey::LowConfidence => "low_conf",
            UiKey::InfoTitle => "info_title",
            UiKey::About => "about",
            UiKey::Cure => "cure",
            UiKey::Complete => "complete",
        }
    }

    pub fn from_key(key: &str) -> Option<UiKey> {
        UiKey::ALL.into_iter().find(|k| k.as_str() == key)
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

/// Complete set of UI strings for one locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiStrings {
    locale: Locale,
    texts: [String; UI_KEY_COUNT],
}

impl UiStrings {
    /// Build a bundle, requiring every key exactly once and nothing else
    pub fn from_map(locale: Locale, entries: BTreeMap<String, String>) -> Result<Self> {
        let mut texts: [Option<String>; UI_KEY_COUNT] = Default::default();

        for (key, text) in entries {
            let ui_key = UiKey::from_key(&key).ok_or_else(|| {
                PlantDocError::Catalog(format!(
                    "unknown UI string key '{}' for locale '{}'",
                    key,
                    locale.code()
                ))
            })?;
            texts[ui_key.slot()] = Some(text);
        }

        let missing: Vec<&str> = UiKey::ALL
            .iter()
            .filter(|k| texts[k.slot()].is_none())
            .map(UiKey::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(PlantDocError::Catalog(format!(
                "UI strings for locale '{}' are missing keys: {}",
                locale.code(),
                missing.join(", ")
            )));
        }

        Ok(Self {
            locale,
            texts: texts.map(Option::unwrap_or_default),
        })
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn get(&self, key: UiKey) -> &str {
        &self.texts[key.slot()]
    }

    /// Key/text pairs in declaration order
    pub fn entries(&self) -> impl Iterator<Item = (UiKey, &str)> {
        UiKey::ALL.into_iter().map(move |k| (k, self.get(k)))
    }
}

/// On-disk layout of a content file
#[derive(Debug, Deserialize)]
struct RawContent {
    #[serde(default)]
    version: Option<String>,
    diseases: BTreeMap<String, BTreeMap<String, DiseaseRecord>>,
    ui: BTreeMap<String, BTreeMap<String, String>>,
}

/// Immutable store of disease records and UI bundles
#[derive(Debug, Clone)]
pub struct ContentCatalog {
    version: Option<String>,
    records: HashMap<(ClassLabel, Locale), DiseaseRecord>,
    labels: BTreeSet<ClassLabel>,
    ui: Vec<UiStrings>,
}

impl ContentCatalog {
    /// Assemble a catalog; `ui` must hold exactly one bundle per locale
    pub fn new(
        records: HashMap<(ClassLabel, Locale), DiseaseRecord>,
        ui: Vec<UiStrings>,
    ) -> Result<Self> {
        for ((label, locale), record) in &records {
            if record.description.trim().is_empty() {
                return Err(PlantDocError::Catalog(format!(
                    "empty description for '{}' in locale '{}'",
                    label,
                    locale.code()
                )));
            }
        }

        let mut ordered = Vec::with_capacity(Locale::ALL.len());
        for locale in Locale::ALL {
            let mut bundles = ui.iter().filter(|b| b.locale() == locale);
            match (bundles.next(), bundles.next()) {
                (Some(bundle), None) => ordered.push(bundle.clone()),
                (None, _) => {
                    return Err(PlantDocError::Catalog(format!(
                        "no UI strings for locale '{}'",
                        locale.code()
                    )))
                }
                (Some(_), Some(_)) => {
                    return Err(PlantDocError::Catalog(format!(
                        "duplicate UI strings for locale '{}'",
                        locale.code()
                    )))
                }
            }
        }

        let labels = records.keys().map(|(label, _)| label.clone()).collect();

        Ok(Self {
            version: None,
            records,
            labels,
            ui: ordered,
        })
    }

    /// Parse and validate a content file
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawContent = serde_json::from_str(json)
            .map_err(|e| PlantDocError::Catalog(format!("invalid content file: {}", e)))?;

        let mut records = HashMap::new();
        for (label_key, per_locale) in raw.diseases {
            let label = ClassLabel::new(label_key)?;
            for (locale_key, record) in per_locale {
                let locale = parse_locale_key(&locale_key, &format!("disease '{}'", label))?;
                if records.insert((label.clone(), locale), record).is_some() {
                    return Err(PlantDocError::Catalog(format!(
                        "locale '{}' appears twice for disease '{}'",
                        locale.code(),
                        label
                    )));
                }
            }
        }

        let ui = raw
            .ui
            .into_iter()
            .map(|(locale_key, entries)| {
                let locale = parse_locale_key(&locale_key, "UI strings")?;
                UiStrings::from_map(locale, entries)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut catalog = Self::new(records, ui)?;
        catalog.version = raw.version;

        debug!(
            "Content catalog loaded: {} labels, {} records",
            catalog.labels.len(),
            catalog.records.len()
        );
        Ok(catalog)
    }

    /// Load a content file from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            PlantDocError::Catalog(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json).map_err(|e| match e {
            PlantDocError::Catalog(msg) => {
                PlantDocError::Catalog(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// The content compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CONTENT)
    }

    /// Raw (label, locale) lookup. Callers outside the catalog go through
    /// `ContentResolver`, which names the omission outcome explicitly.
    pub(crate) fn get(&self, label: &ClassLabel, locale: Locale) -> Option<&DiseaseRecord> {
        self.records.get(&(label.clone(), locale))
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Whether any locale has a record for the label
    pub fn has_label(&self, label: &ClassLabel) -> bool {
        self.labels.contains(label)
    }

    /// Labels with at least one record, sorted
    pub fn labels(&self) -> impl Iterator<Item = &ClassLabel> {
        self.labels.iter()
    }

    pub fn ui(&self, locale: Locale) -> &UiStrings {
        &self.ui[locale.index()]
    }

    pub fn ui_bundles(&self) -> &[UiStrings] {
        &self.ui
    }

    /// Number of records per locale
    pub fn coverage(&self) -> Vec<(Locale, usize)> {
        Locale::ALL
            .into_iter()
            .map(|locale| {
                let count = self.records.keys().filter(|(_, l)| *l == locale).count();
                (locale, count)
            })
            .collect()
    }

    /// Content labels that no model output can reach
    pub fn orphan_labels<'a>(&'a self, labels: &LabelCatalog) -> Vec<&'a ClassLabel> {
        self.labels.iter().filter(|l| !labels.contains(l)).collect()
    }

    /// Model labels without a record in any locale
    pub fn uncovered_labels<'a>(&self, labels: &'a LabelCatalog) -> Vec<&'a ClassLabel> {
        labels.iter().filter(|l| !self.has_label(l)).collect()
    }
}

fn parse_locale_key(key: &str, context: &str) -> Result<Locale> {
    key.parse::<Locale>().map_err(|_| {
        PlantDocError::Catalog(format!("unsupported locale key '{}' in {}", key, context))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(name: &str) -> ClassLabel {
        ClassLabel::new(name).unwrap()
    }

    fn content_json(diseases: &str) -> String {
        let builtin: serde_json::Value = serde_json::from_str(BUILTIN_CONTENT).unwrap();
        format!(r#"{{"diseases": {}, "ui": {}}}"#, diseases, builtin["ui"])
    }

    #[test]
    fn test_builtin_content_is_complete() {
        let catalog = ContentCatalog::builtin().unwrap();
        let labels = LabelCatalog::builtin().unwrap();

        assert!(catalog.orphan_labels(&labels).is_empty());
        assert!(catalog.uncovered_labels(&labels).is_empty());
        for (_, count) in catalog.coverage() {
            assert_eq!(count, 8);
        }
    }

    #[test]
    fn test_builtin_records_have_text() {
        let catalog = ContentCatalog::builtin().unwrap();
        let scab = catalog.get(&label("Apple_Apple_scab"), Locale::English).unwrap();
        assert!(scab.description.starts_with("Apple scab is a fungal disease"));
        assert!(scab.treatment.contains("captan or sulfur"));

        let healthy = catalog.get(&label("Grape_healthy"), Locale::Marathi).unwrap();
        assert!(!healthy.description.is_empty());
    }

    #[test]
    fn test_builtin_ui_strings() {
        let catalog = ContentCatalog::builtin().unwrap();
        let en = catalog.ui(Locale::English);
        assert_eq!(en.locale(), Locale::English);
        assert_eq!(
            en.get(UiKey::LowConfidence),
            "⚠ Low confidence. Please upload a clearer image."
        );
        assert_eq!(catalog.ui(Locale::Hindi).get(UiKey::Complete), "✅ विश्लेषण पूर्ण हुआ");
        assert_eq!(en.entries().count(), UiKey::ALL.len());
    }

    #[test]
    fn test_unknown_locale_key_fails_fast() {
        let json = content_json(
            r#"{"Apple_healthy": {"fr": {"description": "Saine", "treatment": ""}}}"#,
        );
        let err = ContentCatalog::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported locale key 'fr'"));
    }

    #[test]
    fn test_malformed_label_key_fails_fast() {
        let json = content_json(r#"{" Apple_healthy": {"en": {"description": "Fine"}}}"#);
        assert!(matches!(
            ContentCatalog::from_json(&json),
            Err(PlantDocError::Catalog(_))
        ));
    }

    #[test]
    fn test_empty_description_rejected() {
        let json = content_json(r#"{"Apple_healthy": {"en": {"description": "  "}}}"#);
        let err = ContentCatalog::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("empty description"));
    }

    #[test]
    fn test_missing_ui_key_rejected() {
        let mut entries = BTreeMap::new();
        entries.insert("upload".to_string(), "Upload".to_string());
        let err = UiStrings::from_map(Locale::English, entries).unwrap_err();
        assert!(err.to_string().contains("low_conf"));
    }

    #[test]
    fn test_unknown_ui_key_rejected() {
        let builtin = ContentCatalog::builtin().unwrap();
        let mut entries: BTreeMap<String, String> = builtin
            .ui(Locale::English)
            .entries()
            .map(|(k, v)| (k.as_str().to_string(), v.to_string()))
            .collect();
        entries.insert("uplaod".to_string(), "typo".to_string());
        let err = UiStrings::from_map(Locale::English, entries).unwrap_err();
        assert!(err.to_string().contains("uplaod"));
    }

    #[test]
    fn test_missing_locale_bundle_rejected() {
        let builtin = ContentCatalog::builtin().unwrap();
        let partial = builtin.ui_bundles()[..2].to_vec();
        let err = ContentCatalog::new(HashMap::new(), partial).unwrap_err();
        assert!(err.to_string().contains("no UI strings for locale 'mr'"));
    }

    #[test]
    fn test_partial_locale_coverage_is_valid() {
        let json = content_json(
            r#"{"Apple_healthy": {
                "en": {"description": "Healthy leaf", "treatment": "Keep watering"}
            }}"#,
        );
        let catalog = ContentCatalog::from_json(&json).unwrap();
        assert!(catalog.has_label(&label("Apple_healthy")));
        assert!(catalog.get(&label("Apple_healthy"), Locale::English).is_some());
        assert!(catalog.get(&label("Apple_healthy"), Locale::Marathi).is_none());
        assert_eq!(
            catalog.coverage(),
            vec![(Locale::English, 1), (Locale::Hindi, 0), (Locale::Marathi, 0)]
        );
    }

    #[test]
    fn test_orphan_and_uncovered_labels() {
        let json = content_json(
            r#"{
                "Apple_healthy": {"en": {"description": "Fine"}},
                "Apple_Typo": {"en": {"description": "Oops"}}
            }"#,
        );
        let catalog = ContentCatalog::from_json(&json).unwrap();
        let labels = LabelCatalog::from_names(["Apple_healthy", "Grape_healthy"]).unwrap();

        let orphans: Vec<_> = catalog
            .orphan_labels(&labels)
            .into_iter()
            .map(|l| l.as_str())
            .collect();
        assert_eq!(orphans, ["Apple_Typo"]);
        let uncovered: Vec<_> = catalog
            .uncovered_labels(&labels)
            .into_iter()
            .map(|l| l.as_str())
            .collect();
        assert_eq!(uncovered, ["Grape_healthy"]);
    }

    #[test]
    fn test_from_file_reports_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("content.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = ContentCatalog::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("content.json"));
    }

    #[test]
    fn test_unreadable_file_is_catalog_error() {
        let dir = tempfile::TempDir::new().unwrap();

        let missing = dir.path().join("missing.json");
        let err = ContentCatalog::from_file(&missing).unwrap_err();
        assert!(matches!(err, PlantDocError::Catalog(_)));
        assert!(err.is_startup_fatal());
        assert!(err.to_string().contains("missing.json"));

        let binary = dir.path().join("binary.json");
        std::fs::write(&binary, [0xffu8, 0xfe, 0x00, 0x80]).unwrap();
        let err = ContentCatalog::from_file(&binary).unwrap_err();
        assert_eq!(err.kind(), "catalog_error");
    }
}
