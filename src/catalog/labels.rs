//! Class labels and the ordered label catalog.
//!
//! The position of a label in the catalog is the model's output index for
//! that class. Nothing at runtime can prove that pairing correct; the model
//! bundle ships both together and checks the lengths agree.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::error::{PlantDocError, Result};

/// Label list used when no bundle-specific list is supplied
const BUILTIN_LABELS: &str = include_str!("../../resources/labels.json");

/// A validated class label, e.g. `"Apple_Apple_scab"` or `"Grape_healthy"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ClassLabel(String);

impl ClassLabel {
    /// Validate and wrap a label string
    ///
    /// Labels may contain spaces, commas and parentheses (the PlantVillage
    /// names do), but not surrounding whitespace or control characters.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(PlantDocError::Catalog("empty class label".to_string()));
        }
        if name.trim() != name {
            return Err(PlantDocError::Catalog(format!(
                "class label '{}' has surrounding whitespace",
                name
            )));
        }
        if name.chars().any(char::is_control) {
            return Err(PlantDocError::Catalog(format!(
                "class label {:?} contains control characters",
                name
            )));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the label represents a healthy plant (not diseased)
    pub fn is_healthy(&self) -> bool {
        self.0.ends_with("healthy")
    }

    /// Crop name, e.g. "Apple" from "Apple_Black_rot" or "Tomato___Leaf_Mold"
    pub fn plant(&self) -> &str {
        if let Some((plant, _)) = self.0.split_once("___") {
            return plant;
        }
        self.0.split('_').next().unwrap_or(&self.0)
    }

    /// Human-readable form with underscores collapsed to single spaces
    pub fn display_name(&self) -> String {
        self.0
            .split('_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ClassLabel {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        ClassLabel::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Ordered, immutable list of class labels
#[derive(Debug, Clone)]
pub struct LabelCatalog {
    labels: Vec<ClassLabel>,
    index: HashMap<ClassLabel, usize>,
}

impl LabelCatalog {
    /// Build a catalog, rejecting empty lists and duplicates
    pub fn new(labels: Vec<ClassLabel>) -> Result<Self> {
        if labels.is_empty() {
            return Err(PlantDocError::Catalog("label list is empty".to_string()));
        }

        let mut index = HashMap::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            if let Some(first) = index.insert(label.clone(), i) {
                return Err(PlantDocError::Catalog(format!(
                    "duplicate label '{}' at positions {} and {}",
                    label, first, i
                )));
            }
        }

        Ok(Self { labels, index })
    }

    /// Build from plain strings
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels = names
            .into_iter()
            .map(ClassLabel::new)
            .collect::<Result<Vec<_>>>()?;
        Self::new(labels)
    }

    /// Parse a JSON array of label strings
    pub fn from_json(json: &str) -> Result<Self> {
        let labels: Vec<ClassLabel> = serde_json::from_str(json)
            .map_err(|e| PlantDocError::Catalog(format!("invalid label list: {}", e)))?;
        Self::new(labels)
    }

    /// Load a JSON label list from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            PlantDocError::Catalog(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// The label list compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_LABELS)
    }

    /// Label for a model output index
    pub fn get(&self, index: usize) -> Option<&ClassLabel> {
        self.labels.get(index)
    }

    /// Output index for a label
    pub fn position(&self, label: &ClassLabel) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn contains(&self, label: &ClassLabel) -> bool {
        self.index.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassLabel> {
        self.labels.iter()
    }

    pub fn as_slice(&self) -> &[ClassLabel] {
        &self.labels
    }

    /// Serialize back to the JSON list format
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.labels)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_labels_order() {
        let catalog = LabelCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.get(0).unwrap().as_str(), "Apple_Apple_scab");
        assert_eq!(catalog.get(3).unwrap().as_str(), "Apple_healthy");
        assert_eq!(catalog.get(7).unwrap().as_str(), "Grape_healthy");
        assert!(catalog.get(8).is_none());
    }

    #[test]
    fn test_position_round_trips_index() {
        let catalog = LabelCatalog::builtin().unwrap();
        for (i, label) in catalog.iter().enumerate() {
            assert_eq!(catalog.position(label), Some(i));
        }
        let unknown = ClassLabel::new("Unknown_class").unwrap();
        assert_eq!(catalog.position(&unknown), None);
    }

    #[test]
    fn test_label_validation() {
        assert!(ClassLabel::new("").is_err());
        assert!(ClassLabel::new(" Apple_healthy").is_err());
        assert!(ClassLabel::new("Apple\nhealthy").is_err());
        assert!(ClassLabel::new("Corn_(maize)___Cercospora_leaf_spot Gray_leaf_spot").is_ok());
        assert!(ClassLabel::new("Pepper,_bell___healthy").is_ok());
    }

    #[test]
    fn test_is_healthy() {
        assert!(ClassLabel::new("Apple_healthy").unwrap().is_healthy());
        assert!(!ClassLabel::new("Apple_Black_rot").unwrap().is_healthy());
    }

    #[test]
    fn test_plant_name() {
        assert_eq!(ClassLabel::new("Grape_Black_rot").unwrap().plant(), "Grape");
        assert_eq!(ClassLabel::new("Tomato___Leaf_Mold").unwrap().plant(), "Tomato");
        assert_eq!(
            ClassLabel::new("Cherry_(including_sour)___healthy").unwrap().plant(),
            "Cherry_(including_sour)"
        );
    }

    #[test]
    fn test_display_name() {
        let label = ClassLabel::new("Grape_Esca_(Black_Measles)").unwrap();
        assert_eq!(label.display_name(), "Grape Esca (Black Measles)");
        let label = ClassLabel::new("Tomato___Leaf_Mold").unwrap();
        assert_eq!(label.display_name(), "Tomato Leaf Mold");
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let err = LabelCatalog::from_names(["A", "B", "A"]).unwrap_err();
        assert!(err.to_string().contains("duplicate label 'A'"));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(LabelCatalog::from_json("[]").is_err());
    }

    #[test]
    fn test_from_json_rejects_malformed_label() {
        let err = LabelCatalog::from_json(r#"["Apple_healthy", "  "]"#).unwrap_err();
        assert!(matches!(err, PlantDocError::Catalog(_)));
    }

    #[test]
    fn test_missing_label_file_is_catalog_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = LabelCatalog::from_file(&dir.path().join("labels.json")).unwrap_err();
        assert_eq!(err.kind(), "catalog_error");
        assert!(err.to_string().contains("labels.json"));
    }

    #[test]
    fn test_json_round_trip_preserves_order() {
        let catalog = LabelCatalog::from_names(["C", "A", "B"]).unwrap();
        let parsed = LabelCatalog::from_json(&catalog.to_json().unwrap()).unwrap();
        let names: Vec<_> = parsed.iter().map(ClassLabel::as_str).collect();
        assert_eq!(names, ["C", "A", "B"]);
    }
}
