//! Diagnosis Pipeline
//!
//! `Diagnoser` is the one object a caller needs: it is built once at startup
//! from an `AppConfig`, owns the loaded model and catalogs, and turns image
//! bytes plus a locale into a `Diagnosis`.
//!
//! decode -> resize/normalize -> predict -> threshold -> content lookup

use std::fmt::Write as _;
use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backend::{backend_name, default_device, DefaultBackend};
use crate::catalog::{
    ClassLabel, ContentCatalog, ContentResolver, DiseaseRecord, LabelCatalog, Locale, UiKey,
    UiStrings,
};
use crate::config::AppConfig;
use crate::inference::{
    ClassificationDecision, ClassificationResult, ImagePreprocessor, InferenceEngine,
    SLOW_INFERENCE_MS,
};
use crate::model::ModelBundle;
use crate::utils::confidence_percent;
use crate::utils::error::{PlantDocError, Result};

/// What the classifier concluded about one image
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Top probability below the threshold
    Uncertain,
    /// `confidence_percent` is the top probability times 100, rounded to two
    /// decimals
    Confident {
        label: ClassLabel,
        confidence_percent: f64,
    },
}

/// Result of one `classify` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    pub locale: Locale,
    pub outcome: Outcome,
    /// Record for the predicted label in `locale`; `None` when uncertain or
    /// when no record exists for that pair
    pub content: Option<DiseaseRecord>,
    pub inference_time_ms: f64,
}

impl Diagnosis {
    pub fn is_confident(&self) -> bool {
        matches!(self.outcome, Outcome::Confident { .. })
    }

    pub fn label(&self) -> Option<&ClassLabel> {
        match &self.outcome {
            Outcome::Confident { label, .. } => Some(label),
            Outcome::Uncertain => None,
        }
    }

    /// Plain-text rendering using the locale's UI strings
    pub fn render(&self, ui: &UiStrings) -> String {
        let mut out = String::new();

        let (label, percent) = match &self.outcome {
            Outcome::Uncertain => {
                let _ = writeln!(out, "⚠ {}", ui.get(UiKey::LowConfidence));
                return out;
            }
            Outcome::Confident {
                label,
                confidence_percent,
            } => (label, confidence_percent),
        };

        let _ = writeln!(out, "🌱 {}", label);
        let _ = writeln!(out, "Confidence: {:?}%", percent);

        if let Some(record) = &self.content {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", ui.get(UiKey::InfoTitle));
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", ui.get(UiKey::About));
            let _ = writeln!(out, "{}", record.description);
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", ui.get(UiKey::Cure));
            let _ = writeln!(out, "{}", record.treatment);
            let _ = writeln!(out);
            let _ = writeln!(out, "✔ {}", ui.get(UiKey::Complete));
        }

        out
    }
}

/// Owns the model and catalogs; shared read-only after construction
#[derive(Debug)]
pub struct Diagnoser {
    preprocessor: ImagePreprocessor,
    engine: InferenceEngine,
    labels: LabelCatalog,
    content: ContentCatalog,
}

impl Diagnoser {
    /// Assemble from parts; the engine must emit one score per label
    pub fn new(
        engine: InferenceEngine,
        labels: LabelCatalog,
        content: ContentCatalog,
    ) -> Result<Self> {
        if engine.label_count() != labels.len() {
            return Err(PlantDocError::InvalidProbabilityVector {
                expected: labels.len(),
                actual: engine.label_count(),
            });
        }

        Ok(Self {
            preprocessor: ImagePreprocessor::new(),
            engine,
            labels,
            content,
        })
    }

    /// Load everything named by `config`. Blocking; any error is fatal.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let start = Instant::now();
        info!("Backend: {}", backend_name());

        let bundle = ModelBundle::open(&config.model.bundle_dir)?;
        let device = default_device();
        let classifier = bundle.load_classifier::<DefaultBackend>(&device)?;
        let labels = bundle.labels().clone();

        let engine = if config.model.probe_on_load {
            InferenceEngine::with_probe(Box::new(classifier), labels.len())?
        } else {
            InferenceEngine::new(Box::new(classifier), labels.len())
        };

        let content = match &config.content.path {
            Some(path) => {
                info!("Loading content from {:?}", path);
                ContentCatalog::from_file(path)?
            }
            None => ContentCatalog::builtin()?,
        };

        check_content(&content, &labels, config.content.strict)?;

        let diagnoser = Self::new(engine, labels, content)?;
        info!(
            "Diagnoser ready in {:.1}ms ({} labels)",
            start.elapsed().as_secs_f64() * 1000.0,
            diagnoser.labels.len()
        );
        Ok(diagnoser)
    }

    /// Classify encoded image bytes and attach content for `locale`
    pub fn classify(&self, image_bytes: &[u8], locale: Locale) -> Result<Diagnosis> {
        let input = self.preprocessor.normalize_bytes(image_bytes)?;

        let start = Instant::now();
        let probabilities = self.engine.predict(&input)?;
        let inference_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        if inference_time_ms > SLOW_INFERENCE_MS {
            warn!("Slow inference: {:.1}ms", inference_time_ms);
        }

        let result = ClassificationDecision::new(&self.labels).decide(&probabilities)?;

        let (outcome, content) = match result {
            ClassificationResult::Uncertain => {
                info!(
                    "Low confidence (top score {:.3}); no label reported",
                    probabilities.max().unwrap_or(0.0)
                );
                (Outcome::Uncertain, None)
            }
            ClassificationResult::Confident { label, confidence } => {
                let content = ContentResolver::new(&self.content)
                    .resolve(&label, locale)
                    .record()
                    .cloned();
                let outcome = Outcome::Confident {
                    confidence_percent: confidence_percent(confidence),
                    label,
                };
                (outcome, content)
            }
        };

        debug!(
            ?outcome,
            locale = locale.code(),
            has_content = content.is_some(),
            "Classified image in {:.2}ms",
            inference_time_ms
        );

        Ok(Diagnosis {
            locale,
            outcome,
            content,
            inference_time_ms,
        })
    }

    /// Read an image file and classify it; an unreadable file is `InvalidImage`
    pub fn classify_file(&self, path: &Path, locale: Locale) -> Result<Diagnosis> {
        let bytes = std::fs::read(path).map_err(|e| {
            PlantDocError::InvalidImage(format!("failed to read {}: {}", path.display(), e))
        })?;
        self.classify(&bytes, locale)
    }

    pub fn labels(&self) -> &LabelCatalog {
        &self.labels
    }

    pub fn content(&self) -> &ContentCatalog {
        &self.content
    }

    pub fn ui(&self, locale: Locale) -> &UiStrings {
        self.content.ui(locale)
    }

    pub fn model_name(&self) -> &str {
        self.engine.name()
    }
}

/// Report how content lines up with the label catalog
fn check_content(content: &ContentCatalog, labels: &LabelCatalog, strict: bool) -> Result<()> {
    let orphans = content.orphan_labels(labels);
    if !orphans.is_empty() {
        let names: Vec<&str> = orphans.iter().map(|l| l.as_str()).collect();
        if strict {
            return Err(PlantDocError::Catalog(format!(
                "content describes labels the model cannot predict: {}",
                names.join(", ")
            )));
        }
        warn!(
            "Content describes {} label(s) the model cannot predict: {}",
            names.len(),
            names.join(", ")
        );
    }

    for label in content.uncovered_labels(labels) {
        warn!("No content in any locale for '{}'", label);
    }

    for (locale, count) in content.coverage() {
        info!(
            "Content coverage {}: {}/{} labels",
            locale.code(),
            count,
            labels.len()
        );
    }
    Ok(())
}
