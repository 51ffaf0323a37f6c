//! # PlantDoc
//!
//! Leaf photo disease classification with localized diagnostic content,
//! built on the Burn framework.
//!
//! ## Features
//!
//! - **Deterministic preprocessing** of any decodable photo to a
//!   `[1, 224, 224, 3]` tensor in `[0, 1]`
//! - **Burn CNN** loaded once from a validated model bundle
//! - **Confidence gate** at 0.50: below it no label is reported
//! - **Localized content** (English, Hindi, Marathi) with no silent fallback
//!
//! ## Modules
//!
//! - `catalog`: Labels, locales, disease records and UI strings
//! - `inference`: Preprocessing, the serialized engine and the decision rule
//! - `model`: CNN architecture and model bundles
//! - `pipeline`: `Diagnoser`, the end-to-end classify operation
//! - `server`: HTTP API over a `Diagnoser`
//! - `config`, `backend`, `utils`: Configuration, backend selection, logging
//!   and errors
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use plantdoc::{AppConfig, Diagnoser, Locale};
//!
//! let diagnoser = Diagnoser::from_config(&AppConfig::default())?;
//! let diagnosis = diagnoser.classify(&std::fs::read("leaf.jpg")?, Locale::Hindi)?;
//! println!("{}", diagnosis.render(diagnoser.ui(Locale::Hindi)));
//! ```

pub mod backend;
pub mod catalog;
pub mod config;
pub mod inference;
pub mod model;
pub mod pipeline;
pub mod server;
pub mod utils;

// Re-export commonly used items for convenience
pub use catalog::{
    ClassLabel, ContentCatalog, ContentLookup, ContentResolver, DiseaseRecord, LabelCatalog,
    Locale, UiKey, UiStrings,
};
pub use config::AppConfig;
pub use inference::{
    ClassificationDecision, ClassificationResult, Classifier, ImagePreprocessor, InferenceEngine,
    InputTensor, ProbabilityVector, CONFIDENCE_THRESHOLD,
};
pub use model::{BurnClassifier, ModelBundle, PlantClassifier, PlantClassifierConfig};
pub use pipeline::{Diagnoser, Diagnosis, Outcome};
pub use utils::error::{PlantDocError, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
