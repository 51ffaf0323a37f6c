//! Error Handling Module
//!
//! Defines the error type shared by every stage of the diagnosis pipeline.
//! Uses thiserror for ergonomic error definitions.
//!
//! Missing disease content is deliberately absent from this enum: it is a
//! normal lookup outcome, not a failure.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for plantdoc operations
#[derive(Error, Debug)]
pub enum PlantDocError {
    /// The input bytes could not be decoded or converted to RGB
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// The model bundle is missing, incomplete or corrupt
    #[error("Failed to load model bundle at '{path}': {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    /// A single prediction call failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Model output length does not match the label catalog
    #[error("Probability vector has {actual} entries but the label catalog has {expected}")]
    InvalidProbabilityVector { expected: usize, actual: usize },

    /// Malformed label list or content configuration
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Locale identifier outside the supported set
    #[error("Unsupported locale: '{0}'")]
    UnsupportedLocale(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PlantDocError {
    /// Shorthand for a model bundle failure
    pub fn model_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PlantDocError::ModelLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable name, used in JSON error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            PlantDocError::InvalidImage(_) => "invalid_image",
            PlantDocError::ModelLoad { .. } => "model_load_failure",
            PlantDocError::Inference(_) => "inference_failure",
            PlantDocError::InvalidProbabilityVector { .. } => "invalid_probability_vector",
            PlantDocError::Catalog(_) => "catalog_error",
            PlantDocError::UnsupportedLocale(_) => "unsupported_locale",
            PlantDocError::Config(_) => "config_error",
            PlantDocError::Io(_) => "io_error",
            PlantDocError::Serialization(_) => "serialization_error",
        }
    }

    /// Whether this error, raised during startup, must prevent serving.
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            PlantDocError::ModelLoad { .. }
                | PlantDocError::Catalog(_)
                | PlantDocError::Config(_)
                | PlantDocError::InvalidProbabilityVector { .. }
        )
    }
}

impl From<image::ImageError> for PlantDocError {
    fn from(err: image::ImageError) -> Self {
        PlantDocError::InvalidImage(err.to_string())
    }
}

impl From<serde_json::Error> for PlantDocError {
    fn from(err: serde_json::Error) -> Self {
        PlantDocError::Serialization(err.to_string())
    }
}

/// Convenience Result type for plantdoc operations
pub type Result<T> = std::result::Result<T, PlantDocError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlantDocError::Catalog("duplicate label".to_string());
        assert_eq!(format!("{}", err), "Catalog error: duplicate label");
    }

    #[test]
    fn test_model_load_error_names_path() {
        let err = PlantDocError::model_load("/models/leaf", "manifest.json missing");
        let msg = err.to_string();
        assert!(msg.contains("/models/leaf"));
        assert!(msg.contains("manifest.json missing"));
        assert_eq!(err.kind(), "model_load_failure");
    }

    #[test]
    fn test_vector_mismatch_display() {
        let err = PlantDocError::InvalidProbabilityVector {
            expected: 8,
            actual: 38,
        };
        assert_eq!(
            err.to_string(),
            "Probability vector has 38 entries but the label catalog has 8"
        );
    }

    #[test]
    fn test_startup_fatal_classification() {
        assert!(PlantDocError::model_load("x", "y").is_startup_fatal());
        let mismatch = PlantDocError::InvalidProbabilityVector {
            expected: 1,
            actual: 2,
        };
        assert!(mismatch.is_startup_fatal());
        assert!(!PlantDocError::InvalidImage("bad".into()).is_startup_fatal());
        assert!(!PlantDocError::Inference("oom".into()).is_startup_fatal());
    }

    #[test]
    fn test_image_error_becomes_invalid_image() {
        let decode = image::load_from_memory(b"definitely not an image").unwrap_err();
        let err: PlantDocError = decode.into();
        assert!(matches!(err, PlantDocError::InvalidImage(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlantDocError = io_err.into();
        assert!(matches!(err, PlantDocError::Io(_)));
        assert_eq!(err.kind(), "io_error");
    }
}
