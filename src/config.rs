//! Application Configuration Module
//!
//! Settings are read from an optional TOML file. Every field has a default,
//! so an empty file (or no file) yields a runnable configuration. CLI flags
//! and `PLANTDOC_*` environment variables are applied on top by the binary.
//!
//! ```toml
//! [model]
//! bundle_dir = "models/plant_disease"
//!
//! [content]
//! strict = true
//!
//! [locale]
//! default = "hi"
//!
//! [server]
//! port = 9000
//! inference_timeout_ms = 2000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::Locale;
use crate::utils::error::{PlantDocError, Result};
use crate::utils::logging::LogLevel;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelSettings,
    pub content: ContentSettings,
    pub locale: LocaleSettings,
    pub server: ServerSettings,
    pub logging: LoggingSettings,
}

/// Where the model bundle lives and how it is checked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Bundle directory (see `model::bundle`)
    pub bundle_dir: PathBuf,

    /// Run one zero-tensor inference at startup
    pub probe_on_load: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            bundle_dir: PathBuf::from("models/plant_disease"),
            probe_on_load: true,
        }
    }
}

/// Diagnostic content source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    /// Content JSON to use instead of the built-in one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Fail startup when content names labels the model cannot emit
    pub strict: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleSettings {
    pub default: Locale,
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,

    /// Upper bound on one classify request's inference; none if unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inference_timeout_ms: Option<u64>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            inference_timeout_ms: None,
        }
    }
}

impl ServerSettings {
    pub fn inference_timeout(&self) -> Option<Duration> {
        self.inference_timeout_ms.map(Duration::from_millis)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: LogLevel,
}

impl AppConfig {
    /// Read and validate a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PlantDocError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&text)
            .map_err(|e| PlantDocError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(text).map_err(|e| PlantDocError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.bundle_dir.as_os_str().is_empty() {
            return Err(PlantDocError::Config(
                "model.bundle_dir must not be empty".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(PlantDocError::Config(
                "server.port must be between 1 and 65535".to_string(),
            ));
        }
        if self.server.inference_timeout_ms == Some(0) {
            return Err(PlantDocError::Config(
                "server.inference_timeout_ms must be positive".to_string(),
            ));
        }
        if self.server.host.trim().is_empty() {
            return Err(PlantDocError::Config(
                "server.host must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
