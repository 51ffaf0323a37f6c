//! Model Bundle Module
//!
//! A bundle is a directory holding everything needed to rebuild a trained
//! classifier:
//!
//! ```text
//! <bundle>/
//!   manifest.json   name, version, class count, input size
//!   labels.json     ordered label list, one entry per model output
//!   model.json      PlantClassifierConfig
//!   model.mpk       CompactRecorder weights
//! ```
//!
//! Opening a bundle cross-checks these files; any disagreement is a load
//! failure, never something discovered at request time.

use std::path::{Path, PathBuf};

use burn::{
    config::Config,
    module::Module,
    record::CompactRecorder,
    tensor::backend::Backend,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::classifier::BurnClassifier;
use super::cnn::{PlantClassifier, PlantClassifierConfig};
use crate::catalog::LabelCatalog;
use crate::inference::preprocess::{CHANNELS, IMAGE_SIZE};
use crate::utils::error::{PlantDocError, Result};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const LABELS_FILE: &str = "labels.json";
pub const CONFIG_FILE: &str = "model.json";
/// Weights stem; the recorder appends `.mpk`
pub const WEIGHTS_STEM: &str = "model";
pub const WEIGHTS_FILE: &str = "model.mpk";

/// Version written into bundles created without training
pub const UNTRAINED_VERSION: &str = "0.0.0-untrained";

/// Descriptive metadata stored alongside the weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleManifest {
    pub name: String,
    pub version: String,
    pub num_classes: usize,
    pub image_size: usize,
}

/// A validated bundle directory, weights not yet loaded
#[derive(Debug, Clone)]
pub struct ModelBundle {
    dir: PathBuf,
    manifest: BundleManifest,
    labels: LabelCatalog,
    config: PlantClassifierConfig,
}

impl ModelBundle {
    /// Open and validate a bundle directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let fail = |reason: String| PlantDocError::model_load(&dir, reason);

        if !dir.is_dir() {
            return Err(fail("bundle directory does not exist".to_string()));
        }
        for file in [MANIFEST_FILE, LABELS_FILE, CONFIG_FILE, WEIGHTS_FILE] {
            if !dir.join(file).is_file() {
                return Err(fail(format!("missing {}", file)));
            }
        }

        let manifest_json = std::fs::read_to_string(dir.join(MANIFEST_FILE))
            .map_err(|e| fail(format!("cannot read {}: {}", MANIFEST_FILE, e)))?;
        let manifest: BundleManifest = serde_json::from_str(&manifest_json)
            .map_err(|e| fail(format!("invalid {}: {}", MANIFEST_FILE, e)))?;

        let labels = LabelCatalog::from_file(&dir.join(LABELS_FILE))
            .map_err(|e| fail(format!("invalid {}: {}", LABELS_FILE, e)))?;

        let config = PlantClassifierConfig::load(dir.join(CONFIG_FILE))
            .map_err(|e| fail(format!("invalid {}: {:?}", CONFIG_FILE, e)))?;

        let bundle = Self {
            dir,
            manifest,
            labels,
            config,
        };
        bundle.validate()?;

        debug!(
            "Opened bundle '{}' v{} ({} classes)",
            bundle.manifest.name, bundle.manifest.version, bundle.manifest.num_classes
        );
        Ok(bundle)
    }

    fn validate(&self) -> Result<()> {
        let fail = |reason: String| PlantDocError::model_load(&self.dir, reason);
        let labels = self.labels.len();

        if self.manifest.num_classes != labels {
            return Err(fail(format!(
                "manifest declares {} classes but {} lists {}",
                self.manifest.num_classes, LABELS_FILE, labels
            )));
        }
        if self.config.num_classes != labels {
            return Err(fail(format!(
                "model config has {} outputs but {} lists {} labels",
                self.config.num_classes, LABELS_FILE, labels
            )));
        }
        if self.manifest.image_size != IMAGE_SIZE || self.config.input_size != IMAGE_SIZE {
            return Err(fail(format!(
                "bundle expects {}px input, only {}px is supported",
                self.manifest.image_size.max(self.config.input_size),
                IMAGE_SIZE
            )));
        }
        if self.config.num_blocks == 0 || self.config.base_filters == 0 {
            return Err(fail("model config has no convolution filters".to_string()));
        }
        if self.config.in_channels != CHANNELS {
            return Err(fail(format!(
                "model expects {} input channels, images provide {}",
                self.config.in_channels, CHANNELS
            )));
        }
        Ok(())
    }

    /// Restore the weights onto `device`
    pub fn load_classifier<B: Backend>(&self, device: &B::Device) -> Result<BurnClassifier<B>> {
        let path = self.weights_path();
        let recorder = CompactRecorder::new();

        let model = PlantClassifier::<B>::new(&self.config, device)
            .load_file(&path, &recorder, device)
            .map_err(|e| {
                PlantDocError::model_load(&self.dir, format!("failed to load weights: {:?}", e))
            })?;

        info!(
            "Loaded model '{}' v{} from {:?}",
            self.manifest.name, self.manifest.version, self.dir
        );
        Ok(BurnClassifier::new(
            model,
            device.clone(),
            format!("{}@{}", self.manifest.name, self.manifest.version),
        ))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn manifest(&self) -> &BundleManifest {
        &self.manifest
    }

    pub fn labels(&self) -> &LabelCatalog {
        &self.labels
    }

    pub fn config(&self) -> &PlantClassifierConfig {
        &self.config
    }

    /// Path handed to the recorder (no extension)
    pub fn weights_path(&self) -> PathBuf {
        self.dir.join(WEIGHTS_STEM)
    }
}

/// Write a bundle holding a freshly initialized model.
///
/// The class count and input size of `config` are overridden from `labels`
/// and the fixed input geometry. The same seed always produces the same
/// weights on a given backend.
pub fn create_untrained<B: Backend>(
    dir: impl AsRef<Path>,
    name: &str,
    labels: &LabelCatalog,
    config: PlantClassifierConfig,
    seed: u64,
    device: &B::Device,
) -> Result<ModelBundle> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let config = config
        .with_num_classes(labels.len())
        .with_input_size(IMAGE_SIZE)
        .with_in_channels(CHANNELS);

    B::seed(seed);
    let model = PlantClassifier::<B>::new(&config, device);

    config
        .save(dir.join(CONFIG_FILE))
        .map_err(|e| PlantDocError::model_load(dir, format!("failed to write config: {}", e)))?;

    let recorder = CompactRecorder::new();
    model
        .save_file(dir.join(WEIGHTS_STEM), &recorder)
        .map_err(|e| PlantDocError::model_load(dir, format!("failed to write weights: {:?}", e)))?;

    std::fs::write(dir.join(LABELS_FILE), labels.to_json()?)?;

    let manifest = BundleManifest {
        name: name.to_string(),
        version: UNTRAINED_VERSION.to_string(),
        num_classes: labels.len(),
        image_size: IMAGE_SIZE,
    };
    std::fs::write(
        dir.join(MANIFEST_FILE),
        serde_json::to_string_pretty(&manifest)?,
    )?;

    info!("Wrote untrained bundle '{}' to {:?}", name, dir);
    ModelBundle::open(dir)
}
