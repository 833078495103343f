//! Model artifact persistence
//!
//! A training run produces two files in one directory:
//!
//! - `model.bin`: the bincode-encoded fitted pipeline
//! - `model_features.json`: the ordered feature list as a JSON array
//!
//! Both are encoded before anything touches the disk, and each is written to
//! a temporary sibling and renamed into place.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ModelError;
use crate::features::FeatureList;
use crate::pipeline::FittedPipeline;

/// File name of the encoded pipeline
pub const MODEL_FILE: &str = "model.bin";

/// File name of the feature list
pub const FEATURES_FILE: &str = "model_features.json";

/// Fitted pipeline paired with the feature list it was trained on
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pipeline: FittedPipeline,
    features: FeatureList,
}

/// Where a save put each artifact
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub features: PathBuf,
}

impl ModelArtifacts {
    /// Pair a pipeline with its feature list.
    ///
    /// Fails when the list length differs from the pipeline's input width.
    pub fn new(pipeline: FittedPipeline, features: FeatureList) -> Result<Self, ModelError> {
        if pipeline.n_features() != features.len() {
            return Err(ModelError::FeatureMismatch {
                expected: pipeline.n_features(),
                actual: features.len(),
            });
        }
        Ok(Self { pipeline, features })
    }

    pub fn pipeline(&self) -> &FittedPipeline {
        &self.pipeline
    }

    pub fn features(&self) -> &FeatureList {
        &self.features
    }

    /// Write both artifacts into `dir`, creating it if needed
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<ArtifactPaths, ModelError> {
        let dir = dir.as_ref();
        let model_bytes = self.pipeline.to_bytes()?;
        let features_json = self.features.to_json()?;

        fs::create_dir_all(dir)
            .map_err(|e| ModelError::Io(format!("{}: {}", dir.display(), e)))?;

        let paths = ArtifactPaths {
            model: dir.join(MODEL_FILE),
            features: dir.join(FEATURES_FILE),
        };

        // Stage both files before either rename so a failed write leaves the
        // previous pair untouched.
        let model_tmp = stage(&paths.model, &model_bytes)?;
        let features_tmp = match stage(&paths.features, features_json.as_bytes()) {
            Ok(tmp) => tmp,
            Err(e) => {
                discard(&model_tmp);
                return Err(e);
            }
        };
        if let Err(e) = commit(&model_tmp, &paths.model) {
            discard(&features_tmp);
            return Err(e);
        }
        commit(&features_tmp, &paths.features)?;

        tracing::info!(
            "Saved model to {} and {} features to {}",
            paths.model.display(),
            self.features.len(),
            paths.features.display()
        );
        Ok(paths)
    }

    /// Read both artifacts from `dir`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ModelError> {
        let dir = dir.as_ref();
        let model_path = dir.join(MODEL_FILE);
        let features_path = dir.join(FEATURES_FILE);

        let bytes = fs::read(&model_path)
            .map_err(|e| ModelError::Io(format!("{}: {}", model_path.display(), e)))?;
        let json = fs::read_to_string(&features_path)
            .map_err(|e| ModelError::Io(format!("{}: {}", features_path.display(), e)))?;

        let pipeline = FittedPipeline::from_bytes(&bytes)?;
        let features = FeatureList::from_json(&json)?;
        Self::new(pipeline, features)
    }
}

/// Write `contents` to a temporary sibling of `path` and return its path
fn stage(path: &Path, contents: &[u8]) -> Result<PathBuf, ModelError> {
    let tmp = path.with_extension("tmp");
    if let Err(e) = fs::write(&tmp, contents) {
        discard(&tmp);
        return Err(ModelError::Io(format!("{}: {}", tmp.display(), e)));
    }
    Ok(tmp)
}

/// Rename a staged file over its target; the staged file is removed on failure
fn commit(tmp: &Path, path: &Path) -> Result<(), ModelError> {
    fs::rename(tmp, path).map_err(|e| {
        discard(tmp);
        ModelError::Io(format!("{}: {}", path.display(), e))
    })
}

fn discard(tmp: &Path) {
    if tmp.is_file() {
        if let Err(e) = fs::remove_file(tmp) {
            tracing::warn!("Failed to remove {}: {}", tmp.display(), e);
        }
    }
}
