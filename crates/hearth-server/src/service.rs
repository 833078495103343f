//! Prediction service state
//!
//! Holds the fitted pipeline, its feature list, and the demographics table.
//! Built once at startup and shared read-only between requests.

use std::path::Path;

use hearth_core::loader::load_demographics;
use hearth_core::{Column, DataError, FeatureList, FittedPipeline, Frame, ModelArtifacts, ModelError};

use crate::error::ServiceError;
use crate::request::{FeatureRowSource, STRICT_FIELDS};

/// Immutable model + demographics used to answer price requests
#[derive(Debug)]
pub struct PriceService {
    pipeline: FittedPipeline,
    features: FeatureList,
    demographics: Frame,
    join_key: String,
}

impl PriceService {
    /// Build from loaded artifacts and demographics.
    ///
    /// Fails fast when a trained feature could never be supplied by a strict
    /// request or the demographics join.
    pub fn new(
        artifacts: ModelArtifacts,
        demographics: Frame,
        join_key: impl Into<String>,
    ) -> Result<Self, ServiceError> {
        let join_key = join_key.into();
        let features = artifacts.features().clone();

        let uncovered: Vec<String> = features
            .names()
            .iter()
            .filter(|name| !STRICT_FIELDS.contains(&name.as_str()) && !demographics.contains(name))
            .cloned()
            .collect();
        if !uncovered.is_empty() {
            return Err(ServiceError::Misaligned(uncovered));
        }
        if !demographics.contains(&join_key) {
            return Err(ServiceError::Data(DataError::MissingColumn {
                column: join_key,
                source_name: "demographics".to_string(),
            }));
        }

        tracing::info!(
            "Feature list aligned: {} features, {} demographic rows",
            features.len(),
            demographics.height()
        );

        Ok(Self {
            pipeline: artifacts.pipeline().clone(),
            features,
            demographics,
            join_key,
        })
    }

    /// Load artifacts from `model_dir` and demographics from a CSV file
    pub fn load(
        model_dir: impl AsRef<Path>,
        demographics_path: impl AsRef<Path>,
        join_key: &str,
    ) -> Result<Self, ServiceError> {
        let artifacts = ModelArtifacts::load(model_dir.as_ref())?;
        let demographics = load_demographics(demographics_path, join_key)?;
        Self::new(artifacts, demographics, join_key)
    }

    pub fn features(&self) -> &FeatureList {
        &self.features
    }

    pub fn join_key(&self) -> &str {
        &self.join_key
    }

    pub fn n_trees(&self) -> usize {
        self.pipeline.forest().n_trees()
    }

    pub fn demographics_rows(&self) -> usize {
        self.demographics.height()
    }

    /// Parse a request with the given strategy and estimate its price
    pub fn estimate_from(&self, source: impl FeatureRowSource) -> Result<f64, ServiceError> {
        let row = source.into_feature_row(&self.features, &self.join_key)?;
        self.estimate(&row)
    }

    /// Join demographics onto a one-row frame and predict.
    ///
    /// Columns are picked from the feature list by name, so the frame's own
    /// column order does not matter. A missing join key is treated as an
    /// unknown zipcode. Demographic columns always come from the join, so any
    /// the caller supplied are dropped first.
    pub fn estimate(&self, row: &Frame) -> Result<f64, ServiceError> {
        let mut row = row.clone();
        for name in self.demographics.names() {
            if name != &self.join_key && row.contains(name) {
                row.pop(name)?;
            }
        }
        if !row.contains(&self.join_key) {
            row.push_column(self.join_key.clone(), Column::Text(vec![None]))?;
        }
        if row.height() != 1 {
            return Err(ServiceError::InvalidRequest(format!(
                "expected a single record, got {}",
                row.height()
            )));
        }

        let joined = row.left_join(&self.demographics, &self.join_key)?;
        let x = self.features.matrix(&joined);
        let predictions = self.pipeline.predict(x.view())?;
        predictions
            .first()
            .copied()
            .ok_or_else(|| ModelError::EmptyData("no prediction produced".to_string()).into())
    }
}
