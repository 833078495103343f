//! Scale-then-predict pipeline
//!
//! The scaler is fit on training rows only and then reused unchanged for
//! holdout and inference rows.

use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::forest::{FittedForest, ForestConfig, ForestRegressor};
use crate::scaler::{FittedRobustScaler, RobustScaler};

/// Unfitted robust scaler + forest regressor
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    scaler: RobustScaler,
    forest: ForestRegressor,
}

impl Pipeline {
    pub fn new(forest: ForestConfig) -> Self {
        Self {
            scaler: RobustScaler::new(),
            forest: ForestRegressor::new(forest),
        }
    }

    /// Fit the scaler, then the forest on the scaled rows
    pub fn fit(&self, x: ArrayView2<'_, f64>, y: &[f64]) -> Result<FittedPipeline, ModelError> {
        let scaler = self.scaler.fit(x)?;
        let scaled = scaler.transform(x)?;
        let forest = self.forest.fit(scaled.view(), y)?;
        Ok(FittedPipeline { scaler, forest })
    }
}

/// Fitted pipeline; immutable once built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedPipeline {
    scaler: FittedRobustScaler,
    forest: FittedForest,
}

impl FittedPipeline {
    /// Number of input columns expected by `predict`
    pub fn n_features(&self) -> usize {
        self.scaler.n_features()
    }

    pub fn scaler(&self) -> &FittedRobustScaler {
        &self.scaler
    }

    pub fn forest(&self) -> &FittedForest {
        &self.forest
    }

    /// Scale rows with the fitted statistics and predict
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
        let scaled = self.scaler.transform(x)?;
        self.forest.predict(scaled.view())
    }

    /// Encode as bincode bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, ModelError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from bincode bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn data() -> (Array2<f64>, Vec<f64>) {
        let x = Array2::from_shape_fn((30, 2), |(r, c)| (r * (c + 1)) as f64);
        let y = (0..30).map(|r| 1000.0 + 50.0 * r as f64).collect();
        (x, y)
    }

    fn config() -> ForestConfig {
        ForestConfig {
            n_trees: 10,
            seed: 3,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn test_fit_predict() {
        let (x, y) = data();
        let fitted = Pipeline::new(config()).fit(x.view(), &y).unwrap();

        let predictions = fitted.predict(x.view()).unwrap();
        assert_eq!(predictions.len(), 30);
        assert!(predictions.iter().all(|p| *p >= 1000.0 && *p <= 2450.0));
        assert_eq!(fitted.n_features(), 2);
    }

    #[test]
    fn test_bytes_roundtrip_predicts_identically() {
        let (x, y) = data();
        let fitted = Pipeline::new(config()).fit(x.view(), &y).unwrap();

        let restored = FittedPipeline::from_bytes(&fitted.to_bytes().unwrap()).unwrap();
        assert_eq!(
            fitted.predict(x.view()).unwrap(),
            restored.predict(x.view()).unwrap()
        );
    }

    #[test]
    fn test_corrupt_bytes() {
        let result = FittedPipeline::from_bytes(&[1, 2, 3]);
        assert!(matches!(result, Err(ModelError::Serialization(_))));
    }
}
