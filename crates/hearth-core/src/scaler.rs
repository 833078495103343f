//! Robust feature scaling
//!
//! Centers each feature on its median and divides by its interquartile
//! range, so heavy-tailed features like lot size do not dominate:
//!
//! ```text
//! x_scaled = (x - median) / (q75 - q25)
//! ```
//!
//! `NaN` cells are ignored while fitting and pass through unchanged.

use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Configuration for the robust scaler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobustScalerConfig {
    /// Subtract the median
    pub with_centering: bool,
    /// Divide by the quantile range
    pub with_scaling: bool,
    /// Quantile range in percent
    pub quantile_range: (f64, f64),
}

impl Default for RobustScalerConfig {
    fn default() -> Self {
        Self {
            with_centering: true,
            with_scaling: true,
            quantile_range: (25.0, 75.0),
        }
    }
}

/// Unfitted robust scaler
#[derive(Debug, Clone, Default)]
pub struct RobustScaler {
    config: RobustScalerConfig,
}

impl RobustScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to center on the median
    pub fn with_centering(mut self, with_centering: bool) -> Self {
        self.config.with_centering = with_centering;
        self
    }

    /// Set whether to divide by the quantile range
    pub fn with_scaling(mut self, with_scaling: bool) -> Self {
        self.config.with_scaling = with_scaling;
        self
    }

    /// Learn per-feature median and quantile range
    pub fn fit(&self, data: ArrayView2<'_, f64>) -> Result<FittedRobustScaler, ModelError> {
        let (rows, cols) = data.dim();
        if rows == 0 {
            return Err(ModelError::EmptyData(
                "cannot fit robust scaler on zero rows".to_string(),
            ));
        }

        let (q_low, q_high) = self.config.quantile_range;
        let mut center = vec![0.0; cols];
        let mut scale = vec![1.0; cols];

        for (col, column) in data.axis_iter(Axis(1)).enumerate() {
            let mut finite: Vec<f64> = column.iter().copied().filter(|x| !x.is_nan()).collect();
            if finite.is_empty() {
                continue;
            }
            finite.sort_by(|a, b| a.total_cmp(b));

            if self.config.with_centering {
                center[col] = quantile_sorted(&finite, 50.0);
            }
            if self.config.with_scaling {
                let iqr = quantile_sorted(&finite, q_high) - quantile_sorted(&finite, q_low);
                scale[col] = if iqr == 0.0 { 1.0 } else { iqr };
            }
        }

        Ok(FittedRobustScaler {
            config: self.config.clone(),
            center,
            scale,
        })
    }
}

/// Fitted robust scaler, ready to transform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedRobustScaler {
    config: RobustScalerConfig,
    center: Vec<f64>,
    scale: Vec<f64>,
}

impl FittedRobustScaler {
    /// Per-feature median (zeros when centering is off)
    pub fn center(&self) -> &[f64] {
        &self.center
    }

    /// Per-feature quantile range (ones when scaling is off)
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Number of features seen during fit
    pub fn n_features(&self) -> usize {
        self.center.len()
    }

    /// Apply the learned scaling
    pub fn transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError> {
        let cols = data.ncols();
        if cols != self.n_features() {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features(),
                actual: cols,
            });
        }

        let mut out = data.to_owned();
        for (col, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            let (center, scale) = (self.center[col], self.scale[col]);
            column.mapv_inplace(|x| (x - center) / scale);
        }
        Ok(out)
    }
}

/// Quantile of sorted data with linear interpolation between ranks
pub fn quantile_sorted(sorted: &[f64], percent: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    let idx = (percent / 100.0 * (n - 1) as f64).clamp(0.0, (n - 1) as f64);
    let lower = idx.floor() as usize;
    let upper = (lower + 1).min(n - 1);
    let frac = idx - lower as f64;
    sorted[lower] * (1.0 - frac) + sorted[upper] * frac
}
