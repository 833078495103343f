//! Configuration for hearth
//!
//! Centralized configuration for input paths, training parameters, and
//! serving settings. Every section has defaults matching the King County
//! sales dataset layout, so an empty TOML file is a valid config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::forest::ForestConfig;
use crate::loader::LoaderColumns;

/// System-wide configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HearthConfig {
    /// Input data locations and column selection
    pub data: DataConfig,
    /// Training run parameters
    pub training: TrainingConfig,
    /// Prediction server settings
    pub server: ServerConfig,
}

/// Input data configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV with home sale records
    pub sales_path: PathBuf,
    /// CSV with zipcode demographics
    pub demographics_path: PathBuf,
    /// CSV with unseen examples for the smoke client
    pub unseen_path: PathBuf,
    /// Sales columns used for training
    pub sales_columns: Vec<String>,
    /// Regression target
    pub target_column: String,
    /// Join key between sales and demographics
    pub join_key: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            sales_path: PathBuf::from("data/kc_house_data.csv"),
            demographics_path: PathBuf::from("data/zipcode_demographics.csv"),
            unseen_path: PathBuf::from("data/future_unseen_examples.csv"),
            sales_columns: [
                "price",
                "bedrooms",
                "bathrooms",
                "sqft_living",
                "sqft_lot",
                "floors",
                "sqft_above",
                "sqft_basement",
                "zipcode",
                "waterfront",
                "view",
                "condition",
                "grade",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            target_column: "price".to_string(),
            join_key: "zipcode".to_string(),
        }
    }
}

impl DataConfig {
    /// Column names for the feature loader
    pub fn loader_columns(&self) -> LoaderColumns {
        LoaderColumns {
            target: self.target_column.clone(),
            join_key: self.join_key.clone(),
            sales: self.sales_columns.clone(),
        }
    }
}

/// Training run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Directory receiving the model artifacts
    pub output_dir: PathBuf,
    /// Fraction of rows held out for evaluation
    pub test_fraction: f64,
    /// Seed for the holdout split
    pub split_seed: u64,
    /// Number of cross-validation folds
    pub cv_folds: usize,
    /// Seed for the cross-validation shuffle
    pub cv_seed: u64,
    /// Forest hyperparameters
    pub forest: ForestConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("model"),
            test_fraction: 0.25,
            split_seed: 42,
            cv_folds: 10,
            cv_seed: 43,
            forest: ForestConfig::default(),
        }
    }
}

/// Prediction server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub addr: String,
    /// Directory holding the model artifacts
    pub model_dir: PathBuf,
    /// CSV with zipcode demographics
    pub demographics_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8000".to_string(),
            model_dir: PathBuf::from("model"),
            demographics_path: PathBuf::from("data/zipcode_demographics.csv"),
        }
    }
}

impl HearthConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let training = &self.training;
        if !(training.test_fraction > 0.0 && training.test_fraction < 1.0) {
            return Err(ConfigError::OutOfRange(
                "test_fraction must be between 0.0 and 1.0 (exclusive)".to_string(),
            ));
        }
        if training.cv_folds < 2 {
            return Err(ConfigError::OutOfRange(
                "cv_folds must be at least 2".to_string(),
            ));
        }
        training.forest.validate()?;

        let data = &self.data;
        for required in [&data.target_column, &data.join_key] {
            if !data.sales_columns.contains(required) {
                return Err(ConfigError::Missing(format!(
                    "sales_columns must include '{}'",
                    required
                )));
            }
        }

        Ok(())
    }
}
