//! hearth-core - Home price estimation pipeline
//!
//! This crate covers everything between raw CSV files and a fitted,
//! persisted model:
//!
//! - **Frame**: small columnar table with text and numeric columns
//! - **Loader**: sales left-joined onto zipcode demographics
//! - **Pipeline**: robust scaler followed by a bagged regression forest
//! - **Trainer**: holdout and k-fold evaluation, artifact persistence
//!
//! # Design
//!
//! The feature list written at training time is the single source of
//! column order. Inference selects columns from it by name, so callers can
//! hand over frames in any column order.

pub mod artifacts;
pub mod config;
pub mod csv_reader;
pub mod error;
pub mod features;
pub mod forest;
pub mod frame;
pub mod loader;
pub mod metrics;
pub mod pipeline;
pub mod scaler;
pub mod split;
pub mod trainer;

pub use artifacts::{ArtifactPaths, ModelArtifacts, FEATURES_FILE, MODEL_FILE};
pub use config::{DataConfig, HearthConfig, ServerConfig, TrainingConfig};
pub use error::{ConfigError, DataError, HearthError, ModelError, Result};
pub use features::FeatureList;
pub use forest::{FittedForest, ForestConfig, ForestRegressor};
pub use frame::{Column, Frame};
pub use loader::{LoadedData, LoaderColumns};
pub use pipeline::{FittedPipeline, Pipeline};
pub use scaler::{FittedRobustScaler, RobustScaler};
pub use trainer::{Evaluation, Trainer, TrainingReport};
