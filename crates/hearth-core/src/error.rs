//! Error types for hearth-core

use thiserror::Error;

/// Result type alias for hearth operations
pub type Result<T> = std::result::Result<T, HearthError>;

/// Main error type for hearth operations
#[derive(Error, Debug)]
pub enum HearthError {
    /// Input data problems (missing columns, bad files)
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Fitting, prediction, or artifact problems
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Data-validation and input errors
#[derive(Error, Debug)]
pub enum DataError {
    /// File does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// File exists but could not be opened or read
    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    /// Malformed CSV content
    #[error("Invalid CSV in {path}: {reason}")]
    InvalidCsv { path: String, reason: String },

    /// A required column is absent
    #[error("Column '{column}' not found in {source_name}")]
    MissingColumn { column: String, source_name: String },

    /// A column exists twice in one frame
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// A column has the wrong kind of values
    #[error("Column '{column}' must be {expected}")]
    TypeMismatch { column: String, expected: String },

    /// Columns of different heights
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    HeightMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// Fitting, prediction, and persistence errors
#[derive(Error, Debug)]
pub enum ModelError {
    /// Nothing to fit on
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Input width differs from what the model was fit on
    #[error("Feature mismatch: expected {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    /// Features and targets disagree in length
    #[error("Length mismatch: {features} feature rows, {targets} targets")]
    LengthMismatch { features: usize, targets: usize },

    /// Artifact could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Artifact could not be written or read
    #[error("IO error: {0}")]
    Io(String),

    /// Hyperparameters rejected before fitting
    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A value is outside its allowed range
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// A required entry is missing
    #[error("Missing entry: {0}")]
    Missing(String),

    /// The config file could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// The config file could not be read
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> Self {
        ModelError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for ModelError {
    fn from(err: bincode::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
