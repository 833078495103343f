//! Error types for the prediction service

use hearth_core::{DataError, ModelError};
use thiserror::Error;

/// Errors from loading the service or answering a request
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Demographics could not be loaded
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Artifacts could not be loaded, or prediction failed
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Trained features that no request field or demographic column provides
    #[error("Features not covered by the request schema or demographics: {}", .0.join(", "))]
    Misaligned(Vec<String>),

    /// Request body could not be turned into a feature row
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ServiceError {
    /// Whether the caller, not the service, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::InvalidRequest(_))
    }
}
