//! Cube model error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a cube model
#[derive(Error, Debug)]
pub enum ModelError {
    /// Model file could not be read
    #[error("Failed to read model file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    /// Model document could not be deserialized
    #[error("Failed to parse model: {0}")]
    Parse(String),

    /// Model is structurally inconsistent
    #[error("Invalid model: {0}")]
    Invalid(String),
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for ModelError {
    fn from(err: toml::de::Error) -> Self {
        ModelError::Parse(err.to_string())
    }
}

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;
