//! Error types for infer-rs.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for infer-rs operations.
pub type Result<T> = std::result::Result<T, InferError>;

/// Errors that can occur while loading a model or running inference.
#[derive(Debug, Error)]
pub enum InferError {
    /// Model data is corrupt or incompatible.
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    /// The execution device could not be initialized.
    #[error("Device initialization failed: {0}")]
    DeviceInit(String),

    /// Inference failed at runtime.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Invalid tensor (inconsistent shape or wrong size for the model).
    #[error("Invalid tensor: {0}")]
    Tensor(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

impl InferError {
    /// Create a model load error.
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    /// Create a device initialization error.
    pub fn device_init(msg: impl Into<String>) -> Self {
        Self::DeviceInit(msg.into())
    }

    /// Create an inference error.
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a tensor error.
    pub fn tensor(msg: impl Into<String>) -> Self {
        Self::Tensor(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
