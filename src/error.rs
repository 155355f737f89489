// file: src/error.rs
// version: 3.1.0
// guid: a18a6436-2588-493e-9169-6d22ac6551f8

use thiserror::Error;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AgentError>;

/// Error types for the GEOM partition agent
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid size: {0}")]
    InvalidSize(String),
}

impl AgentError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a new invalid parameter error
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a new invalid size error
    pub fn invalid_size(msg: impl Into<String>) -> Self {
        Self::InvalidSize(msg.into())
    }
}
