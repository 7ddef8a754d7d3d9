//! Error types for scenecheck

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for scenecheck operations
#[derive(Debug, Error)]
pub enum SceneCheckError {
    #[error("Scene file not found: {}", .0.display())]
    SceneNotFound(PathBuf),

    #[error("Scene error: {0}")]
    SceneError(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Duplicate node key: {0}")]
    DuplicateNodeKey(String),

    #[error("Invalid component path: {0}")]
    InvalidComponentPath(String),

    #[error("Malformed mesh {mesh}: {reason}")]
    MalformedMesh { mesh: String, reason: String },

    #[error("Wrong node type: {node} is not a {expected}")]
    WrongNodeType { node: String, expected: String },

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Predicate '{predicate}' failed: {reason}")]
    PredicateFault { predicate: String, reason: String },

    #[error("No corrective action for '{0}'")]
    NoCorrective(String),

    #[error("Corrective action for '{0}' did not fix anything")]
    AdjustFailed(String),

    #[error("Report index out of range: {0}")]
    ReportNotFound(usize),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("JSON error: {0}")]
    JsonError(String),
}

/// Result type alias for scenecheck operations
pub type Result<T> = std::result::Result<T, SceneCheckError>;

impl From<toml::de::Error> for SceneCheckError {
    fn from(err: toml::de::Error) -> Self {
        SceneCheckError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for SceneCheckError {
    fn from(err: toml::ser::Error) -> Self {
        SceneCheckError::TomlSerError(err.to_string())
    }
}

impl From<serde_json::Error> for SceneCheckError {
    fn from(err: serde_json::Error) -> Self {
        SceneCheckError::JsonError(err.to_string())
    }
}
