//! Error types for Zani
//!
//! All modules use `ZaniResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Zani operations
pub type ZaniResult<T> = Result<T, ZaniError>;

/// All errors that can occur in Zani
#[derive(Error, Debug)]
pub enum ZaniError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Registry errors
    #[error("Cache registry at {path} is corrupt: {reason}")]
    RegistryCorrupt { path: PathBuf, reason: String },

    #[error("Failed to persist cache registry {path}: {source}")]
    RegistryPersist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Remote cache errors
    #[error("API key not found in environment variable {0}")]
    ApiKeyMissing(String),

    #[error("Remote cache operation failed: {0}")]
    ExternalCache(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl ZaniError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a remote cache error from any displayable cause
    pub fn external(cause: impl std::fmt::Display) -> Self {
        Self::ExternalCache(cause.to_string())
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ApiKeyMissing(_) => Some("Export GOOGLE_API_KEY or set model.api_key_env"),
            Self::RegistryCorrupt { .. } => {
                Some("Run: zani stop (or delete .zani/registry.json) and recreate the cache")
            }
            Self::ConfigInvalid { .. } => Some("Run: zani config show"),
            _ => None,
        }
    }
}
