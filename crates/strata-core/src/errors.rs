//! Unified error system for Strata
//!
//! A single error type shared by every crate in the workspace. Variants follow
//! the failure taxonomy of a bootstrap run: configuration problems and
//! resolution problems stop the run before anything is mutated, remote errors
//! are passed through untouched.

use serde::{Deserialize, Serialize};

/// Unified error type for all Strata operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum StrataError {
    /// Invalid configuration document or generated name
    #[error("Configuration error: {message}")]
    Config {
        /// Error message naming the offending entity and the violated rule
        message: String,
    },

    /// A name could not be translated into a deployed identifier
    #[error("Resolution error: {message}")]
    Resolution {
        /// Error message naming the unresolved resource
        message: String,
    },

    /// Remote collaborator reported a failure
    #[error("Remote error: {message}")]
    Remote {
        /// Error message from the remote call
        message: String,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl StrataError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a resolution error
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution {
            message: message.into(),
        }
    }

    /// Create a remote error
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Prefix the message with the entity it concerns, keeping the variant
    pub fn context(self, context: impl std::fmt::Display) -> Self {
        let wrap = |message: String| format!("{context}: {message}");
        match self {
            Self::Config { message } => Self::Config {
                message: wrap(message),
            },
            Self::Resolution { message } => Self::Resolution {
                message: wrap(message),
            },
            Self::Remote { message } => Self::Remote {
                message: wrap(message),
            },
            Self::NotFound { message } => Self::NotFound {
                message: wrap(message),
            },
            Self::Serialization { message } => Self::Serialization {
                message: wrap(message),
            },
            Self::Internal { message } => Self::Internal {
                message: wrap(message),
            },
        }
    }

    /// True for errors detected before any remote mutation
    pub fn is_pre_mutation(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Resolution { .. })
    }
}

/// Standard Result type for Strata operations
pub type Result<T> = std::result::Result<T, StrataError>;

impl From<std::io::Error> for StrataError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}

impl From<toml::de::Error> for StrataError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("invalid TOML: {err}"))
    }
}

impl From<serde_json::Error> for StrataError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
