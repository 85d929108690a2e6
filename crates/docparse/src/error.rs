//! Error types for document loading

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for loader operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error from a delegated backend crate or service
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Loader errors
///
/// Only [`Error::UnsupportedFormat`] and [`Error::MissingDependency`] are
/// raised by the dispatch layer itself. Everything else is a failure from
/// the delegated library, passed through as-is.
#[derive(Debug, Error)]
pub enum Error {
    /// The path suffix is not one the router knows
    #[error("Unsupported file format '{extension}' for {}", path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The backend's optional dependency was not compiled in
    #[error("Backend '{backend}' is not available. Install with: {install_hint}")]
    MissingDependency {
        backend: String,
        install_hint: String,
    },

    /// Unrecognized PDF backend name
    #[error(
        "Unsupported PDF loader method: '{name}'. Expected one of: local, unstructured, document-ai"
    )]
    UnknownBackend { name: String },

    /// Configuration error (missing credentials, processor, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// HTTP request error
    #[cfg(any(feature = "unstructured", feature = "gcp"))]
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Any other failure raised by a delegated backend
    #[error(transparent)]
    Backend(BoxError),
}

impl Error {
    /// Create a missing dependency error
    pub fn missing_dependency(backend: impl Into<String>, install_hint: impl Into<String>) -> Self {
        Self::MissingDependency {
            backend: backend.into(),
            install_hint: install_hint.into(),
        }
    }

    /// Wrap a delegated backend error without altering it
    pub fn backend(err: impl Into<BoxError>) -> Self {
        Self::Backend(err.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// The install hint, if this is a missing dependency error
    pub fn install_hint(&self) -> Option<&str> {
        match self {
            Self::MissingDependency { install_hint, .. } => Some(install_hint),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependency_carries_hint() {
        let err = Error::missing_dependency("unstructured", "cargo add docparse --features unstructured");
        assert_eq!(
            err.install_hint(),
            Some("cargo add docparse --features unstructured")
        );
        assert!(err.to_string().contains("cargo add docparse"));
    }

    #[test]
    fn test_backend_error_is_transparent() {
        let err = Error::backend("File corrupted");
        assert_eq!(err.to_string(), "File corrupted");
        assert!(err.install_hint().is_none());
    }

    #[test]
    fn test_unknown_backend_names_value() {
        let err = Error::UnknownBackend {
            name: "invalid".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Unsupported PDF loader method"));
        assert!(msg.contains("invalid"));
    }
}
